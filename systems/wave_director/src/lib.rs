#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave director responsible for emitting enemy spawn commands.
//!
//! The director waits, announces a wave, spawns its enemies on a stagger,
//! waits for every one of them to die or reach the objective, awards the
//! clear bonus and either schedules the next wave or ends the campaign.

use std::{f32::consts::TAU, time::Duration};

use bastion_core::{
    tuning::{EnemyTuning, WaveTuning},
    Command, Event,
};
use glam::Vec2;
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Debug)]
pub struct Config {
    waves: WaveTuning,
    enemies: EnemyTuning,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration from wave and enemy tuning plus a seed.
    #[must_use]
    pub const fn new(waves: WaveTuning, enemies: EnemyTuning, rng_seed: u64) -> Self {
        Self {
            waves,
            enemies,
            rng_seed,
        }
    }
}

/// Observable phase of the wave director.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePhase {
    /// Counting down to the next wave.
    Waiting {
        /// Time left before the next wave starts.
        remaining: Duration,
    },
    /// Enemies of the current wave are still being spawned.
    Spawning,
    /// Every enemy has spawned and the wave is being fought.
    InProgress,
    /// The final wave has been cleared.
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Waiting { timer: Duration },
    Spawning { elapsed: Duration, spawned: u32 },
    InProgress,
    Finished,
}

/// Pure system that schedules waves and detects their completion.
#[derive(Debug)]
pub struct WaveDirector {
    waves: WaveTuning,
    enemies: EnemyTuning,
    rng: ChaCha8Rng,
    phase: Phase,
    wave: u32,
    scheduled: u32,
    remaining: u32,
}

impl WaveDirector {
    /// Creates a new wave director using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let first = config.waves.first_wave_delay();
        Self {
            waves: config.waves,
            enemies: config.enemies,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            phase: Phase::Waiting { timer: first },
            wave: 0,
            scheduled: 0,
            remaining: 0,
        }
    }

    /// Current or most recently started wave, zero before the first one.
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Enemies of the current wave that have neither died nor reached the objective.
    #[must_use]
    pub fn enemies_remaining(&self) -> u32 {
        self.remaining
    }

    /// Observable phase of the director.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        match self.phase {
            Phase::Waiting { timer } => WavePhase::Waiting { remaining: timer },
            Phase::Spawning { .. } => WavePhase::Spawning,
            Phase::InProgress => WavePhase::InProgress,
            Phase::Finished => WavePhase::Finished,
        }
    }

    /// Consumes the step's events to emit wave and spawn commands.
    pub fn handle(&mut self, events: &[Event], objective: Vec2, out: &mut Vec<Command>) {
        let mut dt = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt: step } => dt = dt.saturating_add(*step),
                Event::EnemyDied { .. } | Event::EnemyReachedObjective { .. } => {
                    self.remaining = self.remaining.saturating_sub(1);
                }
                _ => {}
            }
        }

        match self.phase {
            Phase::Finished => {}
            Phase::Waiting { timer } => {
                let timer = timer.saturating_sub(dt);
                if timer.is_zero() {
                    self.start_next_wave(objective, out);
                } else {
                    self.phase = Phase::Waiting { timer };
                }
            }
            Phase::Spawning { elapsed, spawned } => {
                self.spawn_due(elapsed.saturating_add(dt), spawned, objective, out);
            }
            Phase::InProgress => self.check_completion(out),
        }
    }

    fn start_next_wave(&mut self, objective: Vec2, out: &mut Vec<Command>) {
        self.wave = self.wave.saturating_add(1);
        self.scheduled = self.waves.enemy_count(self.wave);
        self.remaining = self.scheduled;
        info!("wave {} started with {} enemies", self.wave, self.scheduled);
        out.push(Command::StartWave {
            wave: self.wave,
            enemy_count: self.scheduled,
        });
        self.spawn_due(Duration::ZERO, 0, objective, out);
    }

    /// Spawns every enemy whose stagger offset has elapsed since the wave started.
    fn spawn_due(&mut self, elapsed: Duration, mut spawned: u32, objective: Vec2, out: &mut Vec<Command>) {
        let stagger = self.waves.spawn_stagger();
        let profile = self.enemies.profile(self.wave);
        while spawned < self.scheduled && stagger.saturating_mul(spawned) <= elapsed {
            let angle = self.rng.gen_range(0.0..TAU);
            out.push(Command::SpawnEnemy {
                position: objective + Vec2::from_angle(angle) * self.waves.spawn_radius,
                profile,
            });
            spawned += 1;
        }

        if spawned < self.scheduled {
            self.phase = Phase::Spawning { elapsed, spawned };
        } else {
            self.phase = Phase::InProgress;
            self.check_completion(out);
        }
    }

    fn check_completion(&mut self, out: &mut Vec<Command>) {
        if self.remaining > 0 {
            return;
        }
        let bonus_gold = self.waves.wave_bonus_gold;
        info!("wave {} cleared", self.wave);
        out.push(Command::CompleteWave {
            wave: self.wave,
            bonus_gold,
        });
        if self.wave >= self.waves.total_waves {
            info!("all {} waves cleared", self.wave);
            out.push(Command::CompleteCampaign);
            self.phase = Phase::Finished;
        } else {
            self.phase = Phase::Waiting {
                timer: self.waves.wave_interval(),
            };
        }
    }
}
