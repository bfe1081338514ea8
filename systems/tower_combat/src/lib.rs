#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves tower attacks once their cooldown expires.
//!
//! Each archetype maps to one attack strategy. Projectile archetypes launch
//! homing projectiles that the projectile system resolves later, while beam
//! and chain archetypes damage their victims within the same batch. Evolved
//! lightning towers additionally call down a periodic sky strike.

use std::time::Duration;

use bastion_core::{
    tuning::LightningTuning, ArchetypeParams, Command, DamageLedger, EnemySnapshot, EnemyView,
    Event, ProjectilePayload, TowerSnapshot, TowerView,
};
use log::debug;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the combat system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    sky_strike_damage: u32,
    sky_strike_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration from the sky strike parameters and a seed.
    #[must_use]
    pub const fn new(sky_strike_damage: u32, sky_strike_interval: Duration, rng_seed: u64) -> Self {
        Self {
            sky_strike_damage,
            sky_strike_interval,
            rng_seed,
        }
    }

    /// Creates a configuration from lightning tuning.
    #[must_use]
    pub fn from_tuning(tuning: &LightningTuning, rng_seed: u64) -> Self {
        Self::new(tuning.sky_strike_damage, tuning.sky_strike_interval(), rng_seed)
    }
}

/// Attack behaviour selected for a tower on fire.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Strategy {
    Projectile {
        speed: f32,
        payload: ProjectilePayload,
        volley: u32,
    },
    Beam {
        extra_beams: u32,
    },
    Chain {
        hits: u32,
        range: f32,
        reduction: f32,
    },
}

/// Dispatch table from archetype parameters to attack strategy.
fn strategy_for(params: ArchetypeParams) -> Strategy {
    match params {
        ArchetypeParams::Arrow { projectile_speed } => Strategy::Projectile {
            speed: projectile_speed,
            payload: ProjectilePayload::Direct,
            volley: 1,
        },
        ArchetypeParams::Cannon {
            projectile_speed,
            splash_radius,
        } => Strategy::Projectile {
            speed: projectile_speed,
            payload: ProjectilePayload::Splash {
                radius: splash_radius,
            },
            volley: 1,
        },
        ArchetypeParams::Ice {
            projectile_speed,
            slow_multiplier,
            slow_duration,
            projectile_count,
        } => Strategy::Projectile {
            speed: projectile_speed,
            payload: ProjectilePayload::Frost {
                multiplier: slow_multiplier,
                duration: slow_duration,
            },
            volley: projectile_count.max(1),
        },
        ArchetypeParams::Laser { extra_beams } => Strategy::Beam { extra_beams },
        ArchetypeParams::Lightning {
            chain_count,
            chain_range,
            chain_reduction,
        } => Strategy::Chain {
            hits: chain_count.max(1),
            range: chain_range,
            reduction: chain_reduction,
        },
    }
}

/// Tower combat system that fires ready towers and schedules sky strikes.
#[derive(Debug)]
pub struct TowerCombat {
    sky_strike_damage: u32,
    sky_strike_interval: Duration,
    sky_strike_timer: Duration,
    rng: ChaCha8Rng,
    ledger: DamageLedger,
    hits: Vec<EnemySnapshot>,
}

impl TowerCombat {
    /// Creates a new tower combat system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            sky_strike_damage: config.sky_strike_damage,
            sky_strike_interval: config.sky_strike_interval,
            sky_strike_timer: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            ledger: DamageLedger::new(),
            hits: Vec::new(),
        }
    }

    /// Consumes the tick's events and current views to emit attack commands.
    ///
    /// Every firing tower produces a `Command::FireTower` followed by its
    /// strategy's projectile or damage commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        self.ledger.clear();

        for tower in towers.iter() {
            if !tower.cooldown.is_zero() {
                continue;
            }
            let Some(target) = tower.target.and_then(|target| enemies.get(target)) else {
                continue;
            };
            if self.ledger.is_doomed(target) {
                continue;
            }

            out.push(Command::FireTower {
                tower: tower.id,
                target: target.id,
            });
            match strategy_for(tower.params) {
                Strategy::Projectile {
                    speed,
                    payload,
                    volley,
                } => {
                    for _ in 0..volley {
                        out.push(Command::LaunchProjectile {
                            tower: tower.id,
                            target: target.id,
                            damage: tower.damage,
                            speed,
                            payload,
                        });
                    }
                }
                Strategy::Beam { extra_beams } => {
                    self.fire_beams(tower, target, extra_beams, enemies, out);
                }
                Strategy::Chain {
                    hits,
                    range,
                    reduction,
                } => {
                    self.fire_chain(tower, target, hits, range, reduction, enemies, out);
                }
            }
        }

        self.advance_sky_strike(events, towers, enemies, out);
    }

    fn fire_beams(
        &mut self,
        tower: &TowerSnapshot,
        target: &EnemySnapshot,
        extra_beams: u32,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        let _ = self.ledger.strike(target, tower.damage, out);
        let mut remaining = extra_beams;
        for enemy in enemies.within(tower.position, tower.range) {
            if remaining == 0 {
                break;
            }
            if enemy.id == target.id || self.ledger.is_doomed(enemy) {
                continue;
            }
            let _ = self.ledger.strike(enemy, tower.damage, out);
            remaining -= 1;
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn fire_chain(
        &mut self,
        tower: &TowerSnapshot,
        target: &EnemySnapshot,
        hits: u32,
        range: f32,
        reduction: f32,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        self.hits.clear();
        let mut current = *target;
        for hop in 0..hits {
            let damage = chain_damage(tower.damage, reduction, hop);
            let _ = self.ledger.strike(&current, damage, out);
            self.hits.push(current);

            let visited = &self.hits;
            let ledger = &self.ledger;
            let next = enemies.nearest_within(current.position, range, |enemy| {
                !visited.iter().any(|hit| hit.id == enemy.id) && !ledger.is_doomed(enemy)
            });
            match next {
                Some(enemy) => current = *enemy,
                None => break,
            }
        }
    }

    fn advance_sky_strike(
        &mut self,
        events: &[Event],
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        let armed = towers.iter().any(|tower| {
            tower.evolved && matches!(tower.params, ArchetypeParams::Lightning { .. })
        });
        if !armed || self.sky_strike_interval.is_zero() {
            return;
        }

        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.sky_strike_timer = self.sky_strike_timer.saturating_add(*dt);
            }
        }
        if self.sky_strike_timer < self.sky_strike_interval {
            return;
        }
        self.sky_strike_timer = Duration::ZERO;

        let candidates: Vec<&EnemySnapshot> = enemies
            .iter()
            .filter(|enemy| !self.ledger.is_doomed(enemy))
            .collect();
        if let Some(victim) = candidates.choose(&mut self.rng) {
            debug!("sky strike on enemy {}", victim.id.get());
            out.push(Command::SkyStrike {
                enemy: victim.id,
                damage: self.sky_strike_damage,
            });
        }
    }
}

/// Damage dealt by the hop with the provided zero-based index.
///
/// Computes `floor(base * reduction^hop)` in integer per-mille arithmetic so
/// a 0.7 reduction yields exactly `D, 0.7D, 0.49D`.
#[must_use]
pub fn chain_damage(base: u32, reduction: f32, hop: u32) -> u32 {
    let permille = u128::from((reduction.clamp(0.0, 1.0) * 1000.0).round() as u32);
    let exact = permille
        .checked_pow(hop)
        .zip(1000_u128.checked_pow(hop))
        .map(|(numerator, denominator)| u128::from(base) * numerator / denominator);
    match exact {
        Some(value) => u32::try_from(value).unwrap_or(u32::MAX),
        None => (f64::from(base) * f64::from(reduction).powi(hop as i32)).floor() as u32,
    }
}
