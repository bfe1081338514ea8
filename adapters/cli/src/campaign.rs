//! Headless campaign driver: buys towers round-robin and resolves level-ups
//! with a fixed policy.

use std::{fmt, time::Duration};

use bastion_core::{Archetype, Economy, Event, Objective};
use bastion_simulation::{Outcome, Simulation};
use clap::ValueEnum;
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// How the driver answers an upgrade offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum UpgradePolicy {
    /// Always takes the first offered upgrade.
    First,
    /// Picks an offered upgrade uniformly at random.
    Random,
}

/// Parameters of a single run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Settings {
    pub(crate) dt: Duration,
    pub(crate) max_ticks: u64,
    pub(crate) policy: UpgradePolicy,
    pub(crate) seed: u64,
}

/// Final state reported once a run stops.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Summary {
    pub(crate) outcome: Outcome,
    pub(crate) ticks: u64,
    pub(crate) elapsed: Duration,
    pub(crate) waves_cleared: u32,
    pub(crate) level: u32,
    pub(crate) gold: u32,
    pub(crate) core_health: u32,
    pub(crate) core_max_health: u32,
    pub(crate) kills: u32,
    pub(crate) towers: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.outcome {
            Outcome::Victory => "victory",
            Outcome::Defeat => "defeat",
            Outcome::InProgress => "abandoned",
        };
        writeln!(f, "outcome: {outcome}")?;
        writeln!(
            f,
            "ticks: {} ({:.1}s simulated)",
            self.ticks,
            self.elapsed.as_secs_f32()
        )?;
        writeln!(f, "waves cleared: {}", self.waves_cleared)?;
        writeln!(f, "level: {}", self.level)?;
        writeln!(f, "towers: {}", self.towers)?;
        writeln!(f, "gold: {}", self.gold)?;
        writeln!(
            f,
            "core: {}/{}",
            self.core_health, self.core_max_health
        )?;
        write!(f, "kills: {}", self.kills)
    }
}

/// Plays the campaign until it is decided or the tick budget runs out.
pub(crate) fn run(mut simulation: Simulation, settings: &Settings) -> Summary {
    let mut driver = Driver::new(settings);
    let mut events = Vec::new();
    let mut waves_cleared = 0;
    let mut ticks = 0;

    while ticks < settings.max_ticks && simulation.outcome() == Outcome::InProgress {
        if simulation.is_paused() {
            driver.choose_upgrade(&mut simulation, &mut events);
        } else {
            driver.buy_towers(&mut simulation, &mut events);
            simulation.step(settings.dt, &mut events);
            ticks += 1;
        }

        for event in events.drain(..) {
            match event {
                Event::WaveCompleted { wave, .. } => {
                    waves_cleared += 1;
                    info!("wave {wave} cleared");
                }
                Event::LevelUp { level, .. } => debug!("reached level {level}"),
                Event::CoreDestroyed => info!("core destroyed"),
                _ => {}
            }
        }
    }

    if simulation.outcome() == Outcome::InProgress {
        warn!("tick budget of {} exhausted before the campaign ended", settings.max_ticks);
    }

    Summary {
        outcome: simulation.outcome(),
        ticks,
        elapsed: simulation.elapsed(),
        waves_cleared,
        level: simulation.progression().level,
        gold: simulation.economy().balance(),
        core_health: simulation.objective().health(),
        core_max_health: simulation.objective().max_health(),
        kills: simulation.kills(),
        towers: simulation.towers().iter().count(),
    }
}

struct Driver {
    policy: UpgradePolicy,
    rng: ChaCha8Rng,
    next_archetype: usize,
}

impl Driver {
    fn new(settings: &Settings) -> Self {
        Self {
            policy: settings.policy,
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
            next_archetype: 0,
        }
    }

    fn choose_upgrade(&mut self, simulation: &mut Simulation, events: &mut Vec<Event>) {
        let index = match self.policy {
            UpgradePolicy::First => 0,
            UpgradePolicy::Random => self.rng.gen_range(0..3),
        };
        match simulation.select_upgrade(index, events) {
            Ok(upgrade) => info!("took upgrade {}", upgrade.name()),
            Err(error) => warn!("upgrade selection failed: {error}"),
        }
    }

    /// Buys the next archetype in rotation for as long as gold and free slots last.
    fn buy_towers(&mut self, simulation: &mut Simulation, events: &mut Vec<Event>) {
        loop {
            let archetype = Archetype::ALL[self.next_archetype % Archetype::ALL.len()];
            if simulation.economy().balance() < simulation.cost(archetype) {
                return;
            }
            let Some(slot) = simulation
                .slots()
                .into_iter()
                .find(|slot| slot.unlocked && !slot.central && slot.occupant.is_none())
            else {
                return;
            };
            match simulation.purchase_tower(archetype, slot.id, events) {
                Ok(_) => {
                    debug!("bought {archetype:?} for slot {:?}", slot.id);
                    self.next_archetype += 1;
                }
                Err(reason) => {
                    warn!("purchase of {archetype:?} failed: {reason}");
                    return;
                }
            }
        }
    }
}
