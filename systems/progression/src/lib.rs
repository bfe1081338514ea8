#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic upgrade engine driven by enemy kills.
//!
//! Experience from [`Event::EnemyDied`] fills a level bar. Every level-up
//! draws three distinct candidates from a weighted pool, raises
//! [`Event::UpgradeChoicesReady`] and pauses the simulation until
//! [`Progression::select`] is called. Selected upgrades become commands for
//! the world: global multipliers, projectile modifiers, slot unlocks and
//! archetype rank-ups that evolve an archetype once its rank reaches three.

pub mod catalog;

use bastion_core::{
    tuning::ProgressionTuning, Archetype, ArchetypeUpgrade, Command, Event, GlobalModifiers,
    ProjectileModifiers, SelectionError, TowerView, Upgrade, UpgradeKind,
};
use log::{debug, info, warn};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use catalog::{Catalog, CatalogEntry, CatalogError};

/// Rank at which an archetype evolves. Ranks never exceed it.
pub const MAX_RANK: u8 = 3;

/// Configuration parameters required to construct the upgrade engine.
#[derive(Clone, Debug)]
pub struct Config {
    progression: ProgressionTuning,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration from the experience curve and a seed.
    #[must_use]
    pub const fn new(progression: ProgressionTuning, rng_seed: u64) -> Self {
        Self {
            progression,
            rng_seed,
        }
    }
}

/// Additive bonuses accumulated from general upgrades.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Bonuses {
    damage: f32,
    attack_speed: f32,
    range: f32,
    gold: f32,
}

/// Read-only copy of the progression state.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressionSnapshot {
    /// Levels gained so far.
    pub level: u32,
    /// Experience toward the next level.
    pub xp: u32,
    /// Experience the next level requires.
    pub xp_to_next: u32,
    /// Rank per archetype, indexed by [`Archetype::index`].
    pub ranks: [u8; 5],
    /// Evolution flag per archetype, indexed by [`Archetype::index`].
    pub evolved: [bool; 5],
    /// Global tower multipliers in effect.
    pub modifiers: GlobalModifiers,
    /// Multiplier applied to gold from kills.
    pub gold_multiplier: f32,
    /// Objective health restored per simulated second.
    pub regeneration_per_second: f32,
    /// Modifiers stamped onto newly launched projectiles.
    pub projectile_modifiers: ProjectileModifiers,
    /// Candidates awaiting a selection, if any.
    pub pending_choices: Option<[Upgrade; 3]>,
}

impl ProgressionSnapshot {
    /// Rank of the provided archetype.
    #[must_use]
    pub fn rank(&self, archetype: Archetype) -> u8 {
        self.ranks[archetype.index()]
    }

    /// Reports whether the archetype has evolved.
    #[must_use]
    pub fn is_evolved(&self, archetype: Archetype) -> bool {
        self.evolved[archetype.index()]
    }
}

/// Pure system that owns experience, levels, ranks and upgrade choices.
#[derive(Debug)]
pub struct Progression {
    catalog: Catalog,
    rng: ChaCha8Rng,
    xp_increment: u32,
    xp: u32,
    xp_to_next: u32,
    level: u32,
    ranks: [u8; 5],
    evolved: [bool; 5],
    bonuses: Bonuses,
    regeneration: f32,
    projectile: ProjectileModifiers,
    pending: Option<[Upgrade; 3]>,
}

impl Progression {
    /// Creates a new upgrade engine drawing from the provided catalog.
    #[must_use]
    pub fn new(config: Config, catalog: Catalog) -> Self {
        Self {
            catalog,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            xp_increment: config.progression.xp_increment,
            xp: 0,
            xp_to_next: config.progression.first_level_xp,
            level: 0,
            ranks: [0; 5],
            evolved: [false; 5],
            bonuses: Bonuses::default(),
            regeneration: 0.0,
            projectile: ProjectileModifiers::default(),
            pending: None,
        }
    }

    /// Catalog the engine draws from.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Levels gained so far.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Candidates awaiting a selection, if any.
    #[must_use]
    pub fn pending_choices(&self) -> Option<&[Upgrade; 3]> {
        self.pending.as_ref()
    }

    /// Global tower multipliers accumulated so far.
    #[must_use]
    pub fn global_modifiers(&self) -> GlobalModifiers {
        GlobalModifiers {
            damage: 1.0 + self.bonuses.damage,
            attack_speed: 1.0 + self.bonuses.attack_speed,
            range: 1.0 + self.bonuses.range,
        }
    }

    /// Multiplier applied to gold from kills.
    #[must_use]
    pub fn gold_multiplier(&self) -> f32 {
        1.0 + self.bonuses.gold
    }

    /// Objective health restored per simulated second.
    #[must_use]
    pub fn regeneration_per_second(&self) -> f32 {
        self.regeneration
    }

    /// Captures the current progression state.
    #[must_use]
    pub fn snapshot(&self) -> ProgressionSnapshot {
        ProgressionSnapshot {
            level: self.level,
            xp: self.xp,
            xp_to_next: self.xp_to_next,
            ranks: self.ranks,
            evolved: self.evolved,
            modifiers: self.global_modifiers(),
            gold_multiplier: self.gold_multiplier(),
            regeneration_per_second: self.regeneration,
            projectile_modifiers: self.projectile,
            pending_choices: self.pending.clone(),
        }
    }

    /// Credits experience from kills and raises a level-up when the bar fills.
    ///
    /// At most one choice is pending at a time. Experience gathered while a
    /// choice is open keeps accumulating and is re-checked after the selection.
    pub fn handle(
        &mut self,
        events: &[Event],
        towers: &TowerView,
        out: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        for event in events {
            if let Event::EnemyDied { xp_reward, .. } = event {
                self.xp = self.xp.saturating_add(*xp_reward);
                let _ = self.try_level_up(towers, out, out_events);
            }
        }
    }

    /// Applies one of the pending candidates and resumes the simulation.
    ///
    /// Effects on the objective ([`UpgradeKind::FortifyCore`]) are left to the
    /// caller, which receives the applied upgrade.
    pub fn select(
        &mut self,
        index: usize,
        towers: &TowerView,
        out: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) -> Result<Upgrade, SelectionError> {
        let Some(choices) = self.pending.as_ref() else {
            return Err(reject(SelectionError::NoPendingChoice, out_events));
        };
        let Some(upgrade) = choices.get(index).cloned() else {
            return Err(reject(SelectionError::InvalidChoice { index }, out_events));
        };
        self.pending = None;

        debug!("upgrade selected: {}", upgrade.name());
        self.apply(&upgrade, out, out_events);
        out_events.push(Event::UpgradeApplied {
            upgrade: upgrade.clone(),
        });

        if !self.try_level_up(towers, out, out_events) {
            out.push(Command::SetPaused { paused: false });
        }
        Ok(upgrade)
    }

    fn try_level_up(
        &mut self,
        towers: &TowerView,
        out: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) -> bool {
        if self.pending.is_some() || self.xp < self.xp_to_next {
            return false;
        }
        let Some(choices) = self.draw(towers) else {
            warn!("upgrade pool could not supply {} choices", catalog::CHOICE_COUNT);
            return false;
        };

        self.xp -= self.xp_to_next;
        self.xp_to_next = self.xp_to_next.saturating_add(self.xp_increment);
        self.level = self.level.saturating_add(1);
        info!(
            "level {} reached, next level at {} xp",
            self.level, self.xp_to_next
        );

        out_events.push(Event::LevelUp {
            level: self.level,
            progress: progress(self.xp, self.xp_to_next),
        });
        out_events.push(Event::UpgradeChoicesReady {
            choices: choices.clone(),
        });
        self.pending = Some(choices);
        out.push(Command::SetPaused { paused: true });
        true
    }

    /// Shuffles the weighted pool and keeps the first distinct candidates.
    fn draw(&mut self, towers: &TowerView) -> Option<[Upgrade; 3]> {
        let mut pool = self.catalog.weighted_pool(towers);
        pool.shuffle(&mut self.rng);

        let mut picked: Vec<Upgrade> = Vec::with_capacity(catalog::CHOICE_COUNT);
        for candidate in pool {
            if picked.len() == catalog::CHOICE_COUNT {
                break;
            }
            if picked.iter().all(|chosen| chosen.name() != candidate.name()) {
                picked.push(candidate.clone());
            }
        }
        <[Upgrade; 3]>::try_from(picked).ok()
    }

    fn apply(&mut self, upgrade: &Upgrade, out: &mut Vec<Command>, out_events: &mut Vec<Event>) {
        let magnitude = upgrade.magnitude();
        match upgrade.kind() {
            UpgradeKind::TowerDamage => self.raise(|bonuses| bonuses.damage += magnitude, out),
            UpgradeKind::TowerAttackSpeed => {
                self.raise(|bonuses| bonuses.attack_speed += magnitude, out);
            }
            UpgradeKind::TowerRange => self.raise(|bonuses| bonuses.range += magnitude, out),
            UpgradeKind::GoldRush => self.bonuses.gold += magnitude,
            UpgradeKind::Regeneration => self.regeneration += magnitude,
            UpgradeKind::UnlockSlots => out.push(Command::UnlockSlots {
                count: whole(magnitude),
            }),
            UpgradeKind::Piercing => {
                self.projectile.pierce = self.projectile.pierce.saturating_add(whole(magnitude));
                out.push(Command::SetProjectileModifiers {
                    modifiers: self.projectile,
                });
            }
            UpgradeKind::Explosive => {
                self.projectile.explosive = true;
                out.push(Command::SetProjectileModifiers {
                    modifiers: self.projectile,
                });
            }
            UpgradeKind::FortifyCore => {}
            UpgradeKind::ChainLightning
            | UpgradeKind::BiggerBoom
            | UpgradeKind::FrostNova
            | UpgradeKind::LaserBarrage => self.advance_rank(upgrade, out, out_events),
        }
    }

    fn raise(&mut self, adjust: impl FnOnce(&mut Bonuses), out: &mut Vec<Command>) {
        adjust(&mut self.bonuses);
        out.push(Command::SetGlobalModifiers {
            modifiers: self.global_modifiers(),
        });
    }

    /// Ranks the archetype up; the pick that reaches [`MAX_RANK`] evolves it
    /// instead of changing its parameters.
    fn advance_rank(&mut self, upgrade: &Upgrade, out: &mut Vec<Command>, out_events: &mut Vec<Event>) {
        let (Some(archetype), Some(change)) = (upgrade.ranked_archetype(), parameter_change(upgrade))
        else {
            return;
        };
        let slot = archetype.index();

        let rank = self.ranks[slot].saturating_add(1).min(MAX_RANK);
        if rank != self.ranks[slot] {
            self.ranks[slot] = rank;
            out_events.push(Event::ArchetypeRankChanged { archetype, rank });
        }

        if rank >= MAX_RANK && !self.evolved[slot] {
            self.evolved[slot] = true;
            info!("{archetype} towers evolve");
            out.push(Command::UpgradeArchetype {
                archetype,
                upgrade: ArchetypeUpgrade::Evolve,
            });
        } else {
            out.push(Command::UpgradeArchetype {
                archetype,
                upgrade: change,
            });
        }
    }
}

fn parameter_change(upgrade: &Upgrade) -> Option<ArchetypeUpgrade> {
    let magnitude = upgrade.magnitude();
    match upgrade.kind() {
        UpgradeKind::ChainLightning => Some(ArchetypeUpgrade::AddChains(whole(magnitude))),
        UpgradeKind::BiggerBoom => Some(ArchetypeUpgrade::ScaleSplash(1.0 + magnitude)),
        UpgradeKind::FrostNova => Some(ArchetypeUpgrade::AddProjectiles(whole(magnitude))),
        UpgradeKind::LaserBarrage => Some(ArchetypeUpgrade::AddBeams(whole(magnitude))),
        _ => None,
    }
}

fn reject(reason: SelectionError, out_events: &mut Vec<Event>) -> SelectionError {
    warn!("upgrade selection rejected: {reason}");
    out_events.push(Event::UpgradeSelectionRejected { reason });
    reason
}

fn whole(magnitude: f32) -> u32 {
    magnitude.round() as u32
}

fn progress(xp: u32, xp_to_next: u32) -> f32 {
    if xp_to_next == 0 {
        return 0.0;
    }
    xp as f32 / xp_to_next as f32
}
