//! Authoritative tower state management utilities.

use std::time::Duration;

use bastion_core::{
    tuning::{ArchetypeTable, TowerStats},
    Archetype, ArchetypeParams, ArchetypeUpgrade, EnemyId, GlobalModifiers, SlotId, TowerId,
    TowerSnapshot,
};
use glam::Vec2;

use crate::registry::Sweepable;

/// State of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Archetype of the tower.
    pub(crate) archetype: Archetype,
    /// Slot hosting the tower.
    pub(crate) slot: SlotId,
    /// Position of the hosting slot.
    pub(crate) position: Vec2,
    /// Time left before the tower may fire again.
    pub(crate) cooldown: Duration,
    /// Weak reference to the current target.
    pub(crate) target: Option<EnemyId>,
}

impl Sweepable for TowerState {
    fn is_retired(&self) -> bool {
        false
    }
}

impl TowerState {
    /// Builds the snapshot of the tower with its archetype profile and global multipliers applied.
    pub(crate) fn snapshot(
        &self,
        profile: &ArchetypeProfile,
        modifiers: &GlobalModifiers,
    ) -> TowerSnapshot {
        let effective = profile.effective_stats(modifiers);
        TowerSnapshot {
            id: self.id,
            archetype: self.archetype,
            slot: self.slot,
            position: self.position,
            damage: effective.damage,
            range: effective.range,
            attacks_per_second: effective.attacks_per_second,
            cooldown: self.cooldown,
            target: self.target,
            params: profile.params,
            evolved: profile.evolved,
        }
    }
}

/// Live parameters shared by every tower of one archetype.
///
/// Towers placed after an upgrade inherit the upgraded profile because the
/// profile is stored once per archetype rather than per tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ArchetypeProfile {
    pub(crate) stats: TowerStats,
    pub(crate) params: ArchetypeParams,
    pub(crate) evolved: bool,
}

impl ArchetypeProfile {
    pub(crate) fn base(table: &ArchetypeTable, archetype: Archetype) -> Self {
        Self {
            stats: table.stats(archetype),
            params: table.base_params(archetype),
            evolved: false,
        }
    }

    /// Base statistics scaled by the global multipliers. Damage is floored.
    pub(crate) fn effective_stats(&self, modifiers: &GlobalModifiers) -> TowerStats {
        TowerStats {
            damage: (self.stats.damage as f32 * modifiers.damage).floor() as u32,
            attacks_per_second: self.stats.attacks_per_second * modifiers.attack_speed,
            range: self.stats.range * modifiers.range,
            cost: self.stats.cost,
        }
    }

    /// Applies an archetype upgrade, reporting whether anything changed.
    pub(crate) fn apply(&mut self, upgrade: ArchetypeUpgrade, table: &ArchetypeTable) -> bool {
        if upgrade == ArchetypeUpgrade::Evolve {
            return self.evolve(table);
        }
        match (upgrade, &mut self.params) {
            (ArchetypeUpgrade::AddChains(extra), ArchetypeParams::Lightning { chain_count, .. }) => {
                *chain_count = chain_count.saturating_add(extra);
                true
            }
            (ArchetypeUpgrade::ScaleSplash(factor), ArchetypeParams::Cannon { splash_radius, .. }) => {
                *splash_radius *= factor;
                true
            }
            (
                ArchetypeUpgrade::AddProjectiles(extra),
                ArchetypeParams::Ice {
                    projectile_count, ..
                },
            ) => {
                *projectile_count = projectile_count.saturating_add(extra);
                true
            }
            (ArchetypeUpgrade::AddBeams(extra), ArchetypeParams::Laser { extra_beams }) => {
                *extra_beams = extra_beams.saturating_add(extra);
                true
            }
            _ => false,
        }
    }

    fn evolve(&mut self, table: &ArchetypeTable) -> bool {
        if self.evolved {
            return false;
        }
        self.evolved = true;
        match &mut self.params {
            ArchetypeParams::Arrow { .. } => {}
            ArchetypeParams::Cannon { splash_radius, .. } => {
                *splash_radius = table.cannon.evolved_splash_radius;
            }
            ArchetypeParams::Ice { .. } => {
                self.stats.attacks_per_second = table.ice.evolved_attacks_per_second;
            }
            ArchetypeParams::Laser { .. } => {
                self.stats.attacks_per_second = table.laser.evolved_attacks_per_second;
            }
            ArchetypeParams::Lightning { chain_count, .. } => {
                *chain_count = table.lightning.evolved_chain_count;
            }
        }
        true
    }
}
