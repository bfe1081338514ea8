//! In-flight projectile state.

use bastion_core::{EnemyId, ProjectileId, ProjectilePayload, ProjectileSnapshot, TowerId};
use glam::Vec2;

use crate::registry::Sweepable;

#[derive(Clone, Debug)]
pub(crate) struct ProjectileState {
    pub(crate) id: ProjectileId,
    pub(crate) tower: TowerId,
    pub(crate) position: Vec2,
    pub(crate) target: EnemyId,
    pub(crate) damage: u32,
    pub(crate) speed: f32,
    pub(crate) payload: ProjectilePayload,
    pub(crate) pierce_remaining: u32,
    pub(crate) explosive: bool,
    pub(crate) struck: Vec<EnemyId>,
    pub(crate) retired: bool,
}

impl Sweepable for ProjectileState {
    fn is_retired(&self) -> bool {
        self.retired
    }
}

impl ProjectileState {
    /// Records the current target as struck and pursues `next`, spending one pierce charge.
    pub(crate) fn retarget(&mut self, next: EnemyId) -> bool {
        if self.retired || self.pierce_remaining == 0 {
            return false;
        }
        self.struck.push(self.target);
        self.target = next;
        self.pierce_remaining -= 1;
        true
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            tower: self.tower,
            position: self.position,
            target: self.target,
            damage: self.damage,
            speed: self.speed,
            payload: self.payload,
            pierce_remaining: self.pierce_remaining,
            explosive: self.explosive,
            struck: self.struck.clone(),
        }
    }
}
