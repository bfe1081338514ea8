//! Damage bookkeeping for a single command batch.
//!
//! Systems emit damage as commands that the world applies afterwards, so the
//! enemy views they read do not yet reflect hits issued earlier in the same
//! batch. The ledger tracks that pending damage so an enemy already doomed by
//! a previous hit is not chosen again as a chain hop, extra beam or target.

use std::collections::BTreeMap;

use crate::{Command, EnemyId, EnemySnapshot};

/// Damage issued during the current batch, keyed by enemy.
#[derive(Clone, Debug, Default)]
pub struct DamageLedger {
    pending: BTreeMap<EnemyId, u32>,
}

impl DamageLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every pending hit. Call once per batch.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Damage issued against the enemy during the current batch.
    #[must_use]
    pub fn pending(&self, enemy: EnemyId) -> u32 {
        self.pending.get(&enemy).copied().unwrap_or(0)
    }

    /// Reports whether pending damage already covers the enemy's remaining health.
    #[must_use]
    pub fn is_doomed(&self, enemy: &EnemySnapshot) -> bool {
        self.pending(enemy.id) >= enemy.health
    }

    /// Emits `Command::DamageEnemy` unless the enemy is already doomed.
    ///
    /// Returns whether the hit was issued. Zero-damage hits are not issued but
    /// still report success so chains keep walking.
    pub fn strike(&mut self, enemy: &EnemySnapshot, amount: u32, out: &mut Vec<Command>) -> bool {
        if self.is_doomed(enemy) {
            return false;
        }
        if amount > 0 {
            let entry = self.pending.entry(enemy.id).or_insert(0);
            *entry = entry.saturating_add(amount);
            out.push(Command::DamageEnemy {
                enemy: enemy.id,
                amount,
            });
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn enemy(health: u32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(1),
            position: Vec2::ZERO,
            health,
            max_health: 50,
            speed: 80.0,
            slow: None,
        }
    }

    #[test]
    fn doomed_enemies_are_not_struck_again() {
        let mut ledger = DamageLedger::new();
        let mut out = Vec::new();
        let target = enemy(30);
        assert!(ledger.strike(&target, 20, &mut out));
        assert!(ledger.strike(&target, 20, &mut out));
        assert!(!ledger.strike(&target, 20, &mut out));
        assert_eq!(out.len(), 2);
        assert_eq!(ledger.pending(target.id), 40);
    }

    #[test]
    fn clearing_resets_pending_damage() {
        let mut ledger = DamageLedger::new();
        let mut out = Vec::new();
        let target = enemy(10);
        assert!(ledger.strike(&target, 10, &mut out));
        assert!(ledger.is_doomed(&target));
        ledger.clear();
        assert!(!ledger.is_doomed(&target));
    }
}
