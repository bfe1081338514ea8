#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that maintains sticky tower targets from world snapshots.
//!
//! A tower keeps its current target for as long as that enemy is alive and
//! within range, even when a closer enemy appears. Once the target is lost the
//! nearest enemy in range is acquired in the same pass; equidistant enemies
//! resolve to the one created first.

use bastion_core::{Command, EnemyId, EnemyView, TowerId, TowerSnapshot, TowerView};

/// Tower targeting system that reuses a scratch buffer between passes.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    scratch: Vec<(TowerId, Option<EnemyId>)>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::SetTowerTarget` for every tower whose target changes.
    ///
    /// Towers that keep their target produce no command.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<Command>) {
        self.scratch.clear();

        for tower in towers.iter() {
            let next = if holds_valid_target(tower, enemies) {
                tower.target
            } else {
                enemies
                    .nearest_within(tower.position, tower.range, |_| true)
                    .map(|enemy| enemy.id)
            };

            if next != tower.target {
                self.scratch.push((tower.id, next));
            }
        }

        out.extend(
            self.scratch
                .drain(..)
                .map(|(tower, target)| Command::SetTowerTarget { tower, target }),
        );
    }
}

/// Reports whether the tower's current target is alive and still in range.
#[must_use]
pub fn holds_valid_target(tower: &TowerSnapshot, enemies: &EnemyView) -> bool {
    tower
        .target
        .and_then(|target| enemies.get(target))
        .is_some_and(|enemy| enemy.position.distance(tower.position) <= tower.range)
}
