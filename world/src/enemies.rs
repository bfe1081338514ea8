//! Enemy state and per-tick movement.

use std::time::Duration;

use bastion_core::{EnemyId, EnemyProfile, EnemySnapshot, SlowEffect};
use glam::Vec2;

use crate::registry::Sweepable;

/// Lifecycle of an enemy. Both terminal states are mutually exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnemyStatus {
    Alive,
    Dead,
    Escaped,
}

#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    pub(crate) id: EnemyId,
    pub(crate) position: Vec2,
    pub(crate) health: u32,
    pub(crate) profile: EnemyProfile,
    pub(crate) slow: Option<SlowEffect>,
    pub(crate) status: EnemyStatus,
}

impl Sweepable for EnemyState {
    fn is_retired(&self) -> bool {
        self.status != EnemyStatus::Alive
    }
}

/// Result of moving an enemy for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Movement {
    Walking,
    Reached,
}

/// Result of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    Ignored,
    Wounded { remaining: u32 },
    Killed,
}

impl EnemyState {
    pub(crate) fn spawn(id: EnemyId, position: Vec2, profile: EnemyProfile) -> Self {
        Self {
            id,
            position,
            health: profile.max_health,
            profile,
            slow: None,
            status: EnemyStatus::Alive,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.status == EnemyStatus::Alive
    }

    /// Removes health, transitioning to dead exactly once.
    pub(crate) fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::Ignored;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.status = EnemyStatus::Dead;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded {
                remaining: self.health,
            }
        }
    }

    /// Replaces any active slow effect.
    pub(crate) fn apply_slow(&mut self, multiplier: f32, duration: Duration) {
        if self.is_alive() {
            self.slow = Some(SlowEffect {
                multiplier,
                remaining: duration,
            });
        }
    }

    /// Walks toward the objective, consuming slow time as it goes.
    pub(crate) fn advance(&mut self, objective: Vec2, reach_radius: f32, dt: Duration) -> Movement {
        let multiplier = self.slow.map_or(1.0, |slow| slow.multiplier);
        if let Some(slow) = self.slow.as_mut() {
            slow.remaining = slow.remaining.saturating_sub(dt);
            if slow.remaining.is_zero() {
                self.slow = None;
            }
        }

        let offset = objective - self.position;
        let distance = offset.length();
        let step = self.profile.speed * multiplier * dt.as_secs_f32();
        if distance > 0.0 {
            self.position += offset / distance * step.min(distance);
        }

        if self.position.distance(objective) < reach_radius {
            self.status = EnemyStatus::Escaped;
            Movement::Reached
        } else {
            Movement::Walking
        }
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            position: self.position,
            health: self.health,
            max_health: self.profile.max_health,
            speed: self.profile.speed,
            slow: self.slow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grunt(position: Vec2) -> EnemyState {
        EnemyState::spawn(
            EnemyId::new(0),
            position,
            EnemyProfile {
                max_health: 50,
                speed: 80.0,
                damage: 10,
                gold_reward: 5,
                xp_reward: 10,
            },
        )
    }

    #[test]
    fn damage_kills_exactly_once() {
        let mut enemy = grunt(Vec2::new(100.0, 0.0));
        assert_eq!(enemy.take_damage(15), DamageOutcome::Wounded { remaining: 35 });
        assert_eq!(enemy.take_damage(20), DamageOutcome::Wounded { remaining: 15 });
        assert_eq!(enemy.take_damage(20), DamageOutcome::Killed);
        assert_eq!(enemy.health, 0);
        assert_eq!(enemy.take_damage(20), DamageOutcome::Ignored);
    }

    #[test]
    fn slowed_enemy_walks_at_reduced_speed() {
        let mut enemy = grunt(Vec2::new(400.0, 0.0));
        enemy.apply_slow(0.5, Duration::from_secs(2));
        let _ = enemy.advance(Vec2::ZERO, 20.0, Duration::from_secs(1));
        assert!((enemy.position.x - 360.0).abs() < 1e-3);
        assert!(enemy.slow.is_some());

        let _ = enemy.advance(Vec2::ZERO, 20.0, Duration::from_secs(1));
        assert!((enemy.position.x - 320.0).abs() < 1e-3);
        assert!(enemy.slow.is_none(), "slow expires once its timer runs out");
    }

    #[test]
    fn latest_slow_overwrites_previous_one() {
        let mut enemy = grunt(Vec2::new(400.0, 0.0));
        enemy.apply_slow(0.5, Duration::from_secs(2));
        enemy.apply_slow(0.8, Duration::from_millis(500));
        assert_eq!(
            enemy.slow,
            Some(SlowEffect {
                multiplier: 0.8,
                remaining: Duration::from_millis(500),
            })
        );
    }

    #[test]
    fn reaching_the_objective_escapes() {
        let mut enemy = grunt(Vec2::new(30.0, 0.0));
        assert_eq!(
            enemy.advance(Vec2::ZERO, 20.0, Duration::from_millis(500)),
            Movement::Reached
        );
        assert!(!enemy.is_alive());
        assert_eq!(enemy.take_damage(5), DamageOutcome::Ignored);
    }
}
