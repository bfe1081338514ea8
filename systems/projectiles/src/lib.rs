#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that flies homing projectiles and resolves their hits.
//!
//! Projectiles re-read their target's live position every tick. A projectile
//! whose target died, escaped or was doomed earlier in the same batch is
//! retired without effect.

use std::time::Duration;

use bastion_core::{
    tuning::ArenaTuning, Command, DamageLedger, EnemySnapshot, EnemyView, Event,
    ProjectilePayload, ProjectileSnapshot, ProjectileView,
};
use glam::Vec2;
use log::trace;

/// Configuration parameters required to construct the projectile system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    hit_threshold: f32,
    pierce_retarget_range: f32,
    explosive_radius: f32,
}

impl Config {
    /// Creates a new configuration from explicit distances.
    #[must_use]
    pub const fn new(hit_threshold: f32, pierce_retarget_range: f32, explosive_radius: f32) -> Self {
        Self {
            hit_threshold,
            pierce_retarget_range,
            explosive_radius,
        }
    }

    /// Creates a configuration from arena tuning.
    #[must_use]
    pub fn from_tuning(arena: &ArenaTuning) -> Self {
        Self::new(
            arena.hit_threshold,
            arena.pierce_retarget_range,
            arena.explosive_radius,
        )
    }
}

/// Projectile system that moves projectiles and dispatches hit effects.
#[derive(Debug)]
pub struct Projectiles {
    config: Config,
    ledger: DamageLedger,
}

impl Projectiles {
    /// Creates a new projectile system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ledger: DamageLedger::new(),
        }
    }

    /// Consumes the tick's events and current views to emit projectile commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        projectiles: &ProjectileView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        let dt = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if dt.is_zero() {
            return;
        }

        self.ledger.clear();
        for projectile in projectiles.iter() {
            let target = enemies
                .get(projectile.target)
                .filter(|target| !self.ledger.is_doomed(target));
            let Some(target) = target else {
                trace!("projectile {} lost its target", projectile.id.get());
                out.push(Command::RetireProjectile {
                    projectile: projectile.id,
                });
                continue;
            };

            let position = home_in(
                projectile.position,
                target.position,
                projectile.speed * dt.as_secs_f32(),
            );
            out.push(Command::MoveProjectile {
                projectile: projectile.id,
                position,
            });

            if position.distance(target.position) < self.config.hit_threshold {
                self.resolve_hit(projectile, target, enemies, out);
            }
        }
    }

    fn resolve_hit(
        &mut self,
        projectile: &ProjectileSnapshot,
        target: &EnemySnapshot,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        let impact = target.position;
        let _ = self.ledger.strike(target, projectile.damage, out);

        match projectile.payload {
            ProjectilePayload::Direct => {}
            ProjectilePayload::Splash { radius } => {
                self.splash(impact, radius, projectile.damage, target, enemies, out);
            }
            ProjectilePayload::Frost {
                multiplier,
                duration,
            } => {
                out.push(Command::SlowEnemy {
                    enemy: target.id,
                    multiplier,
                    duration,
                });
            }
        }
        let splashes = matches!(projectile.payload, ProjectilePayload::Splash { .. });
        if projectile.explosive && !splashes {
            let radius = self.config.explosive_radius;
            self.splash(impact, radius, projectile.damage, target, enemies, out);
        }

        let follow_up = if projectile.pierce_remaining > 0 {
            let ledger = &self.ledger;
            enemies
                .nearest_within(impact, self.config.pierce_retarget_range, |enemy| {
                    enemy.id != target.id
                        && !projectile.struck.contains(&enemy.id)
                        && !ledger.is_doomed(enemy)
                })
                .map(|enemy| enemy.id)
        } else {
            None
        };
        out.push(match follow_up {
            Some(next) => Command::RetargetProjectile {
                projectile: projectile.id,
                target: next,
            },
            None => Command::RetireProjectile {
                projectile: projectile.id,
            },
        });
    }

    fn splash(
        &mut self,
        impact: Vec2,
        radius: f32,
        damage: u32,
        target: &EnemySnapshot,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        for enemy in enemies.within(impact, radius) {
            if enemy.id == target.id {
                continue;
            }
            let amount = splash_damage(damage, enemy.position.distance(impact), radius);
            let _ = self.ledger.strike(enemy, amount, out);
        }
    }
}

/// Moves `from` toward `to` by at most `step`, never overshooting.
#[must_use]
pub fn home_in(from: Vec2, to: Vec2, step: f32) -> Vec2 {
    let offset = to - from;
    let distance = offset.length();
    if distance <= step || distance == 0.0 {
        to
    } else {
        from + offset / distance * step
    }
}

/// Splash damage at `distance` from the impact: full at the centre, half at the edge.
#[must_use]
pub fn splash_damage(damage: u32, distance: f32, radius: f32) -> u32 {
    if radius <= 0.0 {
        return 0;
    }
    let falloff = 1.0 - 0.5 * f64::from((distance / radius).clamp(0.0, 1.0));
    (f64::from(damage) * falloff).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{EnemyId, ProjectileId, TowerId};

    fn system() -> Projectiles {
        Projectiles::new(Config::new(10.0, 150.0, 40.0))
    }

    fn projectile(position: Vec2, payload: ProjectilePayload) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: ProjectileId::new(0),
            tower: TowerId::new(0),
            position,
            target: EnemyId::new(0),
            damage: 20,
            speed: 400.0,
            payload,
            pierce_remaining: 0,
            explosive: false,
            struck: Vec::new(),
        }
    }

    fn enemy(id: u32, x: f32, health: u32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            position: Vec2::new(x, 0.0),
            health,
            max_health: health,
            speed: 80.0,
            slow: None,
        }
    }

    fn tick(millis: u64) -> [Event; 1] {
        [Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }]
    }

    fn run(projectile: ProjectileSnapshot, enemies: Vec<EnemySnapshot>) -> Vec<Command> {
        let mut out = Vec::new();
        system().handle(
            &tick(100),
            &ProjectileView::from_snapshots(vec![projectile]),
            &EnemyView::from_snapshots(enemies),
            &mut out,
        );
        out
    }

    fn damage(out: &[Command]) -> Vec<(u32, u32)> {
        out.iter()
            .filter_map(|command| match command {
                Command::DamageEnemy { enemy, amount } => Some((enemy.get(), *amount)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn splash_edge_takes_exactly_half() {
        assert_eq!(splash_damage(40, 0.0, 80.0), 40);
        assert_eq!(splash_damage(40, 80.0, 80.0), 20);
        assert_eq!(splash_damage(40, 40.0, 80.0), 30);
        assert!(splash_damage(25, 0.0, 80.0) >= splash_damage(25, 80.0, 80.0));
    }

    #[test]
    fn homing_never_overshoots() {
        assert_eq!(home_in(Vec2::ZERO, Vec2::new(5.0, 0.0), 40.0), Vec2::new(5.0, 0.0));
        assert_eq!(home_in(Vec2::ZERO, Vec2::new(100.0, 0.0), 40.0), Vec2::new(40.0, 0.0));
    }

    #[test]
    fn projectile_in_flight_only_moves() {
        let out = run(
            projectile(Vec2::ZERO, ProjectilePayload::Direct),
            vec![enemy(0, 200.0, 50)],
        );
        assert_eq!(
            out,
            vec![Command::MoveProjectile {
                projectile: ProjectileId::new(0),
                position: Vec2::new(40.0, 0.0),
            }]
        );
    }

    #[test]
    fn lost_target_retires_without_effect() {
        let out = run(
            projectile(Vec2::ZERO, ProjectilePayload::Direct),
            vec![enemy(1, 30.0, 50)],
        );
        assert_eq!(
            out,
            vec![Command::RetireProjectile {
                projectile: ProjectileId::new(0),
            }]
        );
    }

    #[test]
    fn paused_frames_do_nothing() {
        let mut out = Vec::new();
        system().handle(
            &[],
            &ProjectileView::from_snapshots(vec![projectile(Vec2::ZERO, ProjectilePayload::Direct)]),
            &EnemyView::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn direct_hit_damages_and_retires() {
        let out = run(
            projectile(Vec2::new(190.0, 0.0), ProjectilePayload::Direct),
            vec![enemy(0, 200.0, 50), enemy(1, 210.0, 50)],
        );
        assert_eq!(damage(&out), vec![(0, 20)]);
        assert_eq!(
            out.last(),
            Some(&Command::RetireProjectile {
                projectile: ProjectileId::new(0),
            })
        );
    }

    #[test]
    fn splash_uses_impact_point_and_spares_the_target_a_second_hit() {
        let out = run(
            projectile(Vec2::new(195.0, 0.0), ProjectilePayload::Splash { radius: 80.0 }),
            vec![
                enemy(0, 200.0, 100),
                enemy(1, 240.0, 100),
                enemy(2, 280.0, 100),
                enemy(3, 300.0, 100),
            ],
        );
        assert_eq!(damage(&out), vec![(0, 20), (1, 15), (2, 10)]);
    }

    #[test]
    fn frost_hit_slows_the_target() {
        let payload = ProjectilePayload::Frost {
            multiplier: 0.5,
            duration: Duration::from_secs(2),
        };
        let out = run(projectile(Vec2::new(195.0, 0.0), payload), vec![enemy(0, 200.0, 100)]);
        assert!(out.contains(&Command::SlowEnemy {
            enemy: EnemyId::new(0),
            multiplier: 0.5,
            duration: Duration::from_secs(2),
        }));
    }

    #[test]
    fn explosive_rounds_splash_direct_hits() {
        let mut round = projectile(Vec2::new(195.0, 0.0), ProjectilePayload::Direct);
        round.explosive = true;
        let out = run(round, vec![enemy(0, 200.0, 100), enemy(1, 220.0, 100)]);
        assert_eq!(damage(&out), vec![(0, 20), (1, 15)]);
    }

    #[test]
    fn piercing_projectile_moves_on_to_an_unstruck_enemy() {
        let mut arrow = projectile(Vec2::new(195.0, 0.0), ProjectilePayload::Direct);
        arrow.pierce_remaining = 1;
        arrow.struck = vec![EnemyId::new(1)];
        let out = run(
            arrow,
            vec![enemy(0, 200.0, 100), enemy(1, 210.0, 100), enemy(2, 260.0, 100)],
        );
        assert_eq!(
            out.last(),
            Some(&Command::RetargetProjectile {
                projectile: ProjectileId::new(0),
                target: EnemyId::new(2),
            })
        );
    }

    #[test]
    fn second_projectile_on_a_doomed_target_is_discarded() {
        let mut first = projectile(Vec2::new(195.0, 0.0), ProjectilePayload::Direct);
        first.id = ProjectileId::new(0);
        let mut second = first.clone();
        second.id = ProjectileId::new(1);
        let mut out = Vec::new();
        system().handle(
            &tick(16),
            &ProjectileView::from_snapshots(vec![first, second]),
            &EnemyView::from_snapshots(vec![enemy(0, 200.0, 20)]),
            &mut out,
        );
        assert_eq!(damage(&out), vec![(0, 20)]);
        assert!(out.contains(&Command::RetireProjectile {
            projectile: ProjectileId::new(1),
        }));
    }
}
