use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use bastion_core::{Command, EnemyId, EnemyProfile, TowerId};
use bastion_system_tower_targeting::TowerTargeting;
use bastion_world::{self as world, query, World};
use glam::Vec2;

#[test]
fn deterministic_replay_keeps_sticky_targets_and_reacquires_after_death() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());

    let central = TowerId::new(0);
    let after_spawns = &first.assignments[0];
    assert_eq!(
        after_spawns.target_of(central),
        Some(EnemyId::new(0)),
        "equidistant enemies resolve to the one created first"
    );

    let after_closer_spawn = &first.assignments[2];
    assert_eq!(
        after_closer_spawn.target_of(central),
        Some(EnemyId::new(0)),
        "a closer newcomer must not steal a valid target"
    );

    let after_kill = &first.assignments[3];
    assert_eq!(
        after_kill.target_of(central),
        Some(EnemyId::new(2)),
        "the nearest survivor is acquired once the target dies"
    );
}

fn replay(batches: Vec<Vec<Command>>) -> ReplayOutcome {
    let mut world = World::new();
    let mut targeting = TowerTargeting::new();
    let mut assignments = Vec::new();
    let mut events = Vec::new();

    for batch in batches {
        for command in batch {
            world::apply(&mut world, command, &mut events);
        }

        let mut retarget = Vec::new();
        targeting.handle(
            &query::tower_view(&world),
            &query::enemy_view(&world),
            &mut retarget,
        );
        for command in retarget {
            world::apply(&mut world, command, &mut events);
        }

        assignments.push(TargetSnapshot {
            targets: query::tower_view(&world)
                .iter()
                .map(|tower| (tower.id.get(), tower.target.map(|enemy| enemy.get())))
                .collect(),
        });
    }

    ReplayOutcome {
        events: events.iter().map(|event| format!("{event:?}")).collect(),
        assignments,
    }
}

fn scripted_commands() -> Vec<Vec<Command>> {
    let profile = EnemyProfile {
        max_health: 50,
        speed: 0.0,
        damage: 10,
        gold_reward: 5,
        xp_reward: 10,
    };
    vec![
        vec![
            Command::SpawnEnemy {
                position: Vec2::new(0.0, -200.0),
                profile,
            },
            Command::SpawnEnemy {
                position: Vec2::new(200.0, 0.0),
                profile,
            },
        ],
        vec![Command::Tick {
            dt: Duration::from_millis(16),
        }],
        vec![Command::SpawnEnemy {
            position: Vec2::new(-50.0, 0.0),
            profile,
        }],
        vec![Command::DamageEnemy {
            enemy: EnemyId::new(0),
            amount: 50,
        }],
    ]
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TargetSnapshot {
    targets: Vec<(u32, Option<u32>)>,
}

impl TargetSnapshot {
    fn target_of(&self, tower: TowerId) -> Option<EnemyId> {
        self.targets
            .iter()
            .find(|(id, _)| *id == tower.get())
            .and_then(|(_, target)| target.map(EnemyId::new))
    }
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<String>,
    assignments: Vec<TargetSnapshot>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.events.hash(&mut hasher);
        self.assignments.hash(&mut hasher);
        hasher.finish()
    }
}
