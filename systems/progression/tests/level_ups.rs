use bastion_core::{
    tuning::ProgressionTuning, Archetype, Command, EnemyId, Event, SlotId, TowerView,
};
use bastion_system_progression::{Catalog, Config, Progression, MAX_RANK};
use bastion_world::{self as world, query, World};
use glam::Vec2;

fn field(archetype: Archetype, count: u32) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    for slot in 0..count {
        world::apply(
            &mut world,
            Command::PlaceTower {
                archetype,
                slot: SlotId::new(slot),
            },
            &mut events,
        );
    }
    world
}

fn kill() -> Event {
    Event::EnemyDied {
        enemy: EnemyId::new(0),
        position: Vec2::ZERO,
        gold_reward: 5,
        xp_reward: 100_000,
    }
}

/// Levels up repeatedly, always preferring the named upgrade when offered.
fn play(world: &mut World, seed: u64, prefer: &str, levels: usize) -> (Progression, Vec<Event>) {
    let mut engine = Progression::new(
        Config::new(ProgressionTuning::default(), seed),
        Catalog::standard().expect("standard catalog"),
    );
    let mut log = Vec::new();

    for _ in 0..levels {
        let towers: TowerView = query::tower_view(world);
        let mut commands = Vec::new();
        let mut events = Vec::new();
        engine.handle(&[kill()], &towers, &mut commands, &mut events);

        let choices = engine.pending_choices().expect("level-up offers choices");
        let index = choices
            .iter()
            .position(|upgrade| upgrade.name() == prefer)
            .unwrap_or(0);
        let _ = engine
            .select(index, &towers, &mut commands, &mut events)
            .expect("valid selection");

        for command in commands {
            world::apply(world, command, &mut events);
        }
        log.extend(events);
    }
    (engine, log)
}

#[test]
fn gated_upgrades_are_never_offered_below_three_towers() {
    let mut world = field(Archetype::Lightning, 2);
    let (_, log) = play(&mut world, 9, "Chain Lightning+", 60);
    for event in &log {
        if let Event::UpgradeChoicesReady { choices } = event {
            assert!(
                choices.iter().all(|upgrade| upgrade.required_archetype().is_none()),
                "gated upgrade offered with two lightning towers: {choices:?}"
            );
        }
    }
}

#[test]
fn lightning_evolves_once_after_three_ranks() {
    let mut world = field(Archetype::Lightning, 3);
    let (engine, log) = play(&mut world, 10, "Chain Lightning+", 120);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.rank(Archetype::Lightning), MAX_RANK);
    assert!(snapshot.is_evolved(Archetype::Lightning));
    assert!(query::is_evolved(&world, Archetype::Lightning));

    let evolutions = log
        .iter()
        .filter(|event| matches!(event, Event::ArchetypeEvolved { .. }))
        .count();
    assert_eq!(evolutions, 1, "evolution must happen exactly once");

    let picks = log
        .iter()
        .filter(|event| {
            matches!(event, Event::UpgradeApplied { upgrade } if upgrade.name() == "Chain Lightning+")
        })
        .count();
    assert!(picks > 3, "expected repeated picks after evolution, got {picks}");
}

#[test]
fn same_seed_offers_identical_choices() {
    let run = || {
        let mut world = field(Archetype::Cannon, 3);
        play(&mut world, 77, "Bigger Boom", 30).1
    };
    assert_eq!(run(), run());
}
