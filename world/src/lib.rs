#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Bastion.
//!
//! The world owns every enemy, tower, projectile and placement slot. It is
//! mutated exclusively through [`apply`] and observed through [`query`].
//! Entities that die or retire mid-tick are flagged and stay in their
//! registries until the sweep at the start of the next unpaused tick.

mod enemies;
mod projectiles;
mod registry;
mod slots;
mod towers;

use std::time::Duration;

use bastion_core::{
    tuning::{ArchetypeTable, ArenaTuning},
    Archetype, Command, EnemyId, Event, GlobalModifiers, ProjectileId, ProjectileModifiers,
    SlotId, TowerId, Tuning,
};
use glam::Vec2;
use log::{debug, info, trace};

use enemies::{DamageOutcome, EnemyState, Movement};
use projectiles::ProjectileState;
use registry::Registry;
use slots::SlotState;
use towers::{ArchetypeProfile, TowerState};

/// Represents the authoritative Bastion world state.
#[derive(Debug)]
pub struct World {
    arena: ArenaTuning,
    table: ArchetypeTable,
    objective: Vec2,
    paused: bool,
    highlight_active: bool,
    elapsed: Duration,
    tick_index: u64,
    wave: u32,
    campaign_complete: bool,
    enemies: Registry<EnemyId, EnemyState>,
    towers: Registry<TowerId, TowerState>,
    projectiles: Registry<ProjectileId, ProjectileState>,
    slots: Vec<SlotState>,
    profiles: [ArchetypeProfile; 5],
    global_modifiers: GlobalModifiers,
    projectile_modifiers: ProjectileModifiers,
}

impl World {
    /// Creates a world with the canonical tuning and the objective at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tuning(&Tuning::default(), Vec2::ZERO)
    }

    /// Creates a world from the provided tuning around the provided objective.
    ///
    /// The central slot receives the free starting Arrow tower.
    #[must_use]
    pub fn with_tuning(tuning: &Tuning, objective: Vec2) -> Self {
        let table = tuning.towers.clone();
        let profiles = Archetype::ALL.map(|archetype| ArchetypeProfile::base(&table, archetype));
        let mut world = Self {
            slots: slots::diamond(
                objective,
                tuning.arena.cell_size,
                tuning.arena.initially_unlocked_slots,
            ),
            arena: tuning.arena.clone(),
            table,
            objective,
            paused: false,
            highlight_active: false,
            elapsed: Duration::ZERO,
            tick_index: 0,
            wave: 0,
            campaign_complete: false,
            enemies: Registry::new(),
            towers: Registry::new(),
            projectiles: Registry::new(),
            profiles,
            global_modifiers: GlobalModifiers::default(),
            projectile_modifiers: ProjectileModifiers::default(),
        };
        if let Some(index) = world.slots.iter().position(|slot| slot.central) {
            let _ = world.construct_tower(Archetype::Arrow, index);
        }
        world
    }

    fn construct_tower(&mut self, archetype: Archetype, slot_index: usize) -> TowerId {
        let slot = &mut self.slots[slot_index];
        let (slot_id, position) = (slot.id, slot.position);
        let tower = self.towers.insert_with(|id| TowerState {
            id,
            archetype,
            slot: slot_id,
            position,
            cooldown: Duration::ZERO,
            target: None,
        });
        slot.occupant = Some(tower);
        tower
    }

    fn profile(&self, archetype: Archetype) -> &ArchetypeProfile {
        &self.profiles[archetype.index()]
    }

    fn slot_index(&self, slot: SlotId) -> Option<usize> {
        let index = usize::try_from(slot.get()).ok()?;
        (index < self.slots.len()).then_some(index)
    }

    fn sweep(&mut self) {
        let enemies = self.enemies.sweep();
        let projectiles = self.projectiles.sweep();
        if enemies > 0 || projectiles > 0 {
            trace!(
                "tick {}: swept {enemies} enemies and {projectiles} projectiles, {} enemies remain",
                self.tick_index,
                self.enemies.len()
            );
        }
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.sweep();
        self.tick_index = self.tick_index.saturating_add(1);
        self.elapsed = self.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        for tower in self.towers.iter_mut() {
            tower.cooldown = tower.cooldown.saturating_sub(dt);
        }

        let objective = self.objective;
        let reach_radius = self.arena.reach_radius;
        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
            if enemy.advance(objective, reach_radius, dt) == Movement::Reached {
                out_events.push(Event::EnemyReachedObjective {
                    enemy: enemy.id,
                    damage: enemy.profile.damage,
                });
            }
        }
    }

    fn damage_enemy(&mut self, enemy: EnemyId, amount: u32, out_events: &mut Vec<Event>) -> bool {
        let Some(state) = self.enemies.get_mut(enemy) else {
            return false;
        };
        match state.take_damage(amount) {
            DamageOutcome::Ignored => false,
            DamageOutcome::Wounded { remaining } => {
                out_events.push(Event::EnemyDamaged {
                    enemy,
                    amount,
                    remaining,
                });
                true
            }
            DamageOutcome::Killed => {
                out_events.push(Event::EnemyDamaged {
                    enemy,
                    amount,
                    remaining: 0,
                });
                out_events.push(Event::EnemyDied {
                    enemy,
                    position: state.position,
                    gold_reward: state.profile.gold_reward,
                    xp_reward: state.profile.xp_reward,
                });
                true
            }
        }
    }

    fn place_tower(
        &mut self,
        archetype: Archetype,
        slot: SlotId,
        out_events: &mut Vec<Event>,
    ) {
        let checked = match self.slot_index(slot) {
            Some(index) => self.slots[index].check_placement().map(|()| index),
            None => Err(bastion_core::PlacementError::UnknownSlot),
        };
        match checked {
            Ok(index) => {
                let tower = self.construct_tower(archetype, index);
                info!("placed {archetype} tower {} in slot {}", tower.get(), slot.get());
                out_events.push(Event::TowerPlaced {
                    tower,
                    archetype,
                    slot,
                });
            }
            Err(reason) => {
                debug!("rejected {archetype} tower in slot {}: {reason}", slot.get());
                out_events.push(Event::TowerPlacementRejected {
                    archetype,
                    slot,
                    reason,
                });
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            if !world.paused {
                world.advance(dt, out_events);
            }
        }
        Command::SetPaused { paused } => {
            if world.paused != paused {
                world.paused = paused;
                out_events.push(Event::PauseChanged { paused });
            }
        }
        Command::PlaceTower { archetype, slot } => {
            world.place_tower(archetype, slot, out_events);
        }
        Command::SetPlacementHighlight { active } => {
            world.highlight_active = active;
        }
        Command::UnlockSlots { count } => {
            let locked = world.slots.iter_mut().filter(|slot| !slot.unlocked);
            for slot in locked.take(count as usize) {
                slot.unlocked = true;
                debug!("unlocked slot {}", slot.id.get());
                out_events.push(Event::SlotUnlocked { slot: slot.id });
            }
        }
        Command::StartWave { wave, enemy_count } => {
            world.wave = wave;
            out_events.push(Event::WaveStarted { wave, enemy_count });
        }
        Command::SpawnEnemy { position, profile } => {
            let enemy = world
                .enemies
                .insert_with(|id| EnemyState::spawn(id, position, profile));
            out_events.push(Event::EnemySpawned { enemy, position });
        }
        Command::CompleteWave { wave, bonus_gold } => {
            out_events.push(Event::WaveCompleted { wave, bonus_gold });
        }
        Command::CompleteCampaign => {
            if !world.campaign_complete {
                world.campaign_complete = true;
                out_events.push(Event::AllWavesCompleted);
            }
        }
        Command::SetTowerTarget { tower, target } => {
            if let Some(state) = world.towers.get_mut(tower) {
                state.target = target;
            }
        }
        Command::FireTower { tower, target } => {
            let target_alive = world
                .enemies
                .get(target)
                .is_some_and(EnemyState::is_alive);
            let Some(state) = world.towers.get(tower) else {
                return;
            };
            if !state.cooldown.is_zero() || !target_alive {
                return;
            }
            let archetype = state.archetype;
            let rate = world
                .profile(archetype)
                .effective_stats(&world.global_modifiers)
                .attacks_per_second;
            if let Some(state) = world.towers.get_mut(tower) {
                state.cooldown = Duration::from_secs_f32(1.0 / rate);
                state.target = Some(target);
            }
            out_events.push(Event::TowerFired {
                tower,
                archetype,
                target,
            });
        }
        Command::LaunchProjectile {
            tower,
            target,
            damage,
            speed,
            payload,
        } => {
            let Some(origin) = world.towers.get(tower).map(|state| state.position) else {
                return;
            };
            if !world.enemies.get(target).is_some_and(EnemyState::is_alive) {
                return;
            }
            let modifiers = world.projectile_modifiers;
            let projectile = world.projectiles.insert_with(|id| ProjectileState {
                id,
                tower,
                position: origin,
                target,
                damage,
                speed,
                payload,
                pierce_remaining: modifiers.pierce,
                explosive: modifiers.explosive,
                struck: Vec::new(),
                retired: false,
            });
            out_events.push(Event::ProjectileLaunched {
                projectile,
                tower,
                target,
            });
        }
        Command::MoveProjectile {
            projectile,
            position,
        } => {
            if let Some(state) = world.projectiles.get_mut(projectile) {
                state.position = position;
            }
        }
        Command::RetargetProjectile { projectile, target } => {
            if let Some(state) = world.projectiles.get_mut(projectile) {
                let _ = state.retarget(target);
            }
        }
        Command::RetireProjectile { projectile } => {
            if let Some(state) = world.projectiles.get_mut(projectile) {
                if !state.retired {
                    state.retired = true;
                    out_events.push(Event::ProjectileRetired { projectile });
                }
            }
        }
        Command::DamageEnemy { enemy, amount } => {
            let _ = world.damage_enemy(enemy, amount, out_events);
        }
        Command::SlowEnemy {
            enemy,
            multiplier,
            duration,
        } => {
            if let Some(state) = world.enemies.get_mut(enemy) {
                state.apply_slow(multiplier, duration);
            }
        }
        Command::SkyStrike { enemy, damage } => {
            let mut strike_events = Vec::new();
            if world.damage_enemy(enemy, damage, &mut strike_events) {
                out_events.push(Event::SkyStruck { enemy, damage });
            }
            out_events.append(&mut strike_events);
        }
        Command::SetGlobalModifiers { modifiers } => {
            world.global_modifiers = modifiers;
            out_events.push(Event::GlobalModifiersChanged { modifiers });
        }
        Command::SetProjectileModifiers { modifiers } => {
            world.projectile_modifiers = modifiers;
        }
        Command::UpgradeArchetype { archetype, upgrade } => {
            let table = &world.table;
            let profile = &mut world.profiles[archetype.index()];
            let was_evolved = profile.evolved;
            if !profile.apply(upgrade, table) {
                return;
            }
            if !was_evolved && profile.evolved {
                info!("{archetype} towers evolved");
                out_events.push(Event::ArchetypeEvolved { archetype });
            } else {
                out_events.push(Event::ArchetypeUpgraded { archetype, upgrade });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use bastion_core::{
        Archetype, EnemyView, GlobalModifiers, PlacementError, ProjectileModifiers,
        ProjectileView, SlotId, SlotSnapshot, TowerView,
    };
    use glam::Vec2;

    use super::World;

    /// Captures a read-only view of every live enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .filter(|enemy| enemy.is_alive())
                .map(|enemy| enemy.snapshot())
                .collect(),
        )
    }

    /// Captures a read-only view of every placed tower with effective statistics.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| {
                    tower.snapshot(world.profile(tower.archetype), &world.global_modifiers)
                })
                .collect(),
        )
    }

    /// Captures a read-only view of every projectile still in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .filter(|projectile| !projectile.retired)
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Captures every placement slot in layout order.
    #[must_use]
    pub fn slots(world: &World) -> Vec<SlotSnapshot> {
        world
            .slots
            .iter()
            .map(|slot| slot.snapshot(world.highlight_active))
            .collect()
    }

    /// Captures a single placement slot.
    #[must_use]
    pub fn slot(world: &World, slot: SlotId) -> Option<SlotSnapshot> {
        world
            .slot_index(slot)
            .map(|index| world.slots[index].snapshot(world.highlight_active))
    }

    /// Reports whether a tower could be placed in the slot right now.
    pub fn placement_check(world: &World, slot: SlotId) -> Result<(), PlacementError> {
        world
            .slot_index(slot)
            .ok_or(PlacementError::UnknownSlot)
            .and_then(|index| world.slots[index].check_placement())
    }

    /// Position every enemy walks toward.
    #[must_use]
    pub fn objective(world: &World) -> Vec2 {
        world.objective
    }

    /// Reports whether the simulation clock is frozen.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Simulated time accumulated by unpaused ticks.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Number of unpaused ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Most recently started wave, or zero before the first wave.
    #[must_use]
    pub fn current_wave(world: &World) -> u32 {
        world.wave
    }

    /// Reports whether the final wave has been cleared.
    #[must_use]
    pub fn campaign_complete(world: &World) -> bool {
        world.campaign_complete
    }

    /// Multipliers currently applied to every tower.
    #[must_use]
    pub fn global_modifiers(world: &World) -> GlobalModifiers {
        world.global_modifiers
    }

    /// Modifiers stamped onto newly launched projectiles.
    #[must_use]
    pub fn projectile_modifiers(world: &World) -> ProjectileModifiers {
        world.projectile_modifiers
    }

    /// Reports whether the archetype has evolved.
    #[must_use]
    pub fn is_evolved(world: &World, archetype: Archetype) -> bool {
        world.profile(archetype).evolved
    }

    /// Radius under which an enemy reaches the objective.
    #[must_use]
    pub fn reach_radius(world: &World) -> f32 {
        world.arena.reach_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{ArchetypeUpgrade, EnemyProfile, PlacementError, ProjectilePayload};

    fn grunt() -> EnemyProfile {
        EnemyProfile {
            max_health: 50,
            speed: 80.0,
            damage: 10,
            gold_reward: 5,
            xp_reward: 10,
        }
    }

    fn spawn(world: &mut World, position: Vec2) -> EnemyId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnEnemy {
                position,
                profile: grunt(),
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::EnemySpawned { enemy, .. }] => *enemy,
            other => panic!("unexpected events {other:?}"),
        }
    }

    fn tick(world: &mut World, millis: u64) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::Tick {
                dt: Duration::from_millis(millis),
            },
            &mut events,
        );
        events
    }

    #[test]
    fn new_world_hosts_the_central_arrow_tower() {
        let world = World::new();
        let towers = query::tower_view(&world).into_vec();
        assert_eq!(towers.len(), 1);
        assert_eq!(towers[0].archetype, Archetype::Arrow);
        assert_eq!(towers[0].slot, SlotId::new(12));
        assert_eq!(towers[0].position, Vec2::ZERO);
        let central = query::slot(&world, SlotId::new(12)).expect("central slot");
        assert_eq!(central.occupant, Some(towers[0].id));
    }

    #[test]
    fn placement_marks_slot_occupied() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                archetype: Archetype::Cannon,
                slot: SlotId::new(3),
            },
            &mut events,
        );
        let Some(Event::TowerPlaced { tower, .. }) = events.first() else {
            panic!("expected placement, got {events:?}");
        };
        let slot = query::slot(&world, SlotId::new(3)).expect("slot exists");
        assert_eq!(slot.occupant, Some(*tower));
        assert_eq!(
            query::placement_check(&world, SlotId::new(3)),
            Err(PlacementError::Occupied)
        );
    }

    #[test]
    fn placement_rejections_carry_reasons() {
        let mut world = World::new();
        let mut events = Vec::new();
        for slot in [12, 99] {
            apply(
                &mut world,
                Command::PlaceTower {
                    archetype: Archetype::Ice,
                    slot: SlotId::new(slot),
                },
                &mut events,
            );
        }
        let reasons: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Event::TowerPlacementRejected { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![PlacementError::CentralSlot, PlacementError::UnknownSlot]
        );
    }

    #[test]
    fn locked_slots_unlock_in_layout_order() {
        let mut tuning = Tuning::default();
        tuning.arena.initially_unlocked_slots = 2;
        let mut world = World::with_tuning(&tuning, Vec2::ZERO);
        assert_eq!(
            query::placement_check(&world, SlotId::new(2)),
            Err(PlacementError::Locked)
        );

        let mut events = Vec::new();
        apply(&mut world, Command::UnlockSlots { count: 2 }, &mut events);
        assert_eq!(
            events,
            vec![
                Event::SlotUnlocked {
                    slot: SlotId::new(2)
                },
                Event::SlotUnlocked {
                    slot: SlotId::new(3)
                },
            ]
        );
        assert_eq!(query::placement_check(&world, SlotId::new(2)), Ok(()));
    }

    #[test]
    fn highlight_toggle_is_idempotent_and_never_affects_placement() {
        let mut world = World::new();
        let mut events = Vec::new();
        let before = query::slots(&world);
        apply(
            &mut world,
            Command::SetPlacementHighlight { active: false },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetPlacementHighlight { active: false },
            &mut events,
        );
        assert_eq!(query::slots(&world), before);
        assert!(events.is_empty());

        apply(
            &mut world,
            Command::SetPlacementHighlight { active: true },
            &mut events,
        );
        let highlighted = query::slots(&world);
        assert!(highlighted[0].highlighted);
        assert!(!highlighted[12].highlighted);
        assert_eq!(query::placement_check(&world, SlotId::new(0)), Ok(()));
    }

    #[test]
    fn enemies_walk_toward_the_objective() {
        let mut world = World::new();
        let enemy = spawn(&mut world, Vec2::new(600.0, 0.0));
        let _ = tick(&mut world, 1000);
        let view = query::enemy_view(&world);
        let snapshot = view.get(enemy).expect("enemy alive");
        assert!((snapshot.position.x - 520.0).abs() < 1e-3);
    }

    #[test]
    fn enemies_reaching_the_objective_escape_once() {
        let mut world = World::new();
        let enemy = spawn(&mut world, Vec2::new(25.0, 0.0));
        let events = tick(&mut world, 100);
        assert!(events.contains(&Event::EnemyReachedObjective { enemy, damage: 10 }));
        assert!(query::enemy_view(&world).is_empty());

        let later = tick(&mut world, 100);
        assert!(!later
            .iter()
            .any(|event| matches!(event, Event::EnemyReachedObjective { .. })));
    }

    #[test]
    fn lethal_damage_raises_a_single_death() {
        let mut world = World::new();
        let enemy = spawn(&mut world, Vec2::new(300.0, 0.0));
        let mut events = Vec::new();
        for amount in [15, 20, 20, 20] {
            apply(&mut world, Command::DamageEnemy { enemy, amount }, &mut events);
        }
        let deaths = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyDied { .. }))
            .count();
        assert_eq!(deaths, 1);
        assert!(events.contains(&Event::EnemyDamaged {
            enemy,
            amount: 20,
            remaining: 15
        }));
        assert!(query::enemy_view(&world).get(enemy).is_none());
    }

    #[test]
    fn paused_ticks_freeze_every_timer() {
        let mut world = World::new();
        let enemy = spawn(&mut world, Vec2::new(300.0, 0.0));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::FireTower {
                tower: TowerId::new(0),
                target: enemy,
            },
            &mut events,
        );
        apply(&mut world, Command::SetPaused { paused: true }, &mut events);
        let before = query::tower_view(&world).into_vec()[0].cooldown;
        assert!(tick(&mut world, 250).is_empty());
        assert_eq!(query::tower_view(&world).into_vec()[0].cooldown, before);
        assert_eq!(query::enemy_view(&world).get(enemy).map(|e| e.position.x), Some(300.0));
        assert_eq!(query::elapsed(&world), Duration::ZERO);
    }

    #[test]
    fn fire_is_refused_while_cooling_down() {
        let mut world = World::new();
        let enemy = spawn(&mut world, Vec2::new(200.0, 0.0));
        let tower = TowerId::new(0);
        let mut events = Vec::new();
        apply(&mut world, Command::FireTower { tower, target: enemy }, &mut events);
        apply(&mut world, Command::FireTower { tower, target: enemy }, &mut events);
        let fired = events
            .iter()
            .filter(|event| matches!(event, Event::TowerFired { .. }))
            .count();
        assert_eq!(fired, 1);
        let cooldown = query::tower_view(&world).into_vec()[0].cooldown;
        assert_eq!(cooldown, Duration::from_millis(500));
    }

    #[test]
    fn projectiles_inherit_current_modifiers() {
        let mut world = World::new();
        let enemy = spawn(&mut world, Vec2::new(200.0, 0.0));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetProjectileModifiers {
                modifiers: ProjectileModifiers {
                    pierce: 2,
                    explosive: true,
                },
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::LaunchProjectile {
                tower: TowerId::new(0),
                target: enemy,
                damage: 15,
                speed: 400.0,
                payload: ProjectilePayload::Direct,
            },
            &mut events,
        );
        let view = query::projectile_view(&world);
        let projectile = view.iter().next().expect("projectile launched");
        assert_eq!(projectile.pierce_remaining, 2);
        assert!(projectile.explosive);
        assert_eq!(projectile.position, Vec2::ZERO);
    }

    #[test]
    fn retired_projectiles_leave_the_view_and_report_once() {
        let mut world = World::new();
        let enemy = spawn(&mut world, Vec2::new(200.0, 0.0));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LaunchProjectile {
                tower: TowerId::new(0),
                target: enemy,
                damage: 15,
                speed: 400.0,
                payload: ProjectilePayload::Direct,
            },
            &mut events,
        );
        events.clear();
        let projectile = ProjectileId::new(0);
        apply(&mut world, Command::RetireProjectile { projectile }, &mut events);
        apply(&mut world, Command::RetireProjectile { projectile }, &mut events);
        assert_eq!(events, vec![Event::ProjectileRetired { projectile }]);
        assert!(query::projectile_view(&world).is_empty());
    }

    #[test]
    fn archetype_upgrades_reach_existing_and_future_towers() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::UpgradeArchetype {
                archetype: Archetype::Arrow,
                upgrade: ArchetypeUpgrade::Evolve,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::UpgradeArchetype {
                archetype: Archetype::Arrow,
                upgrade: ArchetypeUpgrade::Evolve,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::ArchetypeEvolved {
                archetype: Archetype::Arrow
            }]
        );
        apply(
            &mut world,
            Command::PlaceTower {
                archetype: Archetype::Arrow,
                slot: SlotId::new(0),
            },
            &mut events,
        );
        assert!(query::tower_view(&world).iter().all(|tower| tower.evolved));
    }

    #[test]
    fn global_modifiers_scale_effective_stats() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetGlobalModifiers {
                modifiers: GlobalModifiers {
                    damage: 1.5,
                    attack_speed: 1.0,
                    range: 2.0,
                },
            },
            &mut events,
        );
        let tower = query::tower_view(&world).into_vec()[0];
        assert_eq!(tower.damage, 22);
        assert!((tower.range - 500.0).abs() < f32::EPSILON);
    }

    #[test]
    fn campaign_completion_is_reported_once() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::CompleteCampaign, &mut events);
        apply(&mut world, Command::CompleteCampaign, &mut events);
        assert_eq!(events, vec![Event::AllWavesCompleted]);
        assert!(query::campaign_complete(&world));
    }
}
