#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Campaign orchestrator that drives the world and every system.
//!
//! A [`Simulation`] owns the authoritative [`World`], the pure systems and
//! the external collaborators ([`Economy`] and [`Objective`]). Each call to
//! [`Simulation::step`] runs one fixed-order tick:
//!
//! 1. the world advances its clock and moves enemies,
//! 2. projectiles home in and resolve their hits,
//! 3. towers acquire targets,
//! 4. ready towers fire,
//! 5. kills, leaks and wave clears settle against the economy and objective,
//! 6. the upgrade engine credits experience,
//! 7. the wave director schedules spawns and detects clears,
//! 8. the objective regenerates.
//!
//! Every event produced along the way is appended to the caller's buffer.

mod economy;
mod objective;

use std::time::Duration;

use bastion_core::{
    tuning::TuningError, Archetype, Command, Economy, EnemyView, Event, Objective, PlacementError,
    ProjectileView, SelectionError, SlotId, SlotSnapshot, TowerId, TowerView, Tuning, Upgrade,
    UpgradeKind,
};
use bastion_system_progression::{Catalog, CatalogError, Progression};
use bastion_system_projectiles::Projectiles;
use bastion_system_tower_combat::TowerCombat;
use bastion_system_tower_targeting::TowerTargeting;
use bastion_system_wave_director::{WaveDirector, WavePhase};
use bastion_world::{self as world, query, World};
use glam::Vec2;
use log::info;
use thiserror::Error;

pub use bastion_system_progression::ProgressionSnapshot;
pub use economy::Ledger;
pub use objective::PlayerCore;

/// Configuration defects that prevent a simulation from starting.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A tuning value cannot drive a simulation.
    #[error("invalid tuning: {0}")]
    Tuning(#[from] TuningError),
    /// The upgrade catalog is malformed.
    #[error("invalid upgrade catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// How the campaign currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Waves are still being fought.
    InProgress,
    /// Every wave was cleared.
    Victory,
    /// The objective was destroyed.
    Defeat,
}

/// Complete campaign: world, systems and external collaborators.
#[derive(Debug)]
pub struct Simulation<E = Ledger, O = PlayerCore> {
    world: World,
    tuning: Tuning,
    economy: E,
    objective: O,
    targeting: TowerTargeting,
    combat: TowerCombat,
    projectiles: Projectiles,
    waves: WaveDirector,
    progression: Progression,
    outcome: Outcome,
    regeneration_carry: f32,
    kills: u32,
}

impl Simulation {
    /// Creates a campaign with the built-in gold ledger and player core.
    ///
    /// The core sits at the origin and every random decision derives from `seed`.
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, SetupError> {
        let economy = Ledger::new(tuning.economy.starting_gold);
        let objective = PlayerCore::new(Vec2::ZERO, tuning.economy.core_health);
        Self::with_collaborators(tuning, seed, economy, objective)
    }
}

impl<E: Economy, O: Objective> Simulation<E, O> {
    /// Creates a campaign around host-supplied economy and objective.
    ///
    /// Fails before anything is initialised when the tuning or the upgrade
    /// catalog is inconsistent.
    pub fn with_collaborators(
        tuning: Tuning,
        seed: u64,
        economy: E,
        objective: O,
    ) -> Result<Self, SetupError> {
        tuning.validate()?;
        let catalog = Catalog::standard()?;

        let world = World::with_tuning(&tuning, objective.position());
        let combat = TowerCombat::new(bastion_system_tower_combat::Config::from_tuning(
            &tuning.towers.lightning,
            stream(seed, 1),
        ));
        let projectiles = Projectiles::new(bastion_system_projectiles::Config::from_tuning(
            &tuning.arena,
        ));
        let waves = WaveDirector::new(bastion_system_wave_director::Config::new(
            tuning.waves.clone(),
            tuning.enemies.clone(),
            stream(seed, 2),
        ));
        let progression = Progression::new(
            bastion_system_progression::Config::new(tuning.progression.clone(), stream(seed, 3)),
            catalog,
        );

        Ok(Self {
            world,
            tuning,
            economy,
            objective,
            targeting: TowerTargeting::new(),
            combat,
            projectiles,
            waves,
            progression,
            outcome: Outcome::InProgress,
            regeneration_carry: 0.0,
            kills: 0,
        })
    }

    /// Advances the campaign by one tick.
    ///
    /// Does nothing while paused or once the outcome is decided.
    pub fn step(&mut self, dt: Duration, out: &mut Vec<Event>) {
        if self.outcome != Outcome::InProgress || query::is_paused(&self.world) {
            return;
        }
        let start = out.len();
        world::apply(&mut self.world, Command::Tick { dt }, out);

        let mut commands = Vec::new();
        self.projectiles.handle(
            &out[start..],
            &query::projectile_view(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        self.execute(&mut commands, out);

        self.targeting.handle(
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        self.execute(&mut commands, out);

        self.combat.handle(
            &out[start..],
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        self.execute(&mut commands, out);

        self.react(out, start);
        if self.outcome == Outcome::InProgress {
            self.regenerate(dt, out);
        }
    }

    /// Applies a raw command, then settles and forwards its consequences.
    ///
    /// Scripted scenarios and debugging consoles use this to spawn or damage
    /// enemies directly. Ignored once the outcome is decided.
    pub fn submit(&mut self, command: Command, out: &mut Vec<Event>) {
        if self.outcome != Outcome::InProgress {
            return;
        }
        let start = out.len();
        world::apply(&mut self.world, command, out);
        self.react(out, start);
    }

    /// Buys a tower and places it into a slot.
    ///
    /// The price is debited before placement and refunded if the world
    /// refuses the tower. Every rejection is also reported as an event.
    pub fn purchase_tower(
        &mut self,
        archetype: Archetype,
        slot: SlotId,
        out: &mut Vec<Event>,
    ) -> Result<TowerId, PlacementError> {
        if self.outcome != Outcome::InProgress {
            return Err(reject_placement(archetype, slot, PlacementError::CampaignOver, out));
        }
        if let Err(reason) = query::placement_check(&self.world, slot) {
            return Err(reject_placement(archetype, slot, reason, out));
        }

        let cost = self.tuning.towers.cost(archetype);
        if !self.economy.debit(cost) {
            return Err(reject_placement(
                archetype,
                slot,
                PlacementError::InsufficientGold,
                out,
            ));
        }
        out.push(Event::GoldChanged {
            balance: self.economy.balance(),
        });

        let start = out.len();
        world::apply(
            &mut self.world,
            Command::PlaceTower { archetype, slot },
            out,
        );
        let placed = out[start..].iter().find_map(|event| match event {
            Event::TowerPlaced { tower, .. } => Some(Ok(*tower)),
            Event::TowerPlacementRejected { reason, .. } => Some(Err(*reason)),
            _ => None,
        });
        match placed {
            Some(Ok(tower)) => Ok(tower),
            Some(Err(reason)) => {
                self.refund(cost, out);
                Err(reason)
            }
            None => {
                self.refund(cost, out);
                Err(PlacementError::UnknownSlot)
            }
        }
    }

    /// Resolves the pending level-up with one of the offered upgrades.
    pub fn select_upgrade(
        &mut self,
        index: usize,
        out: &mut Vec<Event>,
    ) -> Result<Upgrade, SelectionError> {
        let towers = query::tower_view(&self.world);
        let mut commands = Vec::new();
        let selected = self.progression.select(index, &towers, &mut commands, out);
        let upgrade = selected?;

        if upgrade.kind() == UpgradeKind::FortifyCore {
            self.objective.fortify(upgrade.magnitude().round() as u32);
            self.report_core_health(out);
        }
        self.execute(&mut commands, out);
        Ok(upgrade)
    }

    /// Toggles the highlight of free slots. Placement validity is unaffected.
    pub fn set_placement_highlight(&mut self, active: bool, out: &mut Vec<Event>) {
        world::apply(
            &mut self.world,
            Command::SetPlacementHighlight { active },
            out,
        );
    }

    /// How the campaign currently stands.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Reports whether the simulation waits for an upgrade selection.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        query::is_paused(&self.world)
    }

    /// Simulated time elapsed across unpaused ticks.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        query::elapsed(&self.world)
    }

    /// Current or most recently started wave.
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.waves.wave()
    }

    /// Observable phase of the wave director.
    #[must_use]
    pub fn wave_phase(&self) -> WavePhase {
        self.waves.phase()
    }

    /// Enemies killed by towers so far.
    #[must_use]
    pub fn kills(&self) -> u32 {
        self.kills
    }

    /// Purchase price of an archetype.
    #[must_use]
    pub fn cost(&self, archetype: Archetype) -> u32 {
        self.tuning.towers.cost(archetype)
    }

    /// Gold ledger.
    #[must_use]
    pub fn economy(&self) -> &E {
        &self.economy
    }

    /// Objective the enemies converge on.
    #[must_use]
    pub fn objective(&self) -> &O {
        &self.objective
    }

    /// Experience, ranks and multipliers of the upgrade engine.
    #[must_use]
    pub fn progression(&self) -> ProgressionSnapshot {
        self.progression.snapshot()
    }

    /// Candidates awaiting a selection, if any.
    #[must_use]
    pub fn pending_choices(&self) -> Option<&[Upgrade; 3]> {
        self.progression.pending_choices()
    }

    /// Live enemies in identifier order.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Placed towers in identifier order.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Projectiles in flight in identifier order.
    #[must_use]
    pub fn projectiles(&self) -> ProjectileView {
        query::projectile_view(&self.world)
    }

    /// Placement slots in layout order.
    #[must_use]
    pub fn slots(&self) -> Vec<SlotSnapshot> {
        query::slots(&self.world)
    }

    /// Authoritative world for adapters that need finer queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    fn execute(&mut self, commands: &mut Vec<Command>, out: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, out);
        }
    }

    /// Settles and forwards every event from `start` to the upgrade engine and
    /// the wave director.
    fn react(&mut self, out: &mut Vec<Event>, start: usize) {
        let settled = self.settle(out, start);
        if self.outcome != Outcome::InProgress {
            return;
        }

        let mut commands = Vec::new();
        let mut notices = Vec::new();
        self.progression.handle(
            &out[start..],
            &query::tower_view(&self.world),
            &mut commands,
            &mut notices,
        );
        out.append(&mut notices);
        self.execute(&mut commands, out);

        self.waves
            .handle(&out[start..], self.objective.position(), &mut commands);
        self.execute(&mut commands, out);

        let _ = self.settle(out, settled);
    }

    /// Credits kills and clears, charges leaks, and decides the outcome.
    ///
    /// Returns the index past the last settled event.
    fn settle(&mut self, out: &mut Vec<Event>, from: usize) -> usize {
        let mut notices = Vec::new();
        for event in &out[from..] {
            match event {
                Event::EnemyDied { gold_reward, .. } => {
                    self.kills = self.kills.saturating_add(1);
                    let gold = (*gold_reward as f32 * self.progression.gold_multiplier()).floor();
                    self.economy.credit(gold as u32);
                    notices.push(Event::GoldChanged {
                        balance: self.economy.balance(),
                    });
                }
                Event::WaveCompleted { bonus_gold, .. } => {
                    self.economy.credit(*bonus_gold);
                    notices.push(Event::GoldChanged {
                        balance: self.economy.balance(),
                    });
                }
                Event::EnemyReachedObjective { damage, .. } if self.outcome == Outcome::InProgress => {
                    self.objective.take_damage(*damage);
                    notices.push(Event::CoreHealthChanged {
                        current: self.objective.health(),
                        max: self.objective.max_health(),
                    });
                    if self.objective.is_destroyed() {
                        info!("core destroyed during wave {}", self.waves.wave());
                        self.outcome = Outcome::Defeat;
                        notices.push(Event::CoreDestroyed);
                    }
                }
                Event::AllWavesCompleted if self.outcome == Outcome::InProgress => {
                    info!("campaign won with {} kills", self.kills);
                    self.outcome = Outcome::Victory;
                }
                _ => {}
            }
        }
        out.append(&mut notices);
        out.len()
    }

    /// Heals whole hit points as fractional regeneration accumulates.
    fn regenerate(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let rate = self.progression.regeneration_per_second();
        if rate <= 0.0 {
            return;
        }
        if self.objective.health() >= self.objective.max_health() {
            self.regeneration_carry = 0.0;
            return;
        }
        self.regeneration_carry += rate * dt.as_secs_f32();
        let whole = self.regeneration_carry.floor();
        if whole >= 1.0 {
            self.regeneration_carry -= whole;
            self.objective.heal(whole as u32);
            self.report_core_health(out);
        }
    }

    fn report_core_health(&self, out: &mut Vec<Event>) {
        out.push(Event::CoreHealthChanged {
            current: self.objective.health(),
            max: self.objective.max_health(),
        });
    }

    fn refund(&mut self, cost: u32, out: &mut Vec<Event>) {
        self.economy.credit(cost);
        out.push(Event::GoldChanged {
            balance: self.economy.balance(),
        });
    }
}

fn reject_placement(
    archetype: Archetype,
    slot: SlotId,
    reason: PlacementError,
    out: &mut Vec<Event>,
) -> PlacementError {
    out.push(Event::TowerPlacementRejected {
        archetype,
        slot,
        reason,
    });
    reason
}

/// Derives an independent random stream per system from the campaign seed.
fn stream(seed: u64, index: u64) -> u64 {
    seed.wrapping_mul(0x9e37_79b9_7f4a_7c15).wrapping_add(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{EnemyId, EnemyProfile};

    const FAR: Vec2 = Vec2::new(0.0, -500.0);

    fn dummy(xp_reward: u32) -> EnemyProfile {
        EnemyProfile {
            max_health: 50,
            speed: 0.0,
            damage: 10,
            gold_reward: 5,
            xp_reward,
        }
    }

    fn spawn_and_kill(simulation: &mut Simulation, enemy: u32, xp_reward: u32) -> Vec<Event> {
        let mut events = Vec::new();
        simulation.submit(
            Command::SpawnEnemy {
                position: FAR,
                profile: dummy(xp_reward),
            },
            &mut events,
        );
        simulation.submit(
            Command::DamageEnemy {
                enemy: EnemyId::new(enemy),
                amount: 50,
            },
            &mut events,
        );
        events
    }

    /// Finds a seed whose first level-up offers the requested kind.
    fn offering(kind: UpgradeKind) -> (Simulation, usize) {
        for seed in 0..500 {
            let mut simulation = Simulation::new(Tuning::default(), seed).expect("simulation");
            let _ = spawn_and_kill(&mut simulation, 0, 100);
            let index = simulation
                .pending_choices()
                .and_then(|choices| choices.iter().position(|upgrade| upgrade.kind() == kind));
            if let Some(index) = index {
                return (simulation, index);
            }
        }
        panic!("no seed offered {kind:?}");
    }

    #[test]
    fn inconsistent_tuning_fails_fast() {
        let mut tuning = Tuning::default();
        tuning.waves.total_waves = 0;
        assert!(matches!(
            Simulation::new(tuning, 1),
            Err(SetupError::Tuning(TuningError::ZeroCount { .. }))
        ));
    }

    #[test]
    fn kill_rewards_pause_for_a_level_up() {
        let mut simulation = Simulation::new(Tuning::default(), 3).expect("simulation");
        let events = spawn_and_kill(&mut simulation, 0, 100);
        assert_eq!(simulation.economy().balance(), 405);
        assert_eq!(simulation.kills(), 1);
        assert!(simulation.is_paused(), "level-up pauses the campaign");
        assert!(events.contains(&Event::GoldChanged { balance: 405 }));
        assert!(events.contains(&Event::PauseChanged { paused: true }));
    }

    #[test]
    fn gold_rush_scales_kill_rewards() {
        let (mut simulation, index) = offering(UpgradeKind::GoldRush);
        let mut events = Vec::new();
        let _ = simulation
            .select_upgrade(index, &mut events)
            .expect("selected");
        assert!(!simulation.is_paused());

        let _ = spawn_and_kill(&mut simulation, 1, 0);
        assert_eq!(simulation.economy().balance(), 412, "5 gold at 1.5x floors to 7");
    }

    #[test]
    fn fortify_core_raises_objective_health() {
        let (mut simulation, index) = offering(UpgradeKind::FortifyCore);
        let mut events = Vec::new();
        let _ = simulation
            .select_upgrade(index, &mut events)
            .expect("selected");
        assert_eq!(simulation.objective().max_health(), 150);
        assert_eq!(simulation.objective().health(), 150);
        assert!(events.contains(&Event::CoreHealthChanged {
            current: 150,
            max: 150,
        }));
    }

    #[test]
    fn regeneration_heals_whole_points_over_time() {
        let (mut simulation, index) = offering(UpgradeKind::Regeneration);
        let mut events = Vec::new();
        let _ = simulation
            .select_upgrade(index, &mut events)
            .expect("selected");
        simulation.objective.take_damage(40);

        events.clear();
        simulation.step(Duration::from_millis(100), &mut events);
        assert_eq!(simulation.objective().health(), 60, "half a point is carried");
        simulation.step(Duration::from_millis(100), &mut events);
        assert_eq!(simulation.objective().health(), 61);
        simulation.step(Duration::from_secs(1), &mut events);
        assert_eq!(simulation.objective().health(), 66);
    }

    #[test]
    fn streams_differ_per_system() {
        assert_ne!(stream(7, 1), stream(7, 2));
        assert_eq!(stream(7, 1), stream(7, 1));
    }
}
