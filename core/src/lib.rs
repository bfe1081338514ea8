#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bastion combat engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::{fmt, str::FromStr, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod ledger;
pub mod tuning;
pub mod upgrades;

pub use ledger::DamageLedger;
pub use tuning::Tuning;
pub use upgrades::{Upgrade, UpgradeKind};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Suspends or resumes every tick-driven system.
    SetPaused {
        /// Whether the simulation clock should be frozen.
        paused: bool,
    },
    /// Requests construction of a tower inside a placement slot.
    PlaceTower {
        /// Archetype of the tower to construct.
        archetype: Archetype,
        /// Slot that should host the tower.
        slot: SlotId,
    },
    /// Toggles the placement highlight of every free slot.
    SetPlacementHighlight {
        /// Whether free slots should be highlighted.
        active: bool,
    },
    /// Unlocks the next locked slots in layout order.
    UnlockSlots {
        /// Number of slots to unlock.
        count: u32,
    },
    /// Announces that a new wave begins.
    StartWave {
        /// One-based wave number.
        wave: u32,
        /// Number of enemies scheduled for the wave.
        enemy_count: u32,
    },
    /// Creates an enemy at the provided position heading for the objective.
    SpawnEnemy {
        /// Spawn location in world units.
        position: Vec2,
        /// Wave-scaled statistics of the enemy.
        profile: EnemyProfile,
    },
    /// Announces that the current wave has been cleared.
    CompleteWave {
        /// One-based wave number that was cleared.
        wave: u32,
        /// Gold awarded for clearing the wave.
        bonus_gold: u32,
    },
    /// Announces that the final wave has been cleared.
    CompleteCampaign,
    /// Replaces the current target reference of a tower.
    SetTowerTarget {
        /// Tower whose target changes.
        tower: TowerId,
        /// New target, or `None` when nothing is in range.
        target: Option<EnemyId>,
    },
    /// Starts a tower's attack cycle, resetting its cooldown.
    FireTower {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy the attack is aimed at.
        target: EnemyId,
    },
    /// Creates a homing projectile launched by a tower.
    LaunchProjectile {
        /// Tower that launched the projectile.
        tower: TowerId,
        /// Enemy the projectile homes in on.
        target: EnemyId,
        /// Damage dealt on arrival.
        damage: u32,
        /// Travel speed in world units per second.
        speed: f32,
        /// Effect resolved on arrival.
        payload: ProjectilePayload,
    },
    /// Moves a projectile to a new position.
    MoveProjectile {
        /// Projectile being moved.
        projectile: ProjectileId,
        /// Position after the move.
        position: Vec2,
    },
    /// Redirects a piercing projectile to a fresh target.
    RetargetProjectile {
        /// Projectile being redirected.
        projectile: ProjectileId,
        /// Enemy the projectile should pursue next.
        target: EnemyId,
    },
    /// Removes a projectile at the next sweep.
    RetireProjectile {
        /// Projectile being removed.
        projectile: ProjectileId,
    },
    /// Deals damage to a live enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Amount of health removed.
        amount: u32,
    },
    /// Applies a slow effect, replacing any existing one.
    SlowEnemy {
        /// Enemy being slowed.
        enemy: EnemyId,
        /// Speed multiplier while slowed.
        multiplier: f32,
        /// Duration of the slow effect.
        duration: Duration,
    },
    /// Strikes a live enemy from the sky.
    SkyStrike {
        /// Enemy being struck.
        enemy: EnemyId,
        /// Damage dealt by the strike.
        damage: u32,
    },
    /// Replaces the global tower stat multipliers.
    SetGlobalModifiers {
        /// Multipliers applied to every tower.
        modifiers: GlobalModifiers,
    },
    /// Replaces the modifiers the world stamps onto newly launched projectiles.
    SetProjectileModifiers {
        /// Modifiers for future projectiles.
        modifiers: ProjectileModifiers,
    },
    /// Applies an archetype-specific upgrade to every tower of that archetype.
    UpgradeArchetype {
        /// Archetype being upgraded.
        archetype: Archetype,
        /// Parameter change to apply.
        upgrade: ArchetypeUpgrade,
    },
}

/// Events broadcast after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the simulation was suspended or resumed.
    PauseChanged {
        /// Whether the simulation is now paused.
        paused: bool,
    },
    /// Confirms that a tower was placed into a slot.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Archetype of the new tower.
        archetype: Archetype,
        /// Slot now occupied by the tower.
        slot: SlotId,
    },
    /// Reports that a placement request was rejected.
    TowerPlacementRejected {
        /// Archetype requested for placement.
        archetype: Archetype,
        /// Slot provided in the request.
        slot: SlotId,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a previously locked slot became available.
    SlotUnlocked {
        /// Slot that was unlocked.
        slot: SlotId,
    },
    /// Confirms that an enemy entered the arena.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Spawn location.
        position: Vec2,
    },
    /// Reports damage dealt to an enemy.
    EnemyDamaged {
        /// Enemy that took damage.
        enemy: EnemyId,
        /// Damage applied.
        amount: u32,
        /// Health left after the hit.
        remaining: u32,
    },
    /// Announces the death of an enemy. Raised exactly once per enemy.
    EnemyDied {
        /// Enemy that died.
        enemy: EnemyId,
        /// Position at the moment of death.
        position: Vec2,
        /// Gold awarded for the kill before multipliers.
        gold_reward: u32,
        /// Experience awarded for the kill.
        xp_reward: u32,
    },
    /// Announces that an enemy reached the objective.
    EnemyReachedObjective {
        /// Enemy that reached the objective.
        enemy: EnemyId,
        /// Contact damage dealt to the objective.
        damage: u32,
    },
    /// Announces the start of a wave.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
        /// Enemies scheduled for the wave.
        enemy_count: u32,
    },
    /// Announces that a wave was cleared.
    WaveCompleted {
        /// One-based wave number.
        wave: u32,
        /// Gold bonus granted for the clear.
        bonus_gold: u32,
    },
    /// Announces that every wave of the campaign was cleared.
    AllWavesCompleted,
    /// Reports that a tower fired.
    TowerFired {
        /// Tower that fired.
        tower: TowerId,
        /// Archetype of the tower.
        archetype: Archetype,
        /// Primary target of the attack.
        target: EnemyId,
    },
    /// Confirms that a projectile was created.
    ProjectileLaunched {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that launched it.
        tower: TowerId,
        /// Enemy it homes in on.
        target: EnemyId,
    },
    /// Confirms that a projectile was discarded.
    ProjectileRetired {
        /// Projectile that was retired.
        projectile: ProjectileId,
    },
    /// Reports a sky strike from an evolved lightning archetype.
    SkyStruck {
        /// Enemy that was struck.
        enemy: EnemyId,
        /// Damage dealt.
        damage: u32,
    },
    /// Reports new global tower multipliers.
    GlobalModifiersChanged {
        /// Multipliers now in effect.
        modifiers: GlobalModifiers,
    },
    /// Reports that an archetype-specific upgrade changed live towers.
    ArchetypeUpgraded {
        /// Archetype that changed.
        archetype: Archetype,
        /// Change that was applied.
        upgrade: ArchetypeUpgrade,
    },
    /// Announces the one-time evolution of an archetype.
    ArchetypeEvolved {
        /// Archetype that evolved.
        archetype: Archetype,
    },
    /// Reports a new archetype rank.
    ArchetypeRankChanged {
        /// Archetype whose rank changed.
        archetype: Archetype,
        /// Rank after the change.
        rank: u8,
    },
    /// Announces a level-up.
    LevelUp {
        /// Level reached.
        level: u32,
        /// Progress toward the next level in `0.0..1.0`.
        progress: f32,
    },
    /// Offers exactly three upgrades for the player to choose from.
    UpgradeChoicesReady {
        /// Candidates presented to the player.
        choices: [Upgrade; 3],
    },
    /// Confirms that the player chose an upgrade.
    UpgradeApplied {
        /// Upgrade that took effect.
        upgrade: Upgrade,
    },
    /// Reports that an upgrade selection was rejected.
    UpgradeSelectionRejected {
        /// Specific reason the selection failed.
        reason: SelectionError,
    },
    /// Reports the gold balance after an adjustment.
    GoldChanged {
        /// Balance after the adjustment.
        balance: u32,
    },
    /// Reports the objective's health after a change.
    CoreHealthChanged {
        /// Current objective health.
        current: u32,
        /// Maximum objective health.
        max: u32,
    },
    /// Announces that the objective was destroyed.
    CoreDestroyed,
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }
    };
}

entity_id!(
    /// Unique identifier assigned to an enemy. Allocation order is creation order.
    EnemyId
);
entity_id!(
    /// Unique identifier assigned to a tower.
    TowerId
);
entity_id!(
    /// Unique identifier assigned to a projectile.
    ProjectileId
);
entity_id!(
    /// Index of a placement slot within the arena layout.
    SlotId
);

/// Tower behaviour templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    /// Single-target homing arrows.
    Arrow,
    /// Slow shells that splash on impact.
    Cannon,
    /// Frost bolts that slow their target.
    Ice,
    /// Instant beams, optionally split across extra targets.
    Laser,
    /// Instant bolts that chain between nearby enemies.
    Lightning,
}

impl Archetype {
    /// Every archetype in declaration order.
    pub const ALL: [Archetype; 5] = [
        Archetype::Arrow,
        Archetype::Cannon,
        Archetype::Ice,
        Archetype::Laser,
        Archetype::Lightning,
    ];

    /// Human-readable name used in catalogs and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Arrow => "Arrow",
            Self::Cannon => "Cannon",
            Self::Ice => "Ice",
            Self::Laser => "Laser",
            Self::Lightning => "Lightning",
        }
    }

    /// Dense index used for per-archetype tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Arrow => 0,
            Self::Cannon => 1,
            Self::Ice => 2,
            Self::Laser => 3,
            Self::Lightning => 4,
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error raised when an archetype name cannot be recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown tower archetype '{0}'")]
pub struct UnknownArchetype(pub String);

impl FromStr for Archetype {
    type Err = UnknownArchetype;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Archetype::ALL
            .into_iter()
            .find(|archetype| archetype.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownArchetype(value.to_owned()))
    }
}

/// Archetype-specific parameters carried by each tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ArchetypeParams {
    /// Arrow towers launch one direct-damage projectile per attack.
    Arrow {
        /// Projectile travel speed.
        projectile_speed: f32,
    },
    /// Cannon towers launch shells that splash on impact.
    Cannon {
        /// Projectile travel speed.
        projectile_speed: f32,
        /// Radius of the splash around the impact point.
        splash_radius: f32,
    },
    /// Ice towers launch frost bolts that slow their target.
    Ice {
        /// Projectile travel speed.
        projectile_speed: f32,
        /// Speed multiplier applied to slowed enemies.
        slow_multiplier: f32,
        /// Duration of the slow effect.
        slow_duration: Duration,
        /// Projectiles launched per attack.
        projectile_count: u32,
    },
    /// Laser towers damage instantly.
    Laser {
        /// Additional enemies hit by each attack.
        extra_beams: u32,
    },
    /// Lightning towers damage instantly and chain to nearby enemies.
    Lightning {
        /// Total hits per attack including the primary target.
        chain_count: u32,
        /// Maximum hop distance between chained enemies.
        chain_range: f32,
        /// Damage multiplier applied per hop.
        chain_reduction: f32,
    },
}

impl ArchetypeParams {
    /// Archetype these parameters belong to.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        match self {
            Self::Arrow { .. } => Archetype::Arrow,
            Self::Cannon { .. } => Archetype::Cannon,
            Self::Ice { .. } => Archetype::Ice,
            Self::Laser { .. } => Archetype::Laser,
            Self::Lightning { .. } => Archetype::Lightning,
        }
    }
}

/// Archetype-specific changes applied by the upgrade engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ArchetypeUpgrade {
    /// Adds chain hops to lightning towers.
    AddChains(u32),
    /// Multiplies the cannon splash radius.
    ScaleSplash(f32),
    /// Adds projectiles to each ice volley.
    AddProjectiles(u32),
    /// Adds extra laser beams.
    AddBeams(u32),
    /// Applies the one-time evolution of the archetype.
    Evolve,
}

/// Effect resolved when a projectile reaches its target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ProjectilePayload {
    /// Damage to the target only.
    Direct,
    /// Damage to the target plus falloff damage around the impact point.
    Splash {
        /// Radius of the splash.
        radius: f32,
    },
    /// Damage to the target plus a slow effect.
    Frost {
        /// Speed multiplier while slowed.
        multiplier: f32,
        /// Duration of the slow effect.
        duration: Duration,
    },
}

/// Upgrade-driven modifiers stamped onto projectiles at launch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectileModifiers {
    /// Additional enemies a projectile may strike after its first hit.
    pub pierce: u32,
    /// Whether non-splash hits explode around the impact point.
    pub explosive: bool,
}

/// Global multipliers applied to every tower's base statistics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalModifiers {
    /// Damage multiplier.
    pub damage: f32,
    /// Attack speed multiplier.
    pub attack_speed: f32,
    /// Attack range multiplier.
    pub range: f32,
}

impl Default for GlobalModifiers {
    fn default() -> Self {
        Self {
            damage: 1.0,
            attack_speed: 1.0,
            range: 1.0,
        }
    }
}

/// Wave-scaled statistics of a freshly spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyProfile {
    /// Health at spawn.
    pub max_health: u32,
    /// Base movement speed in world units per second.
    pub speed: f32,
    /// Damage dealt to the objective on contact.
    pub damage: u32,
    /// Gold awarded on death.
    pub gold_reward: u32,
    /// Experience awarded on death.
    pub xp_reward: u32,
}

/// Transient slow effect carried by an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlowEffect {
    /// Speed multiplier while the effect lasts.
    pub multiplier: f32,
    /// Time left before the effect expires.
    pub remaining: Duration,
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The slot identifier does not exist in the arena layout.
    #[error("slot does not exist")]
    UnknownSlot,
    /// The central slot is reserved for the starting tower.
    #[error("the central slot is reserved")]
    CentralSlot,
    /// The slot has not been unlocked yet.
    #[error("slot is locked")]
    Locked,
    /// The slot already hosts a tower.
    #[error("slot is occupied")]
    Occupied,
    /// The economy refused the purchase.
    #[error("not enough gold")]
    InsufficientGold,
    /// The campaign has already ended.
    #[error("the campaign is over")]
    CampaignOver,
}

/// Reasons an upgrade selection may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SelectionError {
    /// No level-up choice is waiting for an answer.
    #[error("no upgrade choice is pending")]
    NoPendingChoice,
    /// The provided index does not name one of the offered candidates.
    #[error("choice {index} is not one of the offered upgrades")]
    InvalidChoice {
        /// Index provided by the caller.
        index: usize,
    },
}

/// Gold ledger owned outside the core.
///
/// The core only requests adjustments and is told whether a debit succeeded.
pub trait Economy {
    /// Current balance.
    fn balance(&self) -> u32;

    /// Adds gold to the balance.
    fn credit(&mut self, amount: u32);

    /// Removes gold if the balance covers it, reporting whether it did.
    fn debit(&mut self, amount: u32) -> bool;
}

/// Objective the enemies converge on.
pub trait Objective {
    /// Position every enemy walks toward.
    fn position(&self) -> Vec2;

    /// Current health.
    fn health(&self) -> u32;

    /// Maximum health.
    fn max_health(&self) -> u32;

    /// Removes health, saturating at zero.
    fn take_damage(&mut self, amount: u32);

    /// Restores health, saturating at the maximum.
    fn heal(&mut self, amount: u32);

    /// Raises the maximum health and heals by the same amount.
    fn fortify(&mut self, amount: u32);

    /// Reports whether the objective has been destroyed.
    fn is_destroyed(&self) -> bool {
        self.health() == 0
    }
}

/// Immutable representation of a live enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Current position.
    pub position: Vec2,
    /// Current health.
    pub health: u32,
    /// Health at spawn.
    pub max_health: u32,
    /// Base movement speed.
    pub speed: f32,
    /// Active slow effect, if any.
    pub slow: Option<SlowEffect>,
}

/// Read-only snapshot describing every live enemy.
///
/// Snapshots are ordered by identifier, which is creation order, so every
/// "first found" rule resolves deterministically.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemy is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Looks up a live enemy by identifier.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Enemies whose distance to `point` does not exceed `radius`, in creation order.
    pub fn within(&self, point: Vec2, radius: f32) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.position.distance(point) <= radius)
    }

    /// Nearest enemy within `radius` of `point` that passes `eligible`.
    ///
    /// Ties keep the enemy found first, i.e. the oldest one.
    pub fn nearest_within<F>(&self, point: Vec2, radius: f32, mut eligible: F) -> Option<&EnemySnapshot>
    where
        F: FnMut(&EnemySnapshot) -> bool,
    {
        let mut best: Option<(f32, &EnemySnapshot)> = None;
        for snapshot in &self.snapshots {
            let distance = snapshot.position.distance(point);
            if distance > radius || !eligible(snapshot) {
                continue;
            }
            match best {
                Some((closest, _)) if distance >= closest => {}
                _ => best = Some((distance, snapshot)),
            }
        }
        best.map(|(_, snapshot)| snapshot)
    }
}

/// Immutable representation of a tower's effective state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower.
    pub id: TowerId,
    /// Archetype of the tower.
    pub archetype: Archetype,
    /// Slot hosting the tower.
    pub slot: SlotId,
    /// Tower position.
    pub position: Vec2,
    /// Damage per hit after global multipliers.
    pub damage: u32,
    /// Attack range after global multipliers.
    pub range: f32,
    /// Attacks per second after global multipliers.
    pub attacks_per_second: f32,
    /// Time left before the tower may fire again.
    pub cooldown: Duration,
    /// Weak reference to the current target.
    pub target: Option<EnemyId>,
    /// Archetype-specific parameters.
    pub params: ArchetypeParams,
    /// Whether the archetype has evolved.
    pub evolved: bool,
}

/// Read-only snapshot describing every placed tower.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a tower by identifier.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Counts placed towers of the provided archetype.
    #[must_use]
    pub fn count(&self, archetype: Archetype) -> usize {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.archetype == archetype)
            .count()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an in-flight projectile.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Tower that launched the projectile.
    pub tower: TowerId,
    /// Current position.
    pub position: Vec2,
    /// Weak reference to the pursued enemy.
    pub target: EnemyId,
    /// Damage dealt on arrival.
    pub damage: u32,
    /// Travel speed.
    pub speed: f32,
    /// Effect resolved on arrival.
    pub payload: ProjectilePayload,
    /// Hits left after the current target.
    pub pierce_remaining: u32,
    /// Whether direct hits explode.
    pub explosive: bool,
    /// Enemies already struck by this projectile.
    pub struck: Vec<EnemyId>,
}

/// Read-only snapshot describing every in-flight projectile.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in launch order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of in-flight projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectile is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a placement slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotSnapshot {
    /// Slot identifier.
    pub id: SlotId,
    /// Slot centre in world units.
    pub position: Vec2,
    /// Whether towers may be placed here.
    pub unlocked: bool,
    /// Whether this is the reserved central slot.
    pub central: bool,
    /// Tower hosted by the slot, if any.
    pub occupant: Option<TowerId>,
    /// Whether the slot is highlighted for placement.
    pub highlighted: bool,
}
