//! Balance constants shared by the world and the systems.
//!
//! Every struct deserialises with `#[serde(default)]`, so a configuration file
//! only needs to name the values it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Archetype, ArchetypeParams, EnemyProfile};

/// Complete balance configuration of a campaign.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Per-archetype tower statistics.
    pub towers: ArchetypeTable,
    /// Enemy scaling.
    pub enemies: EnemyTuning,
    /// Wave scheduling.
    pub waves: WaveTuning,
    /// Experience curve.
    pub progression: ProgressionTuning,
    /// Arena geometry and combat distances.
    pub arena: ArenaTuning,
    /// Gold and objective bookkeeping.
    pub economy: EconomyTuning,
}

/// Errors raised when a tuning value cannot drive a simulation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TuningError {
    /// A value that must be strictly positive was zero or negative.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Value that was provided.
        value: f32,
    },
    /// A multiplier left its allowed `0.0..=1.0` interval.
    #[error("{field} must lie within 0..=1, got {value}")]
    OutOfUnitRange {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Value that was provided.
        value: f32,
    },
    /// A count that must be at least one was zero.
    #[error("{field} must be at least one")]
    ZeroCount {
        /// Dotted path of the offending field.
        field: &'static str,
    },
    /// More slots were requested unlocked than the layout provides.
    #[error("{requested} initially unlocked slots exceed the {available} in the layout")]
    TooManyUnlockedSlots {
        /// Slots requested unlocked.
        requested: u32,
        /// Slots in the layout.
        available: u32,
    },
}

impl Tuning {
    /// Checks that every rate, speed and radius can drive a simulation.
    pub fn validate(&self) -> Result<(), TuningError> {
        for archetype in Archetype::ALL {
            let stats = self.towers.stats(archetype);
            positive(stat_field(archetype, "range"), stats.range)?;
            positive(stat_field(archetype, "attacks_per_second"), stats.attacks_per_second)?;
        }
        positive("towers.arrow.projectile_speed", self.towers.arrow.projectile_speed)?;
        positive("towers.cannon.projectile_speed", self.towers.cannon.projectile_speed)?;
        positive("towers.cannon.splash_radius", self.towers.cannon.splash_radius)?;
        positive(
            "towers.cannon.evolved_splash_radius",
            self.towers.cannon.evolved_splash_radius,
        )?;
        positive("towers.ice.projectile_speed", self.towers.ice.projectile_speed)?;
        unit("towers.ice.slow_multiplier", self.towers.ice.slow_multiplier)?;
        positive("towers.ice.slow_duration_secs", self.towers.ice.slow_duration_secs)?;
        count("towers.ice.projectile_count", self.towers.ice.projectile_count)?;
        positive(
            "towers.ice.evolved_attacks_per_second",
            self.towers.ice.evolved_attacks_per_second,
        )?;
        positive(
            "towers.laser.evolved_attacks_per_second",
            self.towers.laser.evolved_attacks_per_second,
        )?;
        count("towers.lightning.chain_count", self.towers.lightning.chain_count)?;
        positive("towers.lightning.chain_range", self.towers.lightning.chain_range)?;
        unit("towers.lightning.chain_reduction", self.towers.lightning.chain_reduction)?;
        positive(
            "towers.lightning.sky_strike_interval_secs",
            self.towers.lightning.sky_strike_interval_secs,
        )?;

        positive("enemies.base_speed", self.enemies.base_speed)?;
        count("enemies.base_health", self.enemies.base_health)?;

        count("waves.total_waves", self.waves.total_waves)?;
        count("waves.base_enemy_count", self.waves.base_enemy_count)?;
        positive("waves.spawn_radius", self.waves.spawn_radius)?;
        non_negative("waves.first_wave_delay_secs", self.waves.first_wave_delay_secs)?;
        non_negative("waves.wave_interval_secs", self.waves.wave_interval_secs)?;
        non_negative("waves.spawn_stagger_secs", self.waves.spawn_stagger_secs)?;

        count("progression.first_level_xp", self.progression.first_level_xp)?;

        positive("arena.cell_size", self.arena.cell_size)?;
        positive("arena.hit_threshold", self.arena.hit_threshold)?;
        positive("arena.reach_radius", self.arena.reach_radius)?;
        positive("arena.pierce_retarget_range", self.arena.pierce_retarget_range)?;
        positive("arena.explosive_radius", self.arena.explosive_radius)?;
        let available = ArenaTuning::SLOT_COUNT;
        if self.arena.initially_unlocked_slots > available {
            return Err(TuningError::TooManyUnlockedSlots {
                requested: self.arena.initially_unlocked_slots,
                available,
            });
        }

        count("economy.core_health", self.economy.core_health)?;
        Ok(())
    }
}

fn stat_field(archetype: Archetype, stat: &'static str) -> &'static str {
    match (archetype, stat) {
        (Archetype::Arrow, "range") => "towers.arrow.stats.range",
        (Archetype::Cannon, "range") => "towers.cannon.stats.range",
        (Archetype::Ice, "range") => "towers.ice.stats.range",
        (Archetype::Laser, "range") => "towers.laser.stats.range",
        (Archetype::Lightning, "range") => "towers.lightning.stats.range",
        (Archetype::Arrow, _) => "towers.arrow.stats.attacks_per_second",
        (Archetype::Cannon, _) => "towers.cannon.stats.attacks_per_second",
        (Archetype::Ice, _) => "towers.ice.stats.attacks_per_second",
        (Archetype::Laser, _) => "towers.laser.stats.attacks_per_second",
        (Archetype::Lightning, _) => "towers.lightning.stats.attacks_per_second",
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::NonPositive { field, value })
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::OutOfUnitRange { field, value })
    }
}

fn count(field: &'static str, value: u32) -> Result<(), TuningError> {
    if value > 0 {
        Ok(())
    } else {
        Err(TuningError::ZeroCount { field })
    }
}

/// Converts configured seconds to a duration with microsecond resolution.
fn seconds(value: f32) -> Duration {
    Duration::from_micros((f64::from(value.max(0.0)) * 1_000_000.0).round() as u64)
}

/// Statistics shared by every archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Damage per hit.
    pub damage: u32,
    /// Attacks per second.
    pub attacks_per_second: f32,
    /// Attack range in world units.
    pub range: f32,
    /// Purchase price in gold.
    pub cost: u32,
}

/// Base statistics of every archetype.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeTable {
    /// Arrow tower tuning.
    pub arrow: ArrowTuning,
    /// Cannon tower tuning.
    pub cannon: CannonTuning,
    /// Ice tower tuning.
    pub ice: IceTuning,
    /// Laser tower tuning.
    pub laser: LaserTuning,
    /// Lightning tower tuning.
    pub lightning: LightningTuning,
}

impl ArchetypeTable {
    /// Base statistics of the provided archetype.
    #[must_use]
    pub fn stats(&self, archetype: Archetype) -> TowerStats {
        match archetype {
            Archetype::Arrow => self.arrow.stats,
            Archetype::Cannon => self.cannon.stats,
            Archetype::Ice => self.ice.stats,
            Archetype::Laser => self.laser.stats,
            Archetype::Lightning => self.lightning.stats,
        }
    }

    /// Purchase price of the provided archetype.
    #[must_use]
    pub fn cost(&self, archetype: Archetype) -> u32 {
        self.stats(archetype).cost
    }

    /// Archetype-specific parameters of a freshly placed, unevolved tower.
    #[must_use]
    pub fn base_params(&self, archetype: Archetype) -> ArchetypeParams {
        match archetype {
            Archetype::Arrow => ArchetypeParams::Arrow {
                projectile_speed: self.arrow.projectile_speed,
            },
            Archetype::Cannon => ArchetypeParams::Cannon {
                projectile_speed: self.cannon.projectile_speed,
                splash_radius: self.cannon.splash_radius,
            },
            Archetype::Ice => ArchetypeParams::Ice {
                projectile_speed: self.ice.projectile_speed,
                slow_multiplier: self.ice.slow_multiplier,
                slow_duration: seconds(self.ice.slow_duration_secs),
                projectile_count: self.ice.projectile_count,
            },
            Archetype::Laser => ArchetypeParams::Laser {
                extra_beams: self.laser.extra_beams,
            },
            Archetype::Lightning => ArchetypeParams::Lightning {
                chain_count: self.lightning.chain_count,
                chain_range: self.lightning.chain_range,
                chain_reduction: self.lightning.chain_reduction,
            },
        }
    }
}

/// Arrow tower tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowTuning {
    /// Shared statistics.
    pub stats: TowerStats,
    /// Projectile travel speed.
    pub projectile_speed: f32,
}

impl Default for ArrowTuning {
    fn default() -> Self {
        Self {
            stats: TowerStats {
                damage: 15,
                attacks_per_second: 2.0,
                range: 250.0,
                cost: 50,
            },
            projectile_speed: 400.0,
        }
    }
}

/// Cannon tower tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CannonTuning {
    /// Shared statistics.
    pub stats: TowerStats,
    /// Projectile travel speed.
    pub projectile_speed: f32,
    /// Splash radius around the impact point.
    pub splash_radius: f32,
    /// Splash radius once the archetype evolves.
    pub evolved_splash_radius: f32,
}

impl Default for CannonTuning {
    fn default() -> Self {
        Self {
            stats: TowerStats {
                damage: 25,
                attacks_per_second: 0.8,
                range: 200.0,
                cost: 75,
            },
            projectile_speed: 300.0,
            splash_radius: 80.0,
            evolved_splash_radius: 360.0,
        }
    }
}

/// Ice tower tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IceTuning {
    /// Shared statistics.
    pub stats: TowerStats,
    /// Projectile travel speed.
    pub projectile_speed: f32,
    /// Speed multiplier applied to slowed enemies.
    pub slow_multiplier: f32,
    /// Slow duration in seconds.
    pub slow_duration_secs: f32,
    /// Projectiles launched per attack.
    pub projectile_count: u32,
    /// Attack speed once the archetype evolves.
    pub evolved_attacks_per_second: f32,
}

impl Default for IceTuning {
    fn default() -> Self {
        Self {
            stats: TowerStats {
                damage: 8,
                attacks_per_second: 1.2,
                range: 220.0,
                cost: 80,
            },
            projectile_speed: 400.0,
            slow_multiplier: 0.5,
            slow_duration_secs: 2.0,
            projectile_count: 1,
            evolved_attacks_per_second: 10.0,
        }
    }
}

/// Laser tower tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserTuning {
    /// Shared statistics.
    pub stats: TowerStats,
    /// Extra enemies hit by each beam.
    pub extra_beams: u32,
    /// Attack speed once the archetype evolves.
    pub evolved_attacks_per_second: f32,
}

impl Default for LaserTuning {
    fn default() -> Self {
        Self {
            stats: TowerStats {
                damage: 15,
                attacks_per_second: 2.5,
                range: 250.0,
                cost: 100,
            },
            extra_beams: 0,
            evolved_attacks_per_second: 20.0,
        }
    }
}

/// Lightning tower tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightningTuning {
    /// Shared statistics.
    pub stats: TowerStats,
    /// Total hits per attack including the primary target.
    pub chain_count: u32,
    /// Maximum hop distance.
    pub chain_range: f32,
    /// Damage multiplier per hop.
    pub chain_reduction: f32,
    /// Chain count once the archetype evolves.
    pub evolved_chain_count: u32,
    /// Damage of the evolved sky strike.
    pub sky_strike_damage: u32,
    /// Seconds between evolved sky strikes.
    pub sky_strike_interval_secs: f32,
}

impl LightningTuning {
    /// Interval between evolved sky strikes.
    #[must_use]
    pub fn sky_strike_interval(&self) -> Duration {
        seconds(self.sky_strike_interval_secs)
    }
}

impl Default for LightningTuning {
    fn default() -> Self {
        Self {
            stats: TowerStats {
                damage: 20,
                attacks_per_second: 1.5,
                range: 200.0,
                cost: 120,
            },
            chain_count: 3,
            chain_range: 150.0,
            chain_reduction: 0.7,
            evolved_chain_count: 6,
            sky_strike_damage: 100,
            sky_strike_interval_secs: 5.0,
        }
    }
}

/// Linear per-wave enemy scaling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Health in wave one.
    pub base_health: u32,
    /// Health added per subsequent wave.
    pub health_per_wave: u32,
    /// Speed in wave one.
    pub base_speed: f32,
    /// Speed added per subsequent wave.
    pub speed_per_wave: f32,
    /// Contact damage in wave one.
    pub base_damage: u32,
    /// Contact damage added per subsequent wave.
    pub damage_per_wave: u32,
    /// Gold awarded per kill.
    pub gold_reward: u32,
    /// Experience awarded per kill.
    pub xp_reward: u32,
}

impl EnemyTuning {
    /// Statistics of an enemy spawned in the provided one-based wave.
    #[must_use]
    pub fn profile(&self, wave: u32) -> EnemyProfile {
        let step = wave.saturating_sub(1);
        EnemyProfile {
            max_health: self
                .base_health
                .saturating_add(self.health_per_wave.saturating_mul(step)),
            speed: self.base_speed + self.speed_per_wave * step as f32,
            damage: self
                .base_damage
                .saturating_add(self.damage_per_wave.saturating_mul(step)),
            gold_reward: self.gold_reward,
            xp_reward: self.xp_reward,
        }
    }
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            base_health: 50,
            health_per_wave: 10,
            base_speed: 80.0,
            speed_per_wave: 5.0,
            base_damage: 10,
            damage_per_wave: 2,
            gold_reward: 5,
            xp_reward: 10,
        }
    }
}

/// Wave scheduling constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Seconds before the first wave.
    pub first_wave_delay_secs: f32,
    /// Seconds between a completed wave and the next one.
    pub wave_interval_secs: f32,
    /// Enemies in wave one.
    pub base_enemy_count: u32,
    /// Enemies added per subsequent wave.
    pub enemies_per_wave: u32,
    /// Radius of the spawn circle around the objective.
    pub spawn_radius: f32,
    /// Seconds between spawns inside a wave.
    pub spawn_stagger_secs: f32,
    /// Waves in the campaign.
    pub total_waves: u32,
    /// Gold awarded for clearing a wave.
    pub wave_bonus_gold: u32,
}

impl WaveTuning {
    /// Enemies scheduled for the provided one-based wave.
    #[must_use]
    pub fn enemy_count(&self, wave: u32) -> u32 {
        self.base_enemy_count
            .saturating_add(self.enemies_per_wave.saturating_mul(wave.saturating_sub(1)))
    }

    /// Delay before the first wave.
    #[must_use]
    pub fn first_wave_delay(&self) -> Duration {
        seconds(self.first_wave_delay_secs)
    }

    /// Delay between waves.
    #[must_use]
    pub fn wave_interval(&self) -> Duration {
        seconds(self.wave_interval_secs)
    }

    /// Delay between spawns inside a wave.
    #[must_use]
    pub fn spawn_stagger(&self) -> Duration {
        seconds(self.spawn_stagger_secs)
    }
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            first_wave_delay_secs: 2.0,
            wave_interval_secs: 5.0,
            base_enemy_count: 3,
            enemies_per_wave: 3,
            spawn_radius: 600.0,
            spawn_stagger_secs: 0.3,
            total_waves: 20,
            wave_bonus_gold: 25,
        }
    }
}

/// Experience curve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionTuning {
    /// Experience required for the first level-up.
    pub first_level_xp: u32,
    /// Experience requirement added after every level-up.
    pub xp_increment: u32,
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self {
            first_level_xp: 100,
            xp_increment: 20,
        }
    }
}

/// Arena geometry and combat distances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    /// Edge length of a placement cell.
    pub cell_size: f32,
    /// Slots unlocked when the campaign starts.
    pub initially_unlocked_slots: u32,
    /// Distance under which a projectile hits its target.
    pub hit_threshold: f32,
    /// Distance under which an enemy reaches the objective.
    pub reach_radius: f32,
    /// Radius searched for a follow-up target by piercing projectiles.
    pub pierce_retarget_range: f32,
    /// Splash radius of explosive rounds.
    pub explosive_radius: f32,
}

impl ArenaTuning {
    /// Number of slots in the diamond layout.
    pub const SLOT_COUNT: u32 = 25;
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            cell_size: 80.0,
            initially_unlocked_slots: Self::SLOT_COUNT,
            hit_threshold: 10.0,
            reach_radius: 20.0,
            pierce_retarget_range: 150.0,
            explosive_radius: 40.0,
        }
    }
}

/// Starting gold and objective health.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    /// Gold available at the start of the campaign.
    pub starting_gold: u32,
    /// Objective health at the start of the campaign.
    pub core_health: u32,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            starting_gold: 400,
            core_health: 100,
        }
    }
}
