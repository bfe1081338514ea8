//! Upgrade descriptors offered on level-up.

use serde::{Deserialize, Serialize};

use crate::Archetype;

/// Effect category of an upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Raises the global damage multiplier.
    TowerDamage,
    /// Raises the global attack speed multiplier.
    TowerAttackSpeed,
    /// Raises the global range multiplier.
    TowerRange,
    /// Unlocks additional placement slots.
    UnlockSlots,
    /// Raises the objective's maximum health and heals it.
    FortifyCore,
    /// Adds passive objective regeneration per second.
    Regeneration,
    /// Lets projectiles pass through additional enemies.
    Piercing,
    /// Makes direct projectile hits explode.
    Explosive,
    /// Raises the gold multiplier on kills.
    GoldRush,
    /// Adds chain hops to lightning towers.
    ChainLightning,
    /// Enlarges cannon splash.
    BiggerBoom,
    /// Adds projectiles to ice volleys.
    FrostNova,
    /// Adds laser beams.
    LaserBarrage,
}

/// Upgrade offered to the player on level-up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    name: String,
    description: String,
    kind: UpgradeKind,
    magnitude: f32,
    required_archetype: Option<Archetype>,
}

impl Upgrade {
    /// Creates a new upgrade descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: UpgradeKind,
        magnitude: f32,
        required_archetype: Option<Archetype>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            magnitude,
            required_archetype,
        }
    }

    /// Display name of the upgrade.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short description shown alongside the name.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Effect category.
    #[must_use]
    pub const fn kind(&self) -> UpgradeKind {
        self.kind
    }

    /// Strength of the effect; its unit depends on the kind.
    #[must_use]
    pub const fn magnitude(&self) -> f32 {
        self.magnitude
    }

    /// Archetype that must be fielded before the upgrade can be offered.
    #[must_use]
    pub const fn required_archetype(&self) -> Option<Archetype> {
        self.required_archetype
    }

    /// Archetype whose rank the upgrade advances, if any.
    #[must_use]
    pub const fn ranked_archetype(&self) -> Option<Archetype> {
        match self.kind {
            UpgradeKind::ChainLightning => Some(Archetype::Lightning),
            UpgradeKind::BiggerBoom => Some(Archetype::Cannon),
            UpgradeKind::FrostNova => Some(Archetype::Ice),
            UpgradeKind::LaserBarrage => Some(Archetype::Laser),
            _ => None,
        }
    }
}
