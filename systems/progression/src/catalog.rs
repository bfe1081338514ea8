//! Static upgrade catalog validated once at startup.
//!
//! Entries are declared with a free-form archetype gate so the catalog reads
//! like a design table. [`Catalog::from_entries`] parses every gate and refuses
//! to build a catalog that could not drive the upgrade engine.

use std::collections::BTreeSet;

use bastion_core::{Archetype, TowerView, Upgrade, UpgradeKind};
use thiserror::Error;

/// Towers of an archetype that must be fielded before its gated upgrades are offered.
pub const GATE_THRESHOLD: usize = 3;

/// Weight of a gated entry in the draw pool relative to a general one.
pub const GATED_WEIGHT: usize = 3;

/// Candidates presented on every level-up.
pub const CHOICE_COUNT: usize = 3;

/// Unvalidated catalog row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CatalogEntry {
    /// Display name, unique within the catalog.
    pub name: &'static str,
    /// Short description shown alongside the name.
    pub description: &'static str,
    /// Effect category.
    pub kind: UpgradeKind,
    /// Strength of the effect.
    pub magnitude: f32,
    /// Archetype name that gates the entry, if any.
    pub gate: Option<&'static str>,
}

impl CatalogEntry {
    const fn general(
        name: &'static str,
        description: &'static str,
        kind: UpgradeKind,
        magnitude: f32,
    ) -> Self {
        Self {
            name,
            description,
            kind,
            magnitude,
            gate: None,
        }
    }

    const fn gated(
        name: &'static str,
        description: &'static str,
        kind: UpgradeKind,
        magnitude: f32,
        gate: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            kind,
            magnitude,
            gate: Some(gate),
        }
    }
}

/// Rows of the standard campaign catalog.
pub const STANDARD_ENTRIES: [CatalogEntry; 16] = [
    CatalogEntry::general("Sharp Arrows", "+25% tower damage", UpgradeKind::TowerDamage, 0.25),
    CatalogEntry::general("Deadly Shots", "+50% tower damage", UpgradeKind::TowerDamage, 0.5),
    CatalogEntry::general("Quick Draw", "+30% attack speed", UpgradeKind::TowerAttackSpeed, 0.3),
    CatalogEntry::general("Rapid Fire", "+60% attack speed", UpgradeKind::TowerAttackSpeed, 0.6),
    CatalogEntry::general("Eagle Eye", "+40% tower range", UpgradeKind::TowerRange, 0.4),
    CatalogEntry::general("Sniper Scope", "+80% tower range", UpgradeKind::TowerRange, 0.8),
    CatalogEntry::general("Expand Grid", "Unlock 2 slots", UpgradeKind::UnlockSlots, 2.0),
    CatalogEntry::general("Fortify Core", "+50 max core health", UpgradeKind::FortifyCore, 50.0),
    CatalogEntry::general("Regeneration", "Core heals 5 HP per second", UpgradeKind::Regeneration, 5.0),
    CatalogEntry::general("Piercing Shots", "Projectiles pierce 1 enemy", UpgradeKind::Piercing, 1.0),
    CatalogEntry::general("Explosive Rounds", "Projectiles explode on impact", UpgradeKind::Explosive, 1.0),
    CatalogEntry::general("Gold Rush", "+50% gold from kills", UpgradeKind::GoldRush, 0.5),
    CatalogEntry::gated(
        "Chain Lightning+",
        "+1 chain target",
        UpgradeKind::ChainLightning,
        1.0,
        "Lightning",
    ),
    CatalogEntry::gated(
        "Bigger Boom",
        "+30% explosion radius",
        UpgradeKind::BiggerBoom,
        0.3,
        "Cannon",
    ),
    CatalogEntry::gated("Frost Nova", "+2 projectiles per volley", UpgradeKind::FrostNova, 2.0, "Ice"),
    CatalogEntry::gated("Laser Barrage", "Fire 2 extra beams", UpgradeKind::LaserBarrage, 2.0, "Laser"),
];

/// Configuration defects detected while building a catalog.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CatalogError {
    /// A gate does not name a tower archetype.
    #[error("upgrade '{name}' is gated on unknown archetype '{gate}'")]
    UnknownArchetype {
        /// Entry carrying the gate.
        name: String,
        /// Gate text as declared.
        gate: String,
    },
    /// Two entries share a name.
    #[error("upgrade '{0}' is declared twice")]
    DuplicateName(String),
    /// A magnitude is zero, negative or not finite.
    #[error("upgrade '{name}' has non-positive magnitude {magnitude}")]
    NonPositiveMagnitude {
        /// Offending entry.
        name: String,
        /// Declared magnitude.
        magnitude: f32,
    },
    /// The gate does not match the archetype the effect ranks up.
    #[error("upgrade '{name}' is gated on {found:?} but its effect belongs to {expected:?}")]
    GateMismatch {
        /// Offending entry.
        name: String,
        /// Archetype the effect ranks up, if any.
        expected: Option<Archetype>,
        /// Archetype named by the gate, if any.
        found: Option<Archetype>,
    },
    /// Too few ungated entries to always offer a full set of distinct choices.
    #[error("catalog needs at least 3 general upgrades, found {found}")]
    TooFewGeneralEntries {
        /// General entries present.
        found: usize,
    },
}

/// Validated, immutable set of upgrades.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    upgrades: Vec<Upgrade>,
}

impl Catalog {
    /// Builds the standard campaign catalog.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::from_entries(&STANDARD_ENTRIES)
    }

    /// Validates raw entries into a catalog.
    pub fn from_entries(entries: &[CatalogEntry]) -> Result<Self, CatalogError> {
        let mut names = BTreeSet::new();
        let mut upgrades = Vec::with_capacity(entries.len());

        for entry in entries {
            if !names.insert(entry.name) {
                return Err(CatalogError::DuplicateName(entry.name.to_owned()));
            }
            if !(entry.magnitude.is_finite() && entry.magnitude > 0.0) {
                return Err(CatalogError::NonPositiveMagnitude {
                    name: entry.name.to_owned(),
                    magnitude: entry.magnitude,
                });
            }
            let gate = entry
                .gate
                .map(|gate| {
                    gate.parse::<Archetype>()
                        .map_err(|_| CatalogError::UnknownArchetype {
                            name: entry.name.to_owned(),
                            gate: gate.to_owned(),
                        })
                })
                .transpose()?;

            let upgrade = Upgrade::new(entry.name, entry.description, entry.kind, entry.magnitude, gate);
            if upgrade.ranked_archetype() != gate {
                return Err(CatalogError::GateMismatch {
                    name: entry.name.to_owned(),
                    expected: upgrade.ranked_archetype(),
                    found: gate,
                });
            }
            upgrades.push(upgrade);
        }

        let general = upgrades
            .iter()
            .filter(|upgrade| upgrade.required_archetype().is_none())
            .count();
        if general < CHOICE_COUNT {
            return Err(CatalogError::TooFewGeneralEntries { found: general });
        }

        Ok(Self { upgrades })
    }

    /// Every upgrade in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Upgrade> {
        self.upgrades.iter()
    }

    /// Number of upgrades.
    #[must_use]
    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    /// Reports whether the catalog is empty. Validated catalogs never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }

    /// Looks an upgrade up by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Upgrade> {
        self.upgrades.iter().find(|upgrade| upgrade.name() == name)
    }

    /// Reports whether the upgrade may be offered given the fielded towers.
    #[must_use]
    pub fn is_eligible(upgrade: &Upgrade, towers: &TowerView) -> bool {
        upgrade
            .required_archetype()
            .map_or(true, |archetype| towers.count(archetype) >= GATE_THRESHOLD)
    }

    /// Draw pool for the fielded towers, gated entries repeated by their weight.
    #[must_use]
    pub fn weighted_pool(&self, towers: &TowerView) -> Vec<&Upgrade> {
        let mut pool = Vec::new();
        for upgrade in self.upgrades.iter().filter(|upgrade| Self::is_eligible(upgrade, towers)) {
            let weight = if upgrade.required_archetype().is_some() {
                GATED_WEIGHT
            } else {
                1
            };
            pool.extend(std::iter::repeat(upgrade).take(weight));
        }
        pool
    }
}
