//! Identifier-keyed storage shared by every entity collection.

use std::collections::BTreeMap;

use bastion_core::{EnemyId, ProjectileId, TowerId};

/// Identifier type that a registry can allocate.
pub(crate) trait Identifier: Copy + Ord {
    /// Builds the identifier for the provided allocation index.
    fn from_index(index: u32) -> Self;
}

impl Identifier for EnemyId {
    fn from_index(index: u32) -> Self {
        EnemyId::new(index)
    }
}

impl Identifier for TowerId {
    fn from_index(index: u32) -> Self {
        TowerId::new(index)
    }
}

impl Identifier for ProjectileId {
    fn from_index(index: u32) -> Self {
        ProjectileId::new(index)
    }
}

/// Entity that can be flagged for removal at the next sweep.
pub(crate) trait Sweepable {
    /// Reports whether the entity should be removed at the next sweep.
    fn is_retired(&self) -> bool;
}

/// Registry that stores entities and manages identifier allocation.
///
/// Identifiers grow monotonically, so iteration order is creation order.
/// Entities are flagged rather than removed while a tick is in flight and
/// dropped by [`Registry::sweep`].
#[derive(Debug)]
pub(crate) struct Registry<K, V> {
    entries: BTreeMap<K, V>,
    next_index: u32,
}

impl<K: Identifier, V: Sweepable> Registry<K, V> {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_index: 0,
        }
    }

    /// Stores the entity built by `build` under a freshly allocated identifier.
    pub(crate) fn insert_with(&mut self, build: impl FnOnce(K) -> V) -> K {
        let id = K::from_index(self.next_index);
        self.next_index = self.next_index.saturating_add(1);
        let _ = self.entries.insert(id, build(id));
        id
    }

    pub(crate) fn get(&self, id: K) -> Option<&V> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: K) -> Option<&mut V> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.values_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drops every retired entity, returning how many were removed.
    pub(crate) fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_retired());
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Marker {
        retired: bool,
    }

    impl Sweepable for Marker {
        fn is_retired(&self) -> bool {
            self.retired
        }
    }

    #[test]
    fn registry_allocates_monotonic_identifiers() {
        let mut registry: Registry<EnemyId, Marker> = Registry::new();
        let first = registry.insert_with(|_| Marker { retired: false });
        let second = registry.insert_with(|_| Marker { retired: false });
        assert_eq!(first, EnemyId::new(0));
        assert_eq!(second, EnemyId::new(1));
    }

    #[test]
    fn sweep_removes_only_retired_entries() {
        let mut registry: Registry<TowerId, Marker> = Registry::new();
        let kept = registry.insert_with(|_| Marker { retired: false });
        let dropped = registry.insert_with(|_| Marker { retired: true });

        assert_eq!(registry.sweep(), 1);
        assert!(registry.get(kept).is_some());
        assert!(registry.get(dropped).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn identifiers_are_not_reused_after_sweep() {
        let mut registry: Registry<ProjectileId, Marker> = Registry::new();
        let _ = registry.insert_with(|_| Marker { retired: true });
        let _ = registry.sweep();
        let next = registry.insert_with(|_| Marker { retired: false });
        assert_eq!(next, ProjectileId::new(1));
    }
}
