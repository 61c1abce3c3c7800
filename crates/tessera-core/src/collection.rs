//! Homogeneous, insertion-ordered entity storage.
//!
//! [`EntityCollection`] holds every entity of one type. Entities live in a
//! SlotMap arena; an identifier index gives constant-time lookups and a key list
//! remembers insertion order so unsorted reads are deterministic.
//!
//! Interceptors receive `&mut EntityCollection<E>` while the owning repository
//! holds its write lock, which is how they read and adjust sibling entities as
//! part of one atomic save.

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use crate::entity::Entity;

new_key_type! {
    /// Arena key for an entity slot inside an [`EntityCollection`].
    ///
    /// Keys are internal handles; callers address entities by [`Entity::Id`].
    pub struct EntityKey;
}

/// All entities of one type.
pub struct EntityCollection<E: Entity> {
    entities: SlotMap<EntityKey, E>,
    index: HashMap<E::Id, EntityKey>,
    /// Insertion order. Replacing an entity keeps its position.
    order: Vec<EntityKey>,
}

impl<E: Entity> EntityCollection<E> {
    /// Create a new empty collection.
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            index: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entities are stored.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Check if an entity with this identifier exists.
    pub fn contains(&self, id: &E::Id) -> bool {
        self.index.contains_key(id)
    }

    /// Get an entity by identifier.
    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.index.get(id).and_then(|&key| self.entities.get(key))
    }

    /// Get a mutable reference to an entity by identifier.
    ///
    /// The identifier of the returned entity must not be changed.
    pub fn get_mut(&mut self, id: &E::Id) -> Option<&mut E> {
        let key = *self.index.get(id)?;
        self.entities.get_mut(key)
    }

    /// Iterate over entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &E> + '_ {
        self.order.iter().filter_map(|&key| self.entities.get(key))
    }

    /// Clone every entity in insertion order.
    pub fn snapshot(&self) -> Vec<E> {
        self.iter().cloned().collect()
    }

    /// Insert an entity under `id`, replacing any entity with that identifier in place.
    ///
    /// Returns the replaced entity, if there was one. `id` must equal the
    /// entity's own identifier.
    pub(crate) fn upsert(&mut self, id: E::Id, entity: E) -> Option<E> {
        if let Some(&key) = self.index.get(&id) {
            if let Some(slot) = self.entities.get_mut(key) {
                return Some(std::mem::replace(slot, entity));
            }
        }

        let key = self.entities.insert(entity);
        self.index.insert(id, key);
        self.order.push(key);
        None
    }

    /// Remove an entity by identifier.
    pub(crate) fn remove(&mut self, id: &E::Id) -> Option<E> {
        let key = self.index.remove(id)?;
        self.order.retain(|&k| k != key);
        self.entities.remove(key)
    }

    /// Remove every entity.
    pub(crate) fn clear(&mut self) {
        self.entities.clear();
        self.index.clear();
        self.order.clear();
    }
}

impl<E: Entity> Default for EntityCollection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity + std::fmt::Debug> std::fmt::Debug for EntityCollection<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Clone, Debug, PartialEq)]
    struct Tile {
        id: Option<u32>,
        label: &'static str,
    }

    impl Tile {
        fn new(id: u32, label: &'static str) -> Self {
            Self {
                id: Some(id),
                label,
            }
        }
    }

    impl Entity for Tile {
        type Id = u32;

        fn id(&self) -> Option<&u32> {
            self.id.as_ref()
        }

        fn set_id(&mut self, id: u32) {
            self.id = Some(id);
        }

        fn generate_new_id() -> u32 {
            static NEXT: AtomicU32 = AtomicU32::new(1000);
            NEXT.fetch_add(1, Ordering::Relaxed)
        }
    }

    fn put(collection: &mut EntityCollection<Tile>, tile: Tile) -> Option<Tile> {
        let id = tile.id.unwrap();
        collection.upsert(id, tile)
    }

    fn labels(collection: &EntityCollection<Tile>) -> Vec<&'static str> {
        collection.iter().map(|t| t.label).collect()
    }

    #[test]
    fn test_insertion_order() {
        let mut collection = EntityCollection::new();
        put(&mut collection, Tile::new(3, "c"));
        put(&mut collection, Tile::new(1, "a"));
        put(&mut collection, Tile::new(2, "b"));

        assert_eq!(collection.len(), 3);
        assert_eq!(labels(&collection), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut collection = EntityCollection::new();
        put(&mut collection, Tile::new(1, "a"));
        put(&mut collection, Tile::new(2, "b"));

        let replaced = put(&mut collection, Tile::new(1, "a2"));

        assert_eq!(replaced, Some(Tile::new(1, "a")));
        assert_eq!(collection.len(), 2);
        assert_eq!(labels(&collection), vec!["a2", "b"]);
    }

    #[test]
    fn test_remove_and_reinsert() {
        let mut collection = EntityCollection::new();
        put(&mut collection, Tile::new(1, "a"));
        put(&mut collection, Tile::new(2, "b"));
        put(&mut collection, Tile::new(3, "c"));

        assert_eq!(collection.remove(&2), Some(Tile::new(2, "b")));
        assert_eq!(collection.remove(&2), None);
        assert!(!collection.contains(&2));

        put(&mut collection, Tile::new(4, "d"));
        assert_eq!(labels(&collection), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_get_mut_and_clear() {
        let mut collection = EntityCollection::new();
        put(&mut collection, Tile::new(7, "x"));

        if let Some(tile) = collection.get_mut(&7) {
            tile.label = "y";
        }
        assert_eq!(collection.get(&7).map(|t| t.label), Some("y"));

        collection.clear();
        assert!(collection.is_empty());
        assert!(collection.get(&7).is_none());
    }
}
