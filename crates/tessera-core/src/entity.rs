//! The entity abstraction stored by [`EntityStore`](crate::EntityStore).
//!
//! An entity is any cloneable record with an optional, client-assignable
//! identifier. When an entity is saved without an identifier, the store asks
//! the entity type for a fresh one through [`Entity::generate_new_id`].

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A record that can be kept in an [`EntityStore`](crate::EntityStore).
///
/// Identifiers must be unique within one entity type and are never reused.
///
/// # Example
///
/// ```
/// use tessera_core::Entity;
///
/// #[derive(Clone, Debug)]
/// struct Note {
///     id: Option<u64>,
///     text: String,
/// }
///
/// impl Entity for Note {
///     type Id = u64;
///
///     fn id(&self) -> Option<&u64> {
///         self.id.as_ref()
///     }
///
///     fn set_id(&mut self, id: u64) {
///         self.id = Some(id);
///     }
///
///     fn generate_new_id() -> u64 {
///         use std::sync::atomic::{AtomicU64, Ordering};
///         static NEXT: AtomicU64 = AtomicU64::new(1);
///         NEXT.fetch_add(1, Ordering::Relaxed)
///     }
/// }
/// ```
pub trait Entity: Clone + Send + Sync + 'static {
    /// The identifier type.
    type Id: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;

    /// The identifier, if one has been assigned.
    fn id(&self) -> Option<&Self::Id>;

    /// Assign the identifier.
    fn set_id(&mut self, id: Self::Id);

    /// Produce a new identifier that has never been handed out before.
    fn generate_new_id() -> Self::Id;

    /// Human-readable type name used in errors and traces.
    fn type_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// A borrowed sort order over entities.
pub type Comparator<'a, E> = &'a dyn Fn(&E, &E) -> Ordering;

/// A borrowed filter over entities.
pub type Predicate<'a, E> = &'a dyn Fn(&E) -> bool;
