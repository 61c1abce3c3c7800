//! Lifecycle interception for entity writes.
//!
//! An [`Interceptor`] is attached to one entity type when the
//! [`EntityStore`](crate::EntityStore) is built. The store calls its hooks
//! around every create, update and delete of that type while holding the
//! type's write lock, so a hook can read and adjust the rest of the collection
//! without racing other writers.
//!
//! Every hook has an empty default body; [`NoopInterceptor`] is the
//! interceptor used for types that were never given one.

use crate::collection::EntityCollection;
use crate::entity::Entity;
use crate::error::StoreResult;

/// Hooks invoked by the store around entity mutation.
///
/// `before_*` hooks run before the collection changes and may rewrite the
/// incoming entity. Returning an error from one aborts the write, and the
/// store returns that error to the caller. `after_*` hooks run once the
/// collection reflects the change; the entity they receive equals the stored
/// one. They cannot fail, so anything that could go wrong in them has to be
/// checked in the matching `before_*` hook.
pub trait Interceptor<E: Entity>: Send + Sync {
    /// Runs before a new entity is inserted.
    fn before_create(
        &self,
        _entities: &mut EntityCollection<E>,
        _entity: &mut E,
    ) -> StoreResult<()> {
        Ok(())
    }

    /// Runs after a new entity is inserted.
    fn after_create(&self, _entities: &mut EntityCollection<E>, _entity: &E) {}

    /// Runs before an existing entity is replaced.
    fn before_update(
        &self,
        _entities: &mut EntityCollection<E>,
        _entity: &mut E,
    ) -> StoreResult<()> {
        Ok(())
    }

    /// Runs after an existing entity is replaced.
    fn after_update(&self, _entities: &mut EntityCollection<E>, _entity: &E) {}

    /// Runs before an entity is removed.
    fn before_delete(&self, _entities: &mut EntityCollection<E>, _entity: &E) -> StoreResult<()> {
        Ok(())
    }

    /// Runs after an entity is removed.
    fn after_delete(&self, _entities: &mut EntityCollection<E>, _entity: &E) {}
}

/// An interceptor that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInterceptor;

impl<E: Entity> Interceptor<E> for NoopInterceptor {}
