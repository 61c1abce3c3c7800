//! The in-memory entity store.
//!
//! Storage is partitioned by entity type. Each type gets one [`Repository`],
//! which owns an [`EntityCollection`] behind a read-write lock and the
//! [`Interceptor`] chosen for that type when the store was built.
//!
//! # Key Types
//!
//! - [`Repository`] - CRUD and query engine for a single entity type
//! - [`EntityStore`] - Registry of repositories keyed by entity type
//! - [`EntityStoreBuilder`] - Attaches interceptors before the store is shared
//!
//! # Consistency
//!
//! Every write holds its repository's write lock for the whole operation: the
//! create-or-update decision, both interceptor hooks and the mutation. Readers
//! take the read lock, so they only ever see the collection between writes.
//! Different entity types never contend.
//!
//! # Example
//!
//! ```
//! use tessera_core::{Entity, EntityStore, PageRequest};
//!
//! #[derive(Clone, Debug)]
//! struct Label {
//!     id: Option<u32>,
//!     text: &'static str,
//! }
//!
//! impl Entity for Label {
//!     type Id = u32;
//!     fn id(&self) -> Option<&u32> { self.id.as_ref() }
//!     fn set_id(&mut self, id: u32) { self.id = Some(id); }
//!     fn generate_new_id() -> u32 {
//!         use std::sync::atomic::{AtomicU32, Ordering};
//!         static NEXT: AtomicU32 = AtomicU32::new(1);
//!         NEXT.fetch_add(1, Ordering::Relaxed)
//!     }
//! }
//!
//! let store = EntityStore::new();
//! let saved = store.save(Label { id: None, text: "hello" })?;
//! let id = *saved.id().unwrap();
//!
//! assert!(store.exists::<Label>(&id));
//! let page = store.find_page::<Label>(&PageRequest::default(), None);
//! assert_eq!(page.total, 1);
//! # Ok::<(), tessera_core::StoreError>(())
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::collection::EntityCollection;
use crate::entity::{Comparator, Entity, Predicate};
use crate::error::{StoreError, StoreResult};
use crate::interceptor::{Interceptor, NoopInterceptor};
use crate::logging::PerfSpan;
use crate::page::{PageRequest, PageResponse};
use crate::{store_debug, store_trace};

/// CRUD and query engine for one entity type.
pub struct Repository<E: Entity> {
    inner: RwLock<EntityCollection<E>>,
    interceptor: Box<dyn Interceptor<E>>,
}

impl<E: Entity> Repository<E> {
    /// Create an empty repository without lifecycle hooks.
    pub fn new() -> Self {
        Self::with_interceptor(NoopInterceptor)
    }

    /// Create an empty repository that runs `interceptor` around writes.
    pub fn with_interceptor(interceptor: impl Interceptor<E> + 'static) -> Self {
        Self {
            inner: RwLock::new(EntityCollection::new()),
            interceptor: Box::new(interceptor),
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Save an entity, creating or updating it.
    ///
    /// An entity without an identifier gets a fresh one and is created. An
    /// entity whose identifier is already stored replaces it; any other
    /// identifier is created as given. The returned value is the entity as
    /// stored, after interceptor changes.
    ///
    /// Fails only if the interceptor rejects the write.
    #[tracing::instrument(
        skip_all,
        target = "tessera_core::store",
        level = "debug",
        fields(entity = E::type_name())
    )]
    pub fn save(&self, entity: E) -> StoreResult<E> {
        let mut entities = self.inner.write();
        self.save_locked(&mut entities, entity)
    }

    /// Save each entity in order.
    ///
    /// The batch is not transactional; every entity is committed as soon as
    /// it has been saved. The first rejected entity stops the batch and the
    /// entities before it stay saved.
    #[tracing::instrument(
        skip_all,
        target = "tessera_core::store",
        level = "debug",
        fields(entity = E::type_name(), count = batch.len())
    )]
    pub fn save_all(&self, batch: Vec<E>) -> StoreResult<Vec<E>> {
        let mut entities = self.inner.write();
        batch
            .into_iter()
            .map(|entity| self.save_locked(&mut entities, entity))
            .collect()
    }

    /// Save an entity that must already exist.
    ///
    /// The existence check and the save happen under one lock, so a
    /// concurrent delete cannot turn the update into a create.
    pub fn update(&self, entity: E) -> StoreResult<E> {
        let id = entity.id().cloned().ok_or(StoreError::MissingId {
            type_name: E::type_name(),
        })?;

        let mut entities = self.inner.write();
        if !entities.contains(&id) {
            return Err(StoreError::not_found(E::type_name(), &id));
        }
        self.save_locked(&mut entities, entity)
    }

    fn save_locked(&self, entities: &mut EntityCollection<E>, mut entity: E) -> StoreResult<E> {
        let _perf = PerfSpan::new(crate::logging::span_names::SAVE);

        let id = match entity.id() {
            Some(id) => id.clone(),
            None => {
                let id = E::generate_new_id();
                entity.set_id(id.clone());
                id
            }
        };

        if entities.contains(&id) {
            self.interceptor.before_update(entities, &mut entity)?;
            entities.upsert(id.clone(), entity.clone());
            self.interceptor.after_update(entities, &entity);
            store_debug!(entity = E::type_name(), %id, "updated entity");
        } else {
            self.interceptor.before_create(entities, &mut entity)?;
            entities.upsert(id.clone(), entity.clone());
            self.interceptor.after_create(entities, &entity);
            store_debug!(entity = E::type_name(), %id, "created entity");
        }

        Ok(entities.get(&id).cloned().unwrap_or(entity))
    }

    /// Delete the entity with the given identifier.
    #[tracing::instrument(
        skip(self),
        target = "tessera_core::store",
        level = "debug",
        fields(entity = E::type_name())
    )]
    pub fn delete_by_id(&self, id: &E::Id) -> StoreResult<()> {
        let mut entities = self.inner.write();
        self.delete_locked(&mut entities, id)
    }

    /// Delete a stored entity, addressed by its identifier.
    pub fn delete(&self, entity: &E) -> StoreResult<()> {
        let id = entity.id().ok_or(StoreError::MissingId {
            type_name: E::type_name(),
        })?;
        self.delete_by_id(id)
    }

    /// Delete several entities in order.
    ///
    /// Stops at the first entity that is not stored; entities deleted before
    /// it stay deleted.
    pub fn delete_many(&self, batch: &[E]) -> StoreResult<()> {
        let mut entities = self.inner.write();
        for entity in batch {
            let id = entity.id().ok_or(StoreError::MissingId {
                type_name: E::type_name(),
            })?;
            self.delete_locked(&mut entities, id)?;
        }
        Ok(())
    }

    fn delete_locked(&self, entities: &mut EntityCollection<E>, id: &E::Id) -> StoreResult<()> {
        let _perf = PerfSpan::new(crate::logging::span_names::DELETE);

        let entity = entities
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(E::type_name(), id))?;

        self.interceptor.before_delete(entities, &entity)?;
        entities.remove(id);
        self.interceptor.after_delete(entities, &entity);

        store_debug!(entity = E::type_name(), %id, "deleted entity");
        Ok(())
    }

    /// Remove every entity of this type.
    ///
    /// Delete hooks do not run.
    pub fn delete_all(&self) {
        let mut entities = self.inner.write();
        let removed = entities.len();
        entities.clear();
        store_debug!(entity = E::type_name(), removed, "cleared collection");
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get an entity by identifier.
    pub fn find_by_id(&self, id: &E::Id) -> Option<E> {
        store_trace!(entity = E::type_name(), %id, "find by id");
        self.inner.read().get(id).cloned()
    }

    /// Check if an entity with this identifier exists.
    pub fn exists(&self, id: &E::Id) -> bool {
        self.inner.read().contains(id)
    }

    /// Number of stored entities.
    pub fn count(&self) -> usize {
        self.inner.read().len()
    }

    /// Snapshot every entity, sorted by `sort` or in insertion order.
    ///
    /// Sorting is stable.
    pub fn find_all(&self, sort: Option<Comparator<'_, E>>) -> Vec<E> {
        self.query(None, sort)
    }

    /// Snapshot the entities matching `filter`, sorted by `sort` or in insertion order.
    pub fn find_all_filtered(
        &self,
        filter: Predicate<'_, E>,
        sort: Option<Comparator<'_, E>>,
    ) -> Vec<E> {
        self.query(Some(filter), sort)
    }

    /// One page of every entity, sorted by `sort` or in insertion order.
    pub fn find_page(
        &self,
        request: &PageRequest,
        sort: Option<Comparator<'_, E>>,
    ) -> PageResponse<E> {
        let records = self.find_all(sort);
        if records.is_empty() {
            return PageResponse::empty();
        }
        PageResponse::create(records, request)
    }

    /// One page of the entities matching `filter`.
    ///
    /// `total` counts every match, not just the records on the page.
    pub fn find_page_filtered(
        &self,
        filter: Predicate<'_, E>,
        request: &PageRequest,
        sort: Option<Comparator<'_, E>>,
    ) -> PageResponse<E> {
        PageResponse::create(self.find_all_filtered(filter, sort), request)
    }

    fn query(&self, filter: Option<Predicate<'_, E>>, sort: Option<Comparator<'_, E>>) -> Vec<E> {
        let _perf = PerfSpan::new(crate::logging::span_names::QUERY);

        // Filtering before a stable sort yields the same order as filtering after it.
        let mut records: Vec<E> = {
            let entities = self.inner.read();
            match filter {
                Some(filter) => entities.iter().filter(|e| filter(e)).cloned().collect(),
                None => entities.snapshot(),
            }
        };

        if let Some(sort) = sort {
            records.sort_by(|a, b| sort(a, b));
        }

        store_trace!(entity = E::type_name(), matched = records.len(), "query");
        records
    }

    // =========================================================================
    // Advanced Access
    // =========================================================================

    /// Access the collection with a read lock for complex queries.
    pub fn with_read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&EntityCollection<E>) -> R,
    {
        f(&self.inner.read())
    }
}

impl<E: Entity> Default for Repository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &E::type_name())
            .field("count", &self.count())
            .finish()
    }
}

type ErasedRepository = Box<dyn Any + Send + Sync>;

/// Registry of per-type repositories.
///
/// Build one store at startup (usually through [`EntityStore::builder`]) and
/// share it with an `Arc`. Entity types that were never registered are given
/// a repository without interceptor on first use.
pub struct EntityStore {
    repositories: RwLock<HashMap<TypeId, ErasedRepository>>,
}

impl EntityStore {
    /// Create a store with no interceptors.
    pub fn new() -> Self {
        Self {
            repositories: RwLock::new(HashMap::new()),
        }
    }

    /// Start building a store with per-type interceptors.
    pub fn builder() -> EntityStoreBuilder {
        EntityStoreBuilder::new()
    }

    /// Get the repository for an entity type, creating it if needed.
    pub fn repository<E: Entity>(&self) -> Arc<Repository<E>> {
        let type_id = TypeId::of::<E>();

        if let Some(repository) = self
            .repositories
            .read()
            .get(&type_id)
            .and_then(|erased| erased.downcast_ref::<Arc<Repository<E>>>())
        {
            return Arc::clone(repository);
        }

        let mut repositories = self.repositories.write();
        let erased = repositories
            .entry(type_id)
            .or_insert_with(|| Box::new(Arc::new(Repository::<E>::new())) as ErasedRepository);

        match erased.downcast_ref::<Arc<Repository<E>>>() {
            Some(repository) => Arc::clone(repository),
            None => {
                let repository = Arc::new(Repository::<E>::new());
                *erased = Box::new(Arc::clone(&repository));
                repository
            }
        }
    }

    /// Number of entity types with a repository.
    pub fn type_count(&self) -> usize {
        self.repositories.read().len()
    }

    /// Save an entity, creating or updating it. See [`Repository::save`].
    pub fn save<E: Entity>(&self, entity: E) -> StoreResult<E> {
        self.repository::<E>().save(entity)
    }

    /// Save each entity in order. See [`Repository::save_all`].
    pub fn save_all<E: Entity>(&self, entities: Vec<E>) -> StoreResult<Vec<E>> {
        self.repository::<E>().save_all(entities)
    }

    /// Save an entity that must already exist. See [`Repository::update`].
    pub fn update<E: Entity>(&self, entity: E) -> StoreResult<E> {
        self.repository::<E>().update(entity)
    }

    /// Get an entity by type and identifier.
    pub fn find_by_id<E: Entity>(&self, id: &E::Id) -> Option<E> {
        self.repository::<E>().find_by_id(id)
    }

    /// Snapshot every entity of a type.
    pub fn find_all<E: Entity>(&self, sort: Option<Comparator<'_, E>>) -> Vec<E> {
        self.repository::<E>().find_all(sort)
    }

    /// Snapshot the entities of a type matching `filter`.
    pub fn find_all_filtered<E: Entity>(
        &self,
        filter: Predicate<'_, E>,
        sort: Option<Comparator<'_, E>>,
    ) -> Vec<E> {
        self.repository::<E>().find_all_filtered(filter, sort)
    }

    /// One page of every entity of a type.
    pub fn find_page<E: Entity>(
        &self,
        request: &PageRequest,
        sort: Option<Comparator<'_, E>>,
    ) -> PageResponse<E> {
        self.repository::<E>().find_page(request, sort)
    }

    /// One page of the entities of a type matching `filter`.
    pub fn find_page_filtered<E: Entity>(
        &self,
        filter: Predicate<'_, E>,
        request: &PageRequest,
        sort: Option<Comparator<'_, E>>,
    ) -> PageResponse<E> {
        self.repository::<E>()
            .find_page_filtered(filter, request, sort)
    }

    /// Delete an entity by type and identifier.
    pub fn delete_by_id<E: Entity>(&self, id: &E::Id) -> StoreResult<()> {
        self.repository::<E>().delete_by_id(id)
    }

    /// Delete a stored entity.
    pub fn delete<E: Entity>(&self, entity: &E) -> StoreResult<()> {
        self.repository::<E>().delete(entity)
    }

    /// Delete several entities of one type. See [`Repository::delete_many`].
    pub fn delete_many<E: Entity>(&self, entities: &[E]) -> StoreResult<()> {
        self.repository::<E>().delete_many(entities)
    }

    /// Remove every entity of a type.
    pub fn delete_all<E: Entity>(&self) {
        self.repository::<E>().delete_all()
    }

    /// Check if an entity of a type exists.
    pub fn exists<E: Entity>(&self, id: &E::Id) -> bool {
        self.repository::<E>().exists(id)
    }

    /// Number of stored entities of a type.
    pub fn count<E: Entity>(&self) -> usize {
        self.repository::<E>().count()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("types", &self.type_count())
            .finish()
    }
}

static_assertions::assert_impl_all!(EntityStore: Send, Sync);

/// Builder that attaches interceptors to entity types.
///
/// # Example
///
/// ```
/// use tessera_core::{Entity, EntityCollection, EntityStore, Interceptor, StoreError, StoreResult};
///
/// #[derive(Clone, Debug)]
/// struct Note {
///     id: Option<u32>,
///     text: String,
/// }
///
/// impl Entity for Note {
///     type Id = u32;
///     fn id(&self) -> Option<&u32> { self.id.as_ref() }
///     fn set_id(&mut self, id: u32) { self.id = Some(id); }
///     fn generate_new_id() -> u32 {
///         use std::sync::atomic::{AtomicU32, Ordering};
///         static NEXT: AtomicU32 = AtomicU32::new(1);
///         NEXT.fetch_add(1, Ordering::Relaxed)
///     }
/// }
///
/// struct Trim;
///
/// impl Interceptor<Note> for Trim {
///     fn before_create(&self, _notes: &mut EntityCollection<Note>, note: &mut Note) -> StoreResult<()> {
///         note.text = note.text.trim().to_string();
///         if note.text.is_empty() {
///             return Err(StoreError::rejected("Note", "text is blank"));
///         }
///         Ok(())
///     }
/// }
///
/// let store = EntityStore::builder().with_interceptor::<Note>(Trim).build();
/// let note = store.save(Note { id: None, text: "  hi  ".into() })?;
/// assert_eq!(note.text, "hi");
/// assert!(store.save(Note { id: None, text: "   ".into() }).is_err());
/// assert_eq!(store.count::<Note>(), 1);
/// # Ok::<(), StoreError>(())
/// ```
pub struct EntityStoreBuilder {
    repositories: HashMap<TypeId, ErasedRepository>,
}

impl EntityStoreBuilder {
    /// Create a builder with no interceptors.
    pub fn new() -> Self {
        Self {
            repositories: HashMap::new(),
        }
    }

    /// Run `interceptor` around every write of entity type `E`.
    ///
    /// Registering a second interceptor for the same type replaces the first.
    pub fn with_interceptor<E: Entity>(mut self, interceptor: impl Interceptor<E> + 'static) -> Self {
        let repository = Arc::new(Repository::<E>::with_interceptor(interceptor));
        self.repositories
            .insert(TypeId::of::<E>(), Box::new(repository));
        self
    }

    /// Finish building the store.
    pub fn build(self) -> EntityStore {
        EntityStore {
            repositories: RwLock::new(self.repositories),
        }
    }
}

impl Default for EntityStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
