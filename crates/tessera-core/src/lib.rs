//! Core storage for Tessera.
//!
//! This crate provides the generic, in-memory persistence layer that the
//! Tessera widget service is built on:
//!
//! - **Entities**: any cloneable record with a client-assignable or generated identifier
//! - **Entity Store**: type-partitioned CRUD with filter, sort and pagination queries
//! - **Interceptors**: lifecycle hooks run atomically around create, update and delete
//! - **Pagination**: page request/response values and the shared slicing rule
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use tessera_core::{Entity, EntityStore, PageRequest};
//!
//! #[derive(Clone, Debug)]
//! struct Card {
//!     id: Option<u64>,
//!     rank: u32,
//! }
//!
//! impl Entity for Card {
//!     type Id = u64;
//!
//!     fn id(&self) -> Option<&u64> {
//!         self.id.as_ref()
//!     }
//!
//!     fn set_id(&mut self, id: u64) {
//!         self.id = Some(id);
//!     }
//!
//!     fn generate_new_id() -> u64 {
//!         static NEXT: AtomicU64 = AtomicU64::new(1);
//!         NEXT.fetch_add(1, Ordering::Relaxed)
//!     }
//! }
//!
//! let store = EntityStore::new();
//! store.save_all(vec![
//!     Card { id: None, rank: 3 },
//!     Card { id: None, rank: 1 },
//!     Card { id: None, rank: 2 },
//! ])?;
//!
//! let by_rank = |a: &Card, b: &Card| a.rank.cmp(&b.rank);
//! let page = store.find_page::<Card>(&PageRequest::new(0, 2)?, Some(&by_rank));
//!
//! assert_eq!(page.total, 3);
//! assert_eq!(page.records.iter().map(|c| c.rank).collect::<Vec<_>>(), vec![1, 2]);
//! # Ok::<(), tessera_core::StoreError>(())
//! ```

pub mod collection;
pub mod entity;
mod error;
pub mod interceptor;
pub mod logging;
pub mod page;
pub mod store;

pub use collection::{EntityCollection, EntityKey};
pub use entity::{Comparator, Entity, Predicate};
pub use error::{StoreError, StoreResult};
pub use interceptor::{Interceptor, NoopInterceptor};
pub use logging::PerfSpan;
pub use page::{PageRequest, PageResponse, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use store::{EntityStore, EntityStoreBuilder, Repository};
