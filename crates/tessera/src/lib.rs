//! Tessera: z-ordered widgets on a shared plane.
//!
//! Every widget has a position, a size and an integer z-index. The store
//! guarantees that no two stored widgets share a z-index: a widget created or
//! moved onto an occupied z-index pushes the occupant, and everything above
//! it, up by one.
//!
//! # Example
//!
//! ```
//! use tessera::{AreaQuery, ServiceConfig, WidgetRequest, WidgetService};
//!
//! let service = WidgetService::in_memory(ServiceConfig::default())?;
//!
//! let a = service.create_widget(WidgetRequest::new(0, 0, 10.0, 10.0))?;
//! let b = service.create_widget(WidgetRequest::new(5, 5, 10.0, 10.0).with_z(0))?;
//!
//! assert_eq!(b.z, Some(0));
//! assert_eq!(service.get_widget(&a.id.unwrap()).unwrap().z, Some(1));
//!
//! let page = service.list_widgets(None, &AreaQuery::default())?;
//! assert_eq!(page.total, 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
mod error;
pub mod filter;
pub mod service;
pub mod widget;
pub mod zindex;

pub use config::{PaginationConfig, ServiceConfig};
pub use error::{ConfigError, ConfigResult, WidgetError, WidgetResult};
pub use filter::{AreaFilter, AreaQuery};
pub use service::WidgetService;
pub use widget::{Widget, WidgetId, WidgetRequest};
pub use zindex::{next_z_index, Clock, SystemClock, ZIndexInterceptor};

pub use tessera_core::{PageRequest, PageResponse, StoreError};
