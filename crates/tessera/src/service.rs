//! The widget service.
//!
//! [`WidgetService`] is the boundary a transport layer calls into. It
//! validates requests, applies the configured paging limits and delegates
//! storage to an [`EntityStore`] whose widget repository carries a
//! [`ZIndexInterceptor`].

use std::cmp::Ordering;
use std::sync::Arc;

use tessera_core::{EntityStore, PageRequest, PageResponse};

use crate::config::ServiceConfig;
use crate::error::{ConfigResult, WidgetError, WidgetResult};
use crate::filter::AreaQuery;
use crate::widget::{Widget, WidgetId, WidgetRequest};
use crate::zindex::ZIndexInterceptor;

/// Topmost first.
fn by_z_desc(a: &Widget, b: &Widget) -> Ordering {
    b.z.cmp(&a.z)
}

/// Smallest first.
fn by_area_asc(a: &Widget, b: &Widget) -> Ordering {
    a.area().total_cmp(&b.area())
}

/// Widget operations over a shared entity store.
#[derive(Debug, Clone)]
pub struct WidgetService {
    store: Arc<EntityStore>,
    config: ServiceConfig,
}

impl WidgetService {
    /// Create a service over an existing store.
    ///
    /// The store should have been built with a [`ZIndexInterceptor`] for
    /// [`Widget`]; otherwise z-indices are neither assigned nor kept unique.
    /// Fails if `config` does not validate.
    pub fn new(store: Arc<EntityStore>, config: ServiceConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Create a service over a fresh in-memory store.
    pub fn in_memory(config: ServiceConfig) -> ConfigResult<Self> {
        let store = EntityStore::builder()
            .with_interceptor::<Widget>(ZIndexInterceptor::new())
            .build();
        Self::new(Arc::new(store), config)
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// List one page of widgets.
    ///
    /// Without an area, widgets come topmost first. With an area, only the
    /// widgets lying entirely inside it are listed, smallest first.
    #[tracing::instrument(skip(self), target = "tessera::service", level = "debug")]
    pub fn list_widgets(
        &self,
        page: Option<PageRequest>,
        area: &AreaQuery,
    ) -> WidgetResult<PageResponse<Widget>> {
        let request = self.config.pagination.resolve(page)?;

        let response = match area.validate()? {
            Some(filter) => self.store.find_page_filtered::<Widget>(
                &|w: &Widget| filter.contains(w),
                &request,
                Some(&by_area_asc),
            ),
            None => self.store.find_page::<Widget>(&request, Some(&by_z_desc)),
        };

        tracing::debug!(
            target: "tessera::service",
            returned = response.records.len(),
            total = response.total,
            "listed widgets"
        );
        Ok(response)
    }

    /// Look up a widget.
    pub fn get_widget(&self, id: &WidgetId) -> Option<Widget> {
        self.store.find_by_id::<Widget>(id)
    }

    /// Create a widget with a fresh identifier.
    #[tracing::instrument(skip(self), target = "tessera::service", level = "debug")]
    pub fn create_widget(&self, request: WidgetRequest) -> WidgetResult<Widget> {
        let widget = self.store.save(request.into_widget(None)?)?;
        tracing::debug!(target: "tessera::service", id = ?widget.id, z = ?widget.z, "created widget");
        Ok(widget)
    }

    /// Replace the geometry of an existing widget.
    #[tracing::instrument(skip(self), target = "tessera::service", level = "debug")]
    pub fn modify_widget(&self, id: &WidgetId, request: WidgetRequest) -> WidgetResult<Widget> {
        let widget = request.into_widget(Some(*id))?;
        self.store.update(widget).map_err(WidgetError::from)
    }

    /// Delete a widget.
    #[tracing::instrument(skip(self), target = "tessera::service", level = "debug")]
    pub fn delete_widget(&self, id: &WidgetId) -> WidgetResult<()> {
        self.store.delete_by_id::<Widget>(id)?;
        Ok(())
    }
}
