//! Z-index normalization for widgets.
//!
//! [`ZIndexInterceptor`] keeps every stored widget on a distinct z-index. It
//! runs inside the store's write lock for the widget type, so the checks and
//! shifts below are atomic with respect to other widget writes.
//!
//! On every create or update:
//!
//! 1. `last_modified` is stamped with the current time.
//! 2. A widget without a z-index is placed on top: `max(z) + 1`, or `0` for
//!    the first widget.
//! 3. Once stored, if another widget holds the same z-index, every *other*
//!    widget with `z >= widget.z` moves up by one in a single pass. Moving the
//!    whole tail by the same delta keeps it collision-free, and nothing below
//!    the threshold is touched.
//!
//! A widget that is updated without changing its z-index never triggers a
//! shift, because it only collides with itself.
//!
//! z-indices never wrap or saturate. A write that would need a z-index above
//! `i32::MAX`, whether assigned or reached by a shift, is rejected with
//! [`StoreError::Rejected`] before anything changes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tessera_core::logging::targets;
use tessera_core::{Entity, EntityCollection, Interceptor, StoreError, StoreResult};

use crate::widget::{Widget, WidgetId};

/// Source of the current time for `last_modified` stamps.
pub trait Clock: Send + Sync {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// The z-index placed above every stored widget.
///
/// `None` once a widget holds `i32::MAX`.
pub fn next_z_index(widgets: &EntityCollection<Widget>) -> Option<i32> {
    match widgets.iter().filter_map(|w| w.z).max() {
        Some(max) => max.checked_add(1),
        None => Some(0),
    }
}

/// Widgets other than `id` at or above `z`, if one of them sits exactly on `z`.
fn collision_tail(
    widgets: &EntityCollection<Widget>,
    id: WidgetId,
    z: i32,
) -> Option<Vec<(WidgetId, i32)>> {
    let tail: Vec<(WidgetId, i32)> = widgets
        .iter()
        .filter(|other| other.id != Some(id))
        .filter_map(|other| Some((other.id?, other.z?)))
        .filter(|&(_, oz)| oz >= z)
        .collect();
    tail.iter().any(|&(_, oz)| oz == z).then_some(tail)
}

fn exhausted(message: impl Into<String>) -> StoreError {
    StoreError::rejected(Widget::type_name(), message)
}

/// Interceptor that assigns z-indices and resolves collisions.
pub struct ZIndexInterceptor {
    clock: Arc<dyn Clock>,
}

impl ZIndexInterceptor {
    /// Create an interceptor stamping times from the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an interceptor stamping times from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    fn prepare(&self, widgets: &EntityCollection<Widget>, widget: &mut Widget) -> StoreResult<()> {
        let z = match widget.z {
            Some(z) => z,
            None => next_z_index(widgets)
                .ok_or_else(|| exhausted("no z-index is left above the topmost widget"))?,
        };

        // The shift in `resolve_collisions` moves this tail up by one.
        if let Some(id) = widget.id {
            let top = collision_tail(widgets, id, z)
                .and_then(|tail| tail.iter().map(|&(_, oz)| oz).max());
            if top == Some(i32::MAX) {
                return Err(exhausted(format!(
                    "z-index {z} is taken and the widgets above it cannot move up"
                )));
            }
        }

        widget.z = Some(z);
        widget.last_modified = Some(self.clock.now());
        Ok(())
    }

    fn resolve_collisions(&self, widgets: &mut EntityCollection<Widget>, widget: &Widget) {
        let (Some(id), Some(z)) = (widget.id, widget.z) else {
            return;
        };
        let Some(tail) = collision_tail(widgets, id, z) else {
            return;
        };

        let now = self.clock.now();
        for (other_id, oz) in &tail {
            if let (Some(other), Some(shifted)) = (widgets.get_mut(other_id), oz.checked_add(1)) {
                other.z = Some(shifted);
                other.last_modified = Some(now);
            }
        }

        tracing::debug!(
            target: targets::INTERCEPTOR,
            %id,
            threshold = z,
            shifted = tail.len(),
            "shifted z-indices"
        );
    }
}

impl Default for ZIndexInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ZIndexInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZIndexInterceptor").finish_non_exhaustive()
    }
}

impl Interceptor<Widget> for ZIndexInterceptor {
    fn before_create(
        &self,
        widgets: &mut EntityCollection<Widget>,
        widget: &mut Widget,
    ) -> StoreResult<()> {
        self.prepare(widgets, widget)
    }

    fn after_create(&self, widgets: &mut EntityCollection<Widget>, widget: &Widget) {
        self.resolve_collisions(widgets, widget);
    }

    fn before_update(
        &self,
        widgets: &mut EntityCollection<Widget>,
        widget: &mut Widget,
    ) -> StoreResult<()> {
        self.prepare(widgets, widget)
    }

    fn after_update(&self, widgets: &mut EntityCollection<Widget>, widget: &Widget) {
        self.resolve_collisions(widgets, widget);
    }
}
