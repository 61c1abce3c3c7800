//! Area filtering for widget reads.
//!
//! An [`AreaQuery`] is the raw, possibly partial region a caller parsed from a
//! request. [`AreaQuery::validate`] turns it into an [`AreaFilter`], which
//! matches widgets whose bounding box lies entirely within the region.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{WidgetError, WidgetResult};
use crate::widget::Widget;

/// Unvalidated query region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaQuery {
    pub x1: Option<f64>,
    pub y1: Option<f64>,
    pub x2: Option<f64>,
    pub y2: Option<f64>,
}

impl AreaQuery {
    /// A query with every coordinate present.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: Some(x1),
            y1: Some(y1),
            x2: Some(x2),
            y2: Some(y2),
        }
    }

    /// Returns `true` if no coordinate is present.
    pub fn is_empty(&self) -> bool {
        self.x1.is_none() && self.y1.is_none() && self.x2.is_none() && self.y2.is_none()
    }

    /// Validate the query.
    ///
    /// An empty query means "no filter". A query with some coordinates
    /// missing, or with a non-positive extent, is rejected.
    pub fn validate(&self) -> WidgetResult<Option<AreaFilter>> {
        if self.is_empty() {
            return Ok(None);
        }

        let (Some(x1), Some(y1), Some(x2), Some(y2)) = (self.x1, self.y1, self.x2, self.y2) else {
            return Err(WidgetError::invalid_query(
                "x1, y1, x2 and y2 must all be present",
            ));
        };

        AreaFilter::new(x1, y1, x2, y2).map(Some)
    }
}

/// A validated rectangular region with `x1 < x2` and `y1 < y2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaFilter {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl AreaFilter {
    /// Create a region, rejecting a non-positive extent.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> WidgetResult<Self> {
        let positive = |lo: f64, hi: f64| lo.partial_cmp(&hi) == Some(Ordering::Less);
        if !positive(x1, x2) || !positive(y1, y2) {
            return Err(WidgetError::invalid_query(format!(
                "region ({x1}, {y1})-({x2}, {y2}) must have x1 < x2 and y1 < y2"
            )));
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// Width times height of the region.
    pub fn area(&self) -> f64 {
        (self.x2 - self.x1) * (self.y2 - self.y1)
    }

    /// Returns `true` if the widget's bounding box lies entirely within the region.
    pub fn contains(&self, widget: &Widget) -> bool {
        let (left, top, right, bottom) = widget.bounds();
        left >= self.x1 && top >= self.y1 && right <= self.x2 && bottom <= self.y2
    }
}
