//! The widget entity.
//!
//! A widget is a rectangle on the shared plane, positioned by its center and
//! stacked by an integer z-index. Lower z-indices render behind higher ones.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::Entity;
use uuid::Uuid;

use crate::error::{WidgetError, WidgetResult};

/// A unique, never reused widget identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(Uuid);

impl WidgetId {
    /// Generate a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for WidgetId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A positioned, sized, z-ordered rectangle.
///
/// `z` may be absent on input; the store always assigns one before the widget
/// is persisted. `last_modified` is stamped by the store on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    /// Identifier, generated on first save when absent.
    pub id: Option<WidgetId>,
    /// Horizontal center.
    pub x: i32,
    /// Vertical center.
    pub y: i32,
    /// Stacking order.
    pub z: Option<i32>,
    /// Width, never negative.
    pub width: f64,
    /// Height, never negative.
    pub height: f64,
    /// Time of the last create or update.
    pub last_modified: Option<DateTime<Utc>>,
}

impl Widget {
    /// Create an unsaved widget centered at `(x, y)`.
    pub fn new(x: i32, y: i32, width: f64, height: f64) -> Self {
        Self {
            id: None,
            x,
            y,
            z: None,
            width,
            height,
            last_modified: None,
        }
    }

    /// Set the requested z-index.
    pub fn with_z(mut self, z: i32) -> Self {
        self.z = Some(z);
        self
    }

    /// Set the identifier.
    pub fn with_id(mut self, id: WidgetId) -> Self {
        self.id = Some(id);
        self
    }

    /// Width times height.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Bounding box as `(left, top, right, bottom)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let (cx, cy) = (f64::from(self.x), f64::from(self.y));
        let (half_w, half_h) = (self.width / 2.0, self.height / 2.0);
        (cx - half_w, cy - half_h, cx + half_w, cy + half_h)
    }
}

impl Entity for Widget {
    type Id = WidgetId;

    fn id(&self) -> Option<&WidgetId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: WidgetId) {
        self.id = Some(id);
    }

    fn generate_new_id() -> WidgetId {
        WidgetId::new()
    }

    fn type_name() -> &'static str {
        "Widget"
    }
}

/// Client-supplied widget geometry for create and modify.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetRequest {
    /// Horizontal center.
    pub x: i32,
    /// Vertical center.
    pub y: i32,
    /// Requested z-index; the next free one is used when absent.
    #[serde(default)]
    pub z: Option<i32>,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl WidgetRequest {
    /// Create a request without a z-index.
    pub fn new(x: i32, y: i32, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            width,
            height,
        }
    }

    /// Set the requested z-index.
    pub fn with_z(mut self, z: i32) -> Self {
        self.z = Some(z);
        self
    }

    /// Check that width and height are finite and not negative.
    pub fn validate(&self) -> WidgetResult<()> {
        for (field, value) in [("width", self.width), ("height", self.height)] {
            if !value.is_finite() || value < 0.0 {
                return Err(WidgetError::invalid_geometry(
                    field,
                    format!("must be a finite, non-negative number (got {value})"),
                ));
            }
        }
        Ok(())
    }

    /// Validate and turn into a widget with the given identifier.
    pub fn into_widget(self, id: Option<WidgetId>) -> WidgetResult<Widget> {
        self.validate()?;
        Ok(Widget {
            id,
            x: self.x,
            y: self.y,
            z: self.z,
            width: self.width,
            height: self.height,
            last_modified: None,
        })
    }
}
