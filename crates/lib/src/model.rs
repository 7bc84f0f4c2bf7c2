//! Layout and product types.
//!
//! A [`Cabinet`] is the aggregate root: it embeds its [`Row`]s, which embed
//! their [`Lane`]s. Rows and lanes have no storage of their own and disappear
//! with their cabinet. [`Product`]s live in a separate, flat collection and are
//! only referenced from lanes by JAN code, without any integrity check.
//!
//! Persisted field names are camelCase.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placement of a cabinet on the shop floor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Outer dimensions of a cabinet. Only the height is mandatory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<i32>,
    pub height: i32,
}

/// Dimensions of a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSize {
    pub height: i32,
}

/// A cabinet and everything on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cabinet {
    /// Unique across all cabinets. Assigned once, never changed.
    pub number: u32,
    pub position: Position,
    pub size: Size,
    /// In insertion order, not sorted by number.
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// A shelf row inside a cabinet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    /// Unique within the owning cabinet.
    pub number: u32,
    pub position_z: i32,
    pub size: RowSize,
    /// In insertion order, not sorted by number.
    #[serde(default)]
    pub lanes: Vec<Lane>,
}

/// A single facing within a row, stocked with one product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lane {
    /// Unique within the owning row.
    pub number: u32,
    pub jan_code: String,
    pub quantity: u32,
    pub position_x: i32,
}

impl Lane {
    pub fn content(&self) -> LaneContent {
        LaneContent {
            jan_code: self.jan_code.clone(),
            quantity: self.quantity,
        }
    }
}

/// The part of a lane that moves when two lanes are swapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneContent {
    pub jan_code: String,
    pub quantity: u32,
}

/// Logical address of a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaneAddress {
    pub cabinet: u32,
    pub row: u32,
    pub lane: u32,
}

impl LaneAddress {
    pub fn new(cabinet: u32, row: u32, lane: u32) -> Self {
        Self { cabinet, row, lane }
    }
}

impl fmt::Display for LaneAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.cabinet, self.row, self.lane)
    }
}

/// A catalog product, keyed by JAN code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub jan_code: String,
    pub name: String,
    pub size: i32,
    pub shape: String,
    pub image_url: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}
