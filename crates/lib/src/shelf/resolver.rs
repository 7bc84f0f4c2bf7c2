//! Builds the filters, updates and projections that address rows and lanes
//! inside a cabinet document.
//!
//! Rows and lanes are always located by their number through element
//! matches, never by array position, so numbering gaps left by deletes do not
//! matter. Every builder is pure.

use serde_json::Value;

use crate::Result;
use crate::constants::{JAN_CODE, LANES, NUMBER, QUANTITY, ROWS};
use crate::document::{FieldPath, Filter, Update};
use crate::model::{Lane, LaneAddress, LaneContent, Row};

/// The cabinet document with the given number.
pub fn cabinet(cabinet: u32) -> Filter {
    Filter::key(cabinet)
}

fn numbered(number: u32) -> Filter {
    Filter::equals(NUMBER, number)
}

fn row_path() -> FieldPath {
    FieldPath::root().field(ROWS).matched()
}

fn lanes_path() -> FieldPath {
    row_path().field(LANES)
}

fn lane_path() -> FieldPath {
    lanes_path().matched()
}

fn with_row(cabinet_number: u32, row: u32) -> Filter {
    cabinet(cabinet_number).and(Filter::elem_match(ROWS, numbered(row)))
}

fn with_lane(address: &LaneAddress) -> Filter {
    cabinet(address.cabinet).and(Filter::elem_match(
        ROWS,
        numbered(address.row).and(Filter::elem_match(LANES, numbered(address.lane))),
    ))
}

/// Filter and projection yielding a single row.
pub fn locate_row(cabinet: u32, row: u32) -> (Filter, FieldPath) {
    (with_row(cabinet, row), row_path())
}

/// Filter and projection yielding a single lane.
pub fn locate_lane(address: &LaneAddress) -> (Filter, FieldPath) {
    (with_lane(address), lane_path())
}

/// Appends a row unless the cabinet already has one with the same number.
pub fn append_row(cabinet_number: u32, row: &Row) -> Result<(Filter, Update)> {
    let filter = cabinet(cabinet_number).and(Filter::elem_match(ROWS, numbered(row.number)).not());
    let update = Update::new().push(ROWS, serde_json::to_value(row)?);
    Ok((filter, update))
}

/// Appends a lane unless the row already has one with the same number.
pub fn append_lane(cabinet_number: u32, row: u32, lane: &Lane) -> Result<(Filter, Update)> {
    let filter = cabinet(cabinet_number).and(Filter::elem_match(
        ROWS,
        numbered(row).and(Filter::elem_match(LANES, numbered(lane.number)).not()),
    ));
    let update = Update::new().push(lanes_path(), serde_json::to_value(lane)?);
    Ok((filter, update))
}

/// Replaces a whole row, lanes included.
pub fn replace_row(cabinet: u32, row: u32, replacement: &Row) -> Result<(Filter, Update)> {
    let update = Update::new().set(row_path(), serde_json::to_value(replacement)?);
    Ok((with_row(cabinet, row), update))
}

/// Sets the product assignment of a lane, leaving its number and position alone.
pub fn set_lane(address: &LaneAddress, content: &LaneContent) -> (Filter, Update) {
    let update = Update::new()
        .set(lane_path().field(JAN_CODE), content.jan_code.as_str())
        .set(lane_path().field(QUANTITY), content.quantity);
    (with_lane(address), update)
}

/// Removes a row and its lanes.
pub fn remove_row(cabinet: u32, row: u32) -> (Filter, Update) {
    (
        with_row(cabinet, row),
        Update::new().pull(ROWS, numbered(row)),
    )
}

/// Removes a lane from its row.
pub fn remove_lane(address: &LaneAddress) -> (Filter, Update) {
    (
        with_row(address.cabinet, address.row),
        Update::new().pull(lanes_path(), numbered(address.lane)),
    )
}

/// Cabinets with at least one lane stocked with the product.
pub fn holding_product(jan_code: &str) -> Filter {
    Filter::elem_match(
        ROWS,
        Filter::elem_match(LANES, Filter::equals(JAN_CODE, Value::from(jan_code))),
    )
}
