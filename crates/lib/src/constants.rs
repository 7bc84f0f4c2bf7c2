//! Constants used throughout the shelf-layout library.
//!
//! This module provides central definitions for persisted field names,
//! default collection names and retry limits.

/// Default collection holding cabinet aggregates.
pub const CABINETS: &str = "cabinets";

/// Default collection holding products.
pub const PRODUCTS: &str = "products";

/// Field holding the business number of a cabinet, row or lane.
pub const NUMBER: &str = "number";

/// Field holding the rows embedded in a cabinet document.
pub const ROWS: &str = "rows";

/// Field holding the lanes embedded in a row.
pub const LANES: &str = "lanes";

/// Field holding the JAN code of a lane or product.
pub const JAN_CODE: &str = "janCode";

/// Field holding the stocked quantity of a lane.
pub const QUANTITY: &str = "quantity";

/// Field holding the display name of a product.
pub const NAME: &str = "name";

/// How many times `add_*` re-allocates a number after losing a race.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 8;

/// How many times a SQL read-modify-write is retried after a revision conflict.
pub const MAX_WRITE_RETRIES: usize = 16;
