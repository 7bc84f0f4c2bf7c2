//! Subcommand implementations. Each takes an open [`ShelfDb`](shelf_layout::ShelfDb)
//! and reports whether it wrote anything.

pub mod cabinet;
pub mod lane;
pub mod product;
pub mod row;
pub mod seed;

/// Whether a command changed stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    ReadOnly,
    Written,
}

pub type CommandResult = Result<Outcome, Box<dyn std::error::Error>>;
