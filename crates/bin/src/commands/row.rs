//! Row commands.

use shelf_layout::{ShelfDb, shelf::ShelfError};

use super::{CommandResult, Outcome};
use crate::cli::RowCommand;
use crate::output::{OutputFormat, print_json, print_lanes};

pub async fn run(db: &ShelfDb, command: &RowCommand, format: OutputFormat) -> CommandResult {
    match *command {
        RowCommand::Get { cabinet, row } => {
            let found = db
                .cabinets()
                .get_row(cabinet, row)
                .await?
                .ok_or(ShelfError::RowNotFound { cabinet, row })?;
            match format {
                OutputFormat::Human => print_lanes(cabinet, std::slice::from_ref(&found)),
                OutputFormat::Json => print_json(&found)?,
            }
            Ok(Outcome::ReadOnly)
        }
        RowCommand::Delete { cabinet, row } => {
            db.cabinets()
                .delete_row(cabinet, row)
                .await?
                .require_matched(|| ShelfError::RowNotFound { cabinet, row })?;
            tracing::info!(cabinet, row, "Deleted row");
            if format == OutputFormat::Json {
                print_json(&serde_json::json!({ "cabinet": cabinet, "deleted": row }))?;
            } else {
                println!("Deleted row {cabinet}/{row}");
            }
            Ok(Outcome::Written)
        }
    }
}
