//! Lane commands, including swaps.

use shelf_layout::{LaneContent, ShelfDb, shelf::ShelfError};

use super::{CommandResult, Outcome};
use crate::cli::LaneCommand;
use crate::output::{OutputFormat, print_json, print_table};

pub async fn run(db: &ShelfDb, command: &LaneCommand, format: OutputFormat) -> CommandResult {
    let cabinets = db.cabinets();
    match command {
        LaneCommand::Get { address } => {
            let lane = cabinets
                .get_lane(*address)
                .await?
                .ok_or(ShelfError::LaneNotFound { address: *address })?;
            match format {
                OutputFormat::Human => print_table(
                    &["LANE", "JAN CODE", "QTY", "POSITION X"],
                    &[vec![
                        address.to_string(),
                        lane.jan_code,
                        lane.quantity.to_string(),
                        lane.position_x.to_string(),
                    ]],
                ),
                OutputFormat::Json => print_json(&lane)?,
            }
            Ok(Outcome::ReadOnly)
        }
        LaneCommand::Set {
            address,
            jan_code,
            quantity,
        } => {
            let content = LaneContent {
                jan_code: jan_code.clone(),
                quantity: *quantity,
            };
            let result = cabinets
                .set_lane(*address, content)
                .await?
                .require_matched(|| ShelfError::LaneNotFound { address: *address })?;
            tracing::info!(%address, %jan_code, quantity, "Set lane");
            if format == OutputFormat::Json {
                print_json(&serde_json::json!({ "lane": address, "modified": result.modified }))?;
            } else if result.modified == 0 {
                println!("Lane {address} already holds {quantity} x {jan_code}");
            } else {
                println!("Lane {address} now holds {quantity} x {jan_code}");
            }
            Ok(Outcome::Written)
        }
        LaneCommand::Delete { address } => {
            cabinets
                .delete_lane(*address)
                .await?
                .require_modified(|| ShelfError::LaneNotFound { address: *address })?;
            tracing::info!(%address, "Deleted lane");
            if format == OutputFormat::Json {
                print_json(&serde_json::json!({ "deleted": address }))?;
            } else {
                println!("Deleted lane {address}");
            }
            Ok(Outcome::Written)
        }
        LaneCommand::Swap { source, target } => {
            cabinets.swap_lanes(*source, *target).await?;
            if format == OutputFormat::Json {
                print_json(&serde_json::json!({ "swapped": [source, target] }))?;
            } else {
                println!("Swapped lanes {source} and {target}");
            }
            Ok(Outcome::Written)
        }
    }
}
