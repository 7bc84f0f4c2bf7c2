//! Cabinet commands.

use shelf_layout::{ShelfDb, shelf::ShelfError};

use super::{CommandResult, Outcome};
use crate::cli::CabinetCommand;
use crate::output::{OutputFormat, print_cabinets, print_json, print_lanes};

pub async fn run(db: &ShelfDb, command: &CabinetCommand, format: OutputFormat) -> CommandResult {
    let cabinets = db.cabinets();
    match command {
        CabinetCommand::List(page) => {
            let found = cabinets.list_cabinets(page.skip, page.limit).await?;
            match format {
                OutputFormat::Human => print_cabinets(&found),
                OutputFormat::Json => print_json(&found)?,
            }
            Ok(Outcome::ReadOnly)
        }
        CabinetCommand::Get { number } => {
            let cabinet = cabinets
                .get_cabinet(*number)
                .await?
                .ok_or(ShelfError::CabinetNotFound { cabinet: *number })?;
            match format {
                OutputFormat::Human => {
                    print_cabinets(std::slice::from_ref(&cabinet));
                    println!();
                    print_lanes(cabinet.number, &cabinet.rows);
                }
                OutputFormat::Json => print_json(&cabinet)?,
            }
            Ok(Outcome::ReadOnly)
        }
        CabinetCommand::Delete { number } => {
            cabinets
                .delete_cabinet(*number)
                .await?
                .require_deleted(|| ShelfError::CabinetNotFound { cabinet: *number })?;
            tracing::info!(cabinet = number, "Deleted cabinet");
            if format == OutputFormat::Json {
                print_json(&serde_json::json!({ "deleted": number }))?;
            } else {
                println!("Deleted cabinet {number}");
            }
            Ok(Outcome::Written)
        }
        CabinetCommand::FindProduct { jan_code } => {
            let found = cabinets.find_cabinets_by_product_code(jan_code).await?;
            match format {
                OutputFormat::Human => print_cabinets(&found),
                OutputFormat::Json => print_json(&found)?,
            }
            Ok(Outcome::ReadOnly)
        }
    }
}
