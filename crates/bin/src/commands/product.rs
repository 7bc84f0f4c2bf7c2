//! Product catalog commands.

use shelf_layout::{ShelfDb, product::ProductError};

use super::{CommandResult, Outcome};
use crate::cli::ProductCommand;
use crate::output::{OutputFormat, print_json, print_products};

pub async fn run(db: &ShelfDb, command: &ProductCommand, format: OutputFormat) -> CommandResult {
    let products = db.products();
    match command {
        ProductCommand::List(page) => {
            let found = products.list_products(page.skip, page.limit).await?;
            match format {
                OutputFormat::Human => print_products(&found),
                OutputFormat::Json => print_json(&found)?,
            }
            Ok(Outcome::ReadOnly)
        }
        ProductCommand::Get { jan_code, name } => {
            let found = products.get_product(jan_code, name).await?;
            match (format, found) {
                (OutputFormat::Json, found) => print_json(&found)?,
                (OutputFormat::Human, Some(product)) => print_products(&[product]),
                (OutputFormat::Human, None) => println!("No matching product."),
            }
            Ok(Outcome::ReadOnly)
        }
        ProductCommand::Delete { jan_code } => {
            products
                .delete_product(jan_code)
                .await?
                .require_deleted(|| ProductError::NotFound {
                    jan_code: jan_code.clone(),
                })?;
            tracing::info!(%jan_code, "Deleted product");
            if format == OutputFormat::Json {
                print_json(&serde_json::json!({ "deleted": jan_code }))?;
            } else {
                println!("Deleted product {jan_code}");
            }
            Ok(Outcome::Written)
        }
    }
}
