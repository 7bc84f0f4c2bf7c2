//! Bulk loading from a JSON file.

use serde::Deserialize;
use shelf_layout::{Cabinet, Product, ShelfDb};

use super::{CommandResult, Outcome};
use crate::cli::SeedArgs;
use crate::output::{OutputFormat, print_json};

/// Contents of a seed file. Either list may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub cabinets: Vec<Cabinet>,
    pub products: Vec<Product>,
}

pub async fn run(db: &ShelfDb, args: &SeedArgs, format: OutputFormat) -> CommandResult {
    let raw = tokio::fs::read_to_string(&args.file).await?;
    let seed: SeedFile = serde_json::from_str(&raw)?;
    let (cabinets, products) = (seed.cabinets.len(), seed.products.len());

    if cabinets > 0 {
        db.cabinets().create_cabinets(seed.cabinets).await?;
    }
    if products > 0 {
        db.products().create_products(seed.products).await?;
    }
    tracing::info!(cabinets, products, file = %args.file.display(), "Seeded database");

    match format {
        OutputFormat::Human => println!("Loaded {cabinets} cabinets and {products} products"),
        OutputFormat::Json => {
            print_json(&serde_json::json!({ "cabinets": cabinets, "products": products }))?
        }
    }
    Ok(Outcome::Written)
}
