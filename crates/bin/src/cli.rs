//! CLI argument definitions for the shelf-layout binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use shelf_layout::{LaneAddress, StoreSettings};

/// Storage backend type
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Backend {
    /// SQLite database (default)
    Sqlite,
    /// PostgreSQL database (for shared deployments)
    Postgres,
    /// In-memory with JSON persistence (for development)
    Inmemory,
}

/// Shelf layout storage tool
#[derive(Parser, Debug)]
#[command(name = "shelf-layout")]
#[command(about = "Inspect and edit cabinet, row and lane layouts")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub backend_config: BackendConfig,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the layout is stored.
#[derive(clap::Args, Debug, Clone)]
pub struct BackendConfig {
    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "SHELF_BACKEND", global = true)]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores shelf-layout.db
    /// For InMemory: stores shelf-layout.json
    #[arg(short = 'D', long, env = "SHELF_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, env = "SHELF_POSTGRES_URL", global = true)]
    pub postgres_url: Option<String>,

    /// Collection holding cabinets
    #[arg(long, default_value = "cabinets", env = "SHELF_CABINET_COLLECTION", global = true)]
    pub cabinet_collection: String,

    /// Collection holding products
    #[arg(long, default_value = "products", env = "SHELF_PRODUCT_COLLECTION", global = true)]
    pub product_collection: String,
}

impl BackendConfig {
    pub fn settings(&self) -> StoreSettings {
        StoreSettings::default()
            .with_cabinet_collection(&self.cabinet_collection)
            .with_product_collection(&self.product_collection)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cabinet operations
    #[command(subcommand)]
    Cabinet(CabinetCommand),
    /// Row operations
    #[command(subcommand)]
    Row(RowCommand),
    /// Lane operations
    #[command(subcommand)]
    Lane(LaneCommand),
    /// Product catalog operations
    #[command(subcommand)]
    Product(ProductCommand),
    /// Bulk-load cabinets and products from a JSON file
    Seed(SeedArgs),
}

#[derive(Subcommand, Debug)]
pub enum CabinetCommand {
    /// List cabinets
    List(PageArgs),
    /// Show one cabinet with its rows and lanes
    Get { number: u32 },
    /// Delete a cabinet with its rows and lanes
    Delete { number: u32 },
    /// Cabinets with a lane stocked with the product
    FindProduct { jan_code: String },
}

#[derive(Subcommand, Debug)]
pub enum RowCommand {
    /// Show one row with its lanes
    Get { cabinet: u32, row: u32 },
    /// Delete a row with its lanes
    Delete { cabinet: u32, row: u32 },
}

#[derive(Subcommand, Debug)]
pub enum LaneCommand {
    /// Show one lane
    Get {
        #[arg(value_parser = parse_address)]
        address: LaneAddress,
    },
    /// Assign a product and quantity to a lane
    Set {
        #[arg(value_parser = parse_address)]
        address: LaneAddress,
        /// JAN code of the product
        #[arg(long)]
        jan_code: String,
        #[arg(long)]
        quantity: u32,
    },
    /// Delete a lane
    Delete {
        #[arg(value_parser = parse_address)]
        address: LaneAddress,
    },
    /// Exchange product and quantity between two lanes
    Swap {
        #[arg(value_parser = parse_address)]
        source: LaneAddress,
        #[arg(value_parser = parse_address)]
        target: LaneAddress,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    /// List products
    List(PageArgs),
    /// Find a product by JAN code or name
    Get {
        #[arg(long, default_value = "")]
        jan_code: String,
        /// Substring of the product name
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Delete a product
    Delete { jan_code: String },
}

/// Paging arguments. Both must be given for paging to apply.
#[derive(clap::Args, Debug)]
pub struct PageArgs {
    #[arg(long)]
    pub skip: Option<u64>,
    #[arg(long)]
    pub limit: Option<u64>,
}

/// Arguments for the seed command
#[derive(clap::Args, Debug)]
pub struct SeedArgs {
    /// JSON file with `cabinets` and `products` arrays
    pub file: PathBuf,
}

/// Parses `cabinet/row/lane`.
fn parse_address(value: &str) -> Result<LaneAddress, String> {
    let parts = value
        .split('/')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid lane address '{value}': {e}"))?;
    match parts[..] {
        [cabinet, row, lane] => Ok(LaneAddress::new(cabinet, row, lane)),
        _ => Err(format!(
            "invalid lane address '{value}': expected cabinet/row/lane"
        )),
    }
}
