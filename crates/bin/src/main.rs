mod backend;
mod cli;
mod commands;
mod output;

use clap::Parser;
use shelf_layout::ShelfDb;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::Outcome;
use crate::output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so that table and JSON output stay clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("shelf_layout=info".parse()?))
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from_flag(cli.json);

    let backend = backend::create_backend(&cli.backend_config).await?;
    tracing::debug!(backend = %backend::backend_label(&cli.backend_config), "Opened backend");
    let db = ShelfDb::new(backend.clone(), cli.backend_config.settings());

    let outcome = match &cli.command {
        Commands::Cabinet(command) => commands::cabinet::run(&db, command, format).await?,
        Commands::Row(command) => commands::row::run(&db, command, format).await?,
        Commands::Lane(command) => commands::lane::run(&db, command, format).await?,
        Commands::Product(command) => commands::product::run(&db, command, format).await?,
        Commands::Seed(args) => commands::seed::run(&db, args, format).await?,
    };

    if outcome == Outcome::Written {
        backend::persist(&backend, &cli.backend_config).await?;
    }
    Ok(())
}
