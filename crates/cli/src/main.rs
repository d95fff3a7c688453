//! Research Bank CLI - Main Entry Point

use clap::{Parser, Subcommand};

use researchbank_cli::client::CatalogueClient;
use researchbank_cli::commands::{catalogue, search};
use researchbank_cli::output::{self, print_error};

/// Research Bank CLI - browse the dataset and model catalogue
#[derive(Parser)]
#[command(name = "researchbank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path or URL of catalog.json
    #[arg(long, env = "RESEARCHBANK_CATALOG", default_value = "data/catalog.json", global = true)]
    catalog: String,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalogue items
    List(catalogue::ListArgs),

    /// Show one item
    Show(catalogue::ShowArgs),

    /// Search the catalogue
    Search(search::QueryArgs),

    /// Suggestions for partial search text
    Suggest(search::QueryArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let client = CatalogueClient::new(&cli.catalog)?;

    let result = match cli.command {
        Commands::List(args) => catalogue::list(args, &client, cli.format).await,
        Commands::Show(args) => catalogue::show(args, &client, cli.format).await,
        Commands::Search(args) => search::search(args, &client, cli.format).await,
        Commands::Suggest(args) => search::suggest(args, &client, cli.format).await,
    };

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
    Ok(())
}
