//! ShopLens CLI - visual product search and catalog maintenance.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

#[derive(Parser)]
#[command(name = "shoplens")]
#[command(author, version, about = "Visual product search", long_about = None)]
#[command(after_help = "Exit codes:
  0   Success
  1   General error
  64  Usage error
  65  Invalid data (malformed metadata or engine output)
  66  Input file not found or unreadable
  69  Catalog or similarity engine unavailable
  74  I/O error

Environment:
  DATABASE_URL     PostgreSQL catalog (required)
  ENGINE_PROGRAM   Similarity engine executable (default: python3)
  ENGINE_ARGS      Engine arguments (default: ml/find_similar.py)")]
struct Cli {
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find catalog products that look like a local image
    Search {
        /// Path to the query image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Print the matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every product in the catalog
    Products {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import products from a JSON metadata file
    Import {
        /// JSON array of product records
        #[arg(value_name = "JSON")]
        file: PathBuf,
    },

    /// Delete every product from the catalog
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("shoplens=debug,shoplens_core=debug,shoplens_server=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Search { image, json } => commands::search::execute(image, json).await,
        Commands::Products { json } => commands::products::execute(json).await,
        Commands::Import { file } => commands::import::execute(file).await,
        Commands::Clear { yes } => commands::clear::execute(yes).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        let exit = ExitCode::from_anyhow(&err);
        if let Some(message) = exit.message {
            eprintln!("{} {}", "error:".red().bold(), message);
        }
        std::process::exit(exit.code);
    }
}
