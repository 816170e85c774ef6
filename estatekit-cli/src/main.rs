//! EstateKit CLI - inspect and maintain a listing store.
//!
//! ```bash
//! estatekit convert 120 "square meters"
//! estatekit psf --price 850000 --area 1200
//! estatekit import legacy-listings.json
//! estatekit list --mode rent --max-price 3000
//! estatekit layouts <listing-id> 4
//! ```
//!
//! See `estatekit --help` for all available commands and options.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "estatekit", about = "EstateKit listing tool", version)]
struct Cli {
    /// Config file (default: ./estatekit.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the listing data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an area to square feet
    Convert {
        /// Numeric value, e.g. 120 or "1,200"
        value: String,
        /// Unit label, e.g. "square meters", acres, hectares
        unit: String,
    },
    /// Price per square foot
    Psf {
        #[arg(long)]
        price: f64,
        /// Upper end of a price range
        #[arg(long)]
        max: Option<f64>,
        #[arg(long)]
        area: f64,
        #[arg(long, default_value = "sqft")]
        unit: String,
    },
    /// Import a JSON file of listing records (any schema version)
    Import { file: PathBuf },
    /// List stored listings, most recently updated first
    List {
        #[arg(long)]
        mode: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        /// Minimum bedrooms
        #[arg(long)]
        bedrooms: Option<u32>,
        /// Search title, address and descriptions
        #[arg(long)]
        text: Option<String>,
    },
    /// Print one listing as JSON
    Show { id: String },
    /// Delete one listing
    Delete { id: String },
    /// Change the number of layouts of a listing
    Layouts {
        id: String,
        count: String,
        /// Do not copy common fields from the first layout
        #[arg(long)]
        no_sync: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (config, data_dir) = (cli.config, cli.data_dir);
    let context = || commands::Context::init(config.as_deref(), data_dir.as_deref());

    let output = match cli.command {
        Commands::Convert { value, unit } => commands::calc::convert(&value, &unit),
        Commands::Psf { price, max, area, unit } => commands::calc::psf(price, max, area, &unit)?,
        Commands::Import { file } => commands::listings::import(&context()?, &file).await?,
        Commands::List { mode, min_price, max_price, bedrooms, text } => {
            let filter = commands::listings::build_filter(mode, min_price, max_price, bedrooms, text)?;
            commands::listings::list(&context()?, &filter).await?
        }
        Commands::Show { id } => commands::listings::show(&context()?, &id).await?,
        Commands::Delete { id } => commands::listings::delete(&context()?, &id).await?,
        Commands::Layouts { id, count, no_sync } => {
            commands::listings::layouts(&context()?, &id, &count, no_sync).await?
        }
    };

    println!("{}", output);
    Ok(())
}
