pub mod audit;
pub mod classify;
pub mod grid;
pub mod init;
pub mod process;
pub mod record;
pub mod resolve;
pub mod status;
pub mod tenants;
pub mod unmatched;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vaad",
    about = "Collection bookkeeping CLI for a residential building committee."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up vaad: choose a data directory and initialize the database.
    Init {
        /// Path for vaad data (default: ~/Documents/vaad)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Process a bank statement export: classify credits and update the ledger.
    Process {
        /// Path to the statement file (CSV or XLSX)
        file: String,
        /// Statement format key (e.g. hapoalim_csv)
        #[arg(long)]
        format: Option<String>,
        /// Sheet-export CSV merged over the local tenant directory for this run
        #[arg(long)]
        remote: Option<String>,
        /// Override the monthly fee for this run
        #[arg(long)]
        fee: Option<f64>,
    },
    /// Classify a transfer description without touching the ledger.
    Classify {
        /// Transfer description text
        description: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record an out-of-band payment (cash or check).
    Record {
        /// Apartment number
        #[arg(long)]
        apartment: String,
        /// Amount received
        #[arg(long)]
        amount: f64,
        /// Payment date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Payer name (default: the apartment's primary name)
        #[arg(long)]
        payer: Option<String>,
        /// Bank or check reference
        #[arg(long)]
        reference: Option<String>,
    },
    /// Resolve an unmatched transaction to an apartment.
    Resolve {
        /// Unmatched entry ID (shown in `vaad unmatched`)
        id: i64,
        /// Apartment number to credit
        #[arg(long)]
        apartment: String,
    },
    /// List transactions the classifier could not place.
    Unmatched,
    /// Manage the tenant directory.
    Tenants {
        #[command(subcommand)]
        command: TenantsCommands,
    },
    /// Show the payment grid.
    Grid,
    /// Show the audit log.
    Audit,
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum TenantsCommands {
    /// Add or replace an apartment's directory entry.
    Add {
        /// Apartment number
        apartment: String,
        /// Primary family name
        name: String,
        /// Alternate payer names, comma separated
        #[arg(long = "alt-names")]
        alt_names: Option<String>,
    },
    /// List the tenant directory.
    List,
    /// Import tenants from a legacy JSON file or a sheet-export CSV.
    Import {
        /// Path to tenants.json or an exported CSV
        file: String,
    },
}
