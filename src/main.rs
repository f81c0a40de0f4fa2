mod classifier;
mod cli;
mod db;
mod directory;
mod error;
mod fmt;
mod grid;
mod ledger;
mod models;
mod pipeline;
mod receipts;
mod settings;
mod similarity;
mod statement;

use clap::Parser;

use cli::{Cli, Commands, TenantsCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Process {
            file,
            format,
            remote,
            fee,
        } => cli::process::run(&file, format.as_deref(), remote.as_deref(), fee),
        Commands::Classify { description, json } => cli::classify::run(&description, json),
        Commands::Record {
            apartment,
            amount,
            date,
            payer,
            reference,
        } => cli::record::run(
            &apartment,
            amount,
            date.as_deref(),
            payer.as_deref(),
            reference.as_deref(),
        ),
        Commands::Resolve { id, apartment } => cli::resolve::run(id, &apartment),
        Commands::Unmatched => cli::unmatched::run(),
        Commands::Tenants { command } => match command {
            TenantsCommands::Add {
                apartment,
                name,
                alt_names,
            } => cli::tenants::add(&apartment, &name, alt_names.as_deref()),
            TenantsCommands::List => cli::tenants::list(),
            TenantsCommands::Import { file } => cli::tenants::import(&file),
        },
        Commands::Grid => cli::grid::run(),
        Commands::Audit => cli::audit::run(),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
