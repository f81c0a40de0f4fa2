use std::path::{Path, PathBuf};

use crate::db::{get_connection, load_tenants};
use crate::directory::TenantDirectory;
use crate::error::{Result, VaadError};
use crate::pipeline::process_transactions;
use crate::receipts::ReceiptRegister;
use crate::settings::{db_path, load_settings};
use crate::statement;

pub fn run(file: &str, format: Option<&str>, remote: Option<&str>, fee: Option<f64>) -> Result<()> {
    let file_path = PathBuf::from(file);
    let settings = load_settings();
    let mut conn = get_connection(&db_path())?;

    let kind = if let Some(key) = format {
        statement::get_by_key(key).ok_or_else(|| VaadError::UnknownFormat(key.to_string()))?
    } else {
        statement::get_for_file(&file_path)
            .ok_or_else(|| VaadError::UnknownFormat(file_path.display().to_string()))?
    };
    let transactions = kind.parse(&file_path)?;
    println!(
        "{} committee credits in {}",
        transactions.len(),
        file_path.display()
    );

    let mut directory = TenantDirectory::from_rows(load_tenants(&conn)?);
    if let Some(remote_path) = remote {
        // A broken sheet export must not block the run; local data still works.
        match TenantDirectory::from_csv_export(Path::new(remote_path)) {
            Ok(overlay) => directory.merge(overlay),
            Err(e) => eprintln!("Warning: ignoring remote directory {remote_path}: {e}"),
        }
    }
    if directory.is_empty() {
        eprintln!("Warning: tenant directory is empty, every credit will go to the review queue.");
    }

    let monthly_fee = fee.unwrap_or(settings.monthly_fee);
    let summary = process_transactions(
        &mut conn,
        &transactions,
        &directory,
        monthly_fee,
        &mut ReceiptRegister,
    )?;

    println!(
        "{} recorded, {} skipped (already processed), {} unmatched, {} failed",
        summary.recorded, summary.skipped, summary.unmatched, summary.failed
    );
    for failure in &summary.failures {
        eprintln!("  failed {failure}");
    }
    if summary.unmatched > 0 {
        println!("Run `vaad unmatched` to review unplaced transactions.");
    }
    Ok(())
}
