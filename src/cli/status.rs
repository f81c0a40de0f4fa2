use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{format_bytes, money};
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join("vaad.db");

    println!(
        "Building:    {}",
        if settings.building_name.is_empty() {
            "(not set)"
        } else {
            &settings.building_name
        }
    );
    println!("Data dir:    {}", data_dir.display());
    println!("Database:    {}", db_path.display());
    println!("Monthly fee: {}", money(settings.monthly_fee));

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:     {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let tenants: i64 = conn.query_row("SELECT count(*) FROM tenants", [], |r| r.get(0))?;
        let processed: i64 = conn.query_row("SELECT count(*) FROM processed", [], |r| r.get(0))?;
        let audits: i64 = conn.query_row("SELECT count(*) FROM audit_log", [], |r| r.get(0))?;
        let receipts: i64 = conn.query_row("SELECT count(*) FROM receipts", [], |r| r.get(0))?;
        let unmatched: i64 = conn.query_row("SELECT count(*) FROM unmatched", [], |r| r.get(0))?;

        println!();
        println!("Tenants:     {tenants}");
        println!("Processed:   {processed}");
        println!("Audit rows:  {audits}");
        println!("Receipts:    {receipts}");
        if unmatched > 0 {
            println!("Unmatched:   {}", unmatched.to_string().yellow().bold());
        } else {
            println!("Unmatched:   0");
        }
    } else {
        println!();
        println!("Database not found. Run `vaad init` to set up.");
    }

    Ok(())
}
