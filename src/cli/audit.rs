use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::grid::PaymentGrid;
use crate::settings::db_path;

pub fn run() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let entries = PaymentGrid::new(&conn).audit_entries()?;

    if entries.is_empty() {
        println!("Audit log is empty.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Date",
        "Apartment",
        "Payer",
        "Amount",
        "Months covered",
        "Reference",
        "Receipt",
    ]);
    for e in entries {
        table.add_row(vec![
            Cell::new(e.date),
            Cell::new(e.apartment),
            Cell::new(e.payer),
            Cell::new(money(e.amount)),
            Cell::new(e.months_covered),
            Cell::new(e.reference.unwrap_or_default()),
            Cell::new(e.receipt_link.unwrap_or_default()),
        ]);
    }
    println!("Audit log\n{table}");
    Ok(())
}
