use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::grid::PaymentGrid;
use crate::settings::db_path;

pub fn run() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let snapshot = PaymentGrid::new(&conn).snapshot()?;

    if snapshot.apartments.is_empty() {
        println!("The grid is empty. Process a statement or record a payment first.");
        return Ok(());
    }

    let mut table = Table::new();
    let mut header = vec!["Apartment".to_string()];
    header.extend(snapshot.columns.iter().cloned());
    table.set_header(header);

    for (r, apartment) in snapshot.apartments.iter().enumerate() {
        let mut cells = vec![Cell::new(apartment)];
        for c in 0..snapshot.columns.len() {
            cells.push(match snapshot.cells.get(&(r, c)) {
                Some(cell) if cell.underpaid => {
                    Cell::new(format!("{}*", money(cell.amount)).red().to_string())
                }
                Some(cell) => Cell::new(money(cell.amount)),
                None => Cell::new(""),
            });
        }
        table.add_row(cells);
    }
    println!("Payment grid\n{table}");
    println!("* partial payment");
    Ok(())
}
