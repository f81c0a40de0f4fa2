use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::settings::db_path;

pub fn run() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut stmt =
        conn.prepare("SELECT id, date, amount, description, method FROM unmatched ORDER BY id")?;
    let rows: Vec<(i64, String, f64, String, String)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        println!("No unmatched transactions.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Amount", "Description", "Method"]);
    for (id, date, amount, description, method) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(date),
            Cell::new(money(amount)),
            Cell::new(description),
            Cell::new(method),
        ]);
    }
    println!("Unmatched transactions\n{table}");
    println!("Resolve with `vaad resolve <id> --apartment <apt>`.");
    Ok(())
}
