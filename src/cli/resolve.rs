use chrono::NaiveDate;

use crate::db::{get_connection, load_tenants};
use crate::directory::TenantDirectory;
use crate::error::{Result, VaadError};
use crate::models::PaymentRecord;
use crate::pipeline::commit_payment;
use crate::receipts::ReceiptRegister;
use crate::settings::{db_path, load_settings};

pub fn run(id: i64, apartment: &str) -> Result<()> {
    let settings = load_settings();
    let mut conn = get_connection(&db_path())?;

    let directory = TenantDirectory::from_rows(load_tenants(&conn)?);
    let Some(entry) = directory.get(apartment) else {
        return Err(VaadError::UnknownApartment(apartment.to_string()));
    };
    let payer_name = entry.name.clone();

    let row = conn.query_row(
        "SELECT txn_id, date, amount, description FROM unmatched WHERE id = ?1",
        [id],
        |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, f64>(2)?,
                r.get::<_, String>(3)?,
            ))
        },
    );
    let (txn_id, date, amount, description) = match row {
        Ok(v) => v,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(VaadError::Other(format!("no unmatched entry with id {id}")))
        }
        Err(e) => return Err(e.into()),
    };
    let date: NaiveDate = date
        .parse()
        .map_err(|_| VaadError::Other(format!("bad date on unmatched entry: {date}")))?;

    let payment = PaymentRecord {
        apartment: apartment.trim().to_string(),
        payer_name,
        amount,
        date,
        reference: None,
        receipt_link: None,
    };
    let covered = commit_payment(
        &mut conn,
        payment,
        Some(&txn_id),
        settings.monthly_fee,
        &mut ReceiptRegister,
    )?;

    println!(
        "Resolved \"{description}\" to apartment {apartment}: {}",
        covered.join(", ")
    );
    Ok(())
}
