use chrono::NaiveDate;

use crate::db::{get_connection, load_tenants};
use crate::directory::TenantDirectory;
use crate::error::{Result, VaadError};
use crate::fmt::money;
use crate::models::PaymentRecord;
use crate::pipeline::commit_payment;
use crate::receipts::ReceiptRegister;
use crate::settings::{db_path, load_settings};

pub fn run(
    apartment: &str,
    amount: f64,
    date: Option<&str>,
    payer: Option<&str>,
    reference: Option<&str>,
) -> Result<()> {
    let settings = load_settings();
    let mut conn = get_connection(&db_path())?;

    let directory = TenantDirectory::from_rows(load_tenants(&conn)?);
    let Some(entry) = directory.get(apartment) else {
        return Err(VaadError::UnknownApartment(apartment.to_string()));
    };

    let date: NaiveDate = match date {
        Some(d) => d
            .parse()
            .map_err(|_| VaadError::Other(format!("invalid date: {d} (expected YYYY-MM-DD)")))?,
        None => chrono::Local::now().date_naive(),
    };

    let payment = PaymentRecord {
        apartment: apartment.trim().to_string(),
        payer_name: payer.unwrap_or(&entry.name).to_string(),
        amount,
        date,
        reference: reference.map(str::to_string),
        receipt_link: None,
    };
    let covered = commit_payment(
        &mut conn,
        payment,
        None,
        settings.monthly_fee,
        &mut ReceiptRegister,
    )?;

    println!(
        "Recorded {} for apartment {apartment}: {}",
        money(amount),
        covered.join(", ")
    );
    Ok(())
}
