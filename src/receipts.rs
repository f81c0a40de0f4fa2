use chrono::Datelike;
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::models::PaymentRecord;

/// Seam for receipt generation. Rendering and delivery live behind this
/// trait; the built-in register only records the issuance and hands back
/// the receipt number for the audit trail.
pub trait ReceiptIssuer {
    fn issue(&mut self, conn: &Connection, payment: &PaymentRecord) -> Result<String>;
}

/// Built-in issuer: one register row per payment, numbered per year.
pub struct ReceiptRegister;

impl ReceiptIssuer for ReceiptRegister {
    fn issue(&mut self, conn: &Connection, payment: &PaymentRecord) -> Result<String> {
        let year = payment.date.year();
        let seq: i64 = conn.query_row(
            "SELECT COALESCE(MAX(seq), 0) + 1 FROM receipts WHERE year = ?1",
            [year],
            |row| row.get(0),
        )?;
        let number = format!("vaad-{year}-{seq:04}");
        conn.execute(
            "INSERT INTO receipts (number, year, seq, apartment, payer, amount, date, reference) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                number,
                year,
                seq,
                payment.apartment,
                payment.payer_name,
                payment.amount,
                payment.date.format("%Y-%m-%d").to_string(),
                payment.reference,
            ],
        )?;
        Ok(number)
    }
}
