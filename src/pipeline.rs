use rusqlite::{params, Connection};

use crate::classifier;
use crate::directory::TenantDirectory;
use crate::error::Result;
use crate::ledger::record_payment;
use crate::models::{PaymentRecord, Transaction};
use crate::receipts::ReceiptIssuer;

#[derive(Debug, Default)]
pub struct RunSummary {
    pub recorded: usize,
    pub skipped: usize,
    pub unmatched: usize,
    pub failed: usize,
    pub failures: Vec<String>,
}

pub fn is_processed(conn: &Connection, txn_id: &str) -> Result<bool> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM processed WHERE txn_id = ?1")?;
    Ok(stmt.exists([txn_id])?)
}

fn record_unmatched(conn: &Connection, txn: &Transaction, method: &str) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO unmatched (txn_id, date, amount, description, method) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            txn.id,
            txn.date.format("%Y-%m-%d").to_string(),
            txn.amount,
            txn.description,
            method,
        ],
    )?;
    Ok(())
}

/// Issues the receipt, writes the ledger, and marks the transaction
/// processed as one unit. A failure anywhere rolls the whole payment back,
/// so a re-run sees the transaction as new.
pub fn commit_payment(
    conn: &mut Connection,
    mut payment: PaymentRecord,
    txn_id: Option<&str>,
    monthly_fee: f64,
    issuer: &mut dyn ReceiptIssuer,
) -> Result<Vec<String>> {
    let tx = conn.transaction()?;
    payment.receipt_link = Some(issuer.issue(&tx, &payment)?);
    let covered = record_payment(&tx, &payment, monthly_fee)?;
    if let Some(id) = txn_id {
        tx.execute("INSERT OR IGNORE INTO processed (txn_id) VALUES (?1)", [id])?;
        tx.execute("DELETE FROM unmatched WHERE txn_id = ?1", [id])?;
    }
    tx.commit()?;
    Ok(covered)
}

pub fn process_transactions(
    conn: &mut Connection,
    transactions: &[Transaction],
    directory: &TenantDirectory,
    monthly_fee: f64,
    issuer: &mut dyn ReceiptIssuer,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for txn in transactions {
        if is_processed(conn, &txn.id)? {
            summary.skipped += 1;
            continue;
        }

        let classification = classifier::classify(&txn.description, directory);
        let Some(apartment) = classification.apartment else {
            // Misses go to the review queue, unmarked, so a later run with a
            // better directory or a manual resolve can still pick them up.
            record_unmatched(conn, txn, classification.method.as_str())?;
            summary.unmatched += 1;
            continue;
        };

        let payment = PaymentRecord {
            apartment,
            payer_name: classification.tenant_name.unwrap_or_else(|| "Unknown".to_string()),
            amount: txn.amount,
            date: txn.date,
            reference: txn.reference.clone(),
            receipt_link: None,
        };
        match commit_payment(conn, payment, Some(&txn.id), monthly_fee, issuer) {
            Ok(_) => summary.recorded += 1,
            Err(e) => {
                summary.failed += 1;
                summary.failures.push(format!("{}: {e}", txn.id));
            }
        }
    }

    Ok(summary)
}
