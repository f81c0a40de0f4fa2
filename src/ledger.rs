//! Months-covered policy and the ledger write path.
//!
//! A payment settles the current month first. Whatever is left retires the
//! most recently added unpaid months, newest first. A payment below the
//! monthly fee books the actual amount into the current month and marks the
//! cell underpaid. Every recorded payment appends one audit row.

use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;

use crate::error::{Result, VaadError};
use crate::grid::PaymentGrid;
use crate::models::{AuditEntry, PaymentRecord};

pub const HEBREW_MONTHS: [&str; 12] = [
    "ינואר", "פברואר", "מרץ", "אפריל", "מאי", "יוני",
    "יולי", "אוגוסט", "ספטמבר", "אוקטובר", "נובמבר", "דצמבר",
];

/// "ינואר 2026" for any date in January 2026.
pub fn month_label(date: NaiveDate) -> String {
    format!("{} {}", HEBREW_MONTHS[date.month0() as usize], date.year())
}

/// How a payment amount relates to the fixed monthly fee.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub struct PaymentBreakdown {
    pub amount: f64,
    pub fixed_amount: f64,
    pub is_exact: bool,
    pub is_underpayment: bool,
    pub is_overpayment: bool,
    pub months_covered: i64,
    pub remainder: f64,
    pub shortfall: f64,
}

pub fn breakdown(amount: f64, fixed_monthly: f64) -> PaymentBreakdown {
    let is_underpayment = amount < fixed_monthly;
    let is_overpayment = amount > fixed_monthly;
    PaymentBreakdown {
        amount,
        fixed_amount: fixed_monthly,
        is_exact: !is_underpayment && !is_overpayment,
        is_underpayment,
        is_overpayment,
        months_covered: (amount / fixed_monthly).floor() as i64,
        remainder: amount % fixed_monthly,
        shortfall: if is_underpayment { fixed_monthly - amount } else { 0.0 },
    }
}

/// Record one classified payment into the grid and the audit log.
///
/// Returns the covered month labels in write order; an underpayment returns
/// the partial marker as its final entry. The caller is responsible for the
/// apartment being real (a directory key); blank apartments and non-positive
/// amounts are rejected outright.
pub fn record_payment(
    conn: &Connection,
    payment: &PaymentRecord,
    fixed_monthly: f64,
) -> Result<Vec<String>> {
    if payment.apartment.trim().is_empty() {
        return Err(VaadError::UnknownApartment(payment.apartment.clone()));
    }
    if payment.amount <= 0.0 {
        return Err(VaadError::InvalidAmount(payment.amount));
    }
    if fixed_monthly <= 0.0 {
        return Err(VaadError::InvalidAmount(fixed_monthly));
    }

    let grid = PaymentGrid::new(conn);
    let info = breakdown(payment.amount, fixed_monthly);
    let current_label = month_label(payment.date);

    let row = grid.ensure_row(payment.apartment.trim())?;
    let current_col = grid.ensure_column(&current_label)?;

    let mut covered: Vec<String> = Vec::new();

    if info.months_covered >= 1 {
        // current month settles first, at the expected amount
        grid.write_cell(row, current_col, fixed_monthly)?;
        covered.push(current_label.clone());

        if info.months_covered > 1 {
            let backlog = grid.unpaid_columns(row, current_col)?;
            for (col, label) in backlog
                .into_iter()
                .take(info.months_covered as usize - 1)
            {
                grid.write_cell(row, col, fixed_monthly)?;
                covered.push(label);
            }
        }
    }

    if info.is_underpayment {
        grid.write_cell(row, current_col, payment.amount)?;
        grid.mark_underpaid(row, current_col)?;
        covered.push(format!("{current_label} (partial)"));
    }

    grid.append_audit(&AuditEntry {
        id: None,
        date: payment.date.format("%Y-%m-%d").to_string(),
        amount: payment.amount,
        payer: payment.payer_name.clone(),
        apartment: payment.apartment.trim().to_string(),
        reference: payment.reference.clone(),
        receipt_link: payment.receipt_link.clone(),
        months_covered: covered.join(", "),
    })?;

    Ok(covered)
}
