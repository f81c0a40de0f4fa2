use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct Tenant {
    pub apartment: String,
    pub name: String,
    pub alt_names: Vec<String>,
}

/// One credit row parsed from a bank statement export.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub reference: Option<String>,
}

/// Classified payment handed to the ledger.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub apartment: String,
    pub payer_name: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub reference: Option<String>,
    pub receipt_link: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: Option<i64>,
    pub date: String,
    pub amount: f64,
    pub payer: String,
    pub apartment: String,
    pub reference: Option<String>,
    pub receipt_link: Option<String>,
    pub months_covered: String,
}
