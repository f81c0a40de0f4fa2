use std::path::Path;

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::error::{Result, VaadError};
use crate::models::Transaction;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn parse_amount(raw: &str) -> f64 {
    let s = raw.replace(',', "").replace('"', "").replace('₪', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return -inner.trim().parse::<f64>().unwrap_or(0.0);
    }
    s.parse().unwrap_or(0.0)
}

/// Hapoalim exports write dates day-first; short years mean this century.
pub fn parse_date_dmy(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let d: u32 = parts[0].parse().ok()?;
    let m: u32 = parts[1].parse().ok()?;
    let mut y: i32 = parts[2].parse().ok()?;
    if y < 100 {
        y += 2000;
    }
    NaiveDate::from_ymd_opt(y, m, d)
}

#[cfg(any(feature = "xlsx", test))]
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial as i64))
}

/// Bank references are stable across re-downloads, so they make the best
/// transaction id. Rows without one get a digest of their identifying fields.
pub fn stable_id(reference: Option<&str>, date: NaiveDate, amount: f64, description: &str) -> String {
    if let Some(r) = reference {
        return r.to_string();
    }
    let prefix: String = description.chars().take(15).collect();
    let mut hasher = Sha256::new();
    hasher.update(format!("{}|{amount}|{prefix}", date.format("%Y-%m-%d")).as_bytes());
    hex::encode(hasher.finalize())
}

fn clean_reference(raw: &str) -> Option<String> {
    let r = raw.trim();
    // Hapoalim writes a zero asmachta on rows without a real reference
    if r.is_empty() || r == "0" {
        return None;
    }
    Some(r.to_string())
}

// ---------------------------------------------------------------------------
// Statement kinds — enum dispatch instead of trait objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatementKind {
    HapoalimCsv,
    #[cfg(feature = "xlsx")]
    HapoalimXlsx,
}

impl StatementKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::HapoalimCsv => "hapoalim_csv",
            #[cfg(feature = "xlsx")]
            Self::HapoalimXlsx => "hapoalim_xlsx",
        }
    }

    #[allow(dead_code)]
    pub fn name(&self) -> &'static str {
        match self {
            Self::HapoalimCsv => "Bank Hapoalim CSV export",
            #[cfg(feature = "xlsx")]
            Self::HapoalimXlsx => "Bank Hapoalim Excel export",
        }
    }

    pub fn detect(&self, file_path: &Path) -> bool {
        match self {
            Self::HapoalimCsv => detect_hapoalim_csv(file_path),
            #[cfg(feature = "xlsx")]
            Self::HapoalimXlsx => detect_hapoalim_xlsx(file_path),
        }
    }

    pub fn parse(&self, file_path: &Path) -> Result<Vec<Transaction>> {
        match self {
            Self::HapoalimCsv => parse_hapoalim_csv(file_path),
            #[cfg(feature = "xlsx")]
            Self::HapoalimXlsx => parse_hapoalim_xlsx(file_path),
        }
    }
}

const ALL_STATEMENTS: &[StatementKind] = &[
    StatementKind::HapoalimCsv,
    #[cfg(feature = "xlsx")]
    StatementKind::HapoalimXlsx,
];

pub fn get_by_key(key: &str) -> Option<StatementKind> {
    ALL_STATEMENTS.iter().find(|s| s.key() == key).copied()
}

pub fn get_for_file(file_path: &Path) -> Option<StatementKind> {
    ALL_STATEMENTS.iter().find(|s| s.detect(file_path)).copied()
}

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

// The export puts the transaction table below a free-form preamble, so the
// header row is found by content, not position. Column order varies between
// the web and app exports; only the date and credit columns are mandatory.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    date: usize,
    credit: usize,
    details: Option<usize>,
    reference: Option<usize>,
    beneficiary: Option<usize>,
}

fn resolve_columns(record: &csv::StringRecord) -> Option<ColumnMap> {
    let find = |needle: &str| record.iter().position(|f| f.contains(needle));
    let date = find("תאריך")?;
    let credit = find("זכות")?;
    Some(ColumnMap {
        date,
        credit,
        details: find("פרטים"),
        reference: find("אסמכתא"),
        beneficiary: find("עבור").or_else(|| find("לטובת")),
    })
}

// ---------------------------------------------------------------------------
// Hapoalim CSV parser
// ---------------------------------------------------------------------------

fn detect_hapoalim_csv(file_path: &Path) -> bool {
    let Ok(file) = std::fs::File::open(file_path) else {
        return false;
    };
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        if resolve_columns(&record).is_some() {
            return true;
        }
    }
    false
}

fn parse_hapoalim_csv(file_path: &Path) -> Result<Vec<Transaction>> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut rows = Vec::new();
    let mut columns: Option<ColumnMap> = None;

    for result in rdr.records() {
        let Ok(record) = result else { continue };
        let Some(cols) = columns else {
            columns = resolve_columns(&record);
            continue;
        };
        let min_cols = cols.date.max(cols.credit) + 1;
        if record.len() < min_cols {
            continue;
        }
        let field =
            |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim().to_string();

        // Only committee money: the beneficiary column carries the building
        // committee marker on qualifying rows.
        let beneficiary = field(cols.beneficiary);
        if !beneficiary.contains("ועד") {
            continue;
        }
        let amount = parse_amount(record.get(cols.credit).unwrap_or(""));
        if amount <= 0.0 {
            continue;
        }
        let Some(date) = parse_date_dmy(record.get(cols.date).unwrap_or("")) else {
            continue;
        };
        let details = field(cols.details);
        let description = format!("{details} {beneficiary}").trim().to_string();
        let reference = clean_reference(&field(cols.reference));
        let id = stable_id(reference.as_deref(), date, amount, &description);
        rows.push(Transaction {
            id,
            date,
            description,
            amount,
            reference,
        });
    }

    if columns.is_none() {
        return Err(VaadError::BadStatement(format!(
            "no header row with תאריך and זכות columns in {}",
            file_path.display()
        )));
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Hapoalim Excel parser (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn detect_hapoalim_xlsx(file_path: &Path) -> bool {
    if !file_path.extension().map_or(false, |e| {
        e.eq_ignore_ascii_case("xlsx") || e.eq_ignore_ascii_case("xls")
    }) {
        return false;
    }
    calamine::open_workbook_auto(file_path).is_ok()
}

#[cfg(feature = "xlsx")]
fn resolve_xlsx_columns(row: &[calamine::Data]) -> Option<ColumnMap> {
    use calamine::Data;
    let find = |needle: &str| {
        row.iter()
            .position(|c| matches!(c, Data::String(s) if s.contains(needle)))
    };
    let date = find("תאריך")?;
    let credit = find("זכות")?;
    Some(ColumnMap {
        date,
        credit,
        details: find("פרטים"),
        reference: find("אסמכתא"),
        beneficiary: find("עבור").or_else(|| find("לטובת")),
    })
}

#[cfg(feature = "xlsx")]
fn parse_hapoalim_xlsx(file_path: &Path) -> Result<Vec<Transaction>> {
    use calamine::{Data, Reader};

    let mut workbook = calamine::open_workbook_auto(file_path).map_err(|e| {
        VaadError::BadStatement(format!("failed to open {}: {e}", file_path.display()))
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            VaadError::BadStatement(format!("{} has no sheets", file_path.display()))
        })?
        .map_err(|e| {
            VaadError::BadStatement(format!("failed to read {}: {e}", file_path.display()))
        })?;

    let mut rows = Vec::new();
    let mut columns: Option<ColumnMap> = None;

    for row in range.rows() {
        let Some(cols) = columns else {
            columns = resolve_xlsx_columns(row);
            continue;
        };
        let cell_text = |idx: Option<usize>| -> String {
            match idx.and_then(|i| row.get(i)) {
                Some(Data::String(s)) => s.trim().to_string(),
                Some(Data::Float(f)) => f.to_string(),
                Some(Data::Int(i)) => i.to_string(),
                _ => String::new(),
            }
        };

        let beneficiary = cell_text(cols.beneficiary);
        if !beneficiary.contains("ועד") {
            continue;
        }
        let amount = match row.get(cols.credit) {
            Some(Data::Float(f)) => *f,
            Some(Data::Int(i)) => *i as f64,
            Some(Data::String(s)) => parse_amount(s),
            _ => 0.0,
        };
        if amount <= 0.0 {
            continue;
        }
        let date = match row.get(cols.date) {
            Some(Data::Float(f)) => excel_serial_to_date(*f),
            Some(Data::Int(i)) => excel_serial_to_date(*i as f64),
            Some(Data::String(s)) => parse_date_dmy(s),
            Some(Data::DateTime(dt)) => excel_serial_to_date(dt.as_f64()),
            _ => None,
        };
        let Some(date) = date else { continue };
        let details = cell_text(cols.details);
        let description = format!("{details} {beneficiary}").trim().to_string();
        let reference = clean_reference(&cell_text(cols.reference));
        let id = stable_id(reference.as_deref(), date, amount, &description);
        rows.push(Transaction {
            id,
            date,
            description,
            amount,
            reference,
        });
    }

    if columns.is_none() {
        return Err(VaadError::BadStatement(format!(
            "no header row with תאריך and זכות columns in {}",
            file_path.display()
        )));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    // (date, details, reference, credit, beneficiary)
    fn write_hapoalim_csv(
        dir: &Path,
        name: &str,
        rows: &[(&str, &str, &str, &str, &str)],
    ) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut content = String::from("תנועות בחשבון 12-637-388838\n,,,,,\n");
        content.push_str("תאריך,פרטים,אסמכתא,חובה,זכות,עבור\n");
        for (date, details, reference, credit, beneficiary) in rows {
            content.push_str(&format!("{date},{details},{reference},,{credit},{beneficiary}\n"));
        }
        std::fs::write(&path, &content).unwrap();
        path
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), 1234.56);
        assert_eq!(parse_amount("\"400.00\""), 400.0);
        assert_eq!(parse_amount("₪1,200.00"), 1200.0);
        assert_eq!(parse_amount("  -42.50  "), -42.5);
        assert_eq!(parse_amount("(500.00)"), -500.0);
        assert_eq!(parse_amount("not_a_number"), 0.0);
    }

    #[test]
    fn test_parse_date_dmy() {
        assert_eq!(
            parse_date_dmy("15/1/2025"),
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
        assert_eq!(
            parse_date_dmy("03/12/25"),
            NaiveDate::from_ymd_opt(2025, 12, 3)
        );
        assert_eq!(parse_date_dmy("2025-01-15"), None);
        assert_eq!(parse_date_dmy("30/02/2025"), None);
        assert_eq!(parse_date_dmy("invalid"), None);
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(
            excel_serial_to_date(45667.0),
            NaiveDate::from_ymd_opt(2025, 1, 10)
        );
    }

    #[test]
    fn test_stable_id_prefers_reference() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 2).unwrap();
        assert_eq!(stable_id(Some("7701234"), date, 400.0, "whatever"), "7701234");
    }

    #[test]
    fn test_stable_id_is_deterministic() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 2).unwrap();
        let a = stable_id(None, date, 400.0, "העברה מגז ועד בית");
        let b = stable_id(None, date, 400.0, "העברה מגז ועד בית");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let c = stable_id(None, date, 800.0, "העברה מגז ועד בית");
        assert_ne!(a, c);
    }

    #[test]
    fn test_detect_hapoalim_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_hapoalim_csv(
            dir.path(),
            "stmt.csv",
            &[("2/11/2025", "העברה", "123", "400.00", "ועד בית")],
        );
        assert!(StatementKind::HapoalimCsv.detect(&path));
        assert_eq!(get_for_file(&path), Some(StatementKind::HapoalimCsv));

        let other = dir.path().join("other.csv");
        std::fs::write(&other, "Date,Description,Amount\n01/15/2025,COFFEE,-4.50\n").unwrap();
        assert!(!StatementKind::HapoalimCsv.detect(&other));
    }

    #[test]
    fn test_parse_keeps_committee_credits_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_hapoalim_csv(
            dir.path(),
            "stmt.csv",
            &[
                ("2/11/2025", "העברה מניצנה גז", "7701234", "400.00", "ועד בית"),
                // debit row, credit column empty
                ("3/11/2025", "חשמל", "7701235", "", "ועד בית"),
                // credit that is not for the committee
                ("4/11/2025", "החזר", "7701236", "150.00", "שכר דירה"),
                ("5/11/2025", "העברה מכהן", "7701237", "\"1,200.00\"", "ועד הבית"),
            ],
        );
        let rows = StatementKind::HapoalimCsv.parse(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, 400.0);
        assert_eq!(rows[0].reference.as_deref(), Some("7701234"));
        assert_eq!(rows[1].amount, 1200.0);
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2025, 11, 5).unwrap());
    }

    #[test]
    fn test_parse_joins_details_and_beneficiary() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_hapoalim_csv(
            dir.path(),
            "stmt.csv",
            &[("2/11/2025", "העברה מניצנה גז", "123", "400.00", "ועד בית 76")],
        );
        let rows = StatementKind::HapoalimCsv.parse(&path).unwrap();
        assert_eq!(rows[0].description, "העברה מניצנה גז ועד בית 76");
    }

    #[test]
    fn test_parse_skips_summary_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_hapoalim_csv(
            dir.path(),
            "stmt.csv",
            &[
                ("2/11/2025", "העברה", "123", "400.00", "ועד בית"),
                ("", "סה\"כ זכות", "", "400.00", "ועד בית"),
            ],
        );
        let rows = StatementKind::HapoalimCsv.parse(&path).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_parse_zero_reference_gets_digest_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_hapoalim_csv(
            dir.path(),
            "stmt.csv",
            &[("2/11/2025", "הפקדת מזומן", "0", "400.00", "ועד בית")],
        );
        let rows = StatementKind::HapoalimCsv.parse(&path).unwrap();
        assert_eq!(rows[0].reference, None);
        assert_eq!(rows[0].id.len(), 64);
    }

    #[test]
    fn test_parse_errors_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.csv");
        std::fs::write(&path, "a,b,c\n1,2,3\n").unwrap();
        let err = StatementKind::HapoalimCsv.parse(&path);
        assert!(matches!(err, Err(VaadError::BadStatement(_))));
    }

    #[test]
    fn test_get_by_key() {
        assert_eq!(get_by_key("hapoalim_csv"), Some(StatementKind::HapoalimCsv));
        assert_eq!(get_by_key("nope"), None);
    }
}
