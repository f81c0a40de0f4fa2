//! Payment grid storage: one row per apartment, one column per month label.
//!
//! Rows and columns are append-only. Ids are monotone and nothing is ever
//! deleted, so id order is creation order; "most recently added" means
//! highest id. Cells sit on (row, column) pairs and can carry a persisted
//! underpaid marker. The audit log lives here too since every grid mutation
//! ends with an audit append.

use std::collections::HashMap;

use rusqlite::{params, Connection};

use crate::error::Result;
use crate::models::AuditEntry;

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub amount: f64,
    pub underpaid: bool,
}

/// Read-only view of the whole grid, for rendering and tests.
pub struct GridSnapshot {
    pub columns: Vec<String>,
    pub apartments: Vec<String>,
    pub cells: HashMap<(usize, usize), Cell>,
}

pub struct PaymentGrid<'a> {
    conn: &'a Connection,
}

impl<'a> PaymentGrid<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        PaymentGrid { conn }
    }

    pub fn column_id(&self, label: &str) -> Result<Option<i64>> {
        match self.conn.query_row(
            "SELECT id FROM grid_columns WHERE label = ?1",
            params![label],
            |r| r.get(0),
        ) {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Column id for a label, appending a new column on first use.
    pub fn ensure_column(&self, label: &str) -> Result<i64> {
        if let Some(id) = self.column_id(label)? {
            return Ok(id);
        }
        self.conn
            .execute("INSERT INTO grid_columns (label) VALUES (?1)", params![label])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn row_id(&self, apartment: &str) -> Result<Option<i64>> {
        match self.conn.query_row(
            "SELECT id FROM grid_rows WHERE apartment = ?1",
            params![apartment],
            |r| r.get(0),
        ) {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Row id for an apartment, appending a new row on first use.
    pub fn ensure_row(&self, apartment: &str) -> Result<i64> {
        if let Some(id) = self.row_id(apartment)? {
            return Ok(id);
        }
        self.conn.execute(
            "INSERT INTO grid_rows (apartment) VALUES (?1)",
            params![apartment],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn cell(&self, row_id: i64, column_id: i64) -> Result<Option<Cell>> {
        match self.conn.query_row(
            "SELECT amount, underpaid FROM grid_cells WHERE row_id = ?1 AND column_id = ?2",
            params![row_id, column_id],
            |r| {
                Ok(Cell {
                    amount: r.get(0)?,
                    underpaid: r.get::<_, i64>(1)? != 0,
                })
            },
        ) {
            Ok(cell) => Ok(Some(cell)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write_cell(&self, row_id: i64, column_id: i64, amount: f64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO grid_cells (row_id, column_id, amount) VALUES (?1, ?2, ?3)
             ON CONFLICT (row_id, column_id) DO UPDATE SET amount = excluded.amount",
            params![row_id, column_id, amount],
        )?;
        Ok(())
    }

    pub fn mark_underpaid(&self, row_id: i64, column_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE grid_cells SET underpaid = 1 WHERE row_id = ?1 AND column_id = ?2",
            params![row_id, column_id],
        )?;
        Ok(())
    }

    /// Columns where this row has no cell yet, newest column first. The
    /// excluded column (the current month) never appears.
    pub fn unpaid_columns(&self, row_id: i64, exclude_column: i64) -> Result<Vec<(i64, String)>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT c.id, c.label FROM grid_columns c
             WHERE c.id != ?2
               AND NOT EXISTS (
                   SELECT 1 FROM grid_cells g WHERE g.row_id = ?1 AND g.column_id = c.id
               )
             ORDER BY c.id DESC",
        )?;
        let rows = stmt
            .query_map(params![row_id, exclude_column], |r| {
                Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn append_audit(&self, entry: &AuditEntry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO audit_log (date, amount, payer, apartment, reference, receipt_link, months_covered)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.date,
                entry.amount,
                entry.payer,
                entry.apartment,
                entry.reference,
                entry.receipt_link,
                entry.months_covered,
            ],
        )?;
        Ok(())
    }

    pub fn audit_entries(&self) -> Result<Vec<AuditEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, amount, payer, apartment, reference, receipt_link, months_covered
             FROM audit_log ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(AuditEntry {
                    id: Some(r.get(0)?),
                    date: r.get(1)?,
                    amount: r.get(2)?,
                    payer: r.get(3)?,
                    apartment: r.get(4)?,
                    reference: r.get(5)?,
                    receipt_link: r.get(6)?,
                    months_covered: r.get(7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Whole-grid view in append order.
    pub fn snapshot(&self) -> Result<GridSnapshot> {
        let mut stmt = self.conn.prepare("SELECT id, label FROM grid_columns ORDER BY id")?;
        let columns = stmt
            .query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare("SELECT id, apartment FROM grid_rows ORDER BY id")?;
        let rows = stmt
            .query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let col_index: HashMap<i64, usize> =
            columns.iter().enumerate().map(|(i, (id, _))| (*id, i)).collect();
        let row_index: HashMap<i64, usize> =
            rows.iter().enumerate().map(|(i, (id, _))| (*id, i)).collect();

        let mut stmt = self
            .conn
            .prepare("SELECT row_id, column_id, amount, underpaid FROM grid_cells")?;
        let mut cells = HashMap::new();
        let iter = stmt.query_map([], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, i64>(1)?,
                r.get::<_, f64>(2)?,
                r.get::<_, i64>(3)? != 0,
            ))
        })?;
        for cell in iter {
            let (row_id, column_id, amount, underpaid) = cell?;
            if let (Some(&ri), Some(&ci)) = (row_index.get(&row_id), col_index.get(&column_id)) {
                cells.insert((ri, ci), Cell { amount, underpaid });
            }
        }

        Ok(GridSnapshot {
            columns: columns.into_iter().map(|(_, l)| l).collect(),
            apartments: rows.into_iter().map(|(_, a)| a).collect(),
            cells,
        })
    }
}
