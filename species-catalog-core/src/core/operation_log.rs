//! Audit trail of catalog mutations and its retention policy.

use crate::{Operation, Result};
use rusqlite::{Connection, Transaction};
use serde::Serialize;

const SECONDS_PER_DAY: i64 = 86_400;

/// Controls which old operations are removed from the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeStrategy {
    /// Retain only the most recent `keep_last` operations.
    LocalOnly { keep_last: usize },
    /// Retain operations for `retention_days`, however many there are.
    KeepDays { retention_days: u32 },
}

/// A row of the operation log, without its JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSummary {
    pub operation_id: String,
    pub timestamp: i64,
    pub actor: String,
    pub operation_type: String,
}

/// Records species mutations to the `operations` table and purges stale entries.
pub struct OperationLog {
    strategy: PurgeStrategy,
}

impl OperationLog {
    /// Creates a new `OperationLog` with the given purge strategy.
    pub fn new(strategy: PurgeStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> PurgeStrategy {
        self.strategy
    }

    /// Serialises `op` and appends it to the `operations` table within `tx`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CatalogError::Database`] if the INSERT fails, or
    /// [`crate::CatalogError::Json`] if `op` cannot be serialised.
    pub fn log(&self, tx: &Transaction, op: &Operation) -> Result<()> {
        let op_json = serde_json::to_string(op)?;

        tx.execute(
            "INSERT INTO operations (operation_id, timestamp, actor, operation_type, operation_data)
             VALUES (?, ?, ?, ?, ?)",
            rusqlite::params![op.operation_id(), op.timestamp(), op.actor(), op.type_name(), op_json],
        )?;

        Ok(())
    }

    /// Deletes old operations from the log according to the purge strategy.
    ///
    /// Called after every [`log`](Self::log), inside the same transaction.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CatalogError::Database`] if the DELETE fails.
    pub fn purge_if_needed(&self, tx: &Transaction) -> Result<()> {
        match self.strategy {
            PurgeStrategy::LocalOnly { keep_last } => {
                tx.execute(
                    "DELETE FROM operations WHERE id NOT IN (
                        SELECT id FROM operations ORDER BY id DESC LIMIT ?
                    )",
                    [keep_last as i64],
                )?;
            }
            PurgeStrategy::KeepDays { retention_days } => {
                let cutoff =
                    chrono::Utc::now().timestamp() - (retention_days as i64 * SECONDS_PER_DAY);
                tx.execute("DELETE FROM operations WHERE timestamp < ?", [cutoff])?;
            }
        }
        Ok(())
    }

    /// Most recent operations first, optionally only those touching `species_id`.
    pub fn list(&self, conn: &Connection, species_id: Option<i64>) -> Result<Vec<Operation>> {
        let mut stmt = conn.prepare("SELECT operation_data FROM operations ORDER BY id DESC")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut ops = Vec::with_capacity(rows.len());
        for json in rows {
            let op: Operation = serde_json::from_str(&json)?;
            if species_id.map_or(true, |id| op.species_id() == id) {
                ops.push(op);
            }
        }
        Ok(ops)
    }

    /// Log rows without their JSON bodies, most recent first.
    pub fn summaries(&self, conn: &Connection) -> Result<Vec<OperationSummary>> {
        let mut stmt = conn.prepare(
            "SELECT operation_id, timestamp, actor, operation_type FROM operations ORDER BY id DESC",
        )?;
        let summaries = stmt
            .query_map([], |row| {
                Ok(OperationSummary {
                    operation_id: row.get(0)?,
                    timestamp: row.get(1)?,
                    actor: row.get(2)?,
                    operation_type: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(summaries)
    }
}
