//! Database catalog probe for SQLite.
//!
//! Opens the database file read-only and counts user tables in
//! `sqlite_master`, skipping SQLite's internal `sqlite_%` tables. An
//! unopenable or corrupt file is a probe failure; an empty catalog is an
//! ordinary zero.

use std::path::PathBuf;

use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags};

use crate::{Probe, ProbeError};

const USER_TABLE_COUNT_SQL: &str =
    "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'";

/// Probe that reports the number of user tables in a SQLite database.
///
/// # Example
///
/// ```rust,no_run
/// use stackwatch_probes::SqliteCatalogProbe;
///
/// # #[tokio::main]
/// # async fn main() {
/// let probe = SqliteCatalogProbe::new("dev.db");
/// match probe.table_count().await {
///     Ok(n) => println!("{n} tables"),
///     Err(e) => println!("database unavailable: {e}"),
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SqliteCatalogProbe {
    path: PathBuf,
}

impl SqliteCatalogProbe {
    /// Create a probe for the database file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Query the catalog for the user table count.
    ///
    /// The connection is opened read-only and never creates the file; a
    /// missing database resolves to a connection failure, which the
    /// collector maps to `connected: false`.
    pub async fn table_count(&self) -> Result<u64, ProbeError> {
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> Result<u64, ProbeError> {
            let conn = Connection::open_with_flags(
                &path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            let count: i64 = conn.query_row(USER_TABLE_COUNT_SQL, [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
        .map_err(|e| ProbeError::Task(e.to_string()))?
    }
}

#[async_trait]
impl Probe for SqliteCatalogProbe {
    type Output = u64;

    async fn run(&self) -> Result<u64, ProbeError> {
        self.table_count().await
    }
}
