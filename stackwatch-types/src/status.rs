//! Per-signal entries that make up a snapshot.

use chrono::{DateTime, Utc};

/// Reachability of one configured service at a point in time.
///
/// Ephemeral by design: recomputed on every snapshot, never persisted.
/// `reachable: false` means "checked and nothing answered", which is an
/// ordinary result, not a probe failure.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ServiceStatus {
    /// Configured service identifier (e.g. "api", "frontend").
    pub name: String,

    /// Whether a TCP connection to the service's port could be opened.
    pub reachable: bool,

    /// When the check completed.
    pub checked_at: DateTime<Utc>,
}

impl ServiceStatus {
    /// Create a new service status entry.
    pub fn new(name: impl Into<String>, reachable: bool, checked_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            reachable,
            checked_at,
        }
    }
}

/// File count for one configured source tree.
///
/// The matching pattern and the configured target live in configuration;
/// the snapshot carries only the label and the observed count.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct SizeMetric {
    /// Configured label (e.g. "backend-sources").
    pub label: String,

    /// Number of matching files observed at snapshot time.
    pub count: u64,
}

impl SizeMetric {
    /// Create a new size metric entry.
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Result of the database catalog check.
///
/// `connected` is true iff the catalog query succeeded, independent of
/// whether the table count is zero. A database with no tables yet is
/// `{ table_count: 0, connected: true }`; an unreachable one is
/// `{ table_count: 0, connected: false }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct DatabaseMetric {
    /// Number of user-visible tables reported by the catalog.
    pub table_count: u64,

    /// Whether the catalog query succeeded.
    pub connected: bool,
}

impl DatabaseMetric {
    /// A successful catalog check that found `table_count` tables.
    pub fn connected(table_count: u64) -> Self {
        Self {
            table_count,
            connected: true,
        }
    }

    /// The conservative default for a failed catalog check.
    pub fn unavailable() -> Self {
        Self {
            table_count: 0,
            connected: false,
        }
    }
}

impl Default for DatabaseMetric {
    fn default() -> Self {
        Self::unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_status_new() {
        let now = Utc::now();
        let status = ServiceStatus::new("api", true, now);
        assert_eq!(status.name, "api");
        assert!(status.reachable);
        assert_eq!(status.checked_at, now);
    }

    #[test]
    fn database_metric_connected_with_zero_tables() {
        // Empty database is still a successful check.
        let db = DatabaseMetric::connected(0);
        assert!(db.connected);
        assert_eq!(db.table_count, 0);
    }

    #[test]
    fn database_metric_unavailable_is_default() {
        assert_eq!(DatabaseMetric::default(), DatabaseMetric::unavailable());
        assert!(!DatabaseMetric::unavailable().connected);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn wire_field_names_are_camel_case() {
        let now = Utc::now();
        let status = ServiceStatus::new("api", false, now);
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"checkedAt\""));

        let db = DatabaseMetric::connected(3);
        let json = serde_json::to_string(&db).unwrap();
        assert!(json.contains("\"tableCount\""));
    }
}
