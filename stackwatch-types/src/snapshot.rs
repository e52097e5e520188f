//! Snapshot - a point-in-time view of development stack state.

use chrono::{DateTime, Utc};

use crate::{DatabaseMetric, SchemaVersion, ServiceStatus, SizeMetric};

/// A point-in-time aggregation of all probe results.
///
/// This is the top-level type assembled by the collector on each aggregation
/// cycle. Snapshots are immutable: a new cycle produces a new value that
/// supersedes the previous one, and nothing is persisted across process
/// restarts.
///
/// The `services` and `sizes` sequences preserve configured order regardless
/// of which probes finished first.
///
/// # Example
///
/// ```rust
/// use stackwatch_types::{DatabaseMetric, ServiceStatus, SizeMetric, Snapshot};
/// use chrono::Utc;
///
/// let snapshot = Snapshot::builder()
///     .service(ServiceStatus::new("api", true, Utc::now()))
///     .size(SizeMetric::new("backend-sources", 120))
///     .database(DatabaseMetric::connected(12))
///     .derived_progress(40)
///     .build();
///
/// assert!(snapshot.version.is_compatible());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Snapshot {
    /// Schema version for forward compatibility.
    pub version: SchemaVersion,

    /// When this snapshot was generated.
    pub generated_at: DateTime<Utc>,

    /// Per-service reachability, in configured order.
    pub services: Vec<ServiceStatus>,

    /// Per-tree file counts, in configured order.
    pub sizes: Vec<SizeMetric>,

    /// Database catalog check result.
    pub database: DatabaseMetric,

    /// Heuristic 0-100 completion estimate, see
    /// [`completion_percent`](crate::completion_percent).
    pub derived_progress: u8,
}

impl Snapshot {
    /// Create a builder for constructing snapshots.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// Number of services that answered their reachability check.
    pub fn reachable_services(&self) -> usize {
        self.services.iter().filter(|s| s.reachable).count()
    }

    /// Total files counted across all size metrics.
    pub fn total_files(&self) -> u64 {
        self.sizes.iter().fold(0, |acc, s| acc.saturating_add(s.count))
    }
}

/// Builder for constructing `Snapshot` instances.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    generated_at: Option<DateTime<Utc>>,
    services: Vec<ServiceStatus>,
    sizes: Vec<SizeMetric>,
    database: Option<DatabaseMetric>,
    derived_progress: u8,
}

impl SnapshotBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the generation timestamp. Defaults to now.
    pub fn generated_at(mut self, ts: DateTime<Utc>) -> Self {
        self.generated_at = Some(ts);
        self
    }

    /// Append a service entry. Call order defines output order.
    pub fn service(mut self, status: ServiceStatus) -> Self {
        self.services.push(status);
        self
    }

    /// Append a size metric entry. Call order defines output order.
    pub fn size(mut self, metric: SizeMetric) -> Self {
        self.sizes.push(metric);
        self
    }

    /// Set the database metric. Defaults to [`DatabaseMetric::unavailable`].
    pub fn database(mut self, metric: DatabaseMetric) -> Self {
        self.database = Some(metric);
        self
    }

    /// Set the derived progress estimate. Defaults to 0.
    pub fn derived_progress(mut self, percent: u8) -> Self {
        self.derived_progress = percent;
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> Snapshot {
        Snapshot {
            version: SchemaVersion::current(),
            generated_at: self.generated_at.unwrap_or_else(Utc::now),
            services: self.services,
            sizes: self.sizes,
            database: self.database.unwrap_or_default(),
            derived_progress: self.derived_progress,
        }
    }
}
