//! Snapshot collection: fan out every configured probe and assemble one
//! immutable [`Snapshot`].
//!
//! The collector never fails. Each probe resolves to a value or a typed
//! failure; failures are logged with their reason and degrade only their own
//! field (`reachable: false`, `count: 0`, `connected: false`). Output order
//! always follows configured order, regardless of which probes finish first.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::warn;

use stackwatch_probes::{FileCountProbe, Probe, ProbeError, SqliteCatalogProbe, TcpProbe};
use stackwatch_types::{
    completion_percent, DatabaseMetric, ServiceStatus, SizeMetric, Snapshot,
};

use crate::config::StackwatchConfig;

/// Default time bound for filesystem and database probes. Reachability
/// probes carry their own per-service timeout.
pub const DEFAULT_PROBE_BOUND: Duration = Duration::from_secs(10);

type BoolProbe = Arc<dyn Probe<Output = bool>>;
type CountProbe = Arc<dyn Probe<Output = u64>>;

struct ServiceEntry {
    name: String,
    probe: BoolProbe,
}

struct SizeEntry {
    label: String,
    target_count: u64,
    probe: CountProbe,
}

/// Runs all configured probes concurrently and assembles snapshots.
///
/// Probes are held as trait objects, so tests can substitute deterministic
/// fakes for the real network, filesystem and database checks.
///
/// # Example
///
/// ```rust,no_run
/// use stackwatch::collector::Collector;
/// use stackwatch_probes::TcpProbe;
///
/// # #[tokio::main]
/// # async fn main() {
/// let collector = Collector::builder()
///     .service("api", TcpProbe::new("localhost", 8000))
///     .build();
///
/// let snapshot = collector.collect().await;
/// assert_eq!(snapshot.services.len(), 1);
/// # }
/// ```
pub struct Collector {
    services: Vec<ServiceEntry>,
    sizes: Vec<SizeEntry>,
    database: Option<CountProbe>,
    probe_bound: Duration,
}

impl Collector {
    /// Create a builder for configuring a collector.
    pub fn builder() -> CollectorBuilder {
        CollectorBuilder::new()
    }

    /// Build a collector with the real probes described by `config`.
    pub fn from_config(config: &StackwatchConfig) -> Self {
        let mut builder = Collector::builder();

        for spec in &config.services {
            let probe =
                TcpProbe::new(spec.host.clone(), spec.port).with_timeout(spec.timeout());
            builder = builder.service(spec.name.clone(), probe);
        }

        for rule in &config.sizes {
            let mut probe = FileCountProbe::new(&rule.root);
            for r in &rule.match_rules {
                probe = probe.matching(r);
            }
            for r in &rule.exclude_rules {
                probe = probe.excluding(r);
            }
            builder = builder.size(rule.label.clone(), rule.target_count, probe);
        }

        if let Some(db) = &config.database {
            builder = builder.database(SqliteCatalogProbe::new(&db.path));
        }

        builder.build()
    }

    /// Run every probe once and assemble a snapshot.
    ///
    /// All probes are spawned concurrently and then joined in configured
    /// order: a barrier, not a race. Total latency is bounded by the slowest
    /// probe's own time bound, not the sum of them.
    pub async fn collect(&self) -> Snapshot {
        let service_tasks: Vec<_> = self
            .services
            .iter()
            .map(|entry| {
                let probe = entry.probe.clone();
                tokio::spawn(async move { probe.run().await })
            })
            .collect();

        let size_tasks: Vec<_> = self
            .sizes
            .iter()
            .map(|entry| {
                let probe = entry.probe.clone();
                let bound = self.probe_bound;
                tokio::spawn(async move { run_bounded(probe, bound).await })
            })
            .collect();

        let database_task = self.database.as_ref().map(|probe| {
            let probe = probe.clone();
            let bound = self.probe_bound;
            tokio::spawn(async move { run_bounded(probe, bound).await })
        });

        let mut builder = Snapshot::builder().generated_at(Utc::now());

        for (entry, task) in self.services.iter().zip(service_tasks) {
            let reachable = match flatten(task.await) {
                Ok(reachable) => reachable,
                Err(err) => {
                    warn!(service = %entry.name, %err, "reachability probe failed");
                    false
                }
            };
            builder = builder.service(ServiceStatus::new(entry.name.clone(), reachable, Utc::now()));
        }

        let mut counts = Vec::with_capacity(self.sizes.len());
        for (entry, task) in self.sizes.iter().zip(size_tasks) {
            let count = match flatten(task.await) {
                Ok(count) => count,
                Err(err) => {
                    warn!(size = %entry.label, %err, "file count probe failed");
                    0
                }
            };
            counts.push(count);
            builder = builder.size(SizeMetric::new(entry.label.clone(), count));
        }

        let database = match database_task {
            Some(task) => match flatten(task.await) {
                Ok(table_count) => DatabaseMetric::connected(table_count),
                Err(err) => {
                    warn!(%err, "database catalog probe failed");
                    DatabaseMetric::unavailable()
                }
            },
            None => DatabaseMetric::unavailable(),
        };

        let progress = completion_percent(
            counts
                .iter()
                .zip(&self.sizes)
                .map(|(count, entry)| (*count, entry.target_count)),
        );

        builder.database(database).derived_progress(progress).build()
    }
}

/// Builder for configuring a [`Collector`].
#[derive(Default)]
pub struct CollectorBuilder {
    services: Vec<ServiceEntry>,
    sizes: Vec<SizeEntry>,
    database: Option<CountProbe>,
    probe_bound: Option<Duration>,
}

impl CollectorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service reachability probe. Call order defines output order.
    pub fn service(
        mut self,
        name: impl Into<String>,
        probe: impl Probe<Output = bool> + 'static,
    ) -> Self {
        self.services.push(ServiceEntry {
            name: name.into(),
            probe: Arc::new(probe),
        });
        self
    }

    /// Add a size metric probe with its configured target count.
    /// Call order defines output order.
    pub fn size(
        mut self,
        label: impl Into<String>,
        target_count: u64,
        probe: impl Probe<Output = u64> + 'static,
    ) -> Self {
        self.sizes.push(SizeEntry {
            label: label.into(),
            target_count,
            probe: Arc::new(probe),
        });
        self
    }

    /// Set the database catalog probe.
    pub fn database(mut self, probe: impl Probe<Output = u64> + 'static) -> Self {
        self.database = Some(Arc::new(probe));
        self
    }

    /// Override the time bound applied to filesystem and database probes.
    pub fn probe_bound(mut self, bound: Duration) -> Self {
        self.probe_bound = Some(bound);
        self
    }

    /// Build the collector.
    pub fn build(self) -> Collector {
        Collector {
            services: self.services,
            sizes: self.sizes,
            database: self.database,
            probe_bound: self.probe_bound.unwrap_or(DEFAULT_PROBE_BOUND),
        }
    }
}

async fn run_bounded<T>(probe: Arc<dyn Probe<Output = T>>, bound: Duration) -> Result<T, ProbeError>
where
    T: Send + 'static,
{
    match tokio::time::timeout(bound, probe.run()).await {
        Ok(result) => result,
        Err(_elapsed) => Err(ProbeError::Timeout),
    }
}

fn flatten<T>(
    joined: Result<Result<T, ProbeError>, tokio::task::JoinError>,
) -> Result<T, ProbeError> {
    match joined {
        Ok(result) => result,
        Err(err) => Err(ProbeError::Task(err.to_string())),
    }
}
