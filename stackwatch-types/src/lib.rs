//! # stackwatch-types
//!
//! Core types for local development stack monitoring. This crate defines the
//! snapshot schema produced by the stackwatch collector and consumed by its
//! HTTP server and any other tooling that wants a machine-readable view of
//! the stack's health.
//!
//! ## Design Goals
//!
//! - **Zero required serialization dependency**: serde support is opt-in via
//!   the `serde` feature
//! - **Immutable snapshots**: a snapshot is assembled once and never mutated;
//!   a new measurement replaces the old one wholesale
//! - **Versioned schema**: every snapshot embeds its schema version so
//!   consumers can handle format evolution
//! - **Pure derivations**: the progress estimate is a deterministic function
//!   of the snapshot's own inputs, with no hidden state
//!
//! ## Example
//!
//! ```rust
//! use stackwatch_types::{DatabaseMetric, ServiceStatus, SizeMetric, Snapshot};
//! use chrono::Utc;
//!
//! let now = Utc::now();
//! let snapshot = Snapshot::builder()
//!     .service(ServiceStatus::new("api", true, now))
//!     .service(ServiceStatus::new("frontend", false, now))
//!     .size(SizeMetric::new("backend-sources", 412))
//!     .database(DatabaseMetric::connected(9))
//!     .derived_progress(58)
//!     .build();
//!
//! assert_eq!(snapshot.services.len(), 2);
//! assert_eq!(snapshot.derived_progress, 58);
//! ```

mod progress;
mod snapshot;
mod status;
mod version;

pub use progress::*;
pub use snapshot::*;
pub use status::*;
pub use version::*;

/// Current schema version.
///
/// Increment this when making breaking changes to the snapshot format.
/// Consumers should check this version and handle older formats appropriately.
pub const SCHEMA_VERSION: u32 = 1;
