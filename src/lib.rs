//! # stackwatch
//!
//! Health and completion snapshot server for a local development stack.
//!
//! stackwatch aggregates point-in-time signals about a development
//! environment (is the backend port answering, how many source files exist,
//! does the database have its tables) into one immutable [`Snapshot`] and
//! serves it over HTTP as JSON and as a small status page.
//!
//! ## Architecture
//!
//! - **[`config`]**: the configuration surface - which services, trees and
//!   database to watch, listen address and refresh policy
//! - **[`collector`]**: runs every configured probe concurrently and
//!   assembles snapshots; individual probe failures degrade their own field
//!   only
//! - **[`server`]**: the hyper HTTP server holding the latest snapshot in a
//!   single atomically replaced slot, with on-demand and interval refresh
//!   policies
//! - **[`render`]**: pure JSON and HTML renderings of a given snapshot
//!
//! The probes themselves live in the `stackwatch-probes` crate and the
//! snapshot schema in `stackwatch-types`.
//!
//! ## Usage
//!
//! ```bash
//! # Serve snapshots of the stack described in stackwatch.toml
//! stackwatch --config stackwatch.toml
//!
//! # One snapshot as JSON on stdout
//! stackwatch --config stackwatch.toml --oneshot
//! ```

pub mod collector;
pub mod config;
pub mod render;
pub mod server;

pub use collector::{Collector, CollectorBuilder};
pub use config::{RefreshPolicy, StackwatchConfig};
pub use server::{RefreshHandle, SnapshotServer};

// Re-export the schema for consumers of the library API.
pub use stackwatch_types::{DatabaseMetric, ServiceStatus, SizeMetric, Snapshot};
