//! # stackwatch-probes
//!
//! Independent, read-only checks for local development stack signals.
//!
//! Each probe inspects one signal and resolves to a typed result or a typed
//! failure; nothing panics or propagates past the probe boundary, and no
//! probe depends on another. Absence is data, not an error: a port with
//! nothing listening is `Ok(false)`, a missing source tree is `Ok(0)`.
//! [`ProbeError`] is reserved for infrastructure problems such as an
//! unresolvable host or a permission-denied directory.
//!
//! ## Provided Probes
//!
//! - [`TcpProbe`] - can a TCP connection to `host:port` be opened within a
//!   bounded time
//! - [`FileCountProbe`] - how many files under a root match a set of name
//!   rules
//! - [`SqliteCatalogProbe`] - how many user tables the database catalog
//!   reports
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stackwatch_probes::{Probe, TcpProbe};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let probe = TcpProbe::new("127.0.0.1", 8000).with_timeout(Duration::from_secs(3));
//!
//!     match probe.run().await {
//!         Ok(true) => println!("backend is up"),
//!         Ok(false) => println!("backend is down"),
//!         Err(e) => println!("could not check: {e}"),
//!     }
//! }
//! ```

use async_trait::async_trait;

pub mod error;
pub mod files;
pub mod sqlite;
pub mod tcp;

pub use error::ProbeError;
pub use files::FileCountProbe;
pub use sqlite::SqliteCatalogProbe;
pub use tcp::TcpProbe;

/// A single independent check against one stack signal.
///
/// Implementations are read-only and side-effect-free, so an abandoned
/// in-flight probe needs no cleanup. The collector holds probes as trait
/// objects, which lets tests substitute deterministic fakes for the real
/// network/filesystem/database implementations.
#[async_trait]
pub trait Probe: Send + Sync {
    /// The probe-specific success value.
    type Output;

    /// Run the check once and resolve to a value or a typed failure.
    async fn run(&self) -> Result<Self::Output, ProbeError>;
}
