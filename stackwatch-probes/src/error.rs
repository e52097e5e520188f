//! Error types for probes.

use thiserror::Error;

/// Infrastructure failures a probe can hit while checking its signal.
///
/// These cover "could not check" situations only. "Checked and found
/// nothing" outcomes (closed port, missing directory, empty catalog) are
/// ordinary `Ok` values on the probe itself.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe target is malformed or unresolvable.
    #[error("invalid probe target: {0}")]
    InvalidTarget(String),

    /// Connection setup failed for a reason other than nobody listening.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The filesystem refused access during a walk.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The database rejected the catalog query.
    #[error("database error: {0}")]
    Database(String),

    /// The probe exceeded its time bound.
    #[error("probe timed out")]
    Timeout,

    /// The probe task was cancelled or panicked below the boundary.
    #[error("probe task failed: {0}")]
    Task(String),
}

impl From<rusqlite::Error> for ProbeError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, ref message) => match code.code {
                rusqlite::ErrorCode::CannotOpen | rusqlite::ErrorCode::NotADatabase => {
                    ProbeError::Connection(message.clone().unwrap_or_else(|| err.to_string()))
                }
                _ => ProbeError::Database(err.to_string()),
            },
            other => ProbeError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_reason() {
        let err = ProbeError::InvalidTarget("no-such-host".into());
        assert_eq!(err.to_string(), "invalid probe target: no-such-host");
    }

    #[test]
    fn cannot_open_maps_to_connection() {
        let sqlite_err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
            Some("unable to open database file".into()),
        );
        assert!(matches!(
            ProbeError::from(sqlite_err),
            ProbeError::Connection(_)
        ));
    }
}
