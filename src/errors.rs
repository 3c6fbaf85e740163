// Typed errors for the coordination/dispatch core, per spec.md §7.
//
// Binary and CLI glue uses `anyhow::Result` throughout (see src/main.rs,
// src/cli); this enum exists for the error kinds callers inside the core
// need to match on and route to the right response envelope.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Peer unreachable, timed out, or failed TLS handshake. Soft: the
    /// caller logs and, on the prober path, counts it toward demotion.
    #[error("transport error: {0}")]
    Transport(String),

    /// Bad JSON, unknown command, or missing required field.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Command not present in a device's `accepts` set.
    #[error("capability error: {0} does not accept {1}")]
    Capability(String, String),

    /// Unexpected failure inside a handler; surfaced as HTTP 500.
    #[error("internal error: {0}")]
    Internal(String),

    /// The listening socket cannot be bound at startup. The caller should
    /// propagate this, not retry indefinitely.
    #[error("fatal error: {0}")]
    Fatal(String),
}

impl CoreError {
    /// Maps this error onto the three categories the transport's response
    /// envelope distinguishes: soft failures that still return 200, and the
    /// one kind (`Internal`) that maps to a 500.
    pub fn is_internal(&self) -> bool {
        matches!(self, CoreError::Internal(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_is_flagged() {
        assert!(CoreError::Internal("boom".into()).is_internal());
        assert!(!CoreError::Protocol("bad json".into()).is_internal());
    }

    #[test]
    fn test_capability_message() {
        let err = CoreError::Capability("listener-1".into(), "SAY".into());
        assert_eq!(
            err.to_string(),
            "capability error: listener-1 does not accept SAY"
        );
    }
}
