// Structured logging setup, plus an optional JSONL audit trail for
// command/data traffic (supplemented from karen/brain.py's flat per-type
// logging, generalized into one append-only log).

mod audit;

pub use audit::{AuditEntry, AuditLog};

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber. Honors `RUST_LOG`, defaulting
/// to `info` when unset.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
