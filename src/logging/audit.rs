// Append-only JSONL audit trail for control/data traffic, patterned after
// the teacher's `ConversationLogger` (buffer + periodic flush to a single
// file), generalized from "LLM conversation" to "command or data event".

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// A single logged control or data event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// "control" or "data", per spec.md §4.1's two top-level verbs.
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl AuditEntry {
    pub fn new(kind: &str, name: &str, source: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind: kind.to_string(),
            name: name.to_string(),
            source,
        }
    }
}

/// Buffered JSONL writer, flushed every `flush_threshold` entries.
pub struct AuditLog {
    log_path: PathBuf,
    buffer: Vec<AuditEntry>,
    flush_threshold: usize,
}

impl AuditLog {
    pub fn new(log_path: PathBuf) -> Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create audit log directory")?;
        }
        Ok(Self {
            log_path,
            buffer: Vec::new(),
            flush_threshold: 20,
        })
    }

    pub fn record(&mut self, entry: AuditEntry) -> Result<()> {
        self.buffer.push(entry);
        if self.buffer.len() >= self.flush_threshold {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        debug!("flushing {} audit entries to disk", self.buffer.len());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .context("failed to open audit log file")?;

        for entry in &self.buffer {
            let json = serde_json::to_string(entry).context("failed to serialize audit entry")?;
            writeln!(file, "{}", json).context("failed to write audit entry")?;
        }

        self.buffer.clear();
        Ok(())
    }
}

impl Drop for AuditLog {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
