// Data buffer and pending `ask` continuation (spec.md §3).

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::config::DATA_BUFFER_CAP;

#[derive(Debug, Clone, Serialize)]
pub struct DataEntry {
    pub data: serde_json::Value,
    pub time: DateTime<Utc>,
}

/// Bounded, most-recent-first buffer of data entries, keyed by data-type
/// string. Capped at `DATA_BUFFER_CAP` (spec.md P3): oldest entries are
/// evicted on insert, by truncating after every push rather than the
/// original's single `pop()` (spec.md §9 notes this as a known bug in the
/// source it was distilled from).
#[derive(Default)]
pub struct DataBuffer {
    by_type: Mutex<HashMap<String, Vec<DataEntry>>>,
}

impl DataBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, data_type: &str, value: serde_json::Value) {
        let mut by_type = self.by_type.lock().await;
        let entries = by_type.entry(data_type.to_string()).or_default();
        entries.insert(
            0,
            DataEntry {
                data: value,
                time: Utc::now(),
            },
        );
        entries.truncate(DATA_BUFFER_CAP);
    }

    pub async fn get(&self, data_type: &str) -> Vec<DataEntry> {
        self.by_type
            .lock()
            .await
            .get(data_type)
            .cloned()
            .unwrap_or_default()
    }
}

/// A one-shot continuation installed by `ask(text, callback, timeout)`
/// (spec.md §4.6), consumed at most once (P4) by the next `AUDIO_INPUT`
/// whose arrival is within `timeout` seconds.
pub struct PendingAsk {
    callback: Box<dyn FnOnce(String) + Send>,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct AskSlot {
    slot: Mutex<Option<PendingAsk>>,
}

impl AskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a new continuation, replacing any prior pending one
    /// (spec.md §4.6: "issuing a new ask replaces the prior one").
    pub async fn install(&self, callback: Box<dyn FnOnce(String) + Send>, timeout_secs: u64) {
        let mut slot = self.slot.lock().await;
        *slot = Some(PendingAsk {
            callback,
            expires_at: Utc::now() + chrono::Duration::seconds(timeout_secs as i64),
        });
    }

    /// Consumes the pending continuation if present and unexpired,
    /// invoking its callback with `text`. Returns whether it was consumed.
    pub async fn try_consume(&self, text: &str) -> bool {
        let mut slot = self.slot.lock().await;
        let Some(pending) = slot.take() else {
            return false;
        };
        if pending.expires_at < Utc::now() {
            return false;
        }
        (pending.callback)(text.to_string());
        true
    }
}
