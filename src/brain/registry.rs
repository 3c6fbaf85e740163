// Brain registry (C4) — spec.md §4.4.
//
// Grounded directly on `darwin-finch-finch/src/server/brain_registry.rs`:
// an `RwLock`-guarded collection with async accessor methods that take the
// lock, mutate, and return owned summary structs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::device::DeviceTypeSummary;

/// A registered Container, keyed by its reachable URL (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContainerRecord {
    pub url: String,
    pub active: bool,
    pub devices: HashMap<String, DeviceTypeSummary>,
    #[serde(rename = "failureCount")]
    pub failure_count: u32,
}

impl ContainerRecord {
    pub fn listener_count(&self) -> usize {
        self.devices.get("listener").map(|d| d.count).unwrap_or(0)
    }

    pub fn has_speaker(&self) -> bool {
        self.devices.contains_key("speaker")
    }
}

/// Payload posted to `/register` (spec.md §6.2).
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPayload {
    pub port: u16,
    #[serde(default = "default_use_http")]
    pub use_http: bool,
    /// The Container's self-reported, externally reachable URL. Preferred
    /// over deriving one from the inbound TCP peer address, which spec.md
    /// §9 flags as a bug in the original not to be carried forward (NAT,
    /// multiple interfaces, or a reverse proxy all make the peer address
    /// an unreliable stand-in for how other hosts actually reach this
    /// Container). Falls back to peer-address derivation only when a
    /// Container predating this field omits it.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub devices: HashMap<String, DeviceTypeSummary>,
}

fn default_use_http() -> bool {
    true
}

/// Thread-safe registry of Container records. Mutated by `register`, the
/// health prober, and relay failure paths; guarded with a single exclusive
/// lock per spec.md §5.
#[derive(Clone)]
pub struct BrainRegistry {
    records: Arc<RwLock<Vec<ContainerRecord>>>,
}

impl BrainRegistry {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Uses the Container's self-reported `url` when present; otherwise
    /// falls back to building one from the caller's peer host and the
    /// payload's port (`{proto}://{peer_host}:{payload.port}`, proto
    /// `https` iff `use_http` is false). Then upserts the record.
    ///
    /// P1 (at most one record per URL) and R1 (idempotent re-registration)
    /// hold because the URL is looked up before insertion.
    pub async fn register(&self, peer_host: &str, payload: RegisterPayload) -> String {
        let url = payload.url.clone().unwrap_or_else(|| {
            let proto = if payload.use_http { "http" } else { "https" };
            format!("{proto}://{peer_host}:{}", payload.port)
        });

        let mut records = self.records.write().await;
        if let Some(existing) = records.iter_mut().find(|r| r.url == url) {
            existing.active = true;
            existing.devices = payload.devices;
            existing.failure_count = 0;
        } else {
            records.push(ContainerRecord {
                url: url.clone(),
                active: true,
                devices: payload.devices,
                failure_count: 0,
            });
        }
        url
    }

    /// Full registry snapshot, for `/status/devices {command:"get-all-current"}`.
    pub async fn list_all(&self) -> Vec<ContainerRecord> {
        self.records.read().await.clone()
    }

    pub async fn active(&self) -> Vec<ContainerRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.active)
            .cloned()
            .collect()
    }

    pub async fn active_with_listener(&self) -> Vec<ContainerRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.active && r.listener_count() > 0)
            .cloned()
            .collect()
    }

    /// Records the outcome of a probe or relay attempt against `url`.
    ///
    /// Resolves the apparent contradiction between spec.md §4.7's prose
    /// (immediate demotion on transport failure) and P6/Scenario 5 (a
    /// uniform two-strike policy, transport failures included) in favor of
    /// the testable properties: `failure_count` increments on any failure
    /// and only demotes at 2, regardless of failure kind. See DESIGN.md.
    pub async fn record_probe_result(&self, url: &str, success: bool) {
        let mut records = self.records.write().await;
        if let Some(record) = records.iter_mut().find(|r| r.url == url) {
            if success {
                record.failure_count = 0;
                record.active = true;
            } else {
                record.failure_count += 1;
                if record.failure_count >= 2 {
                    record.active = false;
                }
            }
        }
    }
}

impl Default for BrainRegistry {
    fn default() -> Self {
        Self::new()
    }
}
