// Container (C3) — spec.md §4.3, grounded on `karen/device.py`'s
// `DeviceContainer` and, for the device table, the teacher's `DashMap`
// usage (`server/middleware.rs`'s `RateLimiter`, `Cargo.toml`'s `dashmap`
// dependency).

mod dispatch;

pub use dispatch::{handle_control, handle_status, handle_status_devices};

use axum::routing::{get, post};
use axum::Router;
use dashmap::DashMap;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

use crate::config::SslConfig;
use crate::device::{Device, DeviceDescriptor, DeviceTypeSummary};
use crate::logging::{AuditEntry, AuditLog};
use crate::network::PeerClient;
use crate::transport::{self, Envelope};

pub struct Container {
    pub devices: DashMap<String, DeviceDescriptor>,
    pub bind_addr: SocketAddr,
    pub brain_url: String,
    pub peer_client: PeerClient,
    bearer_token: Option<String>,
    ssl: Option<SslConfig>,
    audit: Option<Mutex<AuditLog>>,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
}

impl Container {
    pub fn new(
        bind_addr: SocketAddr,
        brain_url: String,
        peer_client: PeerClient,
        bearer_token: Option<String>,
    ) -> Arc<Self> {
        Self::with_tls(bind_addr, brain_url, peer_client, bearer_token, None, None)
    }

    pub fn with_tls(
        bind_addr: SocketAddr,
        brain_url: String,
        peer_client: PeerClient,
        bearer_token: Option<String>,
        ssl: Option<SslConfig>,
        audit_log_path: Option<PathBuf>,
    ) -> Arc<Self> {
        let audit = audit_log_path.and_then(|path| match AuditLog::new(path) {
            Ok(log) => Some(Mutex::new(log)),
            Err(err) => {
                tracing::warn!(error = %err, "failed to open audit log, auditing disabled");
                None
            }
        });
        Arc::new(Self {
            devices: DashMap::new(),
            bind_addr,
            brain_url,
            peer_client,
            bearer_token,
            ssl,
            audit,
            running: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
        })
    }

    /// Records a control event (spec.md §4.1). Best-effort: a failed write
    /// is logged but never surfaces to the caller.
    pub async fn audit(&self, kind: &str, name: &str, source: Option<String>) {
        if let Some(log) = &self.audit {
            if let Err(err) = log.lock().await.record(AuditEntry::new(kind, name, source)) {
                tracing::warn!(error = %err, "audit record failed");
            }
        }
    }

    /// spec.md §4.3's `addDevice`. Starts the device if `auto_start` and
    /// it declares `start` in `accepts` and isn't already running; if the
    /// Container itself is running, immediately re-registers with the
    /// Brain so the new device is reflected there.
    pub async fn add_device(
        self: &Arc<Self>,
        device: Arc<dyn Device>,
        id: impl Into<String>,
        auto_start: bool,
        is_panel: bool,
        friendly_name: Option<String>,
    ) -> anyhow::Result<()> {
        let id = id.into();
        let descriptor = DeviceDescriptor::new(id.clone(), Arc::clone(&device), friendly_name, is_panel);
        let should_start = auto_start && descriptor.accepts("start") && !device.is_running();
        self.devices.insert(id, descriptor);

        if should_start {
            device.start().await?;
        }

        if self.running.load(Ordering::SeqCst) {
            self.register_with_brain().await?;
        }
        Ok(())
    }

    fn device_summary(&self) -> HashMap<String, DeviceTypeSummary> {
        let mut summary: HashMap<String, DeviceTypeSummary> = HashMap::new();
        for entry in self.devices.iter() {
            let descriptor = entry.value();
            let type_summary = summary.entry(descriptor.device_type.clone()).or_default();
            type_summary.count += 1;
            if let Some(name) = &descriptor.friendly_name {
                type_summary.names.push(name.clone());
            }
        }
        summary
    }

    /// The URL this Container is reachable at, as reported to the Brain.
    /// spec.md §9: deriving this from the inbound TCP peer address is a
    /// known bug in the original and must not be carried forward — the
    /// Container is the only party that actually knows its own externally
    /// reachable address (NAT, multiple interfaces, a reverse proxy all
    /// make the peer address unreliable), so it self-reports this URL
    /// rather than leaving the Brain to infer it.
    fn external_url(&self) -> String {
        let proto = if self.ssl.is_some() { "https" } else { "http" };
        format!("{proto}://{}:{}", self.bind_addr.ip(), self.bind_addr.port())
    }

    /// spec.md §4.3's `registerWithBrain`.
    pub async fn register_with_brain(&self) -> anyhow::Result<Envelope> {
        let body = serde_json::json!({
            "port": self.bind_addr.port(),
            "useHttp": self.ssl.is_none(),
            "url": self.external_url(),
            "devices": self.device_summary(),
        });
        self.peer_client.post(&self.brain_url, "/register", body).await
    }

    /// Pushes a recognized event up to the Brain (spec.md §4.3's
    /// `callbackHandler`).
    pub async fn callback_handler(&self, data_type: &str, data: serde_json::Value) -> anyhow::Result<Envelope> {
        self.peer_client
            .post(&self.brain_url, "/data", serde_json::json!({"type": data_type, "data": data}))
            .await
    }

    pub fn router(self: &Arc<Self>) -> Router {
        let router = Router::new()
            .route("/control", post(dispatch::handle_control))
            .route("/status", get(dispatch::handle_status).post(dispatch::handle_status))
            .route("/status/devices", post(dispatch::handle_status_devices))
            .with_state(Arc::clone(self));

        transport::with_optional_auth(router, self.bearer_token.clone())
    }

    /// Opens the listening socket, auto-registers with the Brain, and
    /// serves until `stop()` is called.
    pub async fn start(self: &Arc<Self>) -> anyhow::Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        for entry in self.devices.iter() {
            let descriptor = entry.value();
            if descriptor.accepts("start") && !descriptor.device.is_running() {
                descriptor.device.start().await?;
            }
        }

        if let Err(err) = self.register_with_brain().await {
            tracing::warn!(error = %err, "failed to register with brain");
        }

        let shutdown = Arc::clone(&self.shutdown);
        let router = self.router();
        transport::serve(self.bind_addr, router, self.ssl.as_ref(), async move {
            shutdown.notified().await;
        })
        .await
    }

    /// Idempotent shutdown (spec.md §4.8, P5): broadcasts `stop` to every
    /// device, then closes the socket.
    pub async fn stop(self: &Arc<Self>) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        let futures = self.devices.iter().map(|entry| {
            let device = Arc::clone(&entry.value().device);
            async move {
                if let Err(err) = device.stop().await {
                    tracing::warn!(error = %err, "device stop failed");
                }
            }
        });
        futures::future::join_all(futures).await;

        self.shutdown.notify_waiters();
        tracing::info!("Stopped");
    }

    /// Supplemented from `karen/device.py`'s `wait(seconds)`: a bounded
    /// grace period before `stop()`, additive to it.
    pub async fn wait_then_stop(self: &Arc<Self>, seconds: u64) {
        tokio::time::sleep(std::time::Duration::from_secs(seconds)).await;
        self.stop().await;
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Listener;

    fn test_container() -> Arc<Container> {
        Container::new(
            "127.0.0.1:0".parse().unwrap(),
            "http://127.0.0.1:8080".to_string(),
            PeerClient::new().unwrap(),
            None,
        )
    }

    #[tokio::test]
    async fn test_audit_writes_entry_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let container = Container::with_tls(
            "127.0.0.1:0".parse().unwrap(),
            "http://127.0.0.1:8080".to_string(),
            PeerClient::new().unwrap(),
            None,
            None,
            Some(path.clone()),
        );
        container.audit("control", "KILL", None).await;
        drop(container);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_add_device_autostarts() {
        let container = test_container();
        let listener = Arc::new(Listener::new());
        container
            .add_device(listener.clone(), "mic-1", true, false, Some("mic".into()))
            .await
            .unwrap();
        assert!(listener.is_running());
    }

    #[tokio::test]
    async fn test_device_summary_counts_by_type() {
        let container = test_container();
        container
            .add_device(Arc::new(Listener::new()), "mic-1", false, false, Some("mic".into()))
            .await
            .unwrap();
        container
            .add_device(Arc::new(Listener::new()), "mic-2", false, false, Some("mic2".into()))
            .await
            .unwrap();

        let summary = container.device_summary();
        assert_eq!(summary["listener"].count, 2);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let container = test_container();
        container.running.store(true, Ordering::SeqCst);
        container.stop().await;
        container.stop().await;
        assert!(!container.is_running());
    }
}
