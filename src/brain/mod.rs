// Brain — ties together the registry (C4), dispatcher (C5), Skill
// manager (C6), health prober (C7) and shutdown coordinator (C8) behind
// one HTTP transport (C1). See `core.rs` for why the registry/buffer/ask
// state is split into `BrainCore` apart from the Skill manager.

pub mod core;
pub mod dispatch;
pub mod prober;
pub mod registry;
pub mod state;
mod webgui;

pub use core::BrainCore;
pub use registry::{BrainRegistry, ContainerRecord, RegisterPayload};

use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

use crate::config::SslConfig;
use crate::network::PeerClient;
use crate::skills::{IntentParser, SkillManager};
use crate::transport;

pub struct Brain {
    pub core: Arc<BrainCore>,
    pub skills: Arc<SkillManager>,
    pub bind_addr: SocketAddr,
    pub commands: Vec<String>,
    pub data_types: Vec<String>,
    pub webgui_root: Option<PathBuf>,
    bearer_token: Option<String>,
    ssl: Option<SslConfig>,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    prober_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl Brain {
    pub fn new(
        bind_addr: SocketAddr,
        peer_client: PeerClient,
        intent_parser: Box<dyn IntentParser>,
        bearer_token: Option<String>,
    ) -> Arc<Self> {
        Self::with_tls(bind_addr, peer_client, intent_parser, bearer_token, None)
    }

    pub fn with_tls(
        bind_addr: SocketAddr,
        peer_client: PeerClient,
        intent_parser: Box<dyn IntentParser>,
        bearer_token: Option<String>,
        ssl: Option<SslConfig>,
    ) -> Arc<Self> {
        Self::with_config(bind_addr, peer_client, intent_parser, bearer_token, ssl, Vec::new(), Vec::new(), None, None)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_config(
        bind_addr: SocketAddr,
        peer_client: PeerClient,
        intent_parser: Box<dyn IntentParser>,
        bearer_token: Option<String>,
        ssl: Option<SslConfig>,
        commands: Vec<String>,
        data_types: Vec<String>,
        webgui_root: Option<PathBuf>,
        audit_log: Option<PathBuf>,
    ) -> Arc<Self> {
        let core = BrainCore::with_audit_log(peer_client, audit_log);
        let skills = Arc::new(SkillManager::new(core.clone() as Arc<dyn crate::skills::BrainCallbacks>, intent_parser));

        Arc::new(Self {
            core,
            skills,
            bind_addr,
            commands,
            data_types,
            webgui_root,
            bearer_token,
            ssl,
            running: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
            prober_handle: Mutex::new(None),
        })
    }

    pub fn router(self: &Arc<Self>) -> Router {
        let mut router = Router::new()
            .route("/register", post(dispatch::handle_register))
            .route("/control", post(dispatch::handle_control))
            .route("/data", post(dispatch::handle_data))
            .route("/status", get(dispatch::handle_status).post(dispatch::handle_status))
            .route("/status/devices", post(dispatch::handle_status_devices))
            .route("/webgui", get(webgui::handle_index))
            .with_state(Arc::clone(self));

        // Static assets (CSS/JS/favicon) under the configured web root, if
        // any. `ServeDir` strips `..`/`.` path segments itself (spec.md
        // §6.1's "must not allow path traversal").
        if let Some(root) = &self.webgui_root {
            router = router.nest_service("/webgui/assets", tower_http::services::ServeDir::new(root));
            router = router.route_service(
                "/favicon.ico",
                tower_http::services::ServeFile::new(root.join("favicon.ico")),
            );
        }

        transport::with_optional_auth(router, self.bearer_token.clone())
    }

    /// Binds the listening socket, starts the health prober, and serves
    /// until `stop()` is called. Idempotent per spec.md §4.8/P5: a second
    /// `start()` while already running is a no-op.
    pub async fn start(self: &Arc<Self>) -> anyhow::Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let handle = prober::spawn(Arc::clone(&self.core), Arc::clone(&self.running));
        *self.prober_handle.lock().await = Some(handle);

        let shutdown = Arc::clone(&self.shutdown);
        let router = self.router();
        transport::serve(self.bind_addr, router, self.ssl.as_ref(), async move {
            shutdown.notified().await;
        })
        .await
    }

    /// Idempotent shutdown (spec.md §4.8, P5). `stop_all_devices` is set by
    /// `KILL_ALL`, which has already fanned `KILL` out to every active
    /// Container itself (dispatch.rs's `relay_to` call) before spawning
    /// this; `stop` only tears down the Brain's own state and must not
    /// relay a second time.
    pub async fn stop(self: &Arc<Self>, _stop_all_devices: bool) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        self.shutdown.notify_waiters();
        if let Some(handle) = self.prober_handle.lock().await.take() {
            let _ = handle.await;
        }
        self.skills.stop().await;
        tracing::info!("Stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
