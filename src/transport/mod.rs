// HTTP transport (C1)
//
// Shared response envelope, auth middleware, and router-building helpers
// used by both the Brain and the Container. Grounded on the teacher's
// `AgentServer::serve` (axum + TraceLayer + DefaultBodyLimit) and
// `server/middleware.rs` (auth middleware shape).

mod envelope;
mod middleware;

pub use envelope::Envelope;
pub use middleware::{bearer_auth, AuthState};

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::{SslConfig, MAX_BODY_BYTES};

/// Binds and serves `router` at `addr`, applying the shared middleware
/// stack (CORS, body-size cap, request tracing) every caller wants,
/// mirroring `AgentServer::serve`'s layering order. When `ssl` is
/// present, serves over TLS via `axum-server`'s rustls acceptor instead
/// of plain `axum::serve` — the ecosystem equivalent of the Python
/// original's `ssl.wrap_socket` (spec.md §4.1).
pub async fn serve(
    addr: SocketAddr,
    router: Router,
    ssl: Option<&SslConfig>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = router
        .layer(CorsLayer::permissive())
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .into_make_service_with_connect_info::<SocketAddr>();

    match ssl {
        None => {
            tracing::info!("binding HTTP transport on {addr}");
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await?;
        }
        Some(ssl) => {
            tracing::info!("binding HTTPS transport on {addr}");
            let tls_config = RustlsConfig::from_pem_file(&ssl.cert_file, &ssl.key_file).await?;
            let handle = axum_server::Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                shutdown.await;
                shutdown_handle.shutdown();
            });
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app)
                .await?;
        }
    }
    Ok(())
}

/// Optional shared-bearer-token auth layer, applied only when configured
/// (spec.md §1 Non-goals: no auth stronger than an optional bearer token).
pub fn with_optional_auth(router: Router, token: Option<String>) -> Router {
    match token {
        Some(token) => {
            let state = Arc::new(AuthState { token });
            router.layer(axum::middleware::from_fn_with_state(state, bearer_auth))
        }
        None => router,
    }
}
