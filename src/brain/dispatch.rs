// Brain dispatcher (C5) — spec.md §4.5, ported from `karen/brain.py`'s
// `handleBrainRelayCommand`/`handleBrainRelayListenerCommand` into async
// fan-out over `futures::future::join_all` rather than a sequential
// blocking loop, preserving the "no ordering guarantees, independent
// failures" semantics of spec.md §5.

use axum::extract::{ConnectInfo, Json, State};
use futures::future::join_all;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::brain::registry::RegisterPayload;
use crate::brain::Brain;
use crate::transport::Envelope;

fn upper_field(payload: &serde_json::Value, field: &str) -> Option<String> {
    payload.get(field)?.as_str().map(|s| s.to_uppercase())
}

/// POST `/register` (Brain only, spec.md §4.4).
pub async fn handle_register(
    State(brain): State<Arc<Brain>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<serde_json::Value>,
) -> Envelope {
    let payload: RegisterPayload = match serde_json::from_value(payload) {
        Ok(p) => p,
        Err(err) => return Envelope::err(format!("Invalid registration payload: {err}")),
    };

    brain.core.registry.register(&addr.ip().to_string(), payload).await;
    Envelope::ok("Registered successfully")
}

/// POST `/control` against the Brain's own handlers and relay table.
pub async fn handle_control(
    State(brain): State<Arc<Brain>>,
    Json(payload): Json<serde_json::Value>,
) -> Envelope {
    let Some(command) = upper_field(&payload, "command") else {
        return Envelope::err("Invalid command.");
    };
    brain.core.audit("control", &command, None).await;

    match command.as_str() {
        "KILL" => {
            let brain = Arc::clone(&brain);
            tokio::spawn(async move { brain.stop(false).await });
            Envelope::ok("Server is shutting down")
        }
        "KILL_ALL" => {
            relay_to(&brain, brain.core.registry.active().await, "KILL", None).await;
            let brain = Arc::clone(&brain);
            tokio::spawn(async move { brain.stop(true).await });
            Envelope::ok("Server is shutting down")
        }
        "START_LISTENER" | "STOP_LISTENER" => {
            let targets = brain.core.registry.active_with_listener().await;
            relay_to(&brain, targets, &command, None).await;
            Envelope::ok("Relayed to listener-capable containers")
        }
        other => {
            let targets = brain.core.registry.active().await;
            relay_to(&brain, targets, other, payload.get("data").cloned()).await;
            Envelope::ok("Relayed")
        }
    }
}

async fn relay_to(
    brain: &Brain,
    targets: Vec<crate::brain::registry::ContainerRecord>,
    command: &str,
    data: Option<serde_json::Value>,
) {
    let mut body = serde_json::json!({ "command": command });
    if let Some(data) = data {
        body["data"] = data;
    }

    let futures = targets.into_iter().map(|record| {
        let client = brain.core.peer_client.clone();
        let body = body.clone();
        let registry = brain.core.registry.clone();
        async move {
            let result = client.post(&record.url, "/control", body).await;
            registry.record_probe_result(&record.url, result.is_ok()).await;
            if let Err(err) = result {
                tracing::warn!(url = %record.url, error = %err, "relay failed");
            }
        }
    });
    join_all(futures).await;
}

/// POST `/data` (Brain only, spec.md §4.5.2).
pub async fn handle_data(
    State(brain): State<Arc<Brain>>,
    Json(payload): Json<serde_json::Value>,
) -> Envelope {
    let Some(data_type) = upper_field(&payload, "type") else {
        return Envelope::err("Invalid data type.");
    };
    brain.core.audit("data", &data_type, None).await;
    let data = payload.get("data").cloned().unwrap_or(serde_json::Value::Null);

    match data_type.as_str() {
        "AUDIO_INPUT" => {
            brain.core.data_buffer.push("AUDIO_INPUT", data.clone()).await;

            let text = data.as_str().unwrap_or_default().to_string();
            // Ack before further processing so the producing Container is
            // not blocked, per spec.md §4.5.2.
            let brain = Arc::clone(&brain);
            tokio::spawn(async move {
                if brain.core.ask_slot.try_consume(&text).await {
                    return;
                }
                brain.skills.parse_input(&text).await;
            });
            Envelope::ok("Data collected successfully.")
        }
        "SAY" => {
            let text = data.as_str().unwrap_or_default();
            brain.core.say(text).await
        }
        other => Envelope::err(format!("Unknown data type: {other}")),
    }
}

/// GET/POST `/status`.
pub async fn handle_status() -> Envelope {
    Envelope::ok("Brain is online.")
}

/// POST `/status/devices` with `{command:"get-all-current"}`.
pub async fn handle_status_devices(State(brain): State<Arc<Brain>>) -> Envelope {
    let records = brain.core.registry.list_all().await;
    Envelope::ok_with_data(
        "OK",
        serde_json::to_value(records).unwrap_or(serde_json::Value::Array(vec![])),
    )
}
