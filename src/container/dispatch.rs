// Container command dispatch — spec.md §4.3's "Default Container handlers"
// table.

use axum::extract::{Json, State};
use std::sync::Arc;

use crate::container::Container;
use crate::errors::CoreError;
use crate::transport::Envelope;

fn upper_field(payload: &serde_json::Value, field: &str) -> Option<String> {
    payload.get(field)?.as_str().map(|s| s.to_uppercase())
}

pub async fn handle_control(
    State(container): State<Arc<Container>>,
    Json(payload): Json<serde_json::Value>,
) -> Envelope {
    let Some(command) = upper_field(&payload, "command") else {
        return Envelope::err("Invalid command.");
    };
    container.audit("control", &command, None).await;

    match command.as_str() {
        "KILL" => {
            // Acked before stop proceeds so the caller observes success
            // (spec.md §5: "A KILL is acknowledged before stop() proceeds").
            let container = Arc::clone(&container);
            tokio::spawn(async move { container.stop().await });
            Envelope::ok("Server is shutting down")
        }
        "START_LISTENER" => {
            for device in listener_devices(&container) {
                if let Err(err) = device.start().await {
                    tracing::warn!(error = %err, "listener start failed");
                }
            }
            Envelope::ok("Started listeners")
        }
        "STOP_LISTENER" => {
            for device in listener_devices(&container) {
                if let Err(err) = device.stop().await {
                    tracing::warn!(error = %err, "listener stop failed");
                }
            }
            Envelope::ok("Stopped listeners")
        }
        "AUDIO_OUT_START" => {
            set_audio_out_on_listeners(&container, true);
            Envelope::ok("Audio out started")
        }
        "AUDIO_OUT_END" => {
            set_audio_out_on_listeners(&container, false);
            Envelope::ok("Audio out ended")
        }
        "SAY" => {
            let text = payload.get("data").and_then(|v| v.as_str()).unwrap_or_default();
            match say_locally(&container, text) {
                Some(Ok(())) => Envelope::ok("Said"),
                Some(Err(err)) => Envelope::err(format!("say failed: {err}")),
                None => Envelope::from(CoreError::Capability("container".into(), "SAY".into())),
            }
        }
        _ => Envelope::err("Invalid command."),
    }
}

fn listener_devices(container: &Container) -> Vec<Arc<dyn crate::device::Device>> {
    container
        .devices
        .iter()
        .filter(|entry| entry.value().device_type == "listener")
        .map(|entry| Arc::clone(&entry.value().device))
        .collect()
}

fn set_audio_out_on_listeners(container: &Container, value: bool) {
    for entry in container.devices.iter() {
        if entry.value().device_type == "listener" {
            entry.value().device.set_audio_out(value);
        }
    }
}

fn say_locally(container: &Container, text: &str) -> Option<anyhow::Result<()>> {
    container
        .devices
        .iter()
        .find(|entry| entry.value().device_type == "speaker")
        .map(|entry| entry.value().device.say(text))
}

pub async fn handle_status() -> Envelope {
    Envelope::ok("Container is online.")
}

pub async fn handle_status_devices(State(container): State<Arc<Container>>) -> Envelope {
    let devices: Vec<serde_json::Value> = container
        .devices
        .iter()
        .map(|entry| {
            let d = entry.value();
            serde_json::json!({
                "id": d.id,
                "type": d.device_type,
                "friendlyName": d.friendly_name,
                "isRunning": d.device.is_running(),
            })
        })
        .collect();
    Envelope::ok_with_data("OK", serde_json::Value::Array(devices))
}
