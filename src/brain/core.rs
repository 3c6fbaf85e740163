// BrainCore — registry, data buffer, ask continuation, and the outbound
// HTTP client, minus the Skill manager.
//
// Split out from `Brain` to avoid an ownership cycle: the Skill manager
// needs to call back into the Brain (`say`, `ask`), and the Brain needs to
// own the Skill manager. `BrainCore` implements the narrow
// `skills::BrainCallbacks` contract and is handed to the Skill manager as
// `Arc<dyn BrainCallbacks>`, while `Brain` (brain::mod) owns both
// `Arc<BrainCore>` and `Arc<SkillManager>` directly. See DESIGN.md.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::brain::registry::BrainRegistry;
use crate::brain::state::{AskSlot, DataBuffer};
use crate::logging::{AuditEntry, AuditLog};
use crate::network::PeerClient;
use crate::skills::{AskCallback, BrainCallbacks};
use crate::transport::Envelope;

pub struct BrainCore {
    pub registry: BrainRegistry,
    pub data_buffer: DataBuffer,
    pub ask_slot: AskSlot,
    pub peer_client: PeerClient,
    audit: Option<Mutex<AuditLog>>,
}

impl BrainCore {
    pub fn new(peer_client: PeerClient) -> Arc<Self> {
        Self::with_audit_log(peer_client, None)
    }

    pub fn with_audit_log(peer_client: PeerClient, audit_log_path: Option<PathBuf>) -> Arc<Self> {
        let audit = audit_log_path.and_then(|path| match AuditLog::new(path) {
            Ok(log) => Some(Mutex::new(log)),
            Err(err) => {
                tracing::warn!(error = %err, "failed to open audit log, auditing disabled");
                None
            }
        });
        Arc::new(Self {
            registry: BrainRegistry::new(),
            data_buffer: DataBuffer::new(),
            ask_slot: AskSlot::new(),
            peer_client,
            audit,
        })
    }

    /// Records a control/data event (spec.md §4.1). Best-effort: a failed
    /// write is logged but never surfaces to the caller.
    pub async fn audit(&self, kind: &str, name: &str, source: Option<String>) {
        if let Some(log) = &self.audit {
            if let Err(err) = log.lock().await.record(AuditEntry::new(kind, name, source)) {
                tracing::warn!(error = %err, "audit record failed");
            }
        }
    }

    /// The `say(text)` pipeline, spec.md §4.5.1.
    pub async fn say(&self, text: &str) -> Envelope {
        let active = self.registry.active().await;

        let Some(speaker_record) = active.iter().find(|r| r.has_speaker()) else {
            return Envelope::err("No speaker container available.");
        };

        let listener_records: Vec<_> = active.iter().filter(|r| r.listener_count() > 0).collect();

        for record in &listener_records {
            if let Err(err) = self
                .peer_client
                .post(&record.url, "/control", serde_json::json!({"command": "AUDIO_OUT_START"}))
                .await
            {
                tracing::warn!(url = %record.url, error = %err, "AUDIO_OUT_START failed");
            }
        }

        let say_result = self
            .peer_client
            .post(
                &speaker_record.url,
                "/control",
                serde_json::json!({"command": "SAY", "data": text}),
            )
            .await;

        for record in &listener_records {
            if let Err(err) = self
                .peer_client
                .post(&record.url, "/control", serde_json::json!({"command": "AUDIO_OUT_END"}))
                .await
            {
                tracing::warn!(url = %record.url, error = %err, "AUDIO_OUT_END failed");
            }
        }

        match say_result {
            Ok(envelope) => envelope,
            Err(err) => Envelope::err(format!("Failed to reach speaker container: {err}")),
        }
    }
}

#[async_trait]
impl BrainCallbacks for BrainCore {
    async fn say(&self, text: &str) -> anyhow::Result<()> {
        let envelope = BrainCore::say(self, text).await;
        if envelope.error {
            anyhow::bail!(envelope.message);
        }
        Ok(())
    }

    async fn ask(&self, text: &str, callback: AskCallback, timeout_secs: u64) -> anyhow::Result<()> {
        BrainCallbacks::say(self, text).await?;
        self.ask_slot.install(callback, timeout_secs).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::registry::RegisterPayload;
    use crate::device::DeviceTypeSummary;
    use std::collections::HashMap;

    fn speaker_devices() -> HashMap<String, DeviceTypeSummary> {
        let mut devices = HashMap::new();
        devices.insert("speaker".to_string(), DeviceTypeSummary { count: 1, names: vec!["spk".into()] });
        devices
    }

    #[tokio::test]
    async fn test_say_without_speaker_fails_fast() {
        let core = BrainCore::new(PeerClient::new().unwrap());
        let envelope = core.say("hello").await;
        assert!(envelope.error);
    }

    #[tokio::test]
    async fn test_audit_is_noop_without_log_configured() {
        let core = BrainCore::new(PeerClient::new().unwrap());
        // No audit log path configured; must not panic or block.
        core.audit("control", "KILL", None).await;
    }

    #[tokio::test]
    async fn test_audit_writes_entry_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let core = BrainCore::with_audit_log(PeerClient::new().unwrap(), Some(path.clone()));
        core.audit("control", "KILL", Some("127.0.0.1".into())).await;
        core.audit("data", "AUDIO_INPUT", None).await;
        drop(core);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_say_picks_speaker_container() {
        let core = BrainCore::new(PeerClient::new().unwrap());
        core.registry
            .register("127.0.0.1", RegisterPayload { port: 1, use_http: true, url: None, devices: speaker_devices() })
            .await;
        // No real server is listening, so the outbound POST fails — this
        // still exercises the "speaker found" branch rather than the
        // early "no speaker" return.
        let envelope = core.say("hello").await;
        assert!(envelope.error);
        assert!(envelope.message.contains("Failed to reach"));
    }
}
