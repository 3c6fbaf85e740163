// Health prober (C7) — spec.md §4.7, grounded on `karen/brain.py`'s
// `_startDeviceChecks` cadence (1-second tick, probe every 5 seconds)
// combined with the redesign note in spec.md §9 (probe `GET
// {container.url}/status`, not a bare path), and on the teacher's
// background-task idiom (`AgentServer::serve`'s model-monitor loop using
// `tokio::time::sleep` in a spawned task).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::brain::core::BrainCore;
use crate::config::{PROBE_EVERY_TICKS, PROBE_TICK_SECS};

/// Spawns the prober loop, returning its `JoinHandle`. The loop wakes
/// every `PROBE_TICK_SECS` but only probes every `PROBE_EVERY_TICKS` ticks,
/// so `running` is observed with low latency for responsive shutdown.
pub fn spawn(core: Arc<BrainCore>, running: Arc<AtomicBool>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick: u32 = 0;
        while running.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(PROBE_TICK_SECS)).await;
            if !running.load(Ordering::SeqCst) {
                break;
            }
            tick += 1;
            if tick < PROBE_EVERY_TICKS {
                continue;
            }
            tick = 0;
            probe_once(&core).await;
        }
        tracing::debug!("health prober task exiting");
    })
}

async fn probe_once(core: &BrainCore) {
    let active = core.registry.active().await;
    for record in active {
        let result = core.peer_client.get(&record.url, "/status").await;
        let success = matches!(result, Ok(envelope) if !envelope.error);
        if let Err(err) = &result {
            tracing::warn!(url = %record.url, error = %err, "probe transport failure");
        }
        core.registry.record_probe_result(&record.url, success).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::registry::RegisterPayload;
    use crate::network::PeerClient;

    #[tokio::test]
    async fn test_probe_once_demotes_after_two_failures() {
        let core = BrainCore::new(PeerClient::new().unwrap());
        let url = core
            .registry
            .register("127.0.0.1", RegisterPayload { port: 1, use_http: true, url: None, devices: Default::default() })
            .await;

        probe_once(&core).await;
        assert!(core.registry.list_all().await.iter().find(|r| r.url == url).unwrap().active);

        probe_once(&core).await;
        assert!(!core.registry.list_all().await.iter().find(|r| r.url == url).unwrap().active);
    }
}
