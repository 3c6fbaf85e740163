// Deterministic cadence test for the health prober (C7), using
// `tokio::time`'s paused clock instead of sleeping in real time.

use karen_core::brain::core::BrainCore;
use karen_core::brain::prober;
use karen_core::brain::registry::RegisterPayload;
use karen_core::network::PeerClient;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn demotes_after_five_one_second_ticks_times_two() {
    let core = BrainCore::new(PeerClient::new().unwrap());
    // Port 1 is a reserved, never-listening port: connection attempts fail
    // immediately without needing to wait out the outbound timeout.
    let url = core
        .registry
        .register(
            "127.0.0.1",
            RegisterPayload { port: 1, use_http: true, url: None, devices: Default::default() },
        )
        .await;

    let running = Arc::new(AtomicBool::new(true));
    let handle = prober::spawn(core.clone(), running.clone());

    // First probe fires after 5 ticks (5s); one failing probe only warns.
    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    assert!(
        core.registry.list_all().await.iter().find(|r| r.url == url).unwrap().active,
        "a single failing probe must not demote"
    );

    // Second probe fires after another 5 ticks; two consecutive failures demote.
    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    assert!(
        !core.registry.list_all().await.iter().find(|r| r.url == url).unwrap().active,
        "two consecutive failing probes must demote"
    );

    running.store(false, Ordering::SeqCst);
    tokio::time::advance(Duration::from_secs(1)).await;
    let _ = handle.await;
}

/// Lets the spawned prober task run its IO-bound probe call to completion.
/// `tokio::time::advance` only fires due timers; the connection-refused
/// path after that is IO-driven, not time-driven, so it needs its own
/// scheduling turns on the current-thread runtime.
async fn settle() {
    for _ in 0..100 {
        tokio::task::yield_now().await;
    }
}
