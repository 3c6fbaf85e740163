// Watcher device — a generic user-tagged device with only the mandatory
// start/stop/isRunning capability set. Face detection/recognition itself
// is out of scope for the control plane (spec.md §6.5); this stands in
// for any device type that exists only to be relayed to, not driven
// locally.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

use super::Device;

const ACCEPTS: &[&str] = &["start", "stop"];

pub struct Watcher {
    running: AtomicBool,
}

impl Watcher {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
        }
    }
}

impl Default for Watcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Device for Watcher {
    async fn start(&self) -> anyhow::Result<()> {
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn accepts(&self) -> &'static [&'static str] {
        ACCEPTS
    }

    fn device_type(&self) -> &'static str {
        "watcher"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_stop_idempotent() {
        let watcher = Watcher::new();
        watcher.start().await.unwrap();
        watcher.start().await.unwrap();
        assert!(watcher.is_running());
        watcher.stop().await.unwrap();
        watcher.stop().await.unwrap();
        assert!(!watcher.is_running());
    }
}
