// Device abstraction (C2) — spec.md §4.2.
//
// Every device is addressed through this trait only; the Container never
// downcasts to a concrete type (DESIGN NOTES §9, "Device polymorphism").

mod listener;
mod speaker;
mod watcher;

pub use listener::Listener;
pub use speaker::Speaker;
pub use watcher::Watcher;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Capability set a device supports, beyond the mandatory start/stop/isRunning.
pub type Capabilities = &'static [&'static str];

#[async_trait]
pub trait Device: Send + Sync {
    /// Launches whatever background task the device needs. A no-op,
    /// returning success, when the device is already running.
    async fn start(&self) -> anyhow::Result<()>;

    /// Releases all resources. MUST be safe to call on an already-stopped
    /// device.
    async fn stop(&self) -> anyhow::Result<()>;

    /// Reflects the latest observed state.
    fn is_running(&self) -> bool;

    /// Action names this device responds to beyond start/stop/isRunning.
    fn accepts(&self) -> Capabilities;

    /// Device-type tag, e.g. "listener", "speaker", "watcher".
    fn device_type(&self) -> &'static str;

    /// Sets the `isAudioOut` flag (spec.md §4.3's `AUDIO_OUT_START`/`END`
    /// handlers). A no-op for devices that don't declare it in `accepts`;
    /// overridden by `Listener`. Kept on the trait, rather than the
    /// Container downcasting to `Listener`, per DESIGN NOTES §9.
    fn set_audio_out(&self, _value: bool) {}

    /// Text-to-speech call (spec.md §4.3's `SAY` handler). A no-op error
    /// for devices that don't declare `say` in `accepts`; overridden by
    /// `Speaker`.
    fn say(&self, _text: &str) -> anyhow::Result<()> {
        anyhow::bail!("device does not support say")
    }
}

/// Summary of one device type for a `/register` payload (spec.md §3, §6.2):
/// every type is enumerated, even with zero instances.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeviceTypeSummary {
    pub count: usize,
    pub names: Vec<String>,
}

/// A device descriptor as owned by a Container (spec.md §3).
pub struct DeviceDescriptor {
    pub id: String,
    pub device_type: String,
    pub device: Arc<dyn Device>,
    pub friendly_name: Option<String>,
    pub is_panel: bool,
}

impl DeviceDescriptor {
    pub fn new(
        id: impl Into<String>,
        device: Arc<dyn Device>,
        friendly_name: Option<String>,
        is_panel: bool,
    ) -> Self {
        Self {
            id: id.into(),
            device_type: device.device_type().to_string(),
            device,
            friendly_name,
            is_panel,
        }
    }

    pub fn accepts(&self, action: &str) -> bool {
        self.device.accepts().iter().any(|a| *a == action)
    }
}

/// Shared `isAudioOut` flag, read by a capture task and written by the
/// Container on AUDIO_OUT_START/END (spec.md §4.3, §5). Atomic is
/// sufficient per the concurrency model.
#[derive(Clone, Default)]
pub struct AudioOutFlag(Arc<AtomicBool>);

impl AudioOutFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn set(&self, value: bool) {
        self.0.store(value, Ordering::SeqCst);
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_out_flag_default_false() {
        let flag = AudioOutFlag::new();
        assert!(!flag.get());
        flag.set(true);
        assert!(flag.get());
    }

    #[test]
    fn test_device_descriptor_accepts() {
        let listener = Arc::new(Listener::new());
        let descriptor = DeviceDescriptor::new("mic-1", listener, Some("mic".into()), false);
        assert!(descriptor.accepts("start"));
        assert!(descriptor.accepts("stop"));
    }
}
