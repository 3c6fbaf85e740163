// Speaker device — text-to-speech sink (spec.md §6.5: "a `say(text)`
// method on any speaker device"). Grounded on `karen/speaker.py`'s
// `Speaker` class; the real TTS call (there, shelling out to `festival`)
// is the external collaborator, not reimplemented here.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

use super::Device;

const ACCEPTS: &[&str] = &["start", "stop", "say"];

pub struct Speaker {
    running: AtomicBool,
}

impl Speaker {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
        }
    }

    /// Speaks `text`. A real integration would hand this to a TTS engine;
    /// this stand-in logs it, which is sufficient for tests and local use.
    pub fn say(&self, text: &str) -> anyhow::Result<()> {
        tracing::info!(%text, "saying");
        Ok(())
    }
}

impl Default for Speaker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Device for Speaker {
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
        "speaker"
    }

    fn say(&self, text: &str) -> anyhow::Result<()> {
        Speaker::say(self, text)
    }
}
