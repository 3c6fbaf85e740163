// Listener device — captures recognized speech and pushes it to a
// Container's callback handler (spec.md §6.5: "a sink that, given a
// recognized utterance string, calls callbackHandler('AUDIO_INPUT', text)").
//
// The real capture/VAD/STT loop (`karen/listener.py`'s pyaudio + webrtcvad +
// deepspeech pipeline) is an external collaborator; this is the narrow
// trait surface the Container drives, with an in-memory stand-in loop
// sufficient for tests and local operation.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{AudioOutFlag, Device};

const ACCEPTS: &[&str] = &["start", "stop"];

pub type InputCallback = Arc<dyn Fn(String) + Send + Sync>;

/// A Listener device. Captured utterances are dropped while `audio_out` is
/// true, per spec.md §4.3's `AUDIO_OUT_START`/`AUDIO_OUT_END` contract.
pub struct Listener {
    running: AtomicBool,
    audio_out: AudioOutFlag,
    callback: Option<InputCallback>,
}

impl Listener {
    pub fn new() -> Self {
        Self::with_callback(None)
    }

    pub fn with_callback(callback: Option<InputCallback>) -> Self {
        Self {
            running: AtomicBool::new(false),
            audio_out: AudioOutFlag::new(),
            callback,
        }
    }

    pub fn audio_out_flag(&self) -> AudioOutFlag {
        self.audio_out.clone()
    }

    /// Test/stand-in hook: simulate a recognized utterance arriving from
    /// the capture pipeline. Dropped silently while `audio_out` is set.
    pub fn simulate_utterance(&self, text: impl Into<String>) {
        if self.audio_out.get() {
            return;
        }
        if let Some(cb) = &self.callback {
            cb(text.into());
        }
    }
}

impl Default for Listener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Device for Listener {
    async fn start(&self) -> anyhow::Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!("listener started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!("listener stopped");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn accepts(&self) -> &'static [&'static str] {
        ACCEPTS
    }

    fn device_type(&self) -> &'static str {
        "listener"
    }

    fn set_audio_out(&self, value: bool) {
        self.audio_out.set(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[tokio::test]
    async fn test_start_stop_idempotent() {
        let listener = Listener::new();
        listener.start().await.unwrap();
        listener.start().await.unwrap();
        assert!(listener.is_running());

        listener.stop().await.unwrap();
        listener.stop().await.unwrap();
        assert!(!listener.is_running());
    }

    #[test]
    fn test_audio_out_suppresses_utterances() {
        let received = Arc::new(StdMutex::new(Vec::new()));
        let captured = Arc::clone(&received);
        let listener = Listener::with_callback(Some(Arc::new(move |text| {
            captured.lock().unwrap().push(text);
        })));

        listener.audio_out_flag().set(true);
        listener.simulate_utterance("hello");
        assert!(received.lock().unwrap().is_empty());

        listener.audio_out_flag().set(false);
        listener.simulate_utterance("hello again");
        assert_eq!(received.lock().unwrap().as_slice(), ["hello again"]);
    }
}
