// Skill manager (C6) — spec.md §4.6, grounded on
// `karen/skillmanager.py`'s `SkillManager`/`Skill` classes.

mod fallback;
mod intent;

pub use fallback::fallback_reply;
pub use intent::{Intent, IntentParser, KeywordIntentParser};

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::INTENT_CONFIDENCE_FLOOR;
use crate::transport::Envelope;

/// One-shot callback consuming the next recognized utterance (spec.md §3's
/// "Pending continuation").
pub type AskCallback = Box<dyn FnOnce(String) + Send>;

/// The narrow surface a skill (or the skill manager's fallback) uses to
/// call back into the Brain, per spec.md §4.6/§6.5. Implemented by
/// `brain::core::BrainCore`.
#[async_trait]
pub trait BrainCallbacks: Send + Sync {
    async fn say(&self, text: &str) -> anyhow::Result<()>;
    async fn ask(&self, text: &str, callback: AskCallback, timeout_secs: u64) -> anyhow::Result<()>;
}

/// A callback bound to an intent name. Mirrors spec.md §3's "Intent
/// binding": `intentName`, `callback`, and (implicitly, via closure
/// capture) the owning skill.
pub struct IntentBinding {
    pub intent_name: String,
    pub callback: Box<dyn Fn(&Intent) -> anyhow::Result<Envelope> + Send + Sync>,
}

/// Handed to a skill's `initialize` so it can register intents and call
/// back into the Brain, without the skill needing a `Brain` reference
/// directly (spec.md §6.5's narrow-contract principle).
#[derive(Clone)]
pub struct SkillContext {
    brain: Arc<dyn BrainCallbacks>,
    bindings: Arc<RwLock<Vec<IntentBinding>>>,
}

impl SkillContext {
    pub async fn register_intent_file(
        &self,
        intent_name: impl Into<String>,
        callback: Box<dyn Fn(&Intent) -> anyhow::Result<Envelope> + Send + Sync>,
    ) {
        self.bindings.write().await.push(IntentBinding {
            intent_name: intent_name.into(),
            callback,
        });
    }

    pub async fn say(&self, text: &str) -> anyhow::Result<()> {
        self.brain.say(text).await
    }

    pub async fn ask(&self, text: &str, callback: AskCallback, timeout_secs: u64) -> anyhow::Result<()> {
        self.brain.ask(text, callback, timeout_secs).await
    }
}

/// A loaded skill plugin.
#[async_trait]
pub trait Skill: Send + Sync {
    fn name(&self) -> &str;

    /// Registers intent files/callbacks via `ctx.register_intent_file`.
    async fn initialize(&self, ctx: &SkillContext) -> anyhow::Result<()>;

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct SkillManager {
    brain: Arc<dyn BrainCallbacks>,
    intent_parser: RwLock<Box<dyn IntentParser>>,
    bindings: Arc<RwLock<Vec<IntentBinding>>>,
    skills: RwLock<Vec<Arc<dyn Skill>>>,
}

impl SkillManager {
    pub fn new(brain: Arc<dyn BrainCallbacks>, intent_parser: Box<dyn IntentParser>) -> Self {
        Self {
            brain,
            intent_parser: RwLock::new(intent_parser),
            bindings: Arc::new(RwLock::new(Vec::new())),
            skills: RwLock::new(Vec::new()),
        }
    }

    /// Instantiates and initializes a skill (spec.md §4.6 lifecycle).
    pub async fn load_skill(&self, skill: Arc<dyn Skill>) -> anyhow::Result<()> {
        let ctx = SkillContext {
            brain: Arc::clone(&self.brain),
            bindings: Arc::clone(&self.bindings),
        };
        skill.initialize(&ctx).await?;
        self.skills.write().await.push(skill);
        self.intent_parser.write().await.train().await?;
        Ok(())
    }

    /// `parseInput(text)`, spec.md §4.6.
    pub async fn parse_input(&self, text: &str) -> Envelope {
        let intent = match self.intent_parser.read().await.calc_intent(text).await {
            Ok(intent) => intent,
            Err(_) => return Envelope::err("Error occurred in processing."),
        };

        if intent.confidence < INTENT_CONFIDENCE_FLOOR {
            return self.fallback(text).await;
        }

        let bindings = self.bindings.read().await;
        let Some(binding) = bindings.iter().find(|b| b.intent_name == intent.name) else {
            drop(bindings);
            return self.fallback(text).await;
        };

        match (binding.callback)(&intent) {
            Ok(envelope) if envelope.error => {
                drop(bindings);
                self.fallback(text).await
            }
            Ok(_) => Envelope::ok("Skill completed successfully."),
            // "if it returns anything else (including raising), treat as success" — §4.6.
            Err(_) => Envelope::ok("Skill completed successfully."),
        }
    }

    async fn fallback(&self, text: &str) -> Envelope {
        match fallback_reply(text) {
            Some(reply) => match self.brain.say(reply).await {
                Ok(()) => Envelope::ok("Skill completed successfully."),
                Err(_) => Envelope::err("Intent not understood."),
            },
            None => Envelope::err("Intent not understood."),
        }
    }

    pub async fn stop(&self) {
        for skill in self.skills.read().await.iter() {
            if let Err(err) = skill.stop().await {
                tracing::warn!(skill = skill.name(), error = %err, "skill stop failed");
            }
        }
    }
}
