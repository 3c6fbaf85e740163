// Intent parser — external collaborator (spec.md §6.5): "methods
// load_file(name, path), train(), calc_intent(text) -> {name, confidence,
// ...}". The original (`padatious.IntentContainer`) is a trained NLU
// model; this crate ships a minimal keyword-overlap stand-in sufficient
// for tests and local operation, never a hand-rolled NLU replacement for
// a real integration.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Intent {
    pub name: String,
    pub confidence: f64,
    pub fields: serde_json::Value,
}

#[async_trait]
pub trait IntentParser: Send + Sync {
    /// Associates `name` with the vocabulary file at `path`.
    async fn load_file(&mut self, name: &str, path: &Path) -> anyhow::Result<()>;

    /// Trains the parser against all loaded files.
    async fn train(&mut self) -> anyhow::Result<()>;

    /// Scores `text` against every loaded intent, returning the best match.
    async fn calc_intent(&self, text: &str) -> anyhow::Result<Intent>;
}

/// Keyword-overlap stand-in: each loaded file is a newline-separated list
/// of trigger phrases; confidence is the fraction of an intent's phrases
/// that appear as substrings of the input, capped at 1.0.
#[derive(Default)]
pub struct KeywordIntentParser {
    phrases_by_intent: HashMap<String, Vec<String>>,
}

impl KeywordIntentParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers phrases directly, bypassing the filesystem — used by
    /// tests and skills that construct their vocabulary programmatically.
    pub fn with_phrases(name: impl Into<String>, phrases: Vec<String>) -> Self {
        let mut parser = Self::default();
        parser.phrases_by_intent.insert(name.into(), phrases);
        parser
    }
}

#[async_trait]
impl IntentParser for KeywordIntentParser {
    async fn load_file(&mut self, name: &str, path: &Path) -> anyhow::Result<()> {
        let contents = tokio::fs::read_to_string(path).await?;
        let phrases: Vec<String> = contents
            .lines()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
        self.phrases_by_intent.insert(name.to_string(), phrases);
        Ok(())
    }

    async fn train(&mut self) -> anyhow::Result<()> {
        // Nothing to precompute for a keyword matcher.
        Ok(())
    }

    async fn calc_intent(&self, text: &str) -> anyhow::Result<Intent> {
        let lowered = text.to_lowercase();
        let mut best: Option<(String, f64)> = None;

        for (name, phrases) in &self.phrases_by_intent {
            if phrases.is_empty() {
                continue;
            }
            let hits = phrases.iter().filter(|p| lowered.contains(p.as_str())).count();
            let confidence = hits as f64 / phrases.len() as f64;
            if best.as_ref().map(|(_, c)| confidence > *c).unwrap_or(true) {
                best = Some((name.clone(), confidence));
            }
        }

        let (name, confidence) = best.unwrap_or(("".to_string(), 0.0));
        Ok(Intent {
            name,
            confidence,
            fields: serde_json::Value::Null,
        })
    }
}
