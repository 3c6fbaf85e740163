// Outbound HTTP client — relays, registration, and health probes.
//
// Grounded on `darwin-finch-finch/src/network/client.rs`'s `LotusClient`
// (a thin `reqwest::Client` wrapper with `.context(...)`-wrapped errors);
// generalized from a single named API to arbitrary Container/Brain URLs.

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use crate::config::OUTBOUND_TIMEOUT_SECS;
use crate::transport::Envelope;

/// Outbound client shared by Brain (relay, probe) and Container (register,
/// callback). Connect + read timeout bounded at `OUTBOUND_TIMEOUT_SECS`,
/// per spec.md §5 ("recommended <= 5s to keep the prober tick bounded").
#[derive(Clone)]
pub struct PeerClient {
    http: Client,
}

impl PeerClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(OUTBOUND_TIMEOUT_SECS))
            .build()
            .context("failed to build outbound HTTP client")?;
        Ok(Self { http })
    }

    /// POSTs a JSON body to `{base_url}{path}` and parses the response
    /// envelope. A transport failure (connect, timeout, TLS) surfaces as
    /// `Err`; a reachable peer that replies with `error:true` still returns
    /// `Ok` — callers distinguish transport failure from a protocol-level
    /// failure, per spec.md §7's two error kinds.
    pub async fn post(&self, base_url: &str, path: &str, body: serde_json::Value) -> Result<Envelope> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), path);
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?;

        resp.json::<Envelope>()
            .await
            .with_context(|| format!("failed to parse response from {url}"))
    }

    /// GETs `{base_url}{path}` — used by the health prober (spec.md §4.7).
    pub async fn get(&self, base_url: &str, path: &str) -> Result<Envelope> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), path);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?;

        resp.json::<Envelope>()
            .await
            .with_context(|| format!("failed to parse response from {url}"))
    }
}
