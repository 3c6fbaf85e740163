// CLI adapter — spec.md §6.4. Thin: parses a config file path and a
// brain/container mode, builds the corresponding object, and calls
// serve(). No business logic lives here.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::brain::Brain;
use crate::config;
use crate::container::Container;
use crate::device::{Listener, Speaker, Watcher};
use crate::network::PeerClient;
use crate::skills::KeywordIntentParser;

#[derive(Debug, Parser)]
#[command(name = "karen", about = "Control-plane core for a distributed synthetic-assistant platform")]
pub struct Cli {
    /// Path to the TOML config file. Defaults to ~/.karen/config.toml.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Debug, Subcommand)]
pub enum Mode {
    /// Run as a Brain (coordinator).
    Brain,
    /// Run as a Container (device host).
    Container,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config_path = self.config.unwrap_or_else(config::default_config_path);
        let cfg = if config_path.exists() {
            config::load_config(&config_path)
                .with_context(|| format!("failed to load config from {}", config_path.display()))?
        } else {
            tracing::warn!(path = %config_path.display(), "config file not found, using defaults");
            config::Config::default()
        };

        match self.mode {
            Mode::Brain => run_brain(cfg).await,
            Mode::Container => run_container(cfg).await,
        }
    }
}

async fn run_brain(cfg: config::Config) -> Result<()> {
    let brain_cfg = cfg.brain.unwrap_or_else(|| config::BrainConfig {
        transport: config::TransportConfig {
            hostname: "0.0.0.0".to_string(),
            tcp_port: 8080,
            ssl: None,
        },
        commands: Vec::new(),
        data: Vec::new(),
        start: true,
        bearer_token: None,
        webgui_root: None,
        audit_log: None,
    });

    let addr = brain_cfg.transport.bind_address().parse()?;
    let brain = Brain::with_config(
        addr,
        PeerClient::new()?,
        Box::new(KeywordIntentParser::new()),
        brain_cfg.bearer_token,
        brain_cfg.transport.ssl,
        brain_cfg.commands,
        brain_cfg.data,
        brain_cfg.webgui_root,
        brain_cfg.audit_log,
    );

    tracing::info!(%addr, "starting brain");
    brain.start().await
}

async fn run_container(cfg: config::Config) -> Result<()> {
    let container_cfg = cfg.container.context("config has no [container] table")?;
    let addr = container_cfg.transport.bind_address().parse()?;

    let container = Container::with_tls(
        addr,
        container_cfg.brain_url.clone(),
        PeerClient::new()?,
        container_cfg.bearer_token.clone(),
        container_cfg.transport.ssl.clone(),
        container_cfg.audit_log.clone(),
    );

    for (i, device_cfg) in container_cfg.devices.iter().enumerate() {
        register_configured_device(&container, device_cfg, i).await?;
    }

    tracing::info!(%addr, brain_url = %container_cfg.brain_url, "starting container");
    container.start().await
}

async fn register_configured_device(
    container: &Arc<Container>,
    device_cfg: &config::DeviceConfig,
    index: usize,
) -> Result<()> {
    let id = format!("{}-{index}", device_cfg.device_type);
    let device: Arc<dyn crate::device::Device> = match device_cfg.device_type.as_str() {
        "listener" => Arc::new(Listener::new()),
        "speaker" => Arc::new(Speaker::new()),
        "watcher" => Arc::new(Watcher::new()),
        other => anyhow::bail!("unknown device type in config: {other}"),
    };

    container
        .add_device(
            device,
            id,
            device_cfg.auto_start,
            false,
            device_cfg.friendly_name.clone(),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_brain_mode() {
        let cli = Cli::try_parse_from(["karen", "brain"]).unwrap();
        assert!(matches!(cli.mode, Mode::Brain));
    }

    #[test]
    fn test_cli_parses_container_mode_with_config() {
        let cli = Cli::try_parse_from(["karen", "--config", "/tmp/karen.toml", "container"]).unwrap();
        assert!(matches!(cli.mode, Mode::Container));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/karen.toml")));
    }
}
