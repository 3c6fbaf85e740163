// Configuration structs
//
// Mirrors the shape consumed (not owned) by the core, per spec.md §6.4:
// a top-level object with `brain`, `container`, and free-form `settings`
// keys. The CLI (src/cli) is the thin adapter that loads this and wires
// up a Brain or Container.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

fn default_true() -> bool {
    true
}

/// TLS material for a transport endpoint. Present only when both files are
/// configured — plain HTTP is used otherwise (spec.md §4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SslConfig {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

/// Fields shared by both `[brain]` and `[container]` tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_hostname")]
    pub hostname: String,
    pub tcp_port: u16,
    #[serde(default)]
    pub ssl: Option<SslConfig>,
}

fn default_hostname() -> String {
    "127.0.0.1".to_string()
}

impl TransportConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.hostname, self.tcp_port)
    }

    pub fn uses_tls(&self) -> bool {
        self.ssl.is_some()
    }
}

/// `[brain]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainConfig {
    #[serde(flatten)]
    pub transport: TransportConfig,
    /// Additional relay command names to expose on the web GUI command list
    /// (spec.md §6.1's `__COMMAND_LIST__` template placeholder).
    #[serde(default)]
    pub commands: Vec<String>,
    /// Additional data-type names to expose on the web GUI data list.
    #[serde(default)]
    pub data: Vec<String>,
    /// Whether the CLI should start the Brain immediately on load.
    #[serde(default = "default_true")]
    pub start: bool,
    /// Optional shared bearer token (spec.md §1 Non-goals: "no
    /// authentication stronger than an optional shared bearer token").
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// Directory serving the web GUI's `index.html` and static assets.
    /// Falls back to a built-in template when unset (spec.md §6.1).
    #[serde(default)]
    pub webgui_root: Option<PathBuf>,
    /// Path to a JSONL audit trail of control/data traffic. Disabled when unset.
    #[serde(default)]
    pub audit_log: Option<PathBuf>,
}

/// A single device entry under `[[container.devices]]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default, rename = "friendlyName")]
    pub friendly_name: Option<String>,
    #[serde(default = "default_true", rename = "autoStart")]
    pub auto_start: bool,
    #[serde(default)]
    pub parameters: HashMap<String, toml::Value>,
}

/// `[container]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(flatten)]
    pub transport: TransportConfig,
    pub brain_url: String,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// Path to a JSONL audit trail of control traffic. Disabled when unset.
    #[serde(default)]
    pub audit_log: Option<PathBuf>,
}

/// Top-level configuration object, per spec.md §6.4.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub brain: Option<BrainConfig>,
    #[serde(default)]
    pub container: Option<ContainerConfig>,
    #[serde(default)]
    pub settings: HashMap<String, toml::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_brain_table() {
        let raw = r#"
            [brain]
            hostname = "0.0.0.0"
            tcp_port = 8080
            start = true
        "#;
        let cfg: Config = toml::from_str(raw).unwrap();
        let brain = cfg.brain.unwrap();
        assert_eq!(brain.transport.hostname, "0.0.0.0");
        assert_eq!(brain.transport.tcp_port, 8080);
        assert!(brain.start);
        assert!(!brain.transport.uses_tls());
    }

    #[test]
    fn test_parse_container_with_devices() {
        let raw = r#"
            [container]
            tcp_port = 8081
            brain_url = "http://localhost:8080"

            [[container.devices]]
            type = "listener"
            friendlyName = "mic"
        "#;
        let cfg: Config = toml::from_str(raw).unwrap();
        let container = cfg.container.unwrap();
        assert_eq!(container.brain_url, "http://localhost:8080");
        assert_eq!(container.devices.len(), 1);
        assert_eq!(container.devices[0].device_type, "listener");
        assert_eq!(container.devices[0].friendly_name.as_deref(), Some("mic"));
        assert!(container.devices[0].auto_start);
    }

    #[test]
    fn test_bind_address() {
        let t = TransportConfig {
            hostname: "10.0.0.2".to_string(),
            tcp_port: 9000,
            ssl: None,
        };
        assert_eq!(t.bind_address(), "10.0.0.2:9000");
    }
}
