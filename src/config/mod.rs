// Configuration module
// Public interface for configuration loading

mod constants;
mod loader;
mod settings;

pub use constants::*;
pub use loader::{load_config, load_config_from_str, default_config_path};
pub use settings::{
    BrainConfig, Config, ContainerConfig, DeviceConfig, SslConfig, TransportConfig,
};
