use anyhow::Context;
use serde::Deserialize;

use crate::http::parser::DEFAULT_MAX_HEADER_BYTES;

/// Server configuration.
///
/// Loaded from the YAML file named by `WICKET_CONFIG` when set, otherwise
/// defaults; `LISTEN` overrides the listen address either way.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub listen_addr: String,
    /// `SERVER_NAME` for applications; the bound IP address when unset.
    pub server_name: Option<String>,
    /// Value of the default `Server` response header.
    pub server_software: String,
    pub max_header_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            server_name: None,
            server_software: default_server_software(),
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("WICKET_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var("LISTEN") {
            cfg.listen_addr = listen_addr;
        }

        Ok(cfg)
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config file {}", path))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(content)?;
        if cfg.max_header_bytes == 0 {
            anyhow::bail!("max_header_bytes must be positive");
        }
        Ok(cfg)
    }
}

fn default_server_software() -> String {
    format!("wicket/{}", env!("CARGO_PKG_VERSION"))
}
