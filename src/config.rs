use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Runtime configuration for the relay agent.
///
/// Loaded from `~/.mcp-relay/config.toml` when present, otherwise defaults.
/// CLI flags override individual fields after loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// WebSocket address of the Browser MCP server.
    #[serde(default = "default_mcp_server")]
    pub mcp_server: String,
    /// Model used for generation calls.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the generative-language API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout for generation calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_mcp_server() -> String {
    "ws://localhost:3000".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            mcp_server: default_mcp_server(),
            model: default_model(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from file, falling back to defaults when the file
    /// does not exist. A present but unreadable or malformed file is an
    /// error.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p
        } else {
            let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            home_dir.join(".mcp-relay").join("config.toml")
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file {}", config_path.display())
            })?;
            let config: AgentConfig = toml::from_str(&content)
                .with_context(|| format!("Invalid config file {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

/// Validate that the server address is a WebSocket URL.
pub fn validate_server_url(address: &str) -> Result<Url> {
    let url = Url::parse(address)
        .with_context(|| format!("Invalid MCP server address: {address}"))?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => anyhow::bail!(
            "MCP server address must use ws:// or wss://, got {other}://"
        ),
    }
}
