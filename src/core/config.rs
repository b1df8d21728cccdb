//! Configuration management for Switchboard
//!
//! Supports environment variables, config files, and runtime overrides.
//! Every agent's model is interchangeable via settings.
//!
//! Config file location: ~/.config/switchboard/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{Result, SwitchboardError};

/// Main configuration for Switchboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ollama configuration
    pub ollama: OllamaConfig,
    /// Model configuration
    pub models: ModelConfig,
    /// Agent loop configuration
    pub agent: AgentConfig,
    /// Wikipedia configuration
    #[serde(default)]
    pub wiki: WikiConfig,
    /// User profile persistence
    #[serde(default)]
    pub profile: ProfileConfig,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Host address (default: localhost)
    pub host: String,
    /// Port number (default: 11434)
    pub port: u16,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Model configuration - one model per agent role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model that routes requests to the specialist agents
    pub orchestrator: String,
    /// Model driving the Wikipedia search agent
    pub search: String,
    /// Model driving the calculator reasoning agent
    pub reason: String,
    /// Model used to extract profile facts from user messages
    pub extractor: String,
}

/// Agent loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model rounds per loop before the run fails
    /// Default: 15
    pub max_rounds: usize,
    /// Number of prior human/assistant turns carried between requests
    /// Default: 40 (20 exchanges)
    pub history_cap: usize,
    /// Sampling temperature for the orchestrator
    pub orchestrator_temperature: f32,
    /// Sampling temperature for the sub-agents
    pub sub_agent_temperature: f32,
    /// Whether to show debug output
    pub debug: bool,
}

/// Wikipedia API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiConfig {
    /// MediaWiki API endpoint
    pub api_url: String,
    /// Number of search hits returned to the search agent
    pub search_limit: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent to the API
    pub user_agent: String,
}

/// User profile store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// JSON file holding every user's profile
    pub store_path: PathBuf,
    /// User id used when none is given on the command line
    pub default_user_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama: OllamaConfig::default(),
            models: ModelConfig::default(),
            agent: AgentConfig::default(),
            wiki: WikiConfig::default(),
            profile: ProfileConfig::default(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("OLLAMA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(11434),
            timeout_secs: 120,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        let model = |var: &str, fallback: &str| env::var(var).unwrap_or_else(|_| fallback.to_string());
        Self {
            orchestrator: model("SWITCHBOARD_ORCHESTRATOR_MODEL", "qwen3:8b"),
            search: model("SWITCHBOARD_SEARCH_MODEL", "qwen3:8b"),
            reason: model("SWITCHBOARD_REASON_MODEL", "qwen3:8b"),
            extractor: model("SWITCHBOARD_EXTRACTOR_MODEL", "qwen3:4b"),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_rounds: env::var("SWITCHBOARD_MAX_ROUNDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            history_cap: 40,
            orchestrator_temperature: 0.0,
            sub_agent_temperature: 0.0,
            debug: env::var("SWITCHBOARD_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            search_limit: 5,
            timeout_secs: 30,
            user_agent: format!("switchboard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            store_path: env::var("SWITCHBOARD_PROFILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| Config::config_dir().join("profiles.json")),
            default_user_id: env::var("SWITCHBOARD_USER_ID")
                .unwrap_or_else(|_| "user_001".to_string()),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("switchboard")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        match Self::load_from_file() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Using default configuration: {}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(SwitchboardError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| SwitchboardError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| SwitchboardError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to file and return the path
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(|e| {
                SwitchboardError::config(format!("Failed to create config dir: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SwitchboardError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| SwitchboardError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Get the full Ollama API URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.agent.history_cap, 40);
        assert_eq!(config.wiki.search_limit, 5);
        assert!(config.wiki.api_url.contains("wikipedia.org"));
    }

    #[test]
    fn test_ollama_url() {
        let mut config = Config::default();
        config.ollama.host = "localhost".to_string();
        config.ollama.port = 11434;
        assert_eq!(config.ollama_url(), "http://localhost:11434");
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("orchestrator"));
        assert!(toml_str.contains("max_rounds"));

        let parsed = Config::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.agent.max_rounds, config.agent.max_rounds);
        assert_eq!(parsed.profile.store_path, config.profile.store_path);
    }

    #[test]
    fn test_missing_optional_sections_use_defaults() {
        let toml_str = r#"
[ollama]
host = "gpu-box"
port = 11434
timeout_secs = 60

[models]
orchestrator = "a"
search = "b"
reason = "c"
extractor = "d"

[agent]
max_rounds = 7
history_cap = 40
orchestrator_temperature = 0.0
sub_agent_temperature = 0.0
debug = false
"#;
        let config = Config::from_toml(toml_str).unwrap();
        assert_eq!(config.agent.max_rounds, 7);
        assert_eq!(config.ollama.host, "gpu-box");
        assert_eq!(config.wiki.search_limit, 5);
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("switchboard"));
    }
}
