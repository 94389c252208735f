//! Settings Models
//!
//! Application configuration and settings data structures.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sow_studio_core::proxy::ProxyConfig;
use sow_studio_llm::{AnythingLlmConfig, ChatMode};

/// Environment variable holding the AnythingLLM API key.
pub const API_KEY_ENV: &str = "ANYTHINGLLM_API_KEY";
/// Environment variable overriding `anythingllm_url`.
pub const URL_ENV: &str = "ANYTHINGLLM_URL";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the AnythingLLM instance
    pub anythingllm_url: String,
    /// Workspace slug used when none is given on the command line
    #[serde(default)]
    pub default_workspace: Option<String>,
    /// "chat" or "query"
    #[serde(default = "default_chat_mode")]
    pub chat_mode: String,
    /// Per-request timeout; `None` waits for the backend indefinitely
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Rate card JSON used to flag unknown roles
    #[serde(default)]
    pub rate_card_path: Option<PathBuf>,
    /// Default tracing filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
    /// Runtime only; read from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_chat_mode() -> String {
    "chat".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            anythingllm_url: "http://localhost:3001".to_string(),
            default_workspace: None,
            chat_mode: default_chat_mode(),
            request_timeout_secs: Some(300),
            rate_card_path: None,
            log_level: default_log_level(),
            proxy: None,
            api_key: None,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub anythingllm_url: Option<String>,
    pub default_workspace: Option<String>,
    pub chat_mode: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub rate_card_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub proxy: Option<ProxyConfig>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(url) = update.anythingllm_url {
            self.anythingllm_url = url;
        }
        if let Some(workspace) = update.default_workspace {
            self.default_workspace = Some(workspace);
        }
        if let Some(mode) = update.chat_mode {
            self.chat_mode = mode;
        }
        if let Some(secs) = update.request_timeout_secs {
            self.request_timeout_secs = Some(secs);
        }
        if let Some(path) = update.rate_card_path {
            self.rate_card_path = Some(path);
        }
        if let Some(level) = update.log_level {
            self.log_level = level;
        }
        if let Some(proxy) = update.proxy {
            self.proxy = Some(proxy);
        }
    }

    /// Overlay environment values using `lookup` (normally `std::env::var`).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup(URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.anythingllm_url = url;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let url = self.anythingllm_url.trim();
        if url.is_empty() {
            return Err("anythingllm_url must not be empty".to_string());
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!(
                "Invalid anythingllm_url: {}. Must start with http:// or https://",
                url
            ));
        }

        if self.chat_mode.parse::<ChatMode>().is_err() {
            return Err(format!(
                "Invalid chat_mode: {}. Must be 'chat' or 'query'",
                self.chat_mode
            ));
        }

        if self.request_timeout_secs == Some(0) {
            return Err("request_timeout_secs must be greater than zero".to_string());
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(format!("Invalid log_level: {}", self.log_level));
        }

        if let Some(proxy) = &self.proxy {
            proxy.validate().map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    /// Parsed chat mode; falls back to `chat` for an unvalidated value.
    pub fn chat_mode(&self) -> ChatMode {
        self.chat_mode.parse().unwrap_or_default()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Connection settings for the HTTP transport.
    pub fn anythingllm(&self) -> AnythingLlmConfig {
        AnythingLlmConfig {
            base_url: self.anythingllm_url.clone(),
            api_key: self.api_key.clone(),
            proxy: self.proxy.clone(),
        }
    }
}
