//! Configuration management for Levrok
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::cli::Cli;
use crate::error::{LevrokError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the bearer token for the site API.
pub const API_TOKEN_ENV: &str = "LEVROK_API_TOKEN";

/// Main configuration structure for Levrok
///
/// This structure holds all configuration needed by the client: the site
/// API endpoint, chat behavior, and scheduling behavior.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Site API endpoint configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Chat behavior configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Scheduling behavior configuration
    #[serde(default)]
    pub scheduling: SchedulingConfig,
}

/// Site API endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the site serving the API routes
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://levroklabs.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ApiConfig {
    /// Build a full endpoint URL from an API route path.
    pub fn route(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Bearer token for the site API, read from the environment.
    ///
    /// Returns `None` when the variable is unset or empty; requests are
    /// then sent unauthenticated.
    pub fn bearer_token(&self) -> Option<String> {
        std::env::var(API_TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

/// Chat behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Maximum conversation tokens before truncation kicks in.
    ///
    /// Leaves room for response generation below the model's real window.
    #[serde(default = "default_token_limit")]
    pub token_limit: usize,

    /// Whether to attempt streaming responses first
    #[serde(default = "default_stream")]
    pub stream: bool,
}

fn default_token_limit() -> usize {
    3800
}

fn default_stream() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            token_limit: default_token_limit(),
            stream: default_stream(),
        }
    }
}

/// Scheduling behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// How long a cached availability lookup stays fresh, in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,

    /// Age past which cache entries are swept on write, in seconds
    #[serde(default = "default_cache_stale")]
    pub cache_stale_seconds: u64,

    /// Timezone used when the user does not pick one
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
}

fn default_cache_ttl() -> u64 {
    5 * 60
}

fn default_cache_stale() -> u64 {
    60 * 60
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_cache_ttl(),
            cache_stale_seconds: default_cache_stale(),
            default_timezone: default_timezone(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, applying CLI overrides.
    ///
    /// A missing file is not an error: defaults are used so the CLI works
    /// out of the box against the production site.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed CLI arguments whose overrides take precedence
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &str, cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| LevrokError::Config(format!("Failed to read {}: {}", path, e)))?;
            serde_yaml::from_str(&contents)
                .map_err(|e| LevrokError::Config(format!("Failed to parse {}: {}", path, e)))?
        } else {
            tracing::debug!("No configuration file at {}, using defaults", path);
            Self::default()
        };

        if let Some(base_url) = &cli.base_url {
            config.api.base_url = base_url.clone();
        }

        Ok(config)
    }

    /// Validate the configuration, returning the first problem found.
    ///
    /// # Errors
    ///
    /// Returns `LevrokError::Config` describing the invalid field.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url).map_err(|e| {
            LevrokError::Config(format!("Invalid base_url '{}': {}", self.api.base_url, e))
        })?;

        if self.api.timeout_seconds == 0 {
            return Err(LevrokError::Config(
                "timeout_seconds must be greater than zero".to_string(),
            )
            .into());
        }

        // The budget must at least cover the fixed framing overhead plus
        // one message, or truncation can never fit anything.
        let floor = crate::chat::tokens::SYSTEM_PROMPT_TOKENS + crate::chat::tokens::MESSAGE_OVERHEAD;
        if self.chat.token_limit <= floor {
            return Err(LevrokError::Config(format!(
                "token_limit must be greater than {} (system prompt plus per-message overhead)",
                floor
            ))
            .into());
        }

        if self.scheduling.cache_ttl_seconds > self.scheduling.cache_stale_seconds {
            return Err(LevrokError::Config(
                "cache_ttl_seconds must not exceed cache_stale_seconds".to_string(),
            )
            .into());
        }

        crate::scheduling::timezone::normalize(&self.scheduling.default_timezone).map_err(
            |_| {
                LevrokError::Config(format!(
                    "Unsupported default_timezone '{}'",
                    self.scheduling.default_timezone
                ))
            },
        )?;

        Ok(())
    }
}
