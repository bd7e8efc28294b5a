//! # Console Configuration
//!
//! Configuration management for the console client.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PANTRY_API_URL=https://api.example.com/api/v1                      │
//! │     PANTRY_MUTATION_POLICY=single_flight                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pantry-console/console.toml (Linux)                      │
//! │     ~/Library/Application Support/com.pantry.console/console.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost API, concurrent mutations, page size 10                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # console.toml
//! [api]
//! base_url = "http://localhost:8000/api/v1"
//! timeout_secs = 30
//!
//! [session]
//! persist_token = true
//! # token_path = "/custom/path/session.token"
//!
//! [store]
//! mutation_policy = "concurrent"  # concurrent | reject_while_loading | single_flight
//! notify_failures = true
//!
//! [view]
//! default_page_size = 10
//! ```

use std::path::PathBuf;

use pantry_core::validation::validate_page_size;
use pantry_core::view::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Mutation Policy
// =============================================================================

/// How a store treats mutations on the same collection that overlap in time.
///
/// ## Policies
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                        Mutation Policies                                │
/// │                                                                         │
/// │  CONCURRENT (Default)                                                  │
/// │  ────────────────────                                                  │
/// │  • Every call goes out immediately                                     │
/// │  • Completions apply in arrival order, last settlement wins            │
/// │                                                                         │
/// │  REJECT_WHILE_LOADING                                                  │
/// │  ────────────────────                                                  │
/// │  • A mutation issued while the list is Loading fails with Busy         │
/// │  • The gateway is never called, the collection is untouched            │
/// │                                                                         │
/// │  SINGLE_FLIGHT                                                         │
/// │  ─────────────                                                         │
/// │  • One mutation in flight per collection                               │
/// │  • Later mutations wait their turn in issue order                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationPolicy {
    #[default]
    Concurrent,
    RejectWhileLoading,
    SingleFlight,
}

impl std::fmt::Display for MutationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationPolicy::Concurrent => write!(f, "concurrent"),
            MutationPolicy::RejectWhileLoading => write!(f, "reject_while_loading"),
            MutationPolicy::SingleFlight => write!(f, "single_flight"),
        }
    }
}

impl std::str::FromStr for MutationPolicy {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "concurrent" => Ok(MutationPolicy::Concurrent),
            "reject_while_loading" | "reject" => Ok(MutationPolicy::RejectWhileLoading),
            "single_flight" | "serial" => Ok(MutationPolicy::SingleFlight),
            other => Err(ClientError::InvalidConfig(format!(
                "Unknown mutation policy: '{}'. Valid options: concurrent, reject_while_loading, single_flight",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Where the API lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Root of the REST API, resource paths are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Session persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Keep the token across restarts.
    #[serde(default = "default_true")]
    pub persist_token: bool,

    /// Token file. Defaults to `session.token` in the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            persist_token: true,
            token_path: None,
        }
    }
}

impl SessionSettings {
    /// Configured token file, or the platform default.
    pub fn token_path(&self) -> Option<PathBuf> {
        self.token_path.clone().or_else(|| {
            project_dirs().map(|dirs| dirs.data_dir().join("session.token"))
        })
    }
}

/// Entity store behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub mutation_policy: MutationPolicy,

    /// Push an error notification when an operation fails.
    #[serde(default = "default_true")]
    pub notify_failures: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            mutation_policy: MutationPolicy::default(),
            notify_failures: true,
        }
    }
}

/// Table defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for ViewSettings {
    fn default() -> Self {
        ViewSettings {
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Main Console Configuration
// =============================================================================

/// Complete console configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub view: ViewSettings,
}

impl ConsoleConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (console.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading console config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load console config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Console config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must use http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        validate_page_size(self.view.default_page_size)
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("PANTRY_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Ok(timeout) = std::env::var("PANTRY_API_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric PANTRY_API_TIMEOUT_SECS"),
            }
        }

        if let Ok(policy) = std::env::var("PANTRY_MUTATION_POLICY") {
            match policy.parse() {
                Ok(parsed) => {
                    debug!(policy = %policy, "Overriding mutation policy from environment");
                    self.store.mutation_policy = parsed;
                }
                Err(e) => warn!(error = %e, "Ignoring PANTRY_MUTATION_POLICY"),
            }
        }

        if let Ok(path) = std::env::var("PANTRY_TOKEN_PATH") {
            self.session.token_path = Some(PathBuf::from(path));
        }
    }

    /// Token handed over by the environment, if any (`PANTRY_TOKEN`).
    ///
    /// Not part of the file format so it never ends up saved to disk.
    pub fn env_token() -> Option<String> {
        std::env::var("PANTRY_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("console.toml"))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "pantry", "console")
}
