//! Pluggable reasoning advisor abstraction
//!
//! The classification engine escalates low-confidence suggestions to an
//! external reasoning advisor. This module provides a backend-agnostic
//! interface plus an ordered fallback chain.
//!
//! # Architecture
//!
//! - `AdvisorBackend` trait: defines the interface for advisor operations
//! - `AdvisorClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - `AdvisorChain`: ordered provider list; first validly-shaped answer wins
//! - Backend implementations: `GeminiBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `ADVISOR_BACKEND`: Backend to use (gemini, mock). Default: gemini
//! - `GEMINI_API_KEY`: API key (required for gemini backend)
//! - `GEMINI_MODEL`: Model name (default: gemini-2.0-flash)
//! - `FISCOMED_ADVISOR_URL`: Base URL override (used by tests)
//!
//! The chain itself (provider order, per-call timeout) comes from
//! `config/advisors.toml`, overridable at
//! `~/.local/share/fiscomed/config/advisors.toml`.

mod gemini;
mod mock;
pub mod parsing;
pub mod types;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use types::{AdvisorRequest, AdvisorSuggestion};

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Embedded default chain config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../../config/advisors.toml");

/// Trait defining the interface for all reasoning advisors
///
/// Backends must be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AdvisorBackend: Send + Sync {
    /// Classify a transaction into one of the allowed catalog names
    async fn classify_expense(&self, request: &AdvisorRequest) -> Result<AdvisorSuggestion>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete advisor client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AdvisorClient {
    /// Gemini-compatible backend (HTTP API)
    Gemini(GeminiBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AdvisorClient {
    /// Create an advisor client from environment variables
    ///
    /// Checks `ADVISOR_BACKEND` to determine which backend to use:
    /// - `gemini` (default): Uses GEMINI_API_KEY and GEMINI_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("ADVISOR_BACKEND").unwrap_or_else(|_| "gemini".to_string());

        match backend.to_lowercase().as_str() {
            "gemini" => GeminiBackend::from_env().map(AdvisorClient::Gemini),
            "mock" => Some(AdvisorClient::Mock(MockBackend::new())),
            _ => {
                warn!(backend = %backend, "Unknown ADVISOR_BACKEND, falling back to gemini");
                GeminiBackend::from_env().map(AdvisorClient::Gemini)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AdvisorClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AdvisorClient::Gemini(b) => AdvisorClient::Gemini(b.with_model(model)),
            AdvisorClient::Mock(b) => AdvisorClient::Mock(b.clone()),
        }
    }
}

// Implement AdvisorBackend for AdvisorClient by delegating to the inner backend
#[async_trait]
impl AdvisorBackend for AdvisorClient {
    async fn classify_expense(&self, request: &AdvisorRequest) -> Result<AdvisorSuggestion> {
        match self {
            AdvisorClient::Gemini(b) => b.classify_expense(request).await,
            AdvisorClient::Mock(b) => b.classify_expense(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AdvisorClient::Gemini(b) => b.health_check().await,
            AdvisorClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AdvisorClient::Gemini(b) => b.model(),
            AdvisorClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AdvisorClient::Gemini(b) => b.host(),
            AdvisorClient::Mock(b) => b.host(),
        }
    }
}

/// Chain configuration file shape
#[derive(Debug, Deserialize)]
struct ChainConfigFile {
    #[serde(default)]
    default: ChainDefaults,
    #[serde(default)]
    providers: Vec<ProviderEntry>,
}

#[derive(Debug, Deserialize)]
struct ChainDefaults {
    timeout_secs: u64,
}

impl Default for ChainDefaults {
    fn default() -> Self {
        Self { timeout_secs: 20 }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderEntry {
    backend: String,
    model: Option<String>,
}

/// Path of the user override config
fn config_override_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("fiscomed").join("config").join("advisors.toml"))
}

fn load_chain_config() -> Result<ChainConfigFile> {
    let content = match config_override_path().filter(|p| p.exists()) {
        Some(path) => {
            debug!(path = %path.display(), "Loading advisor chain config override");
            fs::read_to_string(&path)?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    toml::from_str(&content).map_err(|e| Error::Config(format!("Invalid advisor config: {}", e)))
}

/// Ordered advisor fallback chain
///
/// Providers are tried in sequence; the first validly-shaped answer wins.
/// Each call is bounded by the configured timeout and holds no lock - the
/// result only feeds a suggestion, persisted separately by the caller.
pub struct AdvisorChain {
    providers: Vec<AdvisorClient>,
    timeout: Duration,
}

impl AdvisorChain {
    /// Create a chain from an explicit provider list
    pub fn new(providers: Vec<AdvisorClient>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Create a single-provider chain (mostly for tests)
    pub fn single(provider: AdvisorClient, timeout: Duration) -> Self {
        Self::new(vec![provider], timeout)
    }

    /// Build the chain from the TOML config and environment
    ///
    /// Returns None when no provider can be constructed (e.g. no API key),
    /// in which case the engine simply keeps its local defaults.
    pub fn from_env() -> Option<Self> {
        let config = match load_chain_config() {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to load advisor chain config: {}", e);
                return None;
            }
        };

        let mut providers = Vec::new();
        for entry in &config.providers {
            let client = match entry.backend.as_str() {
                "gemini" => GeminiBackend::from_env().map(AdvisorClient::Gemini),
                "mock" => Some(AdvisorClient::Mock(MockBackend::new())),
                other => {
                    warn!(backend = %other, "Unknown advisor backend in config, skipping");
                    None
                }
            };

            if let Some(client) = client {
                let client = match &entry.model {
                    Some(model) => client.with_model(model),
                    None => client,
                };
                providers.push(client);
            }
        }

        // Environment-selected backend (e.g. ADVISOR_BACKEND=mock) without a
        // matching config entry still yields a single-provider chain.
        if providers.is_empty() {
            providers.extend(AdvisorClient::from_env());
        }

        if providers.is_empty() {
            return None;
        }

        Some(Self::new(
            providers,
            Duration::from_secs(config.default.timeout_secs),
        ))
    }

    /// Number of configured providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Ask the chain for a classification
    ///
    /// Tries each provider in order under the configured timeout; the first
    /// validly-shaped response wins. Which provider answered does not matter
    /// to callers, only the shape of the answer.
    pub async fn classify_expense(&self, request: &AdvisorRequest) -> Result<AdvisorSuggestion> {
        for provider in &self.providers {
            match tokio::time::timeout(self.timeout, provider.classify_expense(request)).await {
                Ok(Ok(suggestion)) => {
                    debug!(
                        model = provider.model(),
                        classification = %suggestion.classification,
                        "Advisor answered"
                    );
                    return Ok(suggestion);
                }
                Ok(Err(e)) => {
                    warn!(model = provider.model(), "Advisor call failed: {}", e);
                }
                Err(_) => {
                    warn!(
                        model = provider.model(),
                        timeout_secs = self.timeout.as_secs(),
                        "Advisor call timed out"
                    );
                }
            }
        }

        Err(Error::Advisor(
            "No advisor produced a usable answer".to_string(),
        ))
    }
}
