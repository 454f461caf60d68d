//! Configuration management for the council engine.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Config files (.council/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric, with most state stored in `.council/`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .council/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Council records snapshot (defaults to .council/data.json)
    pub data_path: Option<PathBuf>,

    /// Reasoning provider (e.g., "ollama", "openai")
    pub provider: String,

    /// Reasoning model identifier
    pub model: String,

    /// API key for the reasoning provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Reasoning provider configurations
    pub llm: Option<LlmConfig>,

    /// Embedding service settings
    pub embeddings: EmbeddingSettings,

    /// Orchestrator loop limits
    pub agent: AgentSettings,

    /// Hybrid retrieval tuning
    pub retrieval: RetrievalSettings,
}

/// Reasoning provider configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Custom endpoint for this provider, if one is configured.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ProviderConfig::OpenAI { endpoint, .. } => endpoint.as_deref(),
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }
}

/// Embedding service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingSettings {
    /// "ollama", "mock" or "none"
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            endpoint: None,
        }
    }
}

/// Orchestrator loop limits.
///
/// These trade answer quality against prompt size and cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSettings {
    /// Hard cap on think-act-observe iterations
    pub max_steps: usize,

    /// Long string fields inside an observation are cut to this many characters
    pub max_string_chars: usize,

    /// Array fields inside an observation keep only this many elements
    pub max_array_items: usize,

    /// Upper bound on one serialized observation
    pub max_observation_chars: usize,

    /// How much of an unparseable reasoning response is echoed back
    pub error_excerpt_chars: usize,

    /// Wall-clock budget for evidence gathering; `None` disables it
    pub deadline_secs: Option<u64>,

    /// Sampling temperature for reasoning steps
    pub temperature: f32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: 6,
            max_string_chars: 1000,
            max_array_items: 15,
            max_observation_chars: 8000,
            error_excerpt_chars: 200,
            deadline_secs: Some(120),
            temperature: 0.2,
        }
    }
}

/// Hybrid retrieval tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrievalSettings {
    /// RRF smoothing constant
    pub rrf_k: u32,

    /// Result cap for the cross-type aggregator
    pub default_limit: usize,

    /// Minimum cosine similarity for motion hits
    pub motion_floor: f32,

    /// Minimum cosine similarity for transcript segment hits
    pub segment_floor: f32,

    /// Minimum cosine similarity for matter hits (broader recall)
    pub matter_floor: f32,

    /// Meeting-date cache capacity
    pub cache_capacity: usize,

    /// Meeting-date cache entry lifetime
    pub cache_ttl_secs: u64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            rrf_k: 50,
            default_limit: 30,
            motion_floor: 0.30,
            segment_floor: 0.30,
            matter_floor: 0.20,
            cache_capacity: 512,
            cache_ttl_secs: 900,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    embeddings: Option<EmbeddingSettings>,
    agent: Option<AgentSettings>,
    retrieval: Option<RetrievalSettings>,
    data: Option<DataConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DataConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

/// Command-line values that take precedence over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub workspace: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub log_level: Option<String>,
    pub log_json: bool,
    pub verbose: bool,
    pub no_color: bool,
    pub max_steps: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            data_path: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            log_json: false,
            verbose: false,
            no_color: false,
            llm: None,
            embeddings: EmbeddingSettings::default(),
            agent: AgentSettings::default(),
            retrieval: RetrievalSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file, environment variables and defaults.
    ///
    /// Environment variables:
    /// - `COUNCIL_WORKSPACE`: Override workspace path
    /// - `COUNCIL_CONFIG`: Path to config file
    /// - `COUNCIL_DATA`: Path to the records snapshot
    /// - `COUNCIL_PROVIDER`: Reasoning provider
    /// - `COUNCIL_MODEL`: Model identifier
    /// - `COUNCIL_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use council_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Max steps: {}", config.agent.max_steps);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("COUNCIL_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("COUNCIL_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.council_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("COUNCIL_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("COUNCIL_MODEL") {
            config.model = model;
        }

        if let Ok(data) = std::env::var("COUNCIL_DATA") {
            config.data_path = Some(PathBuf::from(data));
        }

        config.api_key = std::env::var("COUNCIL_API_KEY").ok();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(self.clone().merge_file(config_file))
    }

    fn merge_file(mut self, file: ConfigFile) -> Self {
        if let Some(path) = file.workspace.and_then(|ws| ws.path) {
            self.workspace = PathBuf::from(path);
        }

        if let Some(path) = file.data.and_then(|d| d.path) {
            self.data_path = Some(PathBuf::from(path));
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
            if let Some(format) = logging.format {
                self.log_json = format.eq_ignore_ascii_case("json");
            }
        }

        if let Some(embeddings) = file.embeddings {
            self.embeddings = embeddings;
        }

        if let Some(agent) = file.agent {
            self.agent = agent;
        }

        if let Some(retrieval) = file.retrieval {
            self.retrieval = retrieval;
        }

        if let Some(llm) = file.llm {
            self.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                self.model = match provider_config {
                    ProviderConfig::OpenAI { model, .. } => model.clone(),
                    ProviderConfig::Ollama { model, .. } => model.clone(),
                };
            }

            self.llm = Some(llm);
        }

        self
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags win over the config file and environment.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(workspace) = overrides.workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = overrides.config_file {
            self.config_file = Some(config_file);
        }

        if let Some(data_path) = overrides.data_path {
            self.data_path = Some(data_path);
        }

        if let Some(provider) = overrides.provider {
            self.provider = provider;
        }

        if let Some(model) = overrides.model {
            self.model = model;
        }

        if let Some(log_level) = overrides.log_level {
            self.log_level = Some(log_level);
        }

        if let Some(max_steps) = overrides.max_steps {
            self.agent.max_steps = max_steps;
        }

        if overrides.verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        self.log_json |= overrides.log_json;
        self.no_color |= overrides.no_color;

        self
    }

    /// Get the path to the .council directory.
    pub fn council_dir(&self) -> PathBuf {
        self.workspace.join(".council")
    }

    /// Resolve the records snapshot path.
    pub fn resolved_data_path(&self) -> PathBuf {
        match &self.data_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.workspace.join(path),
            None => self.council_dir().join("data.json"),
        }
    }

    /// Get the configuration for a provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Resolve API key, preferring `COUNCIL_API_KEY` over the provider's env var.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(provider)? {
            ProviderConfig::OpenAI { api_key_env, .. } => std::env::var(&api_key_env).ok(),
            ProviderConfig::Ollama { .. } => None,
        }
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["openai", "ollama"];

        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if self.provider == "openai" && self.resolve_api_key("openai").is_none() {
            return Err(AppError::Config(
                "The openai provider needs an API key (COUNCIL_API_KEY or apiKeyEnv)".to_string(),
            ));
        }

        if self.agent.max_steps == 0 {
            return Err(AppError::Config("agent.maxSteps must be at least 1".to_string()));
        }

        if self.agent.max_array_items == 0 || self.agent.max_string_chars == 0 {
            return Err(AppError::Config(
                "agent truncation limits must be positive".to_string(),
            ));
        }

        if self.retrieval.rrf_k == 0 {
            return Err(AppError::Config("retrieval.rrfK must be positive".to_string()));
        }

        Ok(())
    }
}
