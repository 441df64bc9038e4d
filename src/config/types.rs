//! Configuration types, defaults, loading, and validation.

use super::secrets::SecretString;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Speech-to-text provider (Deepgram)
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Chat completion provider (Groq)
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Speech synthesis provider (Cartesia)
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: "0.0.0.0")
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Listen port (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body, audio uploads included (default: 25 MiB)
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_body_limit() -> usize {
    25 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl ServerConfig {
    /// `bind:port` in the form `TcpListener::bind` accepts.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files (debug mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Deepgram pre-recorded transcription settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// API key (loaded from DEEPGRAM_API_KEY env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    #[serde(default = "default_deepgram_url")]
    pub base_url: String,

    /// Model name (default: "nova-3")
    #[serde(default = "default_deepgram_model")]
    pub model: String,

    /// Punctuation, casing and number formatting
    #[serde(default = "default_true")]
    pub smart_format: bool,
}

fn default_deepgram_url() -> String {
    "https://api.deepgram.com".to_string()
}

fn default_deepgram_model() -> String {
    "nova-3".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_deepgram_url(),
            model: default_deepgram_model(),
            smart_format: true,
        }
    }
}

/// Groq chat completion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// API key (loaded from GROQ_API_KEY env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    /// OpenAI-compatible base URL (default: "https://api.groq.com/openai/v1")
    #[serde(default = "default_groq_url")]
    pub base_url: String,

    #[serde(default = "default_groq_model")]
    pub model: String,
}

fn default_groq_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_groq_model() -> String {
    "moonshotai/kimi-k2-instruct-0905".to_string()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_groq_url(),
            model: default_groq_model(),
        }
    }
}

/// Cartesia speech synthesis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// API key (loaded from CARTESIA_API_KEY env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    #[serde(default = "default_cartesia_url")]
    pub base_url: String,

    /// Value of the `Cartesia-Version` header
    #[serde(default = "default_cartesia_version")]
    pub api_version: String,

    #[serde(default = "default_cartesia_model")]
    pub model_id: String,

    /// Voice identity ("Californian Woman")
    #[serde(default = "default_cartesia_voice")]
    pub voice_id: String,

    /// Output sample rate in Hz for raw pcm_f32le
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_cartesia_url() -> String {
    "https://api.cartesia.ai".to_string()
}

fn default_cartesia_version() -> String {
    "2024-06-30".to_string()
}

fn default_cartesia_model() -> String {
    "sonic-3-2025-10-27".to_string()
}

fn default_cartesia_voice() -> String {
    "b7d50908-b17c-442d-ad8d-810c63997ed9".to_string()
}

fn default_sample_rate() -> u32 {
    24_000
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_cartesia_url(),
            api_version: default_cartesia_version(),
            model_id: default_cartesia_model(),
            voice_id: default_cartesia_voice(),
            sample_rate: default_sample_rate(),
        }
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(overlay_table) = value {
            if let Some(toml::Value::Table(base_table)) = base.get_mut(&key) {
                merge_tables(base_table, overlay_table);
                continue;
            }
            base.insert(key, toml::Value::Table(overlay_table));
        } else {
            base.insert(key, value);
        }
    }
}

/// Canonical base directory: `~/.swift-voice/`
pub fn swift_home() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".swift-voice")
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config: ~/.swift-voice/config.toml
    /// 3. Local config: ./swift-voice.toml
    /// 4. Environment variables
    pub fn load() -> Result<Self> {
        tracing::debug!("Loading configuration...");

        let mut config = Self::default();

        let system_config_path = Self::system_config_path();
        if system_config_path.exists() {
            tracing::debug!("Loading system config from: {:?}", system_config_path);
            config = Self::merge_from_file(config, &system_config_path)?;
        }

        let local_config_path = Self::local_config_path();
        if local_config_path.exists() {
            tracing::debug!("Loading local config from: {:?}", local_config_path);
            config = Self::merge_from_file(config, &local_config_path)?;
        }

        config = Self::apply_env_overrides(config)?;

        tracing::debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from a specific file path
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. Custom config file (specified path)
    /// 3. Environment variables
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_from_path_with_vars(path, |name| std::env::var(name).ok())
    }

    /// [`Config::load_from_path`] with variables taken from `var` instead of
    /// the process environment.
    pub(crate) fn load_from_path_with_vars<P: AsRef<Path>>(
        path: P,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }
        let config = Self::merge_from_file(Self::default(), path)?;

        Self::apply_overrides(config, var)
    }

    /// Get the system config path: ~/.swift-voice/config.toml
    pub fn system_config_path() -> PathBuf {
        swift_home().join("config.toml")
    }

    /// Get the local config path: ./swift-voice.toml
    fn local_config_path() -> PathBuf {
        PathBuf::from("./swift-voice.toml")
    }

    /// Load and merge configuration from a TOML file
    fn merge_from_file(base: Self, path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let overlay: toml::Table = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Self::merge(base, overlay)
            .with_context(|| format!("Invalid config file: {:?}", path))
    }

    /// Layer `overlay` on top of `base` key by key. Anything the overlay
    /// does not mention keeps its value from `base`.
    fn merge(base: Self, overlay: toml::Table) -> Result<Self> {
        let toml::Value::Table(mut merged) =
            toml::Value::try_from(&base).context("Failed to serialize configuration")?
        else {
            anyhow::bail!("Configuration did not serialize to a table");
        };

        merge_tables(&mut merged, overlay);

        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: Self) -> Result<Self> {
        Self::apply_overrides(config, |name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable source (the process environment in
    /// production, a map in tests).
    fn apply_overrides(mut config: Self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(bind) = var("SWIFT_BIND") {
            config.server.bind = bind;
        }

        if let Some(port) = var("SWIFT_PORT") {
            config.server.port = port
                .parse()
                .with_context(|| format!("SWIFT_PORT is not a valid port: {port}"))?;
        }

        if let Some(level) = var("SWIFT_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(dir) = var("SWIFT_LOG_DIR") {
            config.logging.dir = Some(PathBuf::from(dir));
        }

        // Provider API keys
        if let Some(key) = var("DEEPGRAM_API_KEY") {
            config.transcription.api_key = Some(SecretString::new(key));
        }
        if let Some(key) = var("GROQ_API_KEY") {
            config.completion.api_key = Some(SecretString::new(key));
        }
        if let Some(key) = var("CARTESIA_API_KEY") {
            config.synthesis.api_key = Some(SecretString::new(key));
        }

        // Base URL overrides (proxies, local mocks)
        if let Some(url) = var("DEEPGRAM_BASE_URL") {
            config.transcription.base_url = url;
        }
        if let Some(url) = var("GROQ_BASE_URL") {
            config.completion.base_url = url;
        }
        if let Some(url) = var("CARTESIA_BASE_URL") {
            config.synthesis.base_url = url;
        }

        Ok(config)
    }

    /// Environment variable names of the provider keys that are not set.
    pub fn missing_api_keys(&self) -> Vec<&'static str> {
        let is_missing = |key: &Option<SecretString>| key.as_ref().is_none_or(|k| k.is_empty());

        let mut missing = Vec::new();
        if is_missing(&self.transcription.api_key) {
            missing.push("DEEPGRAM_API_KEY");
        }
        if is_missing(&self.completion.api_key) {
            missing.push("GROQ_API_KEY");
        }
        if is_missing(&self.synthesis.api_key) {
            missing.push("CARTESIA_API_KEY");
        }
        missing
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        tracing::debug!("Validating configuration...");

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port must be non-zero");
        }

        for (section, url) in [
            ("transcription", &self.transcription.base_url),
            ("completion", &self.completion.base_url),
            ("synthesis", &self.synthesis.base_url),
        ] {
            if url.trim().is_empty() {
                anyhow::bail!("[{section}] base_url is empty");
            }
        }

        if self.synthesis.sample_rate == 0 {
            anyhow::bail!("[synthesis] sample_rate must be non-zero");
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Configuration saved to: {:?}", path);
        Ok(())
    }
}
