//! CLI subcommands: serve, init, config, and config loading.

use anyhow::Result;
use std::path::Path;

use crate::config::{Config, SecretString};

/// Load configuration from file or defaults
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config = if let Some(path) = config_path {
        Config::load_from_path(path)?
    } else {
        Config::load()?
    };

    config.validate()?;

    Ok(config)
}

/// Run the HTTP server
pub(crate) async fn cmd_serve(
    mut config: Config,
    bind: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;

    tracing::info!("Starting swift-voice v{}", crate::VERSION);
    crate::server::serve(&config).await
}

/// Initialize configuration file
pub(crate) fn cmd_init(force: bool) -> Result<()> {
    let config_path = Config::system_config_path();
    init_at(&config_path, force)?;

    println!("Configuration initialized at: {}", config_path.display());
    println!("\nNext steps:");
    println!("   1. Set DEEPGRAM_API_KEY, GROQ_API_KEY and CARTESIA_API_KEY (env or .env)");
    println!("   2. Run 'swift-voice serve'");

    Ok(())
}

fn init_at(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at: {}\nUse --force to overwrite",
            path.display()
        );
    }
    Config::default().save(path)
}

/// Print the effective configuration
pub(crate) fn cmd_config(config: &Config, show_secrets: bool) -> Result<()> {
    if show_secrets {
        println!("{}", toml::to_string_pretty(config)?);
    } else {
        print!("{}", render_redacted(config));
        println!("\nUse --show-secrets to display API keys");
    }
    Ok(())
}

fn render_redacted(config: &Config) -> String {
    let key_state = |key: &Option<SecretString>| match key {
        Some(k) if !k.is_empty() => "[SET]",
        _ => "[NOT SET]",
    };

    let mut out = String::new();
    out.push_str(&format!("Listen: {}\n", config.server.listen_addr()));
    out.push_str(&format!(
        "Body limit: {} bytes\n",
        config.server.body_limit_bytes
    ));
    out.push_str(&format!("Log level: {}\n", config.logging.level));
    out.push_str("\nProviders:\n");
    out.push_str(&format!(
        "  - transcription: {} ({})\n    API Key: {}\n",
        config.transcription.base_url,
        config.transcription.model,
        key_state(&config.transcription.api_key)
    ));
    out.push_str(&format!(
        "  - completion: {} ({})\n    API Key: {}\n",
        config.completion.base_url,
        config.completion.model,
        key_state(&config.completion.api_key)
    ));
    out.push_str(&format!(
        "  - synthesis: {} ({}, voice {})\n    API Key: {}\n",
        config.synthesis.base_url,
        config.synthesis.model_id,
        config.synthesis.voice_id,
        key_state(&config.synthesis.api_key)
    ));
    out
}
