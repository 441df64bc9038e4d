//! CLI Module
//!
//! Command-line interface for swift-voice using Clap v4.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;

pub use commands::load_config;
use commands::{cmd_config, cmd_init, cmd_serve};

/// Swift - stateless voice assistant service
#[derive(Parser, Debug)]
#[command(name = "swift-voice")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug mode (debug level, JSON logs in ~/.swift-voice/logs/)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Bind address, overrides config
        #[arg(short, long)]
        bind: Option<String>,

        /// Listen port, overrides config
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration
    Config {
        /// Show full configuration including secrets
        #[arg(short, long)]
        show_secrets: bool,
    },
}

/// Dispatch a parsed command line against a loaded configuration.
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    if cli.debug {
        tracing::info!("Debug mode enabled");
    }

    match cli.command {
        None => cmd_serve(config, None, None).await,
        Some(Commands::Serve { bind, port }) => cmd_serve(config, bind, port).await,
        Some(Commands::Init { force }) => cmd_init(force),
        Some(Commands::Config { show_secrets }) => cmd_config(&config, show_secrets),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::try_parse_from(["swift-voice"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_serve_overrides() {
        let cli =
            Cli::try_parse_from(["swift-voice", "serve", "--bind", "127.0.0.1", "-p", "8080"])
                .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Serve {
                bind: Some("127.0.0.1".to_string()),
                port: Some(8080),
            })
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "swift-voice",
            "config",
            "--show-secrets",
            "--debug",
            "--config",
            "/etc/swift.toml",
        ])
        .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config.as_deref(), Some("/etc/swift.toml"));
        assert_eq!(cli.command, Some(Commands::Config { show_secrets: true }));
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Cli::try_parse_from(["swift-voice", "serve", "--port", "99999"]).is_err());
    }
}
