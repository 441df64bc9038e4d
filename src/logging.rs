//! Logging setup
//!
//! Console output always. In debug mode, JSON lines also go to a daily
//! rotated file under the log directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "swift-voice.log";

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub debug_mode: bool,
    pub log_dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            level: "info".to_string(),
            debug_mode: false,
            log_dir: None,
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Debug mode forces `debug` level and enables file logging.
    pub fn with_debug_mode(mut self, debug: bool) -> Self {
        self.debug_mode = debug;
        self
    }

    pub fn with_log_dir(mut self, dir: PathBuf) -> Self {
        self.log_dir = Some(dir);
        self
    }

    pub fn effective_level(&self) -> &str {
        if self.debug_mode { "debug" } else { &self.level }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }

    /// `RUST_LOG` wins over the configured level.
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "swift_voice={level},tower_http={level},warn",
                level = self.effective_level()
            ))
        })
    }
}

/// `~/.swift-voice/logs`
pub fn default_log_dir() -> PathBuf {
    crate::config::swift_home().join("logs")
}

/// Install the global subscriber. Keep the returned guard alive for the
/// life of the process or buffered file lines are lost.
pub fn init_logging(config: LogConfig) -> Result<Option<WorkerGuard>> {
    let console = fmt::layer()
        .with_target(false)
        .with_filter(config.env_filter());

    if !config.debug_mode {
        tracing_subscriber::registry()
            .with(console)
            .try_init()
            .context("Failed to install log subscriber")?;
        return Ok(None);
    }

    let dir = config.log_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file = fmt::layer()
        .json()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(config.env_filter());

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .context("Failed to install log subscriber")?;

    tracing::debug!("Writing debug logs to {}", dir.display());
    Ok(Some(guard))
}

/// Remove rotated log files older than `days` from the directory
/// `init_logging` writes to for this `config`.
pub fn cleanup_old_logs(config: &LogConfig, days: u64) -> Result<usize> {
    cleanup_logs_in(&config.log_dir(), days)
}

pub fn cleanup_logs_in(dir: &Path, days: u64) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let max_age = Duration::from_secs(days * 24 * 60 * 60);
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX));
        if !is_log || !path.is_file() {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        let age = now.duration_since(modified).unwrap_or_default();
        if age > max_age {
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!("Failed to remove old log {}: {}", path.display(), e),
            }
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File, FileTimes};
    use tempfile::TempDir;

    fn backdate(path: &Path, days: u64) {
        let then = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
        let file = File::options().write(true).open(path).unwrap();
        file.set_times(FileTimes::new().set_modified(then)).unwrap();
    }

    #[test]
    fn test_log_config_builder() {
        let config = LogConfig::new()
            .with_level("warn")
            .with_log_dir(PathBuf::from("/tmp/swift-logs"));
        assert_eq!(config.effective_level(), "warn");
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/swift-logs"));

        let config = config.with_debug_mode(true);
        assert_eq!(config.effective_level(), "debug");
    }

    #[test]
    fn test_default_log_dir() {
        assert!(default_log_dir().ends_with(".swift-voice/logs"));
        assert_eq!(LogConfig::default().log_dir(), default_log_dir());
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = TempDir::new().unwrap();
        let removed = cleanup_logs_in(&dir.path().join("nope"), 7).unwrap();
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_cleanup_uses_configured_log_dir() {
        let dir = TempDir::new().unwrap();
        let old_log = dir.path().join("swift-voice.log.2026-08-30");
        fs::write(&old_log, "line\n").unwrap();
        backdate(&old_log, 45);

        let config = LogConfig::new()
            .with_debug_mode(true)
            .with_log_dir(dir.path().to_path_buf());
        let removed = cleanup_old_logs(&config, 7).unwrap();

        assert_eq!(removed, 1);
        assert!(!old_log.exists());
    }

    #[test]
    fn test_cleanup_removes_only_old_log_files() {
        let dir = TempDir::new().unwrap();

        let old_log = dir.path().join("swift-voice.log.2026-09-01");
        let fresh_log = dir.path().join("swift-voice.log.2026-10-18");
        let old_other = dir.path().join("notes.txt");
        for path in [&old_log, &fresh_log, &old_other] {
            fs::write(path, "line\n").unwrap();
        }
        backdate(&old_log, 30);
        backdate(&old_other, 30);
        backdate(&fresh_log, 1);

        let removed = cleanup_logs_in(dir.path(), 7).unwrap();

        assert_eq!(removed, 1);
        assert!(!old_log.exists());
        assert!(fresh_log.exists());
        assert!(old_other.exists());
    }
}
