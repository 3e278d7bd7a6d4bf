//! logging
//!
//! Diagnostic logging through `tracing` and `tracing-subscriber`.
//!
//! # Log Levels
//!
//! - `error`: failures reported to the user
//! - `warn`: recoverable fallbacks (unreadable manifest, failed revocation)
//! - `info`: remote operations and their outcome
//! - `debug`: collection mutations
//!
//! Logs go to stderr and are separate from command output. The default level
//! is `warn`; `--debug` raises it to `debug` and `--quiet` lowers it to
//! `error`. `GALLERIST_LOG` takes an `EnvFilter` directive and overrides
//! both.
//!
//! Tokens and password hashes are never logged.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a filter directive.
pub const LOG_ENV_VAR: &str = "GALLERIST_LOG";

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level used when no directive is set in the environment.
    pub level: Level,
    /// Whether to include the module path in log lines.
    pub with_target: bool,
    /// Whether to use ANSI colors.
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_target: false,
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// Configuration for the global CLI flags.
    #[must_use]
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        let level = if debug {
            Level::DEBUG
        } else if quiet {
            Level::ERROR
        } else {
            Level::WARN
        };
        Self {
            level,
            with_target: debug,
            ..Default::default()
        }
    }
}

/// Filter from `GALLERIST_LOG`, falling back to `level` for this crate.
pub fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| default_filter(level))
}

fn default_filter(level: Level) -> EnvFilter {
    let level = level.to_string().to_lowercase();
    EnvFilter::new(format!("warn,gallerist={}", level))
}

/// Install the global subscriber.
///
/// Calling it again is harmless: the first subscriber stays in place.
pub fn init(config: &LogConfig) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target)
        .without_time();

    let result = tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .try_init();
    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_select_level() {
        assert_eq!(LogConfig::from_flags(false, false).level, Level::WARN);
        assert_eq!(LogConfig::from_flags(true, false).level, Level::ERROR);
        assert_eq!(LogConfig::from_flags(false, true).level, Level::DEBUG);
        assert_eq!(LogConfig::from_flags(true, true).level, Level::DEBUG);
    }

    #[test]
    fn debug_shows_targets() {
        assert!(LogConfig::from_flags(false, true).with_target);
        assert!(!LogConfig::default().with_target);
    }

    #[test]
    fn default_filter_scopes_crate() {
        let filter = default_filter(Level::DEBUG);
        let text = filter.to_string();
        assert!(text.contains("gallerist=debug"));
        assert!(text.contains("warn"));
    }

    #[test]
    fn init_twice_is_harmless() {
        init(&LogConfig::default());
        init(&LogConfig::default());
    }
}
