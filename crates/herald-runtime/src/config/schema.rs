//! Configuration schema definitions.
//!
//! ```toml
//! [bot]
//! prefix = "!"
//! match_mode = "fan-out"      # or "first-match"
//! enforce_permissions = false
//! ignore_bots = false
//!
//! [logging]
//! level = "info"
//! format = "compact"          # compact | full | pretty | json
//! output = "stdout"           # stdout | stderr | file
//! file_path = "logs/herald.log"
//! rotation = "daily"          # never | minutely | hourly | daily
//!
//! [logging.filters]
//! herald_core = "debug"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use herald_framework::{BotOptions, MatchMode};
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeraldConfig {
    /// Bot settings.
    #[serde(default)]
    pub bot: BotSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// Bot Settings
// =============================================================================

/// Settings of the bot owned by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Command prefix.
    pub prefix: String,
    /// `fan-out` runs every matching command, `first-match` only the first.
    pub match_mode: MatchMode,
    /// Skip commands whose permission the author lacks.
    pub enforce_permissions: bool,
    /// Ignore messages written by bot accounts.
    pub ignore_bots: bool,
}

impl Default for BotSettings {
    fn default() -> Self {
        let options = BotOptions::default();
        Self {
            prefix: options.prefix,
            match_mode: options.match_mode,
            enforce_permissions: options.enforce_permissions,
            ignore_bots: options.ignore_bots,
        }
    }
}

impl BotSettings {
    /// Converts the settings into bot construction options.
    pub fn to_options(&self) -> BotOptions {
        BotOptions {
            prefix: self.prefix.clone(),
            match_mode: self.match_mode,
            enforce_permissions: self.enforce_permissions,
            ignore_bots: self.ignore_bots,
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base log level. `RUST_LOG` takes precedence when set.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Output destination.
    pub output: LogOutput,
    /// Log file, required when `output = "file"`.
    pub file_path: Option<PathBuf>,
    /// How often the log file rolls over.
    pub rotation: LogRotation,
    /// Span lifecycle events to log.
    pub span_events: SpanEventConfig,
    /// Include thread IDs.
    pub thread_ids: bool,
    /// Include source file and line.
    pub file_location: bool,
    /// Per-target level overrides, e.g. `herald_core = "debug"`.
    pub filters: BTreeMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            file_path: None,
            rotation: LogRotation::Never,
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            filters: BTreeMap::new(),
        }
    }
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Newline-delimited JSON. Requires the `json-log` feature.
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Log file rotation period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Minutely,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HeraldConfig::default();
        assert_eq!(config.bot.prefix, "!");
        assert_eq!(config.bot.match_mode, MatchMode::FanOut);
        assert!(!config.bot.enforce_permissions);
        assert!(!config.bot.ignore_bots);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_to_options() {
        let settings = BotSettings {
            prefix: "?".into(),
            match_mode: MatchMode::FirstMatch,
            enforce_permissions: true,
            ignore_bots: true,
        };
        let options = settings.to_options();
        assert_eq!(options.prefix, "?");
        assert_eq!(options.match_mode, MatchMode::FirstMatch);
        assert!(options.enforce_permissions);
        assert!(options.ignore_bots);
    }
}
