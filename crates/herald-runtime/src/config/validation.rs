//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{BotSettings, HeraldConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &HeraldConfig) -> ConfigResult<()> {
    validate_bot_settings(&config.bot)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates bot settings.
fn validate_bot_settings(bot: &BotSettings) -> ConfigResult<()> {
    validate_prefix(&bot.prefix)
}

/// Validates a command prefix.
///
/// Messages are split on spaces before the prefix is checked, so a prefix
/// containing a space could never match.
pub fn validate_prefix(prefix: &str) -> ConfigResult<()> {
    if prefix.is_empty() {
        return Err(ConfigError::validation("bot.prefix must not be empty"));
    }

    if prefix.contains(' ') {
        return Err(ConfigError::validation(format!(
            "bot.prefix must not contain spaces: {prefix:?}"
        )));
    }

    Ok(())
}

/// Validates logging configuration.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is \"file\"",
        ));
    }

    if let Some(target) = logging.filters.keys().find(|target| target.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "logging.filters contains an empty target: {target:?}"
        )));
    }

    Ok(())
}
