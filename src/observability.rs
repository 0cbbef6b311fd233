//! Logging setup and the server's lifecycle events.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

const COMPONENT: &str = "dashboard_server";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `lhb_dashboard=debug`.
    pub level: String,
    pub format: LogFormat,
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Unparseable `LHB_LOG_FORMAT` / `LHB_LOG_TARGET` values keep the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            level: lookup("LHB_LOG_LEVEL")
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
                .unwrap_or(defaults.level),
            format: lookup("LHB_LOG_FORMAT")
                .and_then(|raw| parse_log_format(&raw))
                .unwrap_or(defaults.format),
            include_target: lookup("LHB_LOG_TARGET")
                .and_then(|raw| parse_bool(&raw))
                .unwrap_or(defaults.include_target),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingInitError {
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

pub fn logging_config_from_env() -> LoggingConfig {
    LoggingConfig::from_lookup(|key| env::var(key).ok())
}

pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    let env_filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(config.include_target)
        .with_ansi(config.format == LogFormat::Pretty);

    match config.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish())?,
    }

    Ok(())
}

pub fn log_app_start(config: &LoggingConfig) {
    info!(
        component = COMPONENT,
        event = "app.start",
        log_level = %config.level,
        log_format = ?config.format,
        include_target = config.include_target
    );
}

pub fn log_source_selected(kind: &str, location: &str, trend_days: usize) {
    info!(
        component = COMPONENT,
        event = "source.selected",
        source = kind,
        location,
        trend_days
    );
}

pub fn log_init_finished(outcome: &str) {
    info!(component = COMPONENT, event = "app.init", outcome);
}

pub fn log_app_bind(bound_addr: SocketAddr) {
    info!(
        component = COMPONENT,
        event = "app.bind",
        bind_addr = %bound_addr,
        route = "/dashboard"
    );
}

fn parse_log_format(raw: &str) -> Option<LogFormat> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "json" => Some(LogFormat::Json),
        "pretty" => Some(LogFormat::Pretty),
        _ => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> LoggingConfig {
        LoggingConfig::from_lookup(|key| {
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        })
    }

    #[test]
    fn defaults_when_vars_missing() {
        assert_eq!(config_from(&[]), LoggingConfig::default());
    }

    #[test]
    fn parses_json_level_and_target() {
        let cfg = config_from(&[
            ("LHB_LOG_LEVEL", "lhb_dashboard=debug"),
            ("LHB_LOG_FORMAT", "JSON"),
            ("LHB_LOG_TARGET", "off"),
        ]);

        assert_eq!(cfg.level, "lhb_dashboard=debug");
        assert_eq!(cfg.format, LogFormat::Json);
        assert!(!cfg.include_target);
    }

    #[test]
    fn invalid_format_or_target_falls_back_to_defaults() {
        let cfg = config_from(&[
            ("LHB_LOG_LEVEL", "  "),
            ("LHB_LOG_FORMAT", "yaml"),
            ("LHB_LOG_TARGET", "maybe"),
        ]);

        assert_eq!(cfg, LoggingConfig::default());
    }
}
