//! Server configuration read from `LHB_*` environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::error::DashboardError;
use crate::source::{DashboardDataSource, DirDataSource, HttpDataSource};
use crate::sparkline::TREND_DAYS;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_DATA_DIR: &str = "site/data";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLocation {
    Http(String),
    Dir(PathBuf),
}

impl DataLocation {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Dir(_) => "dir",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Http(url) => url.clone(),
            Self::Dir(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub bind_addr: SocketAddr,
    pub data: DataLocation,
    pub trend_days: usize,
    pub http_timeout_ms: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// `LHB_DATA_URL` wins over `LHB_DATA_DIR`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let raw_addr = get("LHB_DASHBOARD_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse()
            .map_err(|err: std::net::AddrParseError| ConfigError::InvalidValue {
                key: "LHB_DASHBOARD_ADDR",
                value: raw_addr.clone(),
                reason: err.to_string(),
            })?;

        let data = match (get("LHB_DATA_URL"), get("LHB_DATA_DIR")) {
            (Some(url), _) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::InvalidValue {
                        key: "LHB_DATA_URL",
                        value: url,
                        reason: "expected an http:// or https:// URL".to_string(),
                    });
                }
                DataLocation::Http(url)
            }
            (None, Some(dir)) => DataLocation::Dir(PathBuf::from(dir)),
            (None, None) => DataLocation::Dir(PathBuf::from(DEFAULT_DATA_DIR)),
        };

        let trend_days = match get("LHB_TREND_DAYS") {
            Some(raw) => parse_positive("LHB_TREND_DAYS", &raw)? as usize,
            None => TREND_DAYS,
        };
        let http_timeout_ms = match get("LHB_HTTP_TIMEOUT_MS") {
            Some(raw) => parse_positive("LHB_HTTP_TIMEOUT_MS", &raw)?,
            None => DEFAULT_HTTP_TIMEOUT_MS,
        };

        Ok(Self {
            bind_addr,
            data,
            trend_days,
            http_timeout_ms,
        })
    }

    pub fn build_source(&self) -> Result<Arc<dyn DashboardDataSource>, DashboardError> {
        let source: Arc<dyn DashboardDataSource> = match &self.data {
            DataLocation::Http(url) => {
                Arc::new(HttpDataSource::new(url.clone(), self.http_timeout_ms)?)
            }
            DataLocation::Dir(path) => Arc::new(DirDataSource::new(path.clone())),
        };
        Ok(source)
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(value) if value >= 1 => Ok(value),
        Ok(_) => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "must be at least 1".to_string(),
        }),
        Err(err) => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<DashboardConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = config_from(&[]).expect("defaults should be valid");
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.data, DataLocation::Dir(PathBuf::from(DEFAULT_DATA_DIR)));
        assert_eq!(cfg.trend_days, TREND_DAYS);
        assert_eq!(cfg.http_timeout_ms, DEFAULT_HTTP_TIMEOUT_MS);
    }

    #[test]
    fn data_url_takes_precedence_over_dir() {
        let cfg = config_from(&[
            ("LHB_DATA_URL", "https://example.org/data"),
            ("LHB_DATA_DIR", "/srv/data"),
            ("LHB_TREND_DAYS", "30"),
        ])
        .expect("config should parse");
        assert_eq!(cfg.data, DataLocation::Http("https://example.org/data".to_string()));
        assert_eq!(cfg.data.kind(), "http");
        assert_eq!(cfg.trend_days, 30);
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let cfg = config_from(&[("LHB_DATA_URL", "  "), ("LHB_DATA_DIR", "/srv/data")])
            .expect("config should parse");
        assert_eq!(cfg.data, DataLocation::Dir(PathBuf::from("/srv/data")));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[("LHB_TREND_DAYS", "0")]),
            Err(ConfigError::InvalidValue { key: "LHB_TREND_DAYS", .. })
        ));
        assert!(matches!(
            config_from(&[("LHB_DASHBOARD_ADDR", "not-an-addr")]),
            Err(ConfigError::InvalidValue { key: "LHB_DASHBOARD_ADDR", .. })
        ));
        assert!(matches!(
            config_from(&[("LHB_DATA_URL", "ftp://example.org")]),
            Err(ConfigError::InvalidValue { key: "LHB_DATA_URL", .. })
        ));
    }
}
