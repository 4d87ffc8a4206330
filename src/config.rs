use std::collections::HashMap;
use thiserror::Error;

use crate::domain::Platform;
use crate::engine::AlertSettings;

/// Saved calculations kept in local history.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
/// Custom fee presets kept in local storage.
pub const DEFAULT_PRESET_LIMIT: usize = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub default_platform: Platform,
    pub history_limit: usize,
    pub preset_limit: usize,
    pub alerts: AlertSettings,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: "data/seller-margin.db".to_string(),
            default_platform: Platform::SmartStore,
            history_limit: DEFAULT_HISTORY_LIMIT,
            preset_limit: DEFAULT_PRESET_LIMIT,
            alerts: AlertSettings::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let database_path = env_map
            .get("MARGIN_DB_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.database_path);

        let default_platform = match env_map.get("DEFAULT_PLATFORM") {
            Some(s) => s.parse::<Platform>().map_err(|e| {
                ConfigError::InvalidValue("DEFAULT_PLATFORM".to_string(), e.to_string())
            })?,
            None => defaults.default_platform,
        };

        let history_limit = parse_limit(&env_map, "HISTORY_LIMIT", defaults.history_limit)?;
        let preset_limit = parse_limit(&env_map, "PRESET_LIMIT", defaults.preset_limit)?;

        let min_margin_rate = parse_percent(
            &env_map,
            "ALERT_MIN_MARGIN_RATE",
            defaults.alerts.min_margin_rate,
        )?;
        let max_fee_rate =
            parse_percent(&env_map, "ALERT_MAX_FEE_RATE", defaults.alerts.max_fee_rate)?;

        let enable_alerts = match env_map
            .get("ALERTS_ENABLED")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
        {
            None => defaults.alerts.enable_alerts,
            Some("true") | Some("1") | Some("yes") => true,
            Some("false") | Some("0") | Some("no") => false,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "ALERTS_ENABLED".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        Ok(Config {
            database_path,
            default_platform,
            history_limit,
            preset_limit,
            alerts: AlertSettings {
                min_margin_rate,
                max_fee_rate,
                enable_alerts,
            },
        })
    }
}

fn parse_limit(
    env_map: &HashMap<String, String>,
    key: &str,
    default: usize,
) -> Result<usize, ConfigError> {
    let Some(raw) = env_map.get(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be a positive integer".to_string(),
        )),
    }
}

fn parse_percent(
    env_map: &HashMap<String, String>,
    key: &str,
    default: f64,
) -> Result<f64, ConfigError> {
    let Some(raw) = env_map.get(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && (0.0..=100.0).contains(&v) => Ok(v),
        _ => Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be a percentage between 0 and 100".to_string(),
        )),
    }
}
