use std::{fs, path::Path, str::FromStr, time::Duration};

use shared::locale::Locale;
use thiserror::Error;
use tracing::warn;

use crate::{search::{DEFAULT_SEARCH_TIMEOUT, MOCK_LATENCY}, timing::DEFAULT_FADE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    /// Downward scrolling past this offset hides the header.
    pub header_hide_threshold: i64,
    /// The header carries the `scrolled` class above this offset.
    pub scrolled_threshold: i64,
    /// The back-to-top button shows above this offset.
    pub back_to_top_threshold: i64,
    pub fade_duration: Duration,
    pub search_latency: Duration,
    pub search_timeout: Duration,
    pub search_endpoint: Option<String>,
    pub locale: Locale,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            header_hide_threshold: 100,
            scrolled_threshold: 50,
            back_to_top_threshold: 300,
            fade_duration: DEFAULT_FADE,
            search_latency: MOCK_LATENCY,
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
            search_endpoint: None,
            locale: Locale::default(),
        }
    }
}

/// Defaults, then the optional TOML file, then `PAGE__*` environment overrides.
pub fn load_settings(path: Option<&Path>) -> Result<ControllerSettings, ConfigError> {
    let mut settings = ControllerSettings::default();

    if let Some(path) = path {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let table: toml::Table = raw.parse().map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        apply_file(&mut settings, &table);
    }

    apply_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut ControllerSettings, table: &toml::Table) {
    for (key, value) in table {
        let raw = match value {
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(i) => i.to_string(),
            other => {
                warn!(key = %key, value = %other, "ignoring settings value of unsupported type");
                continue;
            }
        };
        if !apply_value(settings, key, &raw) {
            warn!(key = %key, "ignoring unknown or invalid settings key");
        }
    }
}

/// Applies `PAGE__<KEY>` overrides read through `lookup`.
pub fn apply_overrides(settings: &mut ControllerSettings, lookup: impl Fn(&str) -> Option<String>) {
    for key in KEYS {
        let var = format!("PAGE__{}", key.to_ascii_uppercase());
        if let Some(raw) = lookup(&var) {
            if !apply_value(settings, key, &raw) {
                warn!(var = %var, value = %raw, "ignoring invalid environment override");
            }
        }
    }
}

const KEYS: [&str; 8] = [
    "header_hide_threshold",
    "scrolled_threshold",
    "back_to_top_threshold",
    "fade_ms",
    "search_latency_ms",
    "search_timeout_secs",
    "search_endpoint",
    "locale",
];

fn apply_value(settings: &mut ControllerSettings, key: &str, raw: &str) -> bool {
    let raw = raw.trim();
    match key {
        "header_hide_threshold" => set_parsed(&mut settings.header_hide_threshold, raw),
        "scrolled_threshold" => set_parsed(&mut settings.scrolled_threshold, raw),
        "back_to_top_threshold" => set_parsed(&mut settings.back_to_top_threshold, raw),
        "fade_ms" => set_duration(&mut settings.fade_duration, raw, Duration::from_millis),
        "search_latency_ms" => {
            set_duration(&mut settings.search_latency, raw, Duration::from_millis)
        }
        "search_timeout_secs" => {
            set_duration(&mut settings.search_timeout, raw, Duration::from_secs)
        }
        "search_endpoint" => {
            settings.search_endpoint = (!raw.is_empty()).then(|| raw.to_string());
            true
        }
        "locale" => set_parsed(&mut settings.locale, raw),
        _ => false,
    }
}

fn set_parsed<T: FromStr>(slot: &mut T, raw: &str) -> bool {
    match raw.parse::<T>() {
        Ok(v) => {
            *slot = v;
            true
        }
        Err(_) => false,
    }
}

fn set_duration(slot: &mut Duration, raw: &str, unit: fn(u64) -> Duration) -> bool {
    match raw.parse::<u64>() {
        Ok(v) => {
            *slot = unit(v);
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
