//! Configuration layer: typed settings with layered precedence (file → env).
//!
//! The data layer consumes configuration read-only: where the CMS lives,
//! where relative asset paths resolve to, and the default freshness windows.
//! Values come from `config/default.toml`, then `vitrine.toml`, then
//! `VITRINE__`-prefixed environment variables, later sources winning.

use std::str::FromStr;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vitrine";
const DEFAULT_API_BASE_URL: &str = "http://localhost:1337/api/";
const DEFAULT_ASSET_BASE_URL: &str = "http://localhost:1337/";
const DEFAULT_CACHE_ENABLED: bool = true;
const DEFAULT_CACHE_TIME_MS: u64 = 5 * 60 * 1000;
const DEFAULT_STALE_TIME_MS: u64 = 60 * 1000;
const DEFAULT_CACHE_MAX_ENTRIES: usize = 2048;

/// Fully validated settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

/// Where the CMS and its assets live.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Base URL collection endpoints join onto; always ends with `/`.
    pub base_url: Url,
    /// Base URL relative media paths resolve against; always ends with `/`.
    pub asset_base_url: Url,
    /// Default locale forwarded on every collection query, if any.
    pub locale: Option<String>,
}

/// Freshness windows and store capacity; mirrored into
/// [`crate::cache::CacheConfig`].
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub cache_time_ms: u64,
    pub stale_time_ms: u64,
    pub max_entries: usize,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment).
pub fn load() -> Result<Settings, LoadError> {
    let raw: RawSettings = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false))
        .add_source(Environment::with_prefix("VITRINE").separator("__"))
        .build()?
        .try_deserialize()?;

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    cache: RawCacheSettings,
    logging: RawLoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    asset_base_url: Option<String>,
    locale: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    cache_time_ms: Option<u64>,
    stale_time_ms: Option<u64>,
    max_entries: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            api,
            cache,
            logging,
        } = raw;

        let api = build_api_settings(api)?;
        let cache = build_cache_settings(cache)?;
        let logging = build_logging_settings(logging)?;

        Ok(Self {
            api,
            cache,
            logging,
        })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let base_url = parse_base_url(
        api.base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL),
        "api.base_url",
    )?;
    let asset_base_url = parse_base_url(
        api.asset_base_url
            .as_deref()
            .unwrap_or(DEFAULT_ASSET_BASE_URL),
        "api.asset_base_url",
    )?;

    let locale = api.locale.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    Ok(ApiSettings {
        base_url,
        asset_base_url,
        locale,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let enabled = cache.enabled.unwrap_or(DEFAULT_CACHE_ENABLED);
    let cache_time_ms = cache.cache_time_ms.unwrap_or(DEFAULT_CACHE_TIME_MS);
    let stale_time_ms = cache.stale_time_ms.unwrap_or(DEFAULT_STALE_TIME_MS);
    let max_entries = cache.max_entries.unwrap_or(DEFAULT_CACHE_MAX_ENTRIES);

    if cache_time_ms == 0 {
        return Err(LoadError::invalid(
            "cache.cache_time_ms",
            "must be greater than zero",
        ));
    }
    // Revalidation only makes sense before the hard cutoff.
    if stale_time_ms > cache_time_ms {
        return Err(LoadError::invalid(
            "cache.stale_time_ms",
            "must not exceed cache_time_ms",
        ));
    }

    Ok(CacheSettings {
        enabled,
        cache_time_ms,
        stale_time_ms,
        max_entries,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn parse_base_url(value: &str, key: &'static str) -> Result<Url, LoadError> {
    let mut url = Url::parse(value.trim())
        .map_err(|err| LoadError::invalid(key, format!("failed to parse: {err}")))?;

    // Url::join treats a base without a trailing slash as a file and replaces
    // its last segment; normalize so endpoint joins always extend the path.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_every_section() {
        let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

        assert_eq!(settings.api.base_url.as_str(), "http://localhost:1337/api/");
        assert_eq!(settings.api.asset_base_url.as_str(), "http://localhost:1337/");
        assert!(settings.api.locale.is_none());
        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.cache_time_ms, 300_000);
        assert_eq!(settings.cache.stale_time_ms, 60_000);
        assert_eq!(settings.logging.level, LevelFilter::INFO);
        assert!(matches!(settings.logging.format, LogFormat::Compact));
    }

    #[test]
    fn base_urls_gain_a_trailing_slash() {
        let mut raw = RawSettings::default();
        raw.api.base_url = Some("https://cms.example.org/api".to_string());

        let settings = Settings::from_raw(raw).expect("valid settings");
        assert_eq!(settings.api.base_url.as_str(), "https://cms.example.org/api/");
    }

    #[test]
    fn invalid_base_url_is_rejected_with_its_key() {
        let mut raw = RawSettings::default();
        raw.api.base_url = Some("not a url".to_string());

        let err = Settings::from_raw(raw).expect_err("invalid url rejected");
        assert!(matches!(
            err,
            LoadError::Invalid {
                key: "api.base_url",
                ..
            }
        ));
    }

    #[test]
    fn stale_window_may_not_exceed_hard_window() {
        let mut raw = RawSettings::default();
        raw.cache.cache_time_ms = Some(1000);
        raw.cache.stale_time_ms = Some(5000);

        let err = Settings::from_raw(raw).expect_err("incoherent windows rejected");
        assert!(matches!(
            err,
            LoadError::Invalid {
                key: "cache.stale_time_ms",
                ..
            }
        ));
    }

    #[test]
    fn zero_cache_time_is_rejected() {
        let mut raw = RawSettings::default();
        raw.cache.cache_time_ms = Some(0);
        raw.cache.stale_time_ms = Some(0);

        let err = Settings::from_raw(raw).expect_err("zero window rejected");
        assert!(matches!(
            err,
            LoadError::Invalid {
                key: "cache.cache_time_ms",
                ..
            }
        ));
    }

    #[test]
    fn logging_level_parses_and_json_toggles_format() {
        let mut raw = RawSettings::default();
        raw.logging.level = Some("debug".to_string());
        raw.logging.json = Some(true);

        let settings = Settings::from_raw(raw).expect("valid settings");
        assert_eq!(settings.logging.level, LevelFilter::DEBUG);
        assert!(matches!(settings.logging.format, LogFormat::Json));
    }

    #[test]
    fn blank_locale_collapses_to_none() {
        let mut raw = RawSettings::default();
        raw.api.locale = Some("  ".to_string());

        let settings = Settings::from_raw(raw).expect("valid settings");
        assert!(settings.api.locale.is_none());
    }
}
