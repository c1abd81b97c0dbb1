//! Server configuration loaded via OrthoConfig.
//!
//! Values layer CLI flags over `PORTAL_*` environment variables over a
//! config file. Tuning knobs carry literal defaults so an empty environment
//! still yields a usable configuration; accessors apply the rest.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::outbound::asset_cache::{
    AssetCacheConfig, DEFAULT_CAPACITY_BYTES, DEFAULT_MAX_CONCURRENT_REQUESTS,
    DEFAULT_ORIGIN_TIMEOUT,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings values that parse but make no sense.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("bind_addr `{value}` is not a socket address")]
    BindAddr { value: String },
    #[error("cdn_origin_url `{value}` is not a valid URL: {message}")]
    OriginUrl { value: String, message: String },
    #[error("cdn_max_concurrent_requests must be at least 1")]
    ZeroConcurrency,
}

/// Configuration for the `emote-portal` server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalSettings {
    /// Listen address, `0.0.0.0:8080` when unset.
    pub bind_addr: Option<String>,
    /// JSON catalogue seed; the catalogue starts empty without one.
    pub seed_path: Option<PathBuf>,
    /// Base URL of the asset origin; the CDN answers 503 without one.
    pub cdn_origin_url: Option<String>,
    /// Cache capacity in body bytes; `0` disables the bound.
    pub cdn_cache_capacity_bytes: Option<u64>,
    #[ortho_config(default = 5)]
    pub cdn_origin_timeout_secs: u64,
    #[ortho_config(default = 64)]
    pub cdn_max_concurrent_requests: usize,
    /// Bearer token for `DELETE /cdn/{key}`; purging is disabled when unset.
    pub cdn_purge_token: Option<String>,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            seed_path: None,
            cdn_origin_url: None,
            cdn_cache_capacity_bytes: None,
            cdn_origin_timeout_secs: DEFAULT_ORIGIN_TIMEOUT.as_secs(),
            cdn_max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            cdn_purge_token: None,
        }
    }
}

impl PortalSettings {
    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the configured value does not
    /// parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim().parse().map_err(|_| SettingsError::BindAddr {
            value: raw.to_owned(),
        })
    }

    /// Origin base URL, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::OriginUrl`] for malformed URLs.
    pub fn cdn_origin_url(&self) -> Result<Option<Url>, SettingsError> {
        self.cdn_origin_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|err| SettingsError::OriginUrl {
                    value: raw.to_owned(),
                    message: err.to_string(),
                })
            })
            .transpose()
    }

    /// Per-request origin timeout.
    pub fn cdn_origin_timeout(&self) -> Duration {
        Duration::from_secs(self.cdn_origin_timeout_secs)
    }

    /// Asset cache tuning.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroConcurrency`] when no origin request
    /// could ever run.
    pub fn cache_config(&self) -> Result<AssetCacheConfig, SettingsError> {
        let max_concurrent_requests = self.cdn_max_concurrent_requests;
        if max_concurrent_requests == 0 {
            return Err(SettingsError::ZeroConcurrency);
        }
        Ok(AssetCacheConfig {
            capacity_bytes: self
                .cdn_cache_capacity_bytes
                .unwrap_or(DEFAULT_CAPACITY_BYTES),
            origin_timeout: self.cdn_origin_timeout(),
            max_concurrent_requests,
        })
    }

    /// Purge token with surrounding whitespace removed; blank counts as
    /// unset.
    pub fn cdn_purge_token(&self) -> Option<&str> {
        self.cdn_purge_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "PORTAL_BIND_ADDR",
        "PORTAL_SEED_PATH",
        "PORTAL_CDN_ORIGIN_URL",
        "PORTAL_CDN_CACHE_CAPACITY_BYTES",
        "PORTAL_CDN_ORIGIN_TIMEOUT_SECS",
        "PORTAL_CDN_MAX_CONCURRENT_REQUESTS",
        "PORTAL_CDN_PURGE_TOKEN",
    ];

    fn load_from_empty_args() -> PortalSettings {
        PortalSettings::load_from_iter([OsString::from("emote-portal")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr(),
            Ok(DEFAULT_BIND_ADDR.parse().expect("valid default"))
        );
        assert!(settings.seed_path.is_none());
        assert_eq!(settings.cdn_origin_url(), Ok(None));
        assert_eq!(settings.cache_config(), Ok(AssetCacheConfig::default()));
        assert_eq!(settings.cdn_purge_token(), None);
    }

    #[rstest]
    fn literal_defaults_match_the_cache_defaults() {
        let defaults = PortalSettings::default();
        assert_eq!(defaults.cache_config(), Ok(AssetCacheConfig::default()));
        assert_eq!(defaults.cdn_origin_timeout(), DEFAULT_ORIGIN_TIMEOUT);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("PORTAL_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("PORTAL_SEED_PATH", Some("/srv/portal/seed.json".to_owned())),
            (
                "PORTAL_CDN_ORIGIN_URL",
                Some("https://objects.example/cdn".to_owned()),
            ),
            ("PORTAL_CDN_CACHE_CAPACITY_BYTES", Some("0".to_owned())),
            ("PORTAL_CDN_ORIGIN_TIMEOUT_SECS", Some("2".to_owned())),
            ("PORTAL_CDN_MAX_CONCURRENT_REQUESTS", Some("8".to_owned())),
            ("PORTAL_CDN_PURGE_TOKEN", Some(" s3cret ".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr(),
            Ok("127.0.0.1:9000".parse().expect("valid addr"))
        );
        assert_eq!(
            settings.seed_path,
            Some(PathBuf::from("/srv/portal/seed.json"))
        );
        assert_eq!(
            settings
                .cdn_origin_url()
                .expect("valid url")
                .map(|url| url.to_string()),
            Some("https://objects.example/cdn".to_owned())
        );
        assert_eq!(
            settings.cache_config(),
            Ok(AssetCacheConfig {
                capacity_bytes: 0,
                origin_timeout: Duration::from_secs(2),
                max_concurrent_requests: 8,
            })
        );
        assert_eq!(settings.cdn_purge_token(), Some("s3cret"));
    }

    #[rstest]
    #[case(Some("localhost"), None, None)]
    #[case(None, Some("not a url"), None)]
    #[case(None, None, Some(0))]
    fn nonsensical_values_are_rejected(
        #[case] bind_addr: Option<&str>,
        #[case] origin: Option<&str>,
        #[case] concurrency: Option<usize>,
    ) {
        let settings = PortalSettings {
            bind_addr: bind_addr.map(str::to_owned),
            cdn_origin_url: origin.map(str::to_owned),
            cdn_max_concurrent_requests: concurrency.unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS),
            ..PortalSettings::default()
        };
        let failed = settings.bind_addr().is_err()
            || settings.cdn_origin_url().is_err()
            || settings.cache_config().is_err();
        assert!(failed);
    }

    #[rstest]
    #[case(Some("   "), None)]
    #[case(None, None)]
    #[case(Some("token"), Some("token"))]
    fn blank_purge_tokens_disable_purging(
        #[case] raw: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let settings = PortalSettings {
            cdn_purge_token: raw.map(str::to_owned),
            ..PortalSettings::default()
        };
        assert_eq!(settings.cdn_purge_token(), expected);
    }
}
