//! Run configuration
//!
//! Configuration is env-style (`BASE_URL`, `OUTPUT_DIR`, `SLEEP_TIME`,
//! `TIMEOUT`, `SKIP_EXISTING`, `FETCH_MEDIA`), optionally seeded from a
//! `.env` file, with CLI flags taking precedence. Everything is loaded once
//! into an immutable [`Config`] that is passed by reference to all
//! components; there is no ambient global lookup after startup.
//!
//! Only a missing or invalid `BASE_URL` is fatal to the process.

use crate::{ConfigError, ConfigResult};
use std::path::PathBuf;
use std::str::FromStr;
use ::url::Url;
use std::time::Duration;

/// Immutable configuration for one crawl run
#[derive(Debug, Clone)]
pub struct Config {
    /// Site base URL without trailing slash, e.g. `https://seesaawiki.jp/mywiki`
    pub base_url: String,

    /// Scheme and host (and port) of the site, for resolving relative links
    pub origin: String,

    /// Directory the markdown files are written to
    pub output_dir: PathBuf,

    /// Politeness delay between page fetches
    pub delay: Duration,

    /// Per-request timeout
    pub timeout: Duration,

    /// Skip pages whose output file already exists
    pub skip_existing: bool,

    /// Download referenced media into a content-addressed cache
    pub fetch_media: bool,
}

/// CLI-provided values that override the environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub delay: Option<f64>,
    pub timeout: Option<u64>,
    pub skip_existing: bool,
    pub fetch_media: bool,
}

impl Config {
    /// Loads and validates the configuration from the environment, with
    /// `overrides` taking precedence.
    pub fn load(overrides: &Overrides) -> ConfigResult<Config> {
        let base_url = overrides
            .base_url
            .clone()
            .or_else(|| env_var("BASE_URL"))
            .ok_or(ConfigError::MissingBaseUrl)?;
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }

        let origin = origin_of(&base_url)?;

        let output_dir = overrides
            .output_dir
            .clone()
            .or_else(|| env_var("OUTPUT_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("output"));

        let delay_secs: f64 = match overrides.delay {
            Some(value) => value,
            None => parse_env("SLEEP_TIME", 1.0)?,
        };
        if !delay_secs.is_finite() || delay_secs < 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "SLEEP_TIME",
                value: delay_secs.to_string(),
            });
        }

        let timeout_secs: u64 = match overrides.timeout {
            Some(value) => value,
            None => parse_env("TIMEOUT", 10)?,
        };

        let skip_existing = overrides.skip_existing || env_flag("SKIP_EXISTING");
        let fetch_media = overrides.fetch_media || env_flag("FETCH_MEDIA");

        Ok(Config {
            base_url,
            origin,
            output_dir,
            delay: Duration::from_secs_f64(delay_secs),
            timeout: Duration::from_secs(timeout_secs),
            skip_existing,
            fetch_media,
        })
    }

    /// URL of the first paginated listing page
    pub fn list_url(&self) -> String {
        format!("{}/l/", self.base_url)
    }

    /// Prefix every page-detail URL starts with
    pub fn detail_prefix(&self) -> String {
        format!("{}/d/", self.base_url)
    }

    /// Canonical fetch URL for an already-encoded page path segment
    pub fn detail_url(&self, encoded_title: &str) -> String {
        format!("{}/d/{}", self.base_url, encoded_title)
    }

    /// Directory media downloads are cached in
    pub fn media_dir(&self) -> PathBuf {
        self.output_dir.join("media")
    }
}

/// Validates the base URL and derives its origin (`scheme://host[:port]`)
fn origin_of(base_url: &str) -> ConfigResult<String> {
    let url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    let host = url.host_str().ok_or_else(|| ConfigError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: "missing host".to_string(),
    })?;

    let mut origin = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        origin.push_str(&format!(":{}", port));
    }
    Ok(origin)
}

/// Reads an environment variable, treating empty values as unset
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parses an environment variable, falling back to `default` when unset
fn parse_env<T: FromStr>(name: &'static str, default: T) -> ConfigResult<T> {
    match env_var(name) {
        Some(value) => {
            let parsed = value.trim().parse();
            parsed.map_err(|_| ConfigError::InvalidValue { name, value })
        }
        None => Ok(default),
    }
}

/// Boolean env flag: `true`/`True` enable, everything else (and unset) is off
fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
