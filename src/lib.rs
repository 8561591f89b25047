//! Wikivault: a legacy-wiki to Obsidian vault exporter
//!
//! This crate crawls a paginated Seesaa-style wiki, builds a title/URL index,
//! fetches each page, converts its HTML body to markdown, rewrites internal
//! wiki links into `[[Title]]` cross-references, and writes one file per page.
//!
//! The wiki addresses its pages with EUC-JP percent-encoded path segments, so
//! all URL identity goes through the [`url::codec`] module: every reference to
//! a page, however it is spelled, decodes to the same canonical key.

pub mod client;
pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Wikivault operations
#[derive(Debug, Error)]
pub enum WikivaultError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Content container not found in {url}")]
    ContentNotFound { url: String },

    #[error("Markdown conversion failed for {url}: {message}")]
    Convert { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// These are the only errors fatal to the process; everything else is
/// logged per item and the run continues.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BASE_URL is not set (environment variable or --base-url)")]
    MissingBaseUrl,

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Transport-level errors from the retrying HTTP client
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

/// Result type alias for Wikivault operations
pub type Result<T> = std::result::Result<T, WikivaultError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

// Re-export commonly used types
pub use client::RetryClient;
pub use config::Config;
pub use crawler::{crawl_index, fetch_and_save, PageMap, SaveOutcome};
