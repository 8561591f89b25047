//! Retrying HTTP transport
//!
//! All network traffic goes through [`RetryClient`]: one pooled
//! `reqwest::Client` shared across the whole run, a uniform per-request
//! timeout, and a bounded exponential-backoff retry policy.
//!
//! Retry policy:
//! - up to 5 attempts total
//! - retried on connection-level failures and on HTTP 500/502/503/504
//! - backoff of 1s, 2s, 4s, 8s before the 2nd..5th attempt
//! - any other non-success status fails immediately
//!
//! Body text is decoded honoring the response's declared or sniffed
//! charset. The legacy EUC-JP URL codec is never applied to bodies; only
//! URL path segments use it.

use crate::{TransportError, TransportResult};
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::time::Duration;

/// HTTP status codes retried with backoff
const RETRY_STATUS: &[u16] = &[500, 502, 503, 504];

/// Total attempts per request (one initial try plus four retries)
const MAX_ATTEMPTS: u32 = 5;

/// Shared HTTP client with bounded-retry semantics
#[derive(Debug, Clone)]
pub struct RetryClient {
    client: Client,
    max_attempts: u32,
}

impl RetryClient {
    /// Builds a client with the given per-request timeout.
    ///
    /// The underlying `reqwest::Client` carries the connection pool, so one
    /// `RetryClient` should be created per run and shared by reference.
    pub fn new(timeout: Duration) -> TransportResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("wikivault/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            client,
            max_attempts: MAX_ATTEMPTS,
        })
    }

    /// Sends a GET request, retrying transient failures with backoff.
    ///
    /// Returns the successful response without consuming its body, so
    /// callers can stream it (the media fetcher) or decode it as text.
    pub async fn get(&self, url: &str) -> TransportResult<Response> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                let delay = Duration::from_secs(1u64 << (attempt - 2));
                tracing::debug!(
                    "Retrying {} in {:?} (attempt {}/{}): {}",
                    url,
                    delay,
                    attempt,
                    self.max_attempts,
                    last_error
                );
                tokio::time::sleep(delay).await;
            }

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if RETRY_STATUS.contains(&status.as_u16()) {
                        last_error = format!("HTTP {}", status);
                        continue;
                    }

                    if !status.is_success() {
                        return Err(TransportError::Status {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }

                    return Ok(response);
                }
                // Connection-level failure (refused, timeout, TLS, ...)
                Err(e) => {
                    last_error = e.to_string();
                }
            }
        }

        Err(TransportError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.max_attempts,
            last_error,
        })
    }

    /// Fetches a URL and decodes the body as text.
    ///
    /// The charset is taken from the Content-Type header when present,
    /// otherwise sniffed from a `charset=` declaration in the first
    /// kilobyte of the body, otherwise assumed UTF-8.
    pub async fn get_text(&self, url: &str) -> TransportResult<String> {
        let response = self.get(url).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body {
                url: url.to_string(),
                source: e,
            })?;

        Ok(decode_body(&body, content_type.as_deref()))
    }
}

/// Decodes a response body honoring its declared or sniffed charset
fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    if let Some(label) = content_type.and_then(charset_from_content_type) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            return encoding.decode(bytes).0.into_owned();
        }
        tracing::debug!("Unknown charset label '{}', sniffing body", label);
    }

    if let Some(encoding) = sniff_meta_charset(bytes) {
        return encoding.decode(bytes).0.into_owned();
    }

    UTF_8.decode(bytes).0.into_owned()
}

/// Extracts the charset parameter from a Content-Type header value
fn charset_from_content_type(value: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

/// Looks for a `charset=` declaration in the first kilobyte of the body.
///
/// Charset labels are ASCII, so the lossy conversion cannot corrupt the
/// token we are after.
fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(1024)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let pos = head.find("charset=")?;
    let rest = &head[pos + "charset=".len()..];
    let label: String = rest
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    Encoding::for_label(label.as_bytes())
}
