//! Content-addressed media fetcher
//!
//! Auxiliary binary assets (page images, mostly) are cached under a
//! filename derived from the SHA-256 of their URL string, so a second
//! reference to the same URL never downloads again. Bodies are streamed to
//! disk chunk by chunk. Every failure is swallowed after logging; a missing
//! image never fails the page that referenced it.

use crate::client::RetryClient;
use crate::TransportError;
use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Downloads `url` into `media_dir`, returning the cached file path.
///
/// Idempotent: an existing file under the content-addressed name
/// short-circuits without any network call. Returns `None` on any failure.
pub async fn fetch_media(client: &RetryClient, url: &str, media_dir: &Path) -> Option<PathBuf> {
    let path = media_dir.join(media_filename(url));

    if path.exists() {
        return Some(path);
    }

    match download(client, url, media_dir, &path).await {
        Ok(()) => Some(path),
        Err(e) => {
            tracing::warn!("Media download failed for {}: {}", url, e);
            None
        }
    }
}

async fn download(
    client: &RetryClient,
    url: &str,
    media_dir: &Path,
    path: &Path,
) -> crate::Result<()> {
    fs::create_dir_all(media_dir).await?;

    let response = client.get(url).await?;

    if let Err(e) = write_stream(response, url, path).await {
        // Do not leave a partial file behind under the cache name
        let _ = fs::remove_file(path).await;
        return Err(e);
    }

    Ok(())
}

async fn write_stream(response: reqwest::Response, url: &str, path: &Path) -> crate::Result<()> {
    let mut file = fs::File::create(path).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(|e| TransportError::Body {
            url: url.to_string(),
            source: e,
        })?;
        file.write_all(&bytes).await?;
    }

    file.flush().await?;
    Ok(())
}

/// Hash of the URL string, plus the original extension when plausible
fn media_filename(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let hash = hex::encode(hasher.finalize());
    format!("{}{}", hash, extension_of(url))
}

/// Returns the `.ext` suffix when the URL path ends in a plausible file
/// extension: at most 5 characters including the dot, ASCII alphanumeric
fn extension_of(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);

    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 4
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!(".{}", ext)
        }
        _ => String::new(),
    }
}
