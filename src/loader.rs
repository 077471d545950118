//! Image sources and the async loader that turns them into decoded handles.
//!
//! Three kinds of source are understood: local file paths, `http(s)://`
//! URLs, and inline `data:` URLs. Remote fetches go through a shared
//! `reqwest` client with no cookie store and no credentials. Decoding runs
//! on the blocking pool.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use base64::Engine as _;
use canvas::images::ImageHandle;
use tracing::debug;

use crate::config::FetchTimeouts;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("malformed data URL: {0}")]
    InvalidDataUrl(String),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no pixels")]
    Empty,
    #[error("decode task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    Remote(String),
    /// A complete `data:` URL.
    Inline(String),
}

impl ImageSource {
    /// Classify a raw source string by its scheme. Anything that is not a
    /// `data:` or `http(s)://` URL is treated as a file path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.get(..8).unwrap_or(trimmed).to_ascii_lowercase();
        if lower.starts_with("data:") {
            Self::Inline(trimmed.to_string())
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Remote(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => f.write_str(url),
            // Inline payloads can be huge; show only the media type.
            Self::Inline(url) => {
                let header = url.split(',').next().unwrap_or("data:");
                write!(f, "{header},…")
            }
        }
    }
}

/// Decode the payload of a `data:` URL into raw bytes.
///
/// # Errors
///
/// Returns `InvalidDataUrl` when the URL has no `data:` prefix or no comma,
/// and `Base64` when a `;base64` payload does not decode.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, LoadError> {
    let rest = url
        .get(..5)
        .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .and_then(|_| url.get(5..))
        .ok_or_else(|| LoadError::InvalidDataUrl("missing data: prefix".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| LoadError::InvalidDataUrl("missing ',' separator".into()))?;

    let is_base64 = header
        .rsplit(';')
        .next()
        .is_some_and(|param| param.eq_ignore_ascii_case("base64"));
    if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        Ok(base64::engine::general_purpose::STANDARD.decode(compact)?)
    } else {
        Ok(urlencoding::decode_binary(payload.as_bytes()).into_owned())
    }
}

/// Fetches and decodes images. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Loader {
    http: reqwest::Client,
}

impl Loader {
    /// Build a loader whose remote fetches use the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Http` if the HTTP client cannot be constructed.
    pub fn new(timeouts: FetchTimeouts) -> Result<Self, LoadError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()?;
        Ok(Self { http })
    }

    /// Fetch and decode `source` into an RGBA handle.
    ///
    /// # Errors
    ///
    /// Any fetch, data-URL, or decode failure; also `Empty` for a zero-sized image.
    pub async fn load(&self, source: &ImageSource) -> Result<ImageHandle, LoadError> {
        let bytes = self.fetch(source).await?;
        debug!(%source, bytes = bytes.len(), "image fetched");

        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await??;
        let handle = ImageHandle::from_dynamic(decoded);
        if !handle.is_drawable() {
            return Err(LoadError::Empty);
        }
        Ok(handle)
    }

    async fn fetch(&self, source: &ImageSource) -> Result<Vec<u8>, LoadError> {
        match source {
            ImageSource::File(path) => tokio::fs::read(path)
                .await
                .map_err(|source| LoadError::Io { path: path.clone(), source }),
            ImageSource::Remote(url) => {
                let resp = self.http.get(url).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(LoadError::HttpStatus { url: url.clone(), status: status.as_u16() });
                }
                Ok(resp.bytes().await?.to_vec())
            }
            ImageSource::Inline(url) => decode_data_url(url),
        }
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
