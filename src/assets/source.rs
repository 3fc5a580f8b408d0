use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use base64::Engine as _;

use crate::foundation::error::{ReelError, ReelResult};

/// Where the raw bytes of one image come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// An `http://` or `https://` URL.
    Url(String),
    /// An embedded `data:` URL, as produced by browser file pickers.
    DataUrl(String),
    /// Bytes already in memory.
    Bytes(Arc<[u8]>),
}

impl ImageSource {
    /// Classify a string the way a greeting record stores it: `data:` URLs, `http(s)` URLs,
    /// and anything else as a filesystem path.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        let lower = trimmed.get(..8).unwrap_or(trimmed).to_ascii_lowercase();
        if lower.starts_with("data:") {
            ImageSource::DataUrl(trimmed.to_string())
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            ImageSource::Url(trimmed.to_string())
        } else {
            ImageSource::Path(PathBuf::from(trimmed))
        }
    }

    /// Short label for logs and error messages. `data:` URLs are cut after the media type.
    pub fn label(&self) -> String {
        match self {
            ImageSource::Path(p) => p.display().to_string(),
            ImageSource::Url(u) => u.clone(),
            ImageSource::DataUrl(d) => {
                let head = d.split(',').next().unwrap_or("data:");
                format!("{head},…")
            }
            ImageSource::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(p: PathBuf) -> Self {
        ImageSource::Path(p)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(b: Vec<u8>) -> Self {
        ImageSource::Bytes(b.into())
    }
}

/// Settings for resolving sources to bytes.
#[derive(Clone, Debug)]
pub struct FetchOpts {
    /// Timeout for remote fetches.
    pub timeout: Duration,
}

impl Default for FetchOpts {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Resolve `source` to its raw, still-encoded bytes.
pub fn read_source_bytes(source: &ImageSource, opts: &FetchOpts) -> ReelResult<Arc<[u8]>> {
    match source {
        ImageSource::Path(p) => {
            let bytes = std::fs::read(p).with_context(|| format!("read image '{}'", p.display()))?;
            Ok(bytes.into())
        }
        ImageSource::Url(u) => fetch_url(u, opts),
        ImageSource::DataUrl(d) => decode_data_url(d).map(Into::into),
        ImageSource::Bytes(b) => Ok(b.clone()),
    }
}

/// Decode the payload of a base64 `data:` URL.
pub(crate) fn decode_data_url(url: &str) -> ReelResult<Vec<u8>> {
    let rest = url
        .get(..5)
        .filter(|p| p.eq_ignore_ascii_case("data:"))
        .map(|_| &url[5..])
        .ok_or_else(|| ReelError::validation("not a data: URL"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ReelError::validation("data: URL has no ',' separator"))?;
    if !meta
        .split(';')
        .any(|part| part.trim().eq_ignore_ascii_case("base64"))
    {
        return Err(ReelError::validation(
            "only base64-encoded data: URLs are supported",
        ));
    }
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ReelError::validation(format!("invalid base64 in data: URL: {e}")))
}

#[cfg(feature = "remote")]
fn fetch_url(url: &str, opts: &FetchOpts) -> ReelResult<Arc<[u8]>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(opts.timeout)
        .build()
        .context("build http client")?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("requesting {url}"))?
        .error_for_status()
        .with_context(|| format!("{url} returned an error status"))?;
    let bytes = response
        .bytes()
        .with_context(|| format!("reading body of {url}"))?;
    tracing::debug!(url, len = bytes.len(), "fetched remote image");
    Ok(bytes.to_vec().into())
}

#[cfg(not(feature = "remote"))]
fn fetch_url(url: &str, _opts: &FetchOpts) -> ReelResult<Arc<[u8]>> {
    Err(ReelError::validation(format!(
        "cannot fetch '{url}': built without the `remote` feature"
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
