//! Container/codec capability negotiation.

use std::process::{Command, Stdio};

use crate::foundation::error::{ReelError, ReelResult};

/// Output container, each paired with one video codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// WebM with VP9 (`libvpx-vp9`).
    WebM,
    /// MP4 with H.264 (`libx264`).
    Mp4,
}

impl Container {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Container::WebM => "webm",
            Container::Mp4 => "mp4",
        }
    }

    /// MIME type of the produced file.
    pub fn mime_type(self) -> &'static str {
        match self {
            Container::WebM => "video/webm",
            Container::Mp4 => "video/mp4",
        }
    }

    /// `ffmpeg` encoder name used for this container.
    pub fn encoder(self) -> &'static str {
        match self {
            Container::WebM => "libvpx-vp9",
            Container::Mp4 => "libx264",
        }
    }

    /// `ffmpeg` muxer name passed with `-f`.
    pub fn muxer(self) -> &'static str {
        match self {
            Container::WebM => "webm",
            Container::Mp4 => "mp4",
        }
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for Container {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webm" => Ok(Container::WebM),
            "mp4" => Ok(Container::Mp4),
            other => Err(ReelError::validation(format!(
                "unknown container '{other}' (expected webm or mp4)"
            ))),
        }
    }
}

/// Answers whether the encoding runtime can produce a given container.
pub trait EncoderProbe: Send + Sync {
    /// Return `Ok(true)` when `container` can be produced, `Ok(false)` when it cannot, and an
    /// error when the runtime itself is missing.
    fn supports(&self, container: Container) -> ReelResult<bool>;
}

/// Probe backed by the system `ffmpeg` binary's encoder list.
#[derive(Debug, Default)]
pub struct FfmpegProbe {
    encoders: std::sync::OnceLock<Result<Vec<String>, String>>,
}

impl FfmpegProbe {
    /// Create a probe. `ffmpeg` is queried lazily, once.
    pub fn new() -> Self {
        Self::default()
    }

    fn encoders(&self) -> ReelResult<&[String]> {
        self.encoders
            .get_or_init(list_ffmpeg_encoders)
            .as_deref()
            .map_err(|e| ReelError::encoding_unsupported(e.clone()))
    }
}

impl EncoderProbe for FfmpegProbe {
    fn supports(&self, container: Container) -> ReelResult<bool> {
        let encoders = self.encoders()?;
        Ok(encoders.iter().any(|e| e == container.encoder()))
    }
}

fn list_ffmpeg_encoders() -> Result<Vec<String>, String> {
    let output = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| format!("ffmpeg is required for video export, but could not be run: {e}"))?;
    if !output.status.success() {
        return Err(format!(
            "`ffmpeg -encoders` exited with status {}",
            output.status
        ));
    }
    let list = parse_encoder_list(&String::from_utf8_lossy(&output.stdout));
    tracing::debug!(count = list.len(), "probed ffmpeg encoders");
    Ok(list)
}

/// Extract encoder names from `ffmpeg -encoders` output.
///
/// Entry lines look like ` V....D libx264   libx264 H.264 / AVC ...`: a six-character flag
/// column followed by the name. Header lines and the legend are skipped.
pub(crate) fn parse_encoder_list(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut in_table = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("------") {
            in_table = true;
            continue;
        }
        if !in_table {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let (Some(flags), Some(name)) = (parts.next(), parts.next()) else {
            continue;
        };
        if flags.len() == 6 && flags.starts_with(['V', 'A', 'S']) {
            out.push(name.to_string());
        }
    }
    out
}

/// Pick the first container in `preferences` that `probe` supports.
///
/// Runs once per export, before capture starts. Failing to find any usable container is
/// fatal; there is no attempt to encode with an unverified fallback.
pub fn negotiate_container(
    preferences: &[Container],
    probe: &dyn EncoderProbe,
) -> ReelResult<Container> {
    for &container in preferences {
        if probe.supports(container)? {
            tracing::info!(%container, encoder = container.encoder(), "selected container");
            return Ok(container);
        }
        tracing::warn!(%container, encoder = container.encoder(), "container not available");
    }
    let tried = preferences
        .iter()
        .map(|c| format!("{c} ({})", c.encoder()))
        .collect::<Vec<_>>()
        .join(", ");
    Err(ReelError::encoding_unsupported(format!(
        "none of the preferred containers can be produced: {tried}"
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/container.rs"]
mod tests;
