use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::encode::container::Container;
use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};

/// How a decoded image is mapped onto the output canvas before zooming.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Stretch the image to the canvas size, ignoring its aspect ratio.
    #[default]
    Stretch,
    /// Scale uniformly until the canvas is covered, cropping the overflow.
    Cover,
}

/// Export settings. Every field has a default, so partial JSON files are accepted.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Output canvas size in pixels.
    pub canvas: Canvas,
    /// Capture frame rate.
    pub fps: Fps,
    /// How long each image stays on screen, in milliseconds.
    pub per_image_ms: u64,
    /// Extra zoom reached at the end of an image's slot (`0.1` = 110%).
    pub zoom_factor: f64,
    /// Fraction of an image's slot spent fading in, and again fading out.
    pub fade_fraction: f64,
    /// Target video bitrate in bits per second.
    pub bitrate_bps: u32,
    /// Fill color painted before every frame.
    pub background: Rgba8,
    /// Caption (partner name) color.
    pub caption_color: Rgba8,
    /// Caption font size in pixels at the configured canvas height.
    pub caption_size_px: f32,
    /// Fixed line drawn above the caption.
    pub subtitle: String,
    /// Subtitle color.
    pub subtitle_color: Rgba8,
    /// Subtitle font size in pixels.
    pub subtitle_size_px: f32,
    /// Drop-shadow blur radius behind the overlay text, in pixels.
    pub shadow_blur_px: f32,
    /// Image-to-canvas mapping.
    pub fit: FitMode,
    /// Containers to try, most preferred first.
    pub containers: Vec<Container>,
    /// Worker threads used to decode images. `None` uses rayon defaults.
    pub loader_threads: Option<usize>,
    /// Extra directory scanned for `.ttf`/`.otf` fonts used by the overlay.
    pub font_dir: Option<PathBuf>,
    /// Timeout for fetching `http(s)` image sources, in seconds.
    pub fetch_timeout_secs: u64,
    /// Display refresh rate used to pace real-time exports.
    pub display_hz: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::PORTRAIT_720P,
            fps: Fps { num: 30, den: 1 },
            per_image_ms: 2000,
            zoom_factor: 0.1,
            fade_fraction: 0.1,
            bitrate_bps: 3_000_000,
            background: Rgba8::rgb(0, 0, 0),
            caption_color: Rgba8::rgb(0xf4, 0x3f, 0x5e),
            caption_size_px: 64.0,
            subtitle: "Our Eternal Bond".to_string(),
            subtitle_color: Rgba8 {
                r: 255,
                g: 255,
                b: 255,
                a: 230,
            },
            subtitle_size_px: 32.0,
            shadow_blur_px: 20.0,
            fit: FitMode::Stretch,
            containers: vec![Container::WebM, Container::Mp4],
            loader_threads: None,
            font_dir: None,
            fetch_timeout_secs: 30,
            display_hz: 60,
        }
    }
}

impl ExportConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| ReelError::serde(format!("config '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that every field is usable.
    pub fn validate(&self) -> ReelResult<()> {
        let Canvas { width, height } = self.canvas;
        if width == 0 || height == 0 {
            return Err(ReelError::validation("canvas width/height must be non-zero"));
        }
        if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "canvas width/height must be even (required for yuv420p output)",
            ));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(ReelError::validation(format!(
                "canvas {width}x{height} exceeds {}x{}",
                u16::MAX,
                u16::MAX
            )));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        if self.per_image_ms == 0 {
            return Err(ReelError::validation("per_image_ms must be > 0"));
        }
        if !self.zoom_factor.is_finite() || self.zoom_factor < 0.0 {
            return Err(ReelError::validation("zoom_factor must be finite and >= 0"));
        }
        if !self.fade_fraction.is_finite() || self.fade_fraction <= 0.0 || self.fade_fraction > 0.5
        {
            return Err(ReelError::validation("fade_fraction must be in (0, 0.5]"));
        }
        if self.bitrate_bps == 0 {
            return Err(ReelError::validation("bitrate_bps must be > 0"));
        }
        for (name, px) in [
            ("caption_size_px", self.caption_size_px),
            ("subtitle_size_px", self.subtitle_size_px),
        ] {
            if !px.is_finite() || px <= 0.0 {
                return Err(ReelError::validation(format!("{name} must be finite and > 0")));
            }
        }
        if !self.shadow_blur_px.is_finite() || self.shadow_blur_px < 0.0 {
            return Err(ReelError::validation("shadow_blur_px must be finite and >= 0"));
        }
        if self.containers.is_empty() {
            return Err(ReelError::validation("at least one container must be listed"));
        }
        if self.loader_threads == Some(0) {
            return Err(ReelError::validation("loader_threads must be > 0 when set"));
        }
        if self.display_hz == 0 {
            return Err(ReelError::validation("display_hz must be > 0"));
        }
        Ok(())
    }

    /// On-screen duration of one image.
    pub fn per_image_duration(&self) -> Duration {
        Duration::from_millis(self.per_image_ms)
    }

    /// Move `preferred` to the front of the container list, keeping the rest in order.
    pub fn prefer_container(&mut self, preferred: Container) {
        self.containers.retain(|c| *c != preferred);
        self.containers.insert(0, preferred);
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
