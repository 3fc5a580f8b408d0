use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::assets::loader::AssetLoader;
use crate::assets::source::{FetchOpts, ImageSource};
use crate::config::ExportConfig;
use crate::encode::container::{Container, negotiate_container};
use crate::encode::recorder::{ExportArtifact, Recorder};
use crate::encode::sink::{SinkConfig, SinkFactory};
use crate::export::cancel::CancelToken;
use crate::export::scheduler::{RunEnd, run_timeline};
use crate::export::state::{ExportState, Phase, StateChannel, StateObserver};
use crate::export::ticker::FrameTicker;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::compositor::FrameCompositor;
use crate::render::frame::FrameRGBA;
use crate::render::overlay::CaptionOverlay;
use crate::timeline::Timeline;

/// Suffix appended to every output file stem.
const FILE_SUFFIX: &str = "-love-story";

/// What to export: ordered image sources and the caption drawn on every frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportRequest {
    /// Images in display order. Duplicates are allowed.
    pub sources: Vec<ImageSource>,
    /// Caption (partner name), also used to name the output file.
    pub caption: String,
}

impl ExportRequest {
    /// Request for `sources` captioned with `caption`.
    pub fn new(sources: Vec<ImageSource>, caption: impl Into<String>) -> Self {
        Self {
            sources,
            caption: caption.into(),
        }
    }
}

/// How an export ended when it did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The video was encoded and finalized.
    Completed(ExportArtifact),
    /// There were no images; nothing was loaded or written.
    Empty,
    /// The export was cancelled; staged output was discarded.
    Cancelled,
}

/// Turns an [`ExportRequest`] into an encoded video.
///
/// One exporter runs at most one export at a time; a second concurrent call fails with
/// [`ReelError::Busy`]. Progress is published through [`SlideshowExporter::subscribe`].
pub struct SlideshowExporter {
    config: ExportConfig,
    backend: Arc<dyn SinkFactory>,
    out_dir: PathBuf,
    state: StateChannel,
    active: Mutex<Option<CancelToken>>,
}

impl SlideshowExporter {
    /// Exporter writing into the current directory through `backend`.
    pub fn new(config: ExportConfig, backend: Arc<dyn SinkFactory>) -> ReelResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backend,
            out_dir: PathBuf::from("."),
            state: StateChannel::new(),
            active: Mutex::new(None),
        })
    }

    /// Write outputs into `dir` instead of the current directory.
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Output directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Snapshot of the export state.
    pub fn state(&self) -> ExportState {
        self.state.current()
    }

    /// Observe every state change of this exporter.
    pub fn subscribe(&self, observer: Arc<dyn StateObserver>) {
        self.state.subscribe(observer);
    }

    /// Request cancellation of the running export. Returns `false` when none is running.
    pub fn cancel(&self) -> bool {
        match self.lock_active().as_ref() {
            Some(token) => {
                tracing::info!("export cancellation requested");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Token of the running export, for cancelling it from elsewhere.
    pub fn cancel_token(&self) -> Option<CancelToken> {
        self.lock_active().clone()
    }

    /// Whether an export is in progress.
    pub fn is_busy(&self) -> bool {
        self.lock_active().is_some()
    }

    /// Resolve the container the backend would encode into.
    pub fn negotiate(&self) -> ReelResult<Container> {
        negotiate_container(&self.config.containers, self.backend.probe())
    }

    /// Run one export to completion, cancellation or failure.
    ///
    /// `Idle -> Loading -> Running -> Finalizing -> Idle`. The state is back to idle when this
    /// returns, whatever the outcome.
    #[tracing::instrument(skip_all, fields(images = request.sources.len(), caption = %request.caption))]
    pub fn export(
        &self,
        request: &ExportRequest,
        ticker: &mut dyn FrameTicker,
    ) -> ReelResult<ExportOutcome> {
        let active = self.begin()?;

        if request.sources.is_empty() {
            tracing::info!("no images to export");
            return Ok(ExportOutcome::Empty);
        }

        self.state.enter(Phase::Loading);
        let container = self.negotiate()?;
        let images = self.loader()?.load_all(&request.sources)?;

        let timeline = Timeline::new(self.config.per_image_duration(), images.len())?;
        let overlay = CaptionOverlay::render(&request.caption, &self.config)?;
        let mut compositor = FrameCompositor::new(&self.config, images, Some(&overlay))?;

        if active.token.is_cancelled() {
            tracing::info!("export cancelled while loading");
            return Ok(ExportOutcome::Cancelled);
        }

        let out_path = self
            .out_dir
            .join(output_file_name(&request.caption, container));
        let sink = self.backend.open(container, &out_path)?;
        let mut recorder = Recorder::new(
            sink,
            SinkConfig {
                width: self.config.canvas.width,
                height: self.config.canvas.height,
                fps: self.config.fps,
                bitrate_bps: self.config.bitrate_bps,
                container,
            },
        );

        self.state.enter(Phase::Running);
        recorder.start()?;
        tracing::info!(
            total = ?timeline.total_duration(),
            out = %out_path.display(),
            "capture running"
        );

        let run = run_timeline(
            &timeline,
            &mut compositor,
            &mut recorder,
            ticker,
            &self.state,
            &active.token,
        );
        let (end, stats) = match run {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "export failed while running");
                recorder.abort();
                return Err(e);
            }
        };
        tracing::debug!(
            ticks = stats.ticks,
            painted = stats.painted,
            skipped = stats.skipped,
            captured = stats.captured,
            "running phase ended"
        );

        match end {
            RunEnd::Cancelled => {
                recorder.abort();
                tracing::info!("export cancelled");
                Ok(ExportOutcome::Cancelled)
            }
            RunEnd::Exhausted => {
                self.state.advance(100);
                self.state.enter(Phase::Finalizing);
                let artifact = recorder.stop(timeline.total_duration())?;
                tracing::info!(
                    frames = artifact.frames,
                    duration = ?artifact.duration,
                    path = ?artifact.path,
                    "export finished"
                );
                Ok(ExportOutcome::Completed(artifact))
            }
        }
    }

    /// Render the single frame shown at `at` without encoding anything.
    ///
    /// Returns `None` when `at` lies past the end of the timeline or there are no images.
    #[tracing::instrument(skip_all, fields(at = ?at))]
    pub fn preview_frame(
        &self,
        request: &ExportRequest,
        at: Duration,
    ) -> ReelResult<Option<FrameRGBA>> {
        let _active = self.begin()?;
        if request.sources.is_empty() {
            return Ok(None);
        }
        let images = self.loader()?.load_all(&request.sources)?;
        let timeline = Timeline::new(self.config.per_image_duration(), images.len())?;
        let Some(sample) = timeline.sample(at) else {
            return Ok(None);
        };
        let overlay = CaptionOverlay::render(&request.caption, &self.config)?;
        let mut compositor = FrameCompositor::new(&self.config, images, Some(&overlay))?;
        compositor.render(sample)
    }

    fn loader(&self) -> ReelResult<AssetLoader> {
        AssetLoader::new(
            self.config.loader_threads,
            FetchOpts {
                timeout: Duration::from_secs(self.config.fetch_timeout_secs),
            },
        )
    }

    fn begin(&self) -> ReelResult<ActiveExport<'_>> {
        let mut slot = self.lock_active();
        if slot.is_some() {
            tracing::warn!("export rejected: another export is running");
            return Err(ReelError::Busy);
        }
        let token = CancelToken::new();
        *slot = Some(token.clone());
        Ok(ActiveExport {
            exporter: self,
            token,
        })
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<CancelToken>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Holds the exporter's single export slot; releasing it resets the state to idle.
struct ActiveExport<'a> {
    exporter: &'a SlideshowExporter,
    token: CancelToken,
}

impl Drop for ActiveExport<'_> {
    fn drop(&mut self) {
        self.exporter.state.reset();
        *self.exporter.lock_active() = None;
    }
}

/// `<sanitized-caption>-love-story.<ext>`.
pub fn output_file_name(caption: &str, container: Container) -> String {
    format!(
        "{}{FILE_SUFFIX}.{}",
        sanitize_caption(caption),
        container.extension()
    )
}

/// Make `caption` usable as a file stem.
///
/// Each run of whitespace becomes one `-`, and characters that are not allowed in file names
/// become `-` as well. Everything else, including non-ASCII letters, is kept. An empty result
/// becomes `untitled`.
pub fn sanitize_caption(caption: &str) -> String {
    let mut out = String::with_capacity(caption.len());
    let mut in_space = false;
    for ch in caption.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if ch.is_control() || matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
            out.push('-');
        } else {
            out.push(ch);
        }
    }
    if out.is_empty() {
        out.push_str("untitled");
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/export/exporter.rs"]
mod tests;
