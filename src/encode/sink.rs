use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::encode::container::{Container, EncoderProbe};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::ReelResult;
use crate::render::frame::FrameRGBA;

/// Configuration provided to a [`FrameSink`] when capture starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Capture frames-per-second.
    pub fps: Fps,
    /// Target bitrate in bits per second.
    pub bitrate_bps: u32,
    /// Negotiated output container.
    pub container: Container,
}

/// Sink contract for consuming captured frames in paint order.
///
/// Ordering contract: `push_frame` is called with strictly increasing [`FrameIndex`] values
/// between one `begin` and the matching `end`/`abort`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()>;
    /// Finalize the stream. Returns the location of the produced file, if any.
    fn end(&mut self) -> ReelResult<Option<PathBuf>>;
    /// Drop everything captured so far and release the encoder. Never fails.
    fn abort(&mut self);
}

/// Creates sinks for a negotiated container.
pub trait SinkFactory: Send + Sync {
    /// Capability probe used for container negotiation.
    fn probe(&self) -> &dyn EncoderProbe;
    /// Open a sink that will finalize into `out_path`.
    fn open(&self, container: Container, out_path: &Path) -> ReelResult<Box<dyn FrameSink>>;
}

/// Everything an [`InMemorySink`] has observed.
#[derive(Debug, Default)]
pub struct Recording {
    /// Output path requested when the sink was opened.
    pub out_path: Option<PathBuf>,
    /// Configuration captured by the last `begin`.
    pub config: Option<SinkConfig>,
    /// Frames in capture order.
    pub frames: Vec<(FrameIndex, FrameRGBA)>,
    /// Number of `begin` calls.
    pub begin_calls: usize,
    /// Whether `end` completed.
    pub ended: bool,
    /// Whether `abort` was called.
    pub aborted: bool,
}

/// In-memory sink for tests and debugging.
///
/// Clones share one [`Recording`], so a handle kept by the caller observes frames pushed
/// through a clone handed to an exporter.
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    shared: Arc<Mutex<Recording>>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock and inspect the recording.
    pub fn recording(&self) -> MutexGuard<'_, Recording> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        let mut rec = self.recording();
        rec.config = Some(cfg);
        rec.frames.clear();
        rec.begin_calls += 1;
        rec.ended = false;
        rec.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        self.recording().frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ReelResult<Option<PathBuf>> {
        self.recording().ended = true;
        Ok(None)
    }

    fn abort(&mut self) {
        let mut rec = self.recording();
        rec.frames.clear();
        rec.aborted = true;
    }
}

/// Sink factory that records into a shared [`InMemorySink`] and reports a fixed set of
/// supported containers.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    sink: InMemorySink,
    supported: Vec<Container>,
}

impl InMemoryBackend {
    /// Backend supporting every container.
    pub fn new(sink: InMemorySink) -> Self {
        Self::with_supported(sink, vec![Container::WebM, Container::Mp4])
    }

    /// Backend supporting only `supported`.
    pub fn with_supported(sink: InMemorySink, supported: Vec<Container>) -> Self {
        Self { sink, supported }
    }
}

impl EncoderProbe for InMemoryBackend {
    fn supports(&self, container: Container) -> ReelResult<bool> {
        Ok(self.supported.contains(&container))
    }
}

impl SinkFactory for InMemoryBackend {
    fn probe(&self) -> &dyn EncoderProbe {
        self
    }

    fn open(&self, _container: Container, out_path: &Path) -> ReelResult<Box<dyn FrameSink>> {
        self.sink.recording().out_path = Some(out_path.to_path_buf());
        Ok(Box::new(self.sink.clone()))
    }
}
