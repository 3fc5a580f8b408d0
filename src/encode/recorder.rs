use std::path::PathBuf;
use std::time::Duration;

use crate::encode::container::Container;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::FrameRGBA;

/// Finished output of one export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Location of the produced file; `None` for in-memory sinks.
    pub path: Option<PathBuf>,
    /// Container the stream was encoded into.
    pub container: Container,
    /// Number of frames handed to the encoder.
    pub frames: u64,
    /// Presentation duration covered by those frames.
    pub duration: Duration,
}

/// Fixed-rate capture of the drawing surface into a [`FrameSink`].
///
/// The recorder samples the surface on a fixed `fps` grid: capture slot `k` is due at
/// `k / fps`. Each [`Recorder::capture`] call emits the current surface for every slot that
/// became due since the previous call, so the output cadence is independent of how often the
/// surface is actually repainted.
pub struct Recorder {
    sink: Box<dyn FrameSink>,
    cfg: SinkConfig,
    emitted: u64,
    last: Option<FrameRGBA>,
    started: bool,
}

impl Recorder {
    /// Wrap `sink`. Nothing is captured until [`Recorder::start`].
    pub fn new(sink: Box<dyn FrameSink>, cfg: SinkConfig) -> Self {
        Self {
            sink,
            cfg,
            emitted: 0,
            last: None,
            started: false,
        }
    }

    /// Begin capturing. Must be called before the first paint.
    pub fn start(&mut self) -> ReelResult<()> {
        if self.started {
            return Err(ReelError::encode("recorder already started"));
        }
        self.sink.begin(self.cfg.clone())?;
        self.started = true;
        tracing::debug!(
            fps = self.cfg.fps.as_f64(),
            container = %self.cfg.container,
            "capture started"
        );
        Ok(())
    }

    /// Capture `frame`, painted at `elapsed`, into every slot due by then.
    ///
    /// Returns the number of frames pushed to the sink.
    pub fn capture(&mut self, elapsed: Duration, frame: &FrameRGBA) -> ReelResult<u64> {
        if !self.started {
            return Err(ReelError::encode("recorder not started"));
        }
        let due = self.cfg.fps.frames_elapsed(elapsed) + 1;
        let pushed = self.push_until(due, frame)?;
        self.last = Some(frame.clone());
        Ok(pushed)
    }

    /// Stop capturing at `total` and finalize the stream.
    ///
    /// Slots between the last capture and `total` repeat the last painted frame, so the output
    /// covers exactly `ceil(total * fps)` frames.
    pub fn stop(mut self, total: Duration) -> ReelResult<ExportArtifact> {
        if !self.started {
            return Err(ReelError::encode("recorder not started"));
        }
        let target = self.cfg.fps.frames_covering(total);
        if self.emitted < target {
            let Some(last) = self.last.take() else {
                self.sink.abort();
                return Err(ReelError::encode("no frame was painted before capture stopped"));
            };
            self.push_until(target, &last)?;
        }

        let path = self.sink.end()?;
        let artifact = ExportArtifact {
            path,
            container: self.cfg.container,
            frames: self.emitted,
            duration: frames_duration(self.cfg.fps, self.emitted),
        };
        tracing::debug!(frames = artifact.frames, "capture finalized");
        Ok(artifact)
    }

    /// Release the sink without producing output.
    pub fn abort(mut self) {
        if self.started {
            self.sink.abort();
        }
    }

    fn push_until(&mut self, due: u64, frame: &FrameRGBA) -> ReelResult<u64> {
        let before = self.emitted;
        while self.emitted < due {
            self.sink.push_frame(FrameIndex(self.emitted), frame)?;
            self.emitted += 1;
        }
        Ok(self.emitted - before)
    }
}

fn frames_duration(fps: Fps, frames: u64) -> Duration {
    let nanos = u128::from(frames) * 1_000_000_000 * u128::from(fps.den) / u128::from(fps.num);
    Duration::from_nanos(nanos.min(u128::from(u64::MAX)) as u64)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/recorder.rs"]
mod tests;
