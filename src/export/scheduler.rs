use crate::encode::recorder::Recorder;
use crate::export::cancel::CancelToken;
use crate::export::state::StateChannel;
use crate::export::ticker::FrameTicker;
use crate::foundation::error::ReelResult;
use crate::render::compositor::{FrameCompositor, PaintOutcome};
use crate::timeline::Timeline;

/// How the running phase ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RunEnd {
    /// Elapsed time reached the end of the timeline.
    Exhausted,
    /// The cancel token fired.
    Cancelled,
}

/// Counters from one running phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RunStats {
    pub(crate) ticks: u64,
    pub(crate) painted: u64,
    pub(crate) skipped: u64,
    pub(crate) captured: u64,
}

/// Drive the per-tick loop until the timeline is exhausted or the export is cancelled.
///
/// Each tick reads the elapsed time from `ticker`, paints the frame for it and hands the
/// surface to `recorder`. Ticks whose image is not ready are skipped without capturing.
/// The recorder must already be started.
pub(crate) fn run_timeline(
    timeline: &Timeline,
    compositor: &mut FrameCompositor,
    recorder: &mut Recorder,
    ticker: &mut dyn FrameTicker,
    state: &StateChannel,
    cancel: &CancelToken,
) -> ReelResult<(RunEnd, RunStats)> {
    let mut stats = RunStats::default();
    ticker.start();
    loop {
        if cancel.is_cancelled() {
            return Ok((RunEnd::Cancelled, stats));
        }
        let elapsed = ticker.next_frame();
        stats.ticks += 1;
        if cancel.is_cancelled() {
            return Ok((RunEnd::Cancelled, stats));
        }

        let Some(sample) = timeline.sample(elapsed) else {
            return Ok((RunEnd::Exhausted, stats));
        };

        match compositor.paint(sample)? {
            PaintOutcome::NotReady => {
                stats.skipped += 1;
                tracing::debug!(?elapsed, index = sample.image_index, "image not ready, skipping tick");
                continue;
            }
            PaintOutcome::Painted => stats.painted += 1,
        }

        let frame = compositor.snapshot();
        stats.captured += recorder.capture(elapsed, &frame)?;
        state.advance(timeline.progress_percent(elapsed));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/scheduler.rs"]
mod tests;
