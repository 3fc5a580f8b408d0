use std::time::{Duration, Instant};

use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};

/// Source of scheduler ticks.
///
/// `next_frame` is the only place the scheduler waits. It returns the elapsed time since
/// `start`, read from the ticker's clock, which must be non-decreasing.
pub trait FrameTicker {
    /// Mark the start of the timeline.
    fn start(&mut self);
    /// Wait for the next tick and return the elapsed time at that tick.
    fn next_frame(&mut self) -> Duration;
}

/// Wall-clock ticker paced to a display refresh rate.
///
/// Elapsed time comes from [`Instant`], so a slow paint shows up as a longer gap between
/// ticks rather than as a slower video.
#[derive(Debug)]
pub struct DisplayTicker {
    interval: Duration,
    origin: Option<Instant>,
    deadline: Option<Instant>,
}

impl DisplayTicker {
    /// Ticker firing `hz` times per second.
    pub fn new(hz: u32) -> ReelResult<Self> {
        if hz == 0 {
            return Err(ReelError::validation("display rate must be > 0"));
        }
        Ok(Self {
            interval: Duration::from_secs(1) / hz,
            origin: None,
            deadline: None,
        })
    }
}

impl FrameTicker for DisplayTicker {
    fn start(&mut self) {
        let now = Instant::now();
        self.origin = Some(now);
        self.deadline = Some(now);
    }

    fn next_frame(&mut self) -> Duration {
        let now = Instant::now();
        let origin = *self.origin.get_or_insert(now);
        let deadline = self.deadline.unwrap_or(now);
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        let now = Instant::now();
        // Missed ticks are dropped instead of replayed in a burst.
        let mut next = deadline + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.deadline = Some(next);
        now.duration_since(origin)
    }
}

/// Offline ticker: advances exactly one capture slot per tick and never sleeps.
///
/// Tick `k` reports the start of capture slot `k`, so every tick produces exactly one
/// encoded frame and the export runs as fast as frames can be painted.
#[derive(Clone, Copy, Debug)]
pub struct SteppedTicker {
    fps: Fps,
    next: u64,
}

impl SteppedTicker {
    /// Stepped ticker on the `fps` capture grid.
    pub fn new(fps: Fps) -> Self {
        Self { fps, next: 0 }
    }
}

impl FrameTicker for SteppedTicker {
    fn start(&mut self) {
        self.next = 0;
    }

    fn next_frame(&mut self) -> Duration {
        let elapsed = self.fps.frame_start(self.next);
        self.next += 1;
        elapsed
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/ticker.rs"]
mod tests;
