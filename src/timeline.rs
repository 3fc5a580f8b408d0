//! Slideshow timing: which image is on screen, and how far through its slot it is.
//!
//! Everything here is a pure function of elapsed time, so identical inputs always produce
//! identical frames.

use std::time::Duration;

use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::clamp01;

/// Fixed-slot slideshow timeline: every image is shown for `per_image`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeline {
    per_image: Duration,
    image_count: usize,
}

/// Position within the timeline at some elapsed time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineSample {
    /// Index of the image on screen.
    pub image_index: usize,
    /// Progress through that image's slot, in `[0, 1)`.
    pub local_progress: f64,
}

impl Timeline {
    /// Create a timeline. `per_image` must be non-zero.
    pub fn new(per_image: Duration, image_count: usize) -> ReelResult<Self> {
        if per_image.is_zero() {
            return Err(ReelError::validation("per-image duration must be > 0"));
        }
        Ok(Self {
            per_image,
            image_count,
        })
    }

    /// Duration of one image slot.
    pub fn per_image(&self) -> Duration {
        self.per_image
    }

    /// Number of images.
    pub fn image_count(&self) -> usize {
        self.image_count
    }

    /// `per_image * image_count`.
    pub fn total_duration(&self) -> Duration {
        let nanos = self.per_image.as_nanos() * self.image_count as u128;
        Duration::from_nanos(nanos.min(u128::from(u64::MAX)) as u64)
    }

    /// Return `true` once `elapsed` has reached the end of the last slot.
    pub fn is_exhausted(&self, elapsed: Duration) -> bool {
        elapsed >= self.total_duration()
    }

    /// Locate `elapsed` on the timeline, or `None` when the timeline is exhausted.
    pub fn sample(&self, elapsed: Duration) -> Option<TimelineSample> {
        let per = self.per_image.as_nanos();
        let t = elapsed.as_nanos();
        let image_index = usize::try_from(t / per).ok()?;
        if image_index >= self.image_count {
            return None;
        }
        let local_progress = (t % per) as f64 / per as f64;
        Some(TimelineSample {
            image_index,
            local_progress,
        })
    }

    /// Rounded percentage of the timeline covered at `elapsed`, clamped to `0..=100`.
    pub fn progress_percent(&self, elapsed: Duration) -> u8 {
        let total = self.total_duration();
        if total.is_zero() {
            return 100;
        }
        let ratio = elapsed.as_secs_f64() / total.as_secs_f64();
        (clamp01(ratio) * 100.0).round() as u8
    }
}

/// Ken-Burns zoom: `1 + local_progress * zoom_factor`.
pub fn zoom_scale(local_progress: f64, zoom_factor: f64) -> f64 {
    1.0 + clamp01(local_progress) * zoom_factor
}

/// Piecewise-linear fade: ramps up over the first `fade_fraction` of the slot, holds at 1,
/// ramps down over the last `fade_fraction`.
pub fn fade_opacity(local_progress: f64, fade_fraction: f64) -> f64 {
    let p = clamp01(local_progress);
    if fade_fraction <= 0.0 {
        return 1.0;
    }
    if p < fade_fraction {
        clamp01(p / fade_fraction)
    } else if p > 1.0 - fade_fraction {
        clamp01((1.0 - p) / fade_fraction)
    } else {
        1.0
    }
}

#[cfg(test)]
#[path = "../tests/unit/timeline.rs"]
mod tests;
