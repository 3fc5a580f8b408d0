use std::sync::{Arc, Mutex};

/// Lifecycle phase of an exporter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No export in progress.
    #[default]
    Idle,
    /// Fetching and decoding images.
    Loading,
    /// Painting and capturing frames.
    Running,
    /// Stopping the encoder and materializing the file.
    Finalizing,
}

/// Observable progress record of an exporter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExportState {
    /// Current phase.
    pub phase: Phase,
    /// `true` from the start of loading until the export is reset.
    pub is_running: bool,
    /// Timeline progress in `0..=100`.
    pub progress_percent: u8,
}

impl ExportState {
    /// The resting state: `{Idle, false, 0}`.
    pub const IDLE: ExportState = ExportState {
        phase: Phase::Idle,
        is_running: false,
        progress_percent: 0,
    };
}

/// Receives every change of an [`ExportState`].
pub trait StateObserver: Send + Sync {
    /// Called after the state changed, outside any lock.
    fn on_state(&self, state: &ExportState);
}

impl<F> StateObserver for F
where
    F: Fn(&ExportState) + Send + Sync,
{
    fn on_state(&self, state: &ExportState) {
        self(state)
    }
}

/// Owned export state plus the observers notified on each change.
#[derive(Default)]
pub struct StateChannel {
    state: Mutex<ExportState>,
    observers: Mutex<Vec<Arc<dyn StateObserver>>>,
}

impl StateChannel {
    /// Channel in the idle state with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> ExportState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register an observer for future changes.
    pub fn subscribe(&self, observer: Arc<dyn StateObserver>) {
        self.observers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(observer);
    }

    /// Enter `phase`. Leaving `Idle` marks the export as running with zero progress.
    pub fn enter(&self, phase: Phase) {
        self.update(|s| {
            if s.phase == Phase::Idle && phase != Phase::Idle {
                s.progress_percent = 0;
            }
            s.phase = phase;
            s.is_running = phase != Phase::Idle;
            if phase == Phase::Idle {
                s.progress_percent = 0;
            }
        });
    }

    /// Raise progress to `percent` (clamped to 100). Progress never moves backwards while
    /// an export is running.
    pub fn advance(&self, percent: u8) {
        self.update(|s| {
            s.progress_percent = s.progress_percent.max(percent.min(100));
        });
    }

    /// Back to [`ExportState::IDLE`].
    pub fn reset(&self) {
        self.update(|s| *s = ExportState::IDLE);
    }

    fn update(&self, f: impl FnOnce(&mut ExportState)) {
        let (before, after) = {
            let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let before = *guard;
            f(&mut guard);
            (before, *guard)
        };
        if before == after {
            return;
        }
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for observer in observers {
            observer.on_state(&after);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/state.rs"]
mod tests;
