//! The export state machine: load, run the timeline, finalize.

pub(crate) mod cancel;
pub(crate) mod exporter;
pub(crate) mod scheduler;
pub(crate) mod state;
pub(crate) mod ticker;
