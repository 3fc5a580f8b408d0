//! Encoding: container negotiation, frame sinks and the capture recorder.

pub(crate) mod container;
pub(crate) mod ffmpeg;
pub(crate) mod recorder;
pub(crate) mod sink;
