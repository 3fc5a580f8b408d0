//! Lovereel turns a handful of photos and a name into a short portrait "love story" video.
//!
//! Each image is shown for a fixed slot with a slow Ken-Burns zoom and a fade in and out,
//! a caption is drawn over every frame, and the frames are captured at a fixed rate into an
//! encoded file named after the caption. The pipeline is:
//!
//! - [`AssetLoader`] fetches and decodes every [`ImageSource`], all or nothing
//! - [`FrameCompositor`] paints one frame for a point on the [`Timeline`]
//! - [`Recorder`] samples painted frames onto the capture grid and feeds a [`FrameSink`]
//! - [`SlideshowExporter`] runs the whole thing as an `Idle -> Loading -> Running ->
//!   Finalizing -> Idle` state machine, ticking through a [`FrameTicker`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod encode;
mod export;
mod foundation;
mod record;
mod render;
mod timeline;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rgba8};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::assets::decode::{DecodedImage, MAX_IMAGE_SIDE, decode_image};
pub use crate::assets::loader::AssetLoader;
pub use crate::assets::source::{FetchOpts, ImageSource, read_source_bytes};
pub use crate::config::{ExportConfig, FitMode};
pub use crate::encode::container::{Container, EncoderProbe, FfmpegProbe, negotiate_container};
pub use crate::encode::ffmpeg::{
    FfmpegBackend, FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path,
};
pub use crate::encode::recorder::{ExportArtifact, Recorder};
pub use crate::encode::sink::{
    FrameSink, InMemoryBackend, InMemorySink, Recording, SinkConfig, SinkFactory,
};
pub use crate::export::cancel::CancelToken;
pub use crate::export::exporter::{
    ExportOutcome, ExportRequest, SlideshowExporter, output_file_name, sanitize_caption,
};
pub use crate::export::state::{ExportState, Phase, StateChannel, StateObserver};
pub use crate::export::ticker::{DisplayTicker, FrameTicker, SteppedTicker};
pub use crate::record::{GreetingRecord, GreetingStore, SAMPLE_SLUG, SLUG_LEN, validate_slug};
pub use crate::render::compositor::{FrameCompositor, PaintOutcome};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::overlay::CaptionOverlay;
pub use crate::timeline::{Timeline, TimelineSample, fade_opacity, zoom_scale};
