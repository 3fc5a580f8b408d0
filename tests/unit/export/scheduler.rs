use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::assets::decode::DecodedImage;
use crate::config::ExportConfig;
use crate::encode::container::Container;
use crate::encode::sink::{InMemorySink, SinkConfig};
use crate::export::state::{ExportState, Phase};
use crate::export::ticker::SteppedTicker;
use crate::foundation::core::{Canvas, Fps};

fn compositor_with(images: usize) -> FrameCompositor {
    let cfg = ExportConfig {
        canvas: Canvas {
            width: 8,
            height: 8,
        },
        ..ExportConfig::default()
    };
    let images = (0..images)
        .map(|_| {
            Arc::new(DecodedImage::from_premul_rgba8(2, 2, [255, 0, 0, 255].repeat(4)).unwrap())
        })
        .collect();
    FrameCompositor::new(&cfg, images, None).unwrap()
}

fn started_recorder(sink: &InMemorySink) -> Recorder {
    let mut rec = Recorder::new(
        Box::new(sink.clone()),
        SinkConfig {
            width: 8,
            height: 8,
            fps: Fps::new(10, 1).unwrap(),
            bitrate_bps: 1_000,
            container: Container::WebM,
        },
    );
    rec.start().unwrap();
    rec
}

fn running_state() -> (StateChannel, Arc<Mutex<Vec<ExportState>>>) {
    let state = StateChannel::new();
    state.enter(Phase::Running);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    state.subscribe(Arc::new(move |s: &ExportState| log.lock().unwrap().push(*s)));
    (state, seen)
}

#[test]
fn runs_every_slot_until_exhausted() {
    let timeline = Timeline::new(Duration::from_millis(100), 2).unwrap();
    let mut compositor = compositor_with(2);
    let sink = InMemorySink::new();
    let mut recorder = started_recorder(&sink);
    let mut ticker = SteppedTicker::new(Fps::new(10, 1).unwrap());
    let (state, _) = running_state();

    let (end, stats) = run_timeline(
        &timeline,
        &mut compositor,
        &mut recorder,
        &mut ticker,
        &state,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(end, RunEnd::Exhausted);
    assert_eq!(stats.ticks, 3);
    assert_eq!(stats.painted, 2);
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.captured, 2);
    assert_eq!(sink.recording().frames.len(), 2);
}

#[test]
fn ticks_without_a_ready_image_are_skipped_uncaptured() {
    // Three slots of 100 ms, but only the first image can be drawn.
    let timeline = Timeline::new(Duration::from_millis(100), 3).unwrap();
    let mut compositor = compositor_with(1);
    let sink = InMemorySink::new();
    let mut recorder = started_recorder(&sink);
    // Ticks at 0, 50, 100, ..., 300 ms.
    let mut ticker = SteppedTicker::new(Fps::new(20, 1).unwrap());
    let (state, seen) = running_state();

    let (end, stats) = run_timeline(
        &timeline,
        &mut compositor,
        &mut recorder,
        &mut ticker,
        &state,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(end, RunEnd::Exhausted);
    assert_eq!(stats.ticks, 7);
    assert_eq!(stats.painted, 2);
    assert_eq!(stats.skipped, 4);
    // Only the 0 ms slot was due while the first image was on screen.
    assert_eq!(stats.captured, 1);

    let rec = sink.recording();
    assert_eq!(rec.frames.len(), 1);
    assert_eq!(rec.frames[0].0.0, 0);
    drop(rec);

    // Skipped ticks never report progress.
    assert_eq!(state.current().progress_percent, 17);
    let progress: Vec<u8> = seen.lock().unwrap().iter().map(|s| s.progress_percent).collect();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]), "{progress:?}");
    assert!(progress.iter().all(|&p| p <= 17), "{progress:?}");
}

#[test]
fn cancelled_token_stops_before_the_first_tick() {
    let timeline = Timeline::new(Duration::from_millis(100), 1).unwrap();
    let mut compositor = compositor_with(1);
    let sink = InMemorySink::new();
    let mut recorder = started_recorder(&sink);
    let mut ticker = SteppedTicker::new(Fps::new(10, 1).unwrap());
    let (state, _) = running_state();
    let cancel = CancelToken::new();
    cancel.cancel();

    let (end, stats) = run_timeline(
        &timeline,
        &mut compositor,
        &mut recorder,
        &mut ticker,
        &state,
        &cancel,
    )
    .unwrap();

    assert_eq!(end, RunEnd::Cancelled);
    assert_eq!(stats, RunStats::default());
    assert!(sink.recording().frames.is_empty());
}
