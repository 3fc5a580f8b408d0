use super::*;
use crate::encode::sink::InMemorySink;

fn solid(v: u8) -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 2,
        data: vec![v; 16],
        premultiplied: true,
    }
}

fn recorder(sink: &InMemorySink) -> Recorder {
    Recorder::new(
        Box::new(sink.clone()),
        SinkConfig {
            width: 2,
            height: 2,
            fps: Fps::new(10, 1).unwrap(),
            bitrate_bps: 1_000,
            container: Container::WebM,
        },
    )
}

#[test]
fn capture_requires_start() {
    let sink = InMemorySink::new();
    let mut rec = recorder(&sink);
    assert!(rec.capture(Duration::ZERO, &solid(1)).is_err());
    assert_eq!(sink.recording().begin_calls, 0);
}

#[test]
fn capture_fills_due_slots_in_order() {
    let sink = InMemorySink::new();
    let mut rec = recorder(&sink);
    rec.start().unwrap();

    // Slot grid at 10 fps: 0ms, 100ms, 200ms, ...
    assert_eq!(rec.capture(Duration::ZERO, &solid(1)).unwrap(), 1);
    assert_eq!(rec.capture(Duration::from_millis(50), &solid(2)).unwrap(), 0);
    assert_eq!(rec.capture(Duration::from_millis(320), &solid(3)).unwrap(), 3);

    let r = sink.recording();
    let idx: Vec<u64> = r.frames.iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1, 2, 3]);
    assert_eq!(r.frames[0].1.data[0], 1);
    assert!(r.frames[1..].iter().all(|(_, f)| f.data[0] == 3));
}

#[test]
fn stop_pads_to_exact_duration() {
    let sink = InMemorySink::new();
    let mut rec = recorder(&sink);
    rec.start().unwrap();
    rec.capture(Duration::ZERO, &solid(1)).unwrap();
    rec.capture(Duration::from_millis(120), &solid(2)).unwrap();

    let artifact = rec.stop(Duration::from_millis(1000)).unwrap();
    assert_eq!(artifact.frames, 10);
    assert_eq!(artifact.duration, Duration::from_secs(1));
    assert_eq!(artifact.container, Container::WebM);
    assert_eq!(artifact.path, None);

    let r = sink.recording();
    assert!(r.ended);
    assert_eq!(r.frames.len(), 10);
    assert!(r.frames[2..].iter().all(|(_, f)| f.data[0] == 2));
}

#[test]
fn stop_without_any_paint_fails_and_aborts() {
    let sink = InMemorySink::new();
    let mut rec = recorder(&sink);
    rec.start().unwrap();
    assert!(rec.stop(Duration::from_millis(500)).is_err());
    let r = sink.recording();
    assert!(r.aborted);
    assert!(!r.ended);
}

#[test]
fn abort_releases_sink() {
    let sink = InMemorySink::new();
    let mut rec = recorder(&sink);
    rec.start().unwrap();
    rec.capture(Duration::ZERO, &solid(9)).unwrap();
    rec.abort();
    let r = sink.recording();
    assert!(r.aborted);
    assert!(r.frames.is_empty());
}

#[test]
fn double_start_is_rejected() {
    let sink = InMemorySink::new();
    let mut rec = recorder(&sink);
    rec.start().unwrap();
    assert!(rec.start().is_err());
    assert_eq!(sink.recording().begin_calls, 1);
}
