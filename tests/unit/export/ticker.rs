use super::*;

#[test]
fn stepped_ticker_walks_the_capture_grid() {
    let fps = Fps::new(30, 1).unwrap();
    let mut t = SteppedTicker::new(fps);
    t.start();
    let ticks: Vec<Duration> = (0..4).map(|_| t.next_frame()).collect();
    assert_eq!(ticks[0], Duration::ZERO);
    for (k, tick) in ticks.iter().enumerate() {
        assert_eq!(fps.frames_elapsed(*tick), k as u64);
    }

    t.start();
    assert_eq!(t.next_frame(), Duration::ZERO);
}

#[test]
fn stepped_ticker_hits_total_exactly() {
    let mut t = SteppedTicker::new(Fps::new(30, 1).unwrap());
    t.start();
    let mut last = Duration::ZERO;
    for _ in 0..=120 {
        last = t.next_frame();
    }
    assert_eq!(last, Duration::from_millis(4000));
}

#[test]
fn display_ticker_is_monotonic_and_paced() {
    let mut t = DisplayTicker::new(200).unwrap();
    t.start();
    let a = t.next_frame();
    let b = t.next_frame();
    let c = t.next_frame();
    assert!(a <= b && b <= c);
    assert!(c >= Duration::from_millis(9), "two intervals at 200 Hz, got {c:?}");
}

#[test]
fn display_ticker_rejects_zero_rate() {
    assert!(DisplayTicker::new(0).is_err());
}
