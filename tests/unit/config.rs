use super::*;

#[test]
fn defaults_match_portrait_reel() {
    let cfg = ExportConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.canvas, Canvas::PORTRAIT_720P);
    assert_eq!(cfg.fps, Fps::new(30, 1).unwrap());
    assert_eq!(cfg.per_image_duration(), Duration::from_millis(2000));
    assert_eq!(cfg.bitrate_bps, 3_000_000);
    assert_eq!(cfg.containers, vec![Container::WebM, Container::Mp4]);
    assert_eq!(cfg.fit, FitMode::Stretch);
}

#[test]
fn validation_catches_bad_values() {
    let bad = [
        ExportConfig {
            canvas: Canvas {
                width: 0,
                height: 10,
            },
            ..Default::default()
        },
        ExportConfig {
            canvas: Canvas {
                width: 11,
                height: 10,
            },
            ..Default::default()
        },
        ExportConfig {
            canvas: Canvas {
                width: 70_000,
                height: 10,
            },
            ..Default::default()
        },
        ExportConfig {
            fps: Fps { num: 0, den: 1 },
            ..Default::default()
        },
        ExportConfig {
            per_image_ms: 0,
            ..Default::default()
        },
        ExportConfig {
            zoom_factor: f64::NAN,
            ..Default::default()
        },
        ExportConfig {
            fade_fraction: 0.0,
            ..Default::default()
        },
        ExportConfig {
            fade_fraction: 0.6,
            ..Default::default()
        },
        ExportConfig {
            bitrate_bps: 0,
            ..Default::default()
        },
        ExportConfig {
            containers: vec![],
            ..Default::default()
        },
        ExportConfig {
            loader_threads: Some(0),
            ..Default::default()
        },
        ExportConfig {
            caption_size_px: -1.0,
            ..Default::default()
        },
        ExportConfig {
            display_hz: 0,
            ..Default::default()
        },
    ];
    for cfg in bad {
        assert!(
            matches!(cfg.validate(), Err(ReelError::Validation(_))),
            "{cfg:?}"
        );
    }
}

#[test]
fn partial_json_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reel.json");
    std::fs::write(
        &path,
        r##"{ "per_image_ms": 1500, "background": "#101010", "fit": "cover", "containers": ["mp4"] }"##,
    )
    .unwrap();

    let cfg = ExportConfig::from_path(&path).unwrap();
    assert_eq!(cfg.per_image_ms, 1500);
    assert_eq!(cfg.background, Rgba8::rgb(16, 16, 16));
    assert_eq!(cfg.fit, FitMode::Cover);
    assert_eq!(cfg.containers, vec![Container::Mp4]);
    assert_eq!(cfg.canvas, Canvas::PORTRAIT_720P);
}

#[test]
fn unknown_fields_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reel.json");
    std::fs::write(&path, r#"{ "per_image": 1500 }"#).unwrap();
    assert!(matches!(
        ExportConfig::from_path(&path),
        Err(ReelError::Serde(_))
    ));
}

#[test]
fn prefer_container_reorders_without_duplicates() {
    let mut cfg = ExportConfig::default();
    cfg.prefer_container(Container::Mp4);
    assert_eq!(cfg.containers, vec![Container::Mp4, Container::WebM]);
    cfg.prefer_container(Container::Mp4);
    assert_eq!(cfg.containers, vec![Container::Mp4, Container::WebM]);
}
