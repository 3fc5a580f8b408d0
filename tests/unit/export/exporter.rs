use super::*;

#[test]
fn whitespace_runs_become_single_dashes() {
    assert_eq!(sanitize_caption("Anna Bell"), "Anna-Bell");
    assert_eq!(sanitize_caption("Anna \t\n Bell"), "Anna-Bell");
    assert_eq!(sanitize_caption(" Anna "), "-Anna-");
}

#[test]
fn other_characters_are_kept() {
    assert_eq!(sanitize_caption("Zoë_O'Neil.2"), "Zoë_O'Neil.2");
    assert_eq!(sanitize_caption("💕Mi-Rae💕"), "💕Mi-Rae💕");
}

#[test]
fn path_hostile_characters_are_replaced() {
    assert_eq!(sanitize_caption("a/b\\c:d*e?f\"g<h>i|j"), "a-b-c-d-e-f-g-h-i-j");
    assert_eq!(sanitize_caption("../etc"), "..-etc");
    assert_eq!(sanitize_caption("x\u{0}y"), "x-y");
}

#[test]
fn empty_caption_gets_a_placeholder() {
    assert_eq!(sanitize_caption(""), "untitled");
}

#[test]
fn file_name_carries_suffix_and_extension() {
    assert_eq!(
        output_file_name("Anna Bell", Container::WebM),
        "Anna-Bell-love-story.webm"
    );
    assert_eq!(output_file_name("Sam", Container::Mp4), "Sam-love-story.mp4");
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let mut cfg = ExportConfig::default();
    cfg.per_image_ms = 0;
    let backend = Arc::new(crate::encode::sink::InMemoryBackend::new(
        crate::encode::sink::InMemorySink::new(),
    ));
    assert!(SlideshowExporter::new(cfg, backend).is_err());
}
