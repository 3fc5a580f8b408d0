use super::*;

#[test]
fn escapes_markup_in_caption() {
    assert_eq!(
        xml_escape(r#"Tom & "Jerry" <3 'x'"#),
        "Tom &amp; &quot;Jerry&quot; &lt;3 &apos;x&apos;"
    );
    assert_eq!(xml_escape("a\u{7}b"), "ab");
    assert_eq!(xml_escape("Zoë 💕"), "Zoë 💕");
}

#[test]
fn svg_places_lines_at_reference_offsets() {
    let cfg = ExportConfig::default();
    let svg = overlay_svg("Sam", &cfg);
    assert!(svg.contains(r#"width="720" height="1280""#));
    assert!(svg.contains(r#"x="360" y="1130""#));
    assert!(svg.contains(r#"x="360" y="1210""#));
    assert!(svg.contains(">Our Eternal Bond</text>"));
    assert!(svg.contains(r##"font-weight="bold" font-size="64" fill="#f43f5e">Sam</text>"##));
    assert!(svg.contains(r#"stdDeviation="10""#));
}

#[test]
fn svg_scales_offsets_with_canvas_height() {
    let mut cfg = ExportConfig::default();
    cfg.canvas = Canvas {
        width: 360,
        height: 640,
    };
    let svg = overlay_svg("Sam", &cfg);
    assert!(svg.contains(r#"x="180" y="565""#));
    assert!(svg.contains(r#"x="180" y="605""#));
}

#[test]
fn svg_omits_shadow_without_blur_and_empty_lines() {
    let mut cfg = ExportConfig::default();
    cfg.shadow_blur_px = 0.0;
    cfg.subtitle = "  ".to_string();
    let svg = overlay_svg("", &cfg);
    assert!(!svg.contains("filter"));
    assert!(!svg.contains("<text"));
}

#[test]
fn render_matches_canvas_and_empty_text_is_blank() {
    let mut cfg = ExportConfig::default();
    cfg.canvas = Canvas {
        width: 64,
        height: 128,
    };
    cfg.subtitle = String::new();
    let overlay = CaptionOverlay::render("", &cfg).unwrap();
    assert_eq!((overlay.width, overlay.height), (64, 128));
    assert_eq!(overlay.rgba8_premul.len(), 64 * 128 * 4);
    assert!(overlay.is_blank());
}

#[test]
fn hostile_caption_still_parses() {
    let mut cfg = ExportConfig::default();
    cfg.canvas = Canvas {
        width: 32,
        height: 32,
    };
    assert!(CaptionOverlay::render("</text><script>&&", &cfg).is_ok());
}

#[test]
fn font_dir_without_fonts_still_renders() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a font").unwrap();
    let mut cfg = ExportConfig::default();
    cfg.canvas = Canvas {
        width: 48,
        height: 96,
    };
    cfg.font_dir = Some(dir.path().to_path_buf());
    let overlay = CaptionOverlay::render("Sam", &cfg).unwrap();
    assert_eq!(overlay.rgba8_premul.len(), 48 * 96 * 4);
}
