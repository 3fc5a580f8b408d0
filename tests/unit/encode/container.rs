use super::*;

struct FixedProbe(Vec<Container>);

impl EncoderProbe for FixedProbe {
    fn supports(&self, container: Container) -> ReelResult<bool> {
        Ok(self.0.contains(&container))
    }
}

struct MissingRuntime;

impl EncoderProbe for MissingRuntime {
    fn supports(&self, _container: Container) -> ReelResult<bool> {
        Err(ReelError::encoding_unsupported("ffmpeg not found"))
    }
}

#[test]
fn prefers_first_supported_container() {
    let prefs = [Container::WebM, Container::Mp4];
    let both = FixedProbe(vec![Container::WebM, Container::Mp4]);
    assert_eq!(negotiate_container(&prefs, &both).unwrap(), Container::WebM);

    let mp4_only = FixedProbe(vec![Container::Mp4]);
    assert_eq!(
        negotiate_container(&prefs, &mp4_only).unwrap(),
        Container::Mp4
    );
}

#[test]
fn no_supported_container_is_fatal() {
    let prefs = [Container::WebM, Container::Mp4];
    let none = FixedProbe(vec![]);
    let err = negotiate_container(&prefs, &none).unwrap_err();
    assert!(matches!(err, ReelError::EncodingUnsupported(_)));
    assert!(err.to_string().contains("libvpx-vp9"));
    assert!(err.to_string().contains("libx264"));
}

#[test]
fn missing_runtime_propagates() {
    let err = negotiate_container(&[Container::Mp4], &MissingRuntime).unwrap_err();
    assert!(matches!(err, ReelError::EncodingUnsupported(_)));
}

#[test]
fn container_names_and_parsing() {
    assert_eq!(Container::WebM.extension(), "webm");
    assert_eq!(Container::Mp4.mime_type(), "video/mp4");
    assert_eq!("WebM".parse::<Container>().unwrap(), Container::WebM);
    assert_eq!(" mp4 ".parse::<Container>().unwrap(), Container::Mp4);
    assert!("avi".parse::<Container>().is_err());
    assert_eq!(
        serde_json::to_string(&[Container::WebM, Container::Mp4]).unwrap(),
        r#"["webm","mp4"]"#
    );
}

#[test]
fn parses_ffmpeg_encoder_listing() {
    let text = "\
Encoders:
 V..... = Video
 A..... = Audio
 ------
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC (codec h264)
 V....D libvpx-vp9           libvpx VP9 (codec vp9)
 A....D aac                  AAC (Advanced Audio Coding)
";
    let list = parse_encoder_list(text);
    assert_eq!(list, vec!["libx264", "libvpx-vp9", "aac"]);
}
