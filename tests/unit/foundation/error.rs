use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ReelError::encoding_unsupported("x")
            .to_string()
            .contains("encoding unsupported:")
    );
    assert!(ReelError::encode("x").to_string().contains("encode error:"));
    assert!(
        ReelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn image_load_names_index_and_source() {
    let err = ReelError::image_load(2, "photos/c.png", "unexpected EOF");
    let msg = err.to_string();
    assert!(msg.contains("#2"));
    assert!(msg.contains("photos/c.png"));
    assert!(msg.contains("unexpected EOF"));
}

#[test]
fn user_notice_is_single_line() {
    let notices = [
        ReelError::image_load(0, "a", "b").user_notice(),
        ReelError::encoding_unsupported("none").user_notice(),
        ReelError::Busy.user_notice(),
        ReelError::encode("pipe closed").user_notice(),
    ];
    for n in notices {
        assert!(!n.is_empty());
        assert!(!n.contains('\n'));
    }
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
