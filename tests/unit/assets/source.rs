use super::*;

#[test]
fn parse_classifies_sources() {
    assert!(matches!(
        ImageSource::parse("data:image/png;base64,AAAA"),
        ImageSource::DataUrl(_)
    ));
    assert!(matches!(
        ImageSource::parse("HTTPS://example.com/a.jpg"),
        ImageSource::Url(_)
    ));
    assert!(matches!(
        ImageSource::parse("http://example.com/a.jpg"),
        ImageSource::Url(_)
    ));
    assert_eq!(
        ImageSource::parse(" photos/a.jpg "),
        ImageSource::Path(PathBuf::from("photos/a.jpg"))
    );
    assert_eq!(
        ImageSource::parse("ht"),
        ImageSource::Path(PathBuf::from("ht"))
    );
}

#[test]
fn data_url_label_hides_payload() {
    let src = ImageSource::parse("data:image/jpeg;base64,/9j/4AAQSkZJRg==");
    assert_eq!(src.label(), "data:image/jpeg;base64,…");
}

#[test]
fn decodes_base64_data_url() {
    let bytes = decode_data_url("data:image/png;base64,aGVs\nbG8=").unwrap();
    assert_eq!(bytes, b"hello");
}

#[test]
fn rejects_non_base64_data_url() {
    assert!(decode_data_url("data:text/plain,hello").is_err());
    assert!(decode_data_url("data:image/png;base64").is_err());
    assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    assert!(decode_data_url("file:///x.png").is_err());
}

#[test]
fn reads_path_and_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.bin");
    std::fs::write(&path, [1u8, 2, 3]).unwrap();

    let opts = FetchOpts::default();
    let from_path = read_source_bytes(&ImageSource::Path(path), &opts).unwrap();
    assert_eq!(&*from_path, &[1, 2, 3]);

    let from_bytes = read_source_bytes(&ImageSource::from(vec![4u8, 5]), &opts).unwrap();
    assert_eq!(&*from_bytes, &[4, 5]);

    let missing = read_source_bytes(&ImageSource::Path(dir.path().join("nope.png")), &opts);
    assert!(missing.is_err());
}
