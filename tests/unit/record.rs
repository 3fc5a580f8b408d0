use super::*;

const STORE: &str = r#"{
  "k3x9qa": {
    "id": "1707900000000",
    "slug": "k3x9qa",
    "yourName": "Sam",
    "partnerName": "Anna Bell",
    "message": "hi",
    "images": ["data:image/png;base64,AAAA", "https://example.com/b.jpg", "photos/c.png"],
    "date": "2025-02-14",
    "pin": "",
    "song": "https://example.com/song.mp3"
  },
  "p1n000": {
    "id": "1",
    "slug": "p1n000",
    "yourName": "A",
    "partnerName": "B",
    "message": "",
    "images": [],
    "date": "",
    "pin": "4321",
    "song": ""
  }
}"#;

#[test]
fn parses_camel_case_records() {
    let store = GreetingStore::from_json_str(STORE).unwrap();
    assert_eq!(store.len(), 2);
    let rec = store.lookup("k3x9qa").unwrap().unwrap();
    assert_eq!(rec.your_name, "Sam");
    assert_eq!(rec.partner_name, "Anna Bell");
    assert_eq!(rec.images.len(), 3);
    assert!(!rec.is_locked());
}

#[test]
fn record_becomes_export_request() {
    let store = GreetingStore::from_json_str(STORE).unwrap();
    let req = store.lookup("k3x9qa").unwrap().unwrap().to_request();
    assert_eq!(req.caption, "Anna Bell");
    assert!(matches!(req.sources[0], ImageSource::DataUrl(_)));
    assert!(matches!(req.sources[1], ImageSource::Url(_)));
    assert!(matches!(req.sources[2], ImageSource::Path(_)));
}

#[test]
fn pin_gates_locked_records() {
    let store = GreetingStore::from_json_str(STORE).unwrap();
    let rec = store.lookup("p1n000").unwrap().unwrap();
    assert!(rec.is_locked());
    assert!(!rec.unlock(None));
    assert!(!rec.unlock(Some("0000")));
    assert!(rec.unlock(Some("4321")));
}

#[test]
fn missing_and_malformed_slugs() {
    let store = GreetingStore::from_json_str(STORE).unwrap();
    assert_eq!(store.lookup("zzzzzz").unwrap(), None);
    assert!(store.lookup("short").is_err());
    assert!(store.lookup("../../x").is_err());
    assert!(store.lookup("k3x9qa ").is_err());
}

#[test]
fn sample_slug_always_resolves() {
    let store = GreetingStore::default();
    assert!(store.is_empty());
    let rec = store.lookup(SAMPLE_SLUG).unwrap().unwrap();
    assert_eq!(rec.partner_name, "Juliet");
    assert!(rec.unlock(Some("1234")));
}

#[test]
fn optional_fields_default() {
    let text = r#"{"abc123":{"id":"1","slug":"abc123","yourName":"A","partnerName":"B"}}"#;
    let store = GreetingStore::from_json_str(text).unwrap();
    let rec = store.lookup("abc123").unwrap().unwrap();
    assert!(rec.images.is_empty());
    assert_eq!(rec.pin, None);
    assert!(rec.to_request().sources.is_empty());
}

#[test]
fn malformed_store_is_a_serde_error() {
    assert!(matches!(
        GreetingStore::from_json_str("[1,2]"),
        Err(ReelError::Serde(_))
    ));
}
