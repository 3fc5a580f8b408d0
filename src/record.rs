//! Read-only access to the greeting store: a JSON object mapping slugs to greeting records.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context as _;

use crate::assets::source::ImageSource;
use crate::export::exporter::ExportRequest;
use crate::foundation::error::{ReelError, ReelResult};

/// Length of a greeting slug.
pub const SLUG_LEN: usize = 6;

/// Slug of the built-in demo greeting, available even when the store does not contain it.
pub const SAMPLE_SLUG: &str = "sample";

/// One stored greeting. Only `images` and `partner_name` feed the exporter.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreetingRecord {
    /// Creation id (a millisecond timestamp string).
    pub id: String,
    /// Short link id.
    pub slug: String,
    /// Sender name.
    pub your_name: String,
    /// Recipient name, used as the video caption.
    pub partner_name: String,
    /// Free-form message.
    #[serde(default)]
    pub message: String,
    /// Image sources in display order: `data:` URLs, `http(s)` URLs or paths.
    #[serde(default)]
    pub images: Vec<String>,
    /// Date string as entered.
    #[serde(default)]
    pub date: String,
    /// Optional 4-digit lock code. An empty string means unlocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    /// Background song URL.
    #[serde(default)]
    pub song: String,
}

impl GreetingRecord {
    /// The demo greeting served for [`SAMPLE_SLUG`].
    pub fn sample() -> Self {
        Self {
            id: "sample".to_string(),
            slug: SAMPLE_SLUG.to_string(),
            your_name: "Romeo".to_string(),
            partner_name: "Juliet".to_string(),
            message: "In your eyes, I see the reflection of a thousand beautiful tomorrows. \
                      You are the heartbeat that keeps my soul alive."
                .to_string(),
            images: vec![
                "https://picsum.photos/seed/lovev1/800/800".to_string(),
                "https://picsum.photos/seed/lovev2/800/800".to_string(),
            ],
            date: "2024-02-14".to_string(),
            pin: Some("1234".to_string()),
            song: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3".to_string(),
        }
    }

    /// Whether the record is protected by a PIN.
    pub fn is_locked(&self) -> bool {
        self.pin.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Compare `attempt` against the stored PIN. Unlocked records accept anything.
    pub fn unlock(&self, attempt: Option<&str>) -> bool {
        match self.pin.as_deref() {
            None | Some("") => true,
            Some(pin) => attempt == Some(pin),
        }
    }

    /// Export request for this greeting: its images, captioned with the partner name.
    pub fn to_request(&self) -> ExportRequest {
        ExportRequest::new(
            self.images.iter().map(|s| ImageSource::parse(s)).collect(),
            self.partner_name.clone(),
        )
    }
}

/// The whole store, keyed by slug.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GreetingStore {
    records: BTreeMap<String, GreetingRecord>,
}

impl GreetingStore {
    /// Parse a store from its JSON text.
    pub fn from_json_str(text: &str) -> ReelResult<Self> {
        let records: BTreeMap<String, GreetingRecord> =
            serde_json::from_str(text).map_err(|e| ReelError::serde(format!("greeting store: {e}")))?;
        for (key, record) in &records {
            if key != &record.slug {
                tracing::warn!(key = %key, slug = %record.slug, "store key does not match record slug");
            }
        }
        Ok(Self { records })
    }

    /// Read and parse a store file.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read greeting store '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find the record for `slug`. The demo slug resolves even when it is not stored.
    pub fn lookup(&self, slug: &str) -> ReelResult<Option<GreetingRecord>> {
        validate_slug(slug)?;
        if let Some(record) = self.records.get(slug) {
            return Ok(Some(record.clone()));
        }
        if slug == SAMPLE_SLUG {
            return Ok(Some(GreetingRecord::sample()));
        }
        Ok(None)
    }
}

/// Slugs are exactly [`SLUG_LEN`] ASCII letters or digits.
pub fn validate_slug(slug: &str) -> ReelResult<()> {
    if slug.len() != SLUG_LEN || !slug.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(ReelError::validation(format!(
            "slug '{slug}' must be {SLUG_LEN} ASCII letters or digits"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/record.rs"]
mod tests;
