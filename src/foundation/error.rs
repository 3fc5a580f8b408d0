/// Result alias used across the crate.
pub type ReelResult<T> = Result<T, ReelError>;

/// Errors surfaced by loading, compositing and encoding a reel.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid configuration or caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// An image source could not be fetched or decoded. The whole load is aborted.
    #[error("image load error: source #{index} ('{source_label}'): {reason}")]
    ImageLoad {
        /// Position of the failing source in the input order.
        index: usize,
        /// Short human-readable label of the source (path, URL or `data:` prefix).
        source_label: String,
        /// Underlying cause.
        reason: String,
    },

    /// No usable container/codec combination exists on this runtime.
    #[error("encoding unsupported: {0}")]
    EncodingUnsupported(String),

    /// The encoder failed after capture started.
    #[error("encode error: {0}")]
    Encode(String),

    /// Another export is already running on this exporter.
    #[error("an export is already running on this exporter")]
    Busy,

    /// Reading or writing JSON failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually IO with attached context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::ImageLoad`].
    pub fn image_load(index: usize, source_label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ImageLoad {
            index,
            source_label: source_label.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`ReelError::EncodingUnsupported`].
    pub fn encoding_unsupported(msg: impl Into<String>) -> Self {
        Self::EncodingUnsupported(msg.into())
    }

    /// Build a [`ReelError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReelError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Single-line message suitable for showing to an end user.
    pub fn user_notice(&self) -> String {
        match self {
            Self::ImageLoad { .. } => {
                "Some images couldn't be processed. Try using different files.".to_string()
            }
            Self::EncodingUnsupported(_) => {
                "Video export is not supported on this system.".to_string()
            }
            Self::Busy => "A video is already being generated.".to_string(),
            other => format!("Video export failed: {other}"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
