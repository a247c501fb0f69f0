/// Error types for the reaction composer
use thiserror::Error;

/// Reasons a submission or an upload is refused before any external side effect happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Write a message or pick some media before sending")]
    EmptyReaction,

    #[error("You have no reactions left on this channel")]
    InsufficientCredits,

    #[error("Prices are still loading")]
    PricesLoading,

    #[error("Clips must be at most 8 seconds and 8 MB")]
    OversizedUpload,

    #[error("Only MP4, WebM and QuickTime clips can be uploaded")]
    InvalidUploadType,
}

/// Failures talking to the realtime store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store bridge failed: {0}")]
    Bridge(String),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to decode value at {path}: {message}")]
    Decode { path: String, message: String },
}

impl StoreError {
    pub fn decode(path: &str, err: impl std::fmt::Display) -> Self {
        StoreError::Decode {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            Rejection::EmptyReaction.to_string(),
            "Write a message or pick some media before sending"
        );
        assert!(Rejection::OversizedUpload.to_string().contains("8 seconds"));
    }

    #[test]
    fn test_store_error_from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: StoreError = json_err.into();
        assert!(matches!(err, StoreError::Encode(_)));
        assert!(StoreError::decode("/Users/1", "bad").to_string().contains("/Users/1"));
    }
}
