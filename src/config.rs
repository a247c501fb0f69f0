/// Configuration handed in by the extension page when the panel starts
use crate::reaction::Viewer;
use serde::{Deserialize, Serialize};

/// Everything the composer needs from its host page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerConfig {
    /// Twitch channel id the panel is displayed on
    pub channel_id: String,
    pub viewer: Viewer,
    #[serde(default)]
    pub limits: Limits,
}

/// Input limits applied by the panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Limits {
    pub max_message_chars: usize,
    pub max_clip_seconds: f64,
    pub max_upload_bytes: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_message_chars: 100,
            max_clip_seconds: 8.0,
            max_upload_bytes: 8 * 1024 * 1024,
        }
    }
}
