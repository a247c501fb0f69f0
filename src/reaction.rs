/// Data the viewer assembles into a reaction
use crate::tier::MediaKind;
use serde::{Deserialize, Serialize};

/// Where a piece of media came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaSource {
    Gif,
    Sticker,
    Meme,
    CustomVideo,
}

impl MediaSource {
    /// Option bar entry that opens the picker for this source.
    /// Custom clips are uploaded from the meme picker.
    pub fn media_kind(self) -> MediaKind {
        match self {
            MediaSource::Gif => MediaKind::Gif,
            MediaSource::Sticker => MediaKind::Sticker,
            MediaSource::Meme | MediaSource::CustomVideo => MediaKind::Meme,
        }
    }
}

/// The single gif, sticker, meme or clip attached to a reaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSelection {
    #[serde(rename = "type")]
    pub source: MediaSource,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl MediaSelection {
    pub fn new(source: MediaSource, url: impl Into<String>, width: u32, height: u32) -> Self {
        MediaSelection {
            source,
            url: url.into(),
            width,
            height,
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f64 / self.height as f64
        }
    }
}

/// Text-to-speech voice read out by the overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceBot {
    /// Display name of the voice; also its key in the voices catalog
    #[serde(default)]
    pub key: String,
    #[serde(rename = "voiceAPIName")]
    pub voice_api_name: String,
}

/// Animated 3D text rendered from the message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Custom3DText {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Emote rained over the stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoteRaid {
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddOnKind {
    VoiceBot,
    Custom3DText,
    EmoteRaid,
}

impl AddOnKind {
    pub const ALL: [AddOnKind; 3] = [
        AddOnKind::VoiceBot,
        AddOnKind::Custom3DText,
        AddOnKind::EmoteRaid,
    ];

    /// Option bar entry gating this add-on
    pub fn media_kind(self) -> MediaKind {
        match self {
            AddOnKind::VoiceBot => MediaKind::VoiceBot,
            AddOnKind::Custom3DText => MediaKind::Text3D,
            AddOnKind::EmoteRaid => MediaKind::EmoteRaid,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOnPayload {
    VoiceBot(VoiceBot),
    Custom3DText(Custom3DText),
    EmoteRaid(EmoteRaid),
}

impl AddOnPayload {
    pub fn kind(&self) -> AddOnKind {
        match self {
            AddOnPayload::VoiceBot(_) => AddOnKind::VoiceBot,
            AddOnPayload::Custom3DText(_) => AddOnKind::Custom3DText,
            AddOnPayload::EmoteRaid(_) => AddOnKind::EmoteRaid,
        }
    }

    /// Text shown on the add-on pill
    pub fn label(&self) -> String {
        match self {
            AddOnPayload::VoiceBot(voice) => voice.key.clone(),
            AddOnPayload::Custom3DText(_) => "3D Text".to_string(),
            AddOnPayload::EmoteRaid(_) => "Emote Raid".to_string(),
        }
    }

    /// Image shown on the add-on pill, if any
    pub fn image_url(&self) -> Option<&str> {
        match self {
            AddOnPayload::VoiceBot(_) => None,
            AddOnPayload::Custom3DText(text) => Some(&text.url),
            AddOnPayload::EmoteRaid(emote) => Some(&emote.url),
        }
    }
}

/// An add-on attached to the reaction, stamped when it was set
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAddOn {
    pub payload: AddOnPayload,
    pub created_at: f64,
}

/// Bits tip added on top of the reaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraTip {
    pub cost: u32,
    #[serde(rename = "twitchSku")]
    pub sku: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarBackground {
    pub angle: f64,
    pub colors: Vec<String>,
}

/// The signed in viewer sending reactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    pub uid: String,
    pub user_name: String,
    pub twitch_username: String,
    pub photo_url: String,
    #[serde(default)]
    pub avatar_id: Option<String>,
    #[serde(default)]
    pub avatar_background: Option<AvatarBackground>,
    #[serde(default)]
    pub avatar_animation_id: Option<String>,
}

/// Channel owner receiving the reactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streamer {
    pub uid: String,
    pub display_name: String,
}
