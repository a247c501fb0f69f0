/// Records written to the store for the overlay and for moderation
///
/// Field names follow the layout the overlay already reads, including a few historical names
/// (`amountQoins`, `emojiRain`).
use crate::reaction::{AvatarBackground, Custom3DText, MediaSelection, Streamer, Viewer};
use serde::{Deserialize, Serialize};

/// Value of `donationType` for every reaction sent from the panel
pub const DONATION_TYPE_BITS: &str = "Bits";

/// Tag of the only rain the overlay supports
pub const EMOJI_RAIN_EMOTE: &str = "emote";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarRecord {
    pub avatar_id: Option<String>,
    pub avatar_background: Option<AvatarBackground>,
    pub avatar_animation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageExtraData {
    #[serde(rename = "voiceAPIName", skip_serializing_if = "Option::is_none")]
    pub voice_api_name: Option<String>,
    #[serde(rename = "voiceName", skip_serializing_if = "Option::is_none")]
    pub voice_name: Option<String>,
    #[serde(rename = "giphyText", skip_serializing_if = "Option::is_none")]
    pub giphy_text: Option<Custom3DText>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiRain {
    #[serde(rename = "type")]
    pub kind: String,
    pub emojis: Vec<String>,
}

impl EmojiRain {
    pub fn emotes(emojis: Vec<String>) -> Self {
        EmojiRain {
            kind: EMOJI_RAIN_EMOTE.to_string(),
            emojis,
        }
    }
}

/// Public record the overlay plays, stored under `StreamersDonations/{streamerUid}/{key}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRecord {
    pub avatar: AvatarRecord,
    /// Bits paid; zero when the reaction was paid with a credit only
    pub amount_qoins: u32,
    pub donation_type: String,
    pub media: Option<MediaSelection>,
    pub message: String,
    pub message_extra_data: MessageExtraData,
    pub emoji_rain: EmojiRain,
    pub timestamp: f64,
    pub uid: String,
    pub twitch_user_name: String,
    pub user_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub points_channel_interactions: bool,
    pub read: bool,
}

/// Moderation copy stored under `StreamersDonationAdministrative/{key}` with the same key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministrativeRecord {
    pub amount_qoins: u32,
    pub message: String,
    pub timestamp: f64,
    pub uid: String,
    pub sent: bool,
    pub twitch_user_name: String,
    pub user_name: String,
    pub streamer_name: String,
    pub points_channel_interactions: bool,
    pub donation_type: String,
}

impl AdministrativeRecord {
    pub fn for_donation(donation: &DonationRecord, streamer: &Streamer) -> Self {
        AdministrativeRecord {
            amount_qoins: donation.amount_qoins,
            message: donation.message.clone(),
            timestamp: donation.timestamp,
            uid: donation.uid.clone(),
            sent: false,
            twitch_user_name: donation.twitch_user_name.clone(),
            user_name: donation.user_name.clone(),
            streamer_name: streamer.display_name.clone(),
            points_channel_interactions: donation.points_channel_interactions,
            donation_type: donation.donation_type.clone(),
        }
    }
}

impl AvatarRecord {
    pub fn of(viewer: &Viewer) -> Self {
        AvatarRecord {
            avatar_id: viewer.avatar_id.clone(),
            avatar_background: viewer.avatar_background.clone(),
            avatar_animation_id: viewer.avatar_animation_id.clone(),
        }
    }
}
