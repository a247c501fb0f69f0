/// Tier policy: which media options a reaction level unlocks and what it costs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reaction level. Higher levels unlock everything below them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ReactionTier {
    One,
    Two,
    Three,
}

impl ReactionTier {
    pub const ALL: [ReactionTier; 3] = [ReactionTier::One, ReactionTier::Two, ReactionTier::Three];

    /// Tiers that are charged in Bits
    pub const PAID: [ReactionTier; 2] = [ReactionTier::Two, ReactionTier::Three];

    pub fn number(self) -> u8 {
        match self {
            ReactionTier::One => 1,
            ReactionTier::Two => 2,
            ReactionTier::Three => 3,
        }
    }

    /// Key used for this tier under the price nodes of the store (e.g. "level2")
    pub fn level_key(self) -> String {
        format!("level{}", self.number())
    }
}

impl TryFrom<u8> for ReactionTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ReactionTier::One),
            2 => Ok(ReactionTier::Two),
            3 => Ok(ReactionTier::Three),
            other => Err(format!("invalid reaction level: {}", other)),
        }
    }
}

impl From<ReactionTier> for u8 {
    fn from(tier: ReactionTier) -> u8 {
        tier.number()
    }
}

impl fmt::Display for ReactionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level {}", self.number())
    }
}

/// Entries of the media option bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Gif,
    Sticker,
    Meme,
    Text3D,
    VoiceBot,
    EmoteRaid,
}

impl MediaKind {
    /// Display order of the option bar: most recently unlocked options first
    pub const DISPLAY_ORDER: [MediaKind; 6] = [
        MediaKind::EmoteRaid,
        MediaKind::Text3D,
        MediaKind::VoiceBot,
        MediaKind::Gif,
        MediaKind::Sticker,
        MediaKind::Meme,
    ];

    pub fn required_tier(self) -> ReactionTier {
        match self {
            MediaKind::Gif | MediaKind::Sticker | MediaKind::Meme => ReactionTier::One,
            MediaKind::Text3D | MediaKind::VoiceBot => ReactionTier::Two,
            MediaKind::EmoteRaid => ReactionTier::Three,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Gif => "GIFs",
            MediaKind::Sticker => "Stickers",
            MediaKind::Meme => "Memes",
            MediaKind::Text3D => "3D Text",
            MediaKind::VoiceBot => "Bot Voice",
            MediaKind::EmoteRaid => "Emote Raid",
        }
    }
}

/// Options available at the given tier, in option bar order
pub fn available_media(tier: ReactionTier) -> Vec<MediaKind> {
    MediaKind::DISPLAY_ORDER
        .into_iter()
        .filter(|kind| kind.required_tier() <= tier)
        .collect()
}

/// True if `kind` needs a higher tier than `tier`
pub fn is_locked(kind: MediaKind, tier: ReactionTier) -> bool {
    kind.required_tier() > tier
}

/// Price of a paid tier and the product the Bits purchase is made with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelPrice {
    pub price: u32,
    #[serde(rename = "twitchSku")]
    pub sku: String,
}

/// Load state of one price entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PriceSlot {
    #[default]
    Loading,
    Missing,
    Set(LevelPrice),
}

impl From<Option<LevelPrice>> for PriceSlot {
    fn from(price: Option<LevelPrice>) -> Self {
        price.map_or(PriceSlot::Missing, PriceSlot::Set)
    }
}

/// Streamer configured prices with the global defaults behind them
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceTable {
    streamer: [PriceSlot; 2],
    defaults: [PriceSlot; 2],
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(tier: ReactionTier) -> Option<usize> {
        match tier {
            ReactionTier::One => None,
            ReactionTier::Two => Some(0),
            ReactionTier::Three => Some(1),
        }
    }

    /// Record the streamer's own price for a paid tier. Ignored for tier one.
    pub fn set_streamer_price(&mut self, tier: ReactionTier, slot: PriceSlot) {
        if let Some(i) = Self::index(tier) {
            self.streamer[i] = slot;
        }
    }

    /// Record the global default price for a paid tier. Ignored for tier one.
    pub fn set_default_price(&mut self, tier: ReactionTier, slot: PriceSlot) {
        if let Some(i) = Self::index(tier) {
            self.defaults[i] = slot;
        }
    }
}

/// What submitting at a tier costs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionCost {
    /// Paid with one reaction credit
    Free,
    /// Price not known yet; sending must stay disabled
    Loading,
    Bits(LevelPrice),
}

impl ReactionCost {
    pub fn is_loading(&self) -> bool {
        matches!(self, ReactionCost::Loading)
    }
}

pub fn cost_for(tier: ReactionTier, prices: &PriceTable) -> ReactionCost {
    let Some(i) = PriceTable::index(tier) else {
        return ReactionCost::Free;
    };

    match &prices.streamer[i] {
        PriceSlot::Set(price) => ReactionCost::Bits(price.clone()),
        PriceSlot::Loading => ReactionCost::Loading,
        PriceSlot::Missing => match &prices.defaults[i] {
            PriceSlot::Set(price) => ReactionCost::Bits(price.clone()),
            PriceSlot::Loading | PriceSlot::Missing => ReactionCost::Loading,
        },
    }
}
