/// In-progress reaction owned by the composer panel
use crate::reaction::{ActiveAddOn, AddOnKind, AddOnPayload, Custom3DText, ExtraTip, MediaSelection};
use crate::tier::{is_locked, MediaKind, ReactionTier};
use std::collections::BTreeMap;

/// Source of "now" in milliseconds since the epoch
pub type Clock = fn() -> f64;

#[cfg(target_arch = "wasm32")]
pub fn system_clock() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn system_clock() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[derive(Debug, Clone)]
pub struct Composition {
    message: String,
    media: Option<MediaSelection>,
    add_ons: BTreeMap<AddOnKind, ActiveAddOn>,
    extra_tip: Option<ExtraTip>,
    tipping: bool,
    tier: ReactionTier,
    clock: Clock,
}

impl Composition {
    pub fn new() -> Self {
        Self::with_clock(system_clock)
    }

    pub fn with_clock(clock: Clock) -> Self {
        Composition {
            message: String::new(),
            media: None,
            add_ons: BTreeMap::new(),
            extra_tip: None,
            tipping: false,
            tier: ReactionTier::One,
            clock,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn media(&self) -> Option<&MediaSelection> {
        self.media.as_ref()
    }

    pub fn tier(&self) -> ReactionTier {
        self.tier
    }

    pub fn extra_tip(&self) -> Option<&ExtraTip> {
        self.extra_tip.as_ref()
    }

    /// True while the tip menu is open
    pub fn is_tipping(&self) -> bool {
        self.tipping
    }

    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message = text.into();
    }

    /// Replace the attached media. Gifs, stickers, memes and clips exclude each other.
    pub fn select_media(&mut self, item: MediaSelection) {
        self.media = Some(item);
    }

    pub fn clear_media(&mut self) {
        self.media = None;
    }

    /// Attach an add-on, replacing any previous one of the same kind
    pub fn set_add_on(&mut self, payload: AddOnPayload) {
        let created_at = (self.clock)();
        self.add_ons.insert(payload.kind(), ActiveAddOn { payload, created_at });
    }

    pub fn remove_add_on(&mut self, kind: AddOnKind) {
        self.add_ons.remove(&kind);
    }

    pub fn add_on(&self, kind: AddOnKind) -> Option<&AddOnPayload> {
        self.add_ons.get(&kind).map(|active| &active.payload)
    }

    /// Active add-ons, most recently set first
    pub fn active_add_ons(&self) -> Vec<&ActiveAddOn> {
        let mut active: Vec<&ActiveAddOn> = self.add_ons.values().collect();
        active.sort_by(|a, b| b.created_at.total_cmp(&a.created_at));
        active
    }

    /// 3D text replaces the typed message with the text it was rendered from
    pub fn set_custom_3d_text(&mut self, message: impl Into<String>, text: Custom3DText) {
        self.set_message(message);
        self.set_add_on(AddOnPayload::Custom3DText(text));
    }

    /// Whether the option is currently in use, for highlighting the option bar
    pub fn is_option_selected(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Gif | MediaKind::Sticker | MediaKind::Meme => self
                .media
                .as_ref()
                .is_some_and(|media| media.source.media_kind() == kind),
            MediaKind::Text3D => self.add_ons.contains_key(&AddOnKind::Custom3DText),
            MediaKind::VoiceBot => self.add_ons.contains_key(&AddOnKind::VoiceBot),
            MediaKind::EmoteRaid => self.add_ons.contains_key(&AddOnKind::EmoteRaid),
        }
    }

    /// Move to another tier, dropping add-ons the new tier does not allow.
    ///
    /// Returns `open` back if that option is usable once the new tier is in place, so the caller
    /// can open its picker after the gate has widened.
    pub fn change_tier(&mut self, new_tier: ReactionTier, open: Option<MediaKind>) -> Option<MediaKind> {
        self.add_ons
            .retain(|kind, _| !is_locked(kind.media_kind(), new_tier));
        self.tier = new_tier;

        open.filter(|kind| !is_locked(*kind, new_tier))
    }

    /// Choose a tip (or none); closes the tip menu
    pub fn set_extra_tip(&mut self, tip: Option<ExtraTip>) {
        self.extra_tip = tip;
        self.tipping = false;
    }

    pub fn toggle_tipping(&mut self) {
        self.tipping = !self.tipping;
    }

    pub fn open_tipping(&mut self) {
        self.tipping = true;
    }

    /// A reaction needs at least a message or some media
    pub fn can_submit(&self) -> bool {
        !self.message.is_empty() || self.media.is_some()
    }

    /// Clear everything the viewer entered. The chosen tier is kept.
    pub fn reset(&mut self) {
        self.message.clear();
        self.media = None;
        self.add_ons.clear();
        self.extra_tip = None;
        self.tipping = false;
    }
}

impl Default for Composition {
    fn default() -> Self {
        Self::new()
    }
}
