/// Reads, subscriptions and writes the panel performs against the store
use crate::composer::ReactionWrite;
use crate::error::StoreError;
use crate::reaction::{ExtraTip, MediaSelection, MediaSource, Streamer, VoiceBot};
use crate::store::{paths, Store};
use crate::tier::{LevelPrice, PriceSlot, PriceTable, ReactionTier};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::rc::Rc;

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::decode(path, e))
}

/// Entries of a list node, which the store may hand back as an array or a keyed object
fn entries(value: Value) -> Vec<(String, Value)> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .map(|(i, item)| (i.to_string(), item))
            .collect(),
        Value::Object(children) => children.into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Resolve the streamer owning a Twitch channel
pub async fn find_streamer(store: &dyn Store, channel_id: &str) -> Result<Option<Streamer>, StoreError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct StreamerNode {
        #[serde(default)]
        display_name: String,
    }

    let found = store
        .find_by_child(paths::USER_STREAMER, "id", channel_id)
        .await?;

    match found.into_iter().next() {
        Some((uid, node)) => {
            let node: StreamerNode = decode(paths::USER_STREAMER, node)?;
            Ok(Some(Streamer {
                uid,
                display_name: node.display_name,
            }))
        }
        None => Ok(None),
    }
}

async fn load_price(store: &dyn Store, path: &str) -> Result<PriceSlot, StoreError> {
    let price = match store.get(path).await? {
        Some(value) => Some(decode::<LevelPrice>(path, value)?),
        None => None,
    };
    Ok(price.into())
}

/// Streamer prices and defaults for every paid tier
pub async fn load_price_table(store: &dyn Store, streamer_uid: &str) -> Result<PriceTable, StoreError> {
    let mut prices = PriceTable::new();

    for tier in ReactionTier::PAID {
        prices.set_streamer_price(
            tier,
            load_price(store, &paths::streamer_price(streamer_uid, tier)).await?,
        );
        prices.set_default_price(tier, load_price(store, &paths::default_price(tier)).await?);
    }

    Ok(prices)
}

/// Follow the streamer's price changes for every paid tier
pub fn listen_to_streamer_prices(
    store: &dyn Store,
    streamer_uid: &str,
    on_change: Rc<dyn Fn(ReactionTier, PriceSlot)>,
) {
    for tier in ReactionTier::PAID {
        let path = paths::streamer_price(streamer_uid, tier);
        let on_change = on_change.clone();
        let watched = path.clone();

        store.subscribe(
            &path,
            Box::new(move |value| {
                let slot = match value.map(|value| decode::<LevelPrice>(&watched, value)) {
                    Some(Ok(price)) => PriceSlot::Set(price),
                    Some(Err(e)) => {
                        warn!("ignoring price: {}", e);
                        PriceSlot::Missing
                    }
                    None => PriceSlot::Missing,
                };
                on_change(tier, slot);
            }),
        );
    }
}

pub fn unlisten_streamer_prices(store: &dyn Store, streamer_uid: &str) {
    for tier in ReactionTier::PAID {
        store.unsubscribe(&paths::streamer_price(streamer_uid, tier));
    }
}

/// Follow the viewer's reaction credits on this channel
pub fn listen_to_reaction_credits(
    store: &dyn Store,
    uid: &str,
    streamer_uid: &str,
    on_change: Box<dyn Fn(u32)>,
) {
    store.subscribe(
        &paths::reactions_count(uid, streamer_uid),
        Box::new(move |value| {
            let credits = value
                .and_then(|value| value.as_i64())
                .map_or(0, |count| count.clamp(0, u32::MAX as i64) as u32);
            on_change(credits);
        }),
    );
}

pub fn unlisten_reaction_credits(store: &dyn Store, uid: &str, streamer_uid: &str) {
    store.unsubscribe(&paths::reactions_count(uid, streamer_uid));
}

/// Tips offered on top of a reaction
pub async fn load_extra_tips(store: &dyn Store) -> Result<Vec<ExtraTip>, StoreError> {
    let Some(value) = store.get(paths::EXTRA_TIPS).await? else {
        return Ok(Vec::new());
    };

    let mut tips = entries(value)
        .into_iter()
        .map(|(_, tip)| decode::<ExtraTip>(paths::EXTRA_TIPS, tip))
        .collect::<Result<Vec<_>, _>>()?;
    tips.sort_by_key(|tip| tip.cost);
    Ok(tips)
}

/// Voices available for the voice bot, keyed by their display name
pub async fn load_bot_voices(store: &dyn Store) -> Result<Vec<VoiceBot>, StoreError> {
    let Some(value) = store.get(paths::BOT_VOICES).await? else {
        return Ok(Vec::new());
    };

    entries(value)
        .into_iter()
        .map(|(key, node)| -> Result<VoiceBot, StoreError> {
            let mut voice: VoiceBot = decode(paths::BOT_VOICES, node)?;
            voice.key = key;
            Ok(voice)
        })
        .collect()
}

/// The shared meme library
pub async fn load_memes_library(store: &dyn Store) -> Result<Vec<MediaSelection>, StoreError> {
    #[derive(Deserialize)]
    struct MemeNode {
        url: String,
        #[serde(default)]
        width: u32,
        #[serde(default)]
        height: u32,
    }

    let Some(value) = store.get(paths::MEMES_LIBRARY).await? else {
        return Ok(Vec::new());
    };

    entries(value)
        .into_iter()
        .map(|(_, node)| -> Result<MediaSelection, StoreError> {
            let meme: MemeNode = decode(paths::MEMES_LIBRARY, node)?;
            Ok(MediaSelection::new(MediaSource::Meme, meme.url, meme.width, meme.height))
        })
        .collect()
}

/// Whether the streamer currently accepts reactions. Missing flag means enabled.
pub async fn reactions_enabled(store: &dyn Store, streamer_uid: &str) -> Result<bool, StoreError> {
    Ok(store
        .get(&paths::reactions_enabled(streamer_uid))
        .await?
        .and_then(|value| value.as_bool())
        .unwrap_or(true))
}

/// Persist a reaction: the public record first, then the moderation copy under the same key,
/// then the credit it used. Failures are returned as-is; nothing is retried or rolled back.
pub async fn deliver_reaction(store: &dyn Store, write: &ReactionWrite) -> Result<String, StoreError> {
    let donation = serde_json::to_value(&write.donation)?;
    let key = store
        .append(&paths::streamer_donations(&write.streamer_uid), donation)
        .await?;

    let administrative = serde_json::to_value(&write.administrative)?;
    store
        .update(&paths::donation_administrative(&key), administrative)
        .await?;

    if write.spends_credit() {
        store
            .increment(&paths::reactions_count(&write.viewer_uid, &write.streamer_uid), -1)
            .await?;
    }

    info!("stored reaction {} ({} bits)", key, write.payment.bits);
    Ok(key)
}
