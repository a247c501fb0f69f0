/// Browser side implementations: realtime store, Twitch Bits and media helpers
use crate::commerce::{Commerce, Transaction, TransactionEvent};
use crate::error::StoreError;
use crate::reaction::{Custom3DText, MediaSelection, MediaSource};
use crate::store::Store;
use crate::upload::ClipMetadata;
use async_trait::async_trait;
use log::warn;
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/composer.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn dbGet(path: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn dbFindByChild(path: &str, child: &str, value: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn dbPush(path: &str, record: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn dbUpdate(path: &str, partial: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn dbIncrement(path: &str, delta: f64) -> Result<(), JsValue>;

    fn dbListen(path: &str, callback: &js_sys::Function);

    fn dbUnlisten(path: &str);

    fn useBits(sku: &str);

    fn onBitsTransaction(on_complete: &js_sys::Function, on_cancelled: &js_sys::Function);

    #[wasm_bindgen(catch)]
    async fn probeClip(file: &web_sys::File) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn uploadClip(file: &web_sys::File, uid: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn searchGiphy(query: &str, media_type: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn create3DText(text: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStreamerEmotes(streamer_uid: &str) -> Result<JsValue, JsValue>;
}

fn bridge_error(e: JsValue) -> StoreError {
    StoreError::Bridge(format!("{:?}", e))
}

fn to_js(value: &Value) -> Result<JsValue, StoreError> {
    // Plain objects rather than JS Maps, the database rejects Maps
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| StoreError::Bridge(format!("Failed to serialize: {:?}", e)))
}

fn from_js(path: &str, value: JsValue) -> Result<Option<Value>, StoreError> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(value)
        .map(Some)
        .map_err(|e| StoreError::decode(path, format!("{:?}", e)))
}

/// Firebase realtime database reached through the JS bridge
#[derive(Default)]
pub struct FirebaseStore {
    listeners: RefCell<HashMap<String, Vec<Closure<dyn FnMut(JsValue)>>>>,
}

impl FirebaseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait(?Send)]
impl Store for FirebaseStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let value = dbGet(path).await.map_err(bridge_error)?;
        from_js(path, value)
    }

    async fn find_by_child(
        &self,
        path: &str,
        child: &str,
        value: &str,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        let found = dbFindByChild(path, child, value).await.map_err(bridge_error)?;
        serde_wasm_bindgen::from_value(found).map_err(|e| StoreError::decode(path, format!("{:?}", e)))
    }

    async fn append(&self, path: &str, record: Value) -> Result<String, StoreError> {
        let key = dbPush(path, to_js(&record)?).await.map_err(bridge_error)?;
        key.as_string()
            .ok_or_else(|| StoreError::decode(path, "push returned no key"))
    }

    async fn update(&self, path: &str, partial: Value) -> Result<(), StoreError> {
        dbUpdate(path, to_js(&partial)?).await.map_err(bridge_error)
    }

    async fn increment(&self, path: &str, delta: i64) -> Result<(), StoreError> {
        dbIncrement(path, delta as f64).await.map_err(bridge_error)
    }

    fn subscribe(&self, path: &str, mut on_change: Box<dyn FnMut(Option<Value>)>) {
        let watched = path.to_string();
        let callback = Closure::wrap(Box::new(move |value: JsValue| {
            match from_js(&watched, value) {
                Ok(value) => on_change(value),
                Err(e) => warn!("dropping update: {}", e),
            }
        }) as Box<dyn FnMut(JsValue)>);

        dbListen(path, callback.as_ref().unchecked_ref());
        self.listeners
            .borrow_mut()
            .entry(path.to_string())
            .or_default()
            .push(callback);
    }

    fn unsubscribe(&self, path: &str) {
        dbUnlisten(path);
        self.listeners.borrow_mut().remove(path);
    }
}

type TransactionClosures = (Closure<dyn FnMut(JsValue)>, Closure<dyn FnMut()>);

/// Bits purchases through `Twitch.ext.bits`
#[derive(Default)]
pub struct TwitchBits {
    handlers: RefCell<Option<TransactionClosures>>,
}

impl TwitchBits {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Commerce for TwitchBits {
    fn request_purchase(&self, sku: &str) {
        useBits(sku);
    }

    fn listen(&self, handler: Box<dyn Fn(TransactionEvent)>) {
        let handler: Rc<dyn Fn(TransactionEvent)> = Rc::from(handler);

        let on_complete = {
            let handler = handler.clone();
            Closure::wrap(Box::new(move |tx: JsValue| {
                match serde_wasm_bindgen::from_value::<Transaction>(tx) {
                    Ok(tx) => handler(TransactionEvent::Complete(tx)),
                    Err(e) => warn!("unreadable transaction: {:?}", e),
                }
            }) as Box<dyn FnMut(JsValue)>)
        };
        let on_cancelled = Closure::wrap(Box::new(move || {
            handler(TransactionEvent::Cancelled);
        }) as Box<dyn FnMut()>);

        onBitsTransaction(
            on_complete.as_ref().unchecked_ref(),
            on_cancelled.as_ref().unchecked_ref(),
        );
        *self.handlers.borrow_mut() = Some((on_complete, on_cancelled));
    }
}

/// Width, height and duration of a picked clip
pub async fn probe_clip(file: &web_sys::File) -> Result<ClipMetadata, String> {
    let metadata = probeClip(file)
        .await
        .map_err(|e| format!("Failed to read clip: {:?}", e))?;
    serde_wasm_bindgen::from_value(metadata).map_err(|e| format!("Failed to parse clip metadata: {:?}", e))
}

/// Upload a clip and return its public URL
pub async fn upload_clip(file: &web_sys::File, uid: &str) -> Result<String, String> {
    let url = uploadClip(file, uid)
        .await
        .map_err(|e| format!("Upload failed: {:?}", e))?;
    url.as_string().ok_or_else(|| "Upload returned no URL".to_string())
}

pub async fn search_giphy(query: &str, source: MediaSource) -> Result<Vec<MediaSelection>, String> {
    let media_type = match source {
        MediaSource::Sticker => "stickers",
        _ => "gifs",
    };
    let results = searchGiphy(query, media_type)
        .await
        .map_err(|e| format!("Search failed: {:?}", e))?;

    #[derive(serde::Deserialize)]
    struct GiphyResult {
        url: String,
        width: u32,
        height: u32,
    }

    let results: Vec<GiphyResult> = serde_wasm_bindgen::from_value(results)
        .map_err(|e| format!("Failed to parse results: {:?}", e))?;
    Ok(results
        .into_iter()
        .map(|r| MediaSelection::new(source, r.url, r.width, r.height))
        .collect())
}

pub async fn create_3d_text(text: &str) -> Result<Vec<Custom3DText>, String> {
    let results = create3DText(text)
        .await
        .map_err(|e| format!("Failed to create 3D text: {:?}", e))?;
    serde_wasm_bindgen::from_value(results).map_err(|e| format!("Failed to parse 3D text: {:?}", e))
}

/// Emote image URLs of the streamer's channel
pub async fn streamer_emotes(streamer_uid: &str) -> Result<Vec<String>, String> {
    let emotes = getStreamerEmotes(streamer_uid)
        .await
        .map_err(|e| format!("Failed to load emotes: {:?}", e))?;
    serde_wasm_bindgen::from_value(emotes).map_err(|e| format!("Failed to parse emotes: {:?}", e))
}
