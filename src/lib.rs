/// Reaction Composer - Twitch viewer panel for sending paid stream reactions
/// Built with Rust + WASM + Yew

pub mod bridge;
pub mod commerce;
pub mod composer;
pub mod composition;
pub mod config;
pub mod database;
pub mod error;
pub mod flow;
pub mod reaction;
pub mod records;
pub mod store;
pub mod tier;
pub mod ui;
pub mod upload;

use config::ComposerConfig;
use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the viewer panel
#[wasm_bindgen]
pub fn start_composer(config: JsValue) -> Result<(), JsValue> {
    let config: ComposerConfig = serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsValue::from_str(&format!("Invalid composer config: {:?}", e)))?;

    log::info!("starting composer on channel {}", config.channel_id);
    yew::Renderer::<ui::App>::with_props(ui::AppProps { config }).render();
    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    fn config_js(json: &str) -> JsValue {
        js_sys::JSON::parse(json).expect("valid json")
    }

    #[wasm_bindgen_test]
    fn config_parses_from_page_object() {
        let config: ComposerConfig = serde_wasm_bindgen::from_value(config_js(
            r#"{
                "channelId": "123456",
                "viewer": {
                    "uid": "viewer-1",
                    "userName": "QaplaGamer",
                    "twitchUsername": "qaplagamer",
                    "photoUrl": "https://example.com/me.png"
                },
                "limits": {"maxClipSeconds": 5}
            }"#,
        ))
        .expect("config");

        assert_eq!(config.channel_id, "123456");
        assert_eq!(config.limits.max_clip_seconds, 5.0);
        assert_eq!(config.limits.max_message_chars, 100);
    }

    #[wasm_bindgen_test]
    fn start_rejects_malformed_config() {
        assert!(start_composer(config_js(r#"{"channelId": 42}"#)).is_err());
    }

    #[wasm_bindgen_test]
    fn clock_follows_the_browser() {
        let before = js_sys::Date::now();
        let now = composition::system_clock();
        assert!(now >= before);
    }
}
