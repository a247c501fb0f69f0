/// UI module exports and the panel loader

pub mod components;
pub mod panel;
pub mod pickers;

use crate::bridge::FirebaseStore;
use crate::config::ComposerConfig;
use crate::database::{
    find_streamer, load_bot_voices, load_extra_tips, load_memes_library, load_price_table,
    reactions_enabled,
};
use crate::reaction::{ExtraTip, MediaSelection, Streamer, VoiceBot};
use crate::store::Store;
use crate::tier::PriceTable;
use log::{info, warn};
use panel::ComposerPanel;
use patternfly_yew::prelude::*;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Everything loaded before the composer can be shown
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSetup {
    pub config: ComposerConfig,
    pub streamer: Streamer,
    pub prices: PriceTable,
    pub tips: Vec<ExtraTip>,
    pub voices: Vec<VoiceBot>,
    pub memes: Vec<MediaSelection>,
}

#[derive(Clone, PartialEq)]
enum AppState {
    Loading,
    Ready(Rc<PanelSetup>),
    /// The streamer switched reactions off
    Disabled(String),
    Error(String),
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: ComposerConfig,
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let state = use_state(|| AppState::Loading);

    // Resolve the channel and load catalogs on mount
    {
        let state = state.clone();
        let config = props.config.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                let store = FirebaseStore::new();
                match load_setup(&store, config).await {
                    Ok(next) => state.set(next),
                    Err(e) => state.set(AppState::Error(e)),
                }
            });
            || ()
        });
    }

    html! {
        <div class="padding-20">
            {match &*state {
                AppState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{"Loading reactions..."}</p>
                    </div>
                },
                AppState::Ready(setup) => html! {
                    <ComposerPanel setup={setup.clone()} />
                },
                AppState::Disabled(name) => html! {
                    <Alert r#type={AlertType::Info} title={format!("{} has reactions turned off", name)} inline={true}>
                    </Alert>
                },
                AppState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
            }}
        </div>
    }
}

// Helper functions

async fn load_setup(store: &dyn Store, config: ComposerConfig) -> Result<AppState, String> {
    let streamer = find_streamer(store, &config.channel_id)
        .await
        .map_err(|e| format!("Failed to find streamer: {}", e))?
        .ok_or_else(|| format!("No streamer is linked to channel {}", config.channel_id))?;

    if !reactions_enabled(store, &streamer.uid)
        .await
        .map_err(|e| format!("Failed to load settings: {}", e))?
    {
        info!("reactions disabled on {}", streamer.display_name);
        return Ok(AppState::Disabled(streamer.display_name));
    }

    let prices = load_price_table(store, &streamer.uid)
        .await
        .map_err(|e| format!("Failed to load prices: {}", e))?;

    // Catalogs are optional: the panel still works without tips, voices or memes
    let tips = load_extra_tips(store).await.unwrap_or_else(|e| {
        warn!("no extra tips: {}", e);
        Vec::new()
    });
    let voices = load_bot_voices(store).await.unwrap_or_else(|e| {
        warn!("no bot voices: {}", e);
        Vec::new()
    });
    let memes = load_memes_library(store).await.unwrap_or_else(|e| {
        warn!("no memes: {}", e);
        Vec::new()
    });

    Ok(AppState::Ready(Rc::new(PanelSetup {
        config,
        streamer,
        prices,
        tips,
        voices,
        memes,
    })))
}
