/// Pickers opened from the option bar

use crate::bridge::{create_3d_text, probe_clip, search_giphy, streamer_emotes, upload_clip};
use crate::config::Limits;
use crate::error::Rejection;
use crate::reaction::{Custom3DText, EmoteRaid, MediaSelection, MediaSource, VoiceBot};
use crate::upload::{check_file, check_metadata, custom_video, ClipFile};
use log::{error, info};
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum PickerState {
    Idle,
    Loading,
    Error(String),
}

fn status(state: &PickerState, loading: &str) -> Html {
    match state {
        PickerState::Idle => html! {},
        PickerState::Loading => html! {
            <div class="loading-text-center">
                <Spinner />
                <p class="loading-text">{loading.to_string()}</p>
            </div>
        },
        PickerState::Error(err) => html! {
            <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                {err.clone()}
            </Alert>
        },
    }
}

fn media_grid(items: &[MediaSelection], on_select: &Callback<MediaSelection>) -> Html {
    html! {
        <div class="media-grid">
            {for items.iter().map(|item| {
                let choice = item.clone();
                html! {
                    <img
                        class="media-grid-item"
                        src={item.url.clone()}
                        alt=""
                        onclick={on_select.reform(move |_| choice.clone())}
                    />
                }
            })}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct GiphyPickerProps {
    pub source: MediaSource,
    pub on_select: Callback<MediaSelection>,
}

/// GIF and sticker search
#[function_component(GiphyPicker)]
pub fn giphy_picker(props: &GiphyPickerProps) -> Html {
    let query = use_state(String::new);
    let results = use_state(Vec::<MediaSelection>::new);
    let state = use_state(|| PickerState::Idle);

    // Trending on open, search results after each edit
    {
        let results = results.clone();
        let state = state.clone();
        use_effect_with(((*query).clone(), props.source), move |(query, source)| {
            let query = query.clone();
            let source = *source;
            state.set(PickerState::Loading);
            spawn_local(async move {
                match search_giphy(&query, source).await {
                    Ok(found) => {
                        results.set(found);
                        state.set(PickerState::Idle);
                    }
                    Err(e) => state.set(PickerState::Error(e)),
                }
            });
            || ()
        });
    }

    let on_input = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            query.set(input.value());
        })
    };

    let placeholder = match props.source {
        MediaSource::Sticker => "Search stickers",
        _ => "Search GIFs",
    };

    html! {
        <div class="picker">
            <input
                type="text"
                class="search-input"
                placeholder={placeholder}
                value={(*query).clone()}
                oninput={on_input}
            />
            {status(&state, "Searching...")}
            {media_grid(&results, &props.on_select)}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct MemePickerProps {
    pub memes: Vec<MediaSelection>,
    pub limits: Limits,
    pub uid: String,
    pub on_select: Callback<MediaSelection>,
    pub on_reject: Callback<Rejection>,
}

/// Meme library plus custom clip upload
#[function_component(MemePicker)]
pub fn meme_picker(props: &MemePickerProps) -> Html {
    let state = use_state(|| PickerState::Idle);

    let on_file = {
        let state = state.clone();
        let limits = props.limits.clone();
        let uid = props.uid.clone();
        let on_select = props.on_select.clone();
        let on_reject = props.on_reject.clone();

        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            input.set_value("");

            let clip = ClipFile {
                mime: file.type_(),
                size_bytes: file.size() as u64,
            };
            if let Err(rejection) = check_file(&clip, &limits) {
                on_reject.emit(rejection);
                return;
            }

            let state = state.clone();
            let limits = limits.clone();
            let uid = uid.clone();
            let on_select = on_select.clone();
            let on_reject = on_reject.clone();

            state.set(PickerState::Loading);
            spawn_local(async move {
                let metadata = match probe_clip(&file).await {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        state.set(PickerState::Error(e));
                        return;
                    }
                };
                if let Err(rejection) = check_metadata(&metadata, &limits) {
                    state.set(PickerState::Idle);
                    on_reject.emit(rejection);
                    return;
                }

                match upload_clip(&file, &uid).await {
                    Ok(url) => {
                        info!("uploaded clip {}", url);
                        state.set(PickerState::Idle);
                        on_select.emit(custom_video(url, &metadata));
                    }
                    Err(e) => {
                        error!("{}", e);
                        state.set(PickerState::Error(e));
                    }
                }
            });
        })
    };

    let busy = *state == PickerState::Loading;

    html! {
        <div class="picker">
            <label class="upload-button">
                {"Upload a clip (max 8 s)"}
                <input
                    type="file"
                    accept="video/mp4,video/webm,video/quicktime"
                    class="upload-input"
                    disabled={busy}
                    onchange={on_file}
                />
            </label>
            {status(&state, "Uploading clip...")}
            {media_grid(&props.memes, &props.on_select)}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct Text3DPickerProps {
    pub message: String,
    pub on_select: Callback<(String, Custom3DText)>,
}

/// Render the typed message as animated 3D text and pick a style
#[function_component(Text3DPicker)]
pub fn text_3d_picker(props: &Text3DPickerProps) -> Html {
    let text = use_state(|| props.message.clone());
    let results = use_state(Vec::<Custom3DText>::new);
    let state = use_state(|| PickerState::Idle);

    let on_input = {
        let text = text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            text.set(input.value());
        })
    };

    let on_generate = {
        let text = text.clone();
        let results = results.clone();
        let state = state.clone();
        Callback::from(move |_| {
            let text = (*text).clone();
            if text.trim().is_empty() {
                return;
            }

            let results = results.clone();
            let state = state.clone();
            state.set(PickerState::Loading);
            spawn_local(async move {
                match create_3d_text(&text).await {
                    Ok(found) => {
                        results.set(found);
                        state.set(PickerState::Idle);
                    }
                    Err(e) => state.set(PickerState::Error(e)),
                }
            });
        })
    };

    html! {
        <div class="picker">
            <div class="picker-row">
                <input
                    type="text"
                    class="search-input"
                    placeholder="Text to animate"
                    value={(*text).clone()}
                    oninput={on_input}
                />
                <Button onclick={on_generate} variant={ButtonVariant::Secondary}>
                    {"Create"}
                </Button>
            </div>
            {status(&state, "Creating 3D text...")}
            <div class="media-grid">
                {for results.iter().map(|result| {
                    let choice = ((*text).clone(), result.clone());
                    html! {
                        <img
                            class="media-grid-item"
                            src={result.url.clone()}
                            alt=""
                            onclick={props.on_select.reform(move |_| choice.clone())}
                        />
                    }
                })}
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct VoicePickerProps {
    pub voices: Vec<VoiceBot>,
    pub selected: Option<VoiceBot>,
    pub on_select: Callback<VoiceBot>,
}

#[function_component(VoicePicker)]
pub fn voice_picker(props: &VoicePickerProps) -> Html {
    if props.voices.is_empty() {
        return html! {
            <p class="picker-empty">{"No voices available"}</p>
        };
    }

    html! {
        <div class="picker voice-list">
            {for props.voices.iter().map(|voice| {
                let choice = voice.clone();
                let mut class = classes!("voice-option");
                if props.selected.as_ref() == Some(voice) {
                    class.push("selected");
                }
                html! {
                    <button class={class} onclick={props.on_select.reform(move |_| choice.clone())}>
                        {&voice.key}
                    </button>
                }
            })}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct EmotePickerProps {
    pub streamer_uid: String,
    pub on_select: Callback<EmoteRaid>,
}

/// Emotes of the channel, rained over the stream
#[function_component(EmotePicker)]
pub fn emote_picker(props: &EmotePickerProps) -> Html {
    let emotes = use_state(Vec::<String>::new);
    let state = use_state(|| PickerState::Loading);

    {
        let emotes = emotes.clone();
        let state = state.clone();
        use_effect_with(props.streamer_uid.clone(), move |streamer_uid| {
            let streamer_uid = streamer_uid.clone();
            spawn_local(async move {
                match streamer_emotes(&streamer_uid).await {
                    Ok(found) => {
                        emotes.set(found);
                        state.set(PickerState::Idle);
                    }
                    Err(e) => state.set(PickerState::Error(e)),
                }
            });
            || ()
        });
    }

    html! {
        <div class="picker">
            {status(&state, "Loading emotes...")}
            if *state == PickerState::Idle && emotes.is_empty() {
                <p class="picker-empty">{"This channel has no emotes"}</p>
            }
            <div class="emote-grid">
                {for emotes.iter().map(|url| {
                    let choice = EmoteRaid { url: url.clone() };
                    html! {
                        <img
                            class="emote-grid-item"
                            src={url.clone()}
                            alt=""
                            onclick={props.on_select.reform(move |_| choice.clone())}
                        />
                    }
                })}
            </div>
        </div>
    }
}
