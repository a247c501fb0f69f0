/// Presentational pieces of the composer panel

use crate::reaction::{ActiveAddOn, AddOnKind, ExtraTip, MediaSelection, MediaSource};
use crate::tier::{is_locked, MediaKind, ReactionCost, ReactionTier};
use patternfly_yew::prelude::*;
use yew::prelude::*;

/// Short price text for a tier button or the send button
pub fn cost_label(cost: &ReactionCost) -> String {
    match cost {
        ReactionCost::Free => "1 reaction".to_string(),
        ReactionCost::Loading => "...".to_string(),
        ReactionCost::Bits(price) => format!("{} Bits", price.price),
    }
}

/// Total Bits the viewer is about to spend, tip included
pub fn send_label(cost: &ReactionCost, tip: Option<&ExtraTip>) -> String {
    let tip = tip.map_or(0, |tip| tip.cost);
    match cost {
        ReactionCost::Free if tip > 0 => format!("Send · 1 reaction + {} Bits", tip),
        ReactionCost::Bits(price) => format!("Send · {} Bits", price.price + tip),
        other => format!("Send · {}", cost_label(other)),
    }
}

fn icon_for(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Gif => "🎞️",
        MediaKind::Sticker => "🏷️",
        MediaKind::Meme => "😂",
        MediaKind::Text3D => "🔠",
        MediaKind::VoiceBot => "🗣️",
        MediaKind::EmoteRaid => "🌧️",
    }
}

#[derive(Properties, PartialEq)]
pub struct OptionBarProps {
    pub tier: ReactionTier,
    pub selected: Vec<MediaKind>,
    #[prop_or_default]
    pub open: Option<MediaKind>,
    #[prop_or(false)]
    pub disabled: bool,
    pub on_pick: Callback<MediaKind>,
}

/// Row of media options; locked ones show the tier they need
#[function_component(OptionBar)]
pub fn option_bar(props: &OptionBarProps) -> Html {
    html! {
        <div class="option-bar">
            {for MediaKind::DISPLAY_ORDER.into_iter().map(|kind| {
                let locked = is_locked(kind, props.tier);
                let mut class = classes!("option-button");
                if locked {
                    class.push("locked");
                }
                if props.selected.contains(&kind) {
                    class.push("selected");
                }
                if props.open == Some(kind) {
                    class.push("open");
                }

                html! {
                    <button class={class} disabled={props.disabled} onclick={props.on_pick.reform(move |_| kind)}>
                        <span class="option-icon">{icon_for(kind)}</span>
                        <span class="option-label">{kind.label()}</span>
                        if locked {
                            <span class="option-lock">{format!("🔒 {}", kind.required_tier())}</span>
                        }
                    </button>
                }
            })}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct AddOnPillsProps {
    pub add_ons: Vec<ActiveAddOn>,
    #[prop_or(false)]
    pub disabled: bool,
    pub on_remove: Callback<AddOnKind>,
}

#[function_component(AddOnPills)]
pub fn add_on_pills(props: &AddOnPillsProps) -> Html {
    if props.add_ons.is_empty() {
        return html! {};
    }

    html! {
        <div class="add-on-pills">
            {for props.add_ons.iter().map(|add_on| {
                let kind = add_on.payload.kind();
                html! {
                    <span class="add-on-pill">
                        if let Some(url) = add_on.payload.image_url() {
                            <img class="add-on-pill-image" src={url.to_string()} alt="" />
                        }
                        <span class="add-on-pill-label">{add_on.payload.label()}</span>
                        <button class="add-on-pill-remove" disabled={props.disabled} onclick={props.on_remove.reform(move |_| kind)}>
                            {"✕"}
                        </button>
                    </span>
                }
            })}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TierSelectorProps {
    pub tier: ReactionTier,
    pub costs: Vec<(ReactionTier, ReactionCost)>,
    pub credits: u32,
    #[prop_or(false)]
    pub disabled: bool,
    pub on_change: Callback<ReactionTier>,
}

#[function_component(TierSelector)]
pub fn tier_selector(props: &TierSelectorProps) -> Html {
    html! {
        <div class="tier-selector">
            {for props.costs.iter().map(|(tier, cost)| {
                let tier = *tier;
                let variant = if tier == props.tier {
                    ButtonVariant::Primary
                } else {
                    ButtonVariant::Secondary
                };
                html! {
                    <Button
                        onclick={props.on_change.reform(move |_| tier)}
                        disabled={props.disabled}
                        variant={variant}
                    >
                        {format!("{} · {}", tier, cost_label(cost))}
                    </Button>
                }
            })}
            <p class="tier-credits">{format!("{} reactions left", props.credits)}</p>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TipSelectorProps {
    pub tips: Vec<ExtraTip>,
    pub selected: Option<ExtraTip>,
    pub open: bool,
    #[prop_or(false)]
    pub disabled: bool,
    pub on_toggle: Callback<()>,
    pub on_select: Callback<Option<ExtraTip>>,
}

#[function_component(TipSelector)]
pub fn tip_selector(props: &TipSelectorProps) -> Html {
    let title = match &props.selected {
        Some(tip) => format!("Tip: {} Bits", tip.cost),
        None => "Add a tip".to_string(),
    };

    html! {
        <div class="tip-selector">
            <Button
                onclick={props.on_toggle.reform(|_| ())}
                disabled={props.disabled}
                variant={ButtonVariant::Link}
            >
                {title}
            </Button>
            if props.open {
                <div class="tip-menu">
                    <button class="tip-option" onclick={props.on_select.reform(|_| None)}>
                        {"No tip"}
                    </button>
                    {for props.tips.iter().map(|tip| {
                        let choice = tip.clone();
                        let mut class = classes!("tip-option");
                        if props.selected.as_ref() == Some(tip) {
                            class.push("selected");
                        }
                        html! {
                            <button class={class} onclick={props.on_select.reform(move |_| Some(choice.clone()))}>
                                {format!("{} Bits", tip.cost)}
                            </button>
                        }
                    })}
                </div>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct MediaPreviewProps {
    pub media: MediaSelection,
    #[prop_or(false)]
    pub disabled: bool,
    pub on_clear: Callback<()>,
}

#[function_component(MediaPreview)]
pub fn media_preview(props: &MediaPreviewProps) -> Html {
    let media = &props.media;

    html! {
        <div class="media-preview">
            {match media.source {
                MediaSource::CustomVideo => html! {
                    <video class="media-preview-content" src={media.url.clone()} autoplay={true} muted={true} />
                },
                _ => html! {
                    <img class="media-preview-content" src={media.url.clone()} alt="" />
                },
            }}
            <button class="media-preview-remove" disabled={props.disabled} onclick={props.on_clear.reform(|_| ())}>
                {"✕"}
            </button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct NoticeDialogProps {
    pub title: AttrValue,
    pub message: AttrValue,
    pub on_close: Callback<()>,
}

/// Blocking message the viewer has to dismiss
#[function_component(NoticeDialog)]
pub fn notice_dialog(props: &NoticeDialogProps) -> Html {
    html! {
        <div class="dialog-backdrop">
            <div class="dialog">
                <h2 class="dialog-title">{props.title.clone()}</h2>
                <p class="dialog-message">{props.message.clone()}</p>
                <Button onclick={props.on_close.reform(|_| ())} variant={ButtonVariant::Primary} block={true}>
                    {"OK"}
                </Button>
            </div>
        </div>
    }
}
