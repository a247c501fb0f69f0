/// Composer panel: message box, option bar, pickers, tier and tip choice, send button

use super::components::{
    send_label, AddOnPills, MediaPreview, NoticeDialog, OptionBar, TierSelector, TipSelector,
};
use super::pickers::{EmotePicker, GiphyPicker, MemePicker, Text3DPicker, VoicePicker};
use super::PanelSetup;
use crate::bridge::{FirebaseStore, TwitchBits};
use crate::commerce::{Commerce, TransactionEvent};
use crate::composer::{Outcome, ReactionComposer};
use crate::database::{
    deliver_reaction, listen_to_reaction_credits, listen_to_streamer_prices,
    unlisten_reaction_credits, unlisten_streamer_prices,
};
use crate::error::Rejection;
use crate::reaction::{
    AddOnKind, AddOnPayload, Custom3DText, EmoteRaid, ExtraTip, MediaSelection, MediaSource, VoiceBot,
};
use crate::tier::{cost_for, is_locked, MediaKind, PriceSlot, ReactionTier};
use log::error;
use patternfly_yew::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlTextAreaElement;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum Dialog {
    None,
    Notice(Rejection),
    Sent,
}

/// What the asynchronous callbacks need to move the panel forward
#[derive(Clone)]
struct Driver {
    composer: Rc<RefCell<ReactionComposer>>,
    store: Rc<FirebaseStore>,
    dialog: UseStateHandle<Dialog>,
    redraw: UseForceUpdateHandle,
}

impl Driver {
    fn settle(&self, outcome: Outcome) {
        match outcome {
            Outcome::Ignored => {}
            Outcome::Idle | Outcome::ReopenTipping | Outcome::AwaitingPurchase => {
                self.redraw.force_update();
            }
            Outcome::Rejected(rejection) => self.dialog.set(Dialog::Notice(rejection)),
            Outcome::Deliver(write) => {
                self.redraw.force_update();

                let driver = self.clone();
                spawn_local(async move {
                    match deliver_reaction(&*driver.store, &write).await {
                        Ok(_) => {
                            driver.composer.borrow_mut().finish_delivery();
                            driver.dialog.set(Dialog::Sent);
                        }
                        // The panel stays in the sending state until it is reopened
                        Err(e) => error!("failed to send reaction: {}", e),
                    }
                    driver.redraw.force_update();
                });
            }
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct ComposerPanelProps {
    pub setup: Rc<PanelSetup>,
}

#[function_component(ComposerPanel)]
pub fn composer_panel(props: &ComposerPanelProps) -> Html {
    let setup = props.setup.clone();

    let store = use_memo((), |_| FirebaseStore::new());
    let commerce = use_memo((), |_| TwitchBits::new());
    let composer = {
        let setup = setup.clone();
        use_mut_ref(move || {
            let mut composer = ReactionComposer::new(setup.config.viewer.clone(), setup.streamer.clone());
            *composer.prices_mut() = setup.prices.clone();
            composer
        })
    };
    let dialog = use_state(|| Dialog::None);
    let open = use_state(|| None::<MediaKind>);
    let redraw = use_force_update();

    let driver = Driver {
        composer: composer.clone(),
        store: store.clone(),
        dialog: dialog.clone(),
        redraw: redraw.clone(),
    };

    // Subscriptions and the purchase listener live as long as the panel
    {
        let driver = driver.clone();
        let commerce = commerce.clone();
        let uid = setup.config.viewer.uid.clone();
        let streamer_uid = setup.streamer.uid.clone();

        use_effect_with((), move |_| {
            let store = driver.store.clone();
            let composer = driver.composer.clone();

            let on_credits = {
                let driver = driver.clone();
                Box::new(move |credits: u32| {
                    driver.composer.borrow_mut().set_credits(credits);
                    driver.redraw.force_update();
                })
            };
            listen_to_reaction_credits(&*store, &uid, &streamer_uid, on_credits);

            let on_price = {
                let driver = driver.clone();
                Rc::new(move |tier: ReactionTier, slot: PriceSlot| {
                    driver.composer.borrow_mut().prices_mut().set_streamer_price(tier, slot);
                    driver.redraw.force_update();
                })
            };
            listen_to_streamer_prices(&*store, &streamer_uid, on_price);

            let purchases = Rc::downgrade(&commerce);
            commerce.listen(Box::new(move |event: TransactionEvent| {
                let Some(commerce) = purchases.upgrade() else {
                    return;
                };
                let outcome = driver
                    .composer
                    .borrow_mut()
                    .handle_transaction(event, &*commerce);
                driver.settle(outcome);
            }));

            move || {
                unlisten_reaction_credits(&*store, &uid, &streamer_uid);
                unlisten_streamer_prices(&*store, &streamer_uid);
                composer.borrow_mut().abandon();
            }
        });
    }

    let on_message = {
        let composer = composer.clone();
        let redraw = redraw.clone();
        let max_chars = setup.config.limits.max_message_chars;
        Callback::from(move |e: InputEvent| {
            let input: HtmlTextAreaElement = e.target_unchecked_into();
            let text: String = input.value().chars().take(max_chars).collect();
            composer.borrow_mut().composition_mut().set_message(text);
            redraw.force_update();
        })
    };

    // Locked options raise the tier first, then open once the gate allows them
    let on_pick = {
        let composer = composer.clone();
        let open = open.clone();
        Callback::from(move |kind: MediaKind| {
            if *open == Some(kind) {
                open.set(None);
                return;
            }

            let mut composer = composer.borrow_mut();
            let composition = composer.composition_mut();
            if is_locked(kind, composition.tier()) {
                open.set(composition.change_tier(kind.required_tier(), Some(kind)));
            } else {
                open.set(Some(kind));
            }
        })
    };

    let on_tier = {
        let composer = composer.clone();
        let open = open.clone();
        Callback::from(move |tier: ReactionTier| {
            let still_open = composer
                .borrow_mut()
                .composition_mut()
                .change_tier(tier, *open);
            open.set(still_open);
        })
    };

    let on_media = {
        let composer = composer.clone();
        let open = open.clone();
        Callback::from(move |media: MediaSelection| {
            composer.borrow_mut().composition_mut().select_media(media);
            open.set(None);
        })
    };

    let on_clear_media = {
        let composer = composer.clone();
        let redraw = redraw.clone();
        Callback::from(move |_| {
            composer.borrow_mut().composition_mut().clear_media();
            redraw.force_update();
        })
    };

    let on_voice = {
        let composer = composer.clone();
        let open = open.clone();
        Callback::from(move |voice: VoiceBot| {
            composer
                .borrow_mut()
                .composition_mut()
                .set_add_on(AddOnPayload::VoiceBot(voice));
            open.set(None);
        })
    };

    let on_3d_text = {
        let composer = composer.clone();
        let open = open.clone();
        Callback::from(move |(message, text): (String, Custom3DText)| {
            composer
                .borrow_mut()
                .composition_mut()
                .set_custom_3d_text(message, text);
            open.set(None);
        })
    };

    let on_emote = {
        let composer = composer.clone();
        let open = open.clone();
        Callback::from(move |emote: EmoteRaid| {
            composer
                .borrow_mut()
                .composition_mut()
                .set_add_on(AddOnPayload::EmoteRaid(emote));
            open.set(None);
        })
    };

    let on_remove_add_on = {
        let composer = composer.clone();
        let redraw = redraw.clone();
        Callback::from(move |kind: AddOnKind| {
            composer.borrow_mut().composition_mut().remove_add_on(kind);
            redraw.force_update();
        })
    };

    let on_toggle_tip = {
        let composer = composer.clone();
        let redraw = redraw.clone();
        Callback::from(move |_| {
            composer.borrow_mut().composition_mut().toggle_tipping();
            redraw.force_update();
        })
    };

    let on_tip = {
        let composer = composer.clone();
        let redraw = redraw.clone();
        Callback::from(move |tip: Option<ExtraTip>| {
            composer.borrow_mut().composition_mut().set_extra_tip(tip);
            redraw.force_update();
        })
    };

    let on_reject = {
        let dialog = dialog.clone();
        Callback::from(move |rejection: Rejection| dialog.set(Dialog::Notice(rejection)))
    };

    let on_send = {
        let driver = driver.clone();
        let commerce = commerce.clone();
        Callback::from(move |_| {
            let outcome = driver.composer.borrow_mut().submit(&*commerce);
            driver.settle(outcome);
        })
    };

    let on_close_dialog = {
        let dialog = dialog.clone();
        Callback::from(move |_| dialog.set(Dialog::None))
    };

    let composer = composer.borrow();
    let composition = composer.composition();
    let busy = composer.is_busy();

    let selected: Vec<MediaKind> = MediaKind::DISPLAY_ORDER
        .into_iter()
        .filter(|kind| composition.is_option_selected(*kind))
        .collect();
    let costs: Vec<_> = ReactionTier::ALL
        .into_iter()
        .map(|tier| (tier, cost_for(tier, composer.prices())))
        .collect();
    let add_ons: Vec<_> = composition.active_add_ons().into_iter().cloned().collect();
    let selected_voice = match composition.add_on(AddOnKind::VoiceBot) {
        Some(AddOnPayload::VoiceBot(voice)) => Some(voice.clone()),
        _ => None,
    };

    let picker = match *open {
        None => html! {},
        Some(MediaKind::Gif) => html! {
            <GiphyPicker source={MediaSource::Gif} on_select={on_media} />
        },
        Some(MediaKind::Sticker) => html! {
            <GiphyPicker source={MediaSource::Sticker} on_select={on_media} />
        },
        Some(MediaKind::Meme) => html! {
            <MemePicker
                memes={setup.memes.clone()}
                limits={setup.config.limits.clone()}
                uid={setup.config.viewer.uid.clone()}
                on_select={on_media}
                on_reject={on_reject}
            />
        },
        Some(MediaKind::Text3D) => html! {
            <Text3DPicker message={composition.message().to_string()} on_select={on_3d_text} />
        },
        Some(MediaKind::VoiceBot) => html! {
            <VoicePicker voices={setup.voices.clone()} selected={selected_voice} on_select={on_voice} />
        },
        Some(MediaKind::EmoteRaid) => html! {
            <EmotePicker streamer_uid={setup.streamer.uid.clone()} on_select={on_emote} />
        },
    };

    html! {
        <div class="composer-panel">
            <h1 class="panel-title">{format!("React on {}'s stream", setup.streamer.display_name)}</h1>

            <textarea
                class="message-input"
                placeholder="Type your message"
                maxlength={setup.config.limits.max_message_chars.to_string()}
                value={composition.message().to_string()}
                oninput={on_message}
                disabled={busy}
            />
            <p class="message-count">
                {format!("{}/{}", composition.message().chars().count(), setup.config.limits.max_message_chars)}
            </p>

            if let Some(media) = composition.media() {
                <MediaPreview media={media.clone()} disabled={busy} on_clear={on_clear_media} />
            }
            <AddOnPills add_ons={add_ons} disabled={busy} on_remove={on_remove_add_on} />

            <OptionBar tier={composition.tier()} selected={selected} open={*open} disabled={busy} on_pick={on_pick} />
            if !busy {
                {picker}
            }

            <TierSelector
                tier={composition.tier()}
                costs={costs}
                credits={composer.credits()}
                disabled={busy}
                on_change={on_tier}
            />
            <TipSelector
                tips={setup.tips.clone()}
                selected={composition.extra_tip().cloned()}
                open={composition.is_tipping()}
                disabled={busy}
                on_toggle={on_toggle_tip}
                on_select={on_tip}
            />

            <Button
                onclick={on_send}
                disabled={!composer.can_send()}
                variant={ButtonVariant::Primary}
                block={true}
            >
                if busy {
                    <Spinner />
                    {" Sending..."}
                } else {
                    {send_label(&composer.current_cost(), composition.extra_tip())}
                }
            </Button>

            {match &*dialog {
                Dialog::None => html! {},
                Dialog::Notice(rejection) => html! {
                    <NoticeDialog
                        title={"Can't send yet"}
                        message={rejection.to_string()}
                        on_close={on_close_dialog}
                    />
                },
                Dialog::Sent => html! {
                    <NoticeDialog
                        title={"Reaction sent!"}
                        message={format!("{} will see it on stream", setup.streamer.display_name)}
                        on_close={on_close_dialog}
                    />
                },
            }}
        </div>
    }
}
