/// Reaction composer: the panel's state plus the submission flow that sends it
use crate::commerce::{Commerce, TransactionEvent};
use crate::composition::{system_clock, Clock, Composition};
use crate::error::Rejection;
use crate::flow::{Payment, Step, SubmissionFlow};
use crate::reaction::{AddOnKind, AddOnPayload, Streamer, Viewer};
use crate::records::{
    AdministrativeRecord, AvatarRecord, DonationRecord, EmojiRain, MessageExtraData,
    DONATION_TYPE_BITS,
};
use crate::tier::{cost_for, PriceTable, ReactionCost};
use log::{info, warn};

/// Everything needed to persist one reaction, detached from the composer
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionWrite {
    pub streamer_uid: String,
    pub viewer_uid: String,
    pub payment: Payment,
    pub donation: DonationRecord,
    pub administrative: AdministrativeRecord,
}

impl ReactionWrite {
    /// The reaction consumes one of the viewer's credits
    pub fn spends_credit(&self) -> bool {
        self.payment.channel_points
    }
}

/// What the panel should do after an action
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing changed
    Ignored,
    /// Back to idle after a cancelled purchase
    Idle,
    /// Back to idle and the tip menu must be shown again
    ReopenTipping,
    Rejected(Rejection),
    /// Waiting for the host to report the purchase
    AwaitingPurchase,
    /// Persist these records, then call `finish_delivery`
    Deliver(Box<ReactionWrite>),
}

pub struct ReactionComposer {
    composition: Composition,
    /// The reaction as it was when submitted; records are built from it
    submitted: Option<Composition>,
    flow: SubmissionFlow,
    prices: PriceTable,
    credits: u32,
    viewer: Viewer,
    streamer: Streamer,
    clock: Clock,
}

impl ReactionComposer {
    pub fn new(viewer: Viewer, streamer: Streamer) -> Self {
        Self::with_clock(viewer, streamer, system_clock)
    }

    pub fn with_clock(viewer: Viewer, streamer: Streamer, clock: Clock) -> Self {
        ReactionComposer {
            composition: Composition::with_clock(clock),
            submitted: None,
            flow: SubmissionFlow::new(),
            prices: PriceTable::new(),
            credits: 0,
            viewer,
            streamer,
            clock,
        }
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn composition_mut(&mut self) -> &mut Composition {
        &mut self.composition
    }

    pub fn flow(&self) -> &SubmissionFlow {
        &self.flow
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn prices_mut(&mut self) -> &mut PriceTable {
        &mut self.prices
    }

    pub fn credits(&self) -> u32 {
        self.credits
    }

    /// Latest reaction credit balance from the store
    pub fn set_credits(&mut self, credits: u32) {
        self.credits = credits;
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn streamer(&self) -> &Streamer {
        &self.streamer
    }

    pub fn current_cost(&self) -> ReactionCost {
        cost_for(self.composition.tier(), &self.prices)
    }

    pub fn is_busy(&self) -> bool {
        self.flow.is_busy()
    }

    /// Sending is possible once the price is known and nothing is in flight
    pub fn can_send(&self) -> bool {
        !self.is_busy() && !self.current_cost().is_loading()
    }

    pub fn submit(&mut self, commerce: &dyn Commerce) -> Outcome {
        if !self.is_busy() {
            self.submitted = Some(self.composition.clone());
        }
        let step = self
            .flow
            .submit(&self.composition, &self.prices, self.credits);
        self.apply(step, commerce)
    }

    pub fn handle_transaction(&mut self, event: TransactionEvent, commerce: &dyn Commerce) -> Outcome {
        let step = self.flow.on_transaction(event);
        self.apply(step, commerce)
    }

    fn apply(&mut self, step: Step, commerce: &dyn Commerce) -> Outcome {
        match step {
            Step::Ignored => Outcome::Ignored,
            Step::Rejected(rejection) => {
                self.submitted = None;
                warn!("reaction rejected: {}", rejection);
                Outcome::Rejected(rejection)
            }
            Step::Purchase(sku) => {
                info!("requesting purchase of {}", sku);
                commerce.request_purchase(&sku);
                Outcome::AwaitingPurchase
            }
            Step::Write(payment) => Outcome::Deliver(Box::new(self.build_write(payment))),
            Step::Cancelled { reopen_tipping } => {
                warn!("purchase cancelled");
                self.submitted = None;
                if reopen_tipping {
                    self.composition.open_tipping();
                    Outcome::ReopenTipping
                } else {
                    Outcome::Idle
                }
            }
        }
    }

    fn build_write(&self, payment: Payment) -> ReactionWrite {
        let composition = self.submitted.as_ref().unwrap_or(&self.composition);

        let mut extra = MessageExtraData::default();
        if let Some(AddOnPayload::VoiceBot(voice)) = composition.add_on(AddOnKind::VoiceBot) {
            extra.voice_api_name = Some(voice.voice_api_name.clone());
            extra.voice_name = Some(voice.key.clone());
        }
        if let Some(AddOnPayload::Custom3DText(text)) = composition.add_on(AddOnKind::Custom3DText) {
            extra.giphy_text = Some(text.clone());
        }

        let emotes = match composition.add_on(AddOnKind::EmoteRaid) {
            Some(AddOnPayload::EmoteRaid(emote)) => vec![emote.url.clone()],
            _ => Vec::new(),
        };

        let donation = DonationRecord {
            avatar: AvatarRecord::of(&self.viewer),
            amount_qoins: payment.bits,
            donation_type: DONATION_TYPE_BITS.to_string(),
            media: composition.media().cloned(),
            message: composition.message().to_string(),
            message_extra_data: extra,
            emoji_rain: EmojiRain::emotes(emotes),
            timestamp: (self.clock)(),
            uid: self.viewer.uid.clone(),
            twitch_user_name: self.viewer.twitch_username.clone(),
            user_name: self.viewer.user_name.clone(),
            photo_url: self.viewer.photo_url.clone(),
            points_channel_interactions: payment.channel_points,
            read: false,
        };
        let administrative = AdministrativeRecord::for_donation(&donation, &self.streamer);

        ReactionWrite {
            streamer_uid: self.streamer.uid.clone(),
            viewer_uid: self.viewer.uid.clone(),
            payment,
            donation,
            administrative,
        }
    }

    /// The records were stored: mark the submission sent and start over
    pub fn finish_delivery(&mut self) {
        if self.flow.write_succeeded() {
            self.submitted = None;
            info!("reaction sent to {}", self.streamer.display_name);
            self.composition.reset();
        }
    }

    /// Give up on the current submission, e.g. the viewer closed the panel mid purchase
    pub fn abandon(&mut self) {
        self.submitted = None;
        self.flow.abandon();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::commerce::testing::RecordingCommerce;
    use crate::commerce::{Initiator, Transaction};
    use crate::flow::SubmissionState;
    use crate::reaction::{EmoteRaid, ExtraTip, MediaSelection, MediaSource, VoiceBot};
    use crate::tier::{LevelPrice, MediaKind, PriceSlot, ReactionTier};

    pub fn fixed_clock() -> f64 {
        1_700_000_000_000.0
    }

    pub fn viewer() -> Viewer {
        Viewer {
            uid: "viewer-1".to_string(),
            user_name: "QaplaGamer".to_string(),
            twitch_username: "qaplagamer".to_string(),
            photo_url: "https://example.com/me.png".to_string(),
            avatar_id: None,
            avatar_background: None,
            avatar_animation_id: None,
        }
    }

    pub fn streamer() -> Streamer {
        Streamer {
            uid: "streamer-1".to_string(),
            display_name: "QaplaStreamer".to_string(),
        }
    }

    pub fn composer() -> ReactionComposer {
        let mut composer = ReactionComposer::with_clock(viewer(), streamer(), fixed_clock);
        for (tier, price, sku) in [
            (ReactionTier::Two, 100, "tier2sku"),
            (ReactionTier::Three, 300, "tier3sku"),
        ] {
            composer.prices_mut().set_streamer_price(
                tier,
                PriceSlot::Set(LevelPrice {
                    price,
                    sku: sku.to_string(),
                }),
            );
        }
        composer
    }

    pub fn deliver_of(outcome: Outcome) -> ReactionWrite {
        match outcome {
            Outcome::Deliver(write) => *write,
            other => panic!("expected a delivery, got {:?}", other),
        }
    }

    fn complete() -> TransactionEvent {
        TransactionEvent::Complete(Transaction::by(Initiator::CurrentUser))
    }

    fn tip() -> ExtraTip {
        ExtraTip {
            cost: 50,
            sku: "tipsku".to_string(),
        }
    }

    #[test]
    fn test_free_reaction() {
        let commerce = RecordingCommerce::default();
        let mut composer = composer();
        composer.set_credits(3);
        composer.composition_mut().set_message("gg");

        let write = deliver_of(composer.submit(&commerce));

        assert!(commerce.requested().is_empty());
        assert_eq!(write.donation.amount_qoins, 0);
        assert!(write.donation.points_channel_interactions);
        assert!(write.spends_credit());
        assert_eq!(write.donation.message, "gg");
        assert_eq!(write.administrative.streamer_name, "QaplaStreamer");

        composer.finish_delivery();
        assert_eq!(composer.flow().state(), &SubmissionState::Sent);
        assert_eq!(composer.composition().message(), "");
    }

    #[test]
    fn test_paid_reaction_without_tip() {
        let commerce = RecordingCommerce::default();
        let mut composer = composer();
        composer.composition_mut().change_tier(ReactionTier::Two, None);
        composer.composition_mut().set_message("gg");

        assert_eq!(composer.submit(&commerce), Outcome::AwaitingPurchase);
        assert_eq!(commerce.requested(), vec!["tier2sku".to_string()]);

        let write = deliver_of(composer.handle_transaction(complete(), &commerce));
        assert_eq!(write.donation.amount_qoins, 100);
        assert!(!write.donation.points_channel_interactions);
        assert!(!write.spends_credit());
    }

    #[test]
    fn test_tip_cancelled_after_base_paid() {
        let commerce = RecordingCommerce::default();
        let mut composer = composer();
        composer.composition_mut().change_tier(ReactionTier::Three, None);
        composer.composition_mut().set_message("gg");
        composer.composition_mut().set_extra_tip(Some(tip()));

        composer.submit(&commerce);
        assert_eq!(
            composer.handle_transaction(complete(), &commerce),
            Outcome::AwaitingPurchase
        );
        assert_eq!(
            commerce.requested(),
            vec!["tier3sku".to_string(), "tipsku".to_string()]
        );

        let write = deliver_of(composer.handle_transaction(TransactionEvent::Cancelled, &commerce));
        assert_eq!(write.donation.amount_qoins, 300);
    }

    #[test]
    fn test_credit_tip_cancelled() {
        let commerce = RecordingCommerce::default();
        let mut composer = composer();
        composer.set_credits(1);
        composer.composition_mut().set_message("gg");
        composer.composition_mut().set_extra_tip(Some(tip()));

        assert_eq!(composer.submit(&commerce), Outcome::AwaitingPurchase);
        assert_eq!(commerce.requested(), vec!["tipsku".to_string()]);

        let outcome = composer.handle_transaction(TransactionEvent::Cancelled, &commerce);

        assert_eq!(outcome, Outcome::ReopenTipping);
        assert!(composer.composition().is_tipping());
        assert_eq!(composer.flow().state(), &SubmissionState::Idle);
        assert_eq!(composer.credits(), 1);
    }

    #[test]
    fn test_empty_reaction_makes_no_calls() {
        let commerce = RecordingCommerce::default();
        let mut composer = composer();
        composer.set_credits(3);

        assert_eq!(
            composer.submit(&commerce),
            Outcome::Rejected(Rejection::EmptyReaction)
        );
        assert!(commerce.requested().is_empty());
        assert!(!composer.is_busy());
    }

    #[test]
    fn test_resubmit_while_awaiting_is_noop() {
        let commerce = RecordingCommerce::default();
        let mut composer = composer();
        composer.composition_mut().change_tier(ReactionTier::Two, None);
        composer.composition_mut().set_message("gg");

        composer.submit(&commerce);
        assert_eq!(composer.submit(&commerce), Outcome::Ignored);

        assert_eq!(commerce.requested().len(), 1);
        assert_eq!(composer.flow().state(), &SubmissionState::AwaitingBasePurchase);
    }

    #[test]
    fn test_host_events_reach_composer() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let commerce = Rc::new(RecordingCommerce::default());
        let composer = Rc::new(RefCell::new(composer()));
        composer.borrow_mut().composition_mut().change_tier(ReactionTier::Two, None);
        composer.borrow_mut().composition_mut().set_message("gg");

        let outcomes = Rc::new(RefCell::new(Vec::new()));
        {
            let composer = composer.clone();
            let inner = commerce.clone();
            let outcomes = outcomes.clone();
            commerce.listen(Box::new(move |event| {
                let outcome = composer.borrow_mut().handle_transaction(event, inner.as_ref());
                outcomes.borrow_mut().push(outcome);
            }));
        }

        composer.borrow_mut().submit(commerce.as_ref());
        commerce.emit(complete());

        assert!(matches!(outcomes.borrow()[0], Outcome::Deliver(_)));
    }

    #[test]
    fn test_write_carries_add_ons_and_media() {
        let commerce = RecordingCommerce::default();
        let mut composer = composer();
        composer.set_credits(1);
        let composition = composer.composition_mut();
        composition.change_tier(ReactionTier::Three, None);
        composition.select_media(MediaSelection::new(MediaSource::Meme, "https://memes/1.png", 500, 500));
        composition.set_add_on(AddOnPayload::VoiceBot(VoiceBot {
            key: "Robot".to_string(),
            voice_api_name: "en-US-Standard-B".to_string(),
        }));
        composition.set_add_on(AddOnPayload::EmoteRaid(EmoteRaid {
            url: "https://emotes/kappa".to_string(),
        }));

        composer.submit(&commerce);
        let write = deliver_of(composer.handle_transaction(complete(), &commerce));

        assert_eq!(write.donation.message_extra_data.voice_name, Some("Robot".to_string()));
        assert_eq!(write.donation.emoji_rain.emojis, vec!["https://emotes/kappa".to_string()]);
        assert_eq!(write.donation.media.as_ref().map(|m| m.source), Some(MediaSource::Meme));
        assert_eq!(write.donation.timestamp, fixed_clock());
    }

    #[test]
    fn test_write_uses_reaction_as_submitted() {
        let commerce = RecordingCommerce::default();
        let mut composer = composer();
        composer.composition_mut().change_tier(ReactionTier::Two, None);
        composer.composition_mut().set_message("gg");

        assert_eq!(composer.submit(&commerce), Outcome::AwaitingPurchase);

        // Edits while the purchase is pending must not reach the records
        let composition = composer.composition_mut();
        composition.change_tier(ReactionTier::Three, Some(MediaKind::EmoteRaid));
        composition.set_add_on(AddOnPayload::EmoteRaid(EmoteRaid {
            url: "https://emotes/kappa".to_string(),
        }));
        composition.set_message("changed");

        let write = deliver_of(composer.handle_transaction(complete(), &commerce));

        assert_eq!(write.donation.amount_qoins, 100);
        assert!(write.donation.emoji_rain.emojis.is_empty());
        assert_eq!(write.donation.message, "gg");
    }

    #[test]
    fn test_cancelled_credit_tip_keeps_menu_open() {
        let commerce = RecordingCommerce::default();
        let mut composer = composer();
        composer.set_credits(1);
        composer.composition_mut().set_message("gg");
        composer.composition_mut().set_extra_tip(Some(tip()));

        composer.submit(&commerce);
        composer.composition_mut().toggle_tipping();
        assert!(composer.composition().is_tipping());

        let outcome = composer.handle_transaction(TransactionEvent::Cancelled, &commerce);

        assert_eq!(outcome, Outcome::ReopenTipping);
        assert!(composer.composition().is_tipping());
    }

    #[test]
    fn test_can_send_waits_for_prices() {
        let mut composer = ReactionComposer::with_clock(viewer(), streamer(), fixed_clock);
        assert!(composer.can_send());

        composer.composition_mut().change_tier(ReactionTier::Two, None);
        assert!(!composer.can_send());
    }
}
