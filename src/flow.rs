/// Submission state machine for paying for and sending a reaction
///
/// The machine performs no I/O. Each input returns a `Step` telling the driver what to do next:
/// request a purchase, write the records, or show a notice.
use crate::commerce::{Initiator, TransactionEvent};
use crate::composition::Composition;
use crate::error::Rejection;
use crate::reaction::ExtraTip;
use crate::tier::{cost_for, LevelPrice, PriceTable, ReactionCost};
use log::debug;
use serde::Serialize;

/// How the base reaction is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentRail {
    Bits,
    Credits,
}

/// What was actually paid once the handshake is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub bits: u32,
    pub channel_points: bool,
}

/// Correlation state for one submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPurchase {
    pub rail: PaymentRail,
    pub base: Option<LevelPrice>,
    pub tip: Option<ExtraTip>,
    pub base_paid: bool,
}

impl PendingPurchase {
    fn base_price(&self) -> u32 {
        self.base.as_ref().map_or(0, |base| base.price)
    }

    fn tip_cost(&self) -> u32 {
        self.tip.as_ref().map_or(0, |tip| tip.cost)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    AwaitingBasePurchase,
    AwaitingTipPurchase,
    Writing(Payment),
    Sent,
}

/// What the driver must do after an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Input had no effect in the current state
    Ignored,
    Rejected(Rejection),
    /// Ask the host to purchase this SKU
    Purchase(String),
    /// Persist the reaction with this payment
    Write(Payment),
    /// Handshake cancelled, machine back to idle
    Cancelled { reopen_tipping: bool },
}

#[derive(Debug, Clone)]
pub struct SubmissionFlow {
    state: SubmissionState,
    pending: Option<PendingPurchase>,
}

impl SubmissionFlow {
    pub fn new() -> Self {
        SubmissionFlow {
            state: SubmissionState::Idle,
            pending: None,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn pending(&self) -> Option<&PendingPurchase> {
        self.pending.as_ref()
    }

    /// True while a submission is in flight
    pub fn is_busy(&self) -> bool {
        !matches!(self.state, SubmissionState::Idle | SubmissionState::Sent)
    }

    fn transition(&mut self, next: SubmissionState) {
        debug!("submission {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn write(&mut self, payment: Payment) -> Step {
        self.pending = None;
        self.transition(SubmissionState::Writing(payment));
        Step::Write(payment)
    }

    fn back_to_idle(&mut self, reopen_tipping: bool) -> Step {
        self.pending = None;
        self.transition(SubmissionState::Idle);
        Step::Cancelled { reopen_tipping }
    }

    pub fn submit(&mut self, composition: &Composition, prices: &PriceTable, credits: u32) -> Step {
        if self.is_busy() {
            return Step::Ignored;
        }
        self.transition(SubmissionState::Idle);

        if !composition.can_submit() {
            return Step::Rejected(Rejection::EmptyReaction);
        }

        match cost_for(composition.tier(), prices) {
            ReactionCost::Loading => Step::Rejected(Rejection::PricesLoading),
            ReactionCost::Free => {
                if credits < 1 {
                    return Step::Rejected(Rejection::InsufficientCredits);
                }

                match composition.extra_tip() {
                    Some(tip) => {
                        let sku = tip.sku.clone();
                        self.pending = Some(PendingPurchase {
                            rail: PaymentRail::Credits,
                            base: None,
                            tip: Some(tip.clone()),
                            base_paid: false,
                        });
                        self.transition(SubmissionState::AwaitingTipPurchase);
                        Step::Purchase(sku)
                    }
                    None => self.write(Payment {
                        bits: 0,
                        channel_points: true,
                    }),
                }
            }
            ReactionCost::Bits(price) => {
                let sku = price.sku.clone();
                self.pending = Some(PendingPurchase {
                    rail: PaymentRail::Bits,
                    base: Some(price),
                    tip: composition.extra_tip().cloned(),
                    base_paid: false,
                });
                self.transition(SubmissionState::AwaitingBasePurchase);
                Step::Purchase(sku)
            }
        }
    }

    pub fn on_transaction(&mut self, event: TransactionEvent) -> Step {
        match event {
            TransactionEvent::Complete(tx) if tx.initiator == Initiator::CurrentUser => {
                self.on_complete()
            }
            TransactionEvent::Complete(_) => Step::Ignored,
            TransactionEvent::Cancelled => self.on_cancelled(),
        }
    }

    fn on_complete(&mut self) -> Step {
        let Some(pending) = self.pending.as_mut() else {
            return Step::Ignored;
        };

        match self.state {
            SubmissionState::AwaitingBasePurchase => {
                pending.base_paid = true;
                let base = pending.base_price();

                match pending.tip.as_ref().map(|tip| tip.sku.clone()) {
                    Some(sku) => {
                        self.transition(SubmissionState::AwaitingTipPurchase);
                        Step::Purchase(sku)
                    }
                    None => self.write(Payment {
                        bits: base,
                        channel_points: false,
                    }),
                }
            }
            SubmissionState::AwaitingTipPurchase => {
                let payment = match pending.rail {
                    PaymentRail::Bits => Payment {
                        bits: pending.base_price() + pending.tip_cost(),
                        channel_points: false,
                    },
                    PaymentRail::Credits => Payment {
                        bits: pending.tip_cost(),
                        channel_points: true,
                    },
                };
                self.write(payment)
            }
            _ => Step::Ignored,
        }
    }

    fn on_cancelled(&mut self) -> Step {
        let Some(pending) = self.pending.as_ref() else {
            return Step::Ignored;
        };

        match (self.state.clone(), pending.rail) {
            (SubmissionState::AwaitingTipPurchase, PaymentRail::Credits) => self.back_to_idle(true),
            (SubmissionState::AwaitingBasePurchase | SubmissionState::AwaitingTipPurchase, _)
                if pending.base_paid =>
            {
                // The base reaction was charged; send it without the tip
                let bits = pending.base_price();
                self.write(Payment {
                    bits,
                    channel_points: false,
                })
            }
            (SubmissionState::AwaitingBasePurchase | SubmissionState::AwaitingTipPurchase, _) => {
                self.back_to_idle(false)
            }
            _ => Step::Ignored,
        }
    }

    /// Records are stored; the submission is over
    pub fn write_succeeded(&mut self) -> bool {
        if matches!(self.state, SubmissionState::Writing(_)) {
            self.transition(SubmissionState::Sent);
            true
        } else {
            false
        }
    }

    /// Drop the current attempt whatever state it is in
    pub fn abandon(&mut self) {
        self.pending = None;
        self.transition(SubmissionState::Idle);
    }
}

impl Default for SubmissionFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commerce::Transaction;
    use crate::reaction::{MediaSelection, MediaSource};
    use crate::tier::{PriceSlot, ReactionTier};

    fn fixed_clock() -> f64 {
        1_700_000_000_000.0
    }

    fn prices() -> PriceTable {
        let mut prices = PriceTable::new();
        prices.set_streamer_price(
            ReactionTier::Two,
            PriceSlot::Set(LevelPrice {
                price: 100,
                sku: "tier2sku".to_string(),
            }),
        );
        prices.set_streamer_price(
            ReactionTier::Three,
            PriceSlot::Set(LevelPrice {
                price: 300,
                sku: "tier3sku".to_string(),
            }),
        );
        prices
    }

    fn tip() -> ExtraTip {
        ExtraTip {
            cost: 50,
            sku: "tipsku".to_string(),
        }
    }

    fn composition(tier: ReactionTier, message: &str, with_tip: bool) -> Composition {
        let mut composition = Composition::with_clock(fixed_clock);
        composition.change_tier(tier, None);
        composition.set_message(message);
        if with_tip {
            composition.set_extra_tip(Some(tip()));
        }
        composition
    }

    fn complete() -> TransactionEvent {
        TransactionEvent::Complete(Transaction::by(Initiator::CurrentUser))
    }

    #[test]
    fn test_free_reaction_writes_immediately() {
        let mut flow = SubmissionFlow::new();
        let step = flow.submit(&composition(ReactionTier::One, "gg", false), &prices(), 3);

        let payment = Payment {
            bits: 0,
            channel_points: true,
        };
        assert_eq!(step, Step::Write(payment));
        assert_eq!(flow.state(), &SubmissionState::Writing(payment));

        assert!(flow.write_succeeded());
        assert_eq!(flow.state(), &SubmissionState::Sent);
        assert!(!flow.is_busy());
    }

    #[test]
    fn test_empty_reaction_rejected() {
        let mut flow = SubmissionFlow::new();
        let step = flow.submit(&composition(ReactionTier::One, "", false), &prices(), 3);

        assert_eq!(step, Step::Rejected(Rejection::EmptyReaction));
        assert_eq!(flow.state(), &SubmissionState::Idle);
    }

    #[test]
    fn test_media_only_reaction_accepted() {
        let mut flow = SubmissionFlow::new();
        let mut composition = composition(ReactionTier::One, "", false);
        composition.select_media(MediaSelection::new(MediaSource::Sticker, "https://giphy/s.gif", 200, 200));

        assert!(matches!(flow.submit(&composition, &prices(), 1), Step::Write(_)));
    }

    #[test]
    fn test_no_credits_rejected() {
        let mut flow = SubmissionFlow::new();
        let step = flow.submit(&composition(ReactionTier::One, "gg", false), &prices(), 0);

        assert_eq!(step, Step::Rejected(Rejection::InsufficientCredits));
        assert_eq!(flow.state(), &SubmissionState::Idle);
    }

    #[test]
    fn test_unloaded_price_rejected() {
        let mut flow = SubmissionFlow::new();
        let step = flow.submit(&composition(ReactionTier::Two, "gg", false), &PriceTable::new(), 3);

        assert_eq!(step, Step::Rejected(Rejection::PricesLoading));
        assert!(!flow.is_busy());
    }

    #[test]
    fn test_paid_reaction_without_tip() {
        let mut flow = SubmissionFlow::new();
        let step = flow.submit(&composition(ReactionTier::Two, "gg", false), &prices(), 0);

        assert_eq!(step, Step::Purchase("tier2sku".to_string()));
        assert_eq!(flow.state(), &SubmissionState::AwaitingBasePurchase);

        assert_eq!(
            flow.on_transaction(complete()),
            Step::Write(Payment {
                bits: 100,
                channel_points: false
            })
        );
    }

    #[test]
    fn test_paid_reaction_with_tip() {
        let mut flow = SubmissionFlow::new();
        flow.submit(&composition(ReactionTier::Three, "gg", true), &prices(), 0);

        assert_eq!(flow.on_transaction(complete()), Step::Purchase("tipsku".to_string()));
        assert!(flow.pending().is_some_and(|pending| pending.base_paid));
        assert_eq!(flow.state(), &SubmissionState::AwaitingTipPurchase);

        assert_eq!(
            flow.on_transaction(complete()),
            Step::Write(Payment {
                bits: 350,
                channel_points: false
            })
        );
    }

    #[test]
    fn test_tip_cancelled_after_base_paid_sends_base() {
        let mut flow = SubmissionFlow::new();
        flow.submit(&composition(ReactionTier::Three, "gg", true), &prices(), 0);
        flow.on_transaction(complete());

        assert_eq!(
            flow.on_transaction(TransactionEvent::Cancelled),
            Step::Write(Payment {
                bits: 300,
                channel_points: false
            })
        );
    }

    #[test]
    fn test_base_cancelled_returns_to_idle() {
        let mut flow = SubmissionFlow::new();
        flow.submit(&composition(ReactionTier::Two, "gg", true), &prices(), 0);

        assert_eq!(
            flow.on_transaction(TransactionEvent::Cancelled),
            Step::Cancelled {
                reopen_tipping: false
            }
        );
        assert_eq!(flow.state(), &SubmissionState::Idle);
        assert!(flow.pending().is_none());
    }

    #[test]
    fn test_credit_tip_paid() {
        let mut flow = SubmissionFlow::new();
        let step = flow.submit(&composition(ReactionTier::One, "gg", true), &prices(), 2);

        assert_eq!(step, Step::Purchase("tipsku".to_string()));
        assert_eq!(
            flow.on_transaction(complete()),
            Step::Write(Payment {
                bits: 50,
                channel_points: true
            })
        );
    }

    #[test]
    fn test_credit_tip_cancelled_reopens_tipping() {
        let mut flow = SubmissionFlow::new();
        flow.submit(&composition(ReactionTier::One, "gg", true), &prices(), 2);

        assert_eq!(
            flow.on_transaction(TransactionEvent::Cancelled),
            Step::Cancelled {
                reopen_tipping: true
            }
        );
        assert_eq!(flow.state(), &SubmissionState::Idle);
    }

    #[test]
    fn test_foreign_transactions_ignored() {
        let mut flow = SubmissionFlow::new();
        flow.submit(&composition(ReactionTier::Two, "gg", false), &prices(), 0);

        let foreign = TransactionEvent::Complete(Transaction::by(Initiator::Other));
        assert_eq!(flow.on_transaction(foreign), Step::Ignored);
        assert_eq!(flow.state(), &SubmissionState::AwaitingBasePurchase);
    }

    #[test]
    fn test_submit_while_awaiting_is_ignored() {
        let mut flow = SubmissionFlow::new();
        let composition = composition(ReactionTier::Two, "gg", false);
        flow.submit(&composition, &prices(), 0);

        assert_eq!(flow.submit(&composition, &prices(), 0), Step::Ignored);
        assert_eq!(flow.state(), &SubmissionState::AwaitingBasePurchase);
    }

    #[test]
    fn test_events_when_idle_ignored() {
        let mut flow = SubmissionFlow::new();
        assert_eq!(flow.on_transaction(complete()), Step::Ignored);
        assert_eq!(flow.on_transaction(TransactionEvent::Cancelled), Step::Ignored);
        assert!(!flow.write_succeeded());
    }

    #[test]
    fn test_new_submission_after_sent() {
        let mut flow = SubmissionFlow::new();
        let composition = composition(ReactionTier::One, "gg", false);
        flow.submit(&composition, &prices(), 3);
        flow.write_succeeded();

        assert!(matches!(flow.submit(&composition, &prices(), 2), Step::Write(_)));
    }

    #[test]
    fn test_abandon_clears_pending() {
        let mut flow = SubmissionFlow::new();
        flow.submit(&composition(ReactionTier::Three, "gg", true), &prices(), 0);
        flow.on_transaction(complete());

        flow.abandon();

        assert_eq!(flow.state(), &SubmissionState::Idle);
        assert!(flow.pending().is_none());
    }
}
