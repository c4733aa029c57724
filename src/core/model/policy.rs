//! Data-driven descriptions of the operator policies.
//!
//! A policy is a lookup table from the predicted online wait (whole minutes)
//! to the announcement and callback offer a blocked caller receives, plus the
//! rule used to predict that wait.

use super::super::errors::{SimResult, SimulationError};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Number of built-in policies
pub const POLICY_COUNT: u32 = 5;

/// Shortest predicted wait (minutes) that triggers a delay announcement in the presets
const ANNOUNCE_FROM_MINUTE: usize = 5;

/// Last minute the status-quo presets offer a callback for
const STATUS_QUO_LAST_MINUTE: usize = 59;

/// How an arriving caller's online wait is predicted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitPredictor {
    /// `avg_service_time * (online + offline queue lengths) / servers`
    QueueLength,
    /// Wait of the most recent caller served from the online queue
    LastObserved,
}

/// Callback promised alongside an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallbackOffer {
    None,
    Scheduled,
    HoldSpot,
    /// Callback between `lower` and `upper` minutes after arrival
    Window { lower: u32, upper: u32 },
}

impl CallbackOffer {
    pub fn is_offered(&self) -> bool {
        !matches!(self, CallbackOffer::None)
    }
}

/// What a blocked caller is told for one predicted-wait minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Online announcement (message subset index)
    pub online_message: usize,
    /// Callback announcement (message subset index)
    pub offline_message: usize,
    pub callback: CallbackOffer,
}

impl Offer {
    pub const SILENT: Offer = Offer {
        online_message: 0,
        offline_message: 0,
        callback: CallbackOffer::None,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub number: u32,
    pub name: String,
    pub wait_predictor: WaitPredictor,
    /// Indexed by predicted wait in whole minutes
    offers: Vec<Offer>,
}

impl Policy {
    /// Start an empty policy covering minutes `0..=max_wait_minutes`
    pub fn builder(number: u32, name: &str, max_wait_minutes: usize) -> PolicyBuilder {
        PolicyBuilder {
            policy: Policy {
                number,
                name: name.to_string(),
                wait_predictor: WaitPredictor::LastObserved,
                offers: vec![Offer::SILENT; max_wait_minutes + 1],
            },
        }
    }

    /// One of the five built-in policies
    pub fn preset(number: u32, max_wait_minutes: usize, window: WindowSpec) -> SimResult<Policy> {
        let all = 0..=max_wait_minutes;
        let status_quo = ANNOUNCE_FROM_MINUTE..=STATUS_QUO_LAST_MINUTE.min(max_wait_minutes);

        let policy = match number {
            1 => Policy::builder(1, "no-callback", max_wait_minutes)
                .predictor(WaitPredictor::QueueLength)
                .announce(ANNOUNCE_FROM_MINUTE..=max_wait_minutes)
                .build(),
            2 => Policy::builder(2, "status-quo-scheduled", max_wait_minutes)
                .announce(status_quo.clone())
                .offer_callback(status_quo, OfflineMessage::SameAsWait, CallbackOffer::Scheduled)
                .build(),
            3 => Policy::builder(3, "status-quo-hold-spot", max_wait_minutes)
                .announce(status_quo.clone())
                .offer_callback(status_quo, OfflineMessage::SameAsWait, CallbackOffer::HoldSpot)
                .build(),
            4 => Policy::builder(4, "hold-spot-always", max_wait_minutes)
                .announce(all.clone())
                .offer_callback(all, OfflineMessage::SameAsWait, CallbackOffer::HoldSpot)
                .build(),
            5 => Policy::builder(5, "window", max_wait_minutes)
                .announce(all.clone())
                .offer_callback(
                    all,
                    OfflineMessage::Fixed(window.midpoint_minutes as usize),
                    CallbackOffer::Window {
                        lower: window.lower_minutes,
                        upper: window.upper_minutes,
                    },
                )
                .build(),
            other => {
                return Err(SimulationError::InvalidConfig(format!(
                    "unknown policy number {} (expected 1..={})",
                    other, POLICY_COUNT
                )))
            }
        };
        Ok(policy)
    }

    /// Offer for a predicted wait, clamped to the last tabulated minute
    pub fn offer(&self, predicted_minutes: usize) -> Offer {
        let index = predicted_minutes.min(self.offers.len() - 1);
        self.offers[index]
    }

    /// Largest message index any offer uses
    pub fn max_message(&self) -> usize {
        self.offers
            .iter()
            .map(|o| o.online_message.max(o.offline_message))
            .max()
            .unwrap_or(0)
    }

    pub fn offers_callbacks(&self) -> bool {
        self.offers.iter().any(|o| o.callback.is_offered())
    }
}

/// Callback window of the window policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub lower_minutes: u32,
    pub upper_minutes: u32,
    /// Offline message given with a window offer
    pub midpoint_minutes: u32,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            lower_minutes: 20,
            upper_minutes: 40,
            midpoint_minutes: 30,
        }
    }
}

/// Source of the offline message in a callback offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfflineMessage {
    /// The predicted minute itself
    SameAsWait,
    Fixed(usize),
}

pub struct PolicyBuilder {
    policy: Policy,
}

impl PolicyBuilder {
    pub fn predictor(mut self, predictor: WaitPredictor) -> Self {
        self.policy.wait_predictor = predictor;
        self
    }

    /// Give a delay announcement equal to the predicted minute
    pub fn announce(mut self, minutes: RangeInclusive<usize>) -> Self {
        for minute in minutes {
            if let Some(offer) = self.policy.offers.get_mut(minute) {
                offer.online_message = minute;
            }
        }
        self
    }

    pub fn offer_callback(
        mut self,
        minutes: RangeInclusive<usize>,
        message: OfflineMessage,
        callback: CallbackOffer,
    ) -> Self {
        for minute in minutes {
            if let Some(offer) = self.policy.offers.get_mut(minute) {
                offer.offline_message = match message {
                    OfflineMessage::SameAsWait => minute,
                    OfflineMessage::Fixed(index) => index,
                };
                offer.callback = callback;
            }
        }
        self
    }

    pub fn build(self) -> Policy {
        self.policy
    }
}
