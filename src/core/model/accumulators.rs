use super::super::types::{PerQueue, QueueKind, SimTime};
use serde::Serialize;

/// Outcome counters of one pass, gated by the warm-up threshold.
///
/// Every terminal outcome (served, abandoned, callback not answered) advances
/// `processed`. An outcome is recorded only when it is at least the
/// `transient`-th one, and measurement starts at the time of that outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Accumulators {
    pub transient: u64,
    pub processed: u64,
    /// Start of the measured interval
    pub start_time: SimTime,
    /// Summed waits, in periods
    pub wait_time: PerQueue<f64>,
    pub received: PerQueue<u64>,
    pub answered: PerQueue<u64>,
    pub abandoned: u64,
    pub callbacks_not_answered: u64,
    pub callbacks_offered: u64,
    pub callbacks_accepted: u64,
}

impl Accumulators {
    pub fn new(transient: u64) -> Self {
        Self {
            transient,
            ..Self::default()
        }
    }

    /// Whether the next terminal outcome falls past the warm-up
    pub fn in_steady_state(&self) -> bool {
        self.processed + 1 >= self.transient
    }

    fn complete_customer(&mut self, now: SimTime) -> bool {
        let counted = self.in_steady_state();
        self.processed += 1;
        if self.processed == self.transient {
            self.start_time = now;
        }
        counted
    }

    /// Caller found an idle server on arrival
    pub fn record_immediate_service(&mut self, now: SimTime) -> bool {
        if self.in_steady_state() {
            self.received.online += 1;
            self.answered.online += 1;
        }
        self.complete_customer(now)
    }

    /// Caller taken from `queue` after waiting `wait` periods.
    /// Returns whether the outcome was recorded.
    pub fn record_served(&mut self, queue: QueueKind, wait: f64, now: SimTime) -> bool {
        if self.in_steady_state() {
            self.wait_time[queue] += wait;
            self.received[queue] += 1;
            self.answered[queue] += 1;
        }
        self.complete_customer(now)
    }

    /// Online caller gave up, on arrival (`wait` 0) or during a sweep
    pub fn record_abandoned(&mut self, wait: f64, now: SimTime) -> bool {
        if self.in_steady_state() {
            self.wait_time.online += wait;
            self.received.online += 1;
            self.abandoned += 1;
        }
        self.complete_customer(now)
    }

    /// Callback attempt found the caller unavailable
    pub fn record_not_answered(&mut self, wait: f64, now: SimTime) -> bool {
        if self.in_steady_state() {
            self.wait_time.offline += wait;
            self.received.offline += 1;
            self.callbacks_not_answered += 1;
        }
        self.complete_customer(now)
    }

    pub fn record_offer(&mut self) {
        if self.in_steady_state() {
            self.callbacks_offered += 1;
        }
    }

    pub fn record_acceptance(&mut self) {
        if self.in_steady_state() {
            self.callbacks_accepted += 1;
        }
    }

    pub fn received_total(&self) -> u64 {
        self.received.online + self.received.offline
    }

    pub fn answered_total(&self) -> u64 {
        self.answered.online + self.answered.offline
    }

    pub fn not_serviced(&self) -> u64 {
        self.abandoned + self.callbacks_not_answered
    }
}
