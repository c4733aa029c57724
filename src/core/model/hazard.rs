//! Discrete-time hazard estimation of waiting times.
//!
//! During a pass the engine records, per (message, queue), how many waiting
//! callers were still at risk in each period and how many were served in it.
//! Between passes those counts become hazard rates, a survival cdf/pdf and an
//! expected residual wait per period, which the next pass uses to predict
//! waits. The raw counts are cleared once consumed.

use super::super::types::{QueueKind, TimeOfDay};
use super::availability::AvailabilityCurve;
use log::debug;

/// Estimates for one (message, queue) pair, indexed by period `1..=horizon + 1`
#[derive(Debug, Clone)]
pub struct HazardCurve {
    at_risk: Vec<f64>,
    service_count: Vec<f64>,
    hazard: Vec<f64>,
    cdf: Vec<f64>,
    pdf: Vec<f64>,
    expected_wait: Vec<f64>,
}

impl HazardCurve {
    fn new(horizon: usize) -> Self {
        let mut curve = Self {
            at_risk: vec![0.0; horizon + 2],
            service_count: vec![0.0; horizon + 2],
            hazard: vec![0.0; horizon + 2],
            cdf: vec![0.0; horizon + 2],
            pdf: vec![0.0; horizon + 2],
            expected_wait: vec![0.0; horizon + 2],
        };
        curve.reset(horizon);
        curve
    }

    fn reset(&mut self, horizon: usize) {
        for table in [
            &mut self.at_risk,
            &mut self.service_count,
            &mut self.hazard,
            &mut self.cdf,
            &mut self.pdf,
            &mut self.expected_wait,
        ] {
            table.iter_mut().for_each(|v| *v = 0.0);
        }
        // Everyone is resolved by the period past the horizon
        self.hazard[horizon + 1] = 1.0;
    }

    fn clear_counts(&mut self) {
        self.at_risk.iter_mut().for_each(|v| *v = 0.0);
        self.service_count.iter_mut().for_each(|v| *v = 0.0);
    }

    fn estimate_hazard(&mut self, horizon: usize) {
        for k in 1..=horizon {
            self.hazard[k] = if self.at_risk[k] > 0.0 {
                self.service_count[k] / self.at_risk[k]
            } else {
                0.0
            };
        }
        self.hazard[horizon + 1] = 1.0;
    }

    fn rebuild(&mut self, horizon: usize) {
        // cdf[0] = 0 so the recursion starts cleanly at period 1
        self.cdf[0] = 0.0;
        self.pdf[0] = 0.0;
        for k in 1..=horizon {
            let previous = self.cdf[k - 1];
            self.cdf[k] = previous + (1.0 - previous) * self.hazard[k];
            self.pdf[k] = self.cdf[k] - previous;
        }
        self.cdf[horizon + 1] = 0.0;
        self.pdf[horizon + 1] = 0.0;

        // Period 1 is the unconditional mean, including the mass that completes the cdf
        self.expected_wait[1] = (1..=horizon).map(|l| l as f64 * self.pdf[l]).sum();
        for k in 2..=horizon {
            let survival = 1.0 - self.cdf[k - 1];
            let mut expected = 0.0;
            for l in k..=horizon {
                if self.cdf[l] < 1.0 {
                    expected += (l - k + 1) as f64 * self.pdf[l] / survival;
                }
            }
            self.expected_wait[k] = expected;
        }
        self.expected_wait[horizon + 1] = 0.0;
    }

    pub fn at_risk(&self, period: usize) -> f64 {
        self.at_risk[period]
    }

    pub fn service_count(&self, period: usize) -> f64 {
        self.service_count[period]
    }

    pub fn hazard(&self, period: usize) -> f64 {
        self.hazard[period]
    }

    pub fn cdf(&self, period: usize) -> f64 {
        self.cdf[period]
    }

    pub fn pdf(&self, period: usize) -> f64 {
        self.pdf[period]
    }

    pub fn expected_wait(&self, period: usize) -> f64 {
        self.expected_wait[period]
    }
}

/// Hazard curves for every (message, queue) plus callback answer probabilities
#[derive(Debug, Clone)]
pub struct HazardTables {
    horizon: usize,
    messages: usize,
    curves: Vec<HazardCurve>,
    /// Per message: [day, evening]
    answer_probability: Vec<[f64; 2]>,
}

impl HazardTables {
    /// Tables for message indices `0..=message_subsets` and periods `1..=horizon`
    pub fn new(message_subsets: usize, horizon: usize) -> Self {
        let messages = message_subsets + 1;
        Self {
            horizon,
            messages,
            curves: (0..messages * 2).map(|_| HazardCurve::new(horizon)).collect(),
            answer_probability: vec![[0.0; 2]; messages],
        }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn message_count(&self) -> usize {
        self.messages
    }

    pub fn curve(&self, message: usize, queue: QueueKind) -> &HazardCurve {
        &self.curves[message * 2 + queue.index()]
    }

    fn curve_mut(&mut self, message: usize, queue: QueueKind) -> &mut HazardCurve {
        &mut self.curves[message * 2 + queue.index()]
    }

    /// Zero every table, keeping only the pinned certainty past the horizon
    pub fn reset(&mut self) {
        let horizon = self.horizon;
        self.curves.iter_mut().for_each(|c| c.reset(horizon));
        self.answer_probability.iter_mut().for_each(|p| *p = [0.0; 2]);
    }

    /// A caller waiting under `message` in `queue` was served after `delay` whole periods
    pub fn record_service(&mut self, message: usize, queue: QueueKind, delay: usize) {
        if delay == 0 {
            return;
        }
        let horizon = self.horizon;
        let curve = self.curve_mut(message, queue);
        for period in 1..=delay.min(horizon) {
            curve.at_risk[period] += 1.0;
        }
        if delay <= horizon {
            curve.service_count[delay] += 1.0;
        }
    }

    /// An online caller gave up after `delay` whole periods: at risk, never served
    pub fn record_abandonment(&mut self, message: usize, delay: usize) {
        let horizon = self.horizon;
        let curve = self.curve_mut(message, QueueKind::Online);
        for period in 1..=delay.min(horizon) {
            curve.at_risk[period] += 1.0;
        }
    }

    /// Prepare predictions for pass `iteration` (1-based).
    ///
    /// The first pass starts from zero hazards; later passes turn the previous
    /// pass's counts into hazards and clear the counts.
    pub fn begin_iteration(
        &mut self,
        iteration: usize,
        availability: &AvailabilityCurve,
        periods_per_minute: usize,
    ) {
        let horizon = self.horizon;
        if iteration <= 1 {
            self.reset();
        } else {
            for curve in self.curves.iter_mut() {
                curve.estimate_hazard(horizon);
                curve.clear_counts();
            }
        }

        for curve in self.curves.iter_mut() {
            curve.rebuild(horizon);
        }
        self.rebuild_answer_probability(availability, periods_per_minute);

        debug!(
            "hazard tables ready for iteration {}: {} curves over {} periods",
            iteration,
            self.curves.len(),
            horizon
        );
    }

    fn rebuild_answer_probability(&mut self, availability: &AvailabilityCurve, periods_per_minute: usize) {
        let horizon = self.horizon;
        let per_minute = periods_per_minute.max(1);
        for message in 0..self.messages {
            let curve = &self.curves[message * 2 + QueueKind::Offline.index()];
            let mut probability = [0.0; 2];
            for time_of_day in [TimeOfDay::Day, TimeOfDay::Evening] {
                let mut total = 0.0;
                for k in 1..=horizon {
                    // Periods 1..=per_minute fall in minute 1
                    let minute = (k + per_minute - 1) / per_minute;
                    total += curve.pdf[k] * availability.probability(minute, time_of_day);
                }
                probability[time_of_day.index()] = total;
            }
            self.answer_probability[message] = probability;
        }
    }

    /// Expected residual wait (periods) for a caller in `period` since arrival
    pub fn expected_wait(&self, message: usize, queue: QueueKind, period: usize) -> f64 {
        let period = period.clamp(1, self.horizon + 1);
        self.curve(message, queue).expected_wait(period)
    }

    /// Probability a callback for `message` is answered
    pub fn answer_probability(&self, message: usize, time_of_day: TimeOfDay) -> f64 {
        self.answer_probability[message][time_of_day.index()]
    }
}
