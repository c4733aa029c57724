//! Multinomial-logit caller behavior and latent-class bookkeeping.

use super::super::random::RandomStream;
use super::super::types::TimeOfDay;
use serde::{Deserialize, Serialize};

/// Posterior probabilities within this distance of 0 or 1 are snapped
const POSTERIOR_EPSILON: f64 = 1e-10;

const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// Utility coefficients of one latent class in one time-of-day bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassUtility {
    /// Reward for being served (`r`)
    pub reward: f64,
    /// Cost per period of waiting online (`c_n`)
    pub online_cost: f64,
    /// Cost per period of waiting for a callback (`c_f`)
    pub offline_cost: f64,
    /// Intrinsic preference for the callback channel
    pub offline_preference: f64,
}

/// An unobserved caller segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentClass {
    /// Prior probability of membership (`p_s`)
    pub prior_share: f64,
    /// Call strings started per day (`lambda_s`)
    pub daily_rate: f64,
    pub day: ClassUtility,
    pub evening: ClassUtility,
}

impl LatentClass {
    pub fn utility(&self, time_of_day: TimeOfDay) -> &ClassUtility {
        match time_of_day {
            TimeOfDay::Day => &self.day,
            TimeOfDay::Evening => &self.evening,
        }
    }

    /// Mean time between call strings, in periods of `period_length_secs`
    pub fn mean_interstring_periods(&self, period_length_secs: f64) -> f64 {
        (1.0 / self.daily_rate) * SECONDS_PER_DAY / period_length_secs
    }
}

/// Outcome of a blocked caller's choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Abandon,
    JoinOnline,
    AcceptCallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceModel {
    pub classes: Vec<LatentClass>,
}

impl ChoiceModel {
    pub fn new(classes: Vec<LatentClass>) -> Self {
        Self { classes }
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Utility of holding online given the expected online wait (periods)
    pub fn wait_utility(&self, class: usize, time_of_day: TimeOfDay, expected_wait: f64) -> f64 {
        let u = self.classes[class].utility(time_of_day);
        u.reward - u.online_cost * expected_wait
    }

    /// Utility of accepting a callback
    pub fn callback_utility(
        &self,
        class: usize,
        time_of_day: TimeOfDay,
        expected_wait: f64,
        answer_probability: f64,
    ) -> f64 {
        let u = self.classes[class].utility(time_of_day);
        u.offline_preference - u.offline_cost * expected_wait + u.reward * answer_probability
    }

    /// Update posterior class membership after observing an inter-string gap of `days`
    pub fn update_posterior(&self, posterior: &mut [f64], days: f64) {
        let mut total = 0.0;
        for (probability, class) in posterior.iter_mut().zip(&self.classes) {
            *probability *= class.daily_rate * (-class.daily_rate * days).exp();
            total += *probability;
        }
        if total <= 0.0 || !total.is_finite() {
            return;
        }
        for probability in posterior.iter_mut() {
            *probability /= total;
            if *probability > 1.0 - POSTERIOR_EPSILON {
                *probability = 1.0;
            }
            if *probability < POSTERIOR_EPSILON {
                *probability = 0.0;
            }
        }
    }

    pub fn priors(&self) -> Vec<f64> {
        self.classes.iter().map(|c| c.prior_share).collect()
    }
}

impl Default for ChoiceModel {
    fn default() -> Self {
        Self {
            classes: vec![
                LatentClass {
                    prior_share: 0.972281853,
                    daily_rate: 0.000396765,
                    day: ClassUtility {
                        reward: 5.783027604,
                        online_cost: 0.017017419,
                        offline_cost: 0.003575103,
                        offline_preference: -1.200647571,
                    },
                    evening: ClassUtility {
                        reward: 6.20322235,
                        online_cost: 0.010867923,
                        offline_cost: 0.002810464,
                        offline_preference: -0.877221376,
                    },
                },
                LatentClass {
                    prior_share: 0.027718147,
                    daily_rate: 0.025974819,
                    day: ClassUtility {
                        reward: 5.477565075,
                        online_cost: 0.01856109,
                        offline_cost: 0.005728517,
                        offline_preference: -0.777489296,
                    },
                    evening: ClassUtility {
                        reward: 5.809672146,
                        online_cost: 0.009569585,
                        offline_cost: 0.002001847,
                        offline_preference: -0.627915692,
                    },
                },
            ],
        }
    }
}

/// Probability of abandoning when the alternative is holding with utility `v1`
pub fn abandon_probability(v1: f64) -> f64 {
    let v0: f64 = 0.0;
    v0.exp() / (v0.exp() + v1.exp())
}

/// Probability of taking the callback among {abandon, hold, callback}
pub fn callback_probability(v1: f64, v2: f64) -> f64 {
    let v0: f64 = 0.0;
    v2.exp() / (v0.exp() + v1.exp() + v2.exp())
}

/// Draw a blocked caller's choice. Without a callback offer only abandon/hold is drawn;
/// with one, acceptance is drawn first and abandon/hold only on rejection.
pub fn decide(stream: &mut RandomStream, v1: f64, v2: Option<f64>) -> Decision {
    if let Some(v2) = v2 {
        if stream.uniform() < callback_probability(v1, v2) {
            return Decision::AcceptCallback;
        }
    }

    if stream.uniform() < abandon_probability(v1) {
        Decision::Abandon
    } else {
        Decision::JoinOnline
    }
}
