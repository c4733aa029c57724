use super::super::types::{CallerId, QueueKind, SimTime};
use super::choice::ChoiceModel;
use super::policy::CallbackOffer;

/// Fixed caller population: latent class and posterior membership per identity
#[derive(Debug, Clone)]
pub struct Population {
    classes: Vec<u16>,
    /// Row-major `[caller][class]`
    posterior: Vec<f64>,
    class_count: usize,
}

impl Population {
    /// Assign classes by identity: each class takes `floor(share * size)` consecutive
    /// identities, the last class takes whatever remains.
    pub fn new(size: usize, model: &ChoiceModel) -> Self {
        let class_count = model.class_count();
        let mut classes = Vec::with_capacity(size);
        for (class, latent) in model.classes.iter().enumerate() {
            let quota = if class + 1 == class_count {
                size - classes.len()
            } else {
                ((latent.prior_share * size as f64).floor() as usize).min(size - classes.len())
            };
            classes.extend(std::iter::repeat(class as u16).take(quota));
        }

        let priors = model.priors();
        let mut posterior = Vec::with_capacity(size * class_count);
        for _ in 0..size {
            posterior.extend_from_slice(&priors);
        }

        Self {
            classes,
            posterior,
            class_count,
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class_of(&self, caller: CallerId) -> usize {
        self.classes[caller.index()] as usize
    }

    pub fn posterior(&self, caller: CallerId) -> &[f64] {
        let start = caller.index() * self.class_count;
        &self.posterior[start..start + self.class_count]
    }

    /// Fold an observed gap between call strings into the caller's posterior
    pub fn observe_gap(&mut self, caller: CallerId, days: f64, model: &ChoiceModel) {
        let start = caller.index() * self.class_count;
        model.update_posterior(&mut self.posterior[start..start + self.class_count], days);
    }
}

/// A blocked caller waiting in the online or offline queue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitingCaller {
    pub caller: CallerId,
    pub class: usize,
    pub arrival_time: SimTime,
    pub online_message: usize,
    pub offline_message: usize,
    pub callback: CallbackOffer,
    /// Time the caller was told to expect a callback; fixed at arrival
    pub promised_time: SimTime,
}

impl WaitingCaller {
    /// Message that shaped this caller's wait in `queue`
    pub fn message_for(&self, queue: QueueKind) -> usize {
        match queue {
            QueueKind::Online => self.online_message,
            QueueKind::Offline => self.offline_message,
        }
    }

    /// Absolute (earliest, latest) callback times for a window offer
    pub fn window(&self, periods_per_minute: usize) -> Option<(SimTime, SimTime)> {
        match self.callback {
            CallbackOffer::Window { lower, upper } => {
                let per_minute = periods_per_minute as f64;
                Some((
                    self.arrival_time + lower as f64 * per_minute,
                    self.arrival_time + upper as f64 * per_minute,
                ))
            }
            _ => None,
        }
    }
}
