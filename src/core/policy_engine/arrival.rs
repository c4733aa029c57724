use super::PolicyEngine;
use crate::core::errors::SimResult;
use crate::core::event::ArrivalPayload;
use crate::core::event_scheduler::EventScheduler;
use crate::core::model::choice::{decide, Decision};
use crate::core::model::{CallbackOffer, WaitPredictor, WaitingCaller};
use crate::core::types::QueueKind;
use log::debug;

impl PolicyEngine<'_> {
    pub(super) fn on_arrival(&mut self, calendar: &mut EventScheduler, payload: ArrivalPayload) -> SimResult<()> {
        let now = calendar.now();
        let caller = payload.caller;

        if let Some(server) = self.servers.longest_idle(now) {
            self.stats.record_immediate_service(now);
            self.last_online_wait = 0.0;
            return self.start_service(calendar, server, caller);
        }

        let class = self.population.class_of(caller);
        let offer = self.policy.offer(self.predicted_wait_minutes());
        let time_of_day = self.config.time_of_day;
        let model = &self.config.choice_model;

        let online_wait = self.hazard.expected_wait(offer.online_message, QueueKind::Online, 1);
        let v1 = model.wait_utility(class, time_of_day, online_wait);
        let v2 = if offer.callback.is_offered() {
            let offline_wait = self.hazard.expected_wait(offer.offline_message, QueueKind::Offline, 1);
            let answered = self.hazard.answer_probability(offer.offline_message, time_of_day);
            Some(model.callback_utility(class, time_of_day, offline_wait, answered))
        } else {
            None
        };
        if v2.is_some() {
            self.stats.record_offer();
        }

        let decision = decide(self.stream, v1, v2);
        debug!("t={:.2} {} blocked, {:?} under {:?}", now, caller, decision, offer);

        let waiting = WaitingCaller {
            caller,
            class,
            arrival_time: now,
            online_message: offer.online_message,
            offline_message: offer.offline_message,
            callback: offer.callback,
            promised_time: now + (offer.online_message * self.periods_per_minute) as f64,
        };

        match decision {
            Decision::Abandon => {
                self.stats.record_abandoned(0.0, now);
                self.schedule_next_string(calendar, caller)?;
            }
            Decision::JoinOnline => self.queues.online.push_back(now, waiting),
            Decision::AcceptCallback => {
                self.stats.record_acceptance();
                match waiting.callback {
                    CallbackOffer::Scheduled => {
                        self.queues
                            .offline
                            .insert_sorted_by_key(now, waiting, |w| w.promised_time)
                    }
                    _ => self.queues.offline.push_back(now, waiting),
                }
            }
        }
        Ok(())
    }

    /// Predicted online wait for a blocked caller, in whole minutes
    fn predicted_wait_minutes(&self) -> usize {
        let minutes = match self.policy.wait_predictor {
            WaitPredictor::QueueLength => {
                let waiting = (self.queues.online.len() + self.queues.offline.len()) as f64;
                self.config.avg_service_minutes * waiting / self.servers.len() as f64
            }
            WaitPredictor::LastObserved => self.last_online_wait,
        };
        minutes.max(0.0).floor() as usize
    }
}
