use super::PolicyEngine;
use crate::core::errors::SimResult;
use crate::core::event::Event;
use crate::core::event_scheduler::EventScheduler;
use crate::core::model::choice::abandon_probability;
use crate::core::types::QueueKind;

impl PolicyEngine<'_> {
    /// Every online caller present at the start of the sweep decides once
    /// whether to keep holding; the sweep repeats one period later.
    pub(super) fn on_abandonment_sweep(&mut self, calendar: &mut EventScheduler) -> SimResult<()> {
        let now = calendar.now();
        let time_of_day = self.config.time_of_day;

        for _ in 0..self.queues.online.len() {
            let Some(waiting) = self.queues.online.pop_front(now) else {
                break;
            };

            let elapsed = now - waiting.arrival_time;
            let period = elapsed.floor() as usize + 1;
            let expected_wait = self.hazard.expected_wait(waiting.online_message, QueueKind::Online, period);
            let v1 = self
                .config
                .choice_model
                .wait_utility(waiting.class, time_of_day, expected_wait);

            if self.stream.uniform() <= abandon_probability(v1) {
                let counted = self.stats.record_abandoned(elapsed, now);
                let delay = elapsed.floor() as usize;
                if counted && delay > 0 {
                    self.hazard.record_abandonment(waiting.online_message, delay);
                }
                self.schedule_next_string(calendar, waiting.caller)?;
            } else {
                self.queues.online.push_back(now, waiting);
            }
        }

        calendar.schedule_event(Event::AbandonmentSweep, now + 1.0)
    }
}
