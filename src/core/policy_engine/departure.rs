use super::PolicyEngine;
use crate::core::errors::SimResult;
use crate::core::event::DeparturePayload;
use crate::core::event_scheduler::EventScheduler;
use crate::core::model::{CallbackOffer, WaitingCaller};
use crate::core::types::{QueueKind, ServerId};

/// Who a freed server takes next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    ServeNone,
    ServeOnline,
    ServeOffline,
    /// A callback went unanswered; the offline head changed, resolve again
    Retry,
}

impl PolicyEngine<'_> {
    pub(super) fn on_departure(&mut self, calendar: &mut EventScheduler, payload: DeparturePayload) -> SimResult<()> {
        let now = calendar.now();
        self.schedule_next_string(calendar, payload.caller)?;
        self.servers.release(payload.server, now);

        loop {
            let queue = match self.resolve(calendar)? {
                Resolution::ServeNone => return Ok(()),
                Resolution::ServeOnline => QueueKind::Online,
                Resolution::ServeOffline => QueueKind::Offline,
                Resolution::Retry => continue,
            };
            return match self.queues[queue].pop_front(now) {
                Some(waiting) => self.serve(calendar, payload.server, queue, waiting),
                None => Ok(()),
            };
        }
    }

    /// One step of deciding which queue the freed server drains
    fn resolve(&mut self, calendar: &mut EventScheduler) -> SimResult<Resolution> {
        let now = calendar.now();
        let online_waiting = !self.queues.online.is_empty();
        let Some(head) = self.queues.offline.front().copied() else {
            return Ok(if online_waiting {
                Resolution::ServeOnline
            } else {
                Resolution::ServeNone
            });
        };

        match head.callback {
            CallbackOffer::Scheduled => {
                if now >= head.promised_time {
                    self.attempt_callback(calendar, head)
                } else if online_waiting {
                    Ok(Resolution::ServeOnline)
                } else {
                    Ok(Resolution::ServeNone)
                }
            }
            CallbackOffer::HoldSpot => {
                let online_first = self
                    .queues
                    .online
                    .front()
                    .map_or(false, |online| online.arrival_time <= head.arrival_time);
                if online_first {
                    Ok(Resolution::ServeOnline)
                } else {
                    self.attempt_callback(calendar, head)
                }
            }
            CallbackOffer::Window { .. } => {
                let (opens_at, closes_at) = head
                    .window(self.periods_per_minute)
                    .unwrap_or((head.arrival_time, head.arrival_time));
                if online_waiting && now < closes_at {
                    Ok(Resolution::ServeOnline)
                } else if now >= opens_at {
                    self.attempt_callback(calendar, head)
                } else {
                    Ok(Resolution::ServeNone)
                }
            }
            // Offline callers always hold a callback offer; call them back right away
            CallbackOffer::None => self.attempt_callback(calendar, head),
        }
    }

    /// Call back the offline head. When the caller is unavailable the call string
    /// ends unanswered and the caller leaves the offline queue.
    fn attempt_callback(&mut self, calendar: &mut EventScheduler, head: WaitingCaller) -> SimResult<Resolution> {
        let now = calendar.now();
        let elapsed = now - head.arrival_time;
        let minute = ((elapsed / self.periods_per_minute as f64).ceil() as usize)
            .clamp(1, self.config.max_wait_minutes.max(1));
        let available = self.config.availability.probability(minute, self.config.time_of_day);

        if self.stream.uniform() < available {
            return Ok(Resolution::ServeOffline);
        }

        self.queues.offline.pop_front(now);
        self.stats.record_not_answered(elapsed, now);
        self.schedule_next_string(calendar, head.caller)?;
        Ok(Resolution::Retry)
    }

    fn serve(
        &mut self,
        calendar: &mut EventScheduler,
        server: ServerId,
        queue: QueueKind,
        waiting: WaitingCaller,
    ) -> SimResult<()> {
        let now = calendar.now();
        let wait = now - waiting.arrival_time;
        let counted = self.stats.record_served(queue, wait, now);

        if queue == QueueKind::Online {
            self.last_online_wait = wait / self.periods_per_minute as f64;
        }

        let delay = wait.floor() as usize;
        if counted && delay > 0 {
            self.hazard.record_service(waiting.message_for(queue), queue, delay);
        }

        self.start_service(calendar, server, waiting.caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::Event;
    use crate::core::execution::config::SimulationConfig;
    use crate::core::model::{AvailabilityCurve, HazardTables, Policy, WindowSpec};
    use crate::core::random::{EmpiricalCdf, RandomStream};
    use crate::core::types::CallerId;

    const NOW: f64 = 100.0;

    struct Fixture {
        config: SimulationConfig,
        policy: Policy,
        service_cdf: EmpiricalCdf,
        hazard: HazardTables,
        stream: RandomStream,
    }

    impl Fixture {
        fn new(availability: f64) -> Self {
            let config = SimulationConfig::new()
                .with_population(20)
                .with_customers(1_000, 0)
                .with_tables(20, 75, 180)
                .with_availability(AvailabilityCurve::constant(availability, 75));
            Self {
                policy: Policy::preset(4, config.max_wait_minutes, WindowSpec::default()).unwrap(),
                config,
                // Every service lasts four periods
                service_cdf: EmpiricalCdf::new(vec![0.0, 0.0, 0.0, 0.0, 1.0]).unwrap(),
                hazard: HazardTables::new(180, 20),
                stream: RandomStream::new(11),
            }
        }

        fn engine(&mut self) -> PolicyEngine<'_> {
            let mut engine = PolicyEngine::new(
                &self.config,
                &self.policy,
                1,
                &self.service_cdf,
                &mut self.hazard,
                &mut self.stream,
            )
            .unwrap();
            engine.servers.bind(ServerId::new(0), CallerId::new(19), NOW - 4.0);
            engine
        }
    }

    fn calendar_at(now: f64) -> EventScheduler {
        let mut calendar = EventScheduler::new();
        calendar.schedule_event(Event::AbandonmentSweep, now).unwrap();
        calendar.next_event();
        calendar
    }

    fn waiting(id: u32, arrival_time: f64, callback: CallbackOffer) -> WaitingCaller {
        WaitingCaller {
            caller: CallerId::new(id),
            class: 0,
            arrival_time,
            online_message: 10,
            offline_message: 10,
            callback,
            promised_time: arrival_time + 60.0,
        }
    }

    fn depart(engine: &mut PolicyEngine<'_>, calendar: &mut EventScheduler) {
        let payload = DeparturePayload {
            server: ServerId::new(0),
            caller: CallerId::new(19),
        };
        engine.on_departure(calendar, payload).unwrap();
    }

    #[test]
    fn test_empty_queues_leave_server_idle() {
        let mut fixture = Fixture::new(1.0);
        let mut engine = fixture.engine();
        let mut calendar = calendar_at(NOW);

        depart(&mut engine, &mut calendar);

        assert_eq!(engine.servers.busy_count(), 0);
        // Only the departing caller's next string was scheduled
        assert_eq!(calendar.pending(), 1);
    }

    #[test]
    fn test_hold_spot_serves_earlier_online_caller() {
        let mut fixture = Fixture::new(1.0);
        let mut engine = fixture.engine();
        let mut calendar = calendar_at(NOW);
        engine.queues.online.push_back(40.0, waiting(1, 40.0, CallbackOffer::None));
        engine.queues.offline.push_back(50.0, waiting(2, 50.0, CallbackOffer::HoldSpot));

        depart(&mut engine, &mut calendar);

        assert_eq!(engine.servers.get(ServerId::new(0)).occupant, Some(CallerId::new(1)));
        assert_eq!(engine.queues.offline.len(), 1);
        assert_eq!(engine.last_online_wait(), 60.0 / 6.0);
    }

    #[test]
    fn test_hold_spot_calls_back_earlier_offline_caller() {
        let mut fixture = Fixture::new(1.0);
        let mut engine = fixture.engine();
        let mut calendar = calendar_at(NOW);
        engine.queues.online.push_back(60.0, waiting(1, 60.0, CallbackOffer::None));
        engine.queues.offline.push_back(50.0, waiting(2, 50.0, CallbackOffer::HoldSpot));

        depart(&mut engine, &mut calendar);

        assert_eq!(engine.servers.get(ServerId::new(0)).occupant, Some(CallerId::new(2)));
        assert_eq!(engine.stats.answered.offline, 1);
        assert_eq!(engine.queues.online.len(), 1);
    }

    #[test]
    fn test_scheduled_callback_waits_for_promise() {
        let mut fixture = Fixture::new(1.0);
        let mut engine = fixture.engine();
        let mut calendar = calendar_at(NOW);
        // Promised at 110
        engine.queues.offline.push_back(50.0, waiting(2, 50.0, CallbackOffer::Scheduled));

        depart(&mut engine, &mut calendar);
        assert_eq!(engine.servers.busy_count(), 0);
        assert_eq!(engine.queues.offline.len(), 1);

        engine.queues.online.push_back(90.0, waiting(1, 90.0, CallbackOffer::None));
        engine.servers.bind(ServerId::new(0), CallerId::new(19), NOW);
        depart(&mut engine, &mut calendar);
        assert_eq!(engine.servers.get(ServerId::new(0)).occupant, Some(CallerId::new(1)));
        assert_eq!(engine.queues.offline.len(), 1);
    }

    #[test]
    fn test_due_scheduled_callback_preempts_online() {
        let mut fixture = Fixture::new(1.0);
        let mut engine = fixture.engine();
        let mut calendar = calendar_at(NOW);
        // Promised at 90
        engine.queues.offline.push_back(30.0, waiting(2, 30.0, CallbackOffer::Scheduled));
        engine.queues.online.push_back(10.0, waiting(1, 10.0, CallbackOffer::None));

        depart(&mut engine, &mut calendar);

        assert_eq!(engine.servers.get(ServerId::new(0)).occupant, Some(CallerId::new(2)));
        assert_eq!(engine.stats.answered.offline, 1);
        assert_eq!(engine.queues.online.len(), 1);
    }

    #[test]
    fn test_unanswered_scheduled_callback_retries_next_head() {
        let mut fixture = Fixture::new(0.0);
        let mut engine = fixture.engine();
        let mut calendar = calendar_at(NOW);
        // Promised at 80 (due) and 120 (not yet)
        engine.queues.offline.push_back(20.0, waiting(2, 20.0, CallbackOffer::Scheduled));
        engine.queues.offline.push_back(60.0, waiting(3, 60.0, CallbackOffer::Scheduled));
        engine.queues.online.push_back(10.0, waiting(1, 10.0, CallbackOffer::None));

        depart(&mut engine, &mut calendar);

        assert_eq!(engine.stats.callbacks_not_answered, 1);
        assert_eq!(engine.queues.offline.front().map(|w| w.caller), Some(CallerId::new(3)));
        assert_eq!(engine.servers.get(ServerId::new(0)).occupant, Some(CallerId::new(1)));
        assert!(engine.queues.online.is_empty());
    }

    #[test]
    fn test_open_window_yields_to_online() {
        let mut fixture = Fixture::new(1.0);
        let mut engine = fixture.engine();
        let mut calendar = calendar_at(NOW);
        // Window 40 + 10 * 6 = 100 through 40 + 40 * 6 = 280
        engine
            .queues
            .offline
            .push_back(40.0, waiting(2, 40.0, CallbackOffer::Window { lower: 10, upper: 40 }));
        engine.queues.online.push_back(10.0, waiting(1, 10.0, CallbackOffer::None));

        depart(&mut engine, &mut calendar);

        assert_eq!(engine.servers.get(ServerId::new(0)).occupant, Some(CallerId::new(1)));
        assert_eq!(engine.queues.offline.len(), 1);
        assert_eq!(engine.stats.answered.offline, 0);
    }

    #[test]
    fn test_open_window_calls_back_when_online_empty() {
        let mut fixture = Fixture::new(1.0);
        let mut engine = fixture.engine();
        let mut calendar = calendar_at(NOW);
        engine
            .queues
            .offline
            .push_back(40.0, waiting(2, 40.0, CallbackOffer::Window { lower: 10, upper: 40 }));

        depart(&mut engine, &mut calendar);

        assert_eq!(engine.servers.get(ServerId::new(0)).occupant, Some(CallerId::new(2)));
        assert!(engine.queues.offline.is_empty());
        assert_eq!(engine.stats.answered.offline, 1);
    }

    #[test]
    fn test_window_before_lower_bound_serves_no_one() {
        let mut fixture = Fixture::new(1.0);
        let mut engine = fixture.engine();
        let mut calendar = calendar_at(NOW);
        // Window opens at 50 + 20 * 6 = 170
        engine
            .queues
            .offline
            .push_back(50.0, waiting(2, 50.0, CallbackOffer::Window { lower: 20, upper: 40 }));

        depart(&mut engine, &mut calendar);

        assert_eq!(engine.servers.busy_count(), 0);
        assert_eq!(engine.queues.offline.len(), 1);
    }

    #[test]
    fn test_window_past_upper_bound_preempts_online() {
        let mut fixture = Fixture::new(1.0);
        let mut engine = fixture.engine();
        let mut calendar = calendar_at(300.0);
        // Window closes at 10 + 40 * 6 = 250
        engine
            .queues
            .offline
            .push_back(10.0, waiting(2, 10.0, CallbackOffer::Window { lower: 20, upper: 40 }));
        engine.queues.online.push_back(5.0, waiting(1, 5.0, CallbackOffer::None));

        depart(&mut engine, &mut calendar);

        assert_eq!(engine.servers.get(ServerId::new(0)).occupant, Some(CallerId::new(2)));
    }

    #[test]
    fn test_unanswered_callbacks_fall_through_to_online() {
        let mut fixture = Fixture::new(0.0);
        let mut engine = fixture.engine();
        let mut calendar = calendar_at(NOW);
        engine.queues.offline.push_back(20.0, waiting(2, 20.0, CallbackOffer::HoldSpot));
        engine.queues.offline.push_back(30.0, waiting(3, 30.0, CallbackOffer::HoldSpot));
        engine.queues.online.push_back(40.0, waiting(1, 40.0, CallbackOffer::None));

        depart(&mut engine, &mut calendar);

        assert_eq!(engine.stats.callbacks_not_answered, 2);
        assert_eq!(engine.stats.received.offline, 2);
        assert!(engine.queues.offline.is_empty());
        assert_eq!(engine.servers.get(ServerId::new(0)).occupant, Some(CallerId::new(1)));
        // Departing caller, two unanswered callers, and the new service completion
        assert_eq!(calendar.pending(), 4);
    }

    #[test]
    fn test_served_wait_feeds_hazard_tables() {
        let mut fixture = Fixture::new(1.0);
        {
            let mut engine = fixture.engine();
            let mut calendar = calendar_at(NOW);
            engine.queues.online.push_back(93.5, waiting(1, 93.5, CallbackOffer::None));
            depart(&mut engine, &mut calendar);
        }

        // Waited 6.5 periods under message 10
        let curve = fixture.hazard.curve(10, QueueKind::Online);
        assert_eq!(curve.service_count(6), 1.0);
        assert_eq!(curve.at_risk(6), 1.0);
        assert_eq!(curve.at_risk(7), 0.0);
    }
}
