//! Event handlers of the call center.
//!
//! [`PolicyEngine`] is the mutable context of one simulation pass. It owns
//! the server pool, both queues, the caller population and the outcome
//! counters, and borrows the inputs shared across passes (configuration,
//! policy, service-time distribution, hazard tables and the random stream).

mod abandonment;
mod arrival;
mod departure;

use crate::core::errors::{SimResult, SimulationError};
use crate::core::event::{ArrivalPayload, DeparturePayload, Event};
use crate::core::event_scheduler::EventScheduler;
use crate::core::execution::config::SimulationConfig;
use crate::core::execution::simulation_engine::EventHandler;
use crate::core::model::{Accumulators, HazardTables, Policy, Population, ServerPool, WaitingCaller};
use crate::core::queues::CallQueue;
use crate::core::random::{EmpiricalCdf, RandomStream};
use crate::core::types::{CallerId, PerQueue, QueueKind, ServerId, SimTime};
use serde::Serialize;

const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// Terminal state of a pass, read by the reporter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassSummary {
    pub servers: usize,
    pub policy: u32,
    /// Clock when the customer target was reached
    pub end_time: SimTime,
    pub stats: Accumulators,
    pub mean_queue_length: PerQueue<Option<f64>>,
    pub utilization: Option<f64>,
}

pub struct PolicyEngine<'a> {
    config: &'a SimulationConfig,
    policy: &'a Policy,
    service_cdf: &'a EmpiricalCdf,
    hazard: &'a mut HazardTables,
    stream: &'a mut RandomStream,
    population: Population,
    servers: ServerPool,
    queues: PerQueue<CallQueue<WaitingCaller>>,
    stats: Accumulators,
    /// Wait of the last caller served from the online queue, in minutes
    last_online_wait: f64,
    periods_per_minute: usize,
    /// Mean inter-string time per latent class, in periods
    interstring_means: Vec<f64>,
}

impl<'a> PolicyEngine<'a> {
    pub fn new(
        config: &'a SimulationConfig,
        policy: &'a Policy,
        servers: usize,
        service_cdf: &'a EmpiricalCdf,
        hazard: &'a mut HazardTables,
        stream: &'a mut RandomStream,
    ) -> SimResult<Self> {
        if servers == 0 {
            return Err(SimulationError::InvalidConfig("at least one server is required".to_string()));
        }
        if policy.max_message() >= hazard.message_count() {
            return Err(SimulationError::InvalidConfig(format!(
                "policy '{}' uses message {} but only {} message subsets are tracked",
                policy.name,
                policy.max_message(),
                hazard.message_count() - 1
            )));
        }

        let period_length = config.period_length_secs as f64;
        let interstring_means = config
            .choice_model
            .classes
            .iter()
            .map(|class| class.mean_interstring_periods(period_length))
            .collect();

        Ok(Self {
            config,
            policy,
            service_cdf,
            hazard,
            stream,
            population: Population::new(config.population, &config.choice_model),
            servers: ServerPool::new(servers),
            queues: PerQueue::new(CallQueue::new(), CallQueue::new()),
            stats: Accumulators::new(config.transient),
            last_online_wait: 0.0,
            periods_per_minute: config.periods_per_minute(),
            interstring_means,
        })
    }

    pub fn stats(&self) -> &Accumulators {
        &self.stats
    }

    pub fn servers(&self) -> &ServerPool {
        &self.servers
    }

    pub fn queue(&self, queue: QueueKind) -> &CallQueue<WaitingCaller> {
        &self.queues[queue]
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Last observed online wait in minutes
    pub fn last_online_wait(&self) -> f64 {
        self.last_online_wait
    }

    pub fn summarize(&self, now: SimTime) -> PassSummary {
        PassSummary {
            servers: self.servers.len(),
            policy: self.policy.number,
            end_time: now,
            stats: self.stats.clone(),
            mean_queue_length: PerQueue::new(
                self.queues.online.mean_length(now),
                self.queues.offline.mean_length(now),
            ),
            utilization: self.servers.utilization(now),
        }
    }

    /// Draw the caller's next inter-string gap (whole periods) and fold it into their posterior
    fn draw_interstring_gap(&mut self, caller: CallerId) -> SimResult<f64> {
        let class = self.population.class_of(caller);
        let gap = self.stream.exponential(self.interstring_means[class])?.ceil();
        let days = gap * self.config.period_length_secs as f64 / SECONDS_PER_DAY;
        self.population.observe_gap(caller, days, &self.config.choice_model);
        Ok(gap)
    }

    /// The caller's current string is over; their next one starts after a fresh gap
    fn schedule_next_string(&mut self, calendar: &mut EventScheduler, caller: CallerId) -> SimResult<()> {
        let gap = self.draw_interstring_gap(caller)?;
        calendar.schedule_event(Event::Arrival(ArrivalPayload { caller }), calendar.now() + gap)
    }

    /// Bind `caller` to `server` and schedule the end of service
    fn start_service(
        &mut self,
        calendar: &mut EventScheduler,
        server: ServerId,
        caller: CallerId,
    ) -> SimResult<()> {
        let now = calendar.now();
        self.servers.bind(server, caller, now);
        let duration = self.service_cdf.sample(self.stream) as f64;
        let completes_at = (now.floor() + duration).max(now);
        calendar.schedule_event(Event::Departure(DeparturePayload { server, caller }), completes_at)
    }
}

impl EventHandler for PolicyEngine<'_> {
    fn initialize(&mut self, calendar: &mut EventScheduler) -> SimResult<()> {
        for index in 0..self.population.len() {
            let caller = CallerId::new(index as u32);
            let first_arrival = self.draw_interstring_gap(caller)?;
            calendar.schedule_event(Event::Arrival(ArrivalPayload { caller }), first_arrival)?;
        }
        calendar.schedule_event(Event::AbandonmentSweep, self.config.sweep_offset)
    }

    fn handle(&mut self, event: Event, calendar: &mut EventScheduler) -> SimResult<()> {
        match event {
            Event::Arrival(payload) => self.on_arrival(calendar, payload),
            Event::Departure(payload) => self.on_departure(calendar, payload),
            Event::AbandonmentSweep => self.on_abandonment_sweep(calendar),
        }
    }

    fn is_complete(&self) -> bool {
        self.stats.processed >= self.config.customer_target
    }
}
