use crate::core::errors::{SimResult, SimulationError};
use crate::core::event::{Event, EventKind};
use crate::core::event_scheduler::EventScheduler;
use crate::core::types::SimTime;
use log::trace;

/// Reacts to events dispatched by the [`SimulationEngine`]
pub trait EventHandler {
    /// Schedule the events that start a pass
    fn initialize(&mut self, calendar: &mut EventScheduler) -> SimResult<()>;

    /// Process one event; the calendar clock is already at the event's time
    fn handle(&mut self, event: Event, calendar: &mut EventScheduler) -> SimResult<()>;

    /// Whether the run has reached its stopping condition
    fn is_complete(&self) -> bool;
}

/// Observer trait for simulation events
pub trait SimulationObserver {
    /// Called when the simulation clock advances
    fn on_time_advance(&mut self, old_time: SimTime, new_time: SimTime);

    /// Called after an event has been handled
    fn on_event_dispatched(&mut self, time: SimTime, kind: EventKind);
}

/// Drives a handler with events taken from the calendar in time order
pub struct SimulationEngine<H: EventHandler> {
    handler: H,
    scheduler: EventScheduler,
    events_dispatched: u64,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl<H: EventHandler> SimulationEngine<H> {
    /// Create an engine and let the handler schedule its initial events
    pub fn new(mut handler: H) -> SimResult<Self> {
        let mut scheduler = EventScheduler::new();
        handler.initialize(&mut scheduler)?;

        Ok(Self {
            handler,
            scheduler,
            events_dispatched: 0,
            observers: Vec::new(),
        })
    }

    /// Add an observer to the simulation
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    fn notify_time_advance(&mut self, old_time: SimTime, new_time: SimTime) {
        for observer in &mut self.observers {
            observer.on_time_advance(old_time, new_time);
        }
    }

    fn notify_event_dispatched(&mut self, time: SimTime, kind: EventKind) {
        for observer in &mut self.observers {
            observer.on_event_dispatched(time, kind);
        }
    }

    /// Run until the handler reports completion, returns the number of events dispatched
    pub fn run(&mut self) -> SimResult<u64> {
        while !self.handler.is_complete() {
            self.step()?;
        }
        Ok(self.events_dispatched)
    }

    /// Dispatch the next event
    pub fn step(&mut self) -> SimResult<()> {
        let old_time = self.scheduler.now();
        let scheduled = self
            .scheduler
            .next_event()
            .ok_or(SimulationError::CalendarExhausted)?;

        if scheduled.time != old_time {
            self.notify_time_advance(old_time, scheduled.time);
        }

        let kind = scheduled.event.kind();
        trace!("t={:.2} dispatch {:?} (#{})", scheduled.time, kind, scheduled.sequence_num);

        self.handler.handle(scheduled.event, &mut self.scheduler)?;
        self.events_dispatched += 1;

        self.notify_event_dispatched(scheduled.time, kind);
        Ok(())
    }

    /// Get current simulation time
    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    pub fn events_dispatched(&self) -> u64 {
        self.events_dispatched
    }

    pub fn pending_events(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}
