use super::errors::{SimResult, SimulationError};
use super::event::{Event, ScheduledEvent};
use super::priority_queue::{GreaterThan, PriorityQueue};
use super::types::SimTime;

fn fires_after(left: &ScheduledEvent, right: &ScheduledEvent) -> bool {
    left.fires_after(right)
}

/// Event calendar: hands out events in non-decreasing time order.
///
/// Events sharing a timestamp are dispatched in the order they were scheduled.
pub struct EventScheduler {
    event_queue: PriorityQueue<ScheduledEvent, GreaterThan<ScheduledEvent>>,
    sequence_counter: u64,
    now: SimTime,
}

impl EventScheduler {
    /// Create a new EventScheduler with the clock at zero
    pub fn new() -> Self {
        Self {
            event_queue: PriorityQueue::new(fires_after as GreaterThan<ScheduledEvent>),
            sequence_counter: 0,
            now: 0.0,
        }
    }

    /// Current simulated time (time of the last dispatched event)
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Schedule an event at an absolute simulated time
    pub fn schedule_event(&mut self, event: Event, time: SimTime) -> SimResult<()> {
        if time < self.now || time.is_nan() {
            return Err(SimulationError::ScheduleInPast { at: time, now: self.now });
        }

        let scheduled_event = ScheduledEvent {
            time,
            sequence_num: self.sequence_counter,
            event,
        };

        self.event_queue.insert(scheduled_event);
        self.sequence_counter += 1;
        Ok(())
    }

    /// Remove the next event and advance the clock to its time
    pub fn next_event(&mut self) -> Option<ScheduledEvent> {
        let scheduled_event = self.event_queue.delete_minimum()?;
        self.now = scheduled_event.time;
        Some(scheduled_event)
    }

    /// Check if there are any events remaining in the queue
    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    /// Time of the next event without removing it
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.event_queue.minimum().map(|event| event.time)
    }

    pub fn pending(&self) -> usize {
        self.event_queue.len()
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}
