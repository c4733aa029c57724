use super::types::{CallerId, ServerId, SimTime};

/// Payload of an arrival: which caller is starting a new call string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrivalPayload {
    pub caller: CallerId,
}

/// Payload of a service completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeparturePayload {
    /// Server being freed
    pub server: ServerId,
    /// Caller whose service just finished
    pub caller: CallerId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Arrival(ArrivalPayload),
    Departure(DeparturePayload),
    /// Periodic pass over the online queue deciding who abandons
    AbandonmentSweep,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Arrival(_) => EventKind::Arrival,
            Event::Departure(_) => EventKind::Departure,
            Event::AbandonmentSweep => EventKind::AbandonmentSweep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Arrival,
    Departure,
    AbandonmentSweep,
}

/// An event together with its firing time and scheduling order
#[derive(Debug, Clone, Copy)]
pub struct ScheduledEvent {
    pub time: SimTime,
    pub sequence_num: u64,
    pub event: Event,
}

impl ScheduledEvent {
    /// Calendar ordering: earlier time first, then earlier scheduling
    pub fn fires_after(&self, other: &Self) -> bool {
        match self.time.total_cmp(&other.time) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => self.sequence_num > other.sequence_num,
        }
    }
}
