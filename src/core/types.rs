use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Simulated time, measured in decision periods since the start of a pass.
pub type SimTime = f64;

/// Identity of a caller in the fixed population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallerId(pub(crate) u32);

impl CallerId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Zero-based position in the population table
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CallerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "caller#{}", self.0)
    }
}

/// Index of a server in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServerId(pub(crate) u32);

impl ServerId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ServerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "server#{}", self.0)
    }
}

/// The two waiting channels of the call center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueKind {
    /// Callers holding live for a server
    Online,
    /// Callers who accepted a deferred callback
    Offline,
}

impl QueueKind {
    pub const ALL: [QueueKind; 2] = [QueueKind::Online, QueueKind::Offline];

    pub fn index(&self) -> usize {
        match self {
            QueueKind::Online => 0,
            QueueKind::Offline => 1,
        }
    }
}

/// Time-of-day bucket selecting utility coefficients and availability curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Day,
    Evening,
}

impl TimeOfDay {
    pub fn index(&self) -> usize {
        match self {
            TimeOfDay::Day => 0,
            TimeOfDay::Evening => 1,
        }
    }
}

impl Default for TimeOfDay {
    fn default() -> Self {
        TimeOfDay::Day
    }
}

/// A pair of values, one per queue, indexable by [`QueueKind`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerQueue<T> {
    pub online: T,
    pub offline: T,
}

impl<T> PerQueue<T> {
    pub fn new(online: T, offline: T) -> Self {
        Self { online, offline }
    }
}

impl<T> Index<QueueKind> for PerQueue<T> {
    type Output = T;

    fn index(&self, queue: QueueKind) -> &T {
        match queue {
            QueueKind::Online => &self.online,
            QueueKind::Offline => &self.offline,
        }
    }
}

impl<T> IndexMut<QueueKind> for PerQueue<T> {
    fn index_mut(&mut self, queue: QueueKind) -> &mut T {
        match queue {
            QueueKind::Online => &mut self.online,
            QueueKind::Offline => &mut self.offline,
        }
    }
}

/// Divide, yielding `None` when the result is undefined (zero or non-finite denominator)
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() {
        None
    } else {
        Some(numerator / denominator)
    }
}
