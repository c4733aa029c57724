use super::types::SimTime;
use std::collections::VecDeque;

/// Time-persistent statistic: area under a piecewise-constant value
#[derive(Debug, Clone, Default)]
pub struct TimeWeightedLength {
    area: f64,
    value: f64,
    last_change: SimTime,
}

impl TimeWeightedLength {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the tracked value became `value` at time `now`
    pub fn update(&mut self, now: SimTime, value: f64) {
        self.area += self.value * (now - self.last_change);
        self.value = value;
        self.last_change = now;
    }

    /// Time average over [0, now]; `None` before any time has elapsed
    pub fn mean(&self, now: SimTime) -> Option<f64> {
        if now <= 0.0 {
            return None;
        }
        let area = self.area + self.value * (now - self.last_change);
        Some(area / now)
    }
}

/// Ordered waiting line with front/back/sorted insertion and length statistics
#[derive(Debug, Clone)]
pub struct CallQueue<T> {
    entries: VecDeque<T>,
    length_stat: TimeWeightedLength,
}

impl<T> CallQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            length_stat: TimeWeightedLength::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn front(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn push_front(&mut self, now: SimTime, entry: T) {
        self.entries.push_front(entry);
        self.touch(now);
    }

    pub fn push_back(&mut self, now: SimTime, entry: T) {
        self.entries.push_back(entry);
        self.touch(now);
    }

    /// Insert keeping the queue ascending by `key`; equal keys keep arrival order
    pub fn insert_sorted_by_key<K, F>(&mut self, now: SimTime, entry: T, key: F)
    where
        K: PartialOrd,
        F: Fn(&T) -> K,
    {
        let entry_key = key(&entry);
        let position = self
            .entries
            .iter()
            .position(|existing| key(existing) > entry_key)
            .unwrap_or(self.entries.len());
        self.entries.insert(position, entry);
        self.touch(now);
    }

    pub fn pop_front(&mut self, now: SimTime) -> Option<T> {
        let entry = self.entries.pop_front()?;
        self.touch(now);
        Some(entry)
    }

    /// Time-averaged length over [0, now]
    pub fn mean_length(&self, now: SimTime) -> Option<f64> {
        self.length_stat.mean(now)
    }

    fn touch(&mut self, now: SimTime) {
        self.length_stat.update(now, self.entries.len() as f64);
    }
}

impl<T> Default for CallQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
