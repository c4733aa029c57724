pub mod errors;
pub mod event;
pub mod event_scheduler;
pub mod execution;
pub mod model;
pub mod params;
pub mod policy_engine;
pub mod priority_queue;
pub mod queues;
pub mod random;
pub mod report;
pub mod types;

#[cfg(test)]
mod tests;
