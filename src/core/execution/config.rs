//! Configuration for call-center simulation runs
//!
//! This module provides the knobs of a simulation sweep: run length and warm-up,
//! the (servers, policy) grid, model constants and caller behavior, plus
//! concurrency settings for the sweep driver.

use crate::core::errors::{SimResult, SimulationError};
use crate::core::model::{AvailabilityCurve, ChoiceModel, WindowSpec, POLICY_COUNT};
use crate::core::types::TimeOfDay;
use serde::{Deserialize, Serialize};

const SECONDS_PER_MINUTE: u32 = 60;

/// Enumeration of supported concurrency modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcurrencyMode {
    /// Sequential execution mode - every (servers, policy) run executes in order on one thread
    Sequential,
    /// Parallel execution mode using Rayon - independent (servers, policy) runs execute concurrently
    Rayon,
}

impl Default for ConcurrencyMode {
    fn default() -> Self {
        ConcurrencyMode::Sequential
    }
}

/// Server counts to simulate: `lowest, lowest + step, ...` up to `highest`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSweep {
    pub lowest: usize,
    pub highest: usize,
    pub step: usize,
}

impl ServerSweep {
    pub fn single(servers: usize) -> Self {
        Self {
            lowest: servers,
            highest: servers,
            step: 1,
        }
    }

    pub fn counts(&self) -> Vec<usize> {
        (self.lowest..=self.highest).step_by(self.step.max(1)).collect()
    }
}

impl Default for ServerSweep {
    fn default() -> Self {
        Self {
            lowest: 50,
            highest: 50,
            step: 4,
        }
    }
}

/// Inclusive range of built-in policy numbers to simulate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySweep {
    pub lowest: u32,
    pub highest: u32,
}

impl PolicySweep {
    pub fn single(policy: u32) -> Self {
        Self {
            lowest: policy,
            highest: policy,
        }
    }

    pub fn numbers(&self) -> Vec<u32> {
        (self.lowest..=self.highest).collect()
    }
}

impl Default for PolicySweep {
    fn default() -> Self {
        Self { lowest: 1, highest: 1 }
    }
}

/// Configuration for a simulation sweep
///
/// Times are in decision periods of `period_length_secs` seconds unless a field
/// says otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Terminal outcomes per pass
    pub customer_target: u64,
    /// Outcomes excluded from statistics as warm-up
    pub transient: u64,
    /// Hazard-estimation passes per (servers, policy) pair
    pub iterations: usize,
    pub servers: ServerSweep,
    pub policies: PolicySweep,
    pub window: WindowSpec,
    pub period_length_secs: u32,
    /// Mean service time in minutes, used by the queue-length wait predictor
    pub avg_service_minutes: f64,
    /// Longest wait (periods) the hazard tables track
    pub horizon_periods: usize,
    pub max_wait_minutes: usize,
    pub message_subsets: usize,
    /// Entries of the service-time cdf read from the parameter input
    pub service_cdf_size: usize,
    /// Number of distinct caller identities
    pub population: usize,
    pub seed: u64,
    pub time_of_day: TimeOfDay,
    /// Time of the first abandonment sweep
    pub sweep_offset: f64,
    pub choice_model: ChoiceModel,
    pub availability: AvailabilityCurve,
    /// The concurrency mode to use for the sweep
    pub concurrency_mode: ConcurrencyMode,
    /// The size of the thread pool for parallel execution
    /// Only relevant when concurrency_mode is Rayon
    pub thread_pool_size: Option<usize>,
}

impl SimulationConfig {
    /// Create a new simulation configuration with default values
    pub fn new() -> Self {
        Self {
            customer_target: 120_000,
            transient: 20_000,
            iterations: 2,
            servers: ServerSweep::default(),
            policies: PolicySweep::default(),
            window: WindowSpec::default(),
            period_length_secs: 10,
            avg_service_minutes: 6.039893468,
            horizon_periods: 450,
            max_wait_minutes: 75,
            message_subsets: 180,
            service_cdf_size: 598,
            population: 10_000_000,
            seed: 1_973_272_912,
            time_of_day: TimeOfDay::Day,
            sweep_offset: 0.01,
            choice_model: ChoiceModel::default(),
            availability: AvailabilityCurve::default(),
            concurrency_mode: ConcurrencyMode::default(),
            thread_pool_size: None,
        }
    }

    pub fn with_customers(mut self, customer_target: u64, transient: u64) -> Self {
        self.customer_target = customer_target;
        self.transient = transient;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_servers(mut self, servers: ServerSweep) -> Self {
        self.servers = servers;
        self
    }

    pub fn with_policies(mut self, policies: PolicySweep) -> Self {
        self.policies = policies;
        self
    }

    pub fn with_window(mut self, window: WindowSpec) -> Self {
        self.window = window;
        self
    }

    pub fn with_population(mut self, population: usize) -> Self {
        self.population = population;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_time_of_day(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = time_of_day;
        self
    }

    pub fn with_choice_model(mut self, choice_model: ChoiceModel) -> Self {
        self.choice_model = choice_model;
        self
    }

    pub fn with_availability(mut self, availability: AvailabilityCurve) -> Self {
        self.availability = availability;
        self
    }

    /// Set the hazard horizon, message range, and predicted-wait table size together
    pub fn with_tables(mut self, horizon_periods: usize, max_wait_minutes: usize, message_subsets: usize) -> Self {
        self.horizon_periods = horizon_periods;
        self.max_wait_minutes = max_wait_minutes;
        self.message_subsets = message_subsets;
        self
    }

    pub fn with_service_cdf_size(mut self, size: usize) -> Self {
        self.service_cdf_size = size;
        self
    }

    /// Set the concurrency mode for the sweep
    ///
    /// # Arguments
    /// * `mode` - The concurrency mode to use
    ///
    /// # Returns
    /// A new configuration with the specified concurrency mode
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    pub fn periods_per_minute(&self) -> usize {
        (SECONDS_PER_MINUTE / self.period_length_secs.max(1)) as usize
    }

    /// Check the configuration before any run starts
    pub fn validate(&self) -> SimResult<()> {
        let invalid = |message: String| Err(SimulationError::InvalidConfig(message));

        if self.customer_target == 0 {
            return invalid("customer target must be positive".to_string());
        }
        if self.transient >= self.customer_target {
            return invalid(format!(
                "transient {} must be below the customer target {}",
                self.transient, self.customer_target
            ));
        }
        if self.iterations == 0 {
            return invalid("at least one iteration is required".to_string());
        }
        if self.servers.lowest == 0 || self.servers.lowest > self.servers.highest || self.servers.step == 0 {
            return invalid(format!("server sweep {:?} is empty or inverted", self.servers));
        }
        if self.policies.lowest == 0
            || self.policies.highest > POLICY_COUNT
            || self.policies.lowest > self.policies.highest
        {
            return invalid(format!(
                "policy sweep {}..={} must lie within 1..={}",
                self.policies.lowest, self.policies.highest, POLICY_COUNT
            ));
        }
        if self.window.lower_minutes > self.window.upper_minutes {
            return invalid(format!(
                "window lower bound {} exceeds upper bound {}",
                self.window.lower_minutes, self.window.upper_minutes
            ));
        }
        if self.period_length_secs == 0 || SECONDS_PER_MINUTE % self.period_length_secs != 0 {
            return invalid(format!(
                "period length {}s must divide a minute",
                self.period_length_secs
            ));
        }
        if self.horizon_periods == 0 {
            return invalid("horizon must be at least one period".to_string());
        }
        let largest_message = self.max_wait_minutes.max(self.window.midpoint_minutes as usize);
        if largest_message > self.message_subsets {
            return invalid(format!(
                "message {} exceeds the {} message subsets",
                largest_message, self.message_subsets
            ));
        }
        if self.choice_model.classes.is_empty() {
            return invalid("choice model needs at least one latent class".to_string());
        }
        let share: f64 = self.choice_model.classes.iter().map(|c| c.prior_share).sum();
        if (share - 1.0).abs() > 1e-6 {
            return invalid(format!("latent class shares sum to {}, not 1", share));
        }
        if self.choice_model.classes.iter().any(|c| c.daily_rate <= 0.0 || c.prior_share < 0.0) {
            return invalid("latent class rates must be positive and shares non-negative".to_string());
        }
        if self.population < self.choice_model.class_count() {
            return invalid(format!(
                "population {} is smaller than the {} latent classes",
                self.population,
                self.choice_model.class_count()
            ));
        }
        if self.availability.minutes() < self.max_wait_minutes {
            return invalid(format!(
                "availability curve covers {} minutes, {} required",
                self.availability.minutes(),
                self.max_wait_minutes
            ));
        }
        if self.sweep_offset < 0.0 || !self.sweep_offset.is_finite() {
            return invalid(format!("sweep offset {} must be a non-negative time", self.sweep_offset));
        }
        if self.thread_pool_size == Some(0) {
            return invalid("thread pool size must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}
