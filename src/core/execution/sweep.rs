//! Iteration driver: runs every (servers, policy) pair of a configuration,
//! re-estimating hazards between the passes of each pair.

use super::config::{ConcurrencyMode, SimulationConfig};
use super::simulation_engine::SimulationEngine;
use crate::core::errors::{SimResult, SimulationError};
use crate::core::model::{HazardTables, Policy};
use crate::core::policy_engine::{PassSummary, PolicyEngine};
use crate::core::random::{EmpiricalCdf, RandomStream};
use crate::core::report::ReportRow;
use log::{debug, info};
use rayon::prelude::*;

/// Run one pass to the customer target with the given hazard tables and stream
pub fn run_pass(
    config: &SimulationConfig,
    policy: &Policy,
    servers: usize,
    service_cdf: &EmpiricalCdf,
    hazard: &mut HazardTables,
    stream: &mut RandomStream,
) -> SimResult<PassSummary> {
    let engine = PolicyEngine::new(config, policy, servers, service_cdf, hazard, stream)?;
    let mut simulation = SimulationEngine::new(engine)?;
    let events = simulation.run()?;
    let now = simulation.now();
    debug!(
        "pass with {} servers under policy {} ended at t={:.1} after {} events ({} pending)",
        servers,
        policy.number,
        now,
        events,
        simulation.pending_events()
    );
    Ok(simulation.handler().summarize(now))
}

/// Every iteration of one (servers, policy) pair. The stream is reseeded and the
/// hazards zeroed first, so a pair's rows never depend on what ran before it.
pub fn run_pair(
    config: &SimulationConfig,
    service_cdf: &EmpiricalCdf,
    servers: usize,
    policy_number: u32,
    stream: &mut RandomStream,
) -> SimResult<Vec<ReportRow>> {
    let policy = Policy::preset(policy_number, config.max_wait_minutes, config.window)?;
    stream.reseed(config.seed);
    let mut hazard = HazardTables::new(config.message_subsets, config.horizon_periods);
    hazard.reset();

    let mut rows = Vec::with_capacity(config.iterations);
    for iteration in 1..=config.iterations {
        info!("Servers = {}, Policy = {}, Iteration {}", servers, policy_number, iteration);
        hazard.begin_iteration(iteration, &config.availability, config.periods_per_minute());
        let summary = run_pass(config, &policy, servers, service_cdf, &mut hazard, stream)?;
        rows.push(ReportRow::from_summary(iteration, &summary, config));
    }
    Ok(rows)
}

/// Run the whole configured sweep; rows come back in sweep order
/// (servers outer, policy, then iteration) in either concurrency mode.
pub fn run_sweep(config: &SimulationConfig, service_cdf: &EmpiricalCdf) -> SimResult<Vec<ReportRow>> {
    config.validate()?;

    let pairs: Vec<(usize, u32)> = config
        .servers
        .counts()
        .into_iter()
        .flat_map(|servers| config.policies.numbers().into_iter().map(move |policy| (servers, policy)))
        .collect();
    info!(
        "Running {} (servers, policy) pairs x {} iterations in {:?} mode",
        pairs.len(),
        config.iterations,
        config.concurrency_mode
    );

    let per_pair: Vec<Vec<ReportRow>> = match config.concurrency_mode {
        ConcurrencyMode::Sequential => {
            let mut stream = RandomStream::new(config.seed);
            pairs
                .iter()
                .map(|&(servers, policy)| run_pair(config, service_cdf, servers, policy, &mut stream))
                .collect::<SimResult<_>>()?
        }
        ConcurrencyMode::Rayon => {
            let run_all = || {
                pairs
                    .par_iter()
                    .map_init(
                        || RandomStream::new(config.seed),
                        |stream, &(servers, policy)| run_pair(config, service_cdf, servers, policy, stream),
                    )
                    .collect::<SimResult<Vec<_>>>()
            };
            match config.thread_pool_size {
                Some(threads) => rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("sweep-{}", i))
                    .build()
                    .map_err(|e| SimulationError::InvalidConfig(format!("thread pool: {}", e)))?
                    .install(run_all)?,
                None => run_all()?,
            }
        }
    };

    Ok(per_pair.into_iter().flatten().collect())
}
