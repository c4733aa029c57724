// Shared fixtures for the engine-level suites
use crate::core::execution::config::{PolicySweep, ServerSweep, SimulationConfig};
use crate::core::model::{ChoiceModel, ClassUtility, LatentClass};
use crate::core::random::EmpiricalCdf;

/// Two classes that call every few hours, so short passes see steady traffic
pub fn busy_model() -> ChoiceModel {
    let utility = ClassUtility {
        reward: 3.0,
        online_cost: 0.02,
        offline_cost: 0.005,
        offline_preference: -0.5,
    };
    ChoiceModel::new(vec![
        LatentClass {
            prior_share: 0.5,
            daily_rate: 4.0,
            day: utility,
            evening: utility,
        },
        LatentClass {
            prior_share: 0.5,
            daily_rate: 8.0,
            day: utility,
            evening: utility,
        },
    ])
}

pub fn small_config(servers: usize, policy: u32) -> SimulationConfig {
    SimulationConfig::new()
        .with_customers(400, 50)
        .with_iterations(2)
        .with_servers(ServerSweep::single(servers))
        .with_policies(PolicySweep::single(policy))
        .with_population(300)
        .with_tables(120, 75, 180)
        .with_service_cdf_size(30)
        .with_choice_model(busy_model())
}

/// Service durations spread evenly over 0..30 periods
pub fn service_cdf() -> EmpiricalCdf {
    let values = (1..=30).map(|i| i as f64 / 30.0).collect();
    EmpiricalCdf::new(values).unwrap()
}
