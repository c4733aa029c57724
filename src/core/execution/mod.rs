pub mod config;
pub mod simulation_engine;
pub mod sweep;

// Re-export commonly used types
pub use config::{ConcurrencyMode, PolicySweep, ServerSweep, SimulationConfig};
pub use simulation_engine::{EventHandler, SimulationEngine, SimulationObserver};
pub use sweep::{run_pair, run_pass, run_sweep};
