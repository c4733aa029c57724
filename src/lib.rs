pub mod core;

// Re-export commonly used types
pub use crate::core::errors::{SimResult, SimulationError};
pub use crate::core::execution::{run_sweep, ConcurrencyMode, PolicySweep, ServerSweep, SimulationConfig};
pub use crate::core::params::ParameterFile;
pub use crate::core::priority_queue::PriorityQueue;
pub use crate::core::report::{ReportRow, ReportWriter};
pub use crate::core::types::{CallerId, QueueKind, ServerId, SimTime, TimeOfDay};
