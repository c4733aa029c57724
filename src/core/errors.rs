use super::types::SimTime;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced while configuring, loading, or running a simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not open parameter file '{}': {source}", path.display())]
    ParameterFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed parameter value '{token}' at position {position}")]
    MalformedParameter { position: usize, token: String },

    #[error("parameter input holds {found} values but {expected} are required")]
    MissingParameters { expected: usize, found: usize },

    #[error("empirical cdf entry {index} is outside [0, 1] or decreasing")]
    InvalidCdf { index: usize },

    #[error("event scheduled at {at} precedes the clock at {now}")]
    ScheduleInPast { at: SimTime, now: SimTime },

    #[error("invalid distribution parameter: {0}")]
    Distribution(String),

    #[error("event calendar ran dry before the customer target was reached")]
    CalendarExhausted,

    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimulationError>;
