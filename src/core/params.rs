use super::errors::{SimResult, SimulationError};
use super::random::EmpiricalCdf;
use log::info;
use std::path::Path;

/// Values read from the flat parameter input
#[derive(Debug, Clone)]
pub struct ParameterFile {
    /// Empirical distribution of service durations, in periods
    pub service_cdf: EmpiricalCdf,
}

impl ParameterFile {
    /// Read the parameter file; a missing file is fatal for the caller
    pub fn load(path: impl AsRef<Path>, cdf_size: usize) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SimulationError::ParameterFile {
            path: path.to_path_buf(),
            source,
        })?;
        let params = Self::parse(&text, cdf_size)?;
        info!("Loaded {} service cdf entries from {}", cdf_size, path.display());
        Ok(params)
    }

    /// Parse whitespace-separated floats; the first `cdf_size` fill the service cdf
    pub fn parse(text: &str, cdf_size: usize) -> SimResult<Self> {
        let mut values = Vec::with_capacity(cdf_size);
        for (position, token) in text.split_whitespace().take(cdf_size).enumerate() {
            let value: f64 = token.parse().map_err(|_| SimulationError::MalformedParameter {
                position,
                token: token.to_string(),
            })?;
            values.push(value);
        }

        if values.len() < cdf_size {
            return Err(SimulationError::MissingParameters {
                expected: cdf_size,
                found: values.len(),
            });
        }

        Ok(Self {
            service_cdf: EmpiricalCdf::new(values)?,
        })
    }
}
