use super::errors::{SimResult, SimulationError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

/// Seeded pseudo-random stream shared by every draw of a simulation run
#[derive(Debug, Clone)]
pub struct RandomStream {
    rng: StdRng,
}

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Restart the stream from `seed`
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Uniform variate in [0, 1)
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Exponential variate with the given mean
    pub fn exponential(&mut self, mean: f64) -> SimResult<f64> {
        let distribution = Exp::new(1.0 / mean)
            .map_err(|e| SimulationError::Distribution(format!("exponential mean {}: {}", mean, e)))?;
        Ok(distribution.sample(&mut self.rng))
    }
}

/// Empirical distribution over integer durations given as a cumulative table.
///
/// Entry `i` (one-based) is P(duration < i); the implicit entry 0 is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct EmpiricalCdf {
    cumulative: Vec<f64>,
}

impl EmpiricalCdf {
    pub fn new(cumulative: Vec<f64>) -> SimResult<Self> {
        let mut previous = 0.0;
        for (index, &value) in cumulative.iter().enumerate() {
            if !(0.0..=1.0).contains(&value) || value < previous {
                return Err(SimulationError::InvalidCdf { index: index + 1 });
            }
            previous = value;
        }
        Ok(Self { cumulative })
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Duration whose cumulative bracket contains `u`; the table length when `u` lies past the last entry
    pub fn draw(&self, u: f64) -> usize {
        self.cumulative.partition_point(|&value| value <= u)
    }

    /// Draw a duration using the next uniform of `stream`
    pub fn sample(&self, stream: &mut RandomStream) -> usize {
        self.draw(stream.uniform())
    }
}
