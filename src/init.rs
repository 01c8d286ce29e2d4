use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Serialize, Deserialize};

use crate::error::{NetworkError, Result};

/// Zero-argument generator used to fill weights and biases at initialization.
///
/// Any `FnMut() -> f32` closure is a source, so tests can force deterministic
/// parameters with `|| 1.0_f32`.
pub trait RandomSource {
    fn next_value(&mut self) -> f32;
}

impl<F> RandomSource for F
where
    F: FnMut() -> f32,
{
    fn next_value(&mut self) -> f32 {
        self()
    }
}

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeightInit {
    /// All zeros
    Zeros,

    /// All ones
    Ones,

    /// Every parameter set to the same value
    Constant(f32),

    /// Uniform distribution with custom range
    Uniform { min: f32, max: f32 },

    /// Normal distribution with custom mean and std
    Normal { mean: f32, std: f32 },
}

impl Default for WeightInit {
    fn default() -> Self {
        WeightInit::Normal { mean: 0.0, std: 1.0 }
    }
}

impl WeightInit {
    /// Build a random source for this strategy.
    ///
    /// With `Some(seed)` the sequence is reproducible, otherwise the generator
    /// is seeded from the operating system.
    pub fn source(&self, seed: Option<u64>) -> Result<InitSource> {
        let sampler = match *self {
            WeightInit::Zeros => Sampler::Constant(0.0),
            WeightInit::Ones => Sampler::Constant(1.0),
            WeightInit::Constant(value) => Sampler::Constant(value),
            WeightInit::Uniform { min, max } => {
                if !(min < max) {
                    return Err(NetworkError::invalid_parameter(
                        "weight_init".to_string(),
                        format!("uniform range [{}, {}) is empty", min, max),
                    ));
                }
                Sampler::Uniform(Uniform::new(min, max))
            }
            WeightInit::Normal { mean, std } => {
                let normal = Normal::new(mean, std).map_err(|e| {
                    NetworkError::invalid_parameter("weight_init".to_string(), e.to_string())
                })?;
                Sampler::Normal(normal)
            }
        };

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(InitSource { rng, sampler })
    }
}

#[derive(Debug, Clone)]
enum Sampler {
    Constant(f32),
    Uniform(Uniform<f32>),
    Normal(Normal<f32>),
}

/// Seeded [`RandomSource`] produced by [`WeightInit::source`].
#[derive(Debug, Clone)]
pub struct InitSource {
    rng: StdRng,
    sampler: Sampler,
}

impl RandomSource for InitSource {
    fn next_value(&mut self) -> f32 {
        match &self.sampler {
            Sampler::Constant(value) => *value,
            Sampler::Uniform(dist) => dist.sample(&mut self.rng),
            Sampler::Normal(dist) => dist.sample(&mut self.rng),
        }
    }
}
