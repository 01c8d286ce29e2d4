//! The epoch loop: hyper-parameters, validation hooks and per-epoch history.

use log::{debug, info};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::data::DataSet;
use crate::error::{NetworkError, Result};
use crate::metrics::ArgmaxAccuracy;
use crate::network::Network;
use crate::optimizer::RegularizedSgd;

fn default_shuffle() -> bool {
    true
}

/// Hyper-parameters for one training run.
///
/// ```
/// use feedforward::training::TrainingConfig;
///
/// let config = TrainingConfig::from_json_str(
///     r#"{ "epochs": 30, "mini_batch_size": 10, "eta": 0.5, "lambda": 5.0 }"#,
/// ).unwrap();
/// assert!(config.shuffle);
/// assert!(!config.validate);
/// assert_eq!(config.n_cores, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub mini_batch_size: usize,
    /// Learning rate η
    pub eta: f32,
    /// L2 regularization strength λ
    #[serde(default)]
    pub lambda: f32,
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
    /// Run the validation callback after every epoch
    #[serde(default)]
    pub validate: bool,
    /// Expected worker count; must equal the network's when given
    #[serde(default)]
    pub n_cores: Option<usize>,
    /// Seed for the per-epoch shuffle
    #[serde(default)]
    pub seed: Option<u64>,
}

impl TrainingConfig {
    pub fn new(epochs: usize, mini_batch_size: usize, eta: f32) -> Self {
        TrainingConfig {
            epochs,
            mini_batch_size,
            eta,
            lambda: 0.0,
            shuffle: true,
            validate: false,
            n_cores: None,
            seed: None,
        }
    }

    pub fn with_lambda(mut self, lambda: f32) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_n_cores(mut self, n_cores: usize) -> Self {
        self.n_cores = Some(n_cores);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn sgd(&self) -> RegularizedSgd {
        RegularizedSgd::new(self.eta, self.lambda)
    }

    /// Reject non-finite or negative rates.
    pub fn validate_values(&self) -> Result<()> {
        if !self.eta.is_finite() || self.eta <= 0.0 {
            return Err(NetworkError::invalid_parameter(
                "eta".to_string(),
                format!("learning rate must be positive and finite, got {}", self.eta),
            ));
        }
        if !self.lambda.is_finite() || self.lambda < 0.0 {
            return Err(NetworkError::invalid_parameter(
                "lambda".to_string(),
                format!("regularization must be non-negative and finite, got {}", self.lambda),
            ));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Where a [`Trainer`] currently is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingPhase {
    Idle,
    Partitioning,
    Dispatching,
    Aggregating,
    Updating,
    Validating,
    Done,
    Aborted,
}

/// What a validation callback reports for one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    Pass,
    Fail,
    Metric(f32),
}

impl From<bool> for ValidationOutcome {
    fn from(passed: bool) -> Self {
        if passed {
            ValidationOutcome::Pass
        } else {
            ValidationOutcome::Fail
        }
    }
}

impl From<f32> for ValidationOutcome {
    fn from(metric: f32) -> Self {
        ValidationOutcome::Metric(metric)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationOutcome::Pass => write!(f, "pass"),
            ValidationOutcome::Fail => write!(f, "fail"),
            ValidationOutcome::Metric(value) => write!(f, "{:.4}", value),
        }
    }
}

/// Hook run after every epoch when validation is enabled.
///
/// Closures of the form `|network, inputs, targets| -> bool` (or `f32`, or
/// [`ValidationOutcome`]) implement it directly.
pub trait ValidationCallback {
    fn validate(
        &mut self,
        network: &Network,
        inputs: &[Array1<f32>],
        targets: &[Array1<f32>],
    ) -> ValidationOutcome;
}

impl<F, O> ValidationCallback for F
where
    F: FnMut(&Network, &[Array1<f32>], &[Array1<f32>]) -> O,
    O: Into<ValidationOutcome>,
{
    fn validate(
        &mut self,
        network: &Network,
        inputs: &[Array1<f32>],
        targets: &[Array1<f32>],
    ) -> ValidationOutcome {
        self(network, inputs, targets).into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    /// Zero-based epoch index
    pub epoch: usize,
    pub batches: usize,
    /// Examples trained on; the partition remainder is not counted
    pub examples: usize,
    pub validation: Option<ValidationOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochReport>,
}

impl TrainingHistory {
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn last(&self) -> Option<&EpochReport> {
        self.epochs.last()
    }

    /// Metric values reported by the validation callback, in epoch order
    pub fn validation_metrics(&self) -> Vec<f32> {
        self.epochs
            .iter()
            .filter_map(|report| match report.validation {
                Some(ValidationOutcome::Metric(value)) => Some(value),
                _ => None,
            })
            .collect()
    }
}

/// Drives a [`Network`] through whole epochs.
pub struct Trainer {
    config: TrainingConfig,
    phase: TrainingPhase,
    rng: StdRng,
    callback: Box<dyn ValidationCallback>,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Trainer {
            config,
            phase: TrainingPhase::Idle,
            rng,
            callback: Box::new(ArgmaxAccuracy),
        }
    }

    /// Replace the default argmax-accuracy validation.
    pub fn with_validation<V: ValidationCallback + 'static>(mut self, callback: V) -> Self {
        self.callback = Box::new(callback);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn phase(&self) -> TrainingPhase {
        self.phase
    }

    /// Train `network` on `data` for the configured number of epochs.
    ///
    /// Every precondition is checked before the first update; a failure
    /// leaves the parameters untouched and the trainer `Aborted`.
    pub fn run(&mut self, network: &mut Network, data: &mut DataSet) -> Result<TrainingHistory> {
        if let Err(err) = self.check_preconditions(network, data) {
            self.phase = TrainingPhase::Aborted;
            return Err(err);
        }

        match self.train_epochs(network, data) {
            Ok(history) => {
                self.phase = TrainingPhase::Done;
                Ok(history)
            }
            Err(err) => {
                self.phase = TrainingPhase::Aborted;
                Err(err)
            }
        }
    }

    fn check_preconditions(&self, network: &Network, data: &DataSet) -> Result<()> {
        let config = &self.config;
        let training_size = data.training_len();

        if training_size == 0 {
            return Err(NetworkError::EmptyTrainingSet);
        }
        if config.validate && data.validation_len() == 0 {
            return Err(NetworkError::EmptyValidationSet);
        }
        if config.mini_batch_size == 0 || config.mini_batch_size > training_size {
            return Err(NetworkError::InvalidBatchSize {
                batch_size: config.mini_batch_size,
                training_size,
            });
        }
        if let Some(n_cores) = config.n_cores {
            if n_cores != network.n_workers() {
                return Err(NetworkError::invalid_worker_count(
                    n_cores,
                    format!("network was built with {} worker slots", network.n_workers()),
                ));
            }
        }
        config.validate_values()?;
        network.check_examples(data.training_inputs(), data.training_targets())?;
        if config.validate {
            network.check_examples(data.validation_inputs(), data.validation_targets())?;
        }
        Ok(())
    }

    fn train_epochs(&mut self, network: &mut Network, data: &mut DataSet) -> Result<TrainingHistory> {
        let sgd = self.config.sgd();
        let training_size = data.training_len();
        let batch_size = self.config.mini_batch_size;
        let mut history = TrainingHistory::default();

        info!(
            "training: {} epochs, {} examples, mini-batch {}, eta {}, lambda {}, {} workers",
            self.config.epochs,
            training_size,
            batch_size,
            self.config.eta,
            self.config.lambda,
            network.n_workers()
        );

        for epoch in 0..self.config.epochs {
            self.phase = TrainingPhase::Partitioning;
            let seed = if self.config.shuffle { Some(self.rng.gen::<u64>()) } else { None };

            let (batches, examples) = {
                let batches = data.partition(batch_size, seed)?;
                debug!("epoch {}: {} mini-batches", epoch, batches.len());

                for batch in batches.iter() {
                    network.begin_mini_batch();
                    self.phase = TrainingPhase::Dispatching;
                    network.dispatch(batch)?;
                    self.phase = TrainingPhase::Aggregating;
                    network.aggregate()?;
                    self.phase = TrainingPhase::Updating;
                    network.end_mini_batch(&sgd, batch.len(), training_size)?;
                }
                (batches.len(), batches.len() * batch_size)
            };

            let validation = if self.config.validate {
                self.phase = TrainingPhase::Validating;
                let outcome = self.callback.validate(
                    network,
                    data.validation_inputs(),
                    data.validation_targets(),
                );
                info!("epoch {} complete, validation: {}", epoch, outcome);
                Some(outcome)
            } else {
                info!("epoch {} complete", epoch);
                None
            };

            history.epochs.push(EpochReport { epoch, batches, examples, validation });
        }

        Ok(history)
    }
}

impl fmt::Debug for Trainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trainer")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .finish()
    }
}
