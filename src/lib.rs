//! # feedforward - Concurrent mini-batch training for fully connected networks
//!
//! `feedforward` trains dense feedforward networks by mini-batch stochastic
//! gradient descent with L2 weight decay. Gradients are computed by a
//! hand-derived backward pass, spread across a fixed pool of worker slots and
//! merged before every parameter update.
//!
//! ## Key Features
//!
//! - **Per-layer activations**: built-in Sigmoid, Tanh, ReLU and friends, or any closure pair
//! - **Pluggable cost**: cross-entropy (default) or quadratic output error
//! - **Deterministic parallelism**: example `i` of a batch always runs on slot `i % n_workers`
//! - **Persistence**: parameters saved and loaded with bincode, configs read from JSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use feedforward::activations::Activation;
//! use feedforward::builders::NetworkBuilder;
//! use feedforward::data::DataSet;
//! use feedforward::training::TrainingConfig;
//! use ndarray::Array1;
//!
//! # fn main() -> feedforward::error::Result<()> {
//! let mut network = NetworkBuilder::new()
//!     .topology(feedforward::topology!(784, (30, Activation::Sigmoid), (10, Activation::Sigmoid)))
//!     .seed(42)
//!     .workers(4)
//!     .build()?;
//!
//! let inputs: Vec<Array1<f32>> = Vec::new();  // from your loader
//! let targets: Vec<Array1<f32>> = Vec::new();
//! let mut data = DataSet::new().with_training(inputs, targets)?;
//!
//! let config = TrainingConfig::new(30, 10, 0.5).with_lambda(5.0);
//! let history = network.train(&mut data, &config)?;
//! println!("trained {} epochs", history.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions and their derivatives
//! - [`builders`] - Fluent network construction
//! - [`cost`] - Output cost and output-layer error
//! - [`data`] - Training/validation sets, shuffling and mini-batches
//! - [`debug`] - Numerical gradient checking
//! - [`error`] - Error types and result handling
//! - [`init`] - Parameter initialization sources
//! - [`metrics`] - Accuracy and cost evaluation
//! - [`network`] - The training engine and inference
//! - [`optimizer`] - Gradient aggregation and the regularized update
//! - [`params`] - Weights and biases
//! - [`propagation`] - Forward and backward passes
//! - [`scratch`] - Per-worker buffers
//! - [`topology`] - Layer sizes and activations
//! - [`training`] - Epoch loop, configuration and validation hooks

#[macro_use]
pub mod macros;

pub mod activations;
pub mod builders;
pub mod cost;
pub mod data;
pub mod debug;
pub mod error;
pub mod init;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod params;
pub mod propagation;
pub mod scratch;
pub mod topology;
pub mod training;

pub use error::{NetworkError, Result};
pub use network::Network;

#[cfg(test)]
mod tests;
