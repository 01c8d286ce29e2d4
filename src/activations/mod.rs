//! # Activation Functions Module
//!
//! Elementwise activations applied to a layer's pre-activation, each paired
//! with its derivative for the hand-derived backward pass.
//!
//! ## Available Activations
//!
//! - **Sigmoid**: `1 / (1 + e^(-z))` - The classic choice, outputs between 0 and 1
//! - **Tanh**: Hyperbolic tangent - Outputs between -1 and 1
//! - **ReLU**: `max(0, z)`
//! - **Linear**: Identity function - No transformation
//! - **LeakyReLU** / **ELU**: ReLU variants with a non-zero negative side
//!
//! Anything else can be plugged in through [`FnActivation`] or by implementing
//! [`ActivationFn`] directly.
//!
//! ## Usage Example
//!
//! ```rust
//! use feedforward::activations::{Activation, ActivationFn, FnActivation};
//!
//! let sigmoid = Activation::Sigmoid;
//! assert_eq!(sigmoid.apply(0.0), 0.5);
//!
//! let softsign = FnActivation::new(
//!     "softsign",
//!     |z: f32| z / (1.0 + z.abs()),
//!     |z: f32| 1.0 / (1.0 + z.abs()).powi(2),
//! );
//! assert_eq!(softsign.derivative(0.0), 1.0);
//! ```

pub mod functions;

pub use functions::{Activation, ActivationFn, FnActivation};
