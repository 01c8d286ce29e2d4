use ndarray::{Array1, ArrayView1, Zip};
use serde::{Serialize, Deserialize};
use std::fmt;

/// Elementwise activation strategy used by one layer.
///
/// The backward pass is hand-derived, so every implementation must supply the
/// derivative with respect to the pre-activation alongside the function itself.
pub trait ActivationFn: Send + Sync {
    /// f(z)
    fn apply(&self, z: f32) -> f32;

    /// f'(z)
    fn derivative(&self, z: f32) -> f32;

    /// Name for debugging and log output
    fn name(&self) -> &str {
        "custom"
    }

    /// Write f(z) into `out` elementwise.
    fn apply_into(&self, z: ArrayView1<f32>, out: &mut Array1<f32>) {
        Zip::from(out).and(&z).for_each(|o, &v| *o = self.apply(v));
    }

    /// Write f'(z) into `out` elementwise.
    fn derivative_into(&self, z: ArrayView1<f32>, out: &mut Array1<f32>) {
        Zip::from(out).and(&z).for_each(|o, &v| *o = self.derivative(v));
    }
}

/// An enumeration of the built-in activation functions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Sigmoid,
    Tanh,
    Relu,
    Linear,
    LeakyRelu { alpha: f32 },
    Elu { alpha: f32 },
}

#[inline]
fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

impl ActivationFn for Activation {
    fn apply(&self, z: f32) -> f32 {
        match self {
            Activation::Sigmoid => sigmoid(z),
            Activation::Tanh => z.tanh(),
            Activation::Relu => z.max(0.0),
            Activation::Linear => z,
            Activation::LeakyRelu { alpha } => {
                if z > 0.0 { z } else { alpha * z }
            }
            Activation::Elu { alpha } => {
                if z > 0.0 { z } else { alpha * (z.exp() - 1.0) }
            }
        }
    }

    fn derivative(&self, z: f32) -> f32 {
        match self {
            Activation::Sigmoid => {
                let s = sigmoid(z);
                s * (1.0 - s)
            }
            Activation::Tanh => {
                let t = z.tanh();
                1.0 - t * t
            }
            Activation::Relu => {
                if z > 0.0 { 1.0 } else { 0.0 }
            }
            Activation::Linear => 1.0,
            Activation::LeakyRelu { alpha } => {
                if z > 0.0 { 1.0 } else { *alpha }
            }
            Activation::Elu { alpha } => {
                if z > 0.0 { 1.0 } else { alpha * z.exp() }
            }
        }
    }

    fn name(&self) -> &str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::Relu => "relu",
            Activation::Linear => "linear",
            Activation::LeakyRelu { .. } => "leaky_relu",
            Activation::Elu { .. } => "elu",
        }
    }
}

/// Activation built from a pair of closures: the function and its derivative.
pub struct FnActivation<F, D> {
    name: String,
    function: F,
    derivative: D,
}

impl<F, D> FnActivation<F, D>
where
    F: Fn(f32) -> f32 + Send + Sync,
    D: Fn(f32) -> f32 + Send + Sync,
{
    pub fn new(name: impl Into<String>, function: F, derivative: D) -> Self {
        FnActivation {
            name: name.into(),
            function,
            derivative,
        }
    }
}

impl<F, D> ActivationFn for FnActivation<F, D>
where
    F: Fn(f32) -> f32 + Send + Sync,
    D: Fn(f32) -> f32 + Send + Sync,
{
    fn apply(&self, z: f32) -> f32 {
        (self.function)(z)
    }

    fn derivative(&self, z: f32) -> f32 {
        (self.derivative)(z)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F, D> fmt::Debug for FnActivation<F, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnActivation").field("name", &self.name).finish()
    }
}
