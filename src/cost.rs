//! Output-layer cost functions.
//!
//! A [`Cost`] supplies two things: the scalar cost of one prediction, used for
//! reporting, and the output-layer error `delta` that seeds backpropagation.

use ndarray::{Array1, ArrayView1, Zip};

use crate::activations::ActivationFn;

const LOG_EPSILON: f32 = 1e-7;

/// Trait defining the interface for cost functions
pub trait Cost: Send + Sync {
    /// Cost of a single output activation `a` against its target `y`
    fn value(&self, activation: ArrayView1<f32>, target: ArrayView1<f32>) -> f32;

    /// Output-layer error for one example, written into `delta`.
    ///
    /// `pre_activation` is the output layer's z, `activation` its a = f(z) and
    /// `activation_fn` is f, for costs whose delta needs f'(z).
    fn output_delta(
        &self,
        pre_activation: ArrayView1<f32>,
        activation: ArrayView1<f32>,
        target: ArrayView1<f32>,
        activation_fn: &dyn ActivationFn,
        delta: &mut Array1<f32>,
    );

    fn name(&self) -> &'static str;
}

/// Quadratic cost `½‖a − y‖²`
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticCost;

impl Cost for QuadraticCost {
    fn value(&self, activation: ArrayView1<f32>, target: ArrayView1<f32>) -> f32 {
        let diff = &activation - &target;
        0.5 * diff.dot(&diff)
    }

    fn output_delta(
        &self,
        pre_activation: ArrayView1<f32>,
        activation: ArrayView1<f32>,
        target: ArrayView1<f32>,
        activation_fn: &dyn ActivationFn,
        delta: &mut Array1<f32>,
    ) {
        Zip::from(delta)
            .and(&pre_activation)
            .and(&activation)
            .and(&target)
            .for_each(|d, &z, &a, &y| *d = (a - y) * activation_fn.derivative(z));
    }

    fn name(&self) -> &'static str {
        "quadratic"
    }
}

/// Cross-entropy cost for sigmoid outputs.
///
/// Paired with a sigmoid output layer the σ'(z) factor cancels, leaving
/// `delta = a − y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossEntropyCost;

impl Cost for CrossEntropyCost {
    fn value(&self, activation: ArrayView1<f32>, target: ArrayView1<f32>) -> f32 {
        activation
            .iter()
            .zip(target.iter())
            .map(|(&a, &y)| {
                let a = a.clamp(LOG_EPSILON, 1.0 - LOG_EPSILON);
                -y * a.ln() - (1.0 - y) * (1.0 - a).ln()
            })
            .sum()
    }

    fn output_delta(
        &self,
        _pre_activation: ArrayView1<f32>,
        activation: ArrayView1<f32>,
        target: ArrayView1<f32>,
        _activation_fn: &dyn ActivationFn,
        delta: &mut Array1<f32>,
    ) {
        Zip::from(delta)
            .and(&activation)
            .and(&target)
            .for_each(|d, &a, &y| *d = a - y);
    }

    fn name(&self) -> &'static str {
        "cross_entropy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activations::Activation;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_quadratic_value() {
        let a = array![0.9, 0.1, 0.8];
        let y = array![1.0, 0.0, 1.0];
        // (0.01 + 0.01 + 0.04) / 2
        assert_abs_diff_eq!(QuadraticCost.value(a.view(), y.view()), 0.03, epsilon = 1e-6);
    }

    #[test]
    fn test_quadratic_delta_uses_derivative() {
        let z = array![0.0, 0.0];
        let a = array![0.5, 0.5];
        let y = array![1.0, 0.0];
        let mut delta = Array1::zeros(2);
        QuadraticCost.output_delta(z.view(), a.view(), y.view(), &Activation::Sigmoid, &mut delta);
        assert_abs_diff_eq!(delta[0], -0.125, epsilon = 1e-6);
        assert_abs_diff_eq!(delta[1], 0.125, epsilon = 1e-6);
    }

    #[test]
    fn test_cross_entropy_delta_ignores_derivative() {
        let z = array![3.0, -3.0];
        let a = array![0.25, 0.75];
        let y = array![1.0, 0.0];
        let mut delta = Array1::zeros(2);
        CrossEntropyCost.output_delta(z.view(), a.view(), y.view(), &Activation::Sigmoid, &mut delta);
        assert_eq!(delta, array![-0.75_f32, 0.75]);
    }

    #[test]
    fn test_cross_entropy_is_finite_at_saturation() {
        let a = array![1.0, 0.0];
        let y = array![0.0, 1.0];
        let cost = CrossEntropyCost.value(a.view(), y.view());
        assert!(cost.is_finite());
        assert!(cost > 10.0);
    }
}
