use ndarray::ArrayView1;

use crate::error::{NetworkError, Result};
use crate::network::Network;
use crate::params::ParameterStore;
use crate::propagation::{backprop_example, check_example, infer};
use crate::scratch::WorkerScratch;

/// Largest disagreement between backpropagated and central-difference gradients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientCheck {
    pub max_abs_error: f32,
    pub max_relative_error: f32,
    /// Number of parameters compared
    pub checked: usize,
}

impl GradientCheck {
    pub fn passes(&self, tolerance: f32) -> bool {
        self.max_abs_error <= tolerance
    }
}

/// Compare the backpropagated gradient of one example's cost against
/// `(C(θ + ε) − C(θ − ε)) / 2ε` for every weight and bias.
///
/// Uses its own scratch buffers; the network is not modified.
pub fn gradient_check(
    network: &Network,
    input: ArrayView1<f32>,
    target: ArrayView1<f32>,
    epsilon: f32,
) -> Result<GradientCheck> {
    if !(epsilon > 0.0) {
        return Err(NetworkError::invalid_parameter(
            "epsilon".to_string(),
            format!("must be positive, got {}", epsilon),
        ));
    }
    let topology = network.topology();
    let cost = network.cost();
    check_example(topology, input, target)?;

    let mut scratch = WorkerScratch::new(&topology.sizes());
    backprop_example(network.parameters(), topology, cost, &mut scratch, input, target);

    let mut perturbed: ParameterStore = network.parameters().clone();
    let cost_at = |params: &ParameterStore| cost.value(infer(params, topology, input).view(), target);

    let mut report = GradientCheck { max_abs_error: 0.0, max_relative_error: 0.0, checked: 0 };
    let mut record = |analytic: f32, numerical: f32| {
        let abs_error = (analytic - numerical).abs();
        let scale = analytic.abs().max(numerical.abs()).max(1e-8);
        report.max_abs_error = report.max_abs_error.max(abs_error);
        report.max_relative_error = report.max_relative_error.max(abs_error / scale);
        report.checked += 1;
    };

    for k in 0..perturbed.depth() {
        let (rows, cols) = perturbed.weight(k).dim();
        for i in 0..rows {
            for j in 0..cols {
                let original = perturbed.weight(k)[[i, j]];
                perturbed.layer_mut(k).0[[i, j]] = original + epsilon;
                let plus = cost_at(&perturbed);
                perturbed.layer_mut(k).0[[i, j]] = original - epsilon;
                let minus = cost_at(&perturbed);
                perturbed.layer_mut(k).0[[i, j]] = original;

                record(scratch.grad_w[k][[i, j]], (plus - minus) / (2.0 * epsilon));
            }
        }

        for j in 0..perturbed.bias(k).len() {
            let original = perturbed.bias(k)[j];
            perturbed.layer_mut(k).1[j] = original + epsilon;
            let plus = cost_at(&perturbed);
            perturbed.layer_mut(k).1[j] = original - epsilon;
            let minus = cost_at(&perturbed);
            perturbed.layer_mut(k).1[j] = original;

            record(scratch.grad_b[k][j], (plus - minus) / (2.0 * epsilon));
        }
    }

    Ok(report)
}
