use ndarray::{Array1, ArrayView1};

use crate::error::Result;
use crate::network::Network;
use crate::training::{ValidationCallback, ValidationOutcome};

/// Index of the largest component, first one on ties.
pub fn argmax(values: ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Result of running a network over a labelled set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Examples whose argmax output matches the argmax target
    pub correct: usize,
    pub total: usize,
    /// Mean cost per example, without the regularization term
    pub mean_cost: f32,
}

impl Evaluation {
    pub fn accuracy(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f32 / self.total as f32
        }
    }
}

/// Classification metrics
pub struct ClassificationMetrics;

impl ClassificationMetrics {
    /// Count of examples the network classifies correctly, comparing the
    /// argmax of the output against the argmax of the target.
    pub fn correct_count(network: &Network, inputs: &[Array1<f32>], targets: &[Array1<f32>]) -> Result<usize> {
        network.check_examples(inputs, targets)?;
        let mut correct = 0;
        for (x, y) in inputs.iter().zip(targets.iter()) {
            let output = network.feed_forward(x.view())?;
            if argmax(output.view()) == argmax(y.view()) {
                correct += 1;
            }
        }
        Ok(correct)
    }

    /// Accuracy and mean cost in one pass.
    pub fn evaluate(network: &Network, inputs: &[Array1<f32>], targets: &[Array1<f32>]) -> Result<Evaluation> {
        network.check_examples(inputs, targets)?;
        let mut correct = 0;
        let mut cost = 0.0;
        for (x, y) in inputs.iter().zip(targets.iter()) {
            let output = network.feed_forward(x.view())?;
            if argmax(output.view()) == argmax(y.view()) {
                correct += 1;
            }
            cost += network.cost().value(output.view(), y.view());
        }
        let total = inputs.len();
        let mean_cost = if total == 0 { 0.0 } else { cost / total as f32 };
        Ok(Evaluation { correct, total, mean_cost })
    }

    /// Mean cost plus the L2 penalty `½·(λ/n)·Σ‖W‖²`, with `n` the number
    /// of examples evaluated.
    pub fn total_cost(
        network: &Network,
        inputs: &[Array1<f32>],
        targets: &[Array1<f32>],
        lambda: f32,
    ) -> Result<f32> {
        let evaluation = Self::evaluate(network, inputs, targets)?;
        if evaluation.total == 0 {
            return Ok(0.0);
        }
        let penalty = 0.5 * (lambda / evaluation.total as f32) * network.parameters().squared_weight_norm();
        Ok(evaluation.mean_cost + penalty)
    }
}

/// Default validation callback: argmax accuracy over the validation set,
/// reported as [`ValidationOutcome::Metric`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgmaxAccuracy;

impl ValidationCallback for ArgmaxAccuracy {
    fn validate(
        &mut self,
        network: &Network,
        inputs: &[Array1<f32>],
        targets: &[Array1<f32>],
    ) -> ValidationOutcome {
        match ClassificationMetrics::correct_count(network, inputs, targets) {
            Ok(correct) if !inputs.is_empty() => {
                ValidationOutcome::Metric(correct as f32 / inputs.len() as f32)
            }
            _ => ValidationOutcome::Fail,
        }
    }
}
