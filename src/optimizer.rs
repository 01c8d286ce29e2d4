use ndarray::{Array1, Array2, Zip};
use serde::{Serialize, Deserialize};

use crate::error::{NetworkError, Result};
use crate::params::ParameterStore;
use crate::scratch::WorkerScratch;

/// Merge every slot's accumulators into slot 0, in slot order, leaving the
/// other slots cleared. Calling it twice is harmless.
///
/// Requires exclusive access to all slots, so it can only run once every
/// worker task of the mini-batch has finished.
pub fn aggregate(slots: &mut [WorkerScratch]) -> Option<&WorkerScratch> {
    let (target, rest) = slots.split_first_mut()?;
    for slot in rest.iter_mut() {
        target.absorb(slot);
        slot.clear_gradients();
    }
    Some(target)
}

/// Scale factors for one parameter update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateStep {
    /// Multiplier applied to the weights before the gradient step, `1 − ηλ/N`
    pub decay: f32,
    /// Multiplier applied to the merged gradient, `η/b`
    pub step: f32,
}

pub trait Optimizer {
    fn update_weights(&self, weights: &mut Array2<f32>, gradients: &Array2<f32>, step: UpdateStep);
    fn update_biases(&self, biases: &mut Array1<f32>, gradients: &Array1<f32>, step: UpdateStep);
}

/// Plain gradient descent with L2 weight decay.
///
/// ```text
/// W ← (1 − ηλ/N)·W − (η/b)·∇W
/// b ← b − (η/b)·∇b
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegularizedSgd {
    pub eta: f32,
    pub lambda: f32,
}

impl RegularizedSgd {
    pub fn new(eta: f32, lambda: f32) -> Self {
        RegularizedSgd { eta, lambda }
    }

    /// Factors for a mini-batch of `batch_size` drawn from `training_size` examples.
    pub fn step(&self, batch_size: usize, training_size: usize) -> Result<UpdateStep> {
        if training_size == 0 {
            return Err(NetworkError::EmptyTrainingSet);
        }
        if batch_size == 0 {
            return Err(NetworkError::InvalidBatchSize { batch_size, training_size });
        }
        Ok(UpdateStep {
            decay: 1.0 - self.eta * self.lambda / training_size as f32,
            step: self.eta / batch_size as f32,
        })
    }

    /// Update every layer of `params` from the merged gradients in `merged`.
    pub fn apply(
        &self,
        params: &mut ParameterStore,
        merged: &WorkerScratch,
        batch_size: usize,
        training_size: usize,
    ) -> Result<()> {
        let step = self.step(batch_size, training_size)?;
        for k in 0..params.depth() {
            let (weights, biases) = params.layer_mut(k);
            self.update_weights(weights, &merged.grad_w[k], step);
            self.update_biases(biases, &merged.grad_b[k], step);
        }
        Ok(())
    }
}

impl Default for RegularizedSgd {
    fn default() -> Self {
        RegularizedSgd { eta: 0.5, lambda: 0.0 }
    }
}

impl Optimizer for RegularizedSgd {
    fn update_weights(&self, weights: &mut Array2<f32>, gradients: &Array2<f32>, step: UpdateStep) {
        Zip::from(weights)
            .and(gradients)
            .par_for_each(|w, &g| *w = step.decay * *w - step.step * g);
    }

    fn update_biases(&self, biases: &mut Array1<f32>, gradients: &Array1<f32>, step: UpdateStep) {
        biases.zip_mut_with(gradients, |b, &g| *b -= step.step * g);
    }
}
