//! Forward and backward passes over one worker slot.
//!
//! These functions write only into the [`WorkerScratch`] they are given and
//! read the parameters through a shared borrow, so any number of them can run
//! at once on distinct slots. Shapes are assumed to agree with the topology;
//! [`check_example`] is the guard the driver runs before dispatching.
//!
//! # Panics
//!
//! The slot functions panic (through ndarray) when the scratch, parameters or
//! example disagree in shape.

use ndarray::linalg::general_mat_vec_mul;
use ndarray::{Array1, Array2, ArrayView1, Zip};

use crate::cost::Cost;
use crate::error::{NetworkError, Result};
use crate::params::ParameterStore;
use crate::scratch::WorkerScratch;
use crate::topology::NetworkTopology;

/// Check that one (input, target) pair fits the topology.
pub fn check_example(
    topology: &NetworkTopology,
    input: ArrayView1<f32>,
    target: ArrayView1<f32>,
) -> Result<()> {
    if input.len() != topology.input_size() {
        return Err(NetworkError::dimension_mismatch(
            format!("input of length {}", topology.input_size()),
            format!("length {}", input.len()),
        ));
    }
    if target.len() != topology.output_size() {
        return Err(NetworkError::dimension_mismatch(
            format!("target of length {}", topology.output_size()),
            format!("length {}", target.len()),
        ));
    }
    Ok(())
}

/// Run the forward recurrence into `scratch`, returning the output activation.
pub fn forward<'s>(
    params: &ParameterStore,
    topology: &NetworkTopology,
    scratch: &'s mut WorkerScratch,
    input: ArrayView1<f32>,
) -> &'s Array1<f32> {
    scratch.activations[0].assign(&input);

    for k in 0..params.depth() {
        let (lower, upper) = scratch.activations.split_at_mut(k + 1);
        let z = &mut scratch.pre_activations[k];

        z.assign(params.bias(k));
        general_mat_vec_mul(1.0, &params.weight(k).t(), &lower[k], 1.0, z);
        topology.transition_activation(k).apply_into(z.view(), &mut upper[0]);
    }

    scratch.output()
}

/// Fill the output-layer delta from the cost strategy.
pub fn output_error(
    cost: &dyn Cost,
    topology: &NetworkTopology,
    scratch: &mut WorkerScratch,
    target: ArrayView1<f32>,
) {
    let last = scratch.depth() - 1;
    let WorkerScratch { activations, pre_activations, deltas, .. } = scratch;

    cost.output_delta(
        pre_activations[last].view(),
        activations[last + 1].view(),
        target,
        topology.transition_activation(last),
        &mut deltas[last],
    );
}

/// Add the output transition's gradients into the slot accumulators.
pub fn output_gradients(scratch: &mut WorkerScratch) {
    let last = scratch.depth() - 1;
    let WorkerScratch { activations, deltas, grad_w, grad_b, .. } = scratch;

    accumulate(&mut grad_w[last], &mut grad_b[last], &activations[last], &deltas[last]);
}

/// Propagate the output delta back through every hidden transition,
/// accumulating each transition's gradients.
pub fn back_propagate(
    params: &ParameterStore,
    topology: &NetworkTopology,
    scratch: &mut WorkerScratch,
) {
    let WorkerScratch {
        activations,
        pre_activations,
        deltas,
        derivatives,
        grad_w,
        grad_b,
        ..
    } = scratch;

    for k in (0..params.depth() - 1).rev() {
        topology
            .transition_activation(k)
            .derivative_into(pre_activations[k].view(), &mut derivatives[k]);

        let (lower, upper) = deltas.split_at_mut(k + 1);
        let delta = &mut lower[k];
        general_mat_vec_mul(1.0, params.weight(k + 1), &upper[0], 0.0, delta);
        *delta *= &derivatives[k];

        accumulate(&mut grad_w[k], &mut grad_b[k], &activations[k], delta);
    }
}

/// Full per-example pass: forward, output error, output gradients, backward.
pub fn backprop_example(
    params: &ParameterStore,
    topology: &NetworkTopology,
    cost: &dyn Cost,
    scratch: &mut WorkerScratch,
    input: ArrayView1<f32>,
    target: ArrayView1<f32>,
) {
    forward(params, topology, scratch, input);
    output_error(cost, topology, scratch, target);
    output_gradients(scratch);
    back_propagate(params, topology, scratch);
    scratch.examples_seen += 1;
}

/// Forward pass on fresh buffers, leaving every worker slot untouched.
pub fn infer(
    params: &ParameterStore,
    topology: &NetworkTopology,
    input: ArrayView1<f32>,
) -> Array1<f32> {
    let mut activation = input.to_owned();
    for k in 0..params.depth() {
        let mut z = params.bias(k).clone();
        general_mat_vec_mul(1.0, &params.weight(k).t(), &activation, 1.0, &mut z);
        let f = topology.transition_activation(k);
        z.mapv_inplace(|v| f.apply(v));
        activation = z;
    }
    activation
}

// grad_b += delta; grad_w += input ⊗ delta
fn accumulate(
    grad_w: &mut Array2<f32>,
    grad_b: &mut Array1<f32>,
    input: &Array1<f32>,
    delta: &Array1<f32>,
) {
    *grad_b += delta;
    Zip::from(grad_w.rows_mut())
        .and(input)
        .for_each(|mut row, &a| row.scaled_add(a, delta));
}
