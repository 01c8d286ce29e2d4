use approx::assert_abs_diff_eq;
use ndarray::{array, Array1};
use crate::activations::Activation;
use crate::cost::{CrossEntropyCost, QuadraticCost};
use crate::debug::gradient_check;
use crate::init::WeightInit;
use crate::network::Network;
use crate::params::ParameterStore;
use crate::propagation::{backprop_example, check_example, forward, infer};
use crate::scratch::WorkerScratch;
use crate::topology::NetworkTopology;

// [2, 2, 1] sigmoid network; weight rows are inputs, columns outputs
fn small_params() -> ParameterStore {
    ParameterStore::from_parts(
        vec![array![[0.1_f32, 0.2], [0.3, 0.4]], array![[0.5_f32], [0.6]]],
        vec![Array1::zeros(2), Array1::zeros(1)],
    )
    .unwrap()
}

fn small_topology() -> NetworkTopology {
    NetworkTopology::uniform(&[2, 2, 1], Activation::Sigmoid)
}

#[test]
fn test_zero_parameters_give_half() {
    let sizes = [3, 4, 2];
    let params = ParameterStore::initialize(&sizes, &mut || 0.0_f32);
    let topology = NetworkTopology::uniform(&sizes, Activation::Sigmoid);
    let mut scratch = WorkerScratch::new(&sizes);

    let output = forward(&params, &topology, &mut scratch, array![0.3_f32, -7.0, 12.0].view());
    assert!(output.iter().all(|&a| a == 0.5));
    assert!(scratch.activations[1].iter().all(|&a| a == 0.5));
}

#[test]
fn test_forward_values() {
    let params = small_params();
    let topology = small_topology();
    let mut scratch = WorkerScratch::new(&[2, 2, 1]);

    forward(&params, &topology, &mut scratch, array![1.0_f32, 2.0].view());

    // z0 = Wᵀx = [0.7, 1.0]
    assert_abs_diff_eq!(scratch.pre_activations[0][0], 0.7, epsilon = 1e-6);
    assert_abs_diff_eq!(scratch.pre_activations[0][1], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(scratch.activations[1][0], 0.668187772, epsilon = 1e-6);
    assert_abs_diff_eq!(scratch.activations[1][1], 0.731058579, epsilon = 1e-6);
}

#[test]
fn test_golden_gradients_quadratic() {
    let params = small_params();
    let topology = small_topology();
    let mut scratch = WorkerScratch::new(&[2, 2, 1]);

    backprop_example(
        &params,
        &topology,
        &QuadraticCost,
        &mut scratch,
        array![1.0_f32, 2.0].view(),
        array![1.0_f32].view(),
    );

    assert_abs_diff_eq!(scratch.deltas[1][0], -0.0682646238, epsilon = 1e-6);
    assert_abs_diff_eq!(scratch.deltas[0][0], -0.0075675729, epsilon = 1e-6);
    assert_abs_diff_eq!(scratch.deltas[0][1], -0.0080529838, epsilon = 1e-6);

    let expected_w0: [[f32; 2]; 2] = [[-0.0075675729, -0.0080529838], [-0.0151351459, -0.0161059676]];
    for i in 0..2 {
        for j in 0..2 {
            assert_abs_diff_eq!(scratch.grad_w[0][[i, j]], expected_w0[i][j], epsilon = 1e-6);
        }
    }
    assert_abs_diff_eq!(scratch.grad_b[0][0], -0.0075675729, epsilon = 1e-6);
    assert_abs_diff_eq!(scratch.grad_b[0][1], -0.0080529838, epsilon = 1e-6);
    assert_abs_diff_eq!(scratch.grad_w[1][[0, 0]], -0.0456135869, epsilon = 1e-6);
    assert_abs_diff_eq!(scratch.grad_w[1][[1, 0]], -0.0499054388, epsilon = 1e-6);
    assert_abs_diff_eq!(scratch.grad_b[1][0], -0.0682646238, epsilon = 1e-6);
    assert_eq!(scratch.examples_seen, 1);
}

#[test]
fn test_gradients_accumulate() {
    let params = small_params();
    let topology = small_topology();
    let mut scratch = WorkerScratch::new(&[2, 2, 1]);
    let x = array![1.0_f32, 2.0];
    let y = array![1.0_f32];

    for _ in 0..2 {
        backprop_example(&params, &topology, &QuadraticCost, &mut scratch, x.view(), y.view());
    }

    assert_abs_diff_eq!(scratch.grad_b[1][0], 2.0 * -0.0682646238, epsilon = 1e-6);
    assert_abs_diff_eq!(scratch.grad_w[0][[1, 1]], 2.0 * -0.0161059676, epsilon = 1e-6);
    assert_eq!(scratch.examples_seen, 2);
}

#[test]
fn test_cross_entropy_output_delta() {
    let params = small_params();
    let topology = small_topology();
    let mut scratch = WorkerScratch::new(&[2, 2, 1]);

    backprop_example(
        &params,
        &topology,
        &CrossEntropyCost,
        &mut scratch,
        array![1.0_f32, 2.0].view(),
        array![1.0_f32].view(),
    );

    let a = scratch.activations[2][0];
    assert_abs_diff_eq!(scratch.deltas[1][0], a - 1.0, epsilon = 1e-7);
}

#[test]
fn test_infer_matches_forward() {
    let params = small_params();
    let topology = small_topology();
    let mut scratch = WorkerScratch::new(&[2, 2, 1]);
    let x = array![-0.5_f32, 1.5];

    let slot_output = forward(&params, &topology, &mut scratch, x.view()).clone();
    let fresh_output = infer(&params, &topology, x.view());
    assert_abs_diff_eq!(slot_output[0], fresh_output[0], epsilon = 1e-7);
}

#[test]
fn test_check_example_dimensions() {
    let topology = small_topology();
    assert!(check_example(&topology, array![1.0_f32, 2.0].view(), array![0.0_f32].view()).is_ok());
    assert!(check_example(&topology, array![1.0_f32].view(), array![0.0_f32].view()).is_err());
    assert!(check_example(&topology, array![1.0_f32, 2.0].view(), array![0.0_f32, 1.0].view()).is_err());
}

#[test]
fn test_backprop_matches_numerical_gradient() {
    let topology = NetworkTopology::new()
        .with_input(3)
        .with_layer(4, Activation::Tanh)
        .with_layer(3, Activation::Sigmoid)
        .with_layer(2, Activation::Sigmoid);
    let x = array![0.2_f32, -0.6, 0.9];
    let y = array![1.0_f32, 0.0];

    let mut source = WeightInit::Normal { mean: 0.0, std: 0.5 }.source(Some(3)).unwrap();
    let quadratic = Network::new(topology.clone(), 1, &mut source, Box::new(QuadraticCost)).unwrap();
    let report = gradient_check(&quadratic, x.view(), y.view(), 1e-2).unwrap();
    assert_eq!(report.checked, 3 * 4 + 4 + 4 * 3 + 3 + 3 * 2 + 2);
    assert!(report.passes(1e-3), "{:?}", report);

    let mut source = WeightInit::Normal { mean: 0.0, std: 0.5 }.source(Some(3)).unwrap();
    let cross_entropy = Network::new(topology, 1, &mut source, Box::new(CrossEntropyCost)).unwrap();
    let report = gradient_check(&cross_entropy, x.view(), y.view(), 1e-2).unwrap();
    assert!(report.passes(1e-3), "{:?}", report);
}
