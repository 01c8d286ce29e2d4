use approx::assert_abs_diff_eq;
use ndarray::array;
use crate::error::NetworkError;
use crate::optimizer::{Optimizer, RegularizedSgd, UpdateStep};
use crate::params::ParameterStore;
use crate::scratch::WorkerScratch;

#[test]
fn test_update_weights_closed_form() {
    let sgd = RegularizedSgd::new(0.5, 2.0);
    let mut weights = array![[1.0_f32, 1.0], [1.0, 1.0]];
    let gradients = array![[0.1_f32, 0.2], [0.3, 0.4]];
    let step = UpdateStep { decay: 0.9, step: 0.25 };

    sgd.update_weights(&mut weights, &gradients, step);

    let expected = [[0.875_f32, 0.85], [0.825, 0.8]];
    for i in 0..2 {
        for j in 0..2 {
            assert_abs_diff_eq!(weights[[i, j]], expected[i][j], epsilon = 1e-6);
        }
    }
}

#[test]
fn test_update_biases_skip_decay() {
    let sgd = RegularizedSgd::new(0.5, 2.0);
    let mut biases = array![1.0_f32, 1.0];
    let gradients = array![0.5_f32, -0.5];

    sgd.update_biases(&mut biases, &gradients, UpdateStep { decay: 0.9, step: 0.25 });

    assert_abs_diff_eq!(biases[0], 0.875, epsilon = 1e-6);
    assert_abs_diff_eq!(biases[1], 1.125, epsilon = 1e-6);
}

#[test]
fn test_apply_uses_batch_and_training_size() {
    let sgd = RegularizedSgd::new(0.5, 2.0);
    let mut params = ParameterStore::initialize(&[2, 2], &mut || 1.0_f32);
    let mut merged = WorkerScratch::new(&[2, 2]);
    merged.grad_w[0].assign(&array![[0.1_f32, 0.2], [0.3, 0.4]]);
    merged.grad_b[0].assign(&array![0.5_f32, -0.5]);

    // decay = 1 - 0.5 * 2 / 10, step = 0.5 / 2
    sgd.apply(&mut params, &merged, 2, 10).unwrap();

    assert_abs_diff_eq!(params.weight(0)[[0, 0]], 0.875, epsilon = 1e-6);
    assert_abs_diff_eq!(params.weight(0)[[1, 1]], 0.8, epsilon = 1e-6);
    assert_abs_diff_eq!(params.bias(0)[0], 0.875, epsilon = 1e-6);
    assert_abs_diff_eq!(params.bias(0)[1], 1.125, epsilon = 1e-6);
}

#[test]
fn test_no_regularization_without_lambda() {
    let sgd = RegularizedSgd::new(1.0, 0.0);
    let mut params = ParameterStore::initialize(&[3, 2], &mut || 0.7_f32);
    let merged = WorkerScratch::new(&[3, 2]);

    sgd.apply(&mut params, &merged, 5, 5).unwrap();

    assert!(params.weight(0).iter().all(|&w| w == 0.7));
    assert!(params.bias(0).iter().all(|&b| b == 0.7));
}

#[test]
fn test_apply_rejects_zero_batch() {
    let sgd = RegularizedSgd::default();
    let mut params = ParameterStore::initialize(&[2, 1], &mut || 1.0_f32);
    let before = params.clone();
    let merged = WorkerScratch::new(&[2, 1]);

    let result = sgd.apply(&mut params, &merged, 0, 10);
    assert!(matches!(result, Err(NetworkError::InvalidBatchSize { .. })));
    assert_eq!(params, before);
}
