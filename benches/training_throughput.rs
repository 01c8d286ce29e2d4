//! Criterion benchmarks for mini-batch training throughput.
//!
//! Run with: `cargo bench --bench training_throughput`
//!
//! 1. **Single mini-batch** across worker counts
//! 2. **Full epoch** on a synthetic 784-30-10 problem
//! 3. **Inference** on fresh buffers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use feedforward::activations::Activation;
use feedforward::builders::NetworkBuilder;
use feedforward::data::{DataSet, MiniBatch};
use feedforward::network::Network;
use feedforward::optimizer::RegularizedSgd;
use feedforward::training::TrainingConfig;
use ndarray::{Array1, Array2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

/// Synthetic inputs in [0, 1) with one-hot targets.
fn synthetic_dataset(num_samples: usize, input_dim: usize, output_dim: usize) -> (Vec<Array1<f32>>, Vec<Array1<f32>>) {
    let inputs = Array2::random((num_samples, input_dim), Uniform::new(0.0_f32, 1.0));
    let inputs = inputs.axis_iter(Axis(0)).map(|row| row.to_owned()).collect();
    let targets = (0..num_samples)
        .map(|i| Array1::from_shape_fn(output_dim, |j| if j == i % output_dim { 1.0 } else { 0.0 }))
        .collect();
    (inputs, targets)
}

fn bench_network(sizes: &[usize], workers: usize) -> Network {
    let activations = vec![Activation::Sigmoid; sizes.len() - 1];
    NetworkBuilder::new()
        .add_layers(sizes, &activations)
        .and_then(|builder| builder.seed(0).workers(workers).build())
        .expect("Failed to create benchmark network")
}

fn bench_mini_batch(c: &mut Criterion) {
    let sizes = [784, 30, 10];
    let (inputs, targets) = synthetic_dataset(32, 784, 10);
    let batch = MiniBatch::new(&inputs, &targets).expect("batch");
    let sgd = RegularizedSgd::new(0.5, 5.0);

    let mut group = c.benchmark_group("mini_batch_32");
    for workers in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            let mut network = bench_network(&sizes, workers);
            b.iter(|| {
                network
                    .train_mini_batch(black_box(&batch), black_box(&sgd), 50_000)
                    .expect("train");
            });
        });
    }
    group.finish();
}

fn bench_epoch(c: &mut Criterion) {
    let sizes = [784, 30, 10];
    let (inputs, targets) = synthetic_dataset(1_000, 784, 10);
    let config = TrainingConfig::new(1, 10, 0.5).with_lambda(5.0).with_seed(1);

    let mut group = c.benchmark_group("epoch_1000");
    group.sample_size(10);
    for workers in [1, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            let mut network = bench_network(&sizes, workers);
            let mut data = DataSet::new()
                .with_training(inputs.clone(), targets.clone())
                .expect("data");
            b.iter(|| network.train(black_box(&mut data), black_box(&config)).expect("train"));
        });
    }
    group.finish();
}

fn bench_inference(c: &mut Criterion) {
    let network = bench_network(&[784, 30, 10], 1);
    let (inputs, _) = synthetic_dataset(1, 784, 10);

    c.bench_function("feed_forward_784_30_10", |b| {
        b.iter(|| network.feed_forward(black_box(inputs[0].view())).expect("forward"));
    });
}

criterion_group!(benches, bench_mini_batch, bench_epoch, bench_inference);
criterion_main!(benches);
