//! Training and validation examples, shuffling and mini-batch partitioning.

use log::debug;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{NetworkError, Result};

/// Borrowed run of consecutive (input, target) pairs.
#[derive(Debug, Clone, Copy)]
pub struct MiniBatch<'a> {
    inputs: &'a [Array1<f32>],
    targets: &'a [Array1<f32>],
}

impl<'a> MiniBatch<'a> {
    pub fn new(inputs: &'a [Array1<f32>], targets: &'a [Array1<f32>]) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(NetworkError::dimension_mismatch(
                format!("{} targets", inputs.len()),
                format!("{} targets", targets.len()),
            ));
        }
        Ok(MiniBatch { inputs, targets })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn inputs(&self) -> &'a [Array1<f32>] {
        self.inputs
    }

    pub fn targets(&self) -> &'a [Array1<f32>] {
        self.targets
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a Array1<f32>, &'a Array1<f32>)> + 'a {
        let (inputs, targets) = (self.inputs, self.targets);
        inputs.iter().zip(targets.iter())
    }
}

/// Apply one Fisher–Yates permutation to two slices of equal length.
///
/// Element `i` of `a` stays paired with element `i` of `b`.
pub fn lockstep_shuffle<T, U, R: Rng + ?Sized>(a: &mut [T], b: &mut [U], rng: &mut R) -> Result<()> {
    if a.len() != b.len() {
        return Err(NetworkError::dimension_mismatch(
            format!("slices of equal length {}", a.len()),
            format!("length {}", b.len()),
        ));
    }
    shuffle_pairs(a, b, rng);
    Ok(())
}

// Callers guarantee `a.len() == b.len()`.
fn shuffle_pairs<T, U, R: Rng + ?Sized>(a: &mut [T], b: &mut [U], rng: &mut R) {
    for i in (1..a.len()).rev() {
        let j = rng.gen_range(0..=i);
        a.swap(i, j);
        b.swap(i, j);
    }
}

#[derive(Debug, Clone, Default)]
pub struct DataSet {
    training_inputs: Vec<Array1<f32>>,
    training_targets: Vec<Array1<f32>>,
    validation_inputs: Vec<Array1<f32>>,
    validation_targets: Vec<Array1<f32>>,
}

impl DataSet {
    pub fn new() -> Self {
        DataSet::default()
    }

    /// Append training pairs. Pairing is by position.
    pub fn load_training(&mut self, inputs: Vec<Array1<f32>>, targets: Vec<Array1<f32>>) -> Result<()> {
        append_pairs(&mut self.training_inputs, &mut self.training_targets, inputs, targets)
    }

    /// Append validation pairs. Pairing is by position.
    pub fn load_validation(&mut self, inputs: Vec<Array1<f32>>, targets: Vec<Array1<f32>>) -> Result<()> {
        append_pairs(&mut self.validation_inputs, &mut self.validation_targets, inputs, targets)
    }

    /// Builder form of [`load_training`](Self::load_training).
    pub fn with_training(mut self, inputs: Vec<Array1<f32>>, targets: Vec<Array1<f32>>) -> Result<Self> {
        self.load_training(inputs, targets)?;
        Ok(self)
    }

    /// Builder form of [`load_validation`](Self::load_validation).
    pub fn with_validation(mut self, inputs: Vec<Array1<f32>>, targets: Vec<Array1<f32>>) -> Result<Self> {
        self.load_validation(inputs, targets)?;
        Ok(self)
    }

    pub fn training_len(&self) -> usize {
        self.training_inputs.len()
    }

    pub fn validation_len(&self) -> usize {
        self.validation_inputs.len()
    }

    pub fn training_inputs(&self) -> &[Array1<f32>] {
        &self.training_inputs
    }

    pub fn training_targets(&self) -> &[Array1<f32>] {
        &self.training_targets
    }

    pub fn validation_inputs(&self) -> &[Array1<f32>] {
        &self.validation_inputs
    }

    pub fn validation_targets(&self) -> &[Array1<f32>] {
        &self.validation_targets
    }

    /// (input, target) widths of the training set, if any example is loaded
    pub fn training_dims(&self) -> Option<(usize, usize)> {
        dims(&self.training_inputs, &self.training_targets)
    }

    pub fn validation_dims(&self) -> Option<(usize, usize)> {
        dims(&self.validation_inputs, &self.validation_targets)
    }

    /// Shuffle the training set, then the validation set, each in lockstep,
    /// from one generator seeded with `seed`.
    pub fn shuffle(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.shuffle_with(&mut rng);
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        // Both sets only grow through `append_pairs`, which keeps lengths equal.
        shuffle_pairs(&mut self.training_inputs, &mut self.training_targets, rng);
        shuffle_pairs(&mut self.validation_inputs, &mut self.validation_targets, rng);
    }

    /// Split the training set into `floor(N / batch_size)` mini-batches of
    /// exactly `batch_size` consecutive pairs, shuffling first when a seed is
    /// given. The trailing `N mod batch_size` examples belong to no batch.
    pub fn partition(&mut self, batch_size: usize, shuffle: Option<u64>) -> Result<Vec<MiniBatch<'_>>> {
        if batch_size == 0 {
            return Err(NetworkError::InvalidBatchSize {
                batch_size,
                training_size: self.training_len(),
            });
        }
        if let Some(seed) = shuffle {
            self.shuffle(seed);
        }

        let dropped = self.training_len() % batch_size;
        if dropped > 0 {
            debug!(
                "partition: {} trailing examples left out of {} batches of {}",
                dropped,
                self.training_len() / batch_size,
                batch_size
            );
        }

        Ok(self
            .training_inputs
            .chunks_exact(batch_size)
            .zip(self.training_targets.chunks_exact(batch_size))
            .map(|(inputs, targets)| MiniBatch { inputs, targets })
            .collect())
    }
}

fn dims(inputs: &[Array1<f32>], targets: &[Array1<f32>]) -> Option<(usize, usize)> {
    Some((inputs.first()?.len(), targets.first()?.len()))
}

fn append_pairs(
    stored_inputs: &mut Vec<Array1<f32>>,
    stored_targets: &mut Vec<Array1<f32>>,
    inputs: Vec<Array1<f32>>,
    targets: Vec<Array1<f32>>,
) -> Result<()> {
    if inputs.len() != targets.len() {
        return Err(NetworkError::dimension_mismatch(
            format!("{} targets for {} inputs", inputs.len(), inputs.len()),
            format!("{} targets", targets.len()),
        ));
    }

    let (input_dim, target_dim) = match dims(stored_inputs, stored_targets).or_else(|| dims(&inputs, &targets)) {
        Some(d) => d,
        None => return Ok(()),
    };
    if let Some(bad) = inputs.iter().position(|x| x.len() != input_dim) {
        return Err(NetworkError::dimension_mismatch(
            format!("input of length {}", input_dim),
            format!("length {} at position {}", inputs[bad].len(), bad),
        ));
    }
    if let Some(bad) = targets.iter().position(|y| y.len() != target_dim) {
        return Err(NetworkError::dimension_mismatch(
            format!("target of length {}", target_dim),
            format!("length {} at position {}", targets[bad].len(), bad),
        ));
    }

    stored_inputs.extend(inputs);
    stored_targets.extend(targets);
    Ok(())
}
