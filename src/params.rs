//! Shared weights and biases.
//!
//! `weights[k]` has shape `(sizes[k], sizes[k + 1])` so that the pre-activation
//! of layer `k + 1` is `weights[k]ᵀ · a[k] + biases[k]`. Parameters are
//! allocated once; after initialization only the optimizer writes to them.

use ndarray::{Array1, Array2};
use serde::{Serialize, Deserialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use bincode::{serialize, deserialize};

use crate::error::{NetworkError, Result};
use crate::init::RandomSource;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ParameterStore {
    weights: Vec<Array2<f32>>,
    biases: Vec<Array1<f32>>,
}

impl ParameterStore {
    /// Allocate and fill every weight, then every bias, from `source`.
    ///
    /// Weights are drawn per layer, output neuron by output neuron, each
    /// output neuron taking one value per input neuron.
    pub fn initialize(sizes: &[usize], source: &mut dyn RandomSource) -> Self {
        let mut weights = Vec::with_capacity(sizes.len().saturating_sub(1));
        for window in sizes.windows(2) {
            let (fan_in, fan_out) = (window[0], window[1]);
            let mut w = Array2::zeros((fan_in, fan_out));
            for j in 0..fan_out {
                for i in 0..fan_in {
                    w[[i, j]] = source.next_value();
                }
            }
            weights.push(w);
        }

        let biases = sizes
            .iter()
            .skip(1)
            .map(|&size| Array1::from_shape_fn(size, |_| source.next_value()))
            .collect();

        ParameterStore { weights, biases }
    }

    /// Build a store from explicit matrices, checking that consecutive
    /// layers chain together.
    pub fn from_parts(weights: Vec<Array2<f32>>, biases: Vec<Array1<f32>>) -> Result<Self> {
        if weights.is_empty() || weights.len() != biases.len() {
            return Err(NetworkError::dimension_mismatch(
                format!("at least one layer with {} bias vectors", weights.len()),
                format!("{} weight matrices and {} bias vectors", weights.len(), biases.len()),
            ));
        }
        for (k, (w, b)) in weights.iter().zip(biases.iter()).enumerate() {
            if w.ncols() != b.len() {
                return Err(NetworkError::dimension_mismatch(
                    format!("bias {} of length {}", k, w.ncols()),
                    format!("length {}", b.len()),
                ));
            }
            if k > 0 && weights[k - 1].ncols() != w.nrows() {
                return Err(NetworkError::dimension_mismatch(
                    format!("weight {} with {} rows", k, weights[k - 1].ncols()),
                    format!("{} rows", w.nrows()),
                ));
            }
        }
        Ok(ParameterStore { weights, biases })
    }

    /// Layer widths implied by the stored matrices
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes: Vec<usize> = self.weights.iter().map(|w| w.nrows()).collect();
        if let Some(last) = self.weights.last() {
            sizes.push(last.ncols());
        }
        sizes
    }

    pub fn depth(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[Array2<f32>] {
        &self.weights
    }

    pub fn biases(&self) -> &[Array1<f32>] {
        &self.biases
    }

    pub fn weight(&self, k: usize) -> &Array2<f32> {
        &self.weights[k]
    }

    pub fn bias(&self, k: usize) -> &Array1<f32> {
        &self.biases[k]
    }

    pub(crate) fn layer_mut(&mut self, k: usize) -> (&mut Array2<f32>, &mut Array1<f32>) {
        (&mut self.weights[k], &mut self.biases[k])
    }

    /// Sum of squared weights, the L2 penalty's raw term. Biases are not decayed.
    pub fn squared_weight_norm(&self) -> f32 {
        self.weights.iter().map(|w| w.iter().map(|&v| v * v).sum::<f32>()).sum()
    }

    /// Error unless the stored matrices match `sizes`.
    pub fn check_sizes(&self, sizes: &[usize]) -> Result<()> {
        let own = self.sizes();
        if own != sizes {
            return Err(NetworkError::dimension_mismatch(
                format!("layer sizes {:?}", sizes),
                format!("layer sizes {:?}", own),
            ));
        }
        Ok(())
    }

    /// Overwrite every parameter with `other`'s values without reallocating.
    pub fn assign(&mut self, other: &ParameterStore) -> Result<()> {
        other.check_sizes(&self.sizes())?;
        for (w, src) in self.weights.iter_mut().zip(other.weights.iter()) {
            w.assign(src);
        }
        for (b, src) in self.biases.iter_mut().zip(other.biases.iter()) {
            b.assign(src);
        }
        Ok(())
    }

    /// Save the parameters to a file.
    /// Serializes the weights and biases with bincode.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serialize(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(&serialized)?;
        Ok(())
    }

    /// Load parameters previously written by [`save`](Self::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = fs::File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        let store: ParameterStore = deserialize(&buffer)?;
        // Re-validate the chain; a hand-edited or truncated file must not slip through.
        ParameterStore::from_parts(store.weights, store.biases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_initialize_shapes() {
        let store = ParameterStore::initialize(&[4, 3, 2], &mut || 1.0_f32);
        assert_eq!(store.depth(), 2);
        assert_eq!(store.weight(0).shape(), &[4, 3]);
        assert_eq!(store.bias(0).shape(), &[3]);
        assert_eq!(store.weight(1).shape(), &[3, 2]);
        assert_eq!(store.bias(1).shape(), &[2]);
        assert_eq!(store.sizes(), vec![4, 3, 2]);
        assert!(store.weights().iter().all(|w| w.iter().all(|&v| v == 1.0)));
    }

    #[test]
    fn test_initialize_fill_order() {
        let mut next = 0.0_f32;
        let mut counter = || {
            next += 1.0;
            next
        };
        let store = ParameterStore::initialize(&[2, 2], &mut counter);
        // output neuron 0 takes the first two draws, one per input
        assert_eq!(store.weight(0), &array![[1.0_f32, 3.0], [2.0, 4.0]]);
        assert_eq!(store.bias(0), &array![5.0_f32, 6.0]);
    }

    #[test]
    fn test_from_parts_rejects_broken_chain() {
        let result = ParameterStore::from_parts(
            vec![Array2::zeros((2, 3)), Array2::zeros((4, 1))],
            vec![Array1::zeros(3), Array1::zeros(1)],
        );
        assert!(matches!(result, Err(NetworkError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_assign_in_place() {
        let mut store = ParameterStore::initialize(&[2, 2], &mut || 0.0_f32);
        let other = ParameterStore::initialize(&[2, 2], &mut || 2.0_f32);
        let ptr = store.weight(0).as_ptr();
        store.assign(&other).unwrap();
        assert_eq!(store, other);
        assert_eq!(store.weight(0).as_ptr(), ptr);

        let wrong = ParameterStore::initialize(&[3, 2], &mut || 2.0_f32);
        assert!(store.assign(&wrong).is_err());
    }

    #[test]
    fn test_save_load() {
        let store = ParameterStore::initialize(&[3, 2, 1], &mut || 0.25_f32);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.bin");
        store.save(&path).unwrap();
        let loaded = ParameterStore::load(&path).unwrap();
        assert_eq!(store, loaded);
    }
}
