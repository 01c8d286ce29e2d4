//! Layer sizes and per-layer activation strategies.

use std::fmt;
use std::sync::Arc;

use crate::activations::{Activation, ActivationFn};
use crate::error::{NetworkError, Result};

/// One layer of the network: its width and the activation applied to it.
///
/// The input layer's activation is never evaluated.
#[derive(Clone)]
pub struct LayerSpec {
    pub size: usize,
    activation: Arc<dyn ActivationFn>,
}

impl LayerSpec {
    pub fn new(size: usize, activation: impl ActivationFn + 'static) -> Self {
        LayerSpec {
            size,
            activation: Arc::new(activation),
        }
    }

    pub fn activation(&self) -> &dyn ActivationFn {
        self.activation.as_ref()
    }
}

impl fmt::Debug for LayerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerSpec")
            .field("size", &self.size)
            .field("activation", &self.activation.name())
            .finish()
    }
}

/// Ordered layers of a fully connected network, input first.
#[derive(Clone, Debug, Default)]
pub struct NetworkTopology {
    layers: Vec<LayerSpec>,
}

impl NetworkTopology {
    pub fn new() -> Self {
        NetworkTopology { layers: Vec::new() }
    }

    /// Append a layer. The first call fixes the input dimension.
    pub fn add_layer(&mut self, size: usize, activation: impl ActivationFn + 'static) -> &mut Self {
        self.layers.push(LayerSpec::new(size, activation));
        self
    }

    /// By-value form of [`add_layer`](Self::add_layer) for chaining.
    pub fn with_layer(mut self, size: usize, activation: impl ActivationFn + 'static) -> Self {
        self.add_layer(size, activation);
        self
    }

    /// Append the input layer; its activation is unused.
    pub fn with_input(self, size: usize) -> Self {
        self.with_layer(size, Activation::Linear)
    }

    /// Uniform topology: `sizes[0]` inputs followed by layers that all use `activation`.
    pub fn uniform(sizes: &[usize], activation: Activation) -> Self {
        sizes
            .iter()
            .fold(NetworkTopology::new(), |topology, &size| topology.with_layer(size, activation))
    }

    /// Check that the topology describes at least one weight transition and
    /// that no layer is empty.
    pub fn validate(&self) -> Result<()> {
        if self.layers.len() < 2 {
            return Err(NetworkError::InvalidParameter {
                name: "topology".to_string(),
                reason: format!(
                    "must have at least 2 layers (input and output), got {}",
                    self.layers.len()
                ),
            });
        }
        if let Some(position) = self.layers.iter().position(|layer| layer.size == 0) {
            return Err(NetworkError::InvalidParameter {
                name: "topology".to_string(),
                reason: format!("layer {} has size 0", position),
            });
        }
        Ok(())
    }

    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    /// Layer widths `[d0, d1, ..., dL]`
    pub fn sizes(&self) -> Vec<usize> {
        self.layers.iter().map(|layer| layer.size).collect()
    }

    /// Number of weight transitions L
    pub fn depth(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.size)
    }

    /// Activation producing layer `k + 1` from transition `k`.
    pub fn transition_activation(&self, k: usize) -> &dyn ActivationFn {
        self.layers[k + 1].activation()
    }
}
