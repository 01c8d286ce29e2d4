use crate::activations::{Activation, ActivationFn};
use crate::cost::{Cost, CrossEntropyCost};
use crate::error::{NetworkError, Result};
use crate::init::WeightInit;
use crate::network::Network;
use crate::topology::NetworkTopology;

/// Builder for constructing networks with a fluent API
pub struct NetworkBuilder {
    topology: NetworkTopology,
    init: WeightInit,
    seed: Option<u64>,
    cost: Box<dyn Cost>,
    workers: Option<usize>,
}

impl NetworkBuilder {
    /// Create a new network builder
    pub fn new() -> Self {
        NetworkBuilder {
            topology: NetworkTopology::new(),
            init: WeightInit::default(),
            seed: None,
            cost: Box::new(CrossEntropyCost),
            workers: None,
        }
    }

    /// Set the input width. Must be called before any layer is added.
    pub fn input(mut self, size: usize) -> Self {
        self.topology.add_layer(size, Activation::Linear);
        self
    }

    /// Add a layer fed by the previous one
    pub fn add_layer(mut self, size: usize, activation: impl ActivationFn + 'static) -> Self {
        self.topology.add_layer(size, activation);
        self
    }

    /// Add `layer_sizes[0]` inputs and one layer per remaining size
    pub fn add_layers(mut self, layer_sizes: &[usize], activations: &[Activation]) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(NetworkError::InvalidParameter {
                name: "layer_sizes".to_string(),
                reason: "Must have at least 2 layer sizes".to_string(),
            });
        }

        if layer_sizes.len() - 1 != activations.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: format!("{} activations", layer_sizes.len() - 1),
                actual: format!("{} activations", activations.len()),
            });
        }

        self.topology.add_layer(layer_sizes[0], Activation::Linear);
        for (&size, &activation) in layer_sizes[1..].iter().zip(activations.iter()) {
            self.topology.add_layer(size, activation);
        }

        Ok(self)
    }

    /// Use a topology built elsewhere, e.g. with the `topology!` macro
    pub fn topology(mut self, topology: NetworkTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn weight_init(mut self, init: WeightInit) -> Self {
        self.init = init;
        self
    }

    /// Seed the initialization generator for reproducible parameters
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn cost(mut self, cost: impl Cost + 'static) -> Self {
        self.cost = Box::new(cost);
        self
    }

    /// Number of worker slots; defaults to the number of logical CPUs
    pub fn workers(mut self, n_cores: usize) -> Self {
        self.workers = Some(n_cores);
        self
    }

    /// Build the network
    pub fn build(self) -> Result<Network> {
        let mut source = self.init.source(self.seed)?;
        let workers = self.workers.unwrap_or_else(num_cpus::get);
        Network::new(self.topology, workers, &mut source, self.cost)
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
