use log::{debug, trace, warn};
use ndarray::{Array1, ArrayView1};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::path::Path;

use crate::cost::Cost;
use crate::data::{DataSet, MiniBatch};
use crate::error::{NetworkError, Result};
use crate::init::RandomSource;
use crate::optimizer::{self, RegularizedSgd};
use crate::params::ParameterStore;
use crate::propagation::{backprop_example, check_example, infer};
use crate::scratch::WorkerScratch;
use crate::topology::NetworkTopology;
use crate::training::{Trainer, TrainingConfig, TrainingHistory};

/// A fully connected network together with the machinery to train it.
///
/// The network owns its parameters, one [`WorkerScratch`] per worker slot and
/// a rayon pool with one thread per slot. Example `idx` of a mini-batch is
/// always handled by slot `idx % n_workers`, and each slot works through its
/// examples in index order, so the merged gradient does not depend on thread
/// scheduling.
pub struct Network {
    topology: NetworkTopology,
    params: ParameterStore,
    slots: Vec<WorkerScratch>,
    cost: Box<dyn Cost>,
    pool: ThreadPool,
}

impl Network {
    /// Create a network with `n_cores` worker slots, drawing every weight and
    /// bias from `source`.
    ///
    /// # Examples
    ///
    /// ```
    /// use feedforward::activations::Activation;
    /// use feedforward::cost::CrossEntropyCost;
    /// use feedforward::network::Network;
    /// use feedforward::topology::NetworkTopology;
    ///
    /// let topology = NetworkTopology::uniform(&[4, 3, 2], Activation::Sigmoid);
    /// let network = Network::new(topology, 2, &mut || 0.0_f32, Box::new(CrossEntropyCost)).unwrap();
    /// let output = network.feed_forward(ndarray::arr1(&[1.0_f32, 0.0, 0.0, 0.0]).view()).unwrap();
    /// assert_eq!(output, ndarray::arr1(&[0.5_f32, 0.5]));
    /// ```
    pub fn new(
        topology: NetworkTopology,
        n_cores: usize,
        source: &mut dyn RandomSource,
        cost: Box<dyn Cost>,
    ) -> Result<Self> {
        topology.validate()?;
        if n_cores == 0 {
            return Err(NetworkError::invalid_worker_count(
                n_cores,
                "at least one worker slot is required",
            ));
        }

        let sizes = topology.sizes();
        let params = ParameterStore::initialize(&sizes, source);
        let slots = vec![WorkerScratch::new(&sizes); n_cores];
        let pool = ThreadPoolBuilder::new()
            .num_threads(n_cores)
            .thread_name(|i| format!("backprop-worker-{}", i))
            .build()?;

        debug!(
            "network: sizes {:?}, {} worker slots, {} cost",
            sizes,
            n_cores,
            cost.name()
        );

        Ok(Network { topology, params, slots, cost, pool })
    }

    pub fn topology(&self) -> &NetworkTopology {
        &self.topology
    }

    pub fn parameters(&self) -> &ParameterStore {
        &self.params
    }

    pub fn cost(&self) -> &dyn Cost {
        self.cost.as_ref()
    }

    pub fn n_workers(&self) -> usize {
        self.slots.len()
    }

    pub fn worker_slots(&self) -> &[WorkerScratch] {
        &self.slots
    }

    /// Replace the parameters in place. Shapes must match the topology.
    pub fn set_parameters(&mut self, params: &ParameterStore) -> Result<()> {
        self.params.assign(params)
    }

    /// Forward pass on fresh buffers with the current parameters.
    pub fn feed_forward(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        if input.len() != self.topology.input_size() {
            return Err(NetworkError::dimension_mismatch(
                format!("input of length {}", self.topology.input_size()),
                format!("length {}", input.len()),
            ));
        }
        Ok(infer(&self.params, &self.topology, input))
    }

    /// Check that every pair in `inputs`/`targets` fits the topology.
    pub fn check_examples(&self, inputs: &[Array1<f32>], targets: &[Array1<f32>]) -> Result<()> {
        if inputs.len() != targets.len() {
            return Err(NetworkError::dimension_mismatch(
                format!("{} targets", inputs.len()),
                format!("{} targets", targets.len()),
            ));
        }
        inputs
            .iter()
            .zip(targets.iter())
            .try_for_each(|(x, y)| check_example(&self.topology, x.view(), y.view()))
    }

    /// Zero every slot's accumulators before a new mini-batch.
    pub fn begin_mini_batch(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.examples_seen > 0 {
                warn!("slot {} held {} stale examples at mini-batch start", i, slot.examples_seen);
            }
            slot.clear_gradients();
        }
    }

    /// Backpropagate every example of `batch`, example `idx` on slot
    /// `idx % n_workers`, and wait for all of them.
    ///
    /// Every example is checked before anything is dispatched; on a
    /// `DimensionMismatch` no slot is touched.
    pub fn dispatch(&mut self, batch: &MiniBatch<'_>) -> Result<()> {
        self.check_examples(batch.inputs(), batch.targets())?;

        let n_workers = self.slots.len();
        let batch = *batch;
        let Network { topology, params, slots, cost, pool } = self;
        let (topology, params, cost) = (&*topology, &*params, &**cost);

        pool.scope(|scope| {
            for (slot_index, slot) in slots.iter_mut().enumerate().take(batch.len()) {
                scope.spawn(move |_| {
                    trace!(
                        "slot {}: examples {}..{} step {}",
                        slot_index,
                        slot_index,
                        batch.len(),
                        n_workers
                    );
                    for (x, y) in batch.iter().skip(slot_index).step_by(n_workers) {
                        backprop_example(params, topology, cost, slot, x.view(), y.view());
                    }
                });
            }
        });

        Ok(())
    }

    /// Merge every slot's accumulators into slot 0 and return it.
    pub fn aggregate(&mut self) -> Result<&WorkerScratch> {
        optimizer::aggregate(&mut self.slots)
            .ok_or_else(|| NetworkError::invalid_worker_count(0, "no worker slots allocated"))
    }

    /// Aggregate, apply the regularized update and clear every slot.
    ///
    /// `batch_size` must equal the number of examples dispatched since
    /// [`begin_mini_batch`](Self::begin_mini_batch), otherwise
    /// `InvalidBatchSize` is returned and the parameters are left untouched.
    pub fn end_mini_batch(
        &mut self,
        sgd: &RegularizedSgd,
        batch_size: usize,
        training_size: usize,
    ) -> Result<()> {
        sgd.step(batch_size, training_size)?;
        let accumulated: usize = self.slots.iter().map(|slot| slot.examples_seen).sum();
        if accumulated != batch_size {
            warn!(
                "update with batch size {} refused: {} examples were accumulated",
                batch_size, accumulated
            );
            return Err(NetworkError::InvalidBatchSize { batch_size, training_size });
        }
        self.aggregate()?;

        let merged = &self.slots[0];
        let params = &mut self.params;
        self.pool
            .install(|| sgd.apply(params, merged, batch_size, training_size))?;

        for slot in self.slots.iter_mut() {
            slot.clear_gradients();
        }
        Ok(())
    }

    /// One full mini-batch: begin, dispatch, aggregate and update.
    pub fn train_mini_batch(
        &mut self,
        batch: &MiniBatch<'_>,
        sgd: &RegularizedSgd,
        training_size: usize,
    ) -> Result<()> {
        if batch.is_empty() {
            return Err(NetworkError::InvalidBatchSize { batch_size: 0, training_size });
        }
        self.begin_mini_batch();
        self.dispatch(batch)?;
        self.end_mini_batch(sgd, batch.len(), training_size)
    }

    /// Train on every batch of a partition in order.
    pub fn update_mini_batches(
        &mut self,
        batches: &[MiniBatch<'_>],
        sgd: &RegularizedSgd,
        training_size: usize,
    ) -> Result<()> {
        for (i, batch) in batches.iter().enumerate() {
            debug!("mini-batch {}/{} ({} examples)", i + 1, batches.len(), batch.len());
            self.train_mini_batch(batch, sgd, training_size)?;
        }
        Ok(())
    }

    /// Run a full training loop over `data`.
    pub fn train(&mut self, data: &mut DataSet, config: &TrainingConfig) -> Result<TrainingHistory> {
        Trainer::new(config.clone()).run(self, data)
    }

    /// Save the parameters to a file.
    pub fn save_parameters<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.params.save(path)
    }

    /// Load parameters from a file into this network, keeping its topology.
    pub fn load_parameters<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let loaded = ParameterStore::load(path)?;
        self.params.assign(&loaded)
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("sizes", &self.topology.sizes())
            .field("n_workers", &self.slots.len())
            .field("cost", &self.cost.name())
            .finish()
    }
}
