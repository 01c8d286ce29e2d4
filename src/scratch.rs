use ndarray::{Array1, Array2};

/// Private buffers of one worker slot.
///
/// Every buffer is sized from the layer widths once, at construction, and
/// overwritten on each example. `grad_w` / `grad_b` accumulate across all the
/// examples the slot sees in a mini-batch.
#[derive(Debug, Clone)]
pub struct WorkerScratch {
    /// a[0..=L], a[0] is the input
    pub activations: Vec<Array1<f32>>,
    /// z[k] feeds layer k + 1
    pub pre_activations: Vec<Array1<f32>>,
    pub deltas: Vec<Array1<f32>>,
    /// f'(z[k]) for the hidden transitions
    pub derivatives: Vec<Array1<f32>>,
    pub grad_w: Vec<Array2<f32>>,
    pub grad_b: Vec<Array1<f32>>,
    /// Examples accumulated since the last clear
    pub examples_seen: usize,
}

impl WorkerScratch {
    pub fn new(sizes: &[usize]) -> Self {
        let transitions: Vec<(usize, usize)> = sizes.windows(2).map(|w| (w[0], w[1])).collect();

        WorkerScratch {
            activations: sizes.iter().map(|&size| Array1::zeros(size)).collect(),
            pre_activations: transitions.iter().map(|&(_, out)| Array1::zeros(out)).collect(),
            deltas: transitions.iter().map(|&(_, out)| Array1::zeros(out)).collect(),
            derivatives: transitions.iter().map(|&(_, out)| Array1::zeros(out)).collect(),
            grad_w: transitions.iter().map(|&shape| Array2::zeros(shape)).collect(),
            grad_b: transitions.iter().map(|&(_, out)| Array1::zeros(out)).collect(),
            examples_seen: 0,
        }
    }

    /// Number of weight transitions L
    pub fn depth(&self) -> usize {
        self.grad_w.len()
    }

    pub fn clear_gradients(&mut self) {
        for grad in self.grad_w.iter_mut() {
            grad.fill(0.0);
        }
        for grad in self.grad_b.iter_mut() {
            grad.fill(0.0);
        }
        self.examples_seen = 0;
    }

    /// True when no gradient has been accumulated since the last clear.
    pub fn is_clear(&self) -> bool {
        self.examples_seen == 0
            && self.grad_w.iter().all(|g| g.iter().all(|&v| v == 0.0))
            && self.grad_b.iter().all(|g| g.iter().all(|&v| v == 0.0))
    }

    /// Add another slot's accumulators into this one.
    pub fn absorb(&mut self, other: &WorkerScratch) {
        for (acc, grad) in self.grad_w.iter_mut().zip(other.grad_w.iter()) {
            *acc += grad;
        }
        for (acc, grad) in self.grad_b.iter_mut().zip(other.grad_b.iter()) {
            *acc += grad;
        }
        self.examples_seen += other.examples_seen;
    }

    pub fn output(&self) -> &Array1<f32> {
        &self.activations[self.activations.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_shapes() {
        let scratch = WorkerScratch::new(&[4, 3, 2]);
        assert_eq!(scratch.depth(), 2);
        assert_eq!(scratch.activations.len(), 3);
        assert_eq!(scratch.activations[0].len(), 4);
        assert_eq!(scratch.pre_activations[1].len(), 2);
        assert_eq!(scratch.grad_w[0].dim(), (4, 3));
        assert_eq!(scratch.grad_w[1].dim(), (3, 2));
        assert_eq!(scratch.grad_b[0].len(), 3);
        assert!(scratch.is_clear());
    }

    #[test]
    fn test_absorb_and_clear() {
        let mut a = WorkerScratch::new(&[2, 1]);
        let mut b = WorkerScratch::new(&[2, 1]);
        b.grad_w[0].fill(1.5);
        b.grad_b[0].fill(-0.5);
        b.examples_seen = 3;

        a.absorb(&b);
        a.absorb(&b);
        assert_eq!(a.grad_w[0][[1, 0]], 3.0);
        assert_eq!(a.grad_b[0][0], -1.0);
        assert_eq!(a.examples_seen, 6);
        assert!(!a.is_clear());

        a.clear_gradients();
        assert!(a.is_clear());
    }
}
