/// A macro to build a [`NetworkTopology`](crate::topology::NetworkTopology).
///
/// # Examples
///
/// ```
/// use feedforward::activations::Activation;
/// use feedforward::topology;
/// let topology = topology!(784, (30, Activation::Sigmoid), (10, Activation::Sigmoid));
/// assert_eq!(topology.sizes(), vec![784, 30, 10]);
/// ```
///
/// The first argument is the input width; every following `(size, activation)`
/// pair appends a layer that uses `activation`.
#[macro_export]
macro_rules! topology {
    ($input_size:expr, $( ($size:expr, $activation:expr) ),+ $(,)?) => {
        {
            let topology = $crate::topology::NetworkTopology::new().with_input($input_size);
            $( let topology = topology.with_layer($size, $activation); )+
            topology
        }
    }
}
