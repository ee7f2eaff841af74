//! A minimal feed-forward neural network engine: stacks of fully connected
//! layers trained with plain gradient descent, on single examples or
//! mini-batches.
//!
//! The moving parts are deliberately few. [`layer::FullyConnectedLayer`]
//! owns a weight+bias matrix and knows how to run its forward transform and
//! its backpropagation update. [`network::Network`] chains layers for full
//! forward and backward sweeps. Activation functions, error functions and
//! parameter initializers are small stateless strategies plugged in at
//! construction time.
//!
//! Dataset handling, batching policy and epoch control are left entirely to
//! the caller; the engine only accepts already-formed vectors (one example)
//! or matrices whose rows are examples (a batch).

pub mod activation;
pub mod init;
pub mod layer;
pub mod loss;
pub mod network;

#[macro_export]
macro_rules! assert_rel_eq_arr1 {
    ($actual:expr, $expected:expr) => {
        assert_eq!($actual.shape(), $expected.shape());
        ndarray::Zip::from(&$actual)
            .and(&$expected)
            .for_each(|v, w| {
                assert_relative_eq!(v, w);
            });
    };
    ($actual:expr, $expected:expr, $eps:expr) => {
        assert_eq!($actual.shape(), $expected.shape());
        ndarray::Zip::from(&$actual)
            .and(&$expected)
            .for_each(|v, w| {
                assert_relative_eq!(v, w, epsilon = $eps);
            });
    };
}

#[macro_export]
macro_rules! assert_rel_eq_arr2 {
    ($actual:expr, $expected:expr) => {
        assert_eq!($actual.shape(), $expected.shape());
        ndarray::Zip::from(&$actual)
            .and(&$expected)
            .for_each(|v, w| {
                assert_relative_eq!(v, w);
            });
    };
    ($actual:expr, $expected:expr, $eps:expr) => {
        assert_eq!($actual.shape(), $expected.shape());
        ndarray::Zip::from(&$actual)
            .and(&$expected)
            .for_each(|v, w| {
                assert_relative_eq!(v, w, epsilon = $eps);
            });
    };
}
