use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::activation::Activation;
use crate::init::{BiasInit, WeightInit};

/// A node in the network. The next layer consumes only the output width, and
/// only at construction time, to size its own weight matrix.
pub trait Layer {
    /// Number of nodes comprising the output of this layer.
    fn size(&self) -> usize;
}

/// Zero-computation placeholder standing in for the raw input, so the first
/// real layer has a "layer 0" to size its weight matrix against.
pub struct InputLayer {
    size: usize,
}

impl InputLayer {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl Layer for InputLayer {
    fn size(&self) -> usize {
        self.size
    }
}

/// A layer fully connected to the previous one: every output unit is wired to
/// every input unit.
///
/// Weights and biases are packed into a single `(input_dim + 1) × size`
/// matrix. Each column holds one output unit's weights; the last row holds
/// the biases. Inputs are augmented with a trailing `1` so that
/// `z = [a0, 1] · W` folds the bias into the multiplication. The matrix is
/// never resized after construction; [`FullyConnectedLayer::back_prop`] and
/// [`FullyConnectedLayer::back_prop_batch`] are the only operations that
/// mutate it.
pub struct FullyConnectedLayer {
    size: usize,
    input_dim: usize,
    weights: Array2<f64>,
    activation: Box<dyn Activation>,
}

impl FullyConnectedLayer {
    /// Layer with standard-normal weights and zero biases.
    pub fn new<A>(size: usize, previous: &dyn Layer, activation: A) -> Self
    where
        A: Activation + 'static,
    {
        Self::with_init(size, previous, activation, WeightInit::Random, BiasInit::Zero)
    }

    /// Layer with a predefined weight+bias matrix.
    ///
    /// Panics unless `weights` has `previous.size() + 1` rows and `size`
    /// columns.
    pub fn with_weights<A>(
        size: usize,
        previous: &dyn Layer,
        activation: A,
        weights: Array2<f64>,
    ) -> Self
    where
        A: Activation + 'static,
    {
        assert_eq!(
            (previous.size() + 1, size),
            weights.dim(),
            "weight+bias matrix must have previous.size() + 1 rows and size columns",
        );
        Self {
            size,
            input_dim: previous.size(),
            weights,
            activation: Box::new(activation),
        }
    }

    /// Layer with parameters generated by the given initializer pair.
    pub fn with_init<A>(
        size: usize,
        previous: &dyn Layer,
        activation: A,
        w_init: WeightInit,
        b_init: BiasInit,
    ) -> Self
    where
        A: Activation + 'static,
    {
        let input_dim = previous.size();
        let mut weights = Array2::zeros((input_dim + 1, size));
        weights
            .slice_mut(s![..input_dim, ..])
            .assign(&w_init.generate(input_dim, size).t());
        weights.row_mut(input_dim).assign(&b_init.generate(input_dim, size));
        Self {
            size,
            input_dim,
            weights,
            activation: Box::new(activation),
        }
    }

    /// Weighted sum of the previous layer's activation with this layer's
    /// weights and biases (the pre-activation `z`). No side effects.
    pub fn forward_weighted_sum(&self, input: ArrayView1<f64>) -> Array1<f64> {
        append_one(input).dot(&self.weights)
    }

    /// Batched [`FullyConnectedLayer::forward_weighted_sum`]: each row of
    /// `input` is one example.
    pub fn forward_weighted_sum_batch(&self, input: ArrayView2<f64>) -> Array2<f64> {
        append_ones_column(input).dot(&self.weights)
    }

    /// Activation function applied to each entry of the weighted sum.
    pub fn forward_activation(&self, z: ArrayView1<f64>) -> Array1<f64> {
        z.mapv(|v| self.activation.value(v))
    }

    /// Batched [`FullyConnectedLayer::forward_activation`].
    pub fn forward_activation_batch(&self, z: ArrayView2<f64>) -> Array2<f64> {
        z.mapv(|v| self.activation.value(v))
    }

    /// Gradient-descent update for a single example.
    ///
    /// `dc_da` is the derivative of the cost with respect to this layer's
    /// activation, `a0` the previous layer's activation, `z` this layer's
    /// weighted sum and `alpha` the learning rate. Subtracts the scaled
    /// gradient from the weight+bias matrix in place and returns the
    /// derivative of the cost with respect to the previous layer's
    /// activation, computed from the weights as they were before the update.
    pub fn back_prop(
        &mut self,
        dc_da: ArrayView1<f64>,
        a0: ArrayView1<f64>,
        z: ArrayView1<f64>,
        alpha: f64,
    ) -> Array1<f64> {
        assert_eq!(self.size, dc_da.len(), "dc_da length must match layer size");
        assert_eq!(self.input_dim, a0.len(), "a0 length must match input width");
        assert_eq!(self.size, z.len(), "z length must match layer size");

        // derivative of cost with respect to the weighted sum
        let da_dz = z.mapv(|v| self.activation.derivative(v));
        let dc_dz = &dc_da * &da_dz;

        // full gradient matrix, weight block then bias row
        let mut gradient = Array2::zeros((self.input_dim + 1, self.size));
        let weight_block = a0.insert_axis(Axis(1)).dot(&dc_dz.view().insert_axis(Axis(0)));
        gradient.slice_mut(s![..self.input_dim, ..]).assign(&weight_block);
        gradient.row_mut(self.input_dim).assign(&dc_dz);
        gradient *= alpha;

        // propagate through the pre-update weights, bias row excluded
        let dc_da0 = self.weights.slice(s![..self.input_dim, ..]).dot(&dc_dz);

        self.weights -= &gradient;
        dc_da0
    }

    /// Gradient-descent update for a batch of examples, one per row.
    ///
    /// Same algebra as [`FullyConnectedLayer::back_prop`], except the weight
    /// and bias gradients are averaged over the batch before being applied:
    /// mini-batch gradient descent, not summed.
    pub fn back_prop_batch(
        &mut self,
        dc_da: ArrayView2<f64>,
        a0: ArrayView2<f64>,
        z: ArrayView2<f64>,
        alpha: f64,
    ) -> Array2<f64> {
        let batch_size = dc_da.nrows();
        assert!(batch_size > 0, "batch must contain at least one example");
        assert_eq!((batch_size, self.size), dc_da.dim(), "dc_da shape mismatch");
        assert_eq!((batch_size, self.input_dim), a0.dim(), "a0 shape mismatch");
        assert_eq!((batch_size, self.size), z.dim(), "z shape mismatch");

        let da_dz = z.mapv(|v| self.activation.derivative(v));
        let dc_dz = &dc_da * &da_dz;

        let mut gradient = Array2::zeros((self.input_dim + 1, self.size));
        gradient
            .slice_mut(s![..self.input_dim, ..])
            .assign(&(a0.t().dot(&dc_dz) / batch_size as f64));
        gradient
            .row_mut(self.input_dim)
            .assign(&dc_dz.mean_axis(Axis(0)).unwrap());
        gradient *= alpha;

        let dc_da0 = dc_dz.dot(&self.weights.slice(s![..self.input_dim, ..]).t());

        self.weights -= &gradient;
        dc_da0
    }

    /// Read-only view of the weight+bias matrix.
    pub fn weights(&self) -> ArrayView2<f64> {
        self.weights.view()
    }
}

impl Layer for FullyConnectedLayer {
    fn size(&self) -> usize {
        self.size
    }
}

fn append_one(input: ArrayView1<f64>) -> Array1<f64> {
    let mut augmented = Array1::ones(input.len() + 1);
    augmented.slice_mut(s![..input.len()]).assign(&input);
    augmented
}

fn append_ones_column(input: ArrayView2<f64>) -> Array2<f64> {
    let mut augmented = Array2::ones((input.nrows(), input.ncols() + 1));
    augmented.slice_mut(s![.., ..input.ncols()]).assign(&input);
    augmented
}
