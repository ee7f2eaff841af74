use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};

use crate::activation::Activation;
use crate::init::{BiasInit, WeightInit};
use crate::layer::{FullyConnectedLayer, InputLayer, Layer};
use crate::loss::ErrorFunction;

/// An ordered stack of fully connected layers trained with plain gradient
/// descent.
///
/// The network exclusively owns its layers and the input placeholder. Layer
/// count and widths are fixed at construction; the only state that changes
/// afterwards is each layer's weight+bias matrix, mutated in place by the
/// backpropagation sweeps.
pub struct Network {
    input: InputLayer,
    layers: Vec<FullyConnectedLayer>,
    error: Box<dyn ErrorFunction>,
    learn_rate: f64,
}

impl Network {
    /// Network with standard-normal weights and zero biases.
    ///
    /// `layer_sizes` lists the width of every fully connected layer in order;
    /// the last entry is the output width. Panics if `layer_sizes` is empty.
    pub fn new<A, E>(
        activation: A,
        error: E,
        learn_rate: f64,
        input_size: usize,
        layer_sizes: &[usize],
    ) -> Self
    where
        A: Activation + Clone + 'static,
        E: ErrorFunction + 'static,
    {
        Self::with_init(
            activation,
            error,
            learn_rate,
            input_size,
            layer_sizes,
            WeightInit::Random,
            BiasInit::Zero,
        )
    }

    /// Network with parameters generated by the given initializer pair. Each
    /// layer receives its own clone of `activation`.
    pub fn with_init<A, E>(
        activation: A,
        error: E,
        learn_rate: f64,
        input_size: usize,
        layer_sizes: &[usize],
        w_init: WeightInit,
        b_init: BiasInit,
    ) -> Self
    where
        A: Activation + Clone + 'static,
        E: ErrorFunction + 'static,
    {
        assert!(!layer_sizes.is_empty(), "network needs at least one layer");

        let input = InputLayer::new(input_size);
        let mut layers: Vec<FullyConnectedLayer> = Vec::with_capacity(layer_sizes.len());
        for &size in layer_sizes {
            let previous: &dyn Layer = layers.last().map_or(&input as &dyn Layer, |l| l);
            let layer =
                FullyConnectedLayer::with_init(size, previous, activation.clone(), w_init, b_init);
            layers.push(layer);
        }

        Self {
            input,
            layers,
            error: Box::new(error),
            learn_rate,
        }
    }

    /// Network built from literal weight+bias matrices, one per layer in
    /// order. Layer widths are taken from each matrix's column count.
    ///
    /// Panics if `weights` is empty or any matrix's row count is not the
    /// previous width plus one.
    pub fn with_weights<A, E>(
        activation: A,
        error: E,
        learn_rate: f64,
        input_size: usize,
        weights: Vec<Array2<f64>>,
    ) -> Self
    where
        A: Activation + Clone + 'static,
        E: ErrorFunction + 'static,
    {
        assert!(!weights.is_empty(), "network needs at least one layer");

        let input = InputLayer::new(input_size);
        let mut layers: Vec<FullyConnectedLayer> = Vec::with_capacity(weights.len());
        for w in weights {
            let size = w.ncols();
            let previous: &dyn Layer = layers.last().map_or(&input as &dyn Layer, |l| l);
            let layer = FullyConnectedLayer::with_weights(size, previous, activation.clone(), w);
            layers.push(layer);
        }

        Self {
            input,
            layers,
            error: Box::new(error),
            learn_rate,
        }
    }

    /// Width of the input placeholder.
    pub fn input_size(&self) -> usize {
        self.input.size()
    }

    /// Width of the final layer.
    pub fn output_size(&self) -> usize {
        self.layers.last().unwrap().size()
    }

    /// The fully connected layers in forward order.
    pub fn layers(&self) -> &[FullyConnectedLayer] {
        &self.layers
    }

    /// Feed one input through every layer and return the final activation.
    ///
    /// Retains none of the intermediate state backpropagation needs; to train
    /// on an example use [`Network::back_propagation`], which performs its own
    /// forward sweep. Panics if `input` does not match the input width.
    pub fn forward_pass(&self, input: ArrayView1<f64>) -> Array1<f64> {
        assert_eq!(self.input.size(), input.len(), "input width mismatch");

        let mut activation = input.to_owned();
        for layer in &self.layers {
            let z = layer.forward_weighted_sum(activation.view());
            activation = layer.forward_activation(z.view());
        }
        activation
    }

    /// Feed a batch of inputs, one per row, through every layer.
    pub fn forward_pass_batch(&self, input: ArrayView2<f64>) -> Array2<f64> {
        assert_eq!(self.input.size(), input.ncols(), "input width mismatch");

        let mut activation = input.to_owned();
        for layer in &self.layers {
            let z = layer.forward_weighted_sum_batch(activation.view());
            activation = layer.forward_activation_batch(z.view());
        }
        activation
    }

    /// One stochastic gradient descent step on a single example.
    ///
    /// Runs a forward sweep retaining every layer's weighted sum and
    /// activation, evaluates the error-function derivative at the output,
    /// then sweeps the layers in reverse, threading each layer's returned
    /// gradient into the one before it. Every layer's parameters are updated
    /// in place; a shape panic partway through the sweep leaves the layers
    /// already visited updated and the rest untouched.
    ///
    /// The returned scalar is the mean of the error-derivative vector at the
    /// output layer, not the error value itself. For a true loss figure
    /// evaluate [`ErrorFunction::value`] against [`Network::forward_pass`]
    /// output.
    pub fn back_propagation(&mut self, input: ArrayView1<f64>, expected: ArrayView1<f64>) -> f64 {
        assert_eq!(self.input.size(), input.len(), "input width mismatch");
        assert_eq!(
            self.output_size(),
            expected.len(),
            "expected width must match the final layer",
        );

        // forward sweep, keeping z and a per layer; index 0 holds the input
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut weighted_sums = Vec::with_capacity(self.layers.len());
        activations.push(input.to_owned());
        for layer in &self.layers {
            let z = layer.forward_weighted_sum(activations.last().unwrap().view());
            let a = layer.forward_activation(z.view());
            weighted_sums.push(z);
            activations.push(a);
        }

        let output = activations.last().unwrap();
        let mut dc_da = Zip::from(expected)
            .and(output)
            .map_collect(|&truth, &observed| self.error.derivative(truth, observed));
        let reported = dc_da.mean().unwrap();

        for (i, layer) in self.layers.iter_mut().enumerate().rev() {
            dc_da = layer.back_prop(
                dc_da.view(),
                activations[i].view(),
                weighted_sums[i].view(),
                self.learn_rate,
            );
        }

        reported
    }

    /// One gradient descent step on a batch of examples, one per row.
    ///
    /// Identical sweep structure to [`Network::back_propagation`]; each
    /// layer's update averages the gradients over the batch. The returned
    /// scalar is the mean of the output error-derivative matrix.
    pub fn back_propagation_batch(
        &mut self,
        input: ArrayView2<f64>,
        expected: ArrayView2<f64>,
    ) -> f64 {
        assert_eq!(self.input.size(), input.ncols(), "input width mismatch");
        assert_eq!(
            self.output_size(),
            expected.ncols(),
            "expected width must match the final layer",
        );
        assert_eq!(
            input.nrows(),
            expected.nrows(),
            "input and expected must hold the same number of examples",
        );

        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut weighted_sums = Vec::with_capacity(self.layers.len());
        activations.push(input.to_owned());
        for layer in &self.layers {
            let z = layer.forward_weighted_sum_batch(activations.last().unwrap().view());
            let a = layer.forward_activation_batch(z.view());
            weighted_sums.push(z);
            activations.push(a);
        }

        let output = activations.last().unwrap();
        let mut dc_da = Zip::from(expected)
            .and(output)
            .map_collect(|&truth, &observed| self.error.derivative(truth, observed));
        let reported = dc_da.mean().unwrap();

        for (i, layer) in self.layers.iter_mut().enumerate().rev() {
            dc_da = layer.back_prop_batch(
                dc_da.view(),
                activations[i].view(),
                weighted_sums[i].view(),
                self.learn_rate,
            );
        }

        reported
    }
}

#[cfg(test)]
mod tests {
    use crate::activation::Sigmoid;
    use crate::assert_rel_eq_arr1;
    use crate::loss::MeanSquared;

    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};

    fn two_layer_network() -> Network {
        Network::with_weights(
            Sigmoid,
            MeanSquared,
            0.5,
            2,
            vec![
                arr2(&[[0.15, 0.25], [0.20, 0.30], [0.35, 0.35]]),
                arr2(&[[0.40, 0.50], [0.45, 0.55], [0.6, 0.6]]),
            ],
        )
    }

    #[test]
    fn construction_sizes_each_layer_against_the_previous() {
        let network = Network::with_init(
            Sigmoid,
            MeanSquared,
            0.01,
            784,
            &[200, 80, 10],
            WeightInit::Xavier,
            BiasInit::Zero,
        );
        assert_eq!(784, network.input_size());
        assert_eq!(10, network.output_size());

        let dims: Vec<_> = network.layers().iter().map(|l| l.weights().dim()).collect();
        assert_eq!(vec![(785, 200), (201, 80), (81, 10)], dims);
    }

    #[test]
    fn forward_pass_is_deterministic() {
        let network = two_layer_network();
        let input = arr1(&[0.05, 0.10]);
        let first = network.forward_pass(input.view());
        let second = network.forward_pass(input.view());
        assert_eq!(first, second);
    }

    #[test]
    fn forward_pass_batch_matches_per_example_passes() {
        let network = two_layer_network();
        let batch = arr2(&[[0.05, 0.10], [0.9, -0.3], [0.0, 1.0]]);
        let outputs = network.forward_pass_batch(batch.view());

        for (row_out, row_in) in outputs.rows().into_iter().zip(batch.rows()) {
            let single = network.forward_pass(row_in);
            assert_rel_eq_arr1!(single, row_out, 1e-12);
        }
    }

    #[test]
    fn back_propagation_reports_mean_error_derivative() {
        let mut network = two_layer_network();
        let reported =
            network.back_propagation(arr1(&[0.05, 0.10]).view(), arr1(&[0.01, 0.99]).view());
        // mean of [o1 - 0.01, o2 - 0.99] at the initial parameters
        assert_relative_eq!(0.2621467674368891, reported, epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "input width mismatch")]
    fn forward_pass_rejects_wrong_input_width() {
        let network = two_layer_network();
        network.forward_pass(arr1(&[0.05, 0.10, 0.2]).view());
    }

    #[test]
    #[should_panic(expected = "expected width")]
    fn back_propagation_rejects_wrong_expected_width() {
        let mut network = two_layer_network();
        network.back_propagation(arr1(&[0.05, 0.10]).view(), arr1(&[0.01]).view());
    }

    #[test]
    #[should_panic(expected = "at least one layer")]
    fn network_requires_a_layer() {
        Network::new(Sigmoid, MeanSquared, 0.5, 2, &[]);
    }
}
