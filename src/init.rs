use ndarray::{Array, Array1, Array2};
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;

/// Weight initialization strategies, parameterized by the layer's fan-in and
/// fan-out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightInit {
    /// All weights zero.
    Zero,
    /// Standard normal, N(0, 1).
    Random,
    /// Glorot initialization: N(0, sqrt(2 / (fan_in + fan_out))).
    Xavier,
    /// He initialization: N(0, sqrt(2 / fan_in)).
    KaimingHe,
}

impl WeightInit {
    /// Generate a `(fan_out, fan_in)` weight matrix.
    pub fn generate(self, fan_in: usize, fan_out: usize) -> Array2<f64> {
        match self {
            WeightInit::Zero => Array2::zeros((fan_out, fan_in)),
            WeightInit::Random => normal_matrix(fan_in, fan_out, 1.0),
            WeightInit::Xavier => {
                normal_matrix(fan_in, fan_out, (2.0 / (fan_in + fan_out) as f64).sqrt())
            }
            WeightInit::KaimingHe => normal_matrix(fan_in, fan_out, (2.0 / fan_in as f64).sqrt()),
        }
    }
}

/// Bias initialization strategies. Same catalogue as [`WeightInit`]; biases
/// are vectors with one entry per output unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BiasInit {
    Zero,
    Random,
    Xavier,
    KaimingHe,
}

impl BiasInit {
    /// Generate a bias vector of length `fan_out`.
    pub fn generate(self, fan_in: usize, fan_out: usize) -> Array1<f64> {
        match self {
            BiasInit::Zero => Array1::zeros(fan_out),
            BiasInit::Random => normal_vector(fan_out, 1.0),
            BiasInit::Xavier => normal_vector(fan_out, (2.0 / (fan_in + fan_out) as f64).sqrt()),
            BiasInit::KaimingHe => normal_vector(fan_out, (2.0 / fan_in as f64).sqrt()),
        }
    }
}

fn normal_matrix(fan_in: usize, fan_out: usize, stddev: f64) -> Array2<f64> {
    Array::random((fan_out, fan_in), Normal::new(0.0, stddev).unwrap())
}

fn normal_vector(len: usize, stddev: f64) -> Array1<f64> {
    Array::random(len, Normal::new(0.0, stddev).unwrap())
}
