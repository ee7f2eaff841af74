//! End-to-end regression against a fixed 2-2-2 network with literal weights.
//! The forward values and the updated parameter matrices after one descent
//! step are pinned down to catch any change in the gradient arithmetic.

use approx::assert_relative_eq;
use ndarray::{arr1, arr2};
use percept::activation::Sigmoid;
use percept::loss::{ErrorFunction, MeanSquared};
use percept::network::Network;
use percept::{assert_rel_eq_arr1, assert_rel_eq_arr2};

fn fixed_network() -> Network {
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
fn forward_sequence_reproduces_known_values() {
    let network = fixed_network();
    let input = arr1(&[0.05, 0.10]);

    let hidden = &network.layers()[0];
    let output = &network.layers()[1];

    let z1 = hidden.forward_weighted_sum(input.view());
    assert_rel_eq_arr1!(z1, arr1(&[0.3775, 0.3925]), 1e-12);

    let a1 = hidden.forward_activation(z1.view());
    assert_rel_eq_arr1!(a1, arr1(&[0.5932699921071872, 0.596884378259767]), 1e-9);

    let z2 = output.forward_weighted_sum(a1.view());
    assert_rel_eq_arr1!(z2, arr1(&[1.10590596705977, 1.2249214040964653]), 1e-9);

    let a2 = output.forward_activation(z2.view());
    assert_rel_eq_arr1!(a2, arr1(&[0.7513650695523157, 0.7729284653214625]), 1e-9);

    // the full pass returns only the final activation
    let out = network.forward_pass(input.view());
    assert_rel_eq_arr1!(out, a2, 1e-12);
}

#[test]
fn one_descent_step_reproduces_known_parameters() {
    let mut network = fixed_network();

    let reported = network.back_propagation(arr1(&[0.05, 0.10]).view(), arr1(&[0.01, 0.99]).view());
    assert_relative_eq!(0.2621467674368891, reported, epsilon = 1e-9);

    assert_rel_eq_arr2!(
        network.layers()[0].weights(),
        arr2(&[
            [0.1497807161327628, 0.2497511436323696],
            [0.1995614322655257, 0.2995022872647392],
            [0.3456143226552565, 0.3450228726473914],
        ]),
        1e-9
    );
    assert_rel_eq_arr2!(
        network.layers()[1].weights(),
        arr2(&[
            [0.3589164797178846, 0.5113012702387375],
            [0.4086661860762334, 0.5613701211079891],
            [0.5307507191857215, 0.6190491182582781],
        ]),
        1e-9
    );
}

#[test]
fn descent_step_moves_output_toward_expected() {
    let mut network = fixed_network();
    let input = arr1(&[0.05, 0.10]);
    let expected = arr1(&[0.01, 0.99]);

    let before = network.forward_pass(input.view());
    network.back_propagation(input.view(), expected.view());
    let after = network.forward_pass(input.view());

    let loss = |out: &ndarray::Array1<f64>| {
        out.iter()
            .zip(expected.iter())
            .map(|(&o, &t)| MeanSquared.value(t, o))
            .sum::<f64>()
    };
    assert!(loss(&after) < loss(&before));
}
