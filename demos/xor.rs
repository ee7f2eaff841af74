use ndarray::arr2;
use percept::activation::Sigmoid;
use percept::init::{BiasInit, WeightInit};
use percept::loss::{ErrorFunction, MeanSquared};
use percept::network::Network;

fn main() {
    let input = arr2(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]);
    let expected = arr2(&[[0.0], [1.0], [1.0], [0.0]]);

    let mut network = Network::with_init(
        Sigmoid,
        MeanSquared,
        2.0,
        2,
        &[3, 1],
        WeightInit::Xavier,
        BiasInit::Zero,
    );

    let epochs = 10000;
    for epoch in 0..epochs {
        network.back_propagation_batch(input.view(), expected.view());

        if epoch % 1000 == 0 {
            let out = network.forward_pass_batch(input.view());
            let loss: f64 = out
                .iter()
                .zip(expected.iter())
                .map(|(&o, &t)| MeanSquared.value(t, o))
                .sum();
            println!("epoch {}: loss = {}", epoch, loss);
        }
    }

    let out = network.forward_pass_batch(input.view());
    for (x, y) in input.rows().into_iter().zip(out.rows()) {
        println!("{} xor {} -> {:.4}", x[0], x[1], y[0]);
    }
}
