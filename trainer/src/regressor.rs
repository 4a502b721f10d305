use machine_learning::{
    arch::{
        Model, Sequential,
        activations::ActFn,
        loss::{LossFn, Mse, Projected},
    },
    kinematics::TwoLinkArm,
    optimization::{Adam, GradientDescent, Optimizer},
    training::Regressor,
};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    Result,
    config::{ActFnConfig, LossConfig, OptimizerConfig, TrainerConfig},
};

/// The regressor driven by a session, with its optimizer and loss picked at runtime.
pub type IkRegressor =
    Regressor<Sequential, Box<dyn Optimizer + Send>, Box<dyn LossFn + Send>, StdRng>;

/// Builds the regressor described by `config`, initialized from its seed.
pub fn build_regressor(config: &TrainerConfig) -> Result<IkRegressor> {
    let act_fn = match config.act_fn {
        ActFnConfig::LeakyRelu { alpha } => ActFn::leaky_relu(alpha),
        ActFnConfig::Relu => ActFn::relu(),
    };

    let model = Sequential::feed_forward(
        config.input_dim,
        &config.hidden,
        config.output_dim,
        act_fn,
    );

    let optimizer: Box<dyn Optimizer + Send> = match config.optimizer {
        OptimizerConfig::Adam { lr, b1, b2, eps } => {
            Box::new(Adam::new(model.size(), lr, b1, b2, eps))
        }
        OptimizerConfig::GradientDescent { lr } => Box::new(GradientDescent::new(lr)),
    };

    let loss_fn: Box<dyn LossFn + Send> = match config.loss {
        LossConfig::Mse => Box::new(Mse),
        LossConfig::ForwardKinematics => Box::new(Projected::new(TwoLinkArm)),
    };

    let rng = StdRng::seed_from_u64(config.seed);
    Ok(Regressor::new(model, optimizer, loss_fn, rng)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;

    #[test]
    fn builds_every_preset() {
        for preset in [Preset::NeuralIk, Preset::CurveFitting, Preset::ReluIk] {
            let config = TrainerConfig::preset(preset);
            let regressor = build_regressor(&config).unwrap();

            assert_eq!(
                regressor.model().dims(),
                (config.input_dim, config.output_dim)
            );
            assert_eq!(regressor.model().layers().len(), config.hidden.len() + 1);
        }
    }

    #[test]
    fn seed_fixes_the_initial_parameters() {
        let config = TrainerConfig::preset(Preset::NeuralIk);

        let a = build_regressor(&config).unwrap();
        let b = build_regressor(&config).unwrap();

        assert_eq!(a.params(), b.params());
    }
}
