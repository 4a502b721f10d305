use std::{env, fs, num::NonZeroUsize, path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Result, TrainerErr};

const DEFAULT_PRESET: Preset = Preset::NeuralIk;

/// The known trainer setups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Two-link arm IK, trained on the arm's tip position error.
    NeuralIk,
    /// Predicts the next ten values of a signal from its last ten.
    CurveFitting,
    /// Two-link arm IK with plain rectifiers and joint-space error.
    ReluIk,
}

impl FromStr for Preset {
    type Err = TrainerErr;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "neural_ik" => Ok(Self::NeuralIk),
            "curve_fitting" => Ok(Self::CurveFitting),
            "relu_ik" => Ok(Self::ReluIk),
            other => Err(TrainerErr::InvalidConfig(format!("unknown preset: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActFnConfig {
    LeakyRelu { alpha: f32 },
    Relu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossConfig {
    /// Mean squared error on the raw outputs.
    Mse,
    /// Mean squared error on the two-link arm's tip position.
    ForwardKinematics,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Adam { lr: f32, b1: f32, b2: f32, eps: f32 },
    GradientDescent { lr: f32 },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam {
            lr: 1e-3,
            b1: 0.9,
            b2: 0.999,
            eps: 1e-7,
        }
    }
}

/// Probe points generated by the trainer and sent along with every sample request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusConfig {
    pub count: NonZeroUsize,
    /// One `[low, high)` range per input component.
    pub ranges: Vec<(f32, f32)>,
}

impl StimulusConfig {
    fn arm_reach() -> Self {
        Self {
            count: non_zero(2048),
            ranges: vec![(-2.0, 2.0), (-1.0, 2.0)],
        }
    }
}

/// Everything a training session needs to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub input_dim: usize,
    pub output_dim: usize,
    pub hidden: Vec<usize>,
    pub act_fn: ActFnConfig,
    pub loss: LossConfig,
    pub optimizer: OptimizerConfig,
    pub num_epochs: usize,
    pub epochs_per_iteration: NonZeroUsize,
    pub batch_size: NonZeroUsize,
    pub seed: u64,
    pub timeout_ms: u64,
    pub stimulus: Option<StimulusConfig>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self::preset(DEFAULT_PRESET)
    }
}

fn non_zero(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}

impl TrainerConfig {
    /// Returns the configuration of one of the known setups.
    pub fn preset(preset: Preset) -> Self {
        let base = Self {
            input_dim: 2,
            output_dim: 2,
            hidden: vec![16, 16, 16],
            act_fn: ActFnConfig::LeakyRelu { alpha: 0.3 },
            loss: LossConfig::ForwardKinematics,
            optimizer: OptimizerConfig::default(),
            num_epochs: 10000,
            epochs_per_iteration: non_zero(50),
            batch_size: non_zero(128),
            seed: 7,
            timeout_ms: 1000,
            stimulus: Some(StimulusConfig::arm_reach()),
        };

        match preset {
            Preset::NeuralIk => base,
            Preset::CurveFitting => Self {
                input_dim: 10,
                output_dim: 10,
                loss: LossConfig::Mse,
                stimulus: None,
                ..base
            },
            Preset::ReluIk => Self {
                act_fn: ActFnConfig::Relu,
                loss: LossConfig::Mse,
                num_epochs: 3000,
                epochs_per_iteration: non_zero(10),
                batch_size: non_zero(256),
                ..base
            },
        }
    }

    /// Parses a JSON configuration, taking missing fields from the default preset.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TrainerErr::InvalidConfig(format!("invalid JSON: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TrainerErr::InvalidConfig(format!("cannot read '{}': {e}", path.display()))
        })?;

        Self::from_json(&content)
    }

    /// Builds the configuration from the environment: `CONFIG` points to a JSON file, otherwise
    /// `PRESET` names one of the known setups.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = env::var("CONFIG") {
            return Self::load(path);
        }

        let preset = match env::var("PRESET") {
            Ok(name) => name.parse()?,
            Err(_) => DEFAULT_PRESET,
        };

        let config = Self::preset(preset);
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration describes a trainable setup.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(TrainerErr::InvalidConfig(msg));

        if self.input_dim == 0 || self.output_dim == 0 {
            return invalid("input_dim and output_dim must be positive".into());
        }
        if self.hidden.contains(&0) {
            return invalid("hidden layers must not be empty".into());
        }
        if self.num_epochs == 0 {
            return invalid("num_epochs must be positive".into());
        }
        if self.timeout_ms == 0 {
            return invalid("timeout_ms must be positive".into());
        }
        if self.loss == LossConfig::ForwardKinematics && self.output_dim != 2 {
            return invalid(format!(
                "forward_kinematics loss needs 2 outputs (base and elbow angles), got {}",
                self.output_dim
            ));
        }
        if let Some(stimulus) = &self.stimulus {
            if stimulus.ranges.len() != self.input_dim {
                return invalid(format!(
                    "stimulus has {} ranges for {} inputs",
                    stimulus.ranges.len(),
                    self.input_dim
                ));
            }
            if let Some((low, high)) = stimulus.ranges.iter().find(|(low, high)| low >= high) {
                return invalid(format!("empty stimulus range [{low}, {high})"));
            }
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The amount of fitting rounds needed to exhaust the epoch budget.
    pub fn fit_rounds(&self) -> usize {
        self.num_epochs.div_ceil(self.epochs_per_iteration.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for preset in [Preset::NeuralIk, Preset::CurveFitting, Preset::ReluIk] {
            TrainerConfig::preset(preset).validate().unwrap();
        }
    }

    #[test]
    fn preset_names() {
        assert_eq!("curve_fitting".parse::<Preset>().unwrap(), Preset::CurveFitting);
        assert!("fabrik".parse::<Preset>().is_err());
    }

    #[test]
    fn json_overrides_the_default_preset() {
        let config = TrainerConfig::from_json(
            r#"{
                "num_epochs": 100,
                "epochs_per_iteration": 10,
                "act_fn": { "kind": "relu" },
                "optimizer": { "kind": "gradient_descent", "lr": 0.01 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.num_epochs, 100);
        assert_eq!(config.epochs_per_iteration.get(), 10);
        assert_eq!(config.act_fn, ActFnConfig::Relu);
        assert_eq!(config.optimizer, OptimizerConfig::GradientDescent { lr: 0.01 });
        assert_eq!(config.loss, LossConfig::ForwardKinematics);
        assert_eq!(config.hidden, [16, 16, 16]);
    }

    #[test]
    fn kinematic_loss_needs_two_outputs() {
        let config = TrainerConfig {
            loss: LossConfig::ForwardKinematics,
            ..TrainerConfig::preset(Preset::CurveFitting)
        };

        assert!(matches!(config.validate(), Err(TrainerErr::InvalidConfig(_))));
    }

    #[test]
    fn stimulus_must_cover_every_input() {
        let mut config = TrainerConfig::preset(Preset::NeuralIk);
        config.stimulus = Some(StimulusConfig {
            count: NonZeroUsize::MIN,
            ranges: vec![(0., 1.)],
        });

        assert!(config.validate().is_err());
    }

    #[test]
    fn fit_rounds_round_up() {
        let mut config = TrainerConfig::preset(Preset::NeuralIk);
        assert_eq!(config.fit_rounds(), 200);

        config.num_epochs = 25;
        config.epochs_per_iteration = NonZeroUsize::new(10).unwrap();
        assert_eq!(config.fit_rounds(), 3);
    }
}
