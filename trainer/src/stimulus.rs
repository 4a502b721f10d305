use comms::Records;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Uniform};

use crate::{Result, TrainerErr, config::StimulusConfig};

/// Generates the probe inputs the simulator is asked to evaluate, uniformly sampled inside a
/// box.
#[derive(Debug)]
pub struct Stimulus {
    count: usize,
    distributions: Vec<Uniform<f32>>,
    rng: StdRng,
}

impl Stimulus {
    /// Creates a new `Stimulus`.
    ///
    /// # Arguments
    /// * `config` - How many points to generate and the range of each of their components.
    /// * `seed` - The seed for the point generator.
    pub fn new(config: &StimulusConfig, seed: u64) -> Result<Self> {
        let distributions = config
            .ranges
            .iter()
            .map(|&(low, high)| {
                Uniform::new(low, high).map_err(|e| {
                    TrainerErr::InvalidConfig(format!("stimulus range [{low}, {high}): {e}"))
                })
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            count: config.count.get(),
            distributions,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Samples a fresh set of probe points.
    pub fn generate(&mut self) -> Records {
        let Self {
            count,
            distributions,
            rng,
        } = self;

        Records::new((0..*count).map(|_| {
            distributions
                .iter()
                .map(|distribution| distribution.sample(rng))
                .collect()
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;

    #[test]
    fn points_stay_inside_the_box() {
        let config = StimulusConfig {
            count: NonZeroUsize::new(500).unwrap(),
            ranges: vec![(-2.0, 2.0), (-1.0, 2.0)],
        };
        let mut stimulus = Stimulus::new(&config, 7).unwrap();

        let records = stimulus.generate();

        assert_eq!(records.len(), 500);
        for point in records.iter() {
            assert!((-2.0..2.0).contains(&point[0]));
            assert!((-1.0..2.0).contains(&point[1]));
        }
    }

    #[test]
    fn every_request_gets_new_points() {
        let config = StimulusConfig {
            count: NonZeroUsize::new(4).unwrap(),
            ranges: vec![(0.0, 1.0)],
        };
        let mut stimulus = Stimulus::new(&config, 7).unwrap();

        assert_ne!(stimulus.generate(), stimulus.generate());
    }
}
