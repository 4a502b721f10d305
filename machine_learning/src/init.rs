use rand::Rng;
use rand_distr::{Distribution, Uniform, uniform::Error as UniformError};

/// A weight generator that follows a certain probabilistic distribution.
pub struct RandWeightGen<D: Distribution<f32>> {
    distribution: D,
    remaining: usize,
}

impl<D: Distribution<f32>> RandWeightGen<D> {
    /// Creates a new `RandWeightGen` weight generator.
    ///
    /// # Arguments
    /// * `distribution` - The distribution to sample the random numbers from.
    /// * `limit` - The maximum amount of numbers to generate.
    pub fn new(distribution: D, limit: usize) -> Self {
        Self {
            distribution,
            remaining: limit,
        }
    }

    /// Samples at most `n` weights.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `n` - The upper limit of samples to generate.
    ///
    /// # Returns
    /// `None` if the generator is exhausted.
    pub fn sample<R: Rng>(&mut self, rng: &mut R, mut n: usize) -> Option<Vec<f32>> {
        if self.remaining == 0 {
            return None;
        }

        n = n.min(self.remaining);
        self.remaining -= n;
        Some((0..n).map(|_| self.distribution.sample(rng)).collect())
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl RandWeightGen<Uniform<f32>> {
    /// Creates a new `RandWeightGen` weight generator with a uniform distribution.
    ///
    /// # Arguments
    /// * `limit` - The maximum amount of numbers to generate.
    /// * `low` - The incluive lower limit.
    /// * `high` - The exclusive upper limit.
    ///
    /// # Returns
    /// An error if the range is invalid (low >= high).
    pub fn uniform(limit: usize, low: f32, high: f32) -> Result<Self, UniformError> {
        Ok(Self::new(Uniform::new(low, high)?, limit))
    }

    /// Creates a new `RandWeightGen` weight generator using Xavier (Glorot) uniform
    /// initialization.
    ///
    /// # Arguments
    /// * `limit` - The maximum amount of numbers to generate.
    /// * `fan_in` - The number of input units in the weight tensor.
    /// * `fan_out` - The number of output units in the weight tensor.
    ///
    /// # Returns
    /// An error if the calculated range is invalid.
    pub fn xavier_uniform(
        limit: usize,
        fan_in: usize,
        fan_out: usize,
    ) -> Result<Self, UniformError> {
        let range = (6. / (fan_in + fan_out) as f32).sqrt();
        Self::uniform(limit, -range, range)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn xavier_uniform_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut weight_gen = RandWeightGen::xavier_uniform(100, 2, 16).unwrap();

        let weights = weight_gen.sample(&mut rng, 150).unwrap();
        let range = (6f32 / 18.).sqrt();

        assert_eq!(weights.len(), 100);
        assert!(weights.iter().all(|w| (-range..range).contains(w)));
        assert_eq!(weight_gen.remaining(), 0);
        assert!(weight_gen.sample(&mut rng, 1).is_none());
    }

    #[test]
    fn same_seed_same_weights() {
        let sample = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            RandWeightGen::xavier_uniform(32, 4, 4)
                .unwrap()
                .sample(&mut rng, 32)
                .unwrap()
        };

        assert_eq!(sample(7), sample(7));
        assert_ne!(sample(7), sample(8));
    }
}
