use std::num::NonZeroUsize;

use ndarray::{Array2, ArrayView2, Axis};
use rand::{Rng, seq::SliceRandom};

use crate::{MlErr, Result};

/// A set of samples, one per row: the first `x_size` columns are the input and the remaining
/// `y_size` the expected output.
#[derive(Debug, Clone)]
pub struct Dataset {
    x_size: usize,
    data: Array2<f32>,
}

impl Dataset {
    /// Creates a new `Dataset` out of row major sample data.
    ///
    /// # Arguments
    /// * `data` - The samples, each one `x_size + y_size` values long.
    /// * `x_size` - The width of the input.
    /// * `y_size` - The width of the expected output.
    ///
    /// # Returns
    /// An error if `data` does not hold a whole amount of samples.
    pub fn new(data: Vec<f32>, x_size: usize, y_size: usize) -> Result<Self> {
        let row = x_size + y_size;

        if row == 0 || data.len() % row != 0 {
            return Err(MlErr::SizeMismatch {
                what: "dataset samples",
                got: data.len(),
                expected: data.len().next_multiple_of(row.max(1)),
            });
        }

        let data = Array2::from_shape_vec((data.len() / row, row), data)?;

        Ok(Self { x_size, data })
    }

    /// Creates a new `Dataset` out of matching input and output vectors.
    ///
    /// # Returns
    /// An error if the amount of inputs and outputs differ or if any of them has the wrong width.
    pub fn from_pairs(
        inputs: &[Vec<f32>],
        targets: &[Vec<f32>],
        x_size: usize,
        y_size: usize,
    ) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(MlErr::SizeMismatch {
                what: "inputs and targets",
                got: targets.len(),
                expected: inputs.len(),
            });
        }

        let mut data = Vec::with_capacity(inputs.len() * (x_size + y_size));

        for (x, y) in inputs.iter().zip(targets) {
            if x.len() != x_size {
                return Err(MlErr::SizeMismatch {
                    what: "input width",
                    got: x.len(),
                    expected: x_size,
                });
            }
            if y.len() != y_size {
                return Err(MlErr::SizeMismatch {
                    what: "target width",
                    got: y.len(),
                    expected: y_size,
                });
            }

            data.extend_from_slice(x);
            data.extend_from_slice(y);
        }

        Self::new(data, x_size, y_size)
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Randomly reorders the samples.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(rng);
        self.data = self.data.select(Axis(0), &indices);
    }

    /// Iterates the samples in consecutive batches of at most `batch_size` samples.
    ///
    /// # Returns
    /// An iterator of `(x, y)` batch views.
    pub fn batches(
        &self,
        batch_size: NonZeroUsize,
    ) -> impl Iterator<Item = (ArrayView2<'_, f32>, ArrayView2<'_, f32>)> {
        let x_size = self.x_size;

        self.data
            .axis_chunks_iter(Axis(0), batch_size.get())
            .map(move |batch| batch.split_at(Axis(1), x_size))
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn dataset() -> Dataset {
        let data = (0..15).map(|v| v as f32).collect();
        Dataset::new(data, 2, 1).unwrap()
    }

    #[test]
    fn batches_split_inputs_and_targets() {
        let dataset = dataset();
        let batches: Vec<_> = dataset.batches(NonZeroUsize::new(2).unwrap()).collect();

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].0, ndarray::array![[0., 1.], [3., 4.]]);
        assert_eq!(batches[0].1, ndarray::array![[2.], [5.]]);
        assert_eq!(batches[2].0.nrows(), 1);
    }

    #[test]
    fn shuffle_keeps_samples_whole() {
        let mut dataset = dataset();
        dataset.shuffle(&mut StdRng::seed_from_u64(3));

        let (x, y) = dataset
            .batches(NonZeroUsize::new(5).unwrap())
            .next()
            .unwrap();

        for (x, y) in x.rows().into_iter().zip(y.rows()) {
            assert_eq!(x[1], x[0] + 1.);
            assert_eq!(y[0], x[0] + 2.);
        }
    }

    #[test]
    fn rejects_partial_samples() {
        assert!(Dataset::new(vec![0.; 7], 2, 2).is_err());
    }

    #[test]
    fn from_pairs_checks_widths() {
        let ok = Dataset::from_pairs(&[vec![1., 2.]], &[vec![3., 4.]], 2, 2).unwrap();
        assert_eq!(ok.len(), 1);

        assert!(matches!(
            Dataset::from_pairs(&[vec![1., 2.]], &[vec![3.]], 2, 2),
            Err(MlErr::SizeMismatch { what: "target width", .. })
        ));
    }
}
