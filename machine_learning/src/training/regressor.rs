use std::num::NonZeroUsize;

use ndarray::ArrayView2;
use rand::Rng;

use crate::{
    MlErr, Result,
    arch::{Model, loss::LossFn},
    dataset::Dataset,
    optimization::Optimizer,
};

/// A stateful function approximator trained incrementally: parameters persist and keep
/// accumulating updates across `fit` calls.
pub struct Regressor<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    model: M,
    params: Vec<f32>,
    grad: Vec<f32>,
    optimizer: O,
    loss_fn: L,
    rng: R,
}

impl<M, O, L, R> Regressor<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    /// Returns a new `Regressor` with freshly initialized parameters.
    ///
    /// # Arguments
    /// * `model` - The model that will be trained.
    /// * `optimizer` - The optimizer, sized for `model`'s parameters.
    /// * `loss_fn` - The loss function used to measure the difference between a model's output and the expected one.
    /// * `rng` - A random number generator, used for initialization and for shuffling.
    ///
    /// # Returns
    /// An error if `loss_fn` only works on outputs of a width other than `model`'s.
    pub fn new(model: M, optimizer: O, loss_fn: L, mut rng: R) -> Result<Self> {
        let (_, output) = model.dims();
        if let Some(width) = loss_fn.width().filter(|&width| width != output) {
            return Err(MlErr::SizeMismatch {
                what: "loss function width",
                got: output,
                expected: width,
            });
        }

        let params = model.init_params(&mut rng)?;
        let grad = vec![0.; params.len()];

        Ok(Self {
            model,
            params,
            grad,
            optimizer,
            loss_fn,
            rng,
        })
    }

    /// Performs `epochs` passes of shuffled mini-batch gradient descent over the given samples.
    ///
    /// # Arguments
    /// * `inputs` - The input vectors.
    /// * `targets` - The expected output vectors, one per input.
    /// * `epochs` - The amount of passes over the samples.
    /// * `batch_size` - The maximum amount of samples per optimization step.
    ///
    /// # Returns
    /// The loss of every epoch.
    pub fn fit(
        &mut self,
        inputs: &[Vec<f32>],
        targets: &[Vec<f32>],
        epochs: usize,
        batch_size: NonZeroUsize,
    ) -> Result<Vec<f32>> {
        let (x_size, y_size) = self.model.dims();
        let mut dataset = Dataset::from_pairs(inputs, targets, x_size, y_size)?;
        let mut losses = Vec::with_capacity(epochs);

        for _ in 0..epochs {
            dataset.shuffle(&mut self.rng);

            let loss = self.model.backprop(
                &mut self.params,
                &mut self.grad,
                &self.loss_fn,
                &mut self.optimizer,
                dataset.batches(batch_size),
            )?;

            losses.push(loss);
        }

        Ok(losses)
    }

    /// Computes the model's output for a single input vector.
    pub fn predict(&self, input: &[f32]) -> Result<Vec<f32>> {
        let x = ArrayView2::from_shape((1, input.len()), input)?;
        let y = self.model.infer(&self.params, x)?;

        Ok(y.iter().copied().collect())
    }

    /// Computes the mean loss over the given samples without training.
    pub fn evaluate(&self, inputs: &[Vec<f32>], targets: &[Vec<f32>]) -> Result<f32> {
        let (x_size, y_size) = self.model.dims();
        let dataset = Dataset::from_pairs(inputs, targets, x_size, y_size)?;
        let Some(batch) = NonZeroUsize::new(dataset.len()) else {
            return Err(MlErr::EmptyDataset);
        };

        let mut loss = 0.;
        for (x, y) in dataset.batches(batch) {
            let y_pred = self.model.infer(&self.params, x)?;
            loss = self.loss_fn.loss(y_pred.view(), y);
        }

        Ok(loss)
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}
