use std::mem;

use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::{Model, activations::ActFn, layers::Dense, loss::LossFn};
use crate::{MlErr, Result, optimization::Optimizer};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
#[derive(Clone, Debug)]
pub struct Sequential {
    layers: Vec<Dense>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Dense>,
    {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    /// Creates a feed forward regressor: every hidden layer is followed by `act_fn` and the
    /// output layer is linear.
    ///
    /// # Arguments
    /// * `input` - The width of the input.
    /// * `hidden` - The width of every hidden layer.
    /// * `output` - The width of the output.
    /// * `act_fn` - The hidden layers' activation.
    pub fn feed_forward(input: usize, hidden: &[usize], output: usize, act_fn: ActFn) -> Self {
        let mut layers = Vec::with_capacity(hidden.len() + 1);
        let mut fan_in = input;

        for &width in hidden {
            layers.push(Dense::new((fan_in, width), Some(act_fn)));
            fan_in = width;
        }
        layers.push(Dense::new((fan_in, output), None));

        Self::new(layers)
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    /// Makes a forward pass through the network, recording what `backprop` needs.
    ///
    /// # Arguments
    /// * `params` - The model's parameters.
    /// * `x` - The input data.
    ///
    /// # Returns
    /// The prediction for the given input or an error if occurred.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_len("parameters", params.len())?;

        let mut rest = params;
        let mut a = x.to_owned();

        for layer in &mut self.layers {
            let (layer_params, tail) = rest.split_at(layer.size());
            a = layer.forward(layer_params, a.view())?;
            rest = tail;
        }

        Ok(a)
    }

    fn check_len(&self, what: &'static str, got: usize) -> Result<()> {
        let expected = self.size();

        if got != expected {
            return Err(MlErr::SizeMismatch {
                what,
                got,
                expected,
            });
        }

        Ok(())
    }
}

/// Splits `buf` in consecutive chunks of the given sizes.
fn chunks_mut<'a, I>(sizes: I, mut buf: &'a mut [f32]) -> Vec<&'a mut [f32]>
where
    I: IntoIterator<Item = usize>,
{
    sizes
        .into_iter()
        .map(|size| {
            let (chunk, rest) = mem::take(&mut buf).split_at_mut(size);
            buf = rest;
            chunk
        })
        .collect()
}

fn chunks<'a, I>(sizes: I, mut buf: &'a [f32]) -> Vec<&'a [f32]>
where
    I: IntoIterator<Item = usize>,
{
    sizes
        .into_iter()
        .map(|size| {
            let (chunk, rest) = buf.split_at(size);
            buf = rest;
            chunk
        })
        .collect()
}

impl Model for Sequential {
    fn size(&self) -> usize {
        self.layers.iter().map(Dense::size).sum()
    }

    fn dims(&self) -> (usize, usize) {
        let input = self.layers.first().map(|l| l.dim().0).unwrap_or_default();
        let output = self.layers.last().map(|l| l.dim().1).unwrap_or_default();
        (input, output)
    }

    fn init_params<R: Rng>(&self, rng: &mut R) -> Result<Vec<f32>> {
        let mut params = Vec::with_capacity(self.size());

        for layer in &self.layers {
            params.extend(layer.init_params(rng)?);
        }

        Ok(params)
    }

    fn infer(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_len("parameters", params.len())?;

        let sizes = self.layers.iter().map(Dense::size);
        let mut a = x.to_owned();

        for (layer, layer_params) in self.layers.iter().zip(chunks(sizes, params)) {
            a = layer.infer(layer_params, a.view())?;
        }

        Ok(a)
    }

    // NOTE: the returned loss is the average of the batch losses, each measured before its
    // optimization step.
    fn backprop<'a, L, O, I>(
        &mut self,
        params: &mut [f32],
        grad: &mut [f32],
        loss_fn: &L,
        optimizer: &mut O,
        batches: I,
    ) -> Result<f32>
    where
        L: LossFn + ?Sized,
        O: Optimizer + ?Sized,
        I: Iterator<Item = (ArrayView2<'a, f32>, ArrayView2<'a, f32>)>,
    {
        self.check_len("gradient", grad.len())?;

        let mut total_loss = 0.0;
        let mut num_batches = 0;

        for (x, y) in batches {
            let y_pred = self.forward(params, x)?;
            if y_pred.dim() != y.dim() {
                return Err(MlErr::SizeMismatch {
                    what: "targets",
                    got: y.len(),
                    expected: y_pred.len(),
                });
            }

            total_loss += loss_fn.loss(y_pred.view(), y);
            num_batches += 1;

            let mut d = loss_fn.loss_prime(y_pred.view(), y);

            let sizes: Vec<_> = self.layers.iter().map(Dense::size).collect();
            let layer_params = chunks(sizes.iter().copied(), params);
            let layer_grads = chunks_mut(sizes.iter().copied(), grad);

            for ((layer, p), g) in self
                .layers
                .iter()
                .zip(layer_params)
                .zip(layer_grads)
                .rev()
            {
                d = layer.backward(p, g, d)?;
            }

            optimizer.update_params(grad, params)?;
        }

        if num_batches == 0 {
            return Err(MlErr::EmptyDataset);
        }

        Ok(total_loss / num_batches as f32)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn feed_forward_shapes() {
        let model = Sequential::feed_forward(2, &[16, 16, 16], 2, ActFn::leaky_relu(0.3));

        assert_eq!(model.layers().len(), 4);
        assert_eq!(model.dims(), (2, 2));
        assert_eq!(model.size(), 3 * 16 + 17 * 16 * 2 + 17 * 2);
    }

    #[test]
    fn init_zeroes_biases() {
        let model = Sequential::feed_forward(2, &[4], 1, ActFn::relu());
        let mut rng = StdRng::seed_from_u64(7);

        let params = model.init_params(&mut rng).unwrap();

        assert_eq!(params.len(), model.size());
        assert!(params[8..12].iter().all(|&b| b == 0.));
        assert_eq!(params[16], 0.);
    }

    #[test]
    fn forward_and_infer_agree() {
        let mut model = Sequential::feed_forward(2, &[3, 3], 2, ActFn::leaky_relu(0.3));
        let mut rng = StdRng::seed_from_u64(1);
        let params = model.init_params(&mut rng).unwrap();

        let x = array![[0.5, -1.0], [2.0, 0.25]];
        let inferred = model.infer(&params, x.view()).unwrap();
        let forwarded = model.forward(&params, x.view()).unwrap();

        assert_eq!(inferred, forwarded);
    }

    #[test]
    fn wrong_parameter_count_is_an_error() {
        let model = Sequential::feed_forward(2, &[3], 1, ActFn::relu());
        let x = array![[0.0, 0.0]];

        assert!(matches!(
            model.infer(&[0.0; 3], x.view()),
            Err(MlErr::SizeMismatch { what: "parameters", .. })
        ));
    }
}
