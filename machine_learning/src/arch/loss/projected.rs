use ndarray::{Array2, ArrayView2};

use super::{LossFn, Mse};

/// A differentiable map from the model's output space into the space the error is measured in.
pub trait Projection {
    /// The width of the rows this projection maps.
    fn width(&self) -> usize;

    /// Maps every row of `y`.
    fn project(&self, y: ArrayView2<f32>) -> Array2<f32>;

    /// Pulls a derivative taken in the projected space back to the unprojected one, that is,
    /// multiplies every row of `d` by the map's jacobian evaluated at the matching row of `y`.
    fn pull_back(&self, y: ArrayView2<f32>, d: ArrayView2<f32>) -> Array2<f32>;
}

/// Measures the error of an inner loss function after projecting both the predictions and the
/// targets.
#[derive(Debug, Default, Clone, Copy)]
pub struct Projected<P, L = Mse> {
    projection: P,
    inner: L,
}

impl<P: Projection> Projected<P> {
    /// Returns a new `Projected` that computes the mean squared error in the projected space.
    pub fn new(projection: P) -> Self {
        Self::with_loss(projection, Mse)
    }
}

impl<P: Projection, L: LossFn> Projected<P, L> {
    pub fn with_loss(projection: P, inner: L) -> Self {
        Self { projection, inner }
    }
}

impl<P: Projection, L: LossFn> LossFn for Projected<P, L> {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        let y_pred = self.projection.project(y_pred);
        let y = self.projection.project(y);
        self.inner.loss(y_pred.view(), y.view())
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        let projected_pred = self.projection.project(y_pred);
        let projected = self.projection.project(y);
        let d = self
            .inner
            .loss_prime(projected_pred.view(), projected.view());

        self.projection.pull_back(y_pred, d.view())
    }

    fn width(&self) -> Option<usize> {
        Some(self.projection.width())
    }
}
