mod loss_fn;
mod mse;
mod projected;

pub use loss_fn::LossFn;
pub use mse::Mse;
pub use projected::{Projected, Projection};
