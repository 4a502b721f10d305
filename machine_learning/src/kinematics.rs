//! Forward kinematics of a planar arm made of two unit links, used to measure errors in joint
//! angles by where they actually put the arm's tip.

use ndarray::{Array2, ArrayView2, Zip};

use crate::arch::loss::Projection;

/// Maps a base and elbow angle to the position of the arm's tip.
///
/// Angles are measured from the vertical axis, so `(0, 0)` is the arm pointing straight up.
///
/// # Arguments
/// * `theta1` - The base joint angle.
/// * `theta2` - The elbow joint angle, relative to the first link.
///
/// # Returns
/// The `(x, y)` tip position.
pub fn forward_kinematics(theta1: f32, theta2: f32) -> (f32, f32) {
    let elbow = theta1 + theta2;
    (theta1.sin() + elbow.sin(), theta1.cos() + elbow.cos())
}

/// The jacobian of `forward_kinematics` as `[[dx/dθ1, dx/dθ2], [dy/dθ1, dy/dθ2]]`.
pub fn jacobian(theta1: f32, theta2: f32) -> [[f32; 2]; 2] {
    let elbow = theta1 + theta2;
    let (sin1, cos1) = theta1.sin_cos();
    let (sin12, cos12) = elbow.sin_cos();

    [[cos1 + cos12, cos12], [-sin1 - sin12, -sin12]]
}

/// Projects rows of `(θ1, θ2)` joint angles into the arm's cartesian tip positions.
///
/// # Panics
/// If the rows are narrower than two columns. `Regressor::new` rejects models whose output
/// width differs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TwoLinkArm;

impl Projection for TwoLinkArm {
    fn width(&self) -> usize {
        2
    }

    fn project(&self, y: ArrayView2<f32>) -> Array2<f32> {
        let mut out = Array2::zeros((y.nrows(), 2));

        Zip::from(out.rows_mut()).and(y.rows()).for_each(|mut out, angles| {
            let (x, y) = forward_kinematics(angles[0], angles[1]);
            out[0] = x;
            out[1] = y;
        });

        out
    }

    fn pull_back(&self, y: ArrayView2<f32>, d: ArrayView2<f32>) -> Array2<f32> {
        let mut out = Array2::zeros(y.raw_dim());

        Zip::from(out.rows_mut())
            .and(y.rows())
            .and(d.rows())
            .for_each(|mut out, angles, d| {
                let [[dx1, dx2], [dy1, dy2]] = jacobian(angles[0], angles[1]);
                out[0] = d[0] * dx1 + d[1] * dy1;
                out[1] = d[0] * dx2 + d[1] * dy2;
            });

        out
    }
}
