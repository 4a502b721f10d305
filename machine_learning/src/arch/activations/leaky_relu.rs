/// Rectifier that lets a scaled fraction of the negative inputs through.
#[derive(Clone, Copy, Debug)]
pub struct LeakyRelu {
    alpha: f32,
}

impl LeakyRelu {
    /// Creates a new `LeakyRelu`.
    ///
    /// # Arguments
    /// * `alpha` - The slope applied to negative inputs.
    pub fn new(alpha: f32) -> Self {
        Self { alpha }
    }

    pub fn f(&self, z: f32) -> f32 {
        if z > 0. { z } else { self.alpha * z }
    }

    pub fn df(&self, z: f32) -> f32 {
        if z > 0. { 1. } else { self.alpha }
    }
}
