use super::{LeakyRelu, Relu};

/// The activations a hidden layer can apply.
#[derive(Debug, Clone, Copy)]
pub enum ActFn {
    LeakyRelu(LeakyRelu),
    Relu(Relu),
}

impl ActFn {
    pub fn leaky_relu(alpha: f32) -> Self {
        Self::LeakyRelu(LeakyRelu::new(alpha))
    }

    pub fn relu() -> Self {
        Self::Relu(Relu)
    }

    pub fn f(&self, x: f32) -> f32 {
        match self {
            Self::LeakyRelu(a) => a.f(x),
            Self::Relu(a) => a.f(x),
        }
    }

    pub fn df(&self, x: f32) -> f32 {
        match self {
            Self::LeakyRelu(a) => a.df(x),
            Self::Relu(a) => a.df(x),
        }
    }
}
