mod regressor;

pub use regressor::Regressor;
