pub mod batch;
pub mod config;
pub mod error;
pub mod regressor;
pub mod session;
pub mod stimulus;

pub use batch::{Batch, parse_batch};
pub use config::{Preset, TrainerConfig};
pub use error::{Result, TrainerErr};
pub use session::{RoundReport, Session, Summary};
