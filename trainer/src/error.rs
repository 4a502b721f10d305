use std::{error::Error, fmt, io, time::Duration};

use comms::RecordsErr;
use machine_learning::MlErr;

/// The trainer's result type.
pub type Result<T> = std::result::Result<T, TrainerErr>;

/// Trainer runtime failures. None of them is recovered from: the session stops on the first one.
#[derive(Debug)]
pub enum TrainerErr {
    Io(io::Error),
    Timeout {
        op: &'static str,
        after: Duration,
    },
    Malformed(RecordsErr),
    FieldCount {
        record: usize,
        got: usize,
        expected: usize,
    },
    UnexpectedMessage {
        got: &'static str,
    },
    Model(MlErr),
    InvalidConfig(String),
}

impl fmt::Display for TrainerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainerErr::Io(e) => write!(f, "io error: {e}"),
            TrainerErr::Timeout { op, after } => {
                write!(f, "{op} timed out after {}ms", after.as_millis())
            }
            TrainerErr::Malformed(e) => write!(f, "malformed response: {e}"),
            TrainerErr::FieldCount {
                record,
                got,
                expected,
            } => write!(
                f,
                "record {record} has {got} fields, expected {expected}"
            ),
            TrainerErr::UnexpectedMessage { got } => {
                write!(f, "expected a sample response, got a {got:?} message")
            }
            TrainerErr::Model(e) => write!(f, "model error: {e}"),
            TrainerErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for TrainerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrainerErr::Io(e) => Some(e),
            TrainerErr::Malformed(e) => Some(e),
            TrainerErr::Model(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TrainerErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RecordsErr> for TrainerErr {
    fn from(value: RecordsErr) -> Self {
        Self::Malformed(value)
    }
}

impl From<MlErr> for TrainerErr {
    fn from(value: MlErr) -> Self {
        Self::Model(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<TrainerErr> for io::Error {
    fn from(value: TrainerErr) -> Self {
        match value {
            TrainerErr::Io(e) => e,
            TrainerErr::Timeout { .. } => io::Error::new(io::ErrorKind::TimedOut, value),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
