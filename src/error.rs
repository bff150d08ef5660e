use std::{error::Error, fmt};

/// The result type used across the crate's boundaries.
pub type Result<T> = std::result::Result<T, TrainErr>;

/// Failures raised while preparing a gated training run.
///
/// The gate itself never produces one of these: errors coming out of a
/// training step are handed back to the caller untouched.
#[derive(Debug)]
pub enum TrainErr {
    /// A history is missing one of the metrics the gate reads.
    MissingMetric { metric: &'static str },
    /// A metric is present but holds no epochs.
    EmptyMetric { metric: &'static str },
    /// The improvement threshold is not a finite fraction in `(0, 1)`.
    InvalidThreshold { got: f64 },
    Json(serde_json::Error),
}

impl fmt::Display for TrainErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainErr::MissingMetric { metric } => {
                write!(f, "missing field `{metric}` in training history")
            }
            TrainErr::EmptyMetric { metric } => {
                write!(f, "metric `{metric}` has no recorded epochs")
            }
            TrainErr::InvalidThreshold { got } => {
                write!(f, "threshold must be in (0, 1), got {got}")
            }
            TrainErr::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl Error for TrainErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrainErr::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TrainErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
