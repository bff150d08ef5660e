//! Improvement-gated training.
//!
//! Repeatedly runs a training step and stops once the losses it reports stop
//! improving by a given ratio, or after a bounded number of attempts.

pub mod config;
pub mod error;
pub mod fit;
pub mod gate;
pub mod history;
pub mod step;

pub use config::{Criterion, GateConfig};
pub use error::{Result, TrainErr};
pub use fit::Fit;
pub use gate::{GateReport, ImprovementGate, StopReason, train_until_improvement};
pub use history::History;
pub use step::StepResult;
