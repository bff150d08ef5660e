use crate::{
    error::{Result, TrainErr},
    history::{History, LOSS, VAL_LOSS},
};

/// The metrics a single training step reports back to the gate.
///
/// Only the last epoch's training and validation loss are kept, the rest of
/// the history a step may have produced is irrelevant to the stopping rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    final_loss: f64,
    final_val_loss: f64,
}

impl StepResult {
    /// Creates a new `StepResult`.
    ///
    /// # Arguments
    /// * `final_loss` - The training loss of the step's last epoch.
    /// * `final_val_loss` - The validation loss of the step's last epoch.
    pub fn new(final_loss: f64, final_val_loss: f64) -> Self {
        Self {
            final_loss,
            final_val_loss,
        }
    }

    /// Returns the training loss of the last epoch.
    pub fn final_loss(&self) -> f64 {
        self.final_loss
    }

    /// Returns the validation loss of the last epoch.
    pub fn final_val_loss(&self) -> f64 {
        self.final_val_loss
    }
}

impl<'a> TryFrom<&'a History> for StepResult {
    type Error = TrainErr;

    /// Takes the last epoch of both `loss` and `val_loss`.
    ///
    /// # Errors
    /// `TrainErr::MissingMetric` if either metric is absent and
    /// `TrainErr::EmptyMetric` if either one has no epochs.
    fn try_from(history: &'a History) -> Result<Self> {
        let final_loss = history.last(LOSS)?;
        let final_val_loss = history.last(VAL_LOSS)?;
        Ok(Self::new(final_loss, final_val_loss))
    }
}

impl TryFrom<History> for StepResult {
    type Error = TrainErr;

    fn try_from(history: History) -> Result<Self> {
        Self::try_from(&history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_last_epoch_of_each_metric() {
        let mut history = History::new();
        history.record(LOSS, 1.0);
        history.record(LOSS, 0.4);
        history.record(VAL_LOSS, 2.0);
        history.record(VAL_LOSS, 0.9);

        let step = StepResult::try_from(&history).unwrap();

        assert_eq!(step.final_loss(), 0.4);
        assert_eq!(step.final_val_loss(), 0.9);
    }

    #[test]
    fn missing_validation_loss_is_reported_by_name() {
        let mut history = History::new();
        history.record(LOSS, 1.0);

        let err = StepResult::try_from(history).unwrap_err();

        assert!(matches!(err, TrainErr::MissingMetric { metric: "val_loss" }));
        assert_eq!(
            err.to_string(),
            "missing field `val_loss` in training history"
        );
    }
}
