use crate::StepResult;

/// A unit of training the gate can drive.
///
/// The gate treats implementations as a black box: it calls `fit`, reads the
/// returned losses and nothing else. Model weights, datasets and optimizers
/// all live behind this trait.
pub trait Fit {
    /// Error produced by a failed training step.
    type Err;

    /// Performs one unit of training, e.g. one epoch or one framework `fit` call.
    ///
    /// # Returns
    /// The losses measured on the step's last epoch.
    fn fit(&mut self) -> Result<StepResult, Self::Err>;
}

impl<F, E> Fit for F
where
    F: FnMut() -> Result<StepResult, E>,
{
    type Err = E;

    fn fit(&mut self) -> Result<StepResult, E> {
        self()
    }
}
