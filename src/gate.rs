use log::{debug, info};

use crate::{
    StepResult,
    config::{Criterion, GateConfig},
    fit::Fit,
};

/// Why a gated run stopped calling its training step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every allowed step was spent and each one improved.
    PatienceExhausted,
    /// The last step did not improve enough on the previous accepted one.
    NoImprovement,
}

/// Summary of a finished gated run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateReport {
    calls: usize,
    reason: StopReason,
    last_accepted: Option<StepResult>,
}

impl GateReport {
    /// Returns how many times the training step was invoked.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Returns why the run stopped.
    pub fn reason(&self) -> StopReason {
        self.reason
    }

    /// Returns the last step that counted as an improvement, if any did.
    pub fn last_accepted(&self) -> Option<StepResult> {
        self.last_accepted
    }
}

/// Loop state of a single run. Lives on the run's stack frame only.
struct RunState {
    last_loss: f64,
    last_val_loss: f64,
    remaining: usize,
    calls: usize,
    last_accepted: Option<StepResult>,
}

impl RunState {
    fn new(patience: usize) -> Self {
        Self {
            last_loss: f64::INFINITY,
            last_val_loss: f64::INFINITY,
            remaining: patience,
            calls: 0,
            last_accepted: None,
        }
    }

    /// Claims one step from the budget, `false` once it is spent.
    fn take_step(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }

        self.remaining -= 1;
        self.calls += 1;
        true
    }

    /// Compares `step` against the last accepted losses and keeps it if it
    /// improved enough. Comparisons are strict, so `NaN` never improves.
    fn observe(&mut self, step: StepResult, threshold: f64, criterion: Criterion) -> bool {
        let loss_improved = step.final_loss() < self.last_loss * threshold;
        let val_loss_improved = step.final_val_loss() < self.last_val_loss * threshold;

        debug!(
            "step {}: loss {} (prev {}), val_loss {} (prev {})",
            self.calls,
            step.final_loss(),
            self.last_loss,
            step.final_val_loss(),
            self.last_val_loss
        );

        if !criterion.accepts(loss_improved, val_loss_improved) {
            return false;
        }

        self.last_loss = step.final_loss();
        self.last_val_loss = step.final_val_loss();
        self.last_accepted = Some(step);
        true
    }

    fn finish(self, reason: StopReason) -> GateReport {
        match reason {
            StopReason::PatienceExhausted => {
                info!("patience exhausted after {} step(s)", self.calls)
            }
            StopReason::NoImprovement => {
                info!("no sufficient improvement at step {}, stopping", self.calls)
            }
        }

        GateReport {
            calls: self.calls,
            reason,
            last_accepted: self.last_accepted,
        }
    }
}

/// Keeps training while each step improves enough on the previous one.
///
/// A step improves when its loss (or, depending on the `Criterion`, its
/// validation loss) is strictly below `threshold` times the last accepted
/// value. The first step always compares against infinity. The run stops at
/// the first step that does not improve, or after `patience` steps.
#[derive(Debug, Clone, Copy)]
pub struct ImprovementGate {
    threshold: f64,
    patience: usize,
    criterion: Criterion,
}

impl ImprovementGate {
    /// Creates a new `ImprovementGate` from a validated configuration.
    pub fn new(cfg: GateConfig) -> Self {
        Self {
            threshold: cfg.threshold(),
            patience: cfg.patience(),
            criterion: cfg.criterion(),
        }
    }

    /// Drives `fit` until it stops improving or the patience runs out.
    ///
    /// # Arguments
    /// * `fit` - The training step. Called at most `patience` times and never
    ///   again after a non-improving step.
    ///
    /// # Returns
    /// A `GateReport` describing the run.
    ///
    /// # Errors
    /// Whatever error `fit` returns, unchanged. The run ends right there.
    pub fn run<F: Fit>(&self, mut fit: F) -> Result<GateReport, F::Err> {
        let mut state = RunState::new(self.patience);

        while state.take_step() {
            let step = fit.fit()?;

            if !state.observe(step, self.threshold, self.criterion) {
                return Ok(state.finish(StopReason::NoImprovement));
            }
        }

        Ok(state.finish(StopReason::PatienceExhausted))
    }

    /// Same as [`ImprovementGate::run`] for asynchronous training steps.
    ///
    /// Each step is awaited to completion before the next one is started.
    pub async fn run_async<F, Fut, E>(&self, mut fit: F) -> Result<GateReport, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<StepResult, E>>,
    {
        let mut state = RunState::new(self.patience);

        while state.take_step() {
            let step = fit().await?;

            if !state.observe(step, self.threshold, self.criterion) {
                return Ok(state.finish(StopReason::NoImprovement));
            }
        }

        Ok(state.finish(StopReason::PatienceExhausted))
    }
}

impl Default for ImprovementGate {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}

/// Trains with `fit` until the improvement between steps falls below
/// `threshold` or `patience` steps were taken.
///
/// The threshold is taken as is, without range checks. Use
/// [`GateConfig::new`] and [`ImprovementGate`] for a validated setup.
///
/// # Arguments
/// * `fit` - The training step.
/// * `threshold` - Ratio a new loss must fall below, `0.8` means a 20% reduction.
/// * `patience` - Maximum number of calls to `fit`.
///
/// # Errors
/// Whatever error `fit` returns, unchanged.
pub fn train_until_improvement<F: Fit>(
    fit: F,
    threshold: f64,
    patience: usize,
) -> Result<GateReport, F::Err> {
    let gate = ImprovementGate {
        threshold,
        patience,
        criterion: Criterion::Either,
    };

    gate.run(fit)
}
