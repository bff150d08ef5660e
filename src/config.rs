use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainErr};

/// Default relative improvement ratio, a 20% reduction.
pub const DEFAULT_THRESHOLD: f64 = 0.8;
/// Default upper bound on the amount of training steps.
pub const DEFAULT_PATIENCE: usize = 10;

/// Which losses have to improve for training to continue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Either the training or the validation loss improves.
    ///
    /// A validation regression goes unnoticed as long as the training loss
    /// keeps dropping.
    #[default]
    Either,
    /// Both the training and the validation loss improve.
    Both,
}

impl Criterion {
    /// Combines the outcome of both loss comparisons.
    pub(crate) fn accepts(self, loss_improved: bool, val_loss_improved: bool) -> bool {
        match self {
            Criterion::Either => loss_improved || val_loss_improved,
            Criterion::Both => loss_improved && val_loss_improved,
        }
    }
}

/// Immutable bounds for a gated training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    threshold: f64,
    patience: usize,
    criterion: Criterion,
}

impl GateConfig {
    /// Creates a new gate configuration.
    ///
    /// # Arguments
    /// * `threshold` - A new loss must fall strictly below `threshold` times the
    ///   previous one to count as an improvement. `0.8` means 20%.
    /// * `patience` - Maximum number of training steps.
    ///
    /// # Errors
    /// `TrainErr::InvalidThreshold` unless `threshold` is finite and in `(0, 1)`.
    pub fn new(threshold: f64, patience: usize) -> Result<Self> {
        let cfg = Self {
            threshold,
            patience,
            criterion: Criterion::default(),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    /// Parses a configuration from JSON. Absent fields take their defaults.
    ///
    /// # Errors
    /// `TrainErr::Json` on malformed input, `TrainErr::InvalidThreshold` if
    /// the threshold is out of range.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Replaces the improvement criterion.
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Returns the improvement threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the maximum number of training steps.
    pub fn patience(&self) -> usize {
        self.patience
    }

    /// Returns the improvement criterion.
    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    fn validate(&self) -> Result<()> {
        let t = self.threshold;

        if !t.is_finite() || t <= 0.0 || t >= 1.0 {
            return Err(TrainErr::InvalidThreshold { got: t });
        }

        Ok(())
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            patience: DEFAULT_PATIENCE,
            criterion: Criterion::Either,
        }
    }
}
