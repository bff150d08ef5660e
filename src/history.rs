use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainErr};

/// Name of the training loss metric.
pub const LOSS: &str = "loss";
/// Name of the validation loss metric.
pub const VAL_LOSS: &str = "val_loss";

/// Per-epoch metrics recorded by a training step.
///
/// Serializes as a plain object mapping each metric name to its values, one
/// per epoch, e.g. `{"loss": [0.9, 0.7], "val_loss": [1.1, 0.8]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    metrics: BTreeMap<String, Vec<f64>>,
}

impl History {
    /// Creates an empty `History`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a history from its JSON representation.
    ///
    /// # Arguments
    /// * `json` - A JSON object of metric name to list of numbers.
    ///
    /// # Errors
    /// `TrainErr::Json` if the input is not such an object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Appends one epoch's value to a metric, creating the metric if needed.
    ///
    /// # Arguments
    /// * `metric` - The metric's name.
    /// * `value` - The value measured on this epoch.
    pub fn record(&mut self, metric: &str, value: f64) {
        self.metrics
            .entry(metric.to_string())
            .or_default()
            .push(value);
    }

    /// Returns every recorded value of a metric, if present.
    pub fn metric(&self, metric: &str) -> Option<&[f64]> {
        self.metrics.get(metric).map(Vec::as_slice)
    }

    /// Returns the number of epochs recorded for the longest metric.
    pub fn epochs(&self) -> usize {
        self.metrics.values().map(Vec::len).max().unwrap_or_default()
    }

    /// Returns the value a metric had on the last recorded epoch.
    ///
    /// # Errors
    /// `TrainErr::MissingMetric` if the metric was never recorded and
    /// `TrainErr::EmptyMetric` if it has no values.
    pub fn last(&self, metric: &'static str) -> Result<f64> {
        let values = self
            .metric(metric)
            .ok_or(TrainErr::MissingMetric { metric })?;

        values
            .last()
            .copied()
            .ok_or(TrainErr::EmptyMetric { metric })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_framework_style_histories() {
        let json = r#"{"loss": [0.9, 0.5], "val_loss": [1.0, 0.6], "accuracy": [0.1, 0.4]}"#;
        let history = History::from_json(json).unwrap();

        assert_eq!(history.metric(LOSS).unwrap(), [0.9, 0.5]);
        assert_eq!(history.metric("accuracy").unwrap(), [0.1, 0.4]);
        assert_eq!(history.epochs(), 2);
        assert_eq!(history.last(VAL_LOSS).unwrap(), 0.6);
    }

    #[test]
    fn malformed_json_fails() {
        let err = History::from_json(r#"{"loss": "not a list"}"#).unwrap_err();
        assert!(matches!(err, TrainErr::Json(_)));
    }

    #[test]
    fn empty_metric_is_not_defaulted() {
        let history = History::from_json(r#"{"loss": [], "val_loss": [0.3]}"#).unwrap();

        assert!(matches!(
            history.last(LOSS),
            Err(TrainErr::EmptyMetric { metric: "loss" })
        ));
    }

    #[test]
    fn missing_metric_is_not_defaulted() {
        let history = History::new();

        assert!(matches!(
            history.last(LOSS),
            Err(TrainErr::MissingMetric { metric: "loss" })
        ));
        assert_eq!(history.epochs(), 0);
    }

    #[test]
    fn record_then_serialize() {
        let mut history = History::new();
        history.record(LOSS, 1.5);
        history.record(VAL_LOSS, 2.5);

        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, r#"{"loss":[1.5],"val_loss":[2.5]}"#);
    }
}
