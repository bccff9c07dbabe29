use linfit_core::{MatrixError, MatrixResult};
use serde::{Deserialize, Serialize};

/// Hyper-parameters shared by every model.
///
/// Missing keys in a serialized document fall back to the defaults, so
/// `{"learningRate": 0.5}` is a complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrainingOptions {
    /// Initial step scale. The controller rescales it after every epoch.
    pub learning_rate: f64,
    /// Number of epochs.
    pub iterations: usize,
    /// Rows per mini-batch.
    pub batch_size: usize,
    /// Probability cutoff for class 1 (binary model only).
    pub decision_boundary: f64,
    /// Abort training when an epoch's loss is not finite.
    pub strict: bool,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        TrainingOptions {
            learning_rate: 0.1,
            iterations: 100,
            batch_size: 10,
            decision_boundary: 0.5,
            strict: false,
        }
    }
}

impl TrainingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_decision_boundary(mut self, decision_boundary: f64) -> Self {
        self.decision_boundary = decision_boundary;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// A zero batch size cannot be partitioned.
    pub fn validate(&self) -> MatrixResult<()> {
        if self.batch_size == 0 {
            return Err(MatrixError::InvalidOperation(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
