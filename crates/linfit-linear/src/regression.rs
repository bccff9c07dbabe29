use linfit_core::{Float, Matrix, MatrixError, MatrixResult};
use linfit_loss::mean_squared_error;
use linfit_metrics::r2_score;
use linfit_optim::{Link, LossHistory, Objective, TrainingOptions};
use linfit_preprocessing::Standardizer;

use crate::model::{LinearModel, ModelParameters};

/// Identity link scored by mean squared error over the training set.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredError;

impl<T: Float> Objective<T> for SquaredError {
    fn link(&self) -> Link {
        Link::Identity
    }

    fn cost(&self, features: &Matrix<T>, labels: &Matrix<T>, weights: &Matrix<T>) -> MatrixResult<T> {
        mean_squared_error(&features.matmul(weights)?, labels)
    }
}

/// Linear regression on a continuous target, fitted by mini-batch gradient
/// descent.
///
/// Constant feature columns are not guarded: their standardized values are
/// non-finite and so is everything trained on them.
#[derive(Debug, Clone)]
pub struct LinearRegression<T: Float> {
    model: LinearModel<T, SquaredError>,
}

impl<T: Float> LinearRegression<T> {
    /// `labels` must have exactly one column.
    pub fn new(features: &Matrix<T>, labels: &Matrix<T>, options: TrainingOptions) -> MatrixResult<Self> {
        if labels.cols() != 1 {
            return Err(MatrixError::DimensionMismatch(format!(
                "continuous target needs 1 label column, got {}",
                labels.cols()
            )));
        }
        let model = LinearModel::new(features, labels, options, Standardizer::new(), SquaredError)?;
        Ok(LinearRegression { model })
    }

    pub fn train(&mut self) -> MatrixResult<()> {
        self.model.train()
    }

    /// One predicted value per row, `n × 1`.
    pub fn predict(&self, observations: &Matrix<T>) -> MatrixResult<Matrix<T>> {
        self.model.activations(observations)
    }

    /// R² of the predictions against `test_labels`.
    pub fn test(&self, test_features: &Matrix<T>, test_labels: &Matrix<T>) -> MatrixResult<f64> {
        let predictions = self.predict(test_features)?;
        r2_score(test_labels, &predictions)
    }

    pub fn weights(&self) -> &Matrix<T> {
        self.model.weights()
    }

    pub fn history(&self) -> &LossHistory {
        self.model.history()
    }

    pub fn learning_rate(&self) -> f64 {
        self.model.learning_rate()
    }

    pub fn parameters(&self) -> MatrixResult<ModelParameters<T>> {
        self.model.parameters()
    }
}
