use linfit_core::{Float, Matrix, MatrixError, MatrixResult};
use linfit_loss::cross_entropy;
use linfit_metrics::accuracy;
use linfit_optim::{Link, LossHistory, Objective, TrainingOptions};
use linfit_preprocessing::Standardizer;

use crate::model::{LinearModel, ModelParameters};

/// Sigmoid link scored by binary cross-entropy.
///
/// The logarithms carry no epsilon: a probability that saturates to exactly
/// 0 or 1 makes the recorded loss non-finite.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCrossEntropy;

impl<T: Float> Objective<T> for BinaryCrossEntropy {
    fn link(&self) -> Link {
        Link::Sigmoid
    }

    fn cost(&self, features: &Matrix<T>, labels: &Matrix<T>, weights: &Matrix<T>) -> MatrixResult<T> {
        let probs = features.matmul(weights)?.sigmoid();
        cross_entropy(&probs, labels, T::ZERO)
    }
}

/// Binary classifier over 0/1 labels.
#[derive(Debug, Clone)]
pub struct LogisticRegression<T: Float> {
    model: LinearModel<T, BinaryCrossEntropy>,
}

impl<T: Float> LogisticRegression<T> {
    /// `labels` must be a single column of 0/1 values.
    pub fn new(features: &Matrix<T>, labels: &Matrix<T>, options: TrainingOptions) -> MatrixResult<Self> {
        if labels.cols() != 1 {
            return Err(MatrixError::DimensionMismatch(format!(
                "binary target needs 1 label column, got {}",
                labels.cols()
            )));
        }
        let model = LinearModel::new(features, labels, options, Standardizer::new(), BinaryCrossEntropy)?;
        Ok(LogisticRegression { model })
    }

    pub fn train(&mut self) -> MatrixResult<()> {
        self.model.train()
    }

    /// Probability of class 1 per row.
    pub fn predict_proba(&self, observations: &Matrix<T>) -> MatrixResult<Matrix<T>> {
        self.model.activations(observations)
    }

    /// 1 where the probability is strictly above the decision boundary, else 0.
    pub fn predict(&self, observations: &Matrix<T>) -> MatrixResult<Matrix<T>> {
        let boundary = T::from_f64(self.model.options().decision_boundary);
        Ok(self.predict_proba(observations)?.gt_scalar(boundary))
    }

    /// Fraction of rows predicted exactly right.
    pub fn test(&self, test_features: &Matrix<T>, test_labels: &Matrix<T>) -> MatrixResult<f64> {
        let predictions = self.predict(test_features)?;
        accuracy(test_labels, &predictions)
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
