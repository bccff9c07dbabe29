use linfit_core::{Float, Matrix, MatrixError, MatrixResult};
use linfit_optim::{GradientDescent, LossHistory, Objective, TrainingOptions};
use linfit_preprocessing::{StandardizationParams, Standardizer};
use log::debug;
use serde::{Deserialize, Serialize};

/// Learned state of a trained model, in a form that can be written out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float", rename_all = "camelCase")]
pub struct ModelParameters<T: Float> {
    /// `(n_features + 1) × k`, intercept first.
    pub weights: Matrix<T>,
    pub mean: Matrix<T>,
    pub variance: Matrix<T>,
    /// Options as they stand now, including the adapted learning rate.
    pub options: TrainingOptions,
}

/// Shared core of every variant: training data standardized once at
/// construction, the solver, and the objective that picks link and cost.
#[derive(Debug, Clone)]
pub struct LinearModel<T: Float, O: Objective<T>> {
    standardizer: Standardizer<T>,
    features: Matrix<T>,
    labels: Matrix<T>,
    solver: GradientDescent<T>,
    objective: O,
}

impl<T: Float, O: Objective<T>> LinearModel<T, O> {
    /// Fits `standardizer` on `features` and sizes the weights from the
    /// label column count.
    pub fn new(
        features: &Matrix<T>,
        labels: &Matrix<T>,
        options: TrainingOptions,
        mut standardizer: Standardizer<T>,
        objective: O,
    ) -> MatrixResult<Self> {
        if features.rows() != labels.rows() {
            return Err(MatrixError::DimensionMismatch(format!(
                "features have {} rows but labels have {}",
                features.rows(),
                labels.rows()
            )));
        }
        if features.is_empty() {
            return Err(MatrixError::EmptyMatrix);
        }

        let processed = standardizer.process(features)?;
        let solver = GradientDescent::new(processed.cols(), labels.cols(), options);
        debug!(
            "model weights initialised to {} x {}",
            processed.cols(),
            labels.cols()
        );

        Ok(LinearModel {
            standardizer,
            features: processed,
            labels: labels.clone(),
            solver,
            objective,
        })
    }

    pub fn train(&mut self) -> MatrixResult<()> {
        self.solver
            .train(&self.features, &self.labels, &self.objective)
    }

    /// Link output for raw observations, standardized against the training
    /// distribution.
    pub fn activations(&self, observations: &Matrix<T>) -> MatrixResult<Matrix<T>> {
        let processed = self.standardizer.transform(observations)?;
        let z = processed.matmul(self.solver.weights())?;
        Ok(self.objective.link().apply(z))
    }

    pub fn weights(&self) -> &Matrix<T> {
        self.solver.weights()
    }

    pub fn history(&self) -> &LossHistory {
        self.solver.history()
    }

    pub fn options(&self) -> &TrainingOptions {
        self.solver.options()
    }

    pub fn learning_rate(&self) -> f64 {
        self.solver.learning_rate()
    }

    pub fn standardization(&self) -> Option<&StandardizationParams<T>> {
        self.standardizer.params()
    }

    pub fn parameters(&self) -> MatrixResult<ModelParameters<T>> {
        let params = self.standardizer.params().ok_or(MatrixError::NotFitted)?;
        Ok(ModelParameters {
            weights: self.solver.weights().clone(),
            mean: params.mean.clone(),
            variance: params.variance.clone(),
            options: self.solver.options().clone(),
        })
    }
}
