use linfit_core::{Float, Matrix, MatrixError, MatrixResult};
use linfit_loss::cross_entropy;
use linfit_metrics::class_accuracy;
use linfit_optim::{Link, LossHistory, Objective, TrainingOptions};
use linfit_preprocessing::Standardizer;

use crate::model::{LinearModel, ModelParameters};

/// Variance substituted for constant feature columns before dividing.
pub const ZERO_VARIANCE_FILL: f64 = 1.0;

/// Added inside each logarithm of the recorded cost.
pub const LOG_EPSILON: f64 = 1e-7;

/// Softmax link for the updates, but the recorded cost is the sigmoid
/// cross-entropy of each output unit, read at unit 0.
///
/// The learning-rate controller reacts to this cost, so swapping in a true
/// softmax cross-entropy would change how training proceeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SigmoidProxyCrossEntropy;

impl<T: Float> Objective<T> for SigmoidProxyCrossEntropy {
    fn link(&self) -> Link {
        Link::Softmax
    }

    fn cost(&self, features: &Matrix<T>, labels: &Matrix<T>, weights: &Matrix<T>) -> MatrixResult<T> {
        let probs = features.matmul(weights)?.sigmoid();
        cross_entropy(&probs, labels, T::from_f64(LOG_EPSILON))
    }
}

/// Multi-class classifier over one-hot labels.
#[derive(Debug, Clone)]
pub struct MultinomialLogisticRegression<T: Float> {
    model: LinearModel<T, SigmoidProxyCrossEntropy>,
}

impl<T: Float> MultinomialLogisticRegression<T> {
    /// `labels` is `n × k` one-hot with at least two classes.
    pub fn new(features: &Matrix<T>, labels: &Matrix<T>, options: TrainingOptions) -> MatrixResult<Self> {
        if labels.cols() < 2 {
            return Err(MatrixError::DimensionMismatch(format!(
                "one-hot labels need at least 2 columns, got {}",
                labels.cols()
            )));
        }
        let standardizer = Standardizer::with_zero_variance_fill(T::from_f64(ZERO_VARIANCE_FILL));
        let model = LinearModel::new(features, labels, options, standardizer, SigmoidProxyCrossEntropy)?;
        Ok(MultinomialLogisticRegression { model })
    }

    pub fn train(&mut self) -> MatrixResult<()> {
        self.model.train()
    }

    /// Class probabilities, one row per observation summing to one.
    pub fn predict_proba(&self, observations: &Matrix<T>) -> MatrixResult<Matrix<T>> {
        self.model.activations(observations)
    }

    /// Most probable class index per row.
    pub fn predict(&self, observations: &Matrix<T>) -> MatrixResult<Vec<usize>> {
        Ok(self.predict_proba(observations)?.argmax_rows())
    }

    /// Fraction of rows whose predicted class matches the one-hot label.
    pub fn test(&self, test_features: &Matrix<T>, test_labels: &Matrix<T>) -> MatrixResult<f64> {
        let predictions = self.predict(test_features)?;
        class_accuracy(&test_labels.argmax_rows(), &predictions)
    }

    pub fn n_classes(&self) -> usize {
        self.model.weights().cols()
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use linfit_preprocessing::one_hot_encode;

    const CENTRES: [(f64, f64); 3] = [(0.0, 0.0), (6.0, 0.0), (0.0, 6.0)];

    fn clusters() -> (Vec<Vec<f64>>, Matrix<f64>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..45usize {
            let c = i % 3;
            let (cx, cy) = CENTRES[c];
            let dx = 0.3 * (((i * 7) % 5) as f64 - 2.0) / 2.0;
            let dy = 0.3 * (((i * 3) % 5) as f64 - 2.0) / 2.0;
            rows.push(vec![cx + dx, cy + dy]);
            let mut one_hot = vec![0.0; 3];
            one_hot[c] = 1.0;
            labels.push(one_hot);
        }
        (rows, Matrix::from_vec2d(&labels).unwrap())
    }

    fn options() -> TrainingOptions {
        TrainingOptions::new().with_learning_rate(0.5)
    }

    fn test_points() -> (Matrix<f64>, Vec<usize>) {
        let x = Matrix::from_vec2d(&[
            vec![0.2, -0.1],
            vec![6.1, 0.3],
            vec![-0.2, 5.8],
            vec![5.5, -0.4],
            vec![0.4, 6.3],
        ])
        .unwrap();
        (x, vec![0, 1, 2, 1, 2])
    }

    #[test]
    fn test_separable_clusters() {
        let (rows, y) = clusters();
        let x = Matrix::from_vec2d(&rows).unwrap();
        let mut model = MultinomialLogisticRegression::new(&x, &y, options()).unwrap();
        model.train().unwrap();
        assert_eq!(model.weights().shape(), (3, 3));
        assert_eq!(model.n_classes(), 3);

        let (x_test, expected) = test_points();
        let predicted = model.predict(&x_test).unwrap();
        assert_eq!(predicted, expected);
        assert!(predicted.iter().all(|&c| c < 3));

        let y_test: Matrix<f64> = one_hot_encode(&expected, 3).unwrap();
        assert_eq!(model.test(&x_test, &y_test).unwrap(), 1.0);
        assert_eq!(model.test(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (rows, y) = clusters();
        let x = Matrix::from_vec2d(&rows).unwrap();
        let mut model = MultinomialLogisticRegression::new(&x, &y, options()).unwrap();
        model.train().unwrap();

        let proba = model.predict_proba(&x).unwrap();
        for i in 0..proba.rows() {
            let total: f64 = proba.row(i).unwrap().iter().sum();
            assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_constant_column_stays_finite() {
        let (rows, y) = clusters();
        let with_constant: Vec<Vec<f64>> = rows
            .iter()
            .map(|r| vec![r[0], r[1], 5.0])
            .collect();
        let x = Matrix::from_vec2d(&with_constant).unwrap();
        let mut model = MultinomialLogisticRegression::new(&x, &y, TrainingOptions::default()).unwrap();
        model.train().unwrap();

        assert!(model.history().iter().all(f64::is_finite));
        assert!(model.weights().all_finite());
        // the constant column standardizes to zero and never moves its weights
        let row: Vec<f64> = model.weights().row(3).unwrap().to_vec();
        assert_eq!(row, vec![0.0; 3]);
    }

    #[test]
    fn test_recorded_cost_is_sigmoid_of_first_unit() {
        let x: Matrix<f64> = Matrix::from_vec2d(&[
            vec![0.0, 1.0],
            vec![4.0, 0.5],
            vec![1.0, 5.0],
            vec![0.5, 0.0],
            vec![5.0, 1.5],
            vec![0.0, 4.0],
        ])
        .unwrap();
        let y: Matrix<f64> = one_hot_encode(&[0, 1, 2, 0, 1, 2], 3).unwrap();
        let options = TrainingOptions::new()
            .with_learning_rate(0.5)
            .with_batch_size(3)
            .with_iterations(1);
        let mut model = MultinomialLogisticRegression::new(&x, &y, options).unwrap();
        model.train().unwrap();

        let params = model.parameters().unwrap();
        let w = model.weights();
        let n = x.rows() as f64;
        let mut sigmoid_cost = 0.0;
        let mut softmax_cost = 0.0;
        for i in 0..x.rows() {
            let z: Vec<f64> = (0..3)
                .map(|k| {
                    let mut acc = w.get(0, k).unwrap();
                    for j in 0..2 {
                        let v = (x.get(i, j).unwrap() - params.mean.get(0, j).unwrap())
                            / params.variance.get(0, j).unwrap().sqrt();
                        acc += v * w.get(j + 1, k).unwrap();
                    }
                    acc
                })
                .collect();
            let target = y.get(i, 0).unwrap();

            let p = 1.0 / (1.0 + (-z[0]).exp());
            sigmoid_cost += target * (p + LOG_EPSILON).ln()
                + (1.0 - target) * (1.0 - p + LOG_EPSILON).ln();

            let total: f64 = z.iter().map(|v| v.exp()).sum();
            let q = z[0].exp() / total;
            softmax_cost += target * (q + LOG_EPSILON).ln()
                + (1.0 - target) * (1.0 - q + LOG_EPSILON).ln();
        }
        sigmoid_cost = -sigmoid_cost / n;
        softmax_cost = -softmax_cost / n;

        let recorded = model.history().latest().unwrap();
        assert_abs_diff_eq!(recorded, sigmoid_cost, epsilon = 1e-12);
        assert_abs_diff_eq!(recorded, 0.576935016203637, epsilon = 1e-9);
        assert!((recorded - softmax_cost).abs() > 0.1);
    }

    #[test]
    fn test_untrained_model_predicts_first_class() {
        let (rows, y) = clusters();
        let x = Matrix::from_vec2d(&rows).unwrap();
        let model = MultinomialLogisticRegression::new(&x, &y, options()).unwrap();
        assert!(model.predict(&x).unwrap().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_needs_two_classes() {
        let (rows, _) = clusters();
        let x = Matrix::from_vec2d(&rows).unwrap();
        let y: Matrix<f64> = Matrix::zeros(45, 1);
        assert!(MultinomialLogisticRegression::new(&x, &y, options()).is_err());
    }
}
