use linfit_core::{Float, Matrix, MatrixError, MatrixResult};
use log::{debug, info, warn};

use crate::options::TrainingOptions;
use crate::schedule::{AdaptiveLearningRate, LossHistory};

/// Maps the linear combination `X·W` into the output space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Identity,
    Sigmoid,
    /// Row-wise softmax.
    Softmax,
}

impl Link {
    pub fn apply<T: Float>(self, z: Matrix<T>) -> Matrix<T> {
        match self {
            Link::Identity => z,
            Link::Sigmoid => z.sigmoid(),
            Link::Softmax => z.softmax_rows(),
        }
    }
}

/// The per-model pieces the trainer is parameterized by.
///
/// `link` must be the canonical link of the loss the model minimises
/// (identity/squared error, sigmoid or softmax/cross-entropy): only then is
/// `Xᵗ·(L(X·W) - Y) / n` the exact gradient used by [`step`].
pub trait Objective<T: Float> {
    fn link(&self) -> Link;

    /// Scalar loss over the full training set, recorded once per epoch.
    fn cost(&self, features: &Matrix<T>, labels: &Matrix<T>, weights: &Matrix<T>) -> MatrixResult<T>;
}

/// One mini-batch update. Returns the new weights; the old ones are untouched.
pub fn step<T: Float>(
    features: &Matrix<T>,
    labels: &Matrix<T>,
    weights: &Matrix<T>,
    learning_rate: T,
    link: Link,
) -> MatrixResult<Matrix<T>> {
    let guesses = link.apply(features.matmul(weights)?);
    let differences = guesses.sub(labels)?;
    let gradient = features
        .t()
        .matmul(&differences)?
        .div_scalar(T::from_usize(features.rows()));
    weights.sub(&gradient.mul_scalar(learning_rate))
}

/// Full batches per epoch. Trailing rows that do not fill a batch are skipped.
pub fn batch_count(n_samples: usize, batch_size: usize) -> usize {
    n_samples / batch_size
}

/// Mini-batch gradient descent over a weight matrix of shape
/// `n_params × n_outputs`, starting from zeros.
///
/// Batches are contiguous and visited in the same order every epoch; there is
/// no reshuffling. After each epoch the loss over the whole training set is
/// recorded and the learning rate adjusted from the loss trend.
#[derive(Debug, Clone)]
pub struct GradientDescent<T: Float> {
    weights: Matrix<T>,
    options: TrainingOptions,
    history: LossHistory,
    controller: AdaptiveLearningRate,
}

impl<T: Float> GradientDescent<T> {
    pub fn new(n_params: usize, n_outputs: usize, options: TrainingOptions) -> Self {
        GradientDescent {
            weights: Matrix::zeros(n_params, n_outputs),
            options,
            history: LossHistory::new(),
            controller: AdaptiveLearningRate::new(),
        }
    }

    pub fn weights(&self) -> &Matrix<T> {
        &self.weights
    }

    pub fn options(&self) -> &TrainingOptions {
        &self.options
    }

    /// Current step size, after any adjustments made so far.
    pub fn learning_rate(&self) -> f64 {
        self.options.learning_rate
    }

    pub fn history(&self) -> &LossHistory {
        &self.history
    }

    /// Run `options.iterations` epochs. Calling it again continues from the
    /// current weights, learning rate and history.
    pub fn train<O: Objective<T>>(
        &mut self,
        features: &Matrix<T>,
        labels: &Matrix<T>,
        objective: &O,
    ) -> MatrixResult<()> {
        self.options.validate()?;
        self.check_shapes(features, labels)?;

        let n_samples = features.rows();
        let batch_size = self.options.batch_size;
        let batches = batch_count(n_samples, batch_size);
        if batches == 0 {
            warn!(
                "batch size {} exceeds {} samples: no updates will run",
                batch_size, n_samples
            );
        }
        info!(
            "training {} epochs, {} batches of {} ({} trailing rows unused)",
            self.options.iterations,
            batches,
            batch_size,
            n_samples - batches * batch_size
        );

        let link = objective.link();
        for epoch in 0..self.options.iterations {
            for b in 0..batches {
                let start = b * batch_size;
                let feature_slice = features.slice_rows(start, start + batch_size)?;
                let label_slice = labels.slice_rows(start, start + batch_size)?;
                self.weights = step(
                    &feature_slice,
                    &label_slice,
                    &self.weights,
                    T::from_f64(self.options.learning_rate),
                    link,
                )?;
            }

            let loss = objective.cost(features, labels, &self.weights)?.to_f64();
            self.history.record(loss);
            debug!(
                "epoch {}: loss {:.6}, learning rate {:.6}",
                epoch, loss, self.options.learning_rate
            );

            if !loss.is_finite() {
                if self.options.strict {
                    return Err(MatrixError::Diverged { epoch, loss });
                }
                warn!("epoch {}: loss is {}", epoch, loss);
            }

            self.options.learning_rate = self
                .controller
                .next_rate(self.options.learning_rate, &self.history);
        }

        if let Some(loss) = self.history.latest() {
            info!(
                "training finished: loss {:.6}, learning rate {:.6}",
                loss, self.options.learning_rate
            );
        }
        Ok(())
    }

    fn check_shapes(&self, features: &Matrix<T>, labels: &Matrix<T>) -> MatrixResult<()> {
        if features.rows() != labels.rows() {
            return Err(MatrixError::DimensionMismatch(format!(
                "features have {} rows but labels have {}",
                features.rows(),
                labels.rows()
            )));
        }
        let expected = self.weights.shape();
        let got = (features.cols(), labels.cols());
        if expected != got {
            return Err(MatrixError::ShapeMismatch { expected, got });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Identity link with mean squared error.
    struct Squared;

    impl Objective<f64> for Squared {
        fn link(&self) -> Link {
            Link::Identity
        }

        fn cost(&self, x: &Matrix<f64>, y: &Matrix<f64>, w: &Matrix<f64>) -> MatrixResult<f64> {
            Ok(x.matmul(w)?.sub(y)?.powi(2).mean_all())
        }
    }

    /// `[1, i]` rows with label `2i + 1`.
    fn line(n: usize) -> (Matrix<f64>, Matrix<f64>) {
        let mut x = Vec::with_capacity(n * 2);
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let v = i as f64 / n as f64;
            x.extend_from_slice(&[1.0, v]);
            y.push(2.0 * v + 1.0);
        }
        (Matrix::new(x, n, 2).unwrap(), Matrix::column(&y))
    }

    #[test]
    fn test_step_matches_closed_form() {
        let x: Matrix<f64> = Matrix::from_vec2d(&[vec![1.0, 2.0], vec![1.0, 4.0]]).unwrap();
        let y: Matrix<f64> = Matrix::column(&[3.0, 5.0]);
        let w: Matrix<f64> = Matrix::zeros(2, 1);

        // differences = -y, gradient = Xᵗ(-y)/2 = [-4, -13]
        let next = step(&x, &y, &w, 0.1, Link::Identity).unwrap();
        assert_abs_diff_eq!(next.data()[0], 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(next.data()[1], 1.3, epsilon = 1e-12);
        assert_eq!(w, Matrix::zeros(2, 1));
    }

    #[test]
    fn test_sigmoid_step_at_zero_weights() {
        let x: Matrix<f64> = Matrix::from_vec2d(&[vec![1.0, 1.0], vec![1.0, -1.0]]).unwrap();
        let y: Matrix<f64> = Matrix::column(&[1.0, 0.0]);
        let w: Matrix<f64> = Matrix::zeros(2, 1);

        // guesses are all 0.5: differences = [-0.5, 0.5]
        let next = step(&x, &y, &w, 1.0, Link::Sigmoid).unwrap();
        assert_abs_diff_eq!(next.data()[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(next.data()[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_softmax_step_keeps_shape() {
        let x: Matrix<f64> = Matrix::from_vec2d(&[vec![1.0, 0.5], vec![1.0, -0.5]]).unwrap();
        let y: Matrix<f64> = Matrix::from_vec2d(&[vec![1.0, 0.0, 0.0], vec![0.0, 0.0, 1.0]]).unwrap();
        let w: Matrix<f64> = Matrix::zeros(2, 3);
        let next = step(&x, &y, &w, 0.5, Link::Softmax).unwrap();
        assert_eq!(next.shape(), (2, 3));
        // intercept row moves toward the observed class frequencies
        assert!(next.get(0, 0).unwrap() > 0.0);
        assert!(next.get(0, 1).unwrap() < 0.0);
    }

    #[test]
    fn test_batch_count_floors() {
        assert_eq!(batch_count(23, 10), 2);
        assert_eq!(batch_count(20, 10), 2);
        assert_eq!(batch_count(5, 10), 0);
    }

    #[test]
    fn test_history_length_matches_epochs() {
        let (x, y) = line(30);
        let mut gd = GradientDescent::new(2, 1, TrainingOptions::new().with_iterations(7));
        gd.train(&x, &y, &Squared).unwrap();
        assert_eq!(gd.history().len(), 7);

        let last = gd.history().latest().unwrap();
        let expected = Squared.cost(&x, &y, gd.weights()).unwrap();
        assert_eq!(last, expected);

        gd.train(&x, &y, &Squared).unwrap();
        assert_eq!(gd.history().len(), 14);
    }

    #[test]
    fn test_weights_shape_is_stable() {
        let (x, y) = line(30);
        let mut gd = GradientDescent::new(2, 1, TrainingOptions::new().with_iterations(3));
        gd.train(&x, &y, &Squared).unwrap();
        assert_eq!(gd.weights().shape(), (2, 1));
    }

    #[test]
    fn test_converges_on_exact_line() {
        let (x, y) = line(40);
        let mut gd = GradientDescent::new(2, 1, TrainingOptions::new().with_learning_rate(0.5));
        gd.train(&x, &y, &Squared).unwrap();
        assert!(gd.history().latest().unwrap() < gd.history().get(99).unwrap());
    }

    #[test]
    fn test_oversized_batch_runs_no_updates() {
        let (x, y) = line(5);
        let mut gd = GradientDescent::new(2, 1, TrainingOptions::new().with_iterations(4));
        gd.train(&x, &y, &Squared).unwrap();
        assert_eq!(gd.weights(), &Matrix::zeros(2, 1));
        assert_eq!(gd.history().len(), 4);
        let untrained = Squared.cost(&x, &y, &Matrix::zeros(2, 1)).unwrap();
        assert!(gd.history().iter().all(|l| l == untrained));
        // a flat loss is not worse, so each epoch after the first grows the rate
        assert_abs_diff_eq!(gd.learning_rate(), 0.1 * 1.05f64.powi(3), epsilon = 1e-12);
    }

    #[test]
    fn test_trailing_rows_never_update_weights() {
        let (x, y) = line(23);
        let order: Vec<usize> = (0..20).chain([22, 20, 21]).collect();
        let x_perm = x.select_rows(&order).unwrap();
        let y_perm = y.select_rows(&order).unwrap();

        let opts = TrainingOptions::new().with_iterations(20);
        let mut a = GradientDescent::new(2, 1, opts.clone());
        let mut b = GradientDescent::new(2, 1, opts);
        a.train(&x, &y, &Squared).unwrap();
        b.train(&x_perm, &y_perm, &Squared).unwrap();

        for (wa, wb) in a.weights().data().iter().zip(b.weights().data()) {
            assert_abs_diff_eq!(*wa, *wb, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_trailing_row_values_never_update_weights() {
        let (x, y) = line(23);
        let mut other_x = x.slice_rows(0, 20).unwrap().data().to_vec();
        other_x.extend_from_slice(&[1.0, 50.0, 1.0, -7.0, 1.0, 3.5]);
        let other_x = Matrix::new(other_x, 23, 2).unwrap();
        let mut other_y = y.slice_rows(0, 20).unwrap().data().to_vec();
        other_y.extend_from_slice(&[-100.0, 42.0, 0.0]);
        let other_y = Matrix::column(&other_y);

        // the rate only reacts from the second recorded loss on, so two
        // epochs run at the same rate however different the tail is
        let opts = TrainingOptions::new().with_iterations(2);
        let mut a = GradientDescent::new(2, 1, opts.clone());
        let mut b = GradientDescent::new(2, 1, opts);
        a.train(&x, &y, &Squared).unwrap();
        b.train(&other_x, &other_y, &Squared).unwrap();

        assert_eq!(a.weights(), b.weights());
        // the tail still counts towards the recorded loss
        assert!(a.history().latest().unwrap() < b.history().latest().unwrap());
    }

    #[test]
    fn test_strict_mode_reports_divergence() {
        struct Broken;
        impl Objective<f64> for Broken {
            fn link(&self) -> Link {
                Link::Identity
            }
            fn cost(&self, _: &Matrix<f64>, _: &Matrix<f64>, _: &Matrix<f64>) -> MatrixResult<f64> {
                Ok(f64::NAN)
            }
        }

        let (x, y) = line(20);
        let mut lenient = GradientDescent::new(2, 1, TrainingOptions::new().with_iterations(3));
        lenient.train(&x, &y, &Broken).unwrap();
        assert_eq!(lenient.history().len(), 3);

        let mut strict =
            GradientDescent::new(2, 1, TrainingOptions::new().with_iterations(3).with_strict(true));
        let err = strict.train(&x, &y, &Broken).unwrap_err();
        assert!(matches!(err, MatrixError::Diverged { epoch: 0, .. }));
        assert_eq!(strict.history().len(), 1);
    }

    #[test]
    fn test_shape_errors() {
        let (x, y) = line(20);
        let mut gd: GradientDescent<f64> = GradientDescent::new(3, 1, TrainingOptions::new());
        assert!(gd.train(&x, &y, &Squared).is_err());

        let mut gd: GradientDescent<f64> = GradientDescent::new(2, 1, TrainingOptions::new());
        let short = y.slice_rows(0, 10).unwrap();
        assert!(gd.train(&x, &short, &Squared).is_err());

        let mut gd: GradientDescent<f64> =
            GradientDescent::new(2, 1, TrainingOptions::new().with_batch_size(0));
        assert!(gd.train(&x, &y, &Squared).is_err());
    }
}
