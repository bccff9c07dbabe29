use linfit_core::{Float, Matrix, MatrixError, MatrixResult};
use log::{debug, warn};

/// Column-wise mean and population variance of the training features.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardizationParams<T: Float> {
    /// `1 × n_features`
    pub mean: Matrix<T>,
    /// `1 × n_features`
    pub variance: Matrix<T>,
}

impl<T: Float> StandardizationParams<T> {
    /// Compute moments over all rows. With `zero_variance_fill`, any column
    /// whose variance is exactly zero gets the fill value instead.
    pub fn compute(features: &Matrix<T>, zero_variance_fill: Option<T>) -> Self {
        let mean = features.mean_axis0();
        let variance = features.var_axis0();
        let variance = match zero_variance_fill {
            Some(fill) => variance.apply(|v| if v == T::ZERO { fill } else { v }),
            None => variance,
        };
        StandardizationParams { mean, variance }
    }
}

/// Standardizes features against the first matrix it ever sees and prepends
/// the intercept column.
///
/// The parameters are fitted once; every later call (test sets, new
/// observations) is scaled with the training distribution, not its own.
#[derive(Debug, Clone)]
pub struct Standardizer<T: Float> {
    params: Option<StandardizationParams<T>>,
    zero_variance_fill: Option<T>,
}

impl<T: Float> Standardizer<T> {
    /// A standardizer that divides by the raw variance. A constant column
    /// produces non-finite values.
    pub fn new() -> Self {
        Standardizer {
            params: None,
            zero_variance_fill: None,
        }
    }

    /// A standardizer that replaces zero variances with `fill` before dividing.
    pub fn with_zero_variance_fill(fill: T) -> Self {
        Standardizer {
            params: None,
            zero_variance_fill: Some(fill),
        }
    }

    pub fn params(&self) -> Option<&StandardizationParams<T>> {
        self.params.as_ref()
    }

    /// Compute parameters from `features` unless already fitted.
    pub fn fit(&mut self, features: &Matrix<T>) -> &StandardizationParams<T> {
        let fill = self.zero_variance_fill;
        self.params.get_or_insert_with(|| {
            let params = StandardizationParams::compute(features, fill);
            debug!(
                "fitted standardization over {} rows x {} columns",
                features.rows(),
                features.cols()
            );
            if fill.is_none() && params.variance.data().iter().any(|&v| v == T::ZERO) {
                warn!("constant feature column: standardized values will be non-finite");
            }
            params
        })
    }

    /// `(x - mean) / sqrt(variance)`, broadcast across rows.
    pub fn standardize(&self, features: &Matrix<T>) -> MatrixResult<Matrix<T>> {
        let params = self.params.as_ref().ok_or(MatrixError::NotFitted)?;
        features
            .sub(&params.mean)?
            .div(&params.variance.sqrt())
    }

    /// Standardize and prepend a column of ones.
    pub fn transform(&self, features: &Matrix<T>) -> MatrixResult<Matrix<T>> {
        let standardized = self.standardize(features)?;
        let ones = Matrix::ones(standardized.rows(), 1);
        Matrix::hstack(&[&ones, &standardized])
    }

    /// Fit on first use, then transform.
    pub fn process(&mut self, features: &Matrix<T>) -> MatrixResult<Matrix<T>> {
        self.fit(features);
        self.transform(features)
    }
}

impl<T: Float> Default for Standardizer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> Matrix<f64> {
        Matrix::from_vec2d(&[
            vec![1.0, 200.0],
            vec![3.0, 400.0],
            vec![5.0, 900.0],
            vec![7.0, 100.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_training_features_have_zero_mean_unit_variance() {
        let x = sample();
        let mut scaler = Standardizer::new();
        let processed = scaler.process(&x).unwrap();
        assert_eq!(processed.shape(), (4, 3));
        assert_eq!(processed.col(0).unwrap(), vec![1.0; 4]);

        let standardized = scaler.standardize(&x).unwrap();
        let mean = standardized.mean_axis0();
        let var = standardized.var_axis0();
        for j in 0..2 {
            assert_abs_diff_eq!(mean.data()[j], 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(var.data()[j], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_fit_happens_once() {
        let mut scaler = Standardizer::new();
        scaler.process(&sample()).unwrap();
        let before = scaler.params().cloned().unwrap();

        let other: Matrix<f64> = Matrix::from_vec2d(&[vec![100.0, -5.0], vec![300.0, 5.0]]).unwrap();
        let processed = scaler.process(&other).unwrap();
        assert_eq!(scaler.params().unwrap(), &before);

        // scaled against the training mean (4) and variance (5)
        assert_abs_diff_eq!(processed.get(0, 1).unwrap(), 96.0 / 5f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_variance_fill() {
        let x: Matrix<f64> = Matrix::from_vec2d(&[vec![1.0, 4.0], vec![3.0, 4.0]]).unwrap();

        let mut guarded = Standardizer::with_zero_variance_fill(1.0);
        let out = guarded.process(&x).unwrap();
        assert!(out.all_finite());
        assert_eq!(out.col(2).unwrap(), vec![0.0, 0.0]);

        let mut raw = Standardizer::new();
        let out = raw.process(&x).unwrap();
        assert!(!out.all_finite());
    }

    #[test]
    fn test_transform_requires_fit() {
        let scaler: Standardizer<f64> = Standardizer::new();
        assert_eq!(scaler.transform(&sample()), Err(MatrixError::NotFitted));
    }

    #[test]
    fn test_column_count_must_match() {
        let mut scaler = Standardizer::new();
        scaler.process(&sample()).unwrap();
        let narrow: Matrix<f64> = Matrix::column(&[1.0, 2.0]);
        assert!(scaler.transform(&narrow).is_err());
    }
}
