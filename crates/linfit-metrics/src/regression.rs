use linfit_core::{Float, Matrix, MatrixError, MatrixResult};

/// R² (coefficient of determination): `1 - SS_res / SS_tot`.
///
/// Not guarded: when every true value is identical `SS_tot` is zero and the
/// result is non-finite.
pub fn r2_score<T: Float>(y_true: &Matrix<T>, y_pred: &Matrix<T>) -> MatrixResult<f64> {
    if y_true.shape() != y_pred.shape() {
        return Err(MatrixError::ShapeMismatch {
            expected: y_true.shape(),
            got: y_pred.shape(),
        });
    }

    let ss_res = y_true.sub(y_pred)?.powi(2).sum_all().to_f64();
    let mean = y_true.mean_all();
    let ss_tot = y_true.add_scalar(-mean).powi(2).sum_all().to_f64();

    Ok(1.0 - ss_res / ss_tot)
}
