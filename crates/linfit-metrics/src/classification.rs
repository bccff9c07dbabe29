use linfit_core::{Float, Matrix, MatrixError, MatrixResult};

/// Fraction of positions where prediction and label are exactly equal.
pub fn accuracy<T: Float>(y_true: &Matrix<T>, y_pred: &Matrix<T>) -> MatrixResult<f64> {
    if y_true.shape() != y_pred.shape() {
        return Err(MatrixError::ShapeMismatch {
            expected: y_true.shape(),
            got: y_pred.shape(),
        });
    }
    let correct = y_true
        .data()
        .iter()
        .zip(y_pred.data())
        .filter(|(t, p)| t == p)
        .count();
    Ok(correct as f64 / y_true.data().len() as f64)
}

/// Fraction of rows whose predicted class index equals the true one.
pub fn class_accuracy(y_true: &[usize], y_pred: &[usize]) -> MatrixResult<f64> {
    if y_true.len() != y_pred.len() {
        return Err(MatrixError::DimensionMismatch(format!(
            "{} labels but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}
