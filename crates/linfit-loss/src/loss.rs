use linfit_core::{Float, Matrix, MatrixError, MatrixResult};

fn check_same_shape<T: Float>(a: &Matrix<T>, b: &Matrix<T>) -> MatrixResult<()> {
    if a.shape() != b.shape() {
        return Err(MatrixError::ShapeMismatch {
            expected: a.shape(),
            got: b.shape(),
        });
    }
    Ok(())
}

/// Mean Squared Error: `mean((pred - target)²)` over every element.
pub fn mean_squared_error<T: Float>(pred: &Matrix<T>, target: &Matrix<T>) -> MatrixResult<T> {
    check_same_shape(pred, target)?;
    Ok(pred.sub(target)?.powi(2).mean_all())
}

/// Cross-entropy in matrix form:
///
/// `-(yᵗ·ln(p + ε) + (1 - y)ᵗ·ln(1 - p + ε)) / n`, read at entry `(0, 0)`.
///
/// For a single output column this is the usual binary cross-entropy. With
/// several columns the products are `k × k` and entry `(0, 0)` is the
/// cross-entropy of output unit 0 alone.
///
/// `epsilon = 0` leaves the logarithms unguarded: a probability of exactly
/// 0 or 1 yields an infinite or NaN cost.
pub fn cross_entropy<T: Float>(
    probs: &Matrix<T>,
    target: &Matrix<T>,
    epsilon: T,
) -> MatrixResult<T> {
    check_same_shape(probs, target)?;
    let n = T::from_usize(probs.rows());

    let term_one = target.t().matmul(&probs.add_scalar(epsilon).ln())?;
    let term_two = target
        .rsub_scalar(T::ONE)
        .t()
        .matmul(&probs.rsub_scalar(T::ONE).add_scalar(epsilon).ln())?;

    let total = term_one.add(&term_two)?;
    Ok(-(total.get(0, 0)? / n))
}
