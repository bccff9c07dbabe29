use linfit_core::{Float, Matrix, MatrixError, MatrixResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row permutation shared by features and labels. Seeded when `seed` is set.
pub fn shuffled_indices(n: usize, seed: Option<u64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    indices.shuffle(&mut rng);
    indices
}

/// Shuffle row-aligned features and labels, then hold out
/// `round(n * test_ratio)` rows for testing.
///
/// Returns `(x_train, x_test, y_train, y_test)`.
pub fn train_test_split<T: Float>(
    x: &Matrix<T>,
    y: &Matrix<T>,
    test_ratio: f64,
    seed: Option<u64>,
) -> MatrixResult<(Matrix<T>, Matrix<T>, Matrix<T>, Matrix<T>)> {
    let n = x.rows();
    if y.rows() != n {
        return Err(MatrixError::DimensionMismatch(format!(
            "features have {} rows but labels have {}",
            n,
            y.rows()
        )));
    }
    if !(0.0..=1.0).contains(&test_ratio) {
        return Err(MatrixError::InvalidOperation(format!(
            "test ratio must lie in [0, 1], got {}",
            test_ratio
        )));
    }

    let indices = shuffled_indices(n, seed);
    let test_size = (n as f64 * test_ratio).round() as usize;
    let (test_idx, train_idx) = indices.split_at(test_size);

    Ok((
        x.select_rows(train_idx)?,
        x.select_rows(test_idx)?,
        y.select_rows(train_idx)?,
        y.select_rows(test_idx)?,
    ))
}
