use linfit_core::{Float, Matrix, MatrixError, MatrixResult};
use std::collections::HashMap;

/// Maps string class names to contiguous indices (sorted by name).
#[derive(Debug, Clone, Default)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
    class_to_idx: HashMap<String, usize>,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit<S: AsRef<str>>(&mut self, labels: &[S]) {
        let mut unique: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        unique.sort();
        unique.dedup();
        self.class_to_idx = unique
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        self.classes = unique;
    }

    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> MatrixResult<Vec<usize>> {
        labels
            .iter()
            .map(|l| {
                self.class_to_idx.get(l.as_ref()).copied().ok_or_else(|| {
                    MatrixError::InvalidOperation(format!("unknown label '{}'", l.as_ref()))
                })
            })
            .collect()
    }

    pub fn inverse_transform(&self, indices: &[usize]) -> MatrixResult<Vec<String>> {
        indices
            .iter()
            .map(|&i| {
                self.classes.get(i).cloned().ok_or(MatrixError::IndexOutOfBounds {
                    index: i,
                    axis: 0,
                    size: self.classes.len(),
                })
            })
            .collect()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

/// One row per label, a single 1 in the label's column.
pub fn one_hot_encode<T: Float>(labels: &[usize], n_classes: usize) -> MatrixResult<Matrix<T>> {
    let mut data = vec![T::ZERO; labels.len() * n_classes];
    for (i, &cls) in labels.iter().enumerate() {
        if cls >= n_classes {
            return Err(MatrixError::IndexOutOfBounds {
                index: cls,
                axis: 1,
                size: n_classes,
            });
        }
        data[i * n_classes + cls] = T::ONE;
    }
    Matrix::new(data, labels.len(), n_classes)
}
