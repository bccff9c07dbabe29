use thiserror::Error;

/// Core error type for matrix operations and model state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatrixError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("Index out of bounds: index {index} for axis {axis} with size {size}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Empty matrix")]
    EmptyMatrix,

    #[error("Standardization parameters have not been fitted")]
    NotFitted,

    #[error("Training diverged at epoch {epoch}: loss is {loss}")]
    Diverged { epoch: usize, loss: f64 },
}

pub type MatrixResult<T> = Result<T, MatrixError>;
