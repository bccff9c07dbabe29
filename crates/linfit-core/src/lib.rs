pub mod dtype;
pub mod error;
pub mod matrix;

pub use dtype::Float;
pub use error::{MatrixError, MatrixResult};
pub use matrix::Matrix;
