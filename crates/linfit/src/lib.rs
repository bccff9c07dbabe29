//! # linfit
//!
//! Linear predictors trained by mini-batch gradient descent with an adaptive
//! learning rate.
//!
//! ## Modules
//!
//! - **core**: dense `Matrix<T>` with broadcasting, reductions and matmul
//! - **preprocessing**: fit-once standardization, one-hot and label encoding, train/test split
//! - **loss**: mean squared error and matrix-form cross-entropy
//! - **optim**: training options, gradient step, mini-batch trainer, loss history, learning-rate control
//! - **metrics**: R², exact-match and argmax accuracy
//! - **linear**: `LinearRegression`, `LogisticRegression`, `MultinomialLogisticRegression`
//! - **io**: CSV loading, JSON model and options files

/// Matrix engine.
pub use linfit_core as core;

/// Data preprocessing.
pub use linfit_preprocessing as preprocessing;

/// Loss functions.
pub use linfit_loss as loss;

/// Gradient descent.
pub use linfit_optim as optim;

/// Evaluation metrics.
pub use linfit_metrics as metrics;

/// Linear models.
pub use linfit_linear as linear;

/// I/O utilities.
pub use linfit_io as io;
