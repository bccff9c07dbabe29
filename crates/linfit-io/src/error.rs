use linfit_core::MatrixError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("Column not found in header: {0}")]
    MissingColumn(String),

    #[error("Cannot parse {value:?} in column {column} at row {row}")]
    ParseValue {
        row: usize,
        column: String,
        value: String,
    },
}

pub type DataResult<T> = Result<T, DataError>;
