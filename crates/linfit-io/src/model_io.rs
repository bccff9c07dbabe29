use std::fs;
use std::path::Path;

use linfit_optim::TrainingOptions;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::DataResult;

/// Save any serializable model state (usually `ModelParameters`) as pretty JSON.
pub fn save_model<S: Serialize, P: AsRef<Path>>(value: &S, path: P) -> DataResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path.as_ref(), json)?;
    debug!("saved model to {}", path.as_ref().display());
    Ok(())
}

/// Load model state written by [`save_model`].
pub fn load_model<D: DeserializeOwned, P: AsRef<Path>>(path: P) -> DataResult<D> {
    let json = fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&json)?)
}

/// Read training options from JSON. Missing keys take their defaults.
pub fn load_options<P: AsRef<Path>>(path: P) -> DataResult<TrainingOptions> {
    let json = fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use linfit_core::Matrix;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_matrix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weights.json");
        let weights: Matrix<f64> = Matrix::from_vec2d(&[vec![0.5, -1.0], vec![2.0, 0.25]]).unwrap();

        save_model(&weights, &path).unwrap();
        let loaded: Matrix<f64> = load_model(&path).unwrap();
        assert_eq!(loaded, weights);
    }

    #[test]
    fn test_partial_options_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("options.json");
        fs::write(&path, r#"{ "learningRate": 0.5, "batchSize": 25 }"#).unwrap();

        let options = load_options(&path).unwrap();
        assert_eq!(options.learning_rate, 0.5);
        assert_eq!(options.batch_size, 25);
        assert_eq!(options.iterations, 100);
        assert_eq!(options.decision_boundary, 0.5);
        assert!(!options.strict);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = load_options(dir.path().join("absent.json"));
        assert!(matches!(result, Err(DataError::Io(_))));
    }

    #[test]
    fn test_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ learningRate: }").unwrap();
        assert!(matches!(load_options(&path), Err(DataError::Json(_))));
    }
}
