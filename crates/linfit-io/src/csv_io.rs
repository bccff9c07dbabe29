use std::collections::HashMap;
use std::path::Path;

use linfit_core::Matrix;
use linfit_preprocessing::shuffled_indices;
use log::{debug, warn};

use crate::error::{DataError, DataResult};

/// Turns a raw cell into a number, e.g. `"TRUE"` into `1.0`.
pub type Converter = Box<dyn Fn(&str) -> f64>;

/// Column selection and post-processing for [`load_csv`].
#[derive(Default)]
pub struct CsvOptions {
    /// Feature columns, in output order.
    pub data_columns: Vec<String>,
    /// Label columns, in output order.
    pub label_columns: Vec<String>,
    /// Per-column converters applied instead of numeric parsing.
    pub converters: HashMap<String, Converter>,
    pub shuffle: bool,
    /// Seed for the shuffle. `None` draws from entropy.
    pub seed: Option<u64>,
    /// Number of leading rows (after shuffling) held out as the test set.
    pub split_test: Option<usize>,
}

impl CsvOptions {
    pub fn new(data_columns: &[&str], label_columns: &[&str]) -> Self {
        CsvOptions {
            data_columns: data_columns.iter().map(|c| c.to_string()).collect(),
            label_columns: label_columns.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_converter<F>(mut self, column: &str, converter: F) -> Self
    where
        F: Fn(&str) -> f64 + 'static,
    {
        self.converters.insert(column.to_string(), Box::new(converter));
        self
    }

    pub fn with_shuffle(mut self, seed: Option<u64>) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }

    pub fn with_split_test(mut self, n: usize) -> Self {
        self.split_test = Some(n);
        self
    }
}

/// Features and labels read from a CSV file. The test halves are only
/// present when a split was requested.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedData {
    pub features: Matrix<f64>,
    pub labels: Matrix<f64>,
    pub test_features: Option<Matrix<f64>>,
    pub test_labels: Option<Matrix<f64>>,
}

/// Read a headered CSV file, keeping only the selected columns.
pub fn load_csv<P: AsRef<Path>>(path: P, options: &CsvOptions) -> DataResult<LoadedData> {
    let mut rdr = csv::Reader::from_path(path.as_ref())?;
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let data_idx = column_indices(&headers, &options.data_columns)?;
    let label_idx = column_indices(&headers, &options.label_columns)?;

    let mut feature_data = Vec::new();
    let mut label_data = Vec::new();
    let mut n_rows = 0usize;

    for result in rdr.records() {
        let record = result?;
        for &(j, name) in &data_idx {
            feature_data.push(parse_cell(&record, n_rows, j, name, options)?);
        }
        for &(j, name) in &label_idx {
            label_data.push(parse_cell(&record, n_rows, j, name, options)?);
        }
        n_rows += 1;
    }
    debug!("read {} rows from {}", n_rows, path.as_ref().display());

    let mut features = Matrix::new(feature_data, n_rows, data_idx.len())?;
    let mut labels = Matrix::new(label_data, n_rows, label_idx.len())?;

    if options.shuffle {
        let order = shuffled_indices(n_rows, options.seed);
        features = features.select_rows(&order)?;
        labels = labels.select_rows(&order)?;
    }

    let Some(requested) = options.split_test else {
        return Ok(LoadedData {
            features,
            labels,
            test_features: None,
            test_labels: None,
        });
    };

    let n_test = requested.min(n_rows);
    if n_test < requested {
        warn!(
            "test split of {} rows requested but only {} available",
            requested, n_rows
        );
    }

    Ok(LoadedData {
        test_features: Some(features.slice_rows(0, n_test)?),
        test_labels: Some(labels.slice_rows(0, n_test)?),
        features: features.slice_rows(n_test, n_rows)?,
        labels: labels.slice_rows(n_test, n_rows)?,
    })
}

/// Raw cells of one column, for string labels that need encoding first.
pub fn read_column<P: AsRef<Path>>(path: P, column: &str) -> DataResult<Vec<String>> {
    let mut rdr = csv::Reader::from_path(path.as_ref())?;
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let j = headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| DataError::MissingColumn(column.to_string()))?;

    let mut values = Vec::new();
    for result in rdr.records() {
        let record = result?;
        values.push(record.get(j).unwrap_or("").trim().to_string());
    }
    Ok(values)
}

fn column_indices<'a>(headers: &[String], wanted: &'a [String]) -> DataResult<Vec<(usize, &'a str)>> {
    wanted
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h == name)
                .map(|j| (j, name.as_str()))
                .ok_or_else(|| DataError::MissingColumn(name.clone()))
        })
        .collect()
}

fn parse_cell(
    record: &csv::StringRecord,
    row: usize,
    j: usize,
    column: &str,
    options: &CsvOptions,
) -> DataResult<f64> {
    let raw = record.get(j).unwrap_or("").trim();
    if let Some(convert) = options.converters.get(column) {
        return Ok(convert(raw));
    }
    raw.parse::<f64>().map_err(|_| DataError::ParseValue {
        row,
        column: column.to_string(),
        value: raw.to_string(),
    })
}
