use crate::dtype::Float;
use crate::error::{MatrixError, MatrixResult};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense row-major 2-D matrix, the only container the models work with.
///
/// One row is one observation. Every operation returns a new matrix; nothing
/// here mutates shared state, which is what lets the trainer replace its
/// weights wholesale after each step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct Matrix<T: Float> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl<T: Float> Matrix<T> {
    /// Create a matrix from row-major data.
    pub fn new(data: Vec<T>, rows: usize, cols: usize) -> MatrixResult<Self> {
        if data.len() != rows * cols {
            return Err(MatrixError::ShapeMismatch {
                expected: (rows, cols),
                got: (data.len(), 1),
            });
        }
        Ok(Matrix { data, rows, cols })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::full(rows, cols, T::ZERO)
    }

    pub fn ones(rows: usize, cols: usize) -> Self {
        Self::full(rows, cols, T::ONE)
    }

    pub fn full(rows: usize, cols: usize, value: T) -> Self {
        Matrix {
            data: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    /// Build an `n × 1` column vector.
    pub fn column(values: &[T]) -> Self {
        Matrix {
            data: values.to_vec(),
            rows: values.len(),
            cols: 1,
        }
    }

    /// Build a `1 × n` row vector.
    pub fn row_vector(values: &[T]) -> Self {
        Matrix {
            data: values.to_vec(),
            rows: 1,
            cols: values.len(),
        }
    }

    /// Create a matrix from nested rows. All rows must have the same length.
    pub fn from_vec2d(data: &[Vec<T>]) -> MatrixResult<Self> {
        if data.is_empty() {
            return Ok(Matrix::zeros(0, 0));
        }
        let rows = data.len();
        let cols = data[0].len();
        if let Some(bad) = data.iter().find(|r| r.len() != cols) {
            return Err(MatrixError::DimensionMismatch(format!(
                "all rows must have {} columns, found a row with {}",
                cols,
                bad.len()
            )));
        }
        let flat: Vec<T> = data.iter().flat_map(|r| r.iter().copied()).collect();
        Matrix::new(flat, rows, cols)
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn get(&self, i: usize, j: usize) -> MatrixResult<T> {
        if i >= self.rows {
            return Err(MatrixError::IndexOutOfBounds {
                index: i,
                axis: 0,
                size: self.rows,
            });
        }
        if j >= self.cols {
            return Err(MatrixError::IndexOutOfBounds {
                index: j,
                axis: 1,
                size: self.cols,
            });
        }
        Ok(self.data[i * self.cols + j])
    }

    /// Borrow row `i` as a slice.
    pub fn row(&self, i: usize) -> MatrixResult<&[T]> {
        if i >= self.rows {
            return Err(MatrixError::IndexOutOfBounds {
                index: i,
                axis: 0,
                size: self.rows,
            });
        }
        Ok(&self.data[i * self.cols..(i + 1) * self.cols])
    }

    /// Collect column `j` into a vector.
    pub fn col(&self, j: usize) -> MatrixResult<Vec<T>> {
        if j >= self.cols {
            return Err(MatrixError::IndexOutOfBounds {
                index: j,
                axis: 1,
                size: self.cols,
            });
        }
        Ok((0..self.rows).map(|i| self.data[i * self.cols + j]).collect())
    }

    // ─── Shape Manipulation ─────────────────────────────────────────────────

    pub fn t(&self) -> Matrix<T> {
        let mut data = vec![T::ZERO; self.data.len()];
        for i in 0..self.rows {
            for j in 0..self.cols {
                data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Matrix {
            data,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Join matrices side by side. All parts must have the same row count.
    pub fn hstack(parts: &[&Matrix<T>]) -> MatrixResult<Matrix<T>> {
        let first = parts.first().ok_or(MatrixError::EmptyMatrix)?;
        let rows = first.rows;
        if let Some(bad) = parts.iter().find(|m| m.rows != rows) {
            return Err(MatrixError::ShapeMismatch {
                expected: (rows, bad.cols),
                got: bad.shape(),
            });
        }
        let cols: usize = parts.iter().map(|m| m.cols).sum();
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for m in parts {
                data.extend_from_slice(&m.data[i * m.cols..(i + 1) * m.cols]);
            }
        }
        Matrix::new(data, rows, cols)
    }

    /// Rows `start..end` as a new matrix.
    pub fn slice_rows(&self, start: usize, end: usize) -> MatrixResult<Matrix<T>> {
        if start > end || end > self.rows {
            return Err(MatrixError::IndexOutOfBounds {
                index: end,
                axis: 0,
                size: self.rows,
            });
        }
        Matrix::new(
            self.data[start * self.cols..end * self.cols].to_vec(),
            end - start,
            self.cols,
        )
    }

    /// Gather the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> MatrixResult<Matrix<T>> {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            data.extend_from_slice(self.row(i)?);
        }
        Matrix::new(data, indices.len(), self.cols)
    }

    // ─── Element-wise Unary Operations ──────────────────────────────────────

    pub fn apply<F: Fn(T) -> T>(&self, f: F) -> Matrix<T> {
        Matrix {
            data: self.data.iter().map(|&x| f(x)).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub fn ln(&self) -> Matrix<T> { self.apply(T::ln) }
    pub fn sqrt(&self) -> Matrix<T> { self.apply(T::sqrt) }
    pub fn powi(&self, n: i32) -> Matrix<T> { self.apply(|x| x.powi(n)) }

    /// Logistic function `1 / (1 + e^-x)`, element-wise.
    pub fn sigmoid(&self) -> Matrix<T> {
        self.apply(|x| T::ONE / (T::ONE + (-x).exp()))
    }

    /// Softmax across each row. Each output row sums to one.
    pub fn softmax_rows(&self) -> Matrix<T> {
        let mut data = self.data.clone();
        for row in data.chunks_mut(self.cols.max(1)) {
            let max_val = row.iter().copied().fold(T::NEG_INFINITY, T::max);
            let mut sum = T::ZERO;
            for v in row.iter_mut() {
                *v = (*v - max_val).exp();
                sum = sum + *v;
            }
            for v in row.iter_mut() {
                *v = *v / sum;
            }
        }
        Matrix {
            data,
            rows: self.rows,
            cols: self.cols,
        }
    }

    // ─── Scalar Operations ──────────────────────────────────────────────────

    pub fn add_scalar(&self, s: T) -> Matrix<T> { self.apply(|x| x + s) }
    pub fn mul_scalar(&self, s: T) -> Matrix<T> { self.apply(|x| x * s) }
    pub fn div_scalar(&self, s: T) -> Matrix<T> { self.apply(|x| x / s) }

    /// `s - x` for every element.
    pub fn rsub_scalar(&self, s: T) -> Matrix<T> { self.apply(|x| s - x) }

    /// 1 where the element is strictly greater than `threshold`, else 0.
    pub fn gt_scalar(&self, threshold: T) -> Matrix<T> {
        self.apply(|x| if x > threshold { T::ONE } else { T::ZERO })
    }

    // ─── Element-wise Binary Operations (with broadcasting) ─────────────────

    /// Broadcasts `other` when it is `1 × cols`, `rows × 1` or `1 × 1`.
    fn broadcast_binary_op<F: Fn(T, T) -> T>(
        &self,
        other: &Matrix<T>,
        op: F,
    ) -> MatrixResult<Matrix<T>> {
        let pick: fn(usize, usize, usize) -> usize = match other.shape() {
            s if s == self.shape() => |i, j, cols| i * cols + j,
            (1, c) if c == self.cols => |_, j, _| j,
            (r, 1) if r == self.rows => |i, _, _| i,
            (1, 1) => |_, _, _| 0,
            _ => {
                return Err(MatrixError::ShapeMismatch {
                    expected: self.shape(),
                    got: other.shape(),
                })
            }
        };

        let mut data = Vec::with_capacity(self.data.len());
        for i in 0..self.rows {
            for j in 0..self.cols {
                let a = self.data[i * self.cols + j];
                let b = other.data[pick(i, j, self.cols)];
                data.push(op(a, b));
            }
        }
        Matrix::new(data, self.rows, self.cols)
    }

    pub fn add(&self, other: &Matrix<T>) -> MatrixResult<Matrix<T>> {
        self.broadcast_binary_op(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Matrix<T>) -> MatrixResult<Matrix<T>> {
        self.broadcast_binary_op(other, |a, b| a - b)
    }

    pub fn mul(&self, other: &Matrix<T>) -> MatrixResult<Matrix<T>> {
        self.broadcast_binary_op(other, |a, b| a * b)
    }

    pub fn div(&self, other: &Matrix<T>) -> MatrixResult<Matrix<T>> {
        self.broadcast_binary_op(other, |a, b| a / b)
    }

    // ─── Reduction Operations ───────────────────────────────────────────────

    pub fn sum_all(&self) -> T {
        self.data.iter().copied().sum()
    }

    pub fn mean_all(&self) -> T {
        self.sum_all() / T::from_usize(self.data.len())
    }

    /// Column means as a `1 × cols` row vector.
    pub fn mean_axis0(&self) -> Matrix<T> {
        let mut sums = vec![T::ZERO; self.cols];
        for row in self.data.chunks(self.cols.max(1)) {
            for (s, &v) in sums.iter_mut().zip(row) {
                *s = *s + v;
            }
        }
        let n = T::from_usize(self.rows);
        Matrix::row_vector(&sums).div_scalar(n)
    }

    /// Population (divide-by-n) column variances as a `1 × cols` row vector.
    pub fn var_axis0(&self) -> Matrix<T> {
        let mean = self.mean_axis0();
        let mut acc = vec![T::ZERO; self.cols];
        for row in self.data.chunks(self.cols.max(1)) {
            for ((a, &v), &mu) in acc.iter_mut().zip(row).zip(mean.data()) {
                let d = v - mu;
                *a = *a + d * d;
            }
        }
        let n = T::from_usize(self.rows);
        Matrix::row_vector(&acc).div_scalar(n)
    }

    /// Column index of the largest value in each row. Ties go to the lowest index.
    pub fn argmax_rows(&self) -> Vec<usize> {
        self.data
            .chunks(self.cols.max(1))
            .map(|row| {
                let mut best = 0;
                for (j, &v) in row.iter().enumerate() {
                    if v > row[best] {
                        best = j;
                    }
                }
                best
            })
            .collect()
    }

    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    // ─── Matrix Multiply ────────────────────────────────────────────────────

    pub fn matmul(&self, other: &Matrix<T>) -> MatrixResult<Matrix<T>> {
        if self.cols != other.rows {
            return Err(MatrixError::DimensionMismatch(format!(
                "matmul: inner dimensions must match, got {} and {}",
                self.cols, other.rows
            )));
        }
        let (m, k, n) = (self.rows, self.cols, other.cols);
        let mut data = vec![T::ZERO; m * n];
        for i in 0..m {
            for p in 0..k {
                let a = self.data[i * k + p];
                for j in 0..n {
                    data[i * n + j] = data[i * n + j] + a * other.data[p * n + j];
                }
            }
        }
        Matrix::new(data, m, n)
    }
}

// ─── Display ────────────────────────────────────────────────────────────────

impl<T: Float> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "matrix([")?;
        for i in 0..self.rows.min(8) {
            write!(f, "  [")?;
            for j in 0..self.cols.min(8) {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:.4}", self.data[i * self.cols + j])?;
            }
            if self.cols > 8 {
                write!(f, ", ...")?;
            }
            writeln!(f, "],")?;
        }
        if self.rows > 8 {
            writeln!(f, "  ...")?;
        }
        write!(f, "], shape=({}, {}))", self.rows, self.cols)
    }
}
