use crate::regression::fiterror::{DivisionError, ShapeError};
use std::fmt;

/// Dense row-major matrix of `f64`.
///
/// A `Matrix` is never mutated after construction: every operation allocates
/// and returns a new one. A matrix without elements has shape `(0, 0)` and is
/// rejected by the arithmetic operations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let separator = "-".repeat(9);
        writeln!(f, "{separator}")?;
        for row in self.data.chunks(self.cols.max(1)) {
            writeln!(f, "{row:?}")?;
        }
        writeln!(f, "{separator}")?;
        write!(f, "({}, {})", self.rows, self.cols)
    }
}

impl Matrix {
    pub fn empty() -> Self {
        Self { rows: 0, cols: 0, data: Vec::new() }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ShapeError> {
        let Some(first) = rows.first() else {
            return Ok(Self::empty());
        };
        let cols = first.len();
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(ShapeError::RaggedRows { row: i, expected: cols, found: row.len() });
            }
            data.extend_from_slice(row);
        }
        if data.is_empty() {
            return Ok(Self::empty());
        }
        Ok(Self { rows: rows.len(), cols, data })
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, ShapeError> {
        if rows * cols != data.len() {
            return Err(ShapeError::StorageLength { rows, cols, len: data.len() });
        }
        if data.is_empty() {
            return Ok(Self::empty());
        }
        Ok(Self { rows, cols, data })
    }

    /// Single column matrix, one row per value.
    pub fn column(values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::empty();
        }
        Self { rows: values.len(), cols: 1, data: values }
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        if rows == 0 || cols == 0 {
            return Self::empty();
        }
        Self { rows, cols, data: vec![value; rows * cols] }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.data[row * self.cols + col])
    }

    /// Row-major view of the elements.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().copied()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.cols.max(1)).map(<[f64]>::to_vec).collect()
    }

    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Matrix {
        Self { rows: self.rows, cols: self.cols, data: self.data.iter().map(|&v| f(v)).collect() }
    }

    fn zip_with<F: Fn(f64, f64) -> f64>(
        &self,
        other: &Matrix,
        op: &'static str,
        f: F,
    ) -> Result<Matrix, ShapeError> {
        if self.shape() != other.shape() {
            return Err(ShapeError::Mismatch { op, left: self.shape(), right: other.shape() });
        }
        if self.is_empty() {
            return Err(ShapeError::Empty(op));
        }
        let data = self.data.iter().zip(&other.data).map(|(&a, &b)| f(a, b)).collect();
        Ok(Self { rows: self.rows, cols: self.cols, data })
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix, ShapeError> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    pub fn subtract(&self, other: &Matrix) -> Result<Matrix, ShapeError> {
        self.zip_with(other, "subtract", |a, b| a - b)
    }

    pub fn scale(&self, scalar: f64) -> Matrix {
        self.map(|v| v * scalar)
    }

    /// Matrix product with naive accumulation: each output cell sums
    /// `self[i][k] * other[k][j]` in increasing `k`, starting from `0.0`.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix, ShapeError> {
        if self.cols != other.rows {
            return Err(ShapeError::Mismatch {
                op: "multiply",
                left: self.shape(),
                right: other.shape(),
            });
        }
        if self.is_empty() || other.is_empty() {
            return Err(ShapeError::Empty("multiply"));
        }

        let (n, inner, p) = (self.rows, self.cols, other.cols);
        let mut data = vec![0.0; n * p];
        for i in 0..n {
            for j in 0..p {
                let mut acc = 0.0;
                for k in 0..inner {
                    acc += self.data[i * inner + k] * other.data[k * p + j];
                }
                data[i * p + j] = acc;
            }
        }
        Ok(Self { rows: n, cols: p, data })
    }

    pub fn transpose(&self) -> Matrix {
        let mut data = Vec::with_capacity(self.data.len());
        for col in 0..self.cols {
            for row in 0..self.rows {
                data.push(self.data[row * self.cols + col]);
            }
        }
        Self { rows: self.cols, cols: self.rows, data }
    }

    pub fn square(&self) -> Matrix {
        self.map(|v| v * v)
    }

    /// Places the columns of `other` to the right of the columns of `self`.
    pub fn concat_columns(&self, other: &Matrix) -> Result<Matrix, ShapeError> {
        if self.rows != other.rows {
            return Err(ShapeError::Mismatch {
                op: "concat_columns",
                left: self.shape(),
                right: other.shape(),
            });
        }
        if self.is_empty() || other.is_empty() {
            return Err(ShapeError::Empty("concat_columns"));
        }

        let cols = self.cols + other.cols;
        let mut data = Vec::with_capacity(self.rows * cols);
        for (left, right) in self.data.chunks(self.cols).zip(other.data.chunks(other.cols)) {
            data.extend_from_slice(left);
            data.extend_from_slice(right);
        }
        Ok(Self { rows: self.rows, cols, data })
    }

    pub fn min(&self) -> Result<f64, ShapeError> {
        self.iter().reduce(f64::min).ok_or(ShapeError::Empty("min"))
    }

    pub fn max(&self) -> Result<f64, ShapeError> {
        self.iter().reduce(f64::max).ok_or(ShapeError::Empty("max"))
    }

    pub fn sum(&self) -> f64 {
        self.iter().sum()
    }

    pub fn mean(&self) -> Result<f64, DivisionError> {
        if self.is_empty() {
            return Err(DivisionError::EmptyMean);
        }
        Ok(self.sum() / self.data.len() as f64)
    }
}
