//! Fixed-point matrix type
//!
//! Every element of a matrix shares the precision the caller passes to the
//! scale-sensitive operations (`multiply`, `hadamard`, `scalar_product`,
//! `map`). As with the scalar kernel, nothing here records or checks it.
//!
//! Binary operations come in two forms: one returning a fresh matrix and an
//! `_assign` form that overwrites `self`. The second covers the common
//! "destination is one of the sources" pattern without a scratch buffer.

use fixedrnn_fixed_point::{check_precision, ops};

use crate::error::{MatrixError, Result};

/// A dense row-major matrix of raw fixed-point values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    /// Matrix data in row-major order
    data: Vec<i16>,
    /// Number of rows
    rows: usize,
    /// Number of columns
    cols: usize,
}

impl Matrix {
    /// Zero-initialized matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0; rows * cols],
            rows,
            cols,
        }
    }

    /// Create from raw row-major data
    pub fn from_raw(data: Vec<i16>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(MatrixError::InvalidLength {
                expected: rows * cols,
                got: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Column vector from raw data
    pub fn column(data: Vec<i16>) -> Self {
        let rows = data.len();
        Self { data, rows, cols: 1 }
    }

    /// Create from row-major f64 data, truncating to fixed point
    pub fn from_f64(data: &[f64], rows: usize, cols: usize, precision: u8) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(MatrixError::InvalidLength {
                expected: rows * cols,
                got: data.len(),
            });
        }
        check_precision(precision)?;
        let data = data.iter().map(|&v| ops::from_f64(v, precision)).collect();
        Ok(Self { data, rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get element at (row, col)
    pub fn get(&self, row: usize, col: usize) -> i16 {
        self.data[row * self.cols + col]
    }

    /// Set element at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: i16) {
        self.data[row * self.cols + col] = value;
    }

    pub fn as_slice(&self) -> &[i16] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<i16> {
        self.data
    }

    /// Convert every element to floating point
    pub fn to_f64_vec(&self, precision: u8) -> Vec<f64> {
        self.data.iter().map(|&x| ops::to_f64(x, precision)).collect()
    }

    fn check_same_shape(&self, other: &Matrix, op: &'static str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(MatrixError::DimensionMismatch {
                op,
                expected: self.shape(),
                got: other.shape(),
            });
        }
        Ok(())
    }

    /// Matrix product `self · other`.
    ///
    /// Each product term is rescaled with the fixed-point multiply before it
    /// is accumulated, so the accumulator stays 16 bits wide (and wraps).
    pub fn multiply(&self, other: &Matrix, precision: u8) -> Result<Matrix> {
        check_precision(precision)?;
        if self.cols != other.rows {
            return Err(MatrixError::DimensionMismatch {
                op: "multiply",
                expected: (self.cols, other.cols),
                got: other.shape(),
            });
        }

        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            let lhs = &self.data[i * self.cols..(i + 1) * self.cols];
            for j in 0..other.cols {
                let mut sum: i16 = 0;
                for (k, &a) in lhs.iter().enumerate() {
                    sum = ops::add(sum, ops::mul(a, other.get(k, j), precision));
                }
                out.data[i * other.cols + j] = sum;
            }
        }
        Ok(out)
    }

    /// Elementwise sum
    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        let mut out = self.clone();
        out.add_assign(other)?;
        Ok(out)
    }

    /// `self += other`, elementwise
    pub fn add_assign(&mut self, other: &Matrix) -> Result<()> {
        self.check_same_shape(other, "add")?;
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a = ops::add(*a, b);
        }
        Ok(())
    }

    /// Elementwise fixed-point product
    pub fn hadamard(&self, other: &Matrix, precision: u8) -> Result<Matrix> {
        let mut out = self.clone();
        out.hadamard_assign(other, precision)?;
        Ok(out)
    }

    /// `self ⊙= other`
    pub fn hadamard_assign(&mut self, other: &Matrix, precision: u8) -> Result<()> {
        self.check_same_shape(other, "hadamard")?;
        check_precision(precision)?;
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a = ops::mul(*a, b, precision);
        }
        Ok(())
    }

    /// Multiply every element by the fixed-point constant `k`
    pub fn scalar_product(&self, k: i16, precision: u8) -> Matrix {
        let data = self.data.iter().map(|&x| ops::mul(x, k, precision)).collect();
        Matrix {
            data,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Add the fixed-point constant `k` to every element
    pub fn scalar_add(&self, k: i16) -> Matrix {
        let data = self.data.iter().map(|&x| ops::add(x, k)).collect();
        Matrix {
            data,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Apply a scalar function to every element
    pub fn map<F>(&self, f: F, precision: u8) -> Result<Matrix>
    where
        F: Fn(i16, u8) -> fixedrnn_fixed_point::Result<i16>,
    {
        let mut out = self.clone();
        out.map_in_place(f, precision)?;
        Ok(out)
    }

    /// Apply a scalar function to every element of `self`.
    ///
    /// Stops at the first failing element; earlier elements are already
    /// overwritten in that case.
    pub fn map_in_place<F>(&mut self, f: F, precision: u8) -> Result<()>
    where
        F: Fn(i16, u8) -> fixedrnn_fixed_point::Result<i16>,
    {
        for x in self.data.iter_mut() {
            *x = f(*x, precision)?;
        }
        Ok(())
    }

    /// Vertical concatenation: `top` rows followed by `bottom` rows
    pub fn stack(top: &Matrix, bottom: &Matrix) -> Result<Matrix> {
        if top.cols != bottom.cols {
            return Err(MatrixError::DimensionMismatch {
                op: "stack",
                expected: (bottom.rows, top.cols),
                got: bottom.shape(),
            });
        }
        let mut data = Vec::with_capacity(top.data.len() + bottom.data.len());
        data.extend_from_slice(&top.data);
        data.extend_from_slice(&bottom.data);
        Ok(Matrix {
            data,
            rows: top.rows + bottom.rows,
            cols: top.cols,
        })
    }

    /// Copy of rows `start..end`
    pub fn rows_range(&self, start: usize, end: usize) -> Result<Matrix> {
        if start > end || end > self.rows {
            return Err(MatrixError::RowRange {
                start,
                end,
                rows: self.rows,
            });
        }
        Ok(Matrix {
            data: self.data[start * self.cols..end * self.cols].to_vec(),
            rows: end - start,
            cols: self.cols,
        })
    }

    /// Set every element to `value`
    pub fn fill(&mut self, value: i16) {
        self.data.fill(value);
    }

    /// Index of the first largest element, row-major
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, i16)> = None;
        for (i, &x) in self.data.iter().enumerate() {
            match best {
                Some((_, b)) if x <= b => {}
                _ => best = Some((i, x)),
            }
        }
        best.map(|(i, _)| i)
    }
}
