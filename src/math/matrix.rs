use rand::prelude::*;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::ops::{Add, Sub, Mul};

use crate::error::{Result, SoftmaxLossError};

/// Dense row-major matrix of `f64`.
///
/// Weights are stored D×C (features × classes) and batches N×D
/// (examples × features), so a batch of scores is `x.dot(&w)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Builds a matrix from row vectors. Every row must have the same length.
    /// An empty `data` gives a 0×0 matrix.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = data.first().map_or(0, |row| row.len());
        if let Some((row, bad)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(SoftmaxLossError::RaggedRows { row, expected: cols, got: bad.len() });
        }

        Ok(Matrix {
            rows: data.len(),
            cols,
            data
        })
    }

    /// Uniform samples in [-1, 1) from the thread-local generator.
    pub fn random(rows: usize, cols: usize) -> Matrix {
        Matrix::random_with(rows, cols, &mut rand::thread_rng())
    }

    /// Uniform samples in [-1, 1) from a caller-supplied generator, so tests
    /// can seed it.
    pub fn random_with<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);

        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = rng.gen::<f64>() * 2.0 - 1.0;
            }
        }

        res
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // (0, 1] keeps ln() finite.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Gaussian weights with standard deviation `scale`.
    ///
    /// The usual starting point for a linear softmax classifier is a D×C
    /// weight matrix with `scale = 1e-4`, which makes every initial
    /// prediction close to uniform and the initial loss close to `ln(C)`.
    pub fn gaussian_with<R: Rng + ?Sized>(rows: usize, cols: usize, scale: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * scale;
            }
        }
        res
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row][col] = value;
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// Per-row maximum as an N×1 column. A row with no columns yields -inf.
    pub fn row_max(&self) -> Matrix {
        let data = self.data.iter()
            .map(|row| vec![row.iter().copied().fold(f64::NEG_INFINITY, f64::max)])
            .collect();
        Matrix { rows: self.rows, cols: 1, data }
    }

    /// Per-row sum as an N×1 column.
    pub fn row_sums(&self) -> Matrix {
        let data = self.data.iter()
            .map(|row| vec![row.iter().sum()])
            .collect();
        Matrix { rows: self.rows, cols: 1, data }
    }

    /// Subtracts `column[i]` from every entry of row `i`.
    pub fn sub_column(&self, column: &Matrix) -> Result<Matrix> {
        self.broadcast_column(column, "row-wise subtract", |x, c| x - c)
    }

    /// Divides every entry of row `i` by `column[i]`.
    pub fn div_column(&self, column: &Matrix) -> Result<Matrix> {
        self.broadcast_column(column, "row-wise divide", |x, c| x / c)
    }

    fn broadcast_column<F>(&self, column: &Matrix, context: &'static str, op: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if column.rows != self.rows || column.cols != 1 {
            return Err(SoftmaxLossError::shape_mismatch(context, &[self.rows, 1], &column.shape()));
        }
        let data = self.data.iter().zip(column.data.iter())
            .map(|(row, c)| row.iter().map(|&x| op(x, c[0])).collect())
            .collect();
        Ok(Matrix { rows: self.rows, cols: self.cols, data })
    }

    /// N×C indicator matrix with a 1 at `(i, labels[i])`.
    pub fn one_hot(labels: &[usize], num_classes: usize) -> Result<Matrix> {
        let mut res = Matrix::zeros(labels.len(), num_classes);
        for (i, &label) in labels.iter().enumerate() {
            if label >= num_classes {
                return Err(SoftmaxLossError::label_out_of_range(i, label, num_classes));
            }
            res.data[i][label] = 1.0;
        }
        Ok(res)
    }

    /// Entry `(i, cols[i])` of every row `i`.
    pub fn pick(&self, cols: &[usize]) -> Result<Vec<f64>> {
        if cols.len() != self.rows {
            return Err(SoftmaxLossError::shape_mismatch("column picks", &[self.rows], &[cols.len()]));
        }
        self.data.iter().zip(cols).enumerate()
            .map(|(i, (row, &j))| {
                row.get(j).copied()
                    .ok_or_else(|| SoftmaxLossError::label_out_of_range(i, j, self.cols))
            })
            .collect()
    }

    /// Sum of squared entries (squared Frobenius norm).
    pub fn sum_squares(&self) -> f64 {
        self.data.iter().flatten().map(|x| x * x).sum()
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().flatten().all(|x| x.is_finite())
    }

    /// Matrix product that reports a shape mismatch instead of panicking.
    pub fn dot(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(SoftmaxLossError::shape_mismatch(
                "matrix product",
                &[self.cols, rhs.cols],
                &rhs.shape(),
            ));
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for k in 0..self.cols {
                let lhs = self.data[i][k];
                for j in 0..res.cols {
                    res.data[i][j] += lhs * rhs.data[k][j];
                }
            }
        }

        Ok(res)
    }

    /// Largest absolute elementwise difference; `None` when shapes differ.
    pub fn max_abs_diff(&self, other: &Matrix) -> Option<f64> {
        if self.shape() != other.shape() {
            return None;
        }
        Some(self.data.iter().flatten()
            .zip(other.data.iter().flatten())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max))
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = self;

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] += rhs.data[i][j];
            }
        }

        res
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = self;

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] -= rhs.data[i][j];
            }
        }

        res
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        match self.dot(&rhs) {
            Ok(res) => res,
            Err(_) => panic!("Matrices are of incorrect sizes"),
        }
    }
}
