//! Rectangular matrices over the scalar field of the value algebra.
//!
//! Cells are rational or complex values; arithmetic on cells goes through
//! the same dispatch as top-level scalars, so a matrix of complex entries
//! divides, scales and inverts with complex cell arithmetic. The inverse
//! is an exact Gauss-Jordan elimination on the augmented `[M | I]`.

use crate::error::{Error, Result};
use crate::value::Value;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<Value>>,
}

impl Matrix {
    /// Build from evaluated rows. Fails on an empty grid, ragged rows, or
    /// cells that are not scalar values.
    pub fn new(data: Vec<Vec<Value>>) -> Result<Matrix> {
        if data.is_empty() || data[0].is_empty() {
            return Err(Error::Shape("matrix cannot be empty".into()));
        }
        let cols = data[0].len();
        for row in &data {
            if row.len() != cols {
                return Err(Error::Shape(
                    "matrix rows must all have the same length".into(),
                ));
            }
            for cell in row {
                if !cell.is_scalar() {
                    return Err(Error::Type(format!(
                        "matrix cells must be rational or complex, got {}",
                        cell.type_name()
                    )));
                }
            }
        }
        Ok(Matrix {
            rows: data.len(),
            cols,
            data,
        })
    }

    pub fn identity(n: usize) -> Matrix {
        let data = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| if i == j { Value::one() } else { Value::zero() })
                    .collect()
            })
            .collect();
        Matrix {
            rows: n,
            cols: n,
            data,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> &Value {
        &self.data[row][col]
    }

    pub fn cells(&self) -> impl Iterator<Item = &Value> {
        self.data.iter().flat_map(|row| row.iter())
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    fn dims(&self) -> String {
        format!("{}x{}", self.rows, self.cols)
    }

    fn zip_cells<F>(&self, other: &Matrix, verb: &str, f: F) -> Result<Matrix>
    where
        F: Fn(&Value, &Value) -> Result<Value>,
    {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(Error::Shape(format!(
                "matrix dimensions must match for {}, got {} and {}",
                verb,
                self.dims(),
                other.dims()
            )));
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(ra, rb)| ra.iter().zip(rb).map(|(a, b)| f(a, b)).collect())
            .collect::<Result<Vec<Vec<Value>>>>()?;
        Matrix::new(data)
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_cells(other, "addition", |a, b| a.add(b))
    }

    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_cells(other, "subtraction", |a, b| a.sub(b))
    }

    /// Matrix product; inner dimensions must agree.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(Error::Shape(format!(
                "incompatible dimensions for matrix product: {} by {}",
                self.dims(),
                other.dims()
            )));
        }
        let mut data = Vec::with_capacity(self.rows);
        for i in 0..self.rows {
            let mut row = Vec::with_capacity(other.cols);
            for j in 0..other.cols {
                let mut acc = Value::zero();
                for k in 0..self.cols {
                    let term = self.data[i][k].mul(&other.data[k][j])?;
                    acc = acc.add(&term)?;
                }
                row.push(acc);
            }
            data.push(row);
        }
        Matrix::new(data)
    }

    /// Cell-wise multiplication by a scalar, from either side.
    pub fn scale(&self, scalar: &Value) -> Result<Matrix> {
        let data = self
            .data
            .iter()
            .map(|row| row.iter().map(|c| c.mul(scalar)).collect())
            .collect::<Result<Vec<Vec<Value>>>>()?;
        Matrix::new(data)
    }

    /// Cell-wise division by a scalar.
    pub fn div_scalar(&self, scalar: &Value) -> Result<Matrix> {
        let data = self
            .data
            .iter()
            .map(|row| row.iter().map(|c| c.div(scalar)).collect())
            .collect::<Result<Vec<Vec<Value>>>>()?;
        Matrix::new(data)
    }

    /// Integer power of a square matrix. `M^0` is the identity, negative
    /// exponents go through the inverse.
    pub fn pow(&self, exp: &BigInt) -> Result<Matrix> {
        if !self.is_square() {
            return Err(Error::Shape(
                "matrix power requires a square matrix".into(),
            ));
        }
        let k = exp
            .abs()
            .to_u32()
            .ok_or_else(|| Error::Domain("exponent out of range".into()))?;
        let base = if exp.is_negative() {
            self.inverse()?
        } else {
            self.clone()
        };
        if k == 0 {
            return Ok(Matrix::identity(self.rows));
        }
        let mut result = base.clone();
        for _ in 1..k {
            result = result.matmul(&base)?;
        }
        Ok(result)
    }

    /// Exact Gauss-Jordan inverse on the augmented `[M | I]`: pick the
    /// first nonzero pivot at or below the diagonal, swap it up, normalize
    /// the pivot row and eliminate the column everywhere else.
    pub fn inverse(&self) -> Result<Matrix> {
        if !self.is_square() {
            return Err(Error::Shape(
                "only square matrices can be inverted".into(),
            ));
        }
        let n = self.rows;
        let mut aug: Vec<Vec<Value>> = Vec::with_capacity(n);
        for (i, row) in self.data.iter().enumerate() {
            let mut wide = row.clone();
            for j in 0..n {
                wide.push(if i == j { Value::one() } else { Value::zero() });
            }
            aug.push(wide);
        }

        for col in 0..n {
            let pivot_row = (col..n)
                .find(|&r| !aug[r][col].is_zero())
                .ok_or_else(|| Error::Domain("matrix is singular".into()))?;
            aug.swap(col, pivot_row);

            let pivot = aug[col][col].clone();
            for j in 0..2 * n {
                aug[col][j] = aug[col][j].div(&pivot)?;
            }
            for r in 0..n {
                if r == col || aug[r][col].is_zero() {
                    continue;
                }
                let factor = aug[r][col].clone();
                for j in 0..2 * n {
                    let scaled = aug[col][j].mul(&factor)?;
                    aug[r][j] = aug[r][j].sub(&scaled)?;
                }
            }
        }

        let data = aug.into_iter().map(|row| row[n..].to_vec()).collect();
        Matrix::new(data)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ ")?;
        for (i, row) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, " ; ")?;
            }
            write!(f, "[ ")?;
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " , ")?;
                }
                write!(f, "{}", cell)?;
            }
            write!(f, " ]")?;
        }
        write!(f, " ]")
    }
}
