//! The value algebra: a tagged union over rationals, complex numbers,
//! matrices and user functions, with the cross-type promotion rules for
//! every binary operator.
//!
//! Promotion: rationals embed into complex as `(r, 0)`; a complex result
//! whose imaginary part is exactly zero collapses back to a rational, so
//! `i * i` prints `-1` and not `-1 + 0i`. Matrices combine with matrices
//! of compatible shape and broadcast against scalars. Functions are never
//! arithmetic operands.

use crate::ast::Expr;
use crate::complex::Complex;
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::rational::Rational;
use num_traits::Signed;
use std::fmt;

/// A user-defined single-argument function: a parameter name and a body
/// evaluated in a scope that shadows exactly that parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub param: String,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Rational(Rational),
    Complex(Complex),
    Matrix(Matrix),
    Function(Function),
}

impl Value {
    pub fn zero() -> Self {
        Value::Rational(Rational::zero())
    }

    pub fn one() -> Self {
        Value::Rational(Rational::one())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Rational(_) => "rational",
            Value::Complex(_) => "complex",
            Value::Matrix(_) => "matrix",
            Value::Function(_) => "function",
        }
    }

    /// Collapse rule: a complex with `im = 0` is represented as a rational.
    pub fn from_complex(c: Complex) -> Value {
        if c.im.is_zero() {
            Value::Rational(c.re)
        } else {
            Value::Complex(c)
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Rational(_) | Value::Complex(_))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Value::Rational(r) => r.is_zero(),
            Value::Complex(c) => c.is_zero(),
            _ => false,
        }
    }

    fn as_complex(&self) -> Option<Complex> {
        match self {
            Value::Rational(r) => Some(Complex::from_rational(r.clone())),
            Value::Complex(c) => Some(c.clone()),
            _ => None,
        }
    }

    fn type_error(&self, verb: &str, other: &Value) -> Error {
        Error::Type(format!(
            "cannot {} {} and {}",
            verb,
            self.type_name(),
            other.type_name()
        ))
    }

    pub fn add(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Rational(a), Value::Rational(b)) => Ok(Value::Rational(a + b)),
            (Value::Matrix(a), Value::Matrix(b)) => Ok(Value::Matrix(a.add(b)?)),
            _ => match (self.as_complex(), other.as_complex()) {
                (Some(a), Some(b)) => Ok(Value::from_complex(&a + &b)),
                _ => Err(self.type_error("add", other)),
            },
        }
    }

    pub fn sub(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Rational(a), Value::Rational(b)) => Ok(Value::Rational(a - b)),
            (Value::Matrix(a), Value::Matrix(b)) => Ok(Value::Matrix(a.sub(b)?)),
            _ => match (self.as_complex(), other.as_complex()) {
                (Some(a), Some(b)) => Ok(Value::from_complex(&a - &b)),
                _ => Err(self.type_error("subtract", other)),
            },
        }
    }

    pub fn mul(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Rational(a), Value::Rational(b)) => Ok(Value::Rational(a * b)),
            (Value::Matrix(a), Value::Matrix(b)) => Ok(Value::Matrix(a.matmul(b)?)),
            (Value::Matrix(a), s) if s.is_scalar() => Ok(Value::Matrix(a.scale(s)?)),
            (s, Value::Matrix(b)) if s.is_scalar() => Ok(Value::Matrix(b.scale(s)?)),
            // scale componentwise so an exact component is not polluted by
            // approximate cross-terms against a zero imaginary part
            (Value::Complex(c), Value::Rational(r))
            | (Value::Rational(r), Value::Complex(c)) => Ok(Value::from_complex(
                Complex::new(&c.re * r, &c.im * r),
            )),
            _ => match (self.as_complex(), other.as_complex()) {
                (Some(a), Some(b)) => Ok(Value::from_complex(&a * &b)),
                _ => Err(self.type_error("multiply", other)),
            },
        }
    }

    pub fn div(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Rational(a), Value::Rational(b)) => a
                .checked_div(b)
                .map(Value::Rational)
                .ok_or_else(|| Error::Domain("division by zero".into())),
            (Value::Matrix(a), s) if s.is_scalar() => Ok(Value::Matrix(a.div_scalar(s)?)),
            (Value::Complex(c), Value::Rational(r)) => {
                match (c.re.checked_div(r), c.im.checked_div(r)) {
                    (Some(re), Some(im)) => {
                        Ok(Value::from_complex(Complex::new(re, im)))
                    }
                    _ => Err(Error::Domain("division by zero".into())),
                }
            }
            _ => match (self.as_complex(), other.as_complex()) {
                (Some(a), Some(b)) => a
                    .checked_div(&b)
                    .map(Value::from_complex)
                    .ok_or_else(|| Error::Domain("division by zero".into())),
                _ => Err(self.type_error("divide", other)),
            },
        }
    }

    pub fn rem(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Rational(a), Value::Rational(b)) => a
                .checked_rem(b)
                .map(Value::Rational)
                .ok_or_else(|| Error::Domain("modulo by zero".into())),
            _ => Err(Error::Type(format!(
                "modulo is only defined for rational values, got {} and {}",
                self.type_name(),
                other.type_name()
            ))),
        }
    }

    /// `^` and `**`: the exponent must evaluate to an exact integer.
    /// Negative exponents invert scalars and square matrices.
    pub fn pow(&self, other: &Value) -> Result<Value> {
        let exp = match other {
            Value::Rational(r) => r.as_integer().ok_or_else(|| {
                Error::Domain("exponent must be an integer".into())
            })?,
            _ => {
                return Err(Error::Domain(format!(
                    "exponent must be an integer, got {}",
                    other.type_name()
                )))
            }
        };
        match self {
            Value::Rational(r) => {
                if exp.is_negative() && r.is_zero() {
                    return Err(Error::Domain(
                        "zero cannot be raised to a negative power".into(),
                    ));
                }
                r.pow(&exp)
                    .map(Value::Rational)
                    .ok_or_else(|| Error::Domain("exponent out of range".into()))
            }
            Value::Complex(c) => {
                if exp.is_negative() && c.is_zero() {
                    return Err(Error::Domain(
                        "zero cannot be raised to a negative power".into(),
                    ));
                }
                c.pow(&exp)
                    .map(Value::from_complex)
                    .ok_or_else(|| Error::Domain("exponent out of range".into()))
            }
            Value::Matrix(m) => Ok(Value::Matrix(m.pow(&exp)?)),
            Value::Function(_) => Err(self.type_error("exponentiate", other)),
        }
    }

    /// Unary minus is `0 - v`, so it inherits the promotion rules.
    pub fn neg(&self) -> Result<Value> {
        Value::zero().sub(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Rational(r) => write!(f, "{}", r),
            Value::Complex(c) => write!(f, "{}", c),
            Value::Matrix(m) => write!(f, "{}", m),
            Value::Function(func) => write!(f, "{}", func.body),
        }
    }
}
