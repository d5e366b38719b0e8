//! The fixed table of built-in functions: `sin cos tan exp log sqrt abs
//! floor ceil norm inv`.
//!
//! Transcendentals fall back to binary floating approximation through the
//! `Approx` rational constructor; `sqrt`, `abs` and `norm` stay exact when
//! the result is a perfect rational square. The trigonometric functions
//! consult the session angle mode.

use crate::complex::Complex;
use crate::env::AngleMode;
use crate::error::{Error, Result};
use crate::rational::Rational;
use crate::value::Value;
use std::f64::consts::PI;

const NAMES: &[&str] = &[
    "sin", "cos", "tan", "exp", "log", "sqrt", "abs", "floor", "ceil", "norm", "inv",
];

pub fn is_builtin(name: &str) -> bool {
    NAMES.contains(&name)
}

/// Dispatch a built-in call. `name` is already lowercased.
pub fn call(name: &str, arg: Value, mode: AngleMode) -> Result<Value> {
    match name {
        "sin" | "cos" | "tan" => trig(name, arg, mode),
        "exp" => exp(arg),
        "log" => log(arg),
        "sqrt" => sqrt(arg),
        "abs" => abs(arg),
        "floor" => floor(arg),
        "ceil" => ceil(arg),
        "norm" => norm(arg),
        "inv" => inv(arg),
        _ => Err(Error::Name(format!("undefined function '{}'", name))),
    }
}

fn angle_factor(mode: AngleMode) -> f64 {
    match mode {
        AngleMode::Radians => 1.0,
        AngleMode::Degrees => PI / 180.0,
    }
}

fn not_defined(name: &str, arg: &Value) -> Error {
    Error::Type(format!("{} is not defined for {}", name, arg.type_name()))
}

fn trig(name: &str, arg: Value, mode: AngleMode) -> Result<Value> {
    let k = angle_factor(mode);
    match arg {
        Value::Rational(r) => {
            let t = r.to_f64() * k;
            let v = match name {
                "sin" => t.sin(),
                "cos" => t.cos(),
                _ => t.tan(),
            };
            Ok(Value::Rational(Rational::from_f64(v)))
        }
        Value::Complex(c) => {
            let a = c.re.to_f64() * k;
            let b = c.im.to_f64() * k;
            // sin(a+bi) = sin a cosh b + i cos a sinh b, and the cosine
            // analogue; tan divides the two.
            let sin = (a.sin() * b.cosh(), a.cos() * b.sinh());
            let cos = (a.cos() * b.cosh(), -(a.sin() * b.sinh()));
            let (re, im) = match name {
                "sin" => sin,
                "cos" => cos,
                _ => {
                    let denom = cos.0 * cos.0 + cos.1 * cos.1;
                    if denom == 0.0 {
                        return Err(Error::Domain(
                            "tangent is undefined at this point".into(),
                        ));
                    }
                    (
                        (sin.0 * cos.0 + sin.1 * cos.1) / denom,
                        (sin.1 * cos.0 - sin.0 * cos.1) / denom,
                    )
                }
            };
            Ok(Value::from_complex(Complex::new(
                Rational::from_f64(re),
                Rational::from_f64(im),
            )))
        }
        other => Err(not_defined(name, &other)),
    }
}

fn exp(arg: Value) -> Result<Value> {
    match arg {
        Value::Rational(r) => Ok(Value::Rational(Rational::from_f64(r.to_f64().exp()))),
        Value::Complex(c) => {
            let m = c.re.to_f64().exp();
            let b = c.im.to_f64();
            Ok(Value::from_complex(Complex::new(
                Rational::from_f64(m * b.cos()),
                Rational::from_f64(m * b.sin()),
            )))
        }
        other => Err(not_defined("exp", &other)),
    }
}

/// Natural logarithm. A negative rational takes the principal complex
/// branch `ln|x| + iπ`.
fn log(arg: Value) -> Result<Value> {
    match arg {
        Value::Rational(r) => {
            if r.is_zero() {
                return Err(Error::Domain("log of zero".into()));
            }
            let ln = r.abs().to_f64().ln();
            if r.is_negative() {
                Ok(Value::Complex(Complex::new(
                    Rational::from_f64(ln),
                    Rational::from_f64(PI),
                )))
            } else {
                Ok(Value::Rational(Rational::from_f64(ln)))
            }
        }
        Value::Complex(c) => {
            let re = 0.5 * c.magnitude_squared().to_f64().ln();
            let im = c.im.to_f64().atan2(c.re.to_f64());
            Ok(Value::from_complex(Complex::new(
                Rational::from_f64(re),
                Rational::from_f64(im),
            )))
        }
        other => Err(not_defined("log", &other)),
    }
}

/// Principal square root. Negative rationals produce a pure-imaginary
/// complex value.
fn sqrt(arg: Value) -> Result<Value> {
    match arg {
        Value::Rational(r) => {
            if r.is_negative() {
                let s = r.abs().sqrt().unwrap_or_else(Rational::zero);
                Ok(Value::Complex(Complex::new(Rational::zero(), s)))
            } else {
                Ok(Value::Rational(r.sqrt().unwrap_or_else(Rational::zero)))
            }
        }
        Value::Complex(c) => Ok(Value::from_complex(c.sqrt())),
        other => Err(not_defined("sqrt", &other)),
    }
}

fn abs(arg: Value) -> Result<Value> {
    match arg {
        Value::Rational(r) => Ok(Value::Rational(r.abs())),
        Value::Complex(c) => Ok(Value::Rational(c.magnitude())),
        Value::Matrix(_) => Err(Error::Type(
            "abs is not defined for matrices, use norm".into(),
        )),
        other => Err(not_defined("abs", &other)),
    }
}

fn floor(arg: Value) -> Result<Value> {
    match arg {
        Value::Rational(r) => Ok(Value::Rational(r.floor())),
        other => Err(not_defined("floor", &other)),
    }
}

fn ceil(arg: Value) -> Result<Value> {
    match arg {
        Value::Rational(r) => Ok(Value::Rational(r.ceil())),
        other => Err(not_defined("ceil", &other)),
    }
}

/// Euclidean norm: the magnitude of a scalar, the 2-norm of a row or
/// column vector, the Frobenius norm of a general matrix. All three are
/// the square root of the summed squared cell magnitudes.
fn norm(arg: Value) -> Result<Value> {
    match arg {
        Value::Rational(r) => Ok(Value::Rational(r.abs())),
        Value::Complex(c) => Ok(Value::Rational(c.magnitude())),
        Value::Matrix(m) => {
            let mut sum = Rational::zero();
            for cell in m.cells() {
                let sq = match cell {
                    Value::Rational(r) => r * r,
                    Value::Complex(c) => c.magnitude_squared(),
                    _ => return Err(Error::Type("matrix cells must be scalar".into())),
                };
                sum = &sum + &sq;
            }
            Ok(Value::Rational(sum.sqrt().unwrap_or_else(Rational::zero)))
        }
        other => Err(not_defined("norm", &other)),
    }
}

fn inv(arg: Value) -> Result<Value> {
    match arg {
        Value::Matrix(m) => Ok(Value::Matrix(m.inverse()?)),
        other => Err(Error::Type(format!(
            "inv expects a matrix, got {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;
    use pretty_assertions::assert_eq;

    fn rat(n: i64) -> Value {
        Value::Rational(Rational::from_int(n))
    }

    #[test]
    fn test_trig_respects_angle_mode() {
        let zero = call("sin", rat(0), AngleMode::Radians).unwrap();
        assert_eq!(zero.to_string(), "0");

        let ninety = call("sin", rat(90), AngleMode::Degrees).unwrap();
        assert_eq!(ninety.to_string(), "1");

        let cos180 = call("cos", rat(180), AngleMode::Degrees).unwrap();
        assert!((cos180.to_string().parse::<f64>().unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sqrt_branches() {
        assert_eq!(call("sqrt", rat(4), AngleMode::Radians).unwrap(), rat(2));
        assert_eq!(
            call("sqrt", rat(-4), AngleMode::Radians)
                .unwrap()
                .to_string(),
            "2i"
        );
        let s2 = call("sqrt", rat(2), AngleMode::Radians).unwrap();
        assert!(
            (s2.to_string().parse::<f64>().unwrap() - std::f64::consts::SQRT_2).abs()
                < 1e-12
        );
    }

    #[test]
    fn test_abs_and_norm() {
        let z = Value::Complex(Complex::new(
            Rational::from_int(3),
            Rational::from_int(-4),
        ));
        assert_eq!(call("abs", z, AngleMode::Radians).unwrap(), rat(5));

        let v = Value::Matrix(
            Matrix::new(vec![vec![rat(3), rat(4)]]).unwrap(),
        );
        assert_eq!(call("norm", v, AngleMode::Radians).unwrap(), rat(5));

        let m = Value::Matrix(
            Matrix::new(vec![vec![rat(1), rat(2)], vec![rat(3), rat(4)]]).unwrap(),
        );
        assert!(matches!(
            call("abs", m, AngleMode::Radians),
            Err(Error::Type(_))
        ));
    }

    #[test]
    fn test_floor_ceil() {
        let seven_halves = Value::Rational(Rational::new(7.into(), 2.into()));
        assert_eq!(
            call("floor", seven_halves.clone(), AngleMode::Radians).unwrap(),
            rat(3)
        );
        assert_eq!(
            call("ceil", seven_halves, AngleMode::Radians).unwrap(),
            rat(4)
        );
        let z = Value::Complex(Complex::i());
        assert!(matches!(
            call("floor", z, AngleMode::Radians),
            Err(Error::Type(_))
        ));
    }

    #[test]
    fn test_log_branches() {
        assert_eq!(call("log", rat(1), AngleMode::Radians).unwrap(), rat(0));
        assert!(matches!(
            call("log", rat(0), AngleMode::Radians),
            Err(Error::Domain(_))
        ));
        // log(-1) = iπ
        let neg = call("log", rat(-1), AngleMode::Radians).unwrap();
        match neg {
            Value::Complex(c) => {
                assert!(c.re.to_f64().abs() < 1e-12);
                assert!((c.im.to_f64() - PI).abs() < 1e-12);
            }
            other => panic!("expected complex log, got {other}"),
        }
    }

    #[test]
    fn test_inv_requires_matrix() {
        assert!(matches!(
            call("inv", rat(2), AngleMode::Radians),
            Err(Error::Type(_))
        ));
    }
}
