//! Exact rational numbers with a floating fallback.
//!
//! `Exact` values keep a reduced `num/den` pair of big integers with a
//! positive denominator; every constructor re-normalizes. `Approx` is the
//! distinguished floating constructor produced by transcendental functions
//! and inexact square roots. Exact arithmetic stays exact; any operation
//! touching an `Approx` operand yields an `Approx` result.

use num_bigint::BigInt;
use num_integer::{Integer, Roots};
use num_traits::{FromPrimitive, One, Pow, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Rational {
    Exact { num: BigInt, den: BigInt },
    Approx(f64),
}

impl Rational {
    /// Build `num/den` in lowest terms with a positive denominator.
    /// Callers guarantee `den != 0`; division goes through `checked_div`.
    pub fn new(num: BigInt, den: BigInt) -> Self {
        debug_assert!(!den.is_zero());
        if num.is_zero() {
            return Rational::Exact {
                num: BigInt::zero(),
                den: BigInt::one(),
            };
        }
        let g = num.gcd(&den);
        let mut num = &num / &g;
        let mut den = &den / &g;
        if den.is_negative() {
            num = -num;
            den = -den;
        }
        Rational::Exact { num, den }
    }

    pub fn from_int(n: i64) -> Self {
        Rational::Exact {
            num: BigInt::from(n),
            den: BigInt::one(),
        }
    }

    pub fn from_bigint(n: BigInt) -> Self {
        Rational::Exact {
            num: n,
            den: BigInt::one(),
        }
    }

    pub fn from_f64(f: f64) -> Self {
        Rational::Approx(f)
    }

    pub fn zero() -> Self {
        Rational::from_int(0)
    }

    pub fn one() -> Self {
        Rational::from_int(1)
    }

    /// Parse a digit run with an optional fractional part, e.g. `"3.25"`
    /// becomes `325/100` reduced to `13/4`. The value stays exact.
    pub fn from_decimal(text: &str) -> Option<Self> {
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, f),
            None => (text, ""),
        };
        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let digits = format!("{int_part}{frac_part}");
        let num: BigInt = digits.parse().ok()?;
        let den = Pow::pow(&BigInt::from(10), frac_part.len());
        Some(Rational::new(num, den))
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Rational::Exact { .. })
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Rational::Exact { num, .. } => num.is_zero(),
            Rational::Approx(f) => *f == 0.0,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Rational::Exact { num, .. } => num.is_negative(),
            Rational::Approx(f) => *f < 0.0,
        }
    }

    pub fn is_positive(&self) -> bool {
        match self {
            Rational::Exact { num, .. } => num.is_positive(),
            Rational::Approx(f) => *f > 0.0,
        }
    }

    /// True for exact values with denominator one. `Approx` is never an
    /// integer for exponentiation purposes.
    pub fn is_integer(&self) -> bool {
        match self {
            Rational::Exact { den, .. } => den.is_one(),
            Rational::Approx(_) => false,
        }
    }

    pub fn as_integer(&self) -> Option<BigInt> {
        match self {
            Rational::Exact { num, den } if den.is_one() => Some(num.clone()),
            _ => None,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Rational::Exact { num, den } => {
                num.to_f64().unwrap_or(f64::NAN) / den.to_f64().unwrap_or(f64::NAN)
            }
            Rational::Approx(f) => *f,
        }
    }

    pub fn abs(&self) -> Rational {
        if self.is_negative() {
            -self
        } else {
            self.clone()
        }
    }

    pub fn floor(&self) -> Rational {
        match self {
            Rational::Exact { num, den } => Rational::from_bigint(num.div_floor(den)),
            Rational::Approx(f) => match BigInt::from_f64(f.floor()) {
                Some(n) => Rational::from_bigint(n),
                None => Rational::Approx(f.floor()),
            },
        }
    }

    pub fn ceil(&self) -> Rational {
        match self {
            Rational::Exact { num, den } => Rational::from_bigint(num.div_ceil(den)),
            Rational::Approx(f) => match BigInt::from_f64(f.ceil()) {
                Some(n) => Rational::from_bigint(n),
                None => Rational::Approx(f.ceil()),
            },
        }
    }

    /// Integer power. Negative exponents invert; `None` for a negative
    /// exponent on zero or an exponent too large to represent.
    pub fn pow(&self, exp: &BigInt) -> Option<Rational> {
        if exp.is_negative() && self.is_zero() {
            return None;
        }
        match self {
            Rational::Exact { num, den } => {
                let k = exp.abs().to_u32()?;
                let n = Pow::pow(num, k);
                let d = Pow::pow(den, k);
                if exp.is_negative() {
                    Some(Rational::new(d, n))
                } else {
                    Some(Rational::new(n, d))
                }
            }
            Rational::Approx(f) => {
                let k = exp.to_i32()?;
                Some(Rational::Approx(f.powi(k)))
            }
        }
    }

    /// Principal square root of a non-negative value. Exact when numerator
    /// and denominator are both perfect squares, floating otherwise.
    /// `None` for negative input (the caller builds a complex value).
    pub fn sqrt(&self) -> Option<Rational> {
        if self.is_negative() {
            return None;
        }
        match self {
            Rational::Exact { num, den } => {
                let sn = num.sqrt();
                let sd = den.sqrt();
                if &sn * &sn == *num && &sd * &sd == *den {
                    Some(Rational::new(sn, sd))
                } else {
                    Some(Rational::Approx(self.to_f64().sqrt()))
                }
            }
            Rational::Approx(f) => Some(Rational::Approx(f.sqrt())),
        }
    }

    pub fn checked_div(&self, other: &Rational) -> Option<Rational> {
        if other.is_zero() {
            return None;
        }
        match (self, other) {
            (
                Rational::Exact { num: n1, den: d1 },
                Rational::Exact { num: n2, den: d2 },
            ) => Some(Rational::new(n1 * d2, d1 * n2)),
            _ => Some(Rational::Approx(self.to_f64() / other.to_f64())),
        }
    }

    /// Remainder with the sign convention of the floor quotient:
    /// `a % b = a - b * floor(a / b)`.
    pub fn checked_rem(&self, other: &Rational) -> Option<Rational> {
        let q = self.checked_div(other)?.floor();
        Some(self - &(other * &q))
    }
}

impl Add for &Rational {
    type Output = Rational;

    fn add(self, rhs: &Rational) -> Rational {
        match (self, rhs) {
            (
                Rational::Exact { num: n1, den: d1 },
                Rational::Exact { num: n2, den: d2 },
            ) => Rational::new(n1 * d2 + n2 * d1, d1 * d2),
            _ => Rational::Approx(self.to_f64() + rhs.to_f64()),
        }
    }
}

impl Sub for &Rational {
    type Output = Rational;

    fn sub(self, rhs: &Rational) -> Rational {
        match (self, rhs) {
            (
                Rational::Exact { num: n1, den: d1 },
                Rational::Exact { num: n2, den: d2 },
            ) => Rational::new(n1 * d2 - n2 * d1, d1 * d2),
            _ => Rational::Approx(self.to_f64() - rhs.to_f64()),
        }
    }
}

impl Mul for &Rational {
    type Output = Rational;

    fn mul(self, rhs: &Rational) -> Rational {
        match (self, rhs) {
            (
                Rational::Exact { num: n1, den: d1 },
                Rational::Exact { num: n2, den: d2 },
            ) => Rational::new(n1 * n2, d1 * d2),
            _ => Rational::Approx(self.to_f64() * rhs.to_f64()),
        }
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        match self {
            Rational::Exact { num, den } => Rational::Exact {
                num: -num,
                den: den.clone(),
            },
            Rational::Approx(f) => Rational::Approx(-f),
        }
    }
}

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Rational::Exact { num: n1, den: d1 },
                Rational::Exact { num: n2, den: d2 },
            ) => n1 == n2 && d1 == d2,
            _ => self.to_f64() == other.to_f64(),
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (
                Rational::Exact { num: n1, den: d1 },
                Rational::Exact { num: n2, den: d2 },
            ) => Some((n1 * d2).cmp(&(n2 * d1))),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rational::Exact { num, den } => {
                if den.is_one() {
                    write!(f, "{}", num)
                } else {
                    write!(f, "{}/{}", num, den)
                }
            }
            Rational::Approx(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_construction_normalizes() {
        let r = Rational::new(BigInt::from(4), BigInt::from(-6));
        assert_eq!(r.to_string(), "-2/3");

        let z = Rational::new(BigInt::from(0), BigInt::from(-5));
        assert_eq!(z, Rational::zero());
        assert_eq!(z.to_string(), "0");
    }

    #[test]
    fn test_arithmetic_stays_reduced() {
        let a = Rational::new(BigInt::from(1), BigInt::from(6));
        let b = Rational::new(BigInt::from(1), BigInt::from(3));
        assert_eq!((&a + &b).to_string(), "1/2");
        assert_eq!((&a - &b).to_string(), "-1/6");
        assert_eq!((&a * &b).to_string(), "1/18");
    }

    #[test]
    fn test_division() {
        let a = Rational::from_int(7);
        let b = Rational::from_int(2);
        assert_eq!(a.checked_div(&b).map(|r| r.to_string()), Some("7/2".into()));
        assert_eq!(a.checked_div(&Rational::zero()), None);
    }

    #[test]
    fn test_decimal_literal_is_exact() {
        let r = Rational::from_decimal("3.25").unwrap();
        assert_eq!(r.to_string(), "13/4");
        let r = Rational::from_decimal("42").unwrap();
        assert_eq!(r.to_string(), "42");
        assert!(Rational::from_decimal(".5").is_none());
    }

    #[test]
    fn test_integer_power() {
        let r = Rational::new(BigInt::from(2), BigInt::from(3));
        assert_eq!(
            r.pow(&BigInt::from(3)).map(|v| v.to_string()),
            Some("8/27".into())
        );
        assert_eq!(
            r.pow(&BigInt::from(-2)).map(|v| v.to_string()),
            Some("9/4".into())
        );
        assert_eq!(Rational::zero().pow(&BigInt::from(-1)), None);
    }

    #[test]
    fn test_sqrt_exact_and_approx() {
        let r = Rational::new(BigInt::from(9), BigInt::from(4));
        assert_eq!(r.sqrt().map(|v| v.to_string()), Some("3/2".into()));

        let two = Rational::from_int(2);
        let s = two.sqrt().unwrap();
        assert!(!s.is_exact());
        assert!((s.to_f64() - std::f64::consts::SQRT_2).abs() < 1e-12);

        assert_eq!(Rational::from_int(-1).sqrt(), None);
    }

    #[test]
    fn test_ordering_mixed() {
        let half = Rational::new(BigInt::from(1), BigInt::from(2));
        let third = Rational::new(BigInt::from(1), BigInt::from(3));
        assert!(half > third);
        assert!(Rational::Approx(0.4) < half);
    }

    #[test]
    fn test_floor_ceil_remainder() {
        let r = Rational::new(BigInt::from(-7), BigInt::from(2));
        assert_eq!(r.floor().to_string(), "-4");
        assert_eq!(r.ceil().to_string(), "-3");

        let a = Rational::from_int(-7);
        let b = Rational::from_int(3);
        assert_eq!(a.checked_rem(&b).map(|v| v.to_string()), Some("2".into()));
        assert_eq!(a.checked_rem(&Rational::zero()), None);
    }
}
