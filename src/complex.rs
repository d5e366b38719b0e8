//! Complex numbers with rational components.
//!
//! The imaginary unit lexes as `i` and evaluates to `0 + 1i`. Operations
//! here never collapse: a result with a zero imaginary part is folded back
//! into a plain rational at the value layer, so a `Complex` that escapes
//! the algebra always has `im != 0`.

use crate::rational::Rational;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

#[derive(Debug, Clone, PartialEq)]
pub struct Complex {
    pub re: Rational,
    pub im: Rational,
}

impl Complex {
    pub fn new(re: Rational, im: Rational) -> Self {
        Complex { re, im }
    }

    /// The imaginary unit `i`.
    pub fn i() -> Self {
        Complex::new(Rational::zero(), Rational::one())
    }

    pub fn from_rational(re: Rational) -> Self {
        Complex::new(re, Rational::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }

    pub fn is_real(&self) -> bool {
        self.im.is_zero()
    }

    /// `re² + im²`, always exact when the components are.
    pub fn magnitude_squared(&self) -> Rational {
        &(&self.re * &self.re) + &(&self.im * &self.im)
    }

    /// `|z| = sqrt(re² + im²)`; exact when the square is perfect.
    pub fn magnitude(&self) -> Rational {
        self.magnitude_squared()
            .sqrt()
            .unwrap_or_else(Rational::zero)
    }

    pub fn conjugate(&self) -> Complex {
        Complex::new(self.re.clone(), -&self.im)
    }

    /// `(a + bi) / (c + di)`: multiply by the divisor's conjugate and
    /// divide by its squared magnitude. `None` when the divisor is `0 + 0i`.
    pub fn checked_div(&self, other: &Complex) -> Option<Complex> {
        let denom = other.magnitude_squared();
        if denom.is_zero() {
            return None;
        }
        let num = self * &other.conjugate();
        Some(Complex::new(
            num.re.checked_div(&denom)?,
            num.im.checked_div(&denom)?,
        ))
    }

    /// Integer power by squaring. Negative exponents invert first;
    /// `None` for a negative exponent on zero or an oversized exponent.
    pub fn pow(&self, exp: &BigInt) -> Option<Complex> {
        if exp.is_negative() && self.is_zero() {
            return None;
        }
        let base = if exp.is_negative() {
            Complex::from_rational(Rational::one()).checked_div(self)?
        } else {
            self.clone()
        };
        let mut k = exp.abs().to_u32()?;
        let mut acc = Complex::from_rational(Rational::one());
        let mut sq = base;
        while k > 0 {
            if k & 1 == 1 {
                acc = &acc * &sq;
            }
            sq = &sq * &sq;
            k >>= 1;
        }
        Some(acc)
    }

    /// Principal square root: the branch with non-negative real part.
    pub fn sqrt(&self) -> Complex {
        if self.is_zero() {
            return Complex::from_rational(Rational::zero());
        }
        let m = self.magnitude();
        let half = Rational::new(BigInt::from(1), BigInt::from(2));
        let re_sq = &(&m + &self.re) * &half;
        let im_sq = &(&m - &self.re) * &half;
        // Both squares are non-negative up to floating rounding.
        let re = re_sq.sqrt().unwrap_or_else(Rational::zero);
        let im = im_sq.sqrt().unwrap_or_else(Rational::zero);
        let im = if self.im.is_negative() { -&im } else { im };
        Complex::new(re, im)
    }
}

impl Add for &Complex {
    type Output = Complex;

    fn add(self, rhs: &Complex) -> Complex {
        Complex::new(&self.re + &rhs.re, &self.im + &rhs.im)
    }
}

impl Sub for &Complex {
    type Output = Complex;

    fn sub(self, rhs: &Complex) -> Complex {
        Complex::new(&self.re - &rhs.re, &self.im - &rhs.im)
    }
}

impl Mul for &Complex {
    type Output = Complex;

    fn mul(self, rhs: &Complex) -> Complex {
        let re = &(&self.re * &rhs.re) - &(&self.im * &rhs.im);
        let im = &(&self.re * &rhs.im) + &(&self.im * &rhs.re);
        Complex::new(re, im)
    }
}

impl Neg for &Complex {
    type Output = Complex;

    fn neg(self) -> Complex {
        Complex::new(-&self.re, -&self.im)
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im.is_zero() {
            return write!(f, "{}", self.re);
        }
        if self.re.is_zero() {
            return if self.im == Rational::one() {
                write!(f, "i")
            } else if self.im == Rational::from_int(-1) {
                write!(f, "-i")
            } else {
                write!(f, "{}i", self.im)
            };
        }
        if self.im.is_negative() {
            let mag = self.im.abs();
            if mag == Rational::one() {
                write!(f, "{} - i", self.re)
            } else {
                write!(f, "{} - {}i", self.re, mag)
            }
        } else if self.im == Rational::one() {
            write!(f, "{} + i", self.re)
        } else {
            write!(f, "{} + {}i", self.re, self.im)
        }
    }
}
