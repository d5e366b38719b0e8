//! Equation queries: reduce `lhs = rhs` to `Σ c_k · u^k = 0`, report the
//! canonical form and degree, and solve for degrees up to two.
//!
//! The reducer walks the difference of the two sides and collects a
//! coefficient map keyed by power of the unknown. Coefficient arithmetic
//! is ordinary value arithmetic, so coefficients may be complex and the
//! discriminant branches accordingly. User-defined function calls are
//! inlined by substitution before the walk, which lets `f(x) = 0 ?` solve
//! the body of `f`.

use crate::ast::{BinOp, Expr};
use crate::complex::Complex;
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::eval::eval;
use crate::rational::Rational;
use crate::value::Value;
use num_traits::ToPrimitive;
use std::collections::{BTreeMap, BTreeSet};

/// Coefficient map: power of the unknown to its collected coefficient.
type Poly = BTreeMap<u32, Value>;

const MAX_INLINE_DEPTH: usize = 64;

pub fn solve(lhs: &Expr, rhs: &Expr, env: &Environment) -> Result<String> {
    let lhs = inline_calls(lhs, env, 0)?;
    let rhs = inline_calls(rhs, env, 0)?;

    let unknown = find_unknown(&lhs, &rhs, env)?;

    let left = collect(&lhs, &unknown, env)?;
    let right = collect(&rhs, &unknown, env)?;
    let mut coeffs = poly_sub(left, right)?;
    coeffs.retain(|_, v| !v.is_zero());

    let degree = coeffs.keys().next_back().copied().unwrap_or(0);
    if degree > 2 {
        return Err(Error::Unsupported("degree > 2 unsupported".into()));
    }

    let mut out = Vec::new();
    out.push(format!(
        "Reduced form: {} = 0",
        render_poly(&coeffs, &unknown)
    ));
    out.push(format!("Polynomial degree: {}", degree));

    match degree {
        0 => {
            if coeffs.is_empty() {
                out.push("any real number is a solution".into());
            } else {
                out.push("no solution".into());
            }
        }
        1 => {
            let b = coeff(&coeffs, 1);
            let c = coeff(&coeffs, 0);
            let solution = c.neg()?.div(&b)?;
            out.push("The solution is:".into());
            out.push(solution.to_string());
        }
        _ => solve_quadratic(&coeffs, &mut out)?,
    }

    Ok(out.join("\n"))
}

/// The unknown is the unique free identifier on either side. An equation
/// with no unknown, or with several, is rejected.
fn find_unknown(lhs: &Expr, rhs: &Expr, env: &Environment) -> Result<String> {
    let mut free = BTreeSet::new();
    collect_free(lhs, env, &mut free);
    collect_free(rhs, env, &mut free);

    let mut names = free.into_iter();
    match (names.next(), names.next()) {
        (Some(unknown), None) => Ok(unknown),
        (None, _) => Err(Error::Shape("the equation contains no unknown".into())),
        (Some(a), Some(b)) => Err(Error::Shape(format!(
            "the equation has more than one unknown: {}, {}",
            a, b
        ))),
    }
}

fn collect_free(expr: &Expr, env: &Environment, free: &mut BTreeSet<String>) {
    match expr {
        Expr::Ident(name) => {
            if !env.is_bound(name) {
                free.insert(name.to_ascii_lowercase());
            }
        }
        Expr::Neg(e) => collect_free(e, env, free),
        Expr::BinOp { lhs, rhs, .. } => {
            collect_free(lhs, env, free);
            collect_free(rhs, env, free);
        }
        Expr::Call { arg, .. } => collect_free(arg, env, free),
        Expr::MatrixLit(rows) => {
            for row in rows {
                for cell in row {
                    collect_free(cell, env, free);
                }
            }
        }
        Expr::Number(_) | Expr::ImaginaryUnit => {}
    }
}

fn contains_ident(expr: &Expr, name: &str) -> bool {
    match expr {
        Expr::Ident(n) => n.eq_ignore_ascii_case(name),
        Expr::Neg(e) => contains_ident(e, name),
        Expr::BinOp { lhs, rhs, .. } => {
            contains_ident(lhs, name) || contains_ident(rhs, name)
        }
        Expr::Call { arg, .. } => contains_ident(arg, name),
        Expr::MatrixLit(rows) => rows
            .iter()
            .any(|row| row.iter().any(|cell| contains_ident(cell, name))),
        Expr::Number(_) | Expr::ImaginaryUnit => false,
    }
}

/// Replace calls to user-defined functions with their bodies, the
/// parameter substituted by the (itself inlined) argument expression.
fn inline_calls(expr: &Expr, env: &Environment, depth: usize) -> Result<Expr> {
    match expr {
        Expr::Call { name, arg } => {
            let arg = inline_calls(arg, env, depth)?;
            match env.get(name) {
                Some(Value::Function(f)) => {
                    if depth >= MAX_INLINE_DEPTH {
                        return Err(Error::Domain("maximum call depth exceeded".into()));
                    }
                    let f = f.clone();
                    let body = substitute(&f.body, &f.param, &arg);
                    inline_calls(&body, env, depth + 1)
                }
                _ => Ok(Expr::call(name.clone(), arg)),
            }
        }
        Expr::Neg(e) => Ok(Expr::neg(inline_calls(e, env, depth)?)),
        Expr::BinOp { op, lhs, rhs } => Ok(Expr::binop(
            *op,
            inline_calls(lhs, env, depth)?,
            inline_calls(rhs, env, depth)?,
        )),
        Expr::MatrixLit(rows) => {
            let rows = rows
                .iter()
                .map(|row| row.iter().map(|c| inline_calls(c, env, depth)).collect())
                .collect::<Result<Vec<Vec<Expr>>>>()?;
            Ok(Expr::MatrixLit(rows))
        }
        leaf => Ok(leaf.clone()),
    }
}

fn substitute(expr: &Expr, param: &str, replacement: &Expr) -> Expr {
    match expr {
        Expr::Ident(name) if name.eq_ignore_ascii_case(param) => replacement.clone(),
        Expr::Neg(e) => Expr::neg(substitute(e, param, replacement)),
        Expr::BinOp { op, lhs, rhs } => Expr::binop(
            *op,
            substitute(lhs, param, replacement),
            substitute(rhs, param, replacement),
        ),
        Expr::Call { name, arg } => {
            Expr::call(name.clone(), substitute(arg, param, replacement))
        }
        Expr::MatrixLit(rows) => Expr::MatrixLit(
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|c| substitute(c, param, replacement))
                        .collect()
                })
                .collect(),
        ),
        leaf => leaf.clone(),
    }
}

fn non_polynomial() -> Error {
    Error::Unsupported("non-polynomial equation".into())
}

/// Collect the coefficient map of `expr` seen as a polynomial in the
/// unknown. Subtrees free of the unknown evaluate to their value and land
/// on the constant coefficient.
fn collect(expr: &Expr, unknown: &str, env: &Environment) -> Result<Poly> {
    if !contains_ident(expr, unknown) {
        let value = eval(expr, env)?;
        if !value.is_scalar() {
            return Err(Error::Type(format!(
                "equation coefficients must be numeric, got {}",
                value.type_name()
            )));
        }
        let mut poly = Poly::new();
        if !value.is_zero() {
            poly.insert(0, value);
        }
        return Ok(poly);
    }

    match expr {
        Expr::Ident(_) => {
            let mut poly = Poly::new();
            poly.insert(1, Value::one());
            Ok(poly)
        }
        Expr::Neg(e) => {
            let mut poly = collect(e, unknown, env)?;
            for value in poly.values_mut() {
                *value = value.neg()?;
            }
            Ok(poly)
        }
        Expr::BinOp { op, lhs, rhs } => match op {
            BinOp::Add => poly_add(
                collect(lhs, unknown, env)?,
                collect(rhs, unknown, env)?,
            ),
            BinOp::Sub => poly_sub(
                collect(lhs, unknown, env)?,
                collect(rhs, unknown, env)?,
            ),
            BinOp::Mul => poly_mul(
                &collect(lhs, unknown, env)?,
                &collect(rhs, unknown, env)?,
            ),
            BinOp::Div => {
                if contains_ident(rhs, unknown) {
                    return Err(non_polynomial());
                }
                let divisor = eval(rhs, env)?;
                if divisor.is_zero() {
                    return Err(Error::Domain("division by zero".into()));
                }
                let mut poly = collect(lhs, unknown, env)?;
                for value in poly.values_mut() {
                    *value = value.div(&divisor)?;
                }
                Ok(poly)
            }
            BinOp::Pow => {
                if contains_ident(rhs, unknown) {
                    return Err(non_polynomial());
                }
                // only the literal form `u^k` is a polynomial term
                if !matches!(lhs.as_ref(), Expr::Ident(n) if n.eq_ignore_ascii_case(unknown))
                {
                    return Err(non_polynomial());
                }
                let exponent = match rhs.as_ref() {
                    Expr::Number(r) if r.is_integer() && !r.is_negative() => r
                        .as_integer()
                        .and_then(|n| n.to_u32())
                        .ok_or_else(|| {
                            Error::Unsupported("degree > 2 unsupported".into())
                        })?,
                    _ => return Err(non_polynomial()),
                };
                let mut poly = Poly::new();
                poly.insert(exponent, Value::one());
                Ok(poly)
            }
            BinOp::Rem => Err(non_polynomial()),
        },
        _ => Err(non_polynomial()),
    }
}

fn poly_add(mut a: Poly, b: Poly) -> Result<Poly> {
    for (k, v) in b {
        let merged = match a.remove(&k) {
            Some(current) => current.add(&v)?,
            None => v,
        };
        a.insert(k, merged);
    }
    Ok(a)
}

fn poly_sub(mut a: Poly, b: Poly) -> Result<Poly> {
    for (k, v) in b {
        let merged = match a.remove(&k) {
            Some(current) => current.sub(&v)?,
            None => v.neg()?,
        };
        a.insert(k, merged);
    }
    Ok(a)
}

fn poly_mul(a: &Poly, b: &Poly) -> Result<Poly> {
    let mut product = Poly::new();
    for (ka, va) in a {
        for (kb, vb) in b {
            let k = ka
                .checked_add(*kb)
                .ok_or_else(|| Error::Unsupported("degree > 2 unsupported".into()))?;
            let term = va.mul(vb)?;
            let merged = match product.remove(&k) {
                Some(current) => current.add(&term)?,
                None => term,
            };
            product.insert(k, merged);
        }
    }
    Ok(product)
}

fn coeff(coeffs: &Poly, k: u32) -> Value {
    coeffs.get(&k).cloned().unwrap_or_else(Value::zero)
}

/// Canonical rendering: terms in descending power, unit coefficients
/// elided, `*` between an explicit coefficient and the unknown, complex
/// coefficients parenthesized.
fn render_poly(coeffs: &Poly, unknown: &str) -> String {
    if coeffs.is_empty() {
        return "0".into();
    }

    let mut out = String::new();
    for (k, c) in coeffs.iter().rev() {
        let (negative, magnitude) = match c {
            Value::Rational(r) if r.is_negative() => (true, (-r).to_string()),
            Value::Rational(r) => (false, r.to_string()),
            other => (false, format!("({})", other)),
        };
        let variable = match k {
            0 => String::new(),
            1 => unknown.to_string(),
            _ => format!("{}^{}", unknown, k),
        };
        let term = if variable.is_empty() {
            magnitude
        } else if magnitude == "1" {
            variable
        } else {
            format!("{} * {}", magnitude, variable)
        };

        if out.is_empty() {
            if negative {
                out.push('-');
            }
            out.push_str(&term);
        } else {
            out.push_str(if negative { " - " } else { " + " });
            out.push_str(&term);
        }
    }
    out
}

fn solve_quadratic(coeffs: &Poly, out: &mut Vec<String>) -> Result<()> {
    let a = coeff(coeffs, 2);
    let b = coeff(coeffs, 1);
    let c = coeff(coeffs, 0);

    let four = Value::Rational(Rational::from_int(4));
    let discriminant = b.mul(&b)?.sub(&four.mul(&a)?.mul(&c)?)?;
    out.push(format!("Discriminant: {}", discriminant));

    let two_a = Value::Rational(Rational::from_int(2)).mul(&a)?;
    let neg_b = b.neg()?;

    match &discriminant {
        Value::Rational(d) => {
            if d.is_positive() {
                let root = Value::Rational(d.sqrt().unwrap_or_else(Rational::zero));
                let first = neg_b.add(&root)?.div(&two_a)?;
                let second = neg_b.sub(&root)?.div(&two_a)?;
                out.push(
                    "Discriminant is strictly positive, the two solutions are:".into(),
                );
                out.push(first.to_string());
                out.push(second.to_string());
            } else if d.is_zero() {
                let solution = neg_b.div(&two_a)?;
                out.push("Discriminant is zero, the solution is:".into());
                out.push(solution.to_string());
            } else {
                let root = d.abs().sqrt().unwrap_or_else(Rational::zero);
                let imaginary = Value::Complex(Complex::new(Rational::zero(), root));
                let first = neg_b.add(&imaginary)?.div(&two_a)?;
                let second = neg_b.sub(&imaginary)?.div(&two_a)?;
                out.push(
                    "Discriminant is strictly negative, the two complex solutions are:"
                        .into(),
                );
                out.push(first.to_string());
                out.push(second.to_string());
            }
        }
        Value::Complex(d) => {
            let root = Value::from_complex(d.sqrt());
            let first = neg_b.add(&root)?.div(&two_a)?;
            let second = neg_b.sub(&root)?.div(&two_a)?;
            out.push("Discriminant is complex, the two complex solutions are:".into());
            out.push(first.to_string());
            out.push(second.to_string());
        }
        other => {
            return Err(Error::Type(format!(
                "equation coefficients must be numeric, got {}",
                other.type_name()
            )))
        }
    }
    Ok(())
}
