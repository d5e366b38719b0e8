//! The tree-walking evaluator: one recursive pass over the AST against a
//! set of bindings. All arithmetic goes through the value algebra, so
//! promotion and collapse happen in one place.

use crate::ast::{BinOp, Expr};
use crate::builtins;
use crate::complex::Complex;
use crate::env::{Bindings, Scope};
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::value::Value;

const MAX_CALL_DEPTH: usize = 256;

pub fn eval(expr: &Expr, env: &dyn Bindings) -> Result<Value> {
    eval_at(expr, env, 0)
}

fn eval_at(expr: &Expr, env: &dyn Bindings, depth: usize) -> Result<Value> {
    match expr {
        Expr::Number(r) => Ok(Value::Rational(r.clone())),
        Expr::ImaginaryUnit => Ok(Value::Complex(Complex::i())),
        Expr::Ident(name) => env
            .lookup(name)
            .cloned()
            .ok_or_else(|| Error::Name(format!("undefined variable '{}'", name))),
        Expr::Neg(e) => eval_at(e, env, depth)?.neg(),
        Expr::BinOp { op, lhs, rhs } => {
            let l = eval_at(lhs, env, depth)?;
            let r = eval_at(rhs, env, depth)?;
            match op {
                BinOp::Add => l.add(&r),
                BinOp::Sub => l.sub(&r),
                BinOp::Mul => l.mul(&r),
                BinOp::Div => l.div(&r),
                BinOp::Rem => l.rem(&r),
                BinOp::Pow => l.pow(&r),
            }
        }
        Expr::MatrixLit(rows) => {
            let mut data = Vec::with_capacity(rows.len());
            for row in rows {
                let mut cells = Vec::with_capacity(row.len());
                for cell in row {
                    cells.push(eval_at(cell, env, depth)?);
                }
                data.push(cells);
            }
            Ok(Value::Matrix(Matrix::new(data)?))
        }
        Expr::Call { name, arg } => {
            let lowered = name.to_ascii_lowercase();
            let value = eval_at(arg, env, depth)?;
            if builtins::is_builtin(&lowered) {
                return builtins::call(&lowered, value, env.angle_mode());
            }
            match env.lookup(&lowered) {
                Some(Value::Function(f)) => {
                    if depth >= MAX_CALL_DEPTH {
                        return Err(Error::Domain(
                            "maximum call depth exceeded".into(),
                        ));
                    }
                    let f = f.clone();
                    let scope = Scope::new(env, &f.param, value);
                    eval_at(&f.body, &scope, depth + 1)
                }
                Some(other) => Err(Error::Type(format!(
                    "'{}' is not a function, it is a {}",
                    name,
                    other.type_name()
                ))),
                None => Err(Error::Name(format!("undefined function '{}'", name))),
            }
        }
    }
}
