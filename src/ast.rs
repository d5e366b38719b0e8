use crate::rational::Rational;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Pow => "^",
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 2,
            BinOp::Mul | BinOp::Div | BinOp::Rem => 3,
            BinOp::Pow => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(Rational),
    ImaginaryUnit,
    Ident(String),
    Neg(Box<Expr>),
    BinOp {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        arg: Box<Expr>,
    },
    MatrixLit(Vec<Vec<Expr>>),
}

/// One fully classified input line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Bare expression: evaluate and print the value.
    Expr(Expr),
    /// `name = expr`: bind and echo the value.
    Assign { name: String, expr: Expr },
    /// `name(param) = body`: install a single-argument function, silently.
    FunDef {
        name: String,
        param: String,
        body: Expr,
    },
    /// `lhs = rhs ?`: reduce and solve for the unknown.
    Solve { lhs: Expr, rhs: Expr },
    /// `expr = ?`: evaluation query.
    Eval(Expr),
}

impl Expr {
    pub fn number(value: Rational) -> Self {
        Expr::Number(value)
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn neg(operand: Expr) -> Self {
        Expr::Neg(Box::new(operand))
    }

    pub fn binop(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::BinOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn call(name: impl Into<String>, arg: Expr) -> Self {
        Expr::Call {
            name: name.into(),
            arg: Box::new(arg),
        }
    }

    pub fn matrix(rows: Vec<Vec<Expr>>) -> Self {
        Expr::MatrixLit(rows)
    }

    fn render_child(child: &Expr, parent: BinOp) -> String {
        match child {
            Expr::BinOp { op, .. }
                if op.precedence() < parent.precedence() || parent == BinOp::Pow =>
            {
                format!("({})", child)
            }
            _ => format!("{}", child),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(r) => write!(f, "{}", r),
            Expr::ImaginaryUnit => write!(f, "i"),
            Expr::Ident(name) => write!(f, "{}", name),
            Expr::Neg(e) => {
                if matches!(e.as_ref(), Expr::BinOp { .. }) {
                    write!(f, "-({})", e)
                } else {
                    write!(f, "-{}", e)
                }
            }
            Expr::BinOp { op, lhs, rhs } => {
                let l = Expr::render_child(lhs, *op);
                let r = Expr::render_child(rhs, *op);
                if *op == BinOp::Pow {
                    write!(f, "{}^{}", l, r)
                } else {
                    write!(f, "{} {} {}", l, op.symbol(), r)
                }
            }
            Expr::Call { name, arg } => write!(f, "{}({})", name, arg),
            Expr::MatrixLit(rows) => {
                write!(f, "[ ")?;
                for (i, row) in rows.iter().enumerate() {
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
    }
}
