//! The interpreter session: one environment, one statement at a time.
//!
//! A line is either a session command (`vars`, `angles`) or a statement
//! handed to the lexer and parser, then dispatched by shape: expressions
//! and assignments evaluate, function definitions install silently, and
//! equation queries go to the solver. A statement that fails leaves the
//! environment and angle mode exactly as they were.

use crate::ast::Stmt;
use crate::env::{AngleMode, Bindings, Environment};
use crate::error::{Error, Result};
use crate::eval::eval;
use crate::parser::Parser;
use crate::solver;
use crate::value::{Function, Value};

#[derive(Default)]
pub struct Interpreter {
    env: Environment,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter::default()
    }

    /// Execute one input line. `Ok(None)` means there is nothing to print
    /// (blank input or a function definition).
    pub fn execute(&mut self, line: &str) -> Result<Option<String>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let lowered = line.to_ascii_lowercase();
        match lowered.as_str() {
            "vars" | "display" | "show" => return Ok(Some(self.list_bindings())),
            _ => {}
        }
        if lowered == "angles" || lowered.starts_with("angles ") {
            return self.angles_command(&lowered).map(Some);
        }

        match Parser::parse_line(line)? {
            Stmt::Expr(expr) | Stmt::Eval(expr) => {
                let value = eval(&expr, &self.env)?;
                Ok(Some(value.to_string()))
            }
            Stmt::Assign { name, expr } => {
                let value = eval(&expr, &self.env)?;
                let rendered = value.to_string();
                self.env.define(&name, value);
                Ok(Some(rendered))
            }
            Stmt::FunDef { name, param, body } => {
                let function = Function {
                    name: name.clone(),
                    param,
                    body,
                };
                self.env.define(&name, Value::Function(function));
                Ok(None)
            }
            Stmt::Solve { lhs, rhs } => {
                let report = solver::solve(&lhs, &rhs, &self.env)?;
                Ok(Some(report))
            }
        }
    }

    fn angles_command(&mut self, line: &str) -> Result<String> {
        let mut parts = line.split_whitespace();
        parts.next(); // the command itself
        match (parts.next(), parts.next()) {
            (None, _) => Ok(format!("angle mode: {}", self.env.angle_mode())),
            (Some("rad"), None) => {
                self.env.set_angle_mode(AngleMode::Radians);
                Ok("angle mode set to radians".into())
            }
            (Some("deg"), None) => {
                self.env.set_angle_mode(AngleMode::Degrees);
                Ok("angle mode set to degrees".into())
            }
            _ => Err(Error::Parse {
                message: "usage: angles [rad|deg]".into(),
                position: 0,
            }),
        }
    }

    fn list_bindings(&self) -> String {
        if self.env.is_empty() {
            return "No variables defined".into();
        }
        self.env
            .sorted()
            .into_iter()
            .map(|(name, value)| format!("{} = {}", name, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(interp: &mut Interpreter, line: &str) -> String {
        interp.execute(line).unwrap().unwrap_or_default()
    }

    #[test]
    fn test_assignment_echoes_value() {
        let mut interp = Interpreter::new();
        assert_eq!(run(&mut interp, "x = 2 + 3"), "5");
        assert_eq!(run(&mut interp, "x"), "5");
    }

    #[test]
    fn test_function_definition_is_silent() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.execute("f(t) = t * 2").unwrap(), None);
        assert_eq!(run(&mut interp, "f(21)"), "42");
    }

    #[test]
    fn test_failed_statement_leaves_environment_unchanged() {
        let mut interp = Interpreter::new();
        run(&mut interp, "x = 5");
        assert!(interp.execute("x = 1 / 0").is_err());
        assert_eq!(run(&mut interp, "x"), "5");
        assert!(interp.execute("y = undefined + 1").is_err());
        assert!(interp.execute("y").is_err());
    }

    #[test]
    fn test_vars_listing() {
        let mut interp = Interpreter::new();
        assert_eq!(run(&mut interp, "vars"), "No variables defined");
        run(&mut interp, "b = 2");
        run(&mut interp, "a = 1");
        assert_eq!(run(&mut interp, "vars"), "a = 1\nb = 2");
    }

    #[test]
    fn test_angle_mode_command() {
        let mut interp = Interpreter::new();
        assert_eq!(run(&mut interp, "angles"), "angle mode: radians");
        assert_eq!(run(&mut interp, "angles deg"), "angle mode set to degrees");
        assert_eq!(run(&mut interp, "sin(90)"), "1");
        assert!(interp.execute("angles grad").is_err());
        // the failed toggle did not change the mode
        assert_eq!(run(&mut interp, "angles"), "angle mode: degrees");
    }

    #[test]
    fn test_evaluation_query() {
        let mut interp = Interpreter::new();
        run(&mut interp, "x = 4");
        assert_eq!(run(&mut interp, "x + 1 = ?"), "5");
    }
}
