use crate::{
    ast::{BinOp, Expr, Stmt},
    error::{Error, Result},
    lexer::{Lexer, Token, TokenKind},
    rational::Rational,
};

/// Recursive-descent parser over the token stream.
///
/// Precedence, lowest to highest: the statement-level `=` form classifier,
/// `+`/`-` (left), `*`/`/`/`%` (left, including implicit multiplication),
/// unary `-`, `^` (right), atoms. A bare `i` in operand position is the
/// imaginary unit; an `i` in call or assignment position is an ordinary
/// identifier, and binding it is refused since the name is reserved.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0 }
    }

    pub fn from_source(source: &str) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Parser::new(tokens))
    }

    /// Lex and parse one full input line.
    pub fn parse_line(source: &str) -> Result<Stmt> {
        Parser::from_source(source)?.parse()
    }

    pub fn parse(&mut self) -> Result<Stmt> {
        let stmt = self.statement()?;
        if !self.is_at_end() {
            return Err(Error::Parse {
                message: "unexpected token after statement".into(),
                position: self.current_position(),
            });
        }
        Ok(stmt)
    }

    /// Form classifier: parse a left side, then decide between a bare
    /// expression, an assignment or function definition, an equation
    /// query `lhs = rhs ?`, and an evaluation query `expr = ?`.
    fn statement(&mut self) -> Result<Stmt> {
        let lhs = self.expression()?;

        if !self.match_token(&TokenKind::Equal) {
            return Ok(Stmt::Expr(lhs));
        }
        if self.match_token(&TokenKind::Question) {
            return Ok(Stmt::Eval(lhs));
        }

        let rhs = self.expression()?;
        if self.match_token(&TokenKind::Question) {
            return Ok(Stmt::Solve { lhs, rhs });
        }

        self.classify_binding(lhs, rhs)
    }

    fn classify_binding(&self, lhs: Expr, rhs: Expr) -> Result<Stmt> {
        match lhs {
            Expr::Ident(name) => {
                Self::check_not_reserved(&name, "variable")?;
                Ok(Stmt::Assign { name, expr: rhs })
            }
            Expr::Call { name, arg } => match *arg {
                Expr::Ident(param) => {
                    Self::check_not_reserved(&name, "function")?;
                    Self::check_not_reserved(&param, "parameter")?;
                    Ok(Stmt::FunDef {
                        name,
                        param,
                        body: rhs,
                    })
                }
                // a bare lowercase `i` in operand position already became
                // the imaginary unit, so catch it here as a reserved name
                Expr::ImaginaryUnit => Err(Error::Name(
                    "'i' is reserved for the imaginary unit and cannot be used as a parameter name"
                        .into(),
                )),
                _ => Err(Error::Parse {
                    message: "a function definition takes a single identifier parameter"
                        .into(),
                    position: self.current_position(),
                }),
            },
            Expr::ImaginaryUnit => Err(Error::Name(
                "'i' is reserved for the imaginary unit and cannot be assigned".into(),
            )),
            _ => Err(Error::Parse {
                message: "invalid assignment target".into(),
                position: self.current_position(),
            }),
        }
    }

    fn check_not_reserved(name: &str, role: &str) -> Result<()> {
        if name.eq_ignore_ascii_case("i") {
            return Err(Error::Name(format!(
                "'i' is reserved for the imaginary unit and cannot be used as a {} name",
                role
            )));
        }
        Ok(())
    }

    fn expression(&mut self) -> Result<Expr> {
        let mut expr = self.term()?;

        while let Some(op) = self.match_tokens(&[TokenKind::Plus, TokenKind::Minus]) {
            if self.check(&TokenKind::Plus) || self.check(&TokenKind::Minus) {
                return Err(Error::Parse {
                    message: "consecutive '+' or '-' operators are not allowed".into(),
                    position: self.current_position(),
                });
            }
            let rhs = self.term()?;
            let bin = match op {
                TokenKind::Plus => BinOp::Add,
                _ => BinOp::Sub,
            };
            expr = Expr::binop(bin, expr, rhs);
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;

        loop {
            if let Some(op) = self.match_tokens(&[
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
            ]) {
                let rhs = self.unary()?;
                let bin = match op {
                    TokenKind::Star => BinOp::Mul,
                    TokenKind::Slash => BinOp::Div,
                    _ => BinOp::Rem,
                };
                expr = Expr::binop(bin, expr, rhs);
            } else if self.check_any(&[
                TokenKind::Number(Rational::zero()),
                TokenKind::Ident(String::new()),
                TokenKind::LeftParen,
                TokenKind::LeftBracket,
            ]) {
                // implicit multiplication: `2i`, `3x^2`, `2(x + 1)`
                let rhs = self.unary()?;
                expr = Expr::binop(BinOp::Mul, expr, rhs);
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.match_token(&TokenKind::Minus) {
            let operand = self.unary()?;
            Ok(Expr::neg(operand))
        } else {
            self.power()
        }
    }

    fn power(&mut self) -> Result<Expr> {
        let expr = self.atom()?;

        if self.match_token(&TokenKind::Caret) {
            // right-associative; going through unary() admits `2 ^ -3`
            let rhs = self.unary()?;
            return Ok(Expr::binop(BinOp::Pow, expr, rhs));
        }

        Ok(expr)
    }

    fn atom(&mut self) -> Result<Expr> {
        if self.is_at_end() {
            return Err(Error::Parse {
                message: "unexpected end of input".into(),
                position: self.current_position(),
            });
        }
        let token = match self.advance() {
            Some(t) => t.clone(),
            None => {
                return Err(Error::Parse {
                    message: "unexpected end of input".into(),
                    position: self.current_position(),
                })
            }
        };

        match token.kind {
            TokenKind::Number(value) => Ok(Expr::Number(value)),
            TokenKind::Ident(name) => {
                if self.match_token(&TokenKind::LeftParen) {
                    let arg = self.expression()?;
                    self.consume(
                        &TokenKind::RightParen,
                        "expected ')' after function argument",
                    )?;
                    Ok(Expr::call(name, arg))
                } else if name == "i" {
                    Ok(Expr::ImaginaryUnit)
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            TokenKind::LeftParen => {
                let expr = self.expression()?;
                self.consume(&TokenKind::RightParen, "expected ')' after expression")?;
                Ok(expr)
            }
            TokenKind::LeftBracket => self.matrix_literal(),
            other => Err(Error::Parse {
                message: format!("unexpected token {:?}", other),
                position: token.position,
            }),
        }
    }

    /// Matrix literal with the opening `[` already consumed. Accepts the
    /// nested row form `[[a, b], [c, d]]` (rows joined by `,` or `;`) and
    /// the flat form `[a, b; c, d]`.
    fn matrix_literal(&mut self) -> Result<Expr> {
        if self.check(&TokenKind::RightBracket) {
            return Err(Error::Parse {
                message: "empty matrix literal".into(),
                position: self.current_position(),
            });
        }

        let mut rows = Vec::new();
        if self.check(&TokenKind::LeftBracket) {
            loop {
                self.consume(&TokenKind::LeftBracket, "expected '[' to open a matrix row")?;
                rows.push(self.matrix_row()?);
                if self.match_token(&TokenKind::Comma)
                    || self.match_token(&TokenKind::Semicolon)
                {
                    continue;
                }
                break;
            }
        } else {
            let mut row = Vec::new();
            loop {
                row.push(self.expression()?);
                if self.match_token(&TokenKind::Comma) {
                    continue;
                }
                if self.match_token(&TokenKind::Semicolon) {
                    rows.push(std::mem::take(&mut row));
                    continue;
                }
                break;
            }
            rows.push(row);
        }

        self.consume(&TokenKind::RightBracket, "expected ']' to close the matrix")?;
        Ok(Expr::MatrixLit(rows))
    }

    fn matrix_row(&mut self) -> Result<Vec<Expr>> {
        let mut row = vec![self.expression()?];
        while self.match_token(&TokenKind::Comma) {
            row.push(self.expression()?);
        }
        self.consume(&TokenKind::RightBracket, "expected ']' to close a matrix row")?;
        Ok(row)
    }

    // Helper methods
    fn match_token(&mut self, token_type: &TokenKind) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_tokens(&mut self, types: &[TokenKind]) -> Option<TokenKind> {
        for token_type in types {
            if self.check(token_type) {
                let kind = self.peek().map(|t| t.kind.clone());
                self.advance();
                return kind;
            }
        }
        None
    }

    fn check(&self, token_type: &TokenKind) -> bool {
        if let Some(token) = self.peek() {
            std::mem::discriminant(&token.kind) == std::mem::discriminant(token_type)
        } else {
            false
        }
    }

    fn check_any(&self, token_types: &[TokenKind]) -> bool {
        token_types.iter().any(|t| self.check(t))
    }

    fn advance(&mut self) -> Option<&Token> {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek()
            .map_or(true, |token| matches!(token.kind, TokenKind::Eof))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn previous(&self) -> Option<&Token> {
        if self.current > 0 {
            self.tokens.get(self.current - 1)
        } else {
            None
        }
    }

    fn consume(&mut self, token_type: &TokenKind, message: &str) -> Result<()> {
        if self.check(token_type) {
            self.advance();
            Ok(())
        } else {
            Err(Error::Parse {
                message: message.to_string(),
                position: self.current_position(),
            })
        }
    }

    fn current_position(&self) -> usize {
        self.peek().map(|t| t.position).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_expr(input: &str) -> Expr {
        match Parser::parse_line(input).unwrap() {
            Stmt::Expr(e) => e,
            other => panic!("expected expression, got {other:?}"),
        }
    }

    fn num(n: i64) -> Expr {
        Expr::number(Rational::from_int(n))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse_expr("2 + 3 * 4"),
            Expr::binop(BinOp::Add, num(2), Expr::binop(BinOp::Mul, num(3), num(4)))
        );
        assert_eq!(
            parse_expr("(2 + 3) * 4"),
            Expr::binop(BinOp::Mul, Expr::binop(BinOp::Add, num(2), num(3)), num(4))
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(
            parse_expr("2 ^ 3 ^ 2"),
            Expr::binop(
                BinOp::Pow,
                num(2),
                Expr::binop(BinOp::Pow, num(3), num(2))
            )
        );
        // `**` is the same operator
        assert_eq!(parse_expr("2 ** 3"), parse_expr("2 ^ 3"));
        // negative exponents parse without parentheses
        assert_eq!(
            parse_expr("2 ^ -1"),
            Expr::binop(BinOp::Pow, num(2), Expr::neg(num(1)))
        );
    }

    #[test]
    fn test_unary_minus_binds_below_power() {
        assert_eq!(
            parse_expr("-2 ^ 2"),
            Expr::neg(Expr::binop(BinOp::Pow, num(2), num(2)))
        );
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(
            parse_expr("2i"),
            Expr::binop(BinOp::Mul, num(2), Expr::ImaginaryUnit)
        );
        assert_eq!(
            parse_expr("3x ^ 2"),
            Expr::binop(
                BinOp::Mul,
                num(3),
                Expr::binop(BinOp::Pow, Expr::ident("x"), num(2))
            )
        );
        assert_eq!(
            parse_expr("2(x + 1)"),
            Expr::binop(
                BinOp::Mul,
                num(2),
                Expr::binop(BinOp::Add, Expr::ident("x"), num(1))
            )
        );
    }

    #[test]
    fn test_imaginary_unit_vs_identifier() {
        assert_eq!(parse_expr("i"), Expr::ImaginaryUnit);
        // in call position `i` is an ordinary name
        assert_eq!(parse_expr("i(2)"), Expr::call("i", num(2)));
        assert_eq!(parse_expr("inv(2)"), Expr::call("inv", num(2)));
    }

    #[test]
    fn test_consecutive_sign_operators_rejected() {
        assert!(Parser::parse_line("2 + -3").is_err());
        assert!(Parser::parse_line("2 - -3").is_err());
        // unary minus after `*` is fine
        assert_eq!(
            parse_expr("2 * -3"),
            Expr::binop(BinOp::Mul, num(2), Expr::neg(num(3)))
        );
    }

    #[test]
    fn test_statement_forms() {
        assert_eq!(
            Parser::parse_line("x = 5").unwrap(),
            Stmt::Assign {
                name: "x".into(),
                expr: num(5)
            }
        );
        assert_eq!(
            Parser::parse_line("f(t) = t + 1").unwrap(),
            Stmt::FunDef {
                name: "f".into(),
                param: "t".into(),
                body: Expr::binop(BinOp::Add, Expr::ident("t"), num(1))
            }
        );
        assert_eq!(
            Parser::parse_line("2 * x = 8 ?").unwrap(),
            Stmt::Solve {
                lhs: Expr::binop(BinOp::Mul, num(2), Expr::ident("x")),
                rhs: num(8)
            }
        );
        assert_eq!(
            Parser::parse_line("1 + 2 = ?").unwrap(),
            Stmt::Eval(Expr::binop(BinOp::Add, num(1), num(2)))
        );
    }

    #[test]
    fn test_reserved_imaginary_lvalue() {
        assert!(matches!(Parser::parse_line("i = 3"), Err(Error::Name(_))));
        assert!(matches!(Parser::parse_line("I = 3"), Err(Error::Name(_))));
        assert!(matches!(
            Parser::parse_line("i(x) = x + 1"),
            Err(Error::Name(_))
        ));
        assert!(matches!(
            Parser::parse_line("f(i) = i + 1"),
            Err(Error::Name(_))
        ));
    }

    #[test]
    fn test_matrix_literals() {
        let expected = Expr::matrix(vec![vec![num(1), num(2)], vec![num(3), num(4)]]);
        assert_eq!(parse_expr("[[1, 2], [3, 4]]"), expected);
        assert_eq!(parse_expr("[[1, 2]; [3, 4]]"), expected);
        assert_eq!(parse_expr("[1, 2; 3, 4]"), expected);
        assert!(Parser::parse_line("[]").is_err());
        assert!(Parser::parse_line("[[1, 2], [3, 4]").is_err());
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(Parser::parse_line("1 + 2 )").is_err());
        assert!(Parser::parse_line("x = 3 = 4").is_err());
    }
}
