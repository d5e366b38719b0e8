use crate::error::{Error, Result};
use crate::rational::Rational;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Integer or decimal literal, already an exact rational.
    Number(Rational),
    /// Identifier, including a bare `i`; the parser decides whether an
    /// `i` in operand position is the imaginary unit.
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `^`, and also `**` which lexes as a single equivalent token.
    Caret,

    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,

    Comma,
    Semicolon,
    Equal,
    Question,

    Eof,
}

pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    current_char: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer {
            input,
            position: 0,
            current_char: None,
        };
        lexer.current_char = lexer.input.chars().next();
        lexer
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let start = self.position;

        match self.current_char {
            None => Ok(Token {
                kind: TokenKind::Eof,
                position: start,
                length: 0,
            }),
            Some(ch) => match ch {
                '+' => Ok(self.single(TokenKind::Plus, start)),
                '-' => Ok(self.single(TokenKind::Minus, start)),
                '*' => {
                    self.advance();
                    if self.current_char == Some('*') {
                        self.advance();
                        Ok(Token {
                            kind: TokenKind::Caret,
                            position: start,
                            length: 2,
                        })
                    } else {
                        Ok(Token {
                            kind: TokenKind::Star,
                            position: start,
                            length: 1,
                        })
                    }
                }
                '/' => Ok(self.single(TokenKind::Slash, start)),
                '%' => Ok(self.single(TokenKind::Percent, start)),
                '^' => Ok(self.single(TokenKind::Caret, start)),
                '(' => Ok(self.single(TokenKind::LeftParen, start)),
                ')' => Ok(self.single(TokenKind::RightParen, start)),
                '[' => Ok(self.single(TokenKind::LeftBracket, start)),
                ']' => Ok(self.single(TokenKind::RightBracket, start)),
                ',' => Ok(self.single(TokenKind::Comma, start)),
                ';' => Ok(self.single(TokenKind::Semicolon, start)),
                '=' => Ok(self.single(TokenKind::Equal, start)),
                '?' => Ok(self.single(TokenKind::Question, start)),
                c if c.is_ascii_digit() => self.read_number(start),
                c if c.is_alphabetic() => Ok(self.read_identifier(start)),
                c => Err(Error::Lex {
                    message: format!("unrecognized character '{}'", c),
                    position: start,
                }),
            },
        }
    }

    /// Digit run with an optional `.` and fractional digits. The decimal
    /// point only counts when it follows at least one digit.
    fn read_number(&mut self, start: usize) -> Result<Token> {
        while matches!(self.current_char, Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.current_char == Some('.') {
            self.advance();
            while matches!(self.current_char, Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = &self.input[start..self.position];
        let value = Rational::from_decimal(text).ok_or_else(|| Error::Lex {
            message: format!("malformed number '{}'", text),
            position: start,
        })?;
        Ok(Token {
            kind: TokenKind::Number(value),
            position: start,
            length: self.position - start,
        })
    }

    /// Letter followed by letters, digits or underscores.
    fn read_identifier(&mut self, start: usize) -> Token {
        while matches!(self.current_char, Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        Token {
            kind: TokenKind::Ident(self.input[start..self.position].to_string()),
            position: start,
            length: self.position - start,
        }
    }

    fn single(&mut self, kind: TokenKind, start: usize) -> Token {
        self.advance();
        Token {
            kind,
            position: start,
            length: 1,
        }
    }

    fn advance(&mut self) {
        if let Some(c) = self.current_char {
            self.position += c.len_utf8();
        }
        self.current_char = self.input[self.position..].chars().next();
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char, Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }
}
