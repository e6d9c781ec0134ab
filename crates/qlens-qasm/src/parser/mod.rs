//! Recursive-descent parser for OpenQASM.

mod expression;
mod lowering;
mod statement;

use qlens_ir::Circuit;

use crate::ast::Program;
use crate::error::{ParseError, ParseResult, Position};
use crate::lexer::{SpannedToken, Token, tokenize};

/// Size bounds enforced while a program is lowered to a circuit.
///
/// Registers are checked before any of their bits are allocated, and every
/// gate expansion or emitted instruction counts against `max_operations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_qubits: usize,
    pub max_clbits: usize,
    pub max_operations: usize,
}

impl ParseLimits {
    /// These limits with a different qubit bound.
    #[must_use]
    pub fn with_max_qubits(self, max_qubits: usize) -> Self {
        Self { max_qubits, ..self }
    }
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_qubits: 1024,
            max_clbits: 1024,
            max_operations: 1_000_000,
        }
    }
}

/// Parse OpenQASM source into a circuit under [`ParseLimits::default`].
pub fn parse(source: &str) -> ParseResult<Circuit> {
    parse_with_limits(source, ParseLimits::default())
}

/// Parse OpenQASM source into a circuit, rejecting programs that exceed
/// `limits`.
pub fn parse_with_limits(source: &str, limits: ParseLimits) -> ParseResult<Circuit> {
    let program = parse_program(source)?;
    lowering::lower_to_circuit(&program, limits)
}

/// Parse OpenQASM source into a syntax tree without lowering it.
pub fn parse_program(source: &str) -> ParseResult<Program> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()
}

pub(super) struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> ParseResult<Self> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    pub(super) fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|t| &t.token)
    }

    /// Position of the next token, or of the last token at end of input.
    pub(super) fn position(&self) -> Position {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.pos)
            .unwrap_or_default()
    }

    pub(super) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, expected: &Token) -> ParseResult<()> {
        let pos = self.position();
        match self.advance() {
            Some(found) if std::mem::discriminant(&found) == std::mem::discriminant(expected) => {
                Ok(())
            }
            Some(found) => Err(ParseError::UnexpectedToken {
                pos,
                expected: format!("'{expected}'"),
                found: found.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof(format!("'{expected}'"))),
        }
    }

    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(found) => ParseError::UnexpectedToken {
                pos: self.position(),
                expected: expected.to_string(),
                found: found.to_string(),
            },
            None => ParseError::UnexpectedEof(expected.to_string()),
        }
    }

    fn parse_program(&mut self) -> ParseResult<Program> {
        let version = if self.check(&Token::OpenQasm) {
            Some(self.parse_version()?)
        } else {
            None
        };

        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.parse_statement()?);
        }

        Ok(Program {
            version,
            statements,
        })
    }

    /// `OPENQASM 2.0;` or `OPENQASM 3;`
    fn parse_version(&mut self) -> ParseResult<String> {
        self.expect(&Token::OpenQasm)?;
        let pos = self.position();
        let version = match self.advance() {
            Some(Token::FloatLiteral(v)) => format!("{v:.1}"),
            Some(Token::IntLiteral(v)) => format!("{v}.0"),
            Some(other) => {
                return Err(ParseError::UnsupportedVersion {
                    pos,
                    version: other.to_string(),
                });
            }
            None => return Err(ParseError::UnexpectedEof("version number".into())),
        };
        if !(version.starts_with("2.") || version.starts_with("3.")) {
            return Err(ParseError::UnsupportedVersion { pos, version });
        }
        self.expect(&Token::Semicolon)?;
        Ok(version)
    }

    pub(super) fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(Token::Identifier(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    pub(super) fn parse_identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut ids = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            ids.push(self.parse_identifier()?);
        }
        Ok(ids)
    }

    pub(super) fn parse_u32(&mut self) -> ParseResult<u32> {
        let pos = self.position();
        match self.peek() {
            Some(Token::IntLiteral(v)) => {
                let v = *v;
                self.pos += 1;
                u32::try_from(v).map_err(|_| ParseError::InvalidExpression {
                    pos,
                    message: format!("integer {v} is too large"),
                })
            }
            _ => Err(self.unexpected("integer")),
        }
    }
}
