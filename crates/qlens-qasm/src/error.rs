//! Error types for the OpenQASM front end.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// One-based line and column of a token in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors produced while turning OpenQASM text into a circuit.
///
/// Every variant that can be tied to a location carries a [`Position`]; the
/// message always names the offending text.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Text that is not a valid token.
    #[error("invalid token '{text}' at {pos}")]
    Lexer { pos: Position, text: String },

    #[error("expected {expected} at {pos}, found '{found}'")]
    UnexpectedToken {
        pos: Position,
        expected: String,
        found: String,
    },

    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(String),

    #[error("unsupported OPENQASM version '{version}' at {pos}")]
    UnsupportedVersion { pos: Position, version: String },

    #[error("unsupported include file \"{file}\" at {pos}")]
    UnsupportedInclude { pos: Position, file: String },

    #[error("register '{name}' is not declared ({pos})")]
    UndefinedRegister { pos: Position, name: String },

    #[error("'{name}' is already declared ({pos})")]
    DuplicateDeclaration { pos: Position, name: String },

    #[error("unknown gate '{name}' at {pos}")]
    UnknownGate { pos: Position, name: String },

    #[error("gate '{gate}' expects {expected} qubit(s), got {got} ({pos})")]
    WrongQubitCount {
        pos: Position,
        gate: String,
        expected: usize,
        got: usize,
    },

    #[error("gate '{gate}' expects {expected} parameter(s), got {got} ({pos})")]
    WrongParameterCount {
        pos: Position,
        gate: String,
        expected: usize,
        got: usize,
    },

    #[error("index {index} out of range for register '{register}' of size {size} ({pos})")]
    IndexOutOfBounds {
        pos: Position,
        register: String,
        index: u32,
        size: u32,
    },

    /// Register operands of different sizes in one broadcast statement.
    #[error("registers of different sizes in '{statement}' ({pos})")]
    RegisterSizeMismatch { pos: Position, statement: String },

    #[error("undefined identifier '{name}' in expression ({pos})")]
    UndefinedParameter { pos: Position, name: String },

    #[error("invalid expression at {pos}: {message}")]
    InvalidExpression { pos: Position, message: String },

    /// Operands rejected by the circuit, e.g. the same qubit twice.
    #[error("invalid operands for '{statement}' at {pos}: {message}")]
    InvalidOperands {
        pos: Position,
        statement: String,
        message: String,
    },

    /// A register declaration would take the circuit past the qubit limit.
    #[error("register '{register}' brings the circuit to {required} qubits, at most {limit} allowed ({pos})")]
    QubitLimitExceeded {
        pos: Position,
        register: String,
        required: usize,
        limit: usize,
    },

    #[error("register '{register}' brings the circuit to {required} classical bits, at most {limit} allowed ({pos})")]
    ClbitLimitExceeded {
        pos: Position,
        register: String,
        required: usize,
        limit: usize,
    },

    /// Gate expansion produced more work than the operation budget allows.
    #[error("circuit expands to more than {limit} operations ({pos})")]
    OperationLimitExceeded { pos: Position, limit: usize },

    /// Syntax that is recognised but cannot be turned into a circuit.
    #[error("{feature} is not supported ({pos})")]
    Unsupported { pos: Position, feature: String },

    #[error("circuit error: {0}")]
    Circuit(#[from] qlens_ir::IrError),
}

impl ParseError {
    /// Location of the error, when known.
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::Lexer { pos, .. }
            | ParseError::UnexpectedToken { pos, .. }
            | ParseError::UnsupportedVersion { pos, .. }
            | ParseError::UnsupportedInclude { pos, .. }
            | ParseError::UndefinedRegister { pos, .. }
            | ParseError::DuplicateDeclaration { pos, .. }
            | ParseError::UnknownGate { pos, .. }
            | ParseError::WrongQubitCount { pos, .. }
            | ParseError::WrongParameterCount { pos, .. }
            | ParseError::IndexOutOfBounds { pos, .. }
            | ParseError::RegisterSizeMismatch { pos, .. }
            | ParseError::UndefinedParameter { pos, .. }
            | ParseError::InvalidExpression { pos, .. }
            | ParseError::InvalidOperands { pos, .. }
            | ParseError::QubitLimitExceeded { pos, .. }
            | ParseError::ClbitLimitExceeded { pos, .. }
            | ParseError::OperationLimitExceeded { pos, .. }
            | ParseError::Unsupported { pos, .. } => Some(*pos),
            ParseError::UnexpectedEof(_) | ParseError::Circuit(_) => None,
        }
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
