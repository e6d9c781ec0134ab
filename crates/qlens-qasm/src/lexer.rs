//! Lexer for OpenQASM 2.0 and the OpenQASM 3 subset accepted by the parser.

use logos::Logos;

use crate::error::{ParseError, ParseResult, Position};

/// Tokens shared by both language versions.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
pub enum Token {
    // Keywords
    #[token("OPENQASM")]
    OpenQasm,
    #[token("include")]
    Include,
    #[token("qreg")]
    Qreg,
    #[token("creg")]
    Creg,
    #[token("qubit")]
    Qubit,
    #[token("bit")]
    Bit,
    #[token("gate")]
    Gate,
    #[token("opaque")]
    Opaque,
    #[token("measure")]
    Measure,
    #[token("reset")]
    Reset,
    #[token("barrier")]
    Barrier,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("def")]
    Def,

    // Constants
    #[token("pi")]
    #[token("π")]
    Pi,
    #[token("tau")]
    #[token("τ")]
    Tau,
    #[token("euler")]
    Euler,

    // Literals
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    FloatLiteral(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    IntLiteral(u64),

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        Some(s[1..s.len() - 1].to_string())
    })]
    StringLiteral(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Operators and punctuation
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("**")]
    Power,
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("->")]
    Arrow,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Token::OpenQasm => "OPENQASM",
            Token::Include => "include",
            Token::Qreg => "qreg",
            Token::Creg => "creg",
            Token::Qubit => "qubit",
            Token::Bit => "bit",
            Token::Gate => "gate",
            Token::Opaque => "opaque",
            Token::Measure => "measure",
            Token::Reset => "reset",
            Token::Barrier => "barrier",
            Token::If => "if",
            Token::Else => "else",
            Token::For => "for",
            Token::While => "while",
            Token::Def => "def",
            Token::Pi => "pi",
            Token::Tau => "tau",
            Token::Euler => "euler",
            Token::FloatLiteral(v) => return write!(f, "{v}"),
            Token::IntLiteral(v) => return write!(f, "{v}"),
            Token::StringLiteral(s) => return write!(f, "\"{s}\""),
            Token::Identifier(s) => s,
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Caret => "^",
            Token::Power => "**",
            Token::EqEq => "==",
            Token::Eq => "=",
            Token::Arrow => "->",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Semicolon => ";",
            Token::Colon => ":",
            Token::Comma => ",",
        };
        f.write_str(text)
    }
}

/// A token with its location in the source.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub pos: Position,
}

/// Maps byte offsets to line/column positions.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn position(&self, source: &str, offset: usize) -> Position {
        let line = self.starts.partition_point(|&s| s <= offset);
        let start = self.starts[line - 1];
        let column = source[start..offset].chars().count() + 1;
        Position::new(line, column)
    }
}

/// Tokenize a source string, failing on the first invalid token.
pub fn tokenize(source: &str) -> ParseResult<Vec<SpannedToken>> {
    let index = LineIndex::new(source);
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let pos = index.position(source, span.start);
        match result {
            Ok(token) => tokens.push(SpannedToken { token, pos }),
            Err(()) => {
                return Err(ParseError::Lexer {
                    pos,
                    text: source[span].to_string(),
                });
            }
        }
    }

    Ok(tokens)
}
