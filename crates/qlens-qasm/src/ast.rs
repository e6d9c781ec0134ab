//! Abstract syntax tree shared by both OpenQASM versions.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{ParseError, ParseResult, Position};

/// A parsed program.
#[derive(Debug, Clone, Serialize)]
pub struct Program {
    /// Version from the `OPENQASM` header, if present (e.g. "2.0").
    pub version: Option<String>,
    pub statements: Vec<Statement>,
}

/// A statement with its source position.
#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    pub pos: Position,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, Serialize)]
pub enum StatementKind {
    /// `include "file";`
    Include(String),
    /// `qreg q[n];` or `qubit[n] q;`
    QregDecl { name: String, size: u32 },
    /// `creg c[n];` or `bit[n] c;`
    CregDecl { name: String, size: u32 },
    /// `gate name(params) args { body }`
    GateDef(GateDef),
    /// `opaque name(params) args;`
    Opaque { name: String },
    Gate(GateCall),
    /// `measure q -> c;` or `c = measure q;`
    Measure { qubit: Operand, bit: Operand },
    Reset { qubits: Vec<Operand> },
    /// `barrier;` with no operands covers every qubit.
    Barrier { qubits: Vec<Operand> },
    /// `if (creg == value) statement`
    If {
        register: String,
        value: u64,
        body: Box<Statement>,
    },
}

/// User gate definition.
#[derive(Debug, Clone, Serialize)]
pub struct GateDef {
    pub name: String,
    pub params: Vec<String>,
    pub qubits: Vec<String>,
    /// Body statements; only gate calls and barriers are legal.
    pub body: Vec<Statement>,
}

/// Gate application.
#[derive(Debug, Clone, Serialize)]
pub struct GateCall {
    pub name: String,
    pub params: Vec<Expression>,
    pub qubits: Vec<Operand>,
}

/// `reg` (whole register) or `reg[i]` (single element).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operand {
    pub pos: Position,
    pub register: String,
    pub index: Option<u32>,
}

impl Operand {
    pub fn whole(register: impl Into<String>, pos: Position) -> Self {
        Self {
            pos,
            register: register.into(),
            index: None,
        }
    }

    pub fn indexed(register: impl Into<String>, index: u32, pos: Position) -> Self {
        Self {
            pos,
            register: register.into(),
            index: Some(index),
        }
    }
}

/// Real-valued angle expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    Int(u64),
    Float(f64),
    Pi,
    Tau,
    Euler,
    /// Reference to a gate parameter.
    Identifier { name: String, pos: Position },
    Neg(Box<Expression>),
    BinOp {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
        pos: Position,
    },
    /// Built-in unary function such as `sin(x)`.
    Call {
        function: String,
        arg: Box<Expression>,
        pos: Position,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Values of gate parameters in scope while evaluating an expression.
pub type Scope = FxHashMap<String, f64>;

impl Expression {
    /// Evaluate to radians, resolving identifiers from `scope`.
    #[allow(clippy::cast_precision_loss)]
    pub fn eval(&self, scope: &Scope) -> ParseResult<f64> {
        let value = match self {
            Expression::Int(v) => *v as f64,
            Expression::Float(v) => *v,
            Expression::Pi => std::f64::consts::PI,
            Expression::Tau => std::f64::consts::TAU,
            Expression::Euler => std::f64::consts::E,
            Expression::Identifier { name, pos } => {
                *scope
                    .get(name)
                    .ok_or_else(|| ParseError::UndefinedParameter {
                        pos: *pos,
                        name: name.clone(),
                    })?
            }
            Expression::Neg(e) => -e.eval(scope)?,
            Expression::BinOp {
                left,
                op,
                right,
                pos,
            } => {
                let l = left.eval(scope)?;
                let r = right.eval(scope)?;
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => {
                        if r == 0.0 {
                            return Err(ParseError::InvalidExpression {
                                pos: *pos,
                                message: "division by zero".into(),
                            });
                        }
                        l / r
                    }
                    BinOp::Pow => l.powf(r),
                }
            }
            Expression::Call { function, arg, pos } => {
                let x = arg.eval(scope)?;
                match function.as_str() {
                    "sin" => x.sin(),
                    "cos" => x.cos(),
                    "tan" => x.tan(),
                    "arcsin" | "asin" => x.asin(),
                    "arccos" | "acos" => x.acos(),
                    "arctan" | "atan" => x.atan(),
                    "exp" => x.exp(),
                    "ln" | "log" => x.ln(),
                    "sqrt" => x.sqrt(),
                    other => {
                        return Err(ParseError::InvalidExpression {
                            pos: *pos,
                            message: format!("unknown function '{other}'"),
                        });
                    }
                }
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(ParseError::InvalidExpression {
                pos: self.position().unwrap_or_default(),
                message: "expression does not evaluate to a finite number".into(),
            })
        }
    }

    fn position(&self) -> Option<Position> {
        match self {
            Expression::Identifier { pos, .. }
            | Expression::BinOp { pos, .. }
            | Expression::Call { pos, .. } => Some(*pos),
            Expression::Neg(e) => e.position(),
            _ => None,
        }
    }
}
