//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors raised while building or rewriting a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit is not declared in the circuit.
    #[error("qubit {qubit} is not declared in this circuit{}", gate_context(.gate_name))]
    QubitNotFound {
        /// The qubit that was referenced.
        qubit: QubitId,
        /// Gate being applied, if any.
        gate_name: Option<String>,
    },

    /// Classical bit is not declared in the circuit.
    #[error("classical bit {clbit} is not declared in this circuit{}", gate_context(.gate_name))]
    ClbitNotFound {
        /// The bit that was referenced.
        clbit: ClbitId,
        /// Gate being applied, if any.
        gate_name: Option<String>,
    },

    /// A gate received the wrong number of qubit operands.
    #[error("gate '{gate_name}' acts on {expected} qubit(s), got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Arity of the gate.
        expected: usize,
        /// Operands supplied.
        got: usize,
    },

    /// The same qubit appears twice in one instruction.
    #[error("qubit {qubit} used more than once{}", gate_context(.gate_name))]
    DuplicateQubit {
        /// The repeated qubit.
        qubit: QubitId,
        /// Gate being applied, if any.
        gate_name: Option<String>,
    },

    /// A register name was declared twice.
    #[error("register '{0}' is already declared")]
    DuplicateRegister(String),

    /// A register would push the bit count past `u32::MAX`.
    #[error("register '{name}' of size {size} does not fit in the circuit")]
    RegisterTooLarge {
        /// Name of the register.
        name: String,
        /// Requested size.
        size: u32,
    },

    /// The graph no longer satisfies the wire invariants.
    #[error("invalid DAG structure: {0}")]
    InvalidDag(String),

    /// A node index does not refer to an operation.
    #[error("node does not refer to an operation")]
    InvalidNode,
}

#[allow(clippy::ref_option)]
fn gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
