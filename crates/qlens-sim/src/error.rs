//! Error types for the simulation crate.

use thiserror::Error;

/// Errors raised while executing a circuit or analysing a state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// An instruction with no unitary meaning on a pure state.
    #[error("unsupported instruction '{name}': {reason}")]
    UnsupportedInstruction { name: String, reason: String },

    #[error("circuit has {required} qubits, the simulator allows at most {limit}")]
    QubitLimitExceeded { required: usize, limit: usize },

    #[error("invalid qubit index {index} for a {num_qubits}-qubit state")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    #[error("invalid step {step}, circuit has {total} steps")]
    InvalidStep { step: usize, total: usize },

    /// Amplitude count does not match the qubit count.
    #[error("state has {got} amplitudes, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error(transparent)]
    Ir(#[from] qlens_ir::IrError),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

/// Any failure on the way from OpenQASM text to a state vector.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QlensError {
    #[error("parse error: {0}")]
    Parse(#[from] qlens_qasm::ParseError),

    #[error("transpilation error: {0}")]
    Compile(#[from] qlens_compile::CompileError),

    #[error("simulation error: {0}")]
    Simulation(#[from] SimError),
}
