//! Ideal state-vector simulation and single-qubit analysis.
//!
//! The numerical core of qlens is a pure function of the circuit text:
//!
//! ```text
//! OpenQASM ──parse──> Circuit ──transpile──> Circuit ──run──> StateVector
//!                                                                 │
//!                                   per qubit: ρ, purity, Bloch <─┘
//! ```
//!
//! Qubit `k` is bit `k` of an amplitude index. Basis labels are printed
//! most significant qubit first.
//!
//! # Example
//!
//! ```rust
//! use qlens_sim::{analyze, simulate};
//!
//! let result = simulate("qreg q[2]; h q[0]; cx q[0], q[1];").unwrap();
//! let q0 = analyze(&result.state, result.num_qubits, 0).unwrap();
//!
//! assert!((q0.purity - 0.5).abs() < 1e-12);
//! assert!(q0.bloch_vector.length() < 1e-12);
//! ```
//!
//! Measurements at the end of a circuit are removed before execution.
//! Mid-circuit measurement, `reset` and classically conditioned gates have
//! no unitary meaning and are reported as
//! [`SimError::UnsupportedInstruction`].

pub mod analysis;
pub mod density;
pub mod error;
pub mod gates;
pub mod simulate;
pub mod statevector;
pub mod steps;

pub use analysis::{BlochVector, PauliExpectations, QubitAnalysis, analyze, analyze_all};
pub use density::{DensityMatrix, reduced_density_matrix};
pub use error::{QlensError, SimError, SimResult};
pub use simulate::{DEFAULT_MAX_QUBITS, SimulationResult, Simulator, simulate};
pub use statevector::{MAX_ADDRESSABLE_QUBITS, StateVector};
pub use steps::{StepInfo, prefix_circuit, state_at_step, steps, total_steps};

pub use qlens_compile::MAX_OPTIMIZATION_LEVEL;
