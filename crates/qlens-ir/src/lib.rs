//! qlens circuit intermediate representation
//!
//! Core data structures shared by the parser, the transpiler and the
//! state-vector engine.
//!
//! # Overview
//!
//! A [`Circuit`] owns its declared registers and a [`CircuitDag`] of
//! [`Instruction`]s. The DAG keeps one path per wire, which gives rewrite
//! passes cheap access to the next operation on a qubit and lets the
//! presentation layer group operations into layers.
//!
//! Gate angles are concrete `f64` radians; expression evaluation happens
//! while lowering source text.
//!
//! # Bit ordering
//!
//! Qubit `k` corresponds to bit `k` of a state-vector amplitude index
//! (little-endian). Every crate in the workspace follows this convention.
//!
//! # Example
//!
//! ```rust
//! use qlens_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2, 0);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 2);
//! ```

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::{Circuit, Register};
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, StandardGate, format_angle};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{Clbit, ClbitId, Qubit, QubitId};
