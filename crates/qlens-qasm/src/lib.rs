//! OpenQASM parser and emitter for qlens.
//!
//! Reads OpenQASM 2.0 and the register / gate subset of OpenQASM 3 into a
//! [`qlens_ir::Circuit`], and writes circuits back out as OpenQASM 2.0.
//!
//! # Supported Features
//!
//! | Feature | Example |
//! |---------|---------|
//! | Version header (optional) | `OPENQASM 2.0;`, `OPENQASM 3;` |
//! | Standard includes | `include "qelib1.inc";` |
//! | Register declarations | `qreg q[2];`, `qubit[2] q;` |
//! | Classical registers | `creg c[2];`, `bit[2] c;` |
//! | Gate calls with broadcasting | `h q;`, `cx q[0], r;` |
//! | Angle expressions | `rz(-pi/4 + 2*acos(0)) q[0];` |
//! | User gate definitions | `gate g(t) a, b { rx(t) a; cx a, b; }` |
//! | Measurement | `measure q -> c;`, `c = measure q;` |
//! | Reset and barrier | `reset q[0];`, `barrier;` |
//! | Classical conditions | `if (c == 1) x q[0];` |
//!
//! Loops, subroutines and `opaque` gate calls are rejected with
//! [`ParseError::Unsupported`].
//!
//! Lowering is bounded by [`ParseLimits`]: an oversized register or a gate
//! definition that expands without end fails before the work is done.
//!
//! # Example
//!
//! ```rust
//! use qlens_qasm::{emit, parse};
//!
//! let circuit = parse(r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[2];
//!     h q[0];
//!     cx q[0], q[1];
//! "#).unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//!
//! let text = emit(&circuit);
//! let again = parse(&text).unwrap();
//! assert_eq!(again.dag().num_ops(), 2);
//! ```
//!
//! # Gates
//!
//! Single-qubit: `id`, `x`, `y`, `z`, `h`, `s`, `sdg`, `t`, `tdg`, `sx`,
//! `sxdg`, `rx`, `ry`, `rz`, `p` / `phase` / `u1`, `u2`, `u` / `u3` / `U`
//!
//! Two-qubit: `cx` / `CX` / `cnot`, `cy`, `cz`, `ch`, `swap`, `iswap`,
//! `crx`, `cry`, `crz`, `cp` / `cphase` / `cu1`, `cu3`, `cu`, `rxx`, `ryy`,
//! `rzz`
//!
//! Three-qubit: `ccx` / `toffoli`, `cswap` / `fredkin`
//!
//! A user `gate` with the same name as a built-in replaces it from that point
//! on.

mod ast;
mod emitter;
mod error;
mod lexer;
mod parser;

pub use emitter::emit;
pub use error::{ParseError, ParseResult, Position};
pub use parser::{ParseLimits, parse, parse_program, parse_with_limits};

/// Syntax tree types, for callers that need the program before lowering.
pub mod syntax {
    pub use crate::ast::*;
}
