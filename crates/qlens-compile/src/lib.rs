//! Transpilation for the qlens state-vector simulator.
//!
//! Circuits are rewritten by a sequence of passes over their DAG before
//! simulation. Every pass keeps the final state equal up to a global phase,
//! so reduced density matrices, purities and Bloch vectors are unaffected.
//!
//! ```text
//! Parsed Circuit
//!       |
//!       v
//! PassManager  <-- PropertySet (final measurements, stats)
//!       |
//!       |-- RemoveFinalMeasurements
//!       |-- RemoveIdentities
//!       |-- CancelAdjacentInverses
//!       |-- MergeRotations
//!       `-- VerifyIntegrity
//!       |
//!       v
//! Circuit ready for simulation
//! ```
//!
//! # Example
//!
//! ```rust
//! use qlens_compile::PassManagerBuilder;
//! use qlens_ir::{Circuit, ClbitId, QubitId};
//!
//! let mut circuit = Circuit::with_size("demo", 1, 1);
//! circuit.rz(0.25, QubitId(0)).unwrap();
//! circuit.rz(0.5, QubitId(0)).unwrap();
//! circuit.measure(QubitId(0), ClbitId(0)).unwrap();
//!
//! let pm = PassManagerBuilder::new().with_optimization_level(2).build();
//! let (transpiled, props) = pm.transpile(&circuit).unwrap();
//!
//! assert_eq!(transpiled.dag().num_ops(), 1);
//! assert_eq!(props.final_measurements.len(), 1);
//! ```
//!
//! # Custom Passes
//!
//! ```rust
//! use qlens_compile::{CompileResult, Pass, PassKind, PassManager, PropertySet};
//! use qlens_ir::CircuitDag;
//!
//! struct CountOps;
//!
//! impl Pass for CountOps {
//!     fn name(&self) -> &str { "count_ops" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, dag: &mut CircuitDag, props: &mut PropertySet) -> CompileResult<()> {
//!         props.insert(dag.num_ops());
//!         Ok(())
//!     }
//! }
//!
//! let mut pm = PassManager::new();
//! pm.add_pass(CountOps);
//! ```

pub mod error;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod property;

pub use error::{CompileError, CompileResult};
pub use manager::{MAX_OPTIMIZATION_LEVEL, PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use property::{PropertySet, TranspileStats};
