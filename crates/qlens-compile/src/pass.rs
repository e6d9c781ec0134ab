//! Pass trait and types for transpilation passes.

use qlens_ir::CircuitDag;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// The kind of transpilation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Reads the DAG without modifying it.
    Analysis,
    /// Rewrites the DAG.
    Transformation,
}

/// A transpilation pass that operates on a circuit DAG.
///
/// Transformation passes must leave the final state unchanged up to a global
/// phase; the analyses computed from it are phase independent.
pub trait Pass: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> PassKind;

    /// Run the pass on the given DAG.
    ///
    /// Analysis passes may write to the `PropertySet` but must not touch the
    /// DAG.
    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _dag: &CircuitDag, _properties: &PropertySet) -> bool {
        true
    }
}
