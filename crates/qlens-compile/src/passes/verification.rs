//! Structural verification after rewriting.

use tracing::debug;

use qlens_ir::CircuitDag;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Analysis pass asserting that every wire still runs from its input to its
/// output node. Runs last so a faulty rewrite surfaces as an error instead of
/// a wrong state vector.
pub struct VerifyIntegrity;

impl Pass for VerifyIntegrity {
    fn name(&self) -> &'static str {
        "VerifyIntegrity"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        dag.verify_integrity()
            .map_err(|e| CompileError::PassFailed {
                name: self.name().into(),
                reason: e.to_string(),
            })?;
        debug!(ops = dag.num_ops(), "DAG integrity verified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlens_ir::{Circuit, QubitId};

    #[test]
    fn test_valid_circuit_passes() {
        let mut circuit = Circuit::with_size("ok", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        VerifyIntegrity
            .run(circuit.dag_mut(), &mut PropertySet::new())
            .unwrap();
    }
}
