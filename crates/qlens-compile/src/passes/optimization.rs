//! Peephole optimizations over adjacent gates.

use std::f64::consts::PI;

use rustc_hash::FxHashSet;
use tracing::debug;

use qlens_ir::{CircuitDag, NodeIndex, StandardGate, WireId};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Angle tolerance for identity and inverse detection.
pub const EPSILON: f64 = 1e-10;

/// Upper bound on fixpoint iterations.
const MAX_ITERATIONS: usize = 100;

/// Drops gates that act as the identity up to global phase.
pub struct RemoveIdentities;

impl Pass for RemoveIdentities {
    fn name(&self) -> &'static str {
        "RemoveIdentities"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let identities: Vec<NodeIndex> = dag
            .topological_ops()
            .into_iter()
            .filter(|(_, inst)| inst.as_gate().is_some_and(|g| g.is_identity(EPSILON)))
            .map(|(node, _)| node)
            .collect();

        debug!(count = identities.len(), "removing identity gates");
        for node in identities {
            dag.remove_op(node)?;
        }
        Ok(())
    }
}

/// Cancels a gate immediately followed by its inverse on the same qubits,
/// e.g. `H·H`, `CX·CX`, `S·Sdg`, `Rx(a)·Rx(-a)`.
pub struct CancelAdjacentInverses;

impl CancelAdjacentInverses {
    fn find_pairs(dag: &CircuitDag) -> Vec<(NodeIndex, NodeIndex)> {
        let mut pairs = vec![];
        let mut used: FxHashSet<NodeIndex> = FxHashSet::default();

        for (node, inst) in dag.topological_ops() {
            if used.contains(&node) {
                continue;
            }
            let Some(inverse) = inst.as_gate().and_then(StandardGate::inverse) else {
                continue;
            };
            let Some(next) = next_gate_on_same_qubits(dag, node) else {
                continue;
            };
            if used.contains(&next) {
                continue;
            }
            let matches = dag
                .instruction(next)
                .and_then(|i| i.as_gate())
                .is_some_and(|g| same_gate(&inverse, g));
            if matches {
                used.insert(node);
                used.insert(next);
                pairs.push((node, next));
            }
        }
        pairs
    }
}

impl Pass for CancelAdjacentInverses {
    fn name(&self) -> &'static str {
        "CancelAdjacentInverses"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        for _ in 0..MAX_ITERATIONS {
            let pairs = Self::find_pairs(dag);
            if pairs.is_empty() {
                break;
            }
            debug!(pairs = pairs.len(), "cancelling inverse pairs");
            for (first, second) in pairs {
                dag.remove_op(second)?;
                dag.remove_op(first)?;
            }
        }
        Ok(())
    }
}

/// Folds consecutive rotations about the same axis into one gate,
/// e.g. `Rz(a)·Rz(b) = Rz(a+b)`.
pub struct MergeRotations;

impl MergeRotations {
    fn find_merges(dag: &CircuitDag) -> Vec<(NodeIndex, NodeIndex, StandardGate)> {
        let mut merges = vec![];
        let mut used: FxHashSet<NodeIndex> = FxHashSet::default();

        for (node, inst) in dag.topological_ops() {
            if used.contains(&node) {
                continue;
            }
            let Some(gate) = inst.as_gate() else {
                continue;
            };
            let Some(next) = next_gate_on_same_qubits(dag, node) else {
                continue;
            };
            if used.contains(&next) {
                continue;
            }
            let merged = dag
                .instruction(next)
                .and_then(|i| i.as_gate())
                .and_then(|g| merge(gate, g));
            if let Some(merged) = merged {
                used.insert(node);
                used.insert(next);
                merges.push((node, next, merged));
            }
        }
        merges
    }
}

impl Pass for MergeRotations {
    fn name(&self) -> &'static str {
        "MergeRotations"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        for _ in 0..MAX_ITERATIONS {
            let merges = Self::find_merges(dag);
            if merges.is_empty() {
                break;
            }
            debug!(merges = merges.len(), "merging rotations");
            for (first, second, merged) in merges {
                let slot = dag
                    .instruction_mut(first)
                    .and_then(|i| i.gate_mut())
                    .ok_or_else(|| CompileError::PassFailed {
                        name: self.name().into(),
                        reason: "merge target is not a gate".into(),
                    })?;
                *slot = merged;
                dag.remove_op(second)?;
            }
        }
        Ok(())
    }
}

/// The gate right after `node` when it acts on exactly the same qubits in
/// the same order, with nothing in between on any wire.
fn next_gate_on_same_qubits(dag: &CircuitDag, node: NodeIndex) -> Option<NodeIndex> {
    let inst = dag.instruction(node)?;
    let first = *inst.qubits.first()?;
    let next = dag.next_on_wire(node, WireId::Qubit(first))?;
    let next_inst = dag.instruction(next)?;
    (next_inst.qubits == inst.qubits && dag.are_adjacent(node, next)).then_some(next)
}

fn same_gate(a: &StandardGate, b: &StandardGate) -> bool {
    a.name() == b.name()
        && a.params()
            .iter()
            .zip(b.params())
            .all(|(x, y)| (x - y).abs() < EPSILON)
}

/// Wrap an angle into `(-period/2, period/2]`.
fn normalize(angle: f64, period: f64) -> f64 {
    let half = period / 2.0;
    let r = (angle + half).rem_euclid(period) - half;
    if r <= -half { r + period } else { r }
}

/// Combine two same-axis rotations. Periods are the exact ones (4π for
/// spin rotations) so no global phase is introduced.
fn merge(a: &StandardGate, b: &StandardGate) -> Option<StandardGate> {
    const SPIN: f64 = 4.0 * PI;
    const PHASE: f64 = 2.0 * PI;
    let merged = match (*a, *b) {
        (StandardGate::Rx(x), StandardGate::Rx(y)) => StandardGate::Rx(normalize(x + y, SPIN)),
        (StandardGate::Ry(x), StandardGate::Ry(y)) => StandardGate::Ry(normalize(x + y, SPIN)),
        (StandardGate::Rz(x), StandardGate::Rz(y)) => StandardGate::Rz(normalize(x + y, SPIN)),
        (StandardGate::P(x), StandardGate::P(y)) => StandardGate::P(normalize(x + y, PHASE)),
        (StandardGate::CRx(x), StandardGate::CRx(y)) => StandardGate::CRx(normalize(x + y, SPIN)),
        (StandardGate::CRy(x), StandardGate::CRy(y)) => StandardGate::CRy(normalize(x + y, SPIN)),
        (StandardGate::CRz(x), StandardGate::CRz(y)) => StandardGate::CRz(normalize(x + y, SPIN)),
        (StandardGate::CP(x), StandardGate::CP(y)) => StandardGate::CP(normalize(x + y, PHASE)),
        (StandardGate::RXX(x), StandardGate::RXX(y)) => StandardGate::RXX(normalize(x + y, SPIN)),
        (StandardGate::RYY(x), StandardGate::RYY(y)) => StandardGate::RYY(normalize(x + y, SPIN)),
        (StandardGate::RZZ(x), StandardGate::RZZ(y)) => StandardGate::RZZ(normalize(x + y, SPIN)),
        _ => return None,
    };
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlens_ir::{Circuit, QubitId};

    fn run(pass: &dyn Pass, circuit: &mut Circuit) {
        pass.run(circuit.dag_mut(), &mut PropertySet::new()).unwrap();
    }

    #[test]
    fn test_normalize() {
        assert!((normalize(2.5 * PI, 2.0 * PI) - 0.5 * PI).abs() < 1e-12);
        assert!((normalize(-PI, 2.0 * PI) - PI).abs() < 1e-12);
        assert!((normalize(-1.5 * PI, 2.0 * PI) - 0.5 * PI).abs() < 1e-12);
        assert!((normalize(0.5, 4.0 * PI) - 0.5).abs() < 1e-12);
        assert!((normalize(5.0 * PI, 4.0 * PI) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_remove_identities() {
        let mut circuit = Circuit::with_size("id", 1, 0);
        circuit.apply(StandardGate::I, [QubitId(0)]).unwrap();
        circuit.rz(2.0 * PI, QubitId(0)).unwrap();
        circuit.h(QubitId(0)).unwrap();

        run(&RemoveIdentities, &mut circuit);
        assert_eq!(circuit.dag().num_ops(), 1);
    }

    #[test]
    fn test_controlled_rotation_at_two_pi_is_kept() {
        let mut circuit = Circuit::with_size("crz", 2, 0);
        circuit
            .apply(StandardGate::CRz(2.0 * PI), [QubitId(0), QubitId(1)])
            .unwrap();

        run(&RemoveIdentities, &mut circuit);
        assert_eq!(circuit.dag().num_ops(), 1);
    }

    #[test]
    fn test_cancel_hh_and_cxcx() {
        let mut circuit = Circuit::with_size("cancel", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        run(&CancelAdjacentInverses, &mut circuit);
        assert_eq!(circuit.dag().num_ops(), 0);
    }

    #[test]
    fn test_cancel_nested_pairs() {
        let mut circuit = Circuit::with_size("nested", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.s(QubitId(0)).unwrap();
        circuit.apply(StandardGate::Sdg, [QubitId(0)]).unwrap();
        circuit.h(QubitId(0)).unwrap();

        run(&CancelAdjacentInverses, &mut circuit);
        assert_eq!(circuit.dag().num_ops(), 0);
    }

    #[test]
    fn test_reversed_cx_does_not_cancel() {
        let mut circuit = Circuit::with_size("rev", 2, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(1), QubitId(0)).unwrap();

        run(&CancelAdjacentInverses, &mut circuit);
        assert_eq!(circuit.dag().num_ops(), 2);
    }

    #[test]
    fn test_interleaved_gate_blocks_cancellation() {
        let mut circuit = Circuit::with_size("blocked", 2, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.x(QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        run(&CancelAdjacentInverses, &mut circuit);
        assert_eq!(circuit.dag().num_ops(), 3);
    }

    #[test]
    fn test_merge_rotations() {
        let mut circuit = Circuit::with_size("merge", 1, 0);
        circuit.rz(0.25, QubitId(0)).unwrap();
        circuit.rz(0.5, QubitId(0)).unwrap();
        circuit.rz(1.0, QubitId(0)).unwrap();
        circuit.rx(0.5, QubitId(0)).unwrap();

        run(&MergeRotations, &mut circuit);
        let gates: Vec<StandardGate> = circuit
            .instructions()
            .into_iter()
            .filter_map(|i| i.as_gate().copied())
            .collect();
        assert_eq!(gates.len(), 2);
        assert!(matches!(gates[0], StandardGate::Rz(a) if (a - 1.75).abs() < 1e-12));
        assert_eq!(gates[1], StandardGate::Rx(0.5));
    }
}
