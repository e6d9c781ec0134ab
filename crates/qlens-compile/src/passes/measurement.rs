//! Stripping of operations that do not change the final ideal state.

use tracing::debug;

use qlens_ir::{CircuitDag, ClbitId, InstructionKind, NodeIndex, QubitId, WireId};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Removes every barrier, then every measurement that is the last
/// operation on its qubit.
///
/// Removed measurements are recorded in
/// [`PropertySet::final_measurements`]. Measurements followed by further
/// operations stay in the DAG; the simulator rejects them.
pub struct RemoveFinalMeasurements;

impl RemoveFinalMeasurements {
    fn barriers(dag: &CircuitDag) -> Vec<NodeIndex> {
        dag.topological_ops()
            .into_iter()
            .filter(|(_, inst)| inst.is_barrier())
            .map(|(node, _)| node)
            .collect()
    }

    fn terminal_measurements(dag: &CircuitDag) -> Vec<NodeIndex> {
        dag.topological_ops()
            .into_iter()
            .filter(|(node, inst)| {
                matches!(inst.kind, InstructionKind::Measure)
                    && !inst.is_conditional()
                    && inst
                        .qubits
                        .iter()
                        .all(|&q| dag.next_on_wire(*node, WireId::Qubit(q)).is_none())
            })
            .map(|(node, _)| node)
            .collect()
    }
}

impl Pass for RemoveFinalMeasurements {
    fn name(&self) -> &'static str {
        "RemoveFinalMeasurements"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let barriers = Self::barriers(dag);
        for node in &barriers {
            dag.remove_op(*node)?;
        }

        // Each round peels the last layer of measurements.
        let mut rounds: Vec<Vec<(QubitId, ClbitId)>> = vec![];
        loop {
            let terminal = Self::terminal_measurements(dag);
            if terminal.is_empty() {
                break;
            }
            let mut round = vec![];
            for node in terminal {
                let inst = dag.remove_op(node)?;
                round.extend(inst.qubits.iter().copied().zip(inst.clbits.iter().copied()));
            }
            rounds.push(round);
        }
        let removed: Vec<_> = rounds.into_iter().rev().flatten().collect();

        debug!(
            barriers = barriers.len(),
            measurements = removed.len(),
            "stripped terminal operations"
        );
        properties.final_measurements.extend(removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlens_ir::Circuit;

    #[test]
    fn test_final_measurements_are_removed() {
        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.barrier([QubitId(0), QubitId(1)]).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        circuit.measure(QubitId(1), ClbitId(1)).unwrap();

        let mut props = PropertySet::new();
        RemoveFinalMeasurements
            .run(circuit.dag_mut(), &mut props)
            .unwrap();

        assert_eq!(circuit.dag().num_ops(), 2);
        assert_eq!(
            props.final_measurements,
            vec![(QubitId(0), ClbitId(0)), (QubitId(1), ClbitId(1))]
        );
    }

    #[test]
    fn test_mid_circuit_measurement_is_kept() {
        let mut circuit = Circuit::with_size("mid", 1, 1);
        circuit.h(QubitId(0)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        circuit.h(QubitId(0)).unwrap();

        let mut props = PropertySet::new();
        RemoveFinalMeasurements
            .run(circuit.dag_mut(), &mut props)
            .unwrap();

        assert_eq!(circuit.dag().num_ops(), 3);
        assert!(props.final_measurements.is_empty());
    }

    #[test]
    fn test_repeated_final_measurements() {
        let mut circuit = Circuit::with_size("twice", 1, 2);
        circuit.x(QubitId(0)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        circuit.measure(QubitId(0), ClbitId(1)).unwrap();

        let mut props = PropertySet::new();
        RemoveFinalMeasurements
            .run(circuit.dag_mut(), &mut props)
            .unwrap();

        assert_eq!(circuit.dag().num_ops(), 1);
        assert_eq!(
            props.final_measurements,
            vec![(QubitId(0), ClbitId(0)), (QubitId(0), ClbitId(1))]
        );
    }
}
