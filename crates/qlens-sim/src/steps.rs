//! Step-by-step execution of the circuit as written.
//!
//! Steps are the gate applications of the untranspiled circuit in
//! topological order. Barriers and measurements are not steps. Step `0` is
//! the initial |0...0⟩ state and step `n` is the state after the first `n`
//! gates.

use serde::Serialize;

use qlens_ir::{Circuit, Instruction};

use crate::error::{SimError, SimResult};
use crate::statevector::StateVector;

/// Metadata of one step, for a step player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepInfo {
    /// One-based position; the state after this step is `state_at_step(index)`.
    pub index: usize,
    pub name: String,
    pub label: String,
    pub qubits: Vec<usize>,
    pub description: String,
}

fn gate_instructions(circuit: &Circuit) -> Vec<&Instruction> {
    circuit
        .instructions()
        .into_iter()
        .filter(|inst| inst.as_gate().is_some())
        .collect()
}

fn qubit_label(circuit: &Circuit, id: usize) -> String {
    circuit
        .qubits()
        .get(id)
        .map_or_else(|| format!("q{id}"), ToString::to_string)
}

/// List the steps of `circuit`.
pub fn steps(circuit: &Circuit) -> Vec<StepInfo> {
    gate_instructions(circuit)
        .into_iter()
        .enumerate()
        .filter_map(|(i, inst)| {
            let gate = inst.as_gate()?;
            let qubits: Vec<usize> = inst.qubits.iter().map(|q| q.index()).collect();
            let targets: Vec<String> = qubits.iter().map(|&q| qubit_label(circuit, q)).collect();
            Some(StepInfo {
                index: i + 1,
                name: gate.name().to_string(),
                label: gate.label(),
                description: format!("Apply {} to {}", gate.label(), targets.join(", ")),
                qubits,
            })
        })
        .collect()
}

/// Number of steps in `circuit`.
pub fn total_steps(circuit: &Circuit) -> usize {
    gate_instructions(circuit).len()
}

/// A copy of `circuit` holding the same registers and only its first
/// `step` gates.
pub fn prefix_circuit(circuit: &Circuit, step: usize) -> SimResult<Circuit> {
    let gates = gate_instructions(circuit);
    if step > gates.len() {
        return Err(SimError::InvalidStep {
            step,
            total: gates.len(),
        });
    }

    let mut prefix = Circuit::new(circuit.name());
    for qubit in circuit.qubits() {
        match (&qubit.register, qubit.index) {
            (Some(name), Some(0)) => {
                let size = circuit.qreg(name).map_or(1, |r| r.size);
                prefix.add_qreg(name.clone(), size)?;
            }
            (Some(_), Some(_)) => {}
            _ => {
                prefix.add_qubit();
            }
        }
    }
    for clbit in circuit.clbits() {
        match (&clbit.register, clbit.index) {
            (Some(name), Some(0)) => {
                let size = circuit.creg(name).map_or(1, |r| r.size);
                prefix.add_creg(name.clone(), size)?;
            }
            (Some(_), Some(_)) => {}
            _ => {
                prefix.add_clbit();
            }
        }
    }

    for inst in &gates[..step] {
        prefix.push((*inst).clone())?;
    }
    Ok(prefix)
}

/// State after the first `step` gates.
pub fn state_at_step(circuit: &Circuit, step: usize) -> SimResult<StateVector> {
    let gates = gate_instructions(circuit);
    if step > gates.len() {
        return Err(SimError::InvalidStep {
            step,
            total: gates.len(),
        });
    }

    let mut state = StateVector::new(circuit.num_qubits());
    for inst in &gates[..step] {
        state.apply(inst)?;
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn bell_with_measure() -> Circuit {
        qlens_qasm::parse(
            "qreg q[2]; creg c[2];
             h q[0];
             barrier q;
             cx q[0], q[1];
             measure q -> c;",
        )
        .unwrap()
    }

    #[test]
    fn test_steps_skip_barrier_and_measure() {
        let circuit = bell_with_measure();
        let steps = steps(&circuit);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].index, 1);
        assert_eq!(steps[0].name, "h");
        assert_eq!(steps[0].description, "Apply H to q[0]");
        assert_eq!(steps[1].qubits, vec![0, 1]);
        assert_eq!(total_steps(&circuit), 2);
    }

    #[test]
    fn test_state_at_step() {
        let circuit = bell_with_measure();
        assert_eq!(state_at_step(&circuit, 0).unwrap(), StateVector::new(2));

        let after_h = state_at_step(&circuit, 1).unwrap();
        assert!((after_h.amplitudes()[1].re - FRAC_1_SQRT_2).abs() < 1e-10);

        let last = state_at_step(&circuit, 2).unwrap();
        assert!(last.amplitudes()[1].norm() < 1e-10);
        let expected = Complex64::new(FRAC_1_SQRT_2, 0.0);
        assert!((last.amplitudes()[3] - expected).norm() < 1e-10);
    }

    #[test]
    fn test_step_out_of_range() {
        let circuit = bell_with_measure();
        assert!(matches!(
            state_at_step(&circuit, 3),
            Err(SimError::InvalidStep { step: 3, total: 2 })
        ));
    }

    #[test]
    fn test_prefix_circuit_keeps_registers() {
        let circuit =
            qlens_qasm::parse("qreg a[1]; qreg b[2]; creg c[3]; x b[1]; h a[0]; cx a[0], b[0];")
                .unwrap();
        let prefix = prefix_circuit(&circuit, 2).unwrap();
        assert_eq!(prefix.num_qubits(), 3);
        assert_eq!(prefix.num_clbits(), 3);
        assert_eq!(prefix.qubits()[2].to_string(), "b[1]");
        assert_eq!(prefix.dag().num_ops(), 2);
        assert!(prefix_circuit(&circuit, 4).is_err());
    }

    #[test]
    fn test_parameterized_label() {
        let circuit = qlens_qasm::parse("qreg q[1]; rx(pi/2) q[0];").unwrap();
        assert_eq!(steps(&circuit)[0].label, "RX(π/2)");
    }
}
