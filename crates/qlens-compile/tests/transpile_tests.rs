//! Integration tests for the transpilation pipeline on parsed programs.

use std::f64::consts::PI;

use proptest::prelude::*;
use qlens_compile::passes::{CancelAdjacentInverses, MergeRotations, RemoveIdentities};
use qlens_compile::{Pass, PassManagerBuilder, PropertySet};
use qlens_ir::{Circuit, ClbitId, QubitId, StandardGate};

fn names(circuit: &Circuit) -> Vec<String> {
    circuit
        .instructions()
        .into_iter()
        .map(|i| i.name().to_string())
        .collect()
}

fn transpile(source: &str) -> (Circuit, PropertySet) {
    let circuit = qlens_qasm::parse(source).unwrap();
    PassManagerBuilder::new().build().transpile(&circuit).unwrap()
}

// ============================================================================
// Measurements
// ============================================================================

#[test]
fn test_h_measure_h_is_not_cancelled() {
    let mut circuit = Circuit::with_size("test", 1, 1);
    circuit.h(QubitId(0)).unwrap();
    circuit.measure(QubitId(0), ClbitId(0)).unwrap();
    circuit.h(QubitId(0)).unwrap();

    let (transpiled, props) = PassManagerBuilder::new()
        .build()
        .transpile(&circuit)
        .unwrap();

    assert_eq!(names(&transpiled), vec!["h", "measure", "h"]);
    assert!(props.final_measurements.is_empty());
}

#[test]
fn test_bell_program_drops_measurements() {
    let (circuit, props) = transpile(
        r#"
        OPENQASM 2.0;
        include "qelib1.inc";
        qreg q[2];
        creg c[2];
        h q[0];
        cx q[0], q[1];
        barrier q;
        measure q -> c;
        "#,
    );
    assert_eq!(names(&circuit), vec!["h", "cx"]);
    assert_eq!(props.final_measurements.len(), 2);
}

#[test]
fn test_conditional_gates_are_left_alone() {
    let (circuit, _) = transpile(
        "qreg q[1]; creg c[1];
         x q[0];
         if (c == 1) x q[0];",
    );
    assert_eq!(circuit.dag().num_ops(), 2);
}

// ============================================================================
// Optimization
// ============================================================================

#[test]
fn test_rotations_merge_then_cancel() {
    let (circuit, _) = transpile("qreg q[1]; rz(pi/4) q[0]; rz(pi/4) q[0]; rz(-pi/2) q[0];");
    assert_eq!(circuit.dag().num_ops(), 0);
}

#[test]
fn test_cancellation_cascades() {
    let (circuit, props) = transpile("qreg q[2]; h q[0]; cx q[0], q[1]; cx q[0], q[1]; h q[0];");
    assert_eq!(circuit.dag().num_ops(), 0);
    assert_eq!(props.stats.removed(), 4);
}

#[test]
fn test_user_gate_inverse_pair_cancels() {
    let (circuit, _) = transpile(
        "qreg q[1];
         gate fwd a { s a; t a; }
         gate back a { tdg a; sdg a; }
         fwd q[0]; back q[0];",
    );
    assert_eq!(circuit.dag().num_ops(), 0);
}

#[test]
fn test_level_zero_keeps_gates() {
    let circuit = qlens_qasm::parse("qreg q[1]; h q[0]; h q[0];").unwrap();
    let (transpiled, _) = PassManagerBuilder::new()
        .with_optimization_level(0)
        .build()
        .transpile(&circuit)
        .unwrap();
    assert_eq!(transpiled.dag().num_ops(), 2);
}

// ============================================================================
// Properties
// ============================================================================

fn arb_gate() -> impl Strategy<Value = StandardGate> {
    prop_oneof![
        Just(StandardGate::H),
        Just(StandardGate::X),
        Just(StandardGate::S),
        Just(StandardGate::Sdg),
        Just(StandardGate::T),
        Just(StandardGate::Tdg),
        (-PI..PI).prop_map(StandardGate::Rz),
        (-PI..PI).prop_map(StandardGate::Rx),
        Just(StandardGate::Rz(2.0 * PI)),
    ]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    prop::collection::vec((arb_gate(), 0_u32..3, prop::bool::ANY), 0..30).prop_map(|ops| {
        let mut circuit = Circuit::with_size("random", 3, 0);
        for (gate, q, entangle) in ops {
            circuit.apply(gate, [QubitId(q)]).unwrap();
            if entangle {
                circuit.cx(QubitId(q), QubitId((q + 1) % 3)).unwrap();
            }
        }
        circuit
    })
}

proptest! {
    #[test]
    fn test_passes_never_add_ops(circuit in arb_circuit()) {
        let (transpiled, props) = PassManagerBuilder::new()
            .build()
            .transpile(&circuit)
            .unwrap();

        prop_assert!(transpiled.dag().num_ops() <= circuit.dag().num_ops());
        prop_assert_eq!(props.stats.ops_after, transpiled.dag().num_ops());
        prop_assert!(transpiled.dag().verify_integrity().is_ok());
    }

    #[test]
    fn test_individual_passes_preserve_integrity(circuit in arb_circuit()) {
        let passes: [&dyn Pass; 3] = [&RemoveIdentities, &CancelAdjacentInverses, &MergeRotations];
        for pass in passes {
            let mut copy = circuit.clone();
            pass.run(copy.dag_mut(), &mut PropertySet::new()).unwrap();
            prop_assert!(copy.dag().verify_integrity().is_ok(), "{} broke the DAG", pass.name());
        }
    }
}
