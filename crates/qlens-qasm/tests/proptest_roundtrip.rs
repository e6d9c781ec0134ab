//! Property-based tests for circuit -> OpenQASM -> circuit roundtrips.

use qlens_ir::{Circuit, QubitId, StandardGate};
use qlens_qasm::{emit, parse};
use proptest::prelude::*;

/// Gate operations that can be applied to a circuit.
#[derive(Debug, Clone)]
enum GateOp {
    Fixed(StandardGate, u32),
    Rotation(StandardGate, u32),
    Two(StandardGate, u32, u32),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        let _ = match self {
            GateOp::Fixed(gate, q) | GateOp::Rotation(gate, q) => {
                circuit.apply(gate, [QubitId(q)])
            }
            GateOp::Two(gate, a, b) => circuit.apply(gate, [QubitId(a), QubitId(b)]),
        };
    }
}

fn arb_fixed_gate() -> impl Strategy<Value = StandardGate> {
    prop_oneof![
        Just(StandardGate::H),
        Just(StandardGate::X),
        Just(StandardGate::Y),
        Just(StandardGate::Z),
        Just(StandardGate::S),
        Just(StandardGate::Tdg),
        Just(StandardGate::SX),
    ]
}

fn arb_rotation() -> impl Strategy<Value = StandardGate> {
    (-10.0_f64..10.0, 0_usize..4).prop_map(|(theta, kind)| match kind {
        0 => StandardGate::Rx(theta),
        1 => StandardGate::Ry(theta),
        2 => StandardGate::Rz(theta),
        _ => StandardGate::P(theta),
    })
}

fn arb_two_qubit_gate() -> impl Strategy<Value = StandardGate> {
    prop_oneof![
        Just(StandardGate::CX),
        Just(StandardGate::CZ),
        Just(StandardGate::Swap),
        (-4.0_f64..4.0).prop_map(StandardGate::CP),
        (-4.0_f64..4.0).prop_map(StandardGate::RZZ),
        (-4.0_f64..4.0, -4.0_f64..4.0, -4.0_f64..4.0)
            .prop_map(|(t, p, l)| StandardGate::CU(t, p, l)),
    ]
}

fn arb_gate_op(num_qubits: u32) -> impl Strategy<Value = GateOp> {
    let single = prop_oneof![
        (arb_fixed_gate(), 0..num_qubits).prop_map(|(g, q)| GateOp::Fixed(g, q)),
        (arb_rotation(), 0..num_qubits).prop_map(|(g, q)| GateOp::Rotation(g, q)),
    ];
    if num_qubits < 2 {
        single.boxed()
    } else {
        prop_oneof![
            single,
            (arb_two_qubit_gate(), 0..num_qubits, 0..num_qubits)
                .prop_filter("operands must differ", |(_, a, b)| a != b)
                .prop_map(|(g, a, b)| GateOp::Two(g, a, b)),
        ]
        .boxed()
    }
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (1_u32..=5).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_gate_op(num_qubits), 1..=12).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("test", num_qubits, num_qubits);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

fn gate_list(circuit: &Circuit) -> Vec<(StandardGate, Vec<QubitId>)> {
    circuit
        .instructions()
        .into_iter()
        .filter_map(|inst| inst.as_gate().map(|g| (*g, inst.qubits.clone())))
        .collect()
}

fn same_gate(a: &StandardGate, b: &StandardGate) -> bool {
    a.name() == b.name()
        && a.params()
            .iter()
            .zip(b.params())
            .all(|(x, y)| (x - y).abs() < 1e-9)
}

proptest! {
    #[test]
    fn test_roundtrip_preserves_structure(circuit in arb_circuit()) {
        let qasm = emit(&circuit);
        let parsed = parse(&qasm).expect("emitted source should parse");

        prop_assert_eq!(parsed.num_qubits(), circuit.num_qubits());
        prop_assert_eq!(parsed.num_clbits(), circuit.num_clbits());
        prop_assert_eq!(parsed.dag().num_ops(), circuit.dag().num_ops());
        prop_assert_eq!(parsed.depth(), circuit.depth());
    }

    #[test]
    fn test_roundtrip_preserves_gates(circuit in arb_circuit()) {
        let parsed = parse(&emit(&circuit)).expect("emitted source should parse");
        let before = gate_list(&circuit);
        let after = gate_list(&parsed);

        prop_assert_eq!(before.len(), after.len());
        for ((g1, q1), (g2, q2)) in before.iter().zip(after.iter()) {
            prop_assert!(same_gate(g1, g2), "{} != {}", g1, g2);
            prop_assert_eq!(q1, q2);
        }
    }

    #[test]
    fn test_emit_is_deterministic(circuit in arb_circuit()) {
        prop_assert_eq!(emit(&circuit), emit(&circuit));
    }

    #[test]
    fn test_empty_circuit_roundtrip(num_qubits in 1_u32..=10, num_clbits in 0_u32..=10) {
        let circuit = Circuit::with_size("empty", num_qubits, num_clbits);
        let parsed = parse(&emit(&circuit)).expect("emitted source should parse");

        prop_assert_eq!(parsed.num_qubits(), num_qubits as usize);
        prop_assert_eq!(parsed.num_clbits(), num_clbits as usize);
        prop_assert_eq!(parsed.dag().num_ops(), 0);
    }
}
