//! OpenQASM 2.0 emitter for circuits.

use std::f64::consts::PI;
use std::fmt::Write as _;

use qlens_ir::{Circuit, ClbitId, Instruction, InstructionKind, QubitId, StandardGate};

/// Emit a circuit as OpenQASM 2.0 source.
///
/// Registers declared on the circuit are kept; circuits built from anonymous
/// bits get a single `q` / `c` register. Conditions are written as
/// `if (creg == value)` prefixes.
pub fn emit(circuit: &Circuit) -> String {
    let mut emitter = Emitter::new(circuit);
    emitter.emit_circuit(circuit);
    emitter.output
}

struct Emitter {
    output: String,
    qubit_names: Vec<String>,
    clbit_names: Vec<String>,
}

impl Emitter {
    fn new(circuit: &Circuit) -> Self {
        let named_qubits = circuit.qubits().iter().all(|q| q.register.is_some());
        let qubit_names = circuit
            .qubits()
            .iter()
            .map(|q| match (&q.register, q.index) {
                (Some(reg), Some(i)) if named_qubits => format!("{reg}[{i}]"),
                _ => format!("q[{}]", q.id.0),
            })
            .collect();

        let named_clbits = circuit.clbits().iter().all(|c| c.register.is_some());
        let clbit_names = circuit
            .clbits()
            .iter()
            .map(|c| match (&c.register, c.index) {
                (Some(reg), Some(i)) if named_clbits => format!("{reg}[{i}]"),
                _ => format!("c[{}]", c.id.0),
            })
            .collect();

        Self {
            output: String::new(),
            qubit_names,
            clbit_names,
        }
    }

    fn emit_circuit(&mut self, circuit: &Circuit) {
        self.writeln("OPENQASM 2.0;");
        self.writeln("include \"qelib1.inc\";");

        let named_qubits = circuit.qubits().iter().all(|q| q.register.is_some());
        if named_qubits {
            for reg in circuit.qregs() {
                self.writeln(&format!("qreg {}[{}];", reg.name, reg.size));
            }
        } else if circuit.num_qubits() > 0 {
            self.writeln(&format!("qreg q[{}];", circuit.num_qubits()));
        }

        let named_clbits = circuit.clbits().iter().all(|c| c.register.is_some());
        if named_clbits {
            for reg in circuit.cregs() {
                self.writeln(&format!("creg {}[{}];", reg.name, reg.size));
            }
        } else if circuit.num_clbits() > 0 {
            self.writeln(&format!("creg c[{}];", circuit.num_clbits()));
        }

        for (_, instruction) in circuit.dag().topological_ops() {
            self.emit_instruction(instruction);
        }
    }

    fn emit_instruction(&mut self, instruction: &Instruction) {
        let mut line = String::new();
        if let Some(cond) = &instruction.condition {
            let _ = write!(line, "if ({} == {}) ", cond.register, cond.value);
        }

        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let params = gate.params();
                line.push_str(gate_name(gate));
                if !params.is_empty() {
                    let params: Vec<String> = params.iter().map(|&p| format_param(p)).collect();
                    let _ = write!(line, "({})", params.join(", "));
                }
                let _ = write!(line, " {};", self.qubits(&instruction.qubits));
            }
            InstructionKind::Measure => {
                let _ = write!(
                    line,
                    "measure {} -> {};",
                    self.qubits(&instruction.qubits),
                    self.clbits(&instruction.clbits)
                );
            }
            InstructionKind::Reset => {
                let _ = write!(line, "reset {};", self.qubits(&instruction.qubits));
            }
            InstructionKind::Barrier => {
                let _ = write!(line, "barrier {};", self.qubits(&instruction.qubits));
            }
        }

        self.writeln(&line);
    }

    fn qubits(&self, qubits: &[QubitId]) -> String {
        qubits
            .iter()
            .map(|q| self.qubit_names[q.index()].as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn clbits(&self, clbits: &[ClbitId]) -> String {
        clbits
            .iter()
            .map(|c| self.clbit_names[c.0 as usize].as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

/// Gate keyword; `cu` with three angles is spelled `cu3` in OpenQASM 2.
fn gate_name(gate: &StandardGate) -> &'static str {
    match gate {
        StandardGate::CU(..) => "cu3",
        other => other.name(),
    }
}

fn format_param(value: f64) -> String {
    const FRACTIONS: [(f64, &str); 4] = [(1.0, "pi"), (2.0, "pi/2"), (4.0, "pi/4"), (8.0, "pi/8")];
    for (divisor, text) in FRACTIONS {
        let angle = PI / divisor;
        if (value - angle).abs() < 1e-12 {
            return text.to_string();
        }
        if (value + angle).abs() < 1e-12 {
            return format!("-{text}");
        }
    }
    format!("{value}")
}
