//! State-vector engine.

use num_complex::Complex64;
use serde::Serialize;

use qlens_ir::{Instruction, InstructionKind, StandardGate};

use crate::error::{SimError, SimResult};
use crate::gates::{GateAction, Matrix2, Matrix4, gate_action};

/// Tolerance used by [`StateVector::is_normalized`].
pub const NORM_TOLERANCE: f64 = 1e-9;

/// Widest state whose amplitude count fits in a `usize`.
pub const MAX_ADDRESSABLE_QUBITS: usize = usize::BITS as usize - 1;

/// `2^num_qubits`, or `None` when it does not fit in a `usize`.
pub fn dimension(num_qubits: usize) -> Option<usize> {
    u32::try_from(num_qubits)
        .ok()
        .and_then(|n| 1usize.checked_shl(n))
}

/// A pure `n`-qubit state.
///
/// Amplitude `i` belongs to the basis state in which qubit `k` has the value
/// `(i >> k) & 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateVector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl StateVector {
    /// Create a new state initialized to |0...0⟩.
    ///
    /// # Panics
    ///
    /// Panics if `num_qubits` exceeds [`MAX_ADDRESSABLE_QUBITS`]; callers
    /// bound the width first.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Wrap existing amplitudes. The length must be `2^num_qubits`; the
    /// norm is not checked.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>, num_qubits: usize) -> SimResult<Self> {
        let Some(expected) = dimension(num_qubits) else {
            return Err(SimError::QubitLimitExceeded {
                required: num_qubits,
                limit: MAX_ADDRESSABLE_QUBITS,
            });
        };
        if amplitudes.len() != expected {
            return Err(SimError::DimensionMismatch {
                expected,
                got: amplitudes.len(),
            });
        }
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of amplitudes, `2^n`.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn norm(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum::<f64>().sqrt()
    }

    pub fn is_normalized(&self) -> bool {
        (self.norm() - 1.0).abs() < NORM_TOLERANCE
    }

    /// Born-rule probabilities in amplitude order.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Basis label of an amplitude index, most significant qubit first.
    pub fn bitstring(&self, index: usize) -> String {
        format!("{:0width$b}", index, width = self.num_qubits)
    }

    /// Apply an instruction.
    ///
    /// Barriers are no-ops. Measurement, reset and classically conditioned
    /// gates have no deterministic unitary action and are rejected.
    pub fn apply(&mut self, instruction: &Instruction) -> SimResult<()> {
        if instruction.is_conditional() {
            return Err(SimError::UnsupportedInstruction {
                name: instruction.name().into(),
                reason: "classically conditioned operations need measurement outcomes".into(),
            });
        }
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
                self.apply_gate(gate, &qubits)
            }
            InstructionKind::Barrier => Ok(()),
            InstructionKind::Measure => Err(SimError::UnsupportedInstruction {
                name: "measure".into(),
                reason: "mid-circuit measurement collapses the state".into(),
            }),
            InstructionKind::Reset => Err(SimError::UnsupportedInstruction {
                name: "reset".into(),
                reason: "reset is not a unitary operation".into(),
            }),
        }
    }

    /// Apply a gate to the given qubits, controls first.
    pub fn apply_gate(&mut self, gate: &StandardGate, qubits: &[usize]) -> SimResult<()> {
        if qubits.len() != gate.num_qubits() {
            return Err(SimError::UnsupportedInstruction {
                name: gate.name().into(),
                reason: format!(
                    "expected {} qubit operand(s), got {}",
                    gate.num_qubits(),
                    qubits.len()
                ),
            });
        }
        if let Some(&index) = qubits.iter().find(|&&q| q >= self.num_qubits) {
            return Err(SimError::InvalidQubitIndex {
                index,
                num_qubits: self.num_qubits,
            });
        }

        match gate_action(gate) {
            GateAction::Controlled { controls, matrix } => {
                let control_mask = mask_of(&qubits[..controls]);
                self.apply_controlled(control_mask, qubits[controls], &matrix);
            }
            GateAction::TwoQubit { controls, matrix } => {
                let control_mask = mask_of(&qubits[..controls]);
                self.apply_two_qubit(
                    control_mask,
                    qubits[controls],
                    qubits[controls + 1],
                    &matrix,
                );
            }
        }
        Ok(())
    }

    /// Apply `matrix` to `target` on every basis state whose `control_mask`
    /// bits are all set.
    fn apply_controlled(&mut self, control_mask: usize, target: usize, matrix: &Matrix2) {
        let mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 && i & control_mask == control_mask {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = matrix[0][0] * a + matrix[0][1] * b;
                self.amplitudes[j] = matrix[1][0] * a + matrix[1][1] * b;
            }
        }
    }

    fn apply_two_qubit(&mut self, control_mask: usize, q0: usize, q1: usize, matrix: &Matrix4) {
        let m0 = 1 << q0;
        let m1 = 1 << q1;
        for i in 0..self.amplitudes.len() {
            if i & (m0 | m1) != 0 || i & control_mask != control_mask {
                continue;
            }
            let idx = [i, i | m0, i | m1, i | m0 | m1];
            let old = idx.map(|k| self.amplitudes[k]);
            for (row, &k) in idx.iter().enumerate() {
                self.amplitudes[k] = (0..4).map(|col| matrix[row][col] * old[col]).sum();
            }
        }
    }
}

fn mask_of(qubits: &[usize]) -> usize {
    qubits.iter().fold(0, |acc, &q| acc | (1 << q))
}
