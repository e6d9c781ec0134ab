//! Per-qubit state analysis.

use serde::Serialize;

use crate::density::{DensityMatrix, reduced_density_matrix};
use crate::error::{SimError, SimResult};
use crate::gates::{pauli_x, pauli_y, pauli_z};
use crate::statevector::{MAX_ADDRESSABLE_QUBITS, StateVector, dimension};

/// Tolerance under which a Bloch vector counts as unit length.
pub const PURE_TOLERANCE: f64 = 1e-9;

/// Point in or on the Bloch sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlochVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl BlochVector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Whether the vector touches the sphere surface.
    pub fn is_pure(&self) -> bool {
        (self.length() - 1.0).abs() < PURE_TOLERANCE
    }
}

/// ⟨σx⟩, ⟨σy⟩, ⟨σz⟩ of one qubit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PauliExpectations {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Everything computed for one qubit, at full precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QubitAnalysis {
    pub qubit: usize,
    pub reduced_matrix: DensityMatrix,
    pub purity: f64,
    pub bloch_vector: BlochVector,
    pub pauli_expectations: PauliExpectations,
}

/// Analyze qubit `qubit_idx` of `state`.
///
/// `num_qubits` is the register width the caller believes the state has;
/// it must agree with the state.
pub fn analyze(state: &StateVector, num_qubits: usize, qubit_idx: usize) -> SimResult<QubitAnalysis> {
    if qubit_idx >= num_qubits {
        return Err(SimError::InvalidQubitIndex {
            index: qubit_idx,
            num_qubits,
        });
    }
    if state.num_qubits() != num_qubits {
        return Err(match dimension(num_qubits) {
            Some(expected) => SimError::DimensionMismatch {
                expected,
                got: state.dim(),
            },
            None => SimError::QubitLimitExceeded {
                required: num_qubits,
                limit: MAX_ADDRESSABLE_QUBITS,
            },
        });
    }

    let rho = reduced_density_matrix(state, &[qubit_idx])?;
    let purity = rho.purity();
    let pauli_expectations = PauliExpectations {
        x: rho.expectation(&pauli_x())?,
        y: rho.expectation(&pauli_y())?,
        z: rho.expectation(&pauli_z())?,
    };

    Ok(QubitAnalysis {
        qubit: qubit_idx,
        reduced_matrix: rho,
        purity,
        bloch_vector: BlochVector::new(
            pauli_expectations.x,
            pauli_expectations.y,
            pauli_expectations.z,
        ),
        pauli_expectations,
    })
}

/// Analyze every qubit in index order.
pub fn analyze_all(state: &StateVector) -> SimResult<Vec<QubitAnalysis>> {
    let n = state.num_qubits();
    (0..n).map(|q| analyze(state, n, q)).collect()
}
