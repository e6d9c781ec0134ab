//! Reduced density matrices.
//!
//! The full `|ψ⟩⟨ψ|` is never built. Tracing out the environment works
//! directly on amplitudes:
//!
//! ```text
//! ρ[a][b] = Σ_e ψ(a, e) · conj(ψ(b, e))
//! ```
//!
//! where `a`, `b` index the kept qubits and `e` runs over every assignment
//! of the remaining ones.

use num_complex::Complex64;
use serde::Serialize;

use crate::error::{SimError, SimResult};
use crate::gates::Matrix2;
use crate::statevector::StateVector;

/// Tolerance for Hermiticity and trace checks.
pub const MATRIX_TOLERANCE: f64 = 1e-9;

/// A square density matrix over `k` kept qubits, row-major.
///
/// Row and column indices follow the same little-endian convention as the
/// state vector, restricted to the kept qubits in the order given to
/// [`reduced_density_matrix`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityMatrix {
    rows: Vec<Vec<Complex64>>,
}

impl DensityMatrix {
    pub fn from_rows(rows: Vec<Vec<Complex64>>) -> SimResult<Self> {
        let dim = rows.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != dim) {
            return Err(SimError::DimensionMismatch {
                expected: dim,
                got: bad.len(),
            });
        }
        Ok(Self { rows })
    }

    pub fn dim(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Complex64>] {
        &self.rows
    }

    /// Entry at `(row, col)`. Panics when out of range.
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.rows[row][col]
    }

    pub fn trace(&self) -> Complex64 {
        (0..self.dim()).map(|i| self.rows[i][i]).sum()
    }

    /// `Re Tr(ρ²)`.
    ///
    /// For Hermitian ρ this is `Σ |ρ[i][j]|²`, which avoids the matrix
    /// product.
    pub fn purity(&self) -> f64 {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .map(Complex64::norm_sqr)
            .sum()
    }

    pub fn is_hermitian(&self) -> bool {
        (0..self.dim()).all(|i| {
            (i..self.dim())
                .all(|j| (self.rows[i][j] - self.rows[j][i].conj()).norm() < MATRIX_TOLERANCE)
        })
    }

    /// `Re Tr(ρ·O)` for a single-qubit observable. The imaginary residue is
    /// dropped.
    pub fn expectation(&self, observable: &Matrix2) -> SimResult<f64> {
        if self.dim() != 2 {
            return Err(SimError::DimensionMismatch {
                expected: 2,
                got: self.dim(),
            });
        }
        let mut trace = Complex64::new(0.0, 0.0);
        for i in 0..2 {
            for k in 0..2 {
                trace += self.rows[i][k] * observable[k][i];
            }
        }
        Ok(trace.re)
    }
}

/// Trace out every qubit not listed in `keep`.
pub fn reduced_density_matrix(state: &StateVector, keep: &[usize]) -> SimResult<DensityMatrix> {
    let n = state.num_qubits();
    for (pos, &q) in keep.iter().enumerate() {
        if q >= n || keep[..pos].contains(&q) {
            return Err(SimError::InvalidQubitIndex {
                index: q,
                num_qubits: n,
            });
        }
    }

    let env: Vec<usize> = (0..n).filter(|q| !keep.contains(q)).collect();
    let dim = 1usize << keep.len();
    let amplitudes = state.amplitudes();

    // Full-register index of local basis `local` for the kept qubits and
    // environment assignment `e`.
    let index = |local: usize, e: usize| -> usize {
        let kept = keep
            .iter()
            .enumerate()
            .fold(0, |acc, (bit, &q)| acc | (((local >> bit) & 1) << q));
        env.iter()
            .enumerate()
            .fold(kept, |acc, (bit, &q)| acc | (((e >> bit) & 1) << q))
    };

    let mut rows = vec![vec![Complex64::new(0.0, 0.0); dim]; dim];
    for e in 0..(1usize << env.len()) {
        for (a, row) in rows.iter_mut().enumerate() {
            let psi_a = amplitudes[index(a, e)];
            if psi_a.norm_sqr() == 0.0 {
                continue;
            }
            for (b, entry) in row.iter_mut().enumerate() {
                *entry += psi_a * amplitudes[index(b, e)].conj();
            }
        }
    }
    Ok(DensityMatrix { rows })
}
