//! Data Transfer Objects for the web API.
//!
//! These types bridge simulator results to JSON responses. HTML and SVG
//! fragments are rendered here, once per response, from full-precision
//! analyses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use num_complex::Complex64;
use qlens_ir::Circuit;
use qlens_sim::{QubitAnalysis, SimulationResult, StateVector, StepInfo};

use crate::render::{
    MAX_LISTED_AMPLITUDES, SUMMARY_PRECISION, bloch_sphere_svg, format_real, matrix_to_html,
    summary_math_html,
};

// ============================================================================
// Requests
// ============================================================================

/// Form body of `POST /process`.
#[derive(Debug, Default, Deserialize)]
pub struct ProcessForm {
    #[serde(default)]
    pub qasm_code: String,
}

/// JSON body of `POST /api/analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// OpenQASM 2.0 or 3.0 source.
    pub qasm: String,
}

/// Query string carrying a session id.
#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    pub session: Option<String>,
}

// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// ============================================================================
// State vector
// ============================================================================

/// One basis-state amplitude.
#[derive(Debug, Serialize)]
pub struct AmplitudeView {
    /// Basis label, most significant qubit first.
    pub basis: String,
    pub re: f64,
    pub im: f64,
    pub probability: f64,
}

/// Amplitudes of a state vector, in basis order.
#[derive(Debug, Serialize)]
pub struct StateVectorView {
    pub num_qubits: usize,
    pub amplitudes: Vec<AmplitudeView>,
    /// True when amplitudes were left out of the list.
    pub truncated: bool,
}

impl StateVectorView {
    /// Non-zero amplitudes only, at most [`MAX_LISTED_AMPLITUDES`] of them.
    pub fn from_state(state: &StateVector) -> Self {
        let mut nonzero = state
            .amplitudes()
            .iter()
            .enumerate()
            .filter(|(_, a)| a.norm() > 1e-12);

        let amplitudes: Vec<AmplitudeView> = nonzero
            .by_ref()
            .take(MAX_LISTED_AMPLITUDES)
            .map(|(i, a)| AmplitudeView::new(state, i, *a))
            .collect();
        let truncated = nonzero.next().is_some();

        Self {
            num_qubits: state.num_qubits(),
            amplitudes,
            truncated,
        }
    }

    /// All `2^n` amplitudes, zeros included.
    pub fn full(state: &StateVector) -> Self {
        Self {
            num_qubits: state.num_qubits(),
            amplitudes: state
                .amplitudes()
                .iter()
                .enumerate()
                .map(|(i, a)| AmplitudeView::new(state, i, *a))
                .collect(),
            truncated: false,
        }
    }
}

impl AmplitudeView {
    fn new(state: &StateVector, index: usize, amplitude: Complex64) -> Self {
        Self {
            basis: state.bitstring(index),
            re: amplitude.re,
            im: amplitude.im,
            probability: amplitude.norm_sqr(),
        }
    }
}

// ============================================================================
// Per-qubit views
// ============================================================================

/// Rendered summary card for one qubit.
#[derive(Debug, Serialize)]
pub struct QubitView {
    pub idx: usize,
    /// Register label, e.g. `q[0]`.
    pub label: String,
    pub bloch_svg: String,
    pub mat_html: String,
    /// Purity rounded to four decimals.
    pub purity: f64,
    /// Bloch vector as `"x, y, z"` with four decimals.
    pub bloch_vec: String,
    pub full_math: String,
}

impl QubitView {
    pub fn from_analysis(analysis: &QubitAnalysis, label: String, state: &StateVector) -> Self {
        let b = &analysis.bloch_vector;
        let scale = 10f64.powi(SUMMARY_PRECISION as i32);
        Self {
            idx: analysis.qubit,
            bloch_svg: bloch_sphere_svg(b, &format!("Qubit {} Bloch Sphere", analysis.qubit)),
            mat_html: matrix_to_html(&analysis.reduced_matrix, SUMMARY_PRECISION),
            purity: (analysis.purity * scale).round() / scale,
            bloch_vec: [b.x, b.y, b.z]
                .iter()
                .map(|v| format_real(*v, SUMMARY_PRECISION))
                .collect::<Vec<_>>()
                .join(", "),
            full_math: summary_math_html(analysis, state),
            label,
        }
    }

    /// Cards for every analysed qubit of `circuit`.
    pub fn all(analyses: &[QubitAnalysis], circuit: &Circuit, state: &StateVector) -> Vec<Self> {
        analyses
            .iter()
            .map(|a| Self::from_analysis(a, qubit_label(circuit, a.qubit), state))
            .collect()
    }
}

/// Register label of qubit `idx`, e.g. `q[0]`.
pub fn qubit_label(circuit: &Circuit, idx: usize) -> String {
    circuit
        .qubits()
        .get(idx)
        .map_or_else(|| format!("q{idx}"), ToString::to_string)
}

// ============================================================================
// Transpilation
// ============================================================================

/// A terminal measurement removed before simulation.
#[derive(Debug, Serialize)]
pub struct MeasurementView {
    pub qubit: String,
    pub clbit: String,
}

/// What the transpiler did to the circuit.
#[derive(Debug, Serialize)]
pub struct TranspileView {
    pub ops_before: usize,
    pub ops_after: usize,
    pub removed: usize,
    pub depth: usize,
    pub final_measurements: Vec<MeasurementView>,
}

impl TranspileView {
    pub fn from_result(result: &SimulationResult) -> Self {
        let clbit_label = |idx: usize| {
            result
                .circuit
                .clbits()
                .get(idx)
                .map_or_else(|| format!("c{idx}"), ToString::to_string)
        };
        Self {
            ops_before: result.stats.ops_before,
            ops_after: result.stats.ops_after,
            removed: result.stats.removed(),
            depth: result.transpiled.depth(),
            final_measurements: result
                .final_measurements
                .iter()
                .map(|(q, c)| MeasurementView {
                    qubit: qubit_label(&result.circuit, q.index()),
                    clbit: clbit_label(c.0 as usize),
                })
                .collect(),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Response of `POST /process`.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    /// Pass this id to the detail and step endpoints.
    pub session: Uuid,
    pub circuit_diagram: String,
    pub num_qubits: usize,
    pub num_clbits: usize,
    pub state_vector: StateVectorView,
    pub qubits: Vec<QubitView>,
    pub has_steps: bool,
    pub total_steps: usize,
    pub transpile: TranspileView,
}

/// Response of `POST /api/analyze`: numbers only, no markup.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub num_qubits: usize,
    pub num_clbits: usize,
    pub state_vector: StateVectorView,
    pub qubits: Vec<QubitAnalysis>,
    pub transpile: TranspileView,
}

/// Response of `GET /steps`.
#[derive(Debug, Serialize)]
pub struct StepsResponse {
    pub session: Uuid,
    pub total_steps: usize,
    pub steps: Vec<StepInfo>,
}

/// Gate applied by a step.
#[derive(Debug, Serialize)]
pub struct GateInfo {
    pub name: String,
    pub label: String,
    pub qubits: Vec<usize>,
}

/// Response of `GET /step/{n}`.
#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub step: usize,
    pub total_steps: usize,
    /// Gate label, or `"Initial State"` for step 0.
    pub gate: String,
    pub description: String,
    pub gate_info: Option<GateInfo>,
    /// Diagram of the circuit up to and including this step.
    pub circuit_diagram: String,
    pub state_vector: StateVectorView,
    pub qubits: Vec<QubitView>,
}

impl GateInfo {
    pub fn from_step(info: &StepInfo) -> Self {
        Self {
            name: info.name.clone(),
            label: info.label.clone(),
            qubits: info.qubits.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlens_sim::{analyze_all, simulate};

    #[test]
    fn test_qubit_view_formatting() {
        let result = simulate("qreg q[2]; h q[0]; cx q[0], q[1];").unwrap();
        let analyses = analyze_all(&result.state).unwrap();
        let views = QubitView::all(&analyses, &result.circuit, &result.state);

        assert_eq!(views.len(), 2);
        assert_eq!(views[1].idx, 1);
        assert_eq!(views[1].label, "q[1]");
        assert_eq!(views[0].purity, 0.5);
        assert_eq!(views[0].bloch_vec, "0.0000, 0.0000, 0.0000");
        assert!(views[0].bloch_svg.contains("Qubit 0 Bloch Sphere"));
        assert!(views[0].mat_html.starts_with("<table"));
    }

    #[test]
    fn test_state_vector_view_truncates() {
        let result = simulate("qreg q[7]; h q;").unwrap();
        let view = StateVectorView::from_state(&result.state);
        assert_eq!(view.amplitudes.len(), MAX_LISTED_AMPLITUDES);
        assert!(view.truncated);

        let result = simulate("qreg q[2]; x q[1];").unwrap();
        let view = StateVectorView::from_state(&result.state);
        assert_eq!(view.amplitudes.len(), 1);
        assert_eq!(view.amplitudes[0].basis, "10");
        assert!(!view.truncated);
    }

    #[test]
    fn test_full_state_vector_view_keeps_every_amplitude() {
        let result = simulate("qreg q[7]; h q;").unwrap();
        let view = StateVectorView::full(&result.state);
        assert_eq!(view.amplitudes.len(), 128);
        assert!(!view.truncated);
        assert_eq!(view.amplitudes[127].basis, "1111111");

        let result = simulate("qreg q[2]; x q[1];").unwrap();
        let view = StateVectorView::full(&result.state);
        let bases: Vec<&str> = view.amplitudes.iter().map(|a| a.basis.as_str()).collect();
        assert_eq!(bases, ["00", "01", "10", "11"]);
        assert_eq!(view.amplitudes[0].probability, 0.0);
        assert_eq!(view.amplitudes[2].re, 1.0);
    }

    #[test]
    fn test_transpile_view_lists_final_measurements() {
        let result = simulate("qreg q[1]; creg c[1]; h q[0]; h q[0]; measure q[0] -> c[0];").unwrap();
        let view = TranspileView::from_result(&result);
        assert_eq!(view.final_measurements.len(), 1);
        assert_eq!(view.final_measurements[0].qubit, "q[0]");
        assert_eq!(view.final_measurements[0].clbit, "c[0]");
        assert!(view.removed >= 2);
    }
}
