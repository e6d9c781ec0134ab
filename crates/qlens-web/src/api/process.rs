//! Circuit submission endpoints.

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{
        State,
        rejection::{FormRejection, JsonRejection},
    },
};
use tracing::info;

use qlens_sim::{QubitAnalysis, SimulationResult, Simulator, analyze_all, total_steps};

use crate::dto::{
    AnalyzeRequest, AnalyzeResponse, ProcessForm, ProcessResponse, QubitView, StateVectorView,
    TranspileView,
};
use crate::error::ApiError;
use crate::render::circuit_diagram;
use crate::session::Session;
use crate::state::AppState;

fn require_source(source: String) -> Result<String, ApiError> {
    if source.trim().is_empty() {
        return Err(ApiError::BadRequest("QASM code is required".to_string()));
    }
    Ok(source)
}

/// Parse, transpile, simulate and analyse off the async runtime.
async fn run(
    simulator: Simulator,
    source: String,
) -> Result<(String, SimulationResult, Vec<QubitAnalysis>), ApiError> {
    tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
        let result = simulator.simulate(&source)?;
        let analyses = analyze_all(&result.state)?;
        Ok((source, result, analyses))
    })
    .await?
}

/// POST /process - Analyse a form-submitted circuit and open a session.
pub async fn process(
    State(state): State<Arc<AppState>>,
    form: Result<Form<ProcessForm>, FormRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let source = require_source(form.qasm_code)?;

    let (source, result, analyses) = run(state.simulator, source).await?;
    let session = state
        .sessions
        .insert(Session::new(source, result, analyses))
        .await;

    let result = &session.result;
    let steps = total_steps(&result.circuit);
    info!(
        session = %session.id,
        qubits = result.num_qubits,
        steps,
        "circuit analysed"
    );

    Ok(Json(ProcessResponse {
        session: session.id,
        circuit_diagram: circuit_diagram(&result.circuit),
        num_qubits: result.num_qubits,
        num_clbits: result.num_clbits,
        state_vector: StateVectorView::from_state(&result.state),
        qubits: QubitView::all(&session.analyses, &result.circuit, &result.state),
        has_steps: steps > 0,
        total_steps: steps,
        transpile: TranspileView::from_result(result),
    }))
}

/// POST /api/analyze - Numeric analysis of a JSON-submitted circuit.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    request: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = request.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let source = require_source(request.qasm)?;

    let (_, result, analyses) = run(state.simulator, source).await?;

    Ok(Json(AnalyzeResponse {
        num_qubits: result.num_qubits,
        num_clbits: result.num_clbits,
        state_vector: StateVectorView::full(&result.state),
        transpile: TranspileView::from_result(&result),
        qubits: analyses,
    }))
}
