//! Step-by-step playback of a session's circuit.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use tracing::debug;

use qlens_sim::{analyze_all, prefix_circuit, state_at_step, steps as list, total_steps};

use crate::api::resolve_session;
use crate::dto::{GateInfo, QubitView, SessionQuery, StateVectorView, StepResponse, StepsResponse};
use crate::error::ApiError;
use crate::render::circuit_diagram;
use crate::state::AppState;

/// GET /steps - Gate steps of the submitted circuit.
pub async fn list_steps(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
) -> Result<Json<StepsResponse>, ApiError> {
    let session = resolve_session(&state, &query, &headers).await?;
    let steps = list(&session.result.circuit);

    Ok(Json(StepsResponse {
        session: session.id,
        total_steps: steps.len(),
        steps,
    }))
}

/// GET /step/{n} - Per-qubit analysis after the first `n` gates.
pub async fn step(
    State(state): State<Arc<AppState>>,
    Path(step): Path<i64>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
) -> Result<Json<StepResponse>, ApiError> {
    let session = resolve_session(&state, &query, &headers).await?;
    let n = usize::try_from(step).map_err(|_| {
        ApiError::InvalidIndex(format!(
            "invalid step {step}, circuit has {} steps",
            total_steps(&session.result.circuit)
        ))
    })?;

    let response = tokio::task::spawn_blocking(move || -> Result<StepResponse, ApiError> {
        let circuit = &session.result.circuit;
        let total = total_steps(circuit);

        let state = state_at_step(circuit, n)?;
        let analyses = analyze_all(&state)?;
        let prefix = prefix_circuit(circuit, n)?;
        debug!(session = %session.id, step = n, total, "step evaluated");

        let info = n.checked_sub(1).and_then(|i| list(circuit).into_iter().nth(i));
        let (gate, description) = match &info {
            Some(info) => (info.label.clone(), info.description.clone()),
            None => (
                "Initial State".to_string(),
                "All qubits start in |0⟩".to_string(),
            ),
        };

        Ok(StepResponse {
            step: n,
            total_steps: total,
            gate,
            description,
            gate_info: info.as_ref().map(GateInfo::from_step),
            circuit_diagram: circuit_diagram(&prefix),
            state_vector: StateVectorView::from_state(&state),
            qubits: QubitView::all(&analyses, circuit, &state),
        })
    })
    .await??;

    Ok(Json(response))
}
