//! Per-qubit detail page.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Html,
};

use crate::api::resolve_session;
use crate::dto::{SessionQuery, qubit_label};
use crate::error::ApiError;
use crate::render::calculation_page_html;
use crate::state::AppState;

/// GET /calculation/{qubit_idx} - Six-decimal derivation for one qubit.
pub async fn calculation(
    State(state): State<Arc<AppState>>,
    Path(qubit_idx): Path<i64>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
) -> Result<Html<String>, ApiError> {
    let session = resolve_session(&state, &query, &headers).await?;
    let num_qubits = session.result.num_qubits;

    let analysis = usize::try_from(qubit_idx)
        .ok()
        .and_then(|idx| session.analyses.get(idx))
        .ok_or_else(|| {
            ApiError::InvalidIndex(format!(
                "invalid qubit index {qubit_idx} for a {num_qubits}-qubit state"
            ))
        })?;

    let label = qubit_label(&session.result.circuit, analysis.qubit);
    Ok(Html(calculation_page_html(analysis, &label)))
}
