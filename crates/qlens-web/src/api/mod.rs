//! API endpoint handlers.

pub mod calculation;
pub mod health;
pub mod process;
pub mod steps;

use std::sync::Arc;

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::dto::SessionQuery;
use crate::error::ApiError;
use crate::session::Session;
use crate::state::AppState;

/// Header that may carry the session id instead of the query string.
pub const SESSION_HEADER: &str = "x-qlens-session";

/// Find the session named by `?session=` or the [`SESSION_HEADER`] header.
/// The query string wins when both are present.
pub(crate) async fn resolve_session(
    state: &AppState,
    query: &SessionQuery,
    headers: &HeaderMap,
) -> Result<Arc<Session>, ApiError> {
    let raw = query
        .session
        .as_deref()
        .or_else(|| headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()))
        .ok_or(ApiError::NoSession)?;

    let id = Uuid::parse_str(raw.trim()).map_err(|_| ApiError::NoSession)?;
    state.sessions.get(&id).await.ok_or(ApiError::NoSession)
}
