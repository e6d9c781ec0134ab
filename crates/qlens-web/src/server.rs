//! Axum server setup and routing.

use std::sync::{Arc, LazyLock};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    response::Html,
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::api;
use crate::render::html_escape;
use crate::state::AppState;

/// Circuit shown in the editor on first load.
pub const DEFAULT_QASM: &str = "OPENQASM 2.0;
include \"qelib1.inc\";
qreg q[3];
creg c[2];
h q[0];
cx q[0],q[1];
rx(0.5) q[2];
";

// Embed static files at compile time
const INDEX_TEMPLATE: &str = include_str!("../static/index.html");

static INDEX_HTML: LazyLock<String> =
    LazyLock::new(|| INDEX_TEMPLATE.replace("{{default_qasm}}", &html_escape(DEFAULT_QASM)));

/// Create the Axum router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/analyze", post(api::process::analyze));

    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/", get(serve_index))
        .route("/process", post(api::process::process))
        .route("/calculation/{qubit_idx}", get(api::calculation::calculation))
        .route("/steps", get(api::steps::list_steps))
        .route("/step/{n}", get(api::steps::step))
        .nest("/api", api_routes)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Permissive when `origins` is empty or contains `*`, otherwise an
/// allow-list of the parseable entries.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static(api::SESSION_HEADER),
        ]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML.as_str())
}
