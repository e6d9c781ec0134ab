//! Integration tests for the qlens web API.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{Value, json};

use qlens_web::{AppState, Config, create_router};

// ============================================================================
// Test helpers
// ============================================================================

fn test_state() -> Arc<AppState> {
    Arc::new(AppState::with_config(Config::default()))
}

fn test_server(state: Arc<AppState>) -> TestServer {
    let router = create_router(state);
    TestServer::new(router).expect("test server")
}

const BELL_QASM: &str = "OPENQASM 2.0;
include \"qelib1.inc\";
qreg q[2];
creg c[2];
h q[0];
cx q[0],q[1];
measure q -> c;";

/// Submit `qasm` to /process and return the response body.
async fn process(server: &TestServer, qasm: &str) -> Value {
    let response = server.post("/process").form(&[("qasm_code", qasm)]).await;
    response.assert_status_ok();
    response.json()
}

fn session_of(body: &Value) -> String {
    body["session"].as_str().expect("session id").to_string()
}

// ============================================================================
// Health endpoint
// ============================================================================

#[tokio::test]
async fn test_health_returns_ok() {
    let server = test_server(test_state());
    let response = server.get("/api/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn test_index_page_has_default_circuit() {
    let server = test_server(test_state());
    let response = server.get("/").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("<textarea"));
    assert!(html.contains("cx q[0],q[1];"));
}

// ============================================================================
// Process
// ============================================================================

#[tokio::test]
async fn test_process_bell_pair() {
    let server = test_server(test_state());
    let body = process(&server, BELL_QASM).await;

    assert_eq!(body["num_qubits"], 2);
    assert_eq!(body["num_clbits"], 2);
    assert_eq!(body["has_steps"], true);
    assert_eq!(body["total_steps"], 2);
    assert!(body["circuit_diagram"].as_str().unwrap().contains('⊕'));

    let qubits = body["qubits"].as_array().unwrap();
    assert_eq!(qubits.len(), 2);
    for (i, q) in qubits.iter().enumerate() {
        assert_eq!(q["idx"], i);
        assert_eq!(q["purity"], 0.5);
        assert_eq!(q["bloch_vec"], "0.0000, 0.0000, 0.0000");
        assert!(q["bloch_svg"].as_str().unwrap().starts_with("<svg"));
        assert!(q["mat_html"].as_str().unwrap().starts_with("<table"));
        assert!(q["full_math"].as_str().unwrap().contains("Tr(ρ²) = 0.5000"));
    }

    let amplitudes = body["state_vector"]["amplitudes"].as_array().unwrap();
    assert_eq!(amplitudes.len(), 2);
    assert_eq!(amplitudes[0]["basis"], "00");
    assert_eq!(amplitudes[1]["basis"], "11");
    assert_eq!(body["transpile"]["final_measurements"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_process_empty_input_returns_400() {
    let server = test_server(test_state());
    let response = server
        .post("/process")
        .form(&[("qasm_code", "   \n")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "bad_request");
    assert_eq!(body["message"], "QASM code is required");
}

#[tokio::test]
async fn test_process_missing_field_returns_400() {
    let server = test_server(test_state());
    let response = server.post("/process").form(&[("other", "x")]).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_process_parse_error_returns_400() {
    let server = test_server(test_state());
    let response = server
        .post("/process")
        .form(&[("qasm_code", "qreg q[1]; frobnicate q[0];")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "parse_error");
    assert!(body["message"].as_str().unwrap().contains("frobnicate"));
}

#[tokio::test]
async fn test_process_mid_circuit_reset_returns_422() {
    let server = test_server(test_state());
    let response = server
        .post("/process")
        .form(&[("qasm_code", "qreg q[1]; h q[0]; reset q[0]; h q[0];")])
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["error"], "simulation_error");
}

#[tokio::test]
async fn test_process_respects_qubit_limit() {
    let mut config = Config::default();
    config.simulation.max_qubits = 2;
    let server = test_server(Arc::new(AppState::with_config(config)));

    let response = server
        .post("/process")
        .form(&[("qasm_code", "qreg q[3]; h q[0];")])
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_process_huge_register_returns_422() {
    let server = test_server(test_state());
    let response = server
        .post("/process")
        .form(&[("qasm_code", "qreg q[4000000000]; h q[0];")])
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["error"], "simulation_error");
    assert!(body["message"].as_str().unwrap().contains("4000000000"));
}

// ============================================================================
// Calculation page
// ============================================================================

#[tokio::test]
async fn test_calculation_page() {
    let server = test_server(test_state());
    let session = session_of(&process(&server, "qreg q[1]; h q[0];").await);

    let response = server
        .get("/calculation/0")
        .add_query_param("session", &session)
        .await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.contains("Detailed Calculation for Qubit 0"));
    assert!(html.contains("2·Re ρ₀₁ = 1.000000"));
    assert!(html.contains("0.500000+0.000000j"));
}

#[tokio::test]
async fn test_calculation_accepts_session_header() {
    let server = test_server(test_state());
    let session = session_of(&process(&server, BELL_QASM).await);

    let response = server
        .get("/calculation/1")
        .add_header(
            HeaderName::from_static("x-qlens-session"),
            HeaderValue::from_str(&session).unwrap(),
        )
        .await;
    response.assert_status_ok();
    assert!(response.text().contains("entangled"));
}

#[tokio::test]
async fn test_calculation_invalid_index_returns_404() {
    let server = test_server(test_state());
    let session = session_of(&process(&server, BELL_QASM).await);

    for path in ["/calculation/5", "/calculation/-1"] {
        let response = server.get(path).add_query_param("session", &session).await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "invalid_index");
    }
}

#[tokio::test]
async fn test_calculation_without_session_returns_404() {
    let server = test_server(test_state());

    let response = server.get("/calculation/0").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "no_session");

    let response = server
        .get("/calculation/0")
        .add_query_param("session", "not-a-uuid")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let server = test_server(test_state());
    let one = session_of(&process(&server, "qreg q[1];").await);
    let three = session_of(&process(&server, "qreg q[3]; x q[2];").await);

    server
        .get("/calculation/2")
        .add_query_param("session", &three)
        .await
        .assert_status_ok();
    server
        .get("/calculation/2")
        .add_query_param("session", &one)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Steps
// ============================================================================

#[tokio::test]
async fn test_list_steps() {
    let server = test_server(test_state());
    let session = session_of(&process(&server, BELL_QASM).await);

    let response = server.get("/steps").add_query_param("session", &session).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["total_steps"], 2);
    let steps = body["steps"].as_array().unwrap();
    assert_eq!(steps[0]["description"], "Apply H to q[0]");
    assert_eq!(steps[1]["qubits"], json!([0, 1]));
}

#[tokio::test]
async fn test_step_zero_is_initial_state() {
    let server = test_server(test_state());
    let session = session_of(&process(&server, BELL_QASM).await);

    let response = server.get("/step/0").add_query_param("session", &session).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["gate"], "Initial State");
    assert!(body["gate_info"].is_null());
    for q in body["qubits"].as_array().unwrap() {
        assert_eq!(q["bloch_vec"], "0.0000, 0.0000, 1.0000");
    }
}

#[tokio::test]
async fn test_step_after_hadamard() {
    let server = test_server(test_state());
    let session = session_of(&process(&server, BELL_QASM).await);

    let response = server.get("/step/1").add_query_param("session", &session).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["gate"], "H");
    assert_eq!(body["gate_info"]["qubits"], json!([0]));
    assert_eq!(body["qubits"][0]["bloch_vec"], "1.0000, 0.0000, 0.0000");
    assert_eq!(body["qubits"][0]["purity"], 1.0);
    let diagram = body["circuit_diagram"].as_str().unwrap();
    assert!(diagram.contains('H'));
    assert!(!diagram.contains('⊕'));
}

#[tokio::test]
async fn test_step_out_of_range_returns_404() {
    let server = test_server(test_state());
    let session = session_of(&process(&server, BELL_QASM).await);

    for path in ["/step/3", "/step/-1"] {
        let response = server.get(path).add_query_param("session", &session).await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "invalid_index");
    }
}

// ============================================================================
// JSON analysis
// ============================================================================

#[tokio::test]
async fn test_analyze_returns_numbers() {
    let server = test_server(test_state());
    let response = server
        .post("/api/analyze")
        .json(&json!({ "qasm": "OPENQASM 3.0; qubit[1] q; x q[0];" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let q0 = &body["qubits"][0];
    assert_eq!(q0["qubit"], 0);
    assert_eq!(q0["bloch_vector"]["z"], -1.0);
    assert_eq!(q0["purity"], 1.0);
    assert!(q0.get("bloch_svg").is_none());
}

#[tokio::test]
async fn test_analyze_returns_full_state_vector() {
    let server = test_server(test_state());
    let response = server
        .post("/api/analyze")
        .json(&json!({ "qasm": "qreg q[7]; h q;" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let state = &body["state_vector"];
    let amplitudes = state["amplitudes"].as_array().unwrap();
    assert_eq!(amplitudes.len(), 1 << 7);
    assert_eq!(state["truncated"], false);
    assert_eq!(amplitudes[0]["basis"], "0000000");
    assert_eq!(amplitudes[127]["basis"], "1111111");

    let total: f64 = amplitudes
        .iter()
        .map(|a| a["probability"].as_f64().unwrap())
        .sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_analyze_lists_zero_amplitudes() {
    let server = test_server(test_state());
    let response = server
        .post("/api/analyze")
        .json(&json!({ "qasm": "qreg q[2]; x q[0];" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let amplitudes = body["state_vector"]["amplitudes"].as_array().unwrap();
    assert_eq!(amplitudes.len(), 4);
    assert_eq!(amplitudes[1]["basis"], "01");
    assert_eq!(amplitudes[1]["probability"], 1.0);
    assert_eq!(amplitudes[3]["probability"], 0.0);
}

#[tokio::test]
async fn test_analyze_invalid_body_returns_400() {
    let server = test_server(test_state());
    let response = server
        .post("/api/analyze")
        .json(&json!({ "source": "qreg q[1];" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "bad_request");
}
