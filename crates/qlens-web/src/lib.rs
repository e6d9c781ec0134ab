//! qlens web - Inspect the single-qubit states of an OpenQASM circuit.
//!
//! The server accepts a circuit, simulates its final state vector and
//! returns, for every qubit:
//!
//! - the reduced density matrix
//! - its purity
//! - the Bloch vector, drawn as an SVG sphere
//!
//! Each submission opens a session, so the detail page and the step player
//! can refer back to it without resubmitting the circuit.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use qlens_web::{AppState, Config, create_router};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let addr = config.bind_address()?;
//!     let state = Arc::new(AppState::with_config(config));
//!
//!     let app = create_router(state);
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dto;
pub mod error;
pub mod render;
pub mod server;
pub mod session;
pub mod state;
pub mod tracing_config;

pub use config::{Cli, Config, ConfigError, LogFormat};
pub use dto::{
    AnalyzeRequest, AnalyzeResponse, HealthResponse, ProcessResponse, QubitView, StepResponse,
    StepsResponse,
};
pub use error::ApiError;
pub use server::{DEFAULT_QASM, create_router};
pub use session::{Session, SessionStore};
pub use state::AppState;
pub use tracing_config::init_tracing;
