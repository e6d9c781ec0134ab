//! Application state shared by all handlers.

use qlens_sim::Simulator;

use crate::config::Config;
use crate::session::SessionStore;

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Simulator configured with the server's limits.
    pub simulator: Simulator,
    pub sessions: SessionStore,
}

impl AppState {
    /// Create a new application state with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create application state with custom configuration.
    pub fn with_config(config: Config) -> Self {
        let simulator = Simulator::new()
            .with_max_qubits(config.simulation.max_qubits)
            .with_optimization_level(config.simulation.optimization_level);
        let sessions = SessionStore::from_config(&config.sessions);
        Self {
            config,
            simulator,
            sessions,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
