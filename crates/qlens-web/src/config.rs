//! Configuration management for the qlens web server.
//!
//! Configuration precedence (lowest to highest):
//! 1. Default values
//! 2. Configuration file (YAML)
//! 3. `.env` file
//! 4. Environment variables (with `QLENS_` prefix)
//! 5. Command-line flags
//!
//! A `.env` file never overrides variables already set in the environment.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use qlens_sim::{DEFAULT_MAX_QUBITS, MAX_OPTIMIZATION_LEVEL};

/// Widest circuit the server can be configured to accept.
pub const MAX_SUPPORTED_QUBITS: usize = 28;

/// Default `EnvFilter` directive.
pub const DEFAULT_LOG_FILTER: &str = "qlens_web=info,tower_http=info";

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub sessions: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000")
    #[serde(default = "default_address")]
    pub address: String,

    /// Allowed CORS origins. Empty or `*` allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Simulator limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_max_qubits")]
    pub max_qubits: usize,

    /// Transpiler optimization level (0-2)
    #[serde(default = "default_optimization_level")]
    pub optimization_level: u8,
}

/// In-memory session store limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of live sessions; the oldest is evicted first.
    #[serde(default = "default_session_capacity")]
    pub capacity: usize,

    /// Session lifetime in seconds
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. "info" or "qlens_web=debug"
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output.
    #[default]
    Console,
    /// JSON structured logging.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" => Ok(LogFormat::Console),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::ValidationError(format!(
                "Invalid log format: {other}"
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Console => f.write_str("console"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

// Default value functions
fn default_address() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_max_qubits() -> usize {
    DEFAULT_MAX_QUBITS
}

fn default_optimization_level() -> u8 {
    MAX_OPTIMIZATION_LEVEL
}

fn default_session_capacity() -> usize {
    256
}

fn default_session_ttl() -> u64 {
    3600 // 1 hour
}

fn default_log_level() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            cors_origins: vec![],
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_qubits: default_max_qubits(),
            optimization_level: default_optimization_level(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: default_session_capacity(),
            ttl_seconds: default_session_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Command-line flags of the `qlens-web` binary.
#[derive(Debug, Default, Parser)]
#[command(name = "qlens-web")]
#[command(author, version, about = "Serve the qlens circuit state inspector", long_about = None)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "QLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bind address, e.g. 0.0.0.0:8000
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Maximum number of qubits per circuit
    #[arg(long)]
    pub max_qubits: Option<usize>,

    /// Transpiler optimization level (0-2)
    #[arg(long)]
    pub optimization_level: Option<u8>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text. Missing sections keep defaults.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml_ng::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration in precedence order, excluding CLI flags.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };

        let config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration for the binary: file, environment, then flags.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let config = Self::load(cli.config.as_deref())?.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Merge `QLENS_*` environment variables into this configuration.
    fn merge_env(self) -> Result<Self, ConfigError> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Merge variables from `lookup`. Only variables that are present
    /// override the current values.
    pub fn merge_vars(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // Server
        if let Some(v) = lookup("QLENS_ADDRESS") {
            self.server.address = v;
        }
        if let Some(v) = lookup("QLENS_CORS_ORIGINS") {
            self.server.cors_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        // Simulation
        if let Some(v) = lookup("QLENS_MAX_QUBITS") {
            self.simulation.max_qubits = parse_var("QLENS_MAX_QUBITS", &v)?;
        }
        if let Some(v) = lookup("QLENS_OPTIMIZATION_LEVEL") {
            self.simulation.optimization_level = parse_var("QLENS_OPTIMIZATION_LEVEL", &v)?;
        }

        // Sessions
        if let Some(v) = lookup("QLENS_SESSION_CAPACITY") {
            self.sessions.capacity = parse_var("QLENS_SESSION_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("QLENS_SESSION_TTL") {
            self.sessions.ttl_seconds = parse_var("QLENS_SESSION_TTL", &v)?;
        }

        // Logging
        if let Some(v) = lookup("QLENS_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("QLENS_LOG_FORMAT") {
            self.logging.format = v.parse()?;
        }

        Ok(self)
    }

    /// Apply command-line flags on top of this configuration.
    #[must_use]
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(bind) = &cli.bind {
            self.server.address.clone_from(bind);
        }
        if let Some(max) = cli.max_qubits {
            self.simulation.max_qubits = max;
        }
        if let Some(level) = cli.optimization_level {
            self.simulation.optimization_level = level;
        }
        if let Some(format) = cli.log_format {
            self.logging.format = format;
        }
        match cli.verbose {
            0 => {}
            1 => self.logging.level = "qlens_web=debug,qlens_sim=debug,tower_http=debug".into(),
            _ => self.logging.level = "trace".into(),
        }
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_address()?;

        if self.simulation.max_qubits == 0 || self.simulation.max_qubits > MAX_SUPPORTED_QUBITS {
            return Err(ConfigError::ValidationError(format!(
                "max_qubits must be between 1 and {MAX_SUPPORTED_QUBITS}, got {}",
                self.simulation.max_qubits
            )));
        }

        if self.simulation.optimization_level > MAX_OPTIMIZATION_LEVEL {
            return Err(ConfigError::ValidationError(format!(
                "optimization_level must be at most {MAX_OPTIMIZATION_LEVEL}, got {}",
                self.simulation.optimization_level
            )));
        }

        if self.sessions.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "session capacity must be greater than 0".to_string(),
            ));
        }
        if self.sessions.ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "session ttl_seconds must be greater than 0".to_string(),
            ));
        }

        if tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Get the parsed bind address.
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        self.server.address.parse().map_err(|_| {
            ConfigError::ValidationError(format!("Invalid server address: {}", self.server.address))
        })
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("Invalid value for {key}: {value}")))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: FxHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.address, "127.0.0.1:8000");
        assert_eq!(config.simulation.max_qubits, 20);
        assert_eq!(config.logging.level, DEFAULT_LOG_FILTER);
        assert_eq!(config.logging.format, LogFormat::Console);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            "simulation:\n  max_qubits: 12\nlogging:\n  format: json\n",
        )
        .unwrap();
        assert_eq!(config.simulation.max_qubits, 12);
        assert_eq!(config.simulation.optimization_level, MAX_OPTIMIZATION_LEVEL);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            Config::from_yaml("server: [unclosed"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        let config = Config::from_yaml("server:\n  address: 0.0.0.0:9000\n")
            .unwrap()
            .merge_vars(vars(&[
                ("QLENS_MAX_QUBITS", "8"),
                ("QLENS_CORS_ORIGINS", "http://a.test, http://b.test"),
                ("QLENS_LOG_FORMAT", "JSON"),
            ]))
            .unwrap();
        assert_eq!(config.server.address, "0.0.0.0:9000");
        assert_eq!(config.simulation.max_qubits, 8);
        assert_eq!(config.server.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_bad_env_value_is_rejected() {
        let err = Config::default()
            .merge_vars(vars(&[("QLENS_SESSION_TTL", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("QLENS_SESSION_TTL"));
    }

    #[test]
    fn test_cli_overrides_env() {
        let cli = Cli::try_parse_from(["qlens-web", "--bind", "0.0.0.0:7000", "--max-qubits", "5", "-v"])
            .unwrap();
        let config = Config::default()
            .merge_vars(vars(&[("QLENS_ADDRESS", "127.0.0.1:1234")]))
            .unwrap()
            .apply_cli(&cli);
        assert_eq!(config.server.address, "0.0.0.0:7000");
        assert_eq!(config.simulation.max_qubits, 5);
        assert!(config.logging.level.contains("debug"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.simulation.max_qubits = 40;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.address = "not-an-address".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.simulation.optimization_level = 3;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sessions.capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_address_parsing() {
        let addr = Config::default().bind_address().unwrap();
        assert_eq!(addr.port(), 8000);
    }
}
