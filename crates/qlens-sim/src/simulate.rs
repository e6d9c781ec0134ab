//! From OpenQASM text to a final state vector.

use std::time::Instant;

use tracing::{debug, instrument};

use qlens_compile::{MAX_OPTIMIZATION_LEVEL, PassManagerBuilder, TranspileStats};
use qlens_ir::{Circuit, ClbitId, QubitId};
use qlens_qasm::{ParseError, ParseLimits};

use crate::error::{QlensError, SimError, SimResult};
use crate::statevector::StateVector;

/// Default upper bound on circuit width.
pub const DEFAULT_MAX_QUBITS: usize = 20;

/// Output of a full simulation run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Final state of the ideal evolution.
    pub state: StateVector,
    pub num_qubits: usize,
    pub num_clbits: usize,
    /// The circuit as parsed, before transpilation.
    pub circuit: Circuit,
    /// The circuit that was actually executed.
    pub transpiled: Circuit,
    /// Terminal measurements dropped by the transpiler, in circuit order.
    pub final_measurements: Vec<(QubitId, ClbitId)>,
    pub stats: TranspileStats,
}

/// Ideal state-vector simulator.
#[derive(Debug, Clone, Copy)]
pub struct Simulator {
    max_qubits: usize,
    optimization_level: u8,
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
            optimization_level: MAX_OPTIMIZATION_LEVEL,
        }
    }

    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Transpiler level, clamped to [`MAX_OPTIMIZATION_LEVEL`].
    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.optimization_level = level.min(MAX_OPTIMIZATION_LEVEL);
        self
    }

    pub fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    pub fn optimization_level(&self) -> u8 {
        self.optimization_level
    }

    /// Parse, transpile and execute `source`.
    #[instrument(skip(self, source), fields(len = source.len()))]
    pub fn simulate(&self, source: &str) -> Result<SimulationResult, QlensError> {
        let limits = ParseLimits::default().with_max_qubits(self.max_qubits);
        let circuit = qlens_qasm::parse_with_limits(source, limits).map_err(|e| match e {
            ParseError::QubitLimitExceeded {
                required, limit, ..
            } => QlensError::Simulation(SimError::QubitLimitExceeded { required, limit }),
            other => QlensError::Parse(other),
        })?;
        self.check_width(&circuit)?;

        let pm = PassManagerBuilder::new()
            .with_optimization_level(self.optimization_level)
            .build();
        let (transpiled, properties) = pm.transpile(&circuit)?;
        let state = self.run(&transpiled)?;

        Ok(SimulationResult {
            state,
            num_qubits: circuit.num_qubits(),
            num_clbits: circuit.num_clbits(),
            circuit,
            transpiled,
            final_measurements: properties.final_measurements,
            stats: properties.stats,
        })
    }

    /// Execute a circuit from |0...0⟩ without transpiling it.
    #[instrument(skip(self, circuit), fields(name = circuit.name()))]
    pub fn run(&self, circuit: &Circuit) -> SimResult<StateVector> {
        self.check_width(circuit)?;
        let start = Instant::now();

        let num_qubits = circuit.num_qubits();
        let instructions = circuit.instructions();
        debug!(
            "Starting simulation: {} qubits, {} instructions",
            num_qubits,
            instructions.len()
        );

        let mut state = StateVector::new(num_qubits);
        for inst in instructions {
            state.apply(inst)?;
        }

        debug!("Simulation completed in {:?}", start.elapsed());
        Ok(state)
    }

    fn check_width(&self, circuit: &Circuit) -> SimResult<()> {
        if circuit.num_qubits() > self.max_qubits {
            return Err(SimError::QubitLimitExceeded {
                required: circuit.num_qubits(),
                limit: self.max_qubits,
            });
        }
        Ok(())
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulate `source` with the default [`Simulator`].
pub fn simulate(source: &str) -> Result<SimulationResult, QlensError> {
    Simulator::new().simulate(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_simulate_bell() {
        let result = simulate(
            r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[2];
            creg c[2];
            h q[0];
            cx q[0], q[1];
            measure q -> c;
            "#,
        )
        .unwrap();

        assert_eq!(result.num_qubits, 2);
        assert_eq!(result.num_clbits, 2);
        assert_eq!(result.final_measurements.len(), 2);
        let amps = result.state.amplitudes();
        assert!((amps[0] - Complex64::new(FRAC_1_SQRT_2, 0.0)).norm() < 1e-10);
        assert!((amps[3] - Complex64::new(FRAC_1_SQRT_2, 0.0)).norm() < 1e-10);
    }

    #[test]
    fn test_qubit_limit() {
        let err = Simulator::new()
            .with_max_qubits(3)
            .simulate("qreg q[4];")
            .unwrap_err();
        assert!(matches!(
            err,
            QlensError::Simulation(SimError::QubitLimitExceeded {
                required: 4,
                limit: 3
            })
        ));
    }

    #[test]
    fn test_oversized_register_is_rejected_before_allocation() {
        let sim = Simulator::new().with_max_qubits(20);
        for source in [
            "qreg q[20000000];",
            "qreg q[4000000000];",
            "qreg a[4000000000]; qreg b[4000000000];",
        ] {
            let err = sim.simulate(source).unwrap_err();
            assert!(
                matches!(
                    err,
                    QlensError::Simulation(SimError::QubitLimitExceeded { limit: 20, .. })
                ),
                "{source}: {err}"
            );
        }
    }

    #[test]
    fn test_mid_circuit_measure_is_rejected() {
        let err = simulate("qreg q[1]; creg c[1]; h q[0]; measure q[0] -> c[0]; h q[0];")
            .unwrap_err();
        assert!(matches!(
            err,
            QlensError::Simulation(SimError::UnsupportedInstruction { .. })
        ));
    }

    #[test]
    fn test_reset_is_rejected() {
        let err = simulate("qreg q[1]; reset q[0];").unwrap_err();
        assert!(matches!(err, QlensError::Simulation(_)));
    }

    #[test]
    fn test_parse_error_passes_through() {
        let err = simulate("qreg q[1]; foo q[0];").unwrap_err();
        assert!(matches!(err, QlensError::Parse(_)));
    }

    #[test]
    fn test_original_circuit_is_kept() {
        let result = simulate("qreg q[1]; h q[0]; h q[0];").unwrap();
        assert_eq!(result.circuit.dag().num_ops(), 2);
        assert_eq!(result.transpiled.dag().num_ops(), 0);
        assert_eq!(result.stats.removed(), 2);
    }

    #[test]
    fn test_builder_clamps_level() {
        let sim = Simulator::new().with_optimization_level(7);
        assert_eq!(sim.optimization_level(), MAX_OPTIMIZATION_LEVEL);
        assert_eq!(Simulator::default().max_qubits(), DEFAULT_MAX_QUBITS);
    }
}
