//! Pass manager for orchestrating transpilation.

use tracing::{debug, info, instrument};

use qlens_ir::{Circuit, CircuitDag};

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{
    CancelAdjacentInverses, MergeRotations, RemoveFinalMeasurements, RemoveIdentities,
    VerifyIntegrity,
};
use crate::property::{PropertySet, TranspileStats};

/// Highest supported optimization level.
pub const MAX_OPTIMIZATION_LEVEL: u8 = 2;

/// Manages and executes a sequence of passes.
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given DAG, recording op counts in
    /// [`PropertySet::stats`].
    #[instrument(skip(self, dag, properties))]
    pub fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let ops_before = dag.num_ops();
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            dag.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(dag, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(dag, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), dag.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        properties.stats = TranspileStats {
            ops_before,
            ops_after: dag.num_ops(),
        };
        info!(
            "Pass manager completed, ops: {} -> {}",
            ops_before,
            dag.num_ops()
        );
        Ok(())
    }

    /// Transpile a copy of `circuit`, leaving the original untouched.
    pub fn transpile(&self, circuit: &Circuit) -> CompileResult<(Circuit, PropertySet)> {
        let mut transpiled = circuit.clone();
        let mut properties = PropertySet::new();
        self.run(transpiled.dag_mut(), &mut properties)?;
        Ok((transpiled, properties))
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Pass names in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for pass managers targeting the ideal state-vector simulator.
pub struct PassManagerBuilder {
    optimization_level: u8,
}

impl PassManagerBuilder {
    pub fn new() -> Self {
        Self {
            optimization_level: MAX_OPTIMIZATION_LEVEL,
        }
    }

    /// Set the optimization level.
    ///
    /// - Level 0: strip barriers and terminal measurements only
    /// - Level 1: + identity removal and inverse-pair cancellation
    /// - Level 2: + rotation merging (default)
    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.optimization_level = level.min(MAX_OPTIMIZATION_LEVEL);
        self
    }

    pub fn build(self) -> PassManager {
        let mut pm = PassManager::new();

        pm.add_pass(RemoveFinalMeasurements);

        if self.optimization_level >= 1 {
            pm.add_pass(RemoveIdentities);
            pm.add_pass(CancelAdjacentInverses);
        }

        if self.optimization_level >= 2 {
            pm.add_pass(MergeRotations);
            // Merging can produce new identities and new inverse pairs.
            pm.add_pass(RemoveIdentities);
            pm.add_pass(CancelAdjacentInverses);
        }

        pm.add_pass(VerifyIntegrity);
        pm
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
