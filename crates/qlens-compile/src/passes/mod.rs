//! Built-in transpilation passes.
//!
//! - [`RemoveFinalMeasurements`]: strips barriers and terminal measurements
//! - [`RemoveIdentities`]: drops identity gates
//! - [`CancelAdjacentInverses`]: removes `G·G⁻¹` pairs
//! - [`MergeRotations`]: folds same-axis rotations
//! - [`VerifyIntegrity`]: checks the DAG after rewriting

mod measurement;
mod optimization;
mod verification;

pub use measurement::RemoveFinalMeasurements;
pub use optimization::{CancelAdjacentInverses, EPSILON, MergeRotations, RemoveIdentities};
pub use verification::VerifyIntegrity;
