//! Assignment pipeline.
//!
//! [`AssignmentEngine`] wires the cost model, the penalty pipeline and the
//! solver into one run:
//!
//! 1. Validate both pools ([`crate::validation`])
//! 2. Resolve the policy against the documented defaults
//! 3. Build the base cost matrix for the chosen mission
//! 4. Apply every registered penalty pass
//! 5. Solve exactly, falling back to greedy on solver failure
//! 6. Emit rows sorted by cost plus a [`summary`](summarize)
//!
//! [`AssignmentEngine::sensitivity`] sweeps one policy weight across a list
//! of values.

mod pipeline;
mod sensitivity;
mod summary;

pub use pipeline::{AssignmentEngine, DEFAULT_MISSION};
pub use sensitivity::SensitivityPoint;
pub use summary::summarize;
