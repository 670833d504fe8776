//! Penalty pipeline: optional scoring passes over a built cost matrix.
//!
//! Each pass mutates the matrix in place after the base cost model has run
//! and before the solver. A pass whose collaborator data is absent is a
//! no-op and reports itself as skipped; data gaps inside a pass (a missing
//! location, a soldier without a record) are counted, never raised.
//!
//! # Passes
//!
//! | Pass | Collaborator | Effect |
//! |------|--------------|--------|
//! | [`ReadinessPass`] | [`ReadinessContext`] | Per-row penalty per failed gate, currency bonus |
//! | [`CohesionPass`] | [`TaskOrganizer`](crate::organizer::TaskOrganizer) | Keep-together bonus for organic team members |
//! | [`GeographicPass`] | [`GeographicContext`] | Per-row travel cost, lead time, theater bonus |
//! | [`QualificationPass`] | [`QualificationContext`] | Per-cell requirement matching |
//!
//! # Usage
//!
//! ```
//! use u_manning::penalty::{PenaltyPipeline, ReadinessPass};
//!
//! let pipeline = PenaltyPipeline::standard();
//! assert_eq!(pipeline.names(), vec!["readiness", "cohesion", "geographic", "qualification"]);
//!
//! let readiness_only = PenaltyPipeline::new().with_pass(ReadinessPass);
//! assert_eq!(readiness_only.len(), 1);
//! ```

mod cohesion;
mod geographic;
mod qualification;
mod readiness;

pub use cohesion::CohesionPass;
pub use geographic::{
    haversine_miles, DistanceCategory, GeoPoint, GeographicContext, GeographicPass, LocationTable,
    TravelCostEstimator, HOME_THEATER,
};
pub use qualification::{
    EducationLevel, LanguageSkill, PolicyRequirementScorer, QualificationContext,
    QualificationPass, QualificationProfile, QualificationRequirements, RequirementScorer,
};
pub use readiness::{
    EquipmentQualification, ReadinessContext, ReadinessPass, ReadinessProfile, ReadinessRecord,
    ReadinessVerdict, TrainingGate,
};

use std::fmt::Debug;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cost::CostMatrix;
use crate::models::{Billet, PolicySet, Soldier};
use crate::organizer::TaskOrganizer;

/// Read-only inputs shared by every pass of one pipeline invocation.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    /// Row order of the matrix.
    pub soldiers: &'a [Soldier],
    /// Column order of the matrix.
    pub billets: &'a [Billet],
    /// Resolved policy for this run.
    pub policy: &'a PolicySet,
    pub readiness: Option<&'a ReadinessContext>,
    pub organizer: Option<&'a TaskOrganizer>,
    pub geography: Option<&'a GeographicContext>,
    pub qualifications: Option<&'a QualificationContext>,
}

impl<'a> PassContext<'a> {
    /// Context with no collaborators attached.
    pub fn bare(soldiers: &'a [Soldier], billets: &'a [Billet], policy: &'a PolicySet) -> Self {
        Self {
            soldiers,
            billets,
            policy,
            readiness: None,
            organizer: None,
            geography: None,
            qualifications: None,
        }
    }
}

/// Outcome of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// Pass name.
    pub pass: String,
    /// Whether the pass touched the matrix.
    pub applied: bool,
    /// Rows or records whose contribution was skipped.
    pub failures: usize,
    /// Why the pass was skipped, if it was.
    pub note: Option<String>,
}

impl PassReport {
    /// A pass that ran.
    pub fn applied(pass: &str, failures: usize) -> Self {
        Self {
            pass: pass.to_string(),
            applied: true,
            failures,
            note: None,
        }
    }

    /// A pass that contributed nothing.
    pub fn skipped(pass: &str, note: impl Into<String>) -> Self {
        Self {
            pass: pass.to_string(),
            applied: false,
            failures: 0,
            note: Some(note.into()),
        }
    }
}

/// A scoring pass over the cost matrix.
///
/// Implementations must leave the matrix untouched when their collaborator
/// is missing from the context, and must only write cells they own.
pub trait PenaltyPass: Send + Sync + Debug {
    /// Pass name (e.g., "readiness").
    fn name(&self) -> &'static str;

    /// Applies the pass to `matrix` (rows = `ctx.soldiers`, cols = `ctx.billets`).
    fn apply(&self, matrix: &mut CostMatrix, ctx: &PassContext<'_>) -> PassReport;
}

/// Ordered registry of penalty passes.
#[derive(Clone, Default)]
pub struct PenaltyPipeline {
    passes: Vec<Arc<dyn PenaltyPass>>,
}

impl PenaltyPipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// The four standard passes: readiness, cohesion, geographic, qualification.
    pub fn standard() -> Self {
        Self::new()
            .with_pass(ReadinessPass)
            .with_pass(CohesionPass)
            .with_pass(GeographicPass)
            .with_pass(QualificationPass)
    }

    /// Appends a pass.
    pub fn with_pass<P: PenaltyPass + 'static>(mut self, pass: P) -> Self {
        self.passes.push(Arc::new(pass));
        self
    }

    /// Appends a shared pass.
    pub fn register(&mut self, pass: Arc<dyn PenaltyPass>) {
        self.passes.push(pass);
    }

    /// Pass names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Number of registered passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Whether no pass is registered.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Runs every pass in order and collects their reports.
    pub fn run(&self, matrix: &mut CostMatrix, ctx: &PassContext<'_>) -> Vec<PassReport> {
        self.passes
            .iter()
            .map(|pass| {
                let report = pass.apply(matrix, ctx);
                if report.applied {
                    debug!(pass = pass.name(), failures = report.failures, "penalty pass applied");
                    if report.failures > 0 {
                        warn!(
                            pass = pass.name(),
                            failures = report.failures,
                            "penalty pass skipped some rows"
                        );
                    }
                } else {
                    debug!(
                        pass = pass.name(),
                        note = report.note.as_deref().unwrap_or(""),
                        "penalty pass skipped"
                    );
                }
                report
            })
            .collect()
    }
}

impl Debug for PenaltyPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PenaltyPipeline")
            .field("passes", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{CostModel, TransferCostTable};
    use crate::models::Priority;

    fn pools() -> (Vec<Soldier>, Vec<Billet>) {
        let soldiers = vec![
            Soldier::new(1, "FBNC", 4, "11B").with_dwell(3),
            Soldier::new(2, "JBLM", 5, "11B").with_deployable(false),
            Soldier::new(3, "FHTX", 6, "68W"),
        ];
        let billets = vec![
            Billet::new(10, "FBNC", "11B").with_priority(Priority::High),
            Billet::new(11, "JBLM", "68W").with_capability("Medic Team", true),
        ];
        (soldiers, billets)
    }

    #[derive(Debug)]
    struct AddOne;

    impl PenaltyPass for AddOne {
        fn name(&self) -> &'static str {
            "add_one"
        }

        fn apply(&self, matrix: &mut CostMatrix, _ctx: &PassContext<'_>) -> PassReport {
            for i in 0..matrix.rows() {
                matrix.add_to_row(i, 1.0);
            }
            PassReport::applied(self.name(), 0)
        }
    }

    #[test]
    fn test_absent_collaborators_leave_matrix_bit_identical() {
        let (soldiers, billets) = pools();
        let policy = PolicySet::default();
        let base = CostModel::new(TransferCostTable::conus()).build_matrix(&soldiers, &billets, &policy);

        let mut m = base.clone();
        let ctx = PassContext::bare(&soldiers, &billets, &policy);
        let reports = PenaltyPipeline::standard().run(&mut m, &ctx);

        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(|r| !r.applied && r.note.is_some()));
        let same = base
            .as_slice()
            .iter()
            .zip(m.as_slice())
            .all(|(a, b)| a.to_bits() == b.to_bits());
        assert!(same);
    }

    #[test]
    fn test_custom_pass_registration() {
        let (soldiers, billets) = pools();
        let policy = PolicySet::default();
        let mut pipeline = PenaltyPipeline::new();
        pipeline.register(Arc::new(AddOne));
        assert_eq!(pipeline.names(), vec!["add_one"]);

        let mut m = CostMatrix::zeros(3, 2);
        let reports = pipeline.run(&mut m, &PassContext::bare(&soldiers, &billets, &policy));
        assert!(reports[0].applied);
        assert!(m.as_slice().iter().all(|&c| (c - 1.0).abs() < 1e-10));
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = PenaltyPipeline::new();
        assert!(pipeline.is_empty());
        let mut m = CostMatrix::zeros(0, 0);
        let policy = PolicySet::default();
        assert!(pipeline
            .run(&mut m, &PassContext::bare(&[], &[], &policy))
            .is_empty());
    }
}
