//! The assignment engine: cost model, penalty pipeline, solver.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cost::{CostMatrix, CostModel, TransferCostTable};
use crate::error::{EngineError, Result};
use crate::models::{AssignmentResult, AssignmentRow, Billet, MissionProfile, PolicySet, Soldier};
use crate::organizer::TaskOrganizer;
use crate::penalty::{
    GeographicContext, PassContext, PassReport, PenaltyPipeline, QualificationContext,
    ReadinessContext,
};
use crate::solver::{AssignmentSolver, GreedySolver, HungarianSolver, Matching};
use crate::validation::validate_pools;

use super::summarize;

/// Name of the mission profile used for unknown mission names.
pub const DEFAULT_MISSION: &str = "default";

/// Soldier-to-billet assignment engine.
///
/// Owns both pools and every optional collaborator. Each [`run`](Self::run)
/// validates the pools, resolves the policy, builds the base cost matrix,
/// applies the penalty pipeline and solves. A run either completes with a
/// summary or is rejected before any matrix is built.
///
/// # Example
///
/// ```
/// use u_manning::cost::TransferCostTable;
/// use u_manning::engine::AssignmentEngine;
/// use u_manning::models::{Billet, PolicySet, Soldier};
///
/// let soldiers = vec![
///     Soldier::new(1, "JBLM", 4, "11B"),
///     Soldier::new(2, "FBNC", 5, "68W"),
/// ];
/// let billets = vec![
///     Billet::new(101, "JBLM", "11B"),
///     Billet::new(102, "FBNC", "68W"),
/// ];
///
/// let engine = AssignmentEngine::new(soldiers, billets)
///     .with_transfer_table(TransferCostTable::conus());
/// let result = engine.run(&PolicySet::default(), "default").unwrap();
///
/// assert_eq!(result.summary.fill_rate, 1.0);
/// assert_eq!(result.row_for_billet(102).unwrap().soldier.id, 2);
/// ```
#[derive(Debug)]
pub struct AssignmentEngine {
    soldiers: Vec<Soldier>,
    billets: Vec<Billet>,
    transfer: TransferCostTable,
    missions: HashMap<String, MissionProfile>,
    readiness: Option<ReadinessContext>,
    organizer: Option<TaskOrganizer>,
    geography: Option<GeographicContext>,
    qualifications: Option<QualificationContext>,
    pipeline: PenaltyPipeline,
    solver: Arc<dyn AssignmentSolver>,
}

impl AssignmentEngine {
    /// Creates an engine with the default transfer table, a neutral
    /// `default` mission, the standard pipeline and the exact solver.
    pub fn new(soldiers: Vec<Soldier>, billets: Vec<Billet>) -> Self {
        let mut missions = HashMap::new();
        missions.insert(DEFAULT_MISSION.to_string(), MissionProfile::default());
        Self {
            soldiers,
            billets,
            transfer: TransferCostTable::new(),
            missions,
            readiness: None,
            organizer: None,
            geography: None,
            qualifications: None,
            pipeline: PenaltyPipeline::standard(),
            solver: Arc::new(HungarianSolver),
        }
    }

    pub fn with_transfer_table(mut self, transfer: TransferCostTable) -> Self {
        self.transfer = transfer;
        self
    }

    /// Registers (or replaces) a named mission profile.
    pub fn with_mission(mut self, name: impl Into<String>, profile: MissionProfile) -> Self {
        self.missions.insert(name.into(), profile);
        self
    }

    pub fn with_readiness(mut self, readiness: ReadinessContext) -> Self {
        self.readiness = Some(readiness);
        self
    }

    pub fn with_organizer(mut self, organizer: TaskOrganizer) -> Self {
        self.organizer = Some(organizer);
        self
    }

    pub fn with_geography(mut self, geography: GeographicContext) -> Self {
        self.geography = Some(geography);
        self
    }

    pub fn with_qualifications(mut self, qualifications: QualificationContext) -> Self {
        self.qualifications = Some(qualifications);
        self
    }

    /// Replaces the penalty pipeline.
    pub fn with_pipeline(mut self, pipeline: PenaltyPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Replaces the primary solver. The greedy solver stays the fallback.
    pub fn with_solver<S: AssignmentSolver + 'static>(mut self, solver: S) -> Self {
        self.solver = Arc::new(solver);
        self
    }

    pub fn soldiers(&self) -> &[Soldier] {
        &self.soldiers
    }

    pub fn billets(&self) -> &[Billet] {
        &self.billets
    }

    pub fn organizer(&self) -> Option<&TaskOrganizer> {
        self.organizer.as_ref()
    }

    pub fn pipeline(&self) -> &PenaltyPipeline {
        &self.pipeline
    }

    /// Registered mission names, sorted.
    pub fn mission_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.missions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Looks up a mission profile; unknown names use `default`.
    pub fn mission(&self, name: &str) -> MissionProfile {
        match self.missions.get(name) {
            Some(profile) => profile.clone(),
            None => {
                debug!(mission = name, "unknown mission, using default profile");
                self.missions
                    .get(DEFAULT_MISSION)
                    .cloned()
                    .unwrap_or_default()
            }
        }
    }

    /// Builds the penalized cost matrix for one policy and mission.
    ///
    /// Returns the matrix with one report per penalty pass. The policy is
    /// expected to be resolved already.
    pub fn cost_matrix(&self, policy: &PolicySet, mission: &str) -> (CostMatrix, Vec<PassReport>) {
        let model = CostModel::new(self.transfer.clone()).with_mission(self.mission(mission));
        let mut matrix = model.build_matrix(&self.soldiers, &self.billets, policy);

        let ctx = PassContext {
            soldiers: &self.soldiers,
            billets: &self.billets,
            policy,
            readiness: self.readiness.as_ref(),
            organizer: self.organizer.as_ref(),
            geography: self.geography.as_ref(),
            qualifications: self.qualifications.as_ref(),
        };
        let reports = self.pipeline.run(&mut matrix, &ctx);
        (matrix, reports)
    }

    /// Runs the full pipeline once.
    ///
    /// # Errors
    /// - [`EngineError::Validation`] if the pools fail integrity checks
    /// - [`EngineError::MalformedPolicy`] if a policy weight is not finite
    ///
    /// Empty pools are not errors: they produce an empty result with a
    /// zero-valued summary.
    pub fn run(&self, policy: &PolicySet, mission: &str) -> Result<AssignmentResult> {
        validate_pools(&self.soldiers, &self.billets).map_err(EngineError::Validation)?;
        let policy = policy.resolved()?;

        let (matrix, reports) = self.cost_matrix(&policy, mission);

        let mut notes: Vec<String> = reports
            .iter()
            .filter(|r| r.failures > 0)
            .map(|r| format!("{} pass skipped {} row(s) with missing data", r.pass, r.failures))
            .collect();
        let omissions = reports.iter().map(|r| r.failures).sum();

        let (matching, solver) = self.solve(&matrix, &mut notes)?;

        let mut rows: Vec<AssignmentRow> = matching
            .pairs()
            .iter()
            .map(|&(i, j)| AssignmentRow {
                soldier: self.soldiers[i].clone(),
                billet: self.billets[j].clone(),
                cost: matrix.get(i, j),
            })
            .collect();
        rows.sort_by(|a, b| a.cost.total_cmp(&b.cost));

        let mut summary = summarize(mission, &rows, self.billets.len());
        summary.solver = solver.to_string();
        summary.omissions = omissions;
        summary.notes = notes;

        info!(
            mission,
            policy = %policy.name,
            fill_rate = summary.fill_rate,
            total_cost = summary.total_cost,
            filled = summary.filled_billets,
            solver,
            "assignment run complete"
        );

        Ok(AssignmentResult { rows, summary })
    }

    fn solve(&self, matrix: &CostMatrix, notes: &mut Vec<String>) -> Result<(Matching, &'static str)> {
        match self.solver.solve(matrix) {
            Ok(matching) => Ok((matching, self.solver.name())),
            Err(e) => {
                warn!(solver = self.solver.name(), error = %e, "exact solver failed, using greedy");
                notes.push(format!("{} solver unavailable ({e}); greedy fallback used", self.solver.name()));
                let fallback = GreedySolver;
                Ok((fallback.solve(matrix)?, fallback.name()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::policy::keys;
    use crate::models::Priority;
    use crate::penalty::{PenaltyPass, ReadinessPass, ReadinessProfile, ReadinessRecord};
    use crate::validation::ValidationErrorKind;
    use chrono::NaiveDate;

    fn neutral_policy() -> PolicySet {
        PolicySet::new("neutral")
            .with(keys::PRIORITY_WEIGHT_LOW, 1.0)
            .with(keys::PRIORITY_WEIGHT_MED, 1.0)
            .with(keys::PRIORITY_WEIGHT_HIGH, 1.0)
    }

    fn five_by_five() -> AssignmentEngine {
        let soldiers = [4, 5, 6, 4, 5]
            .iter()
            .enumerate()
            .map(|(i, &rank)| Soldier::new(i as u32 + 1, "JBLM", rank, "A"))
            .collect();
        let billets = (0..5)
            .map(|j| {
                Billet::new(100 + j, "JBLM", "A")
                    .with_rank_band(4, 6)
                    .with_priority(Priority::Medium)
            })
            .collect();
        AssignmentEngine::new(soldiers, billets).with_transfer_table(TransferCostTable::free())
    }

    #[test]
    fn test_end_to_end_same_location() {
        let result = five_by_five().run(&neutral_policy(), "default").unwrap();

        assert_eq!(result.len(), 5);
        assert!((result.summary.fill_rate - 1.0).abs() < 1e-10);
        assert!((result.summary.total_cost - (-1000.0)).abs() < 1e-10);
        assert_eq!(result.summary.filled_by_priority[&2], 5);
        assert_eq!(result.summary.filled_by_location["JBLM"], 5);
        assert_eq!(result.summary.solver, "hungarian");
        assert_eq!(result.summary.omissions, 0);
        assert!(result.summary.notes.is_empty());
    }

    #[test]
    fn test_rows_sorted_by_cost() {
        let soldiers = vec![
            Soldier::new(1, "FBNC", 4, "11B"),
            Soldier::new(2, "JBLM", 4, "11B"),
        ];
        let billets = vec![Billet::new(101, "JBLM", "11B"), Billet::new(102, "JBER", "11B")];
        let result = AssignmentEngine::new(soldiers, billets)
            .run(&PolicySet::default(), "default")
            .unwrap();
        assert!(result.rows.windows(2).all(|w| w[0].cost <= w[1].cost));
    }

    #[test]
    fn test_empty_pools() {
        let engine = AssignmentEngine::new(vec![], vec![Billet::new(1, "JBLM", "11B")]);
        let result = engine.run(&PolicySet::default(), "default").unwrap();
        assert!(result.is_empty());
        assert_eq!(result.summary.total_billets, 1);
        assert_eq!(result.summary.fill_rate, 0.0);

        let engine = AssignmentEngine::new(vec![], vec![]);
        let result = engine.run(&PolicySet::default(), "default").unwrap();
        assert_eq!(result.summary.total_billets, 0);
        assert_eq!(result.summary.total_cost, 0.0);
    }

    #[test]
    fn test_invalid_pool_rejected() {
        let engine = AssignmentEngine::new(
            vec![Soldier::new(1, "JBLM", 4, "11B"), Soldier::new(1, "JBLM", 5, "11B")],
            vec![Billet::new(1, "JBLM", "11B")],
        );
        match engine.run(&PolicySet::default(), "default") {
            Err(EngineError::Validation(errors)) => {
                assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateId)
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_policy_rejected() {
        let policy = PolicySet::default().with(keys::MOS_MISMATCH, f64::NAN);
        let err = five_by_five().run(&policy, "default").unwrap_err();
        assert!(matches!(err, EngineError::MalformedPolicy { .. }));
    }

    #[test]
    fn test_unknown_mission_uses_default() {
        let engine = five_by_five()
            .with_mission("pacific", MissionProfile::new().with_location_bias("JBLM", -100.0));
        let default = engine.run(&neutral_policy(), "default").unwrap();
        let unknown = engine.run(&neutral_policy(), "arctic").unwrap();
        let pacific = engine.run(&neutral_policy(), "pacific").unwrap();

        assert!((default.summary.total_cost - unknown.summary.total_cost).abs() < 1e-10);
        assert_eq!(unknown.summary.mission, "arctic");
        assert!((pacific.summary.total_cost - (-1500.0)).abs() < 1e-10);
        assert_eq!(engine.mission_names(), vec!["default", "pacific"]);
    }

    #[derive(Debug)]
    struct PoisonPass;

    impl PenaltyPass for PoisonPass {
        fn name(&self) -> &'static str {
            "poison"
        }

        fn apply(&self, matrix: &mut CostMatrix, _ctx: &PassContext<'_>) -> PassReport {
            if !matrix.is_empty() {
                matrix.set(0, 0, f64::NAN);
            }
            PassReport::applied(self.name(), 0)
        }
    }

    #[test]
    fn test_greedy_fallback_on_solver_error() {
        let engine = five_by_five().with_pipeline(PenaltyPipeline::new().with_pass(PoisonPass));
        let result = engine.run(&neutral_policy(), "default").unwrap();

        assert_eq!(result.summary.solver, "greedy");
        assert_eq!(result.summary.filled_billets, 5);
        assert_eq!(result.summary.notes.len(), 1);
        assert!(result.summary.notes[0].contains("greedy"));
    }

    #[test]
    fn test_missing_readiness_records_counted() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let readiness = ReadinessContext::new(ReadinessProfile::new("basic"), as_of)
            .with_record(ReadinessRecord::new(1));
        let engine = five_by_five()
            .with_pipeline(PenaltyPipeline::new().with_pass(ReadinessPass))
            .with_readiness(readiness);

        let result = engine.run(&neutral_policy(), "default").unwrap();
        assert_eq!(result.summary.omissions, 4);
        assert_eq!(result.summary.notes.len(), 1);
        assert!(result.summary.notes[0].starts_with("readiness"));
        assert!((result.summary.fill_rate - 1.0).abs() < 1e-10);
    }
}
