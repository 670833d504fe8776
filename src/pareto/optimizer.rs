//! Policy-space exploration.

use std::collections::BTreeMap;
use std::thread;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::AssignmentEngine;
use crate::error::Result;
use crate::models::PolicySet;

use super::{
    compare, pareto_frontier, recommend_balanced, recommend_weighted, BalancedRecommendation,
    ObjectiveWeights, ParameterGrid, ParetoSolution, SolutionComparison,
};

/// Exploration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParetoConfig {
    /// Cap on evaluated combinations; larger grids are subsampled.
    pub max_solutions: usize,
    /// Worker threads evaluating combinations.
    pub workers: usize,
    /// Seed for subsampling.
    pub seed: u64,
}

impl Default for ParetoConfig {
    fn default() -> Self {
        Self {
            max_solutions: 50,
            workers: thread::available_parallelism().map_or(4, |n| n.get()),
            seed: 42,
        }
    }
}

impl ParetoConfig {
    pub fn with_max_solutions(mut self, max_solutions: usize) -> Self {
        self.max_solutions = max_solutions;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Multi-objective explorer over a policy parameter grid.
///
/// Each sampled combination is applied on top of a base policy and run
/// through the engine once. Samples are independent and are evaluated
/// concurrently on scoped threads; solution ids follow the sample order,
/// not completion order.
///
/// # Example
///
/// ```
/// use u_manning::engine::AssignmentEngine;
/// use u_manning::models::policy::keys;
/// use u_manning::models::{Billet, PolicySet, Soldier};
/// use u_manning::pareto::{ParameterGrid, ParetoConfig, ParetoOptimizer};
///
/// let engine = AssignmentEngine::new(
///     vec![Soldier::new(1, "JBLM", 4, "11B"), Soldier::new(2, "FBNC", 4, "11B")],
///     vec![Billet::new(101, "JBLM", "11B")],
/// );
/// let grid = ParameterGrid::new().with(keys::TRANSFER_COST_WEIGHT, vec![0.5, 1.0, 2.0]);
///
/// let mut optimizer = ParetoOptimizer::new(ParetoConfig::default().with_workers(2));
/// optimizer.explore(&engine, &PolicySet::default(), "default", &grid).unwrap();
///
/// assert_eq!(optimizer.solutions().len(), 3);
/// assert!(!optimizer.frontier().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParetoOptimizer {
    config: ParetoConfig,
    solutions: Vec<ParetoSolution>,
}

impl ParetoOptimizer {
    pub fn new(config: ParetoConfig) -> Self {
        Self {
            config,
            solutions: Vec::new(),
        }
    }

    pub fn config(&self) -> &ParetoConfig {
        &self.config
    }

    /// Evaluated solutions in id order.
    pub fn solutions(&self) -> &[ParetoSolution] {
        &self.solutions
    }

    pub fn solution(&self, id: usize) -> Option<&ParetoSolution> {
        self.solutions.iter().find(|s| s.solution_id == id)
    }

    /// Evaluates the grid, replacing any earlier solutions.
    ///
    /// # Errors
    /// Grid validation errors, or the first error any run reports.
    pub fn explore(
        &mut self,
        engine: &AssignmentEngine,
        base: &PolicySet,
        mission: &str,
        grid: &ParameterGrid,
    ) -> Result<&[ParetoSolution]> {
        grid.validate()?;
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let combos = grid.sample(self.config.max_solutions, &mut rng);
        info!(
            parameters = ?grid.keys(),
            grid_size = grid.len(),
            sampled = combos.len(),
            "exploring policy space"
        );

        let workers = self.config.workers.max(1);
        let chunk = combos.len().div_ceil(workers).max(1);

        let batches: Vec<Vec<Result<ParetoSolution>>> = thread::scope(|scope| {
            let handles: Vec<_> = combos
                .chunks(chunk)
                .enumerate()
                .map(|(w, part)| {
                    let offset = w * chunk;
                    scope.spawn(move || {
                        let out: Vec<_> = part
                            .iter()
                            .enumerate()
                            .map(|(k, params)| evaluate(engine, base, mission, offset + k, params))
                            .collect();
                        debug!(worker = w, evaluated = out.len(), "pareto batch done");
                        out
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });

        self.solutions = batches
            .into_iter()
            .flatten()
            .collect::<Result<Vec<_>>>()?;

        info!(
            solutions = self.solutions.len(),
            frontier = self.frontier().len(),
            "policy space explored"
        );
        Ok(&self.solutions)
    }

    /// Non-dominated solutions.
    pub fn frontier(&self) -> Vec<&ParetoSolution> {
        pareto_frontier(&self.solutions)
    }

    /// Frontier solution closest to the ideal point.
    pub fn recommend_balanced(&self) -> Option<BalancedRecommendation<'_>> {
        recommend_balanced(&self.frontier())
    }

    /// Frontier solution with the highest weighted score.
    pub fn recommend_weighted(&self, weights: &ObjectiveWeights) -> Option<&ParetoSolution> {
        recommend_weighted(&self.frontier(), weights)
    }

    /// Compares two solutions by id.
    pub fn compare(&self, a: usize, b: usize) -> Option<SolutionComparison> {
        Some(compare(self.solution(a)?, self.solution(b)?))
    }
}

fn evaluate(
    engine: &AssignmentEngine,
    base: &PolicySet,
    mission: &str,
    id: usize,
    params: &BTreeMap<String, f64>,
) -> Result<ParetoSolution> {
    let mut policy = base.clone();
    policy.apply(params);
    let result = engine.run(&policy, mission)?;
    Ok(ParetoSolution::new(id, params.clone(), policy, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::TransferCostTable;
    use crate::error::EngineError;
    use crate::models::policy::keys;
    use crate::models::{Billet, Soldier};

    fn engine() -> AssignmentEngine {
        let soldiers = vec![
            Soldier::new(1, "JBLM", 4, "11B").with_unit("WAAA01"),
            Soldier::new(2, "FBNC", 4, "11B").with_unit("WBBB01"),
            Soldier::new(3, "FBNC", 4, "68W").with_unit("WBBB01"),
        ];
        let billets = vec![
            Billet::new(101, "JBLM", "11B").with_capability("rifle team", true),
            Billet::new(102, "JBLM", "68W").with_capability("rifle team", true),
        ];
        AssignmentEngine::new(soldiers, billets).with_transfer_table(TransferCostTable::conus())
    }

    #[test]
    fn test_ids_follow_sample_order() {
        let grid = ParameterGrid::new()
            .with(keys::MOS_MISMATCH, vec![1000.0, 3000.0])
            .with(keys::TRANSFER_COST_WEIGHT, vec![0.5, 1.0, 2.0]);
        let mut opt = ParetoOptimizer::new(ParetoConfig::default().with_workers(3));
        opt.explore(&engine(), &PolicySet::default(), "default", &grid)
            .unwrap();

        assert_eq!(opt.solutions().len(), 6);
        for (i, s) in opt.solutions().iter().enumerate() {
            assert_eq!(s.solution_id, i);
            assert_eq!(s.parameters, grid.combination(i).unwrap());
            assert!((s.policy.get(keys::MOS_MISMATCH) - s.parameters[keys::MOS_MISMATCH]).abs() < 1e-10);
        }
    }

    #[test]
    fn test_parallel_matches_serial() {
        let grid = ParameterGrid::new().with(keys::TRANSFER_COST_WEIGHT, vec![0.1, 0.5, 1.0, 4.0]);
        let mut serial = ParetoOptimizer::new(ParetoConfig::default().with_workers(1));
        let mut parallel = ParetoOptimizer::new(ParetoConfig::default().with_workers(4));
        serial
            .explore(&engine(), &PolicySet::default(), "default", &grid)
            .unwrap();
        parallel
            .explore(&engine(), &PolicySet::default(), "default", &grid)
            .unwrap();
        assert_eq!(serial.solutions(), parallel.solutions());
    }

    #[test]
    fn test_subsampled_grid() {
        let grid = ParameterGrid::new()
            .with(keys::MOS_MISMATCH, vec![1000.0, 2000.0, 3000.0, 4000.0])
            .with(keys::TRANSFER_COST_WEIGHT, vec![0.5, 1.0, 1.5, 2.0]);
        let mut opt = ParetoOptimizer::new(ParetoConfig::default().with_max_solutions(5));
        opt.explore(&engine(), &PolicySet::default(), "default", &grid)
            .unwrap();
        assert_eq!(opt.solutions().len(), 5);
    }

    #[test]
    fn test_objectives_from_units() {
        let grid = ParameterGrid::new().with(keys::MOS_MISMATCH, vec![3000.0]);
        let mut opt = ParetoOptimizer::new(ParetoConfig::default());
        opt.explore(&engine(), &PolicySet::default(), "default", &grid)
            .unwrap();
        let s = &opt.solutions()[0];
        // soldier 1 (WAAA01) on 11B, soldier 3 (WBBB01) on 68W
        assert!((s.fill_rate() - 1.0).abs() < 1e-10);
        assert_eq!(s.cohesion_score(), 0.0);
        assert!((s.cross_leveling_score() - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_recommendations_and_compare() {
        let grid = ParameterGrid::new().with(keys::SAME_LOCATION_BONUS, vec![-500.0, -200.0, 0.0]);
        let mut opt = ParetoOptimizer::new(ParetoConfig::default());
        opt.explore(&engine(), &PolicySet::default(), "default", &grid)
            .unwrap();

        // Larger bonus strictly lowers cost with the same matching.
        let frontier = opt.frontier();
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier[0].solution_id, 0);

        let rec = opt.recommend_balanced().unwrap();
        assert_eq!(rec.solution.solution_id, 0);
        assert!(rec.degenerate);

        let w = opt
            .recommend_weighted(&ObjectiveWeights::new(0.5, 0.5, 0.0, 0.0))
            .unwrap();
        assert_eq!(w.solution_id, 0);

        let c = opt.compare(0, 2).unwrap();
        assert!(c.total_cost.delta > 0.0);
        assert!(opt.compare(0, 99).is_none());
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let grid = ParameterGrid::new().with("morale", vec![1.0]);
        let mut opt = ParetoOptimizer::default();
        let err = opt
            .explore(&engine(), &PolicySet::default(), "default", &grid)
            .unwrap_err();
        assert!(matches!(err, EngineError::Config { .. }));
    }
}
