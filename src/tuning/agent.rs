//! Iterative policy tuning loop.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::AssignmentEngine;
use crate::error::Result;
use crate::models::{AssignmentResult, PolicySet};

use super::{AgentState, AgentStatus, IterationRecord, Observation, SimpleHeuristic, TuningStrategy};

/// Tuning run parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuningConfig {
    /// Fill rate the strategy aims for.
    pub target_fill: f64,
    /// Cost budget the strategy aims to stay under.
    pub max_cost: f64,
    pub max_iters: usize,
    /// Probability of jittering one random parameter per iteration.
    pub explore_prob: f64,
    /// Multiplicative jitter bounds (inclusive).
    pub jitter_min: f64,
    pub jitter_max: f64,
    /// Converged when fill moves by less than this between iterations...
    pub tol_fill: f64,
    /// ...and cost by less than this fraction of the previous cost.
    pub tol_cost_frac: f64,
    pub seed: u64,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            target_fill: 0.95,
            max_cost: 1e6,
            max_iters: 50,
            explore_prob: 0.10,
            jitter_min: 0.9,
            jitter_max: 1.1,
            tol_fill: 0.01,
            tol_cost_frac: 0.02,
            seed: 42,
        }
    }
}

impl TuningConfig {
    pub fn with_targets(mut self, target_fill: f64, max_cost: f64) -> Self {
        self.target_fill = target_fill;
        self.max_cost = max_cost;
        self
    }

    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_explore_prob(mut self, explore_prob: f64) -> Self {
        self.explore_prob = explore_prob;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Result of a tuning run.
#[derive(Debug, Clone)]
pub struct TuningOutcome {
    /// Best result seen: highest fill, then lowest cost.
    pub best: AssignmentResult,
    pub best_iteration: usize,
    /// Policy the best result ran under.
    pub best_policy: PolicySet,
    /// Policy after the last applied update.
    pub final_policy: PolicySet,
    pub status: AgentStatus,
    pub history: Vec<IterationRecord>,
    /// Fractional change of every tuned key.
    pub deltas: BTreeMap<String, f64>,
}

impl TuningOutcome {
    pub fn iterations(&self) -> usize {
        self.history.len()
    }
}

/// After-action summary of a tuning run.
#[derive(Debug, Clone, PartialEq)]
pub struct Reflection {
    pub iterations: usize,
    pub fill_rate: f64,
    pub total_cost: f64,
    pub recommendation: Option<&'static str>,
}

/// Fill below which the reflection recommends loosening penalties.
pub const REFLECTION_FILL_FLOOR: f64 = 0.9;

/// Policy tuning agent.
///
/// Each iteration runs the engine once, records the observation, asks the
/// strategy for updates, optionally jitters one random parameter and
/// applies everything. Randomness comes from a seeded [`StdRng`] owned by
/// the agent, so runs with the same seed are reproducible.
///
/// # Example
///
/// ```
/// use u_manning::cost::TransferCostTable;
/// use u_manning::engine::AssignmentEngine;
/// use u_manning::models::{Billet, PolicySet, Soldier};
/// use u_manning::tuning::{AgentStatus, TuningAgent, TuningConfig};
///
/// let engine = AssignmentEngine::new(
///     vec![Soldier::new(1, "JBLM", 4, "11B")],
///     vec![Billet::new(101, "JBLM", "11B")],
/// )
/// .with_transfer_table(TransferCostTable::free());
///
/// let mut agent = TuningAgent::new(TuningConfig::default().with_explore_prob(0.0));
/// let outcome = agent.run(&engine, PolicySet::default(), "default").unwrap();
///
/// assert_eq!(outcome.status, AgentStatus::Converged);
/// assert_eq!(outcome.best.summary.fill_rate, 1.0);
/// ```
#[derive(Debug)]
pub struct TuningAgent {
    config: TuningConfig,
    strategy: Box<dyn TuningStrategy>,
    rng: StdRng,
    state: AgentState,
    status: AgentStatus,
}

impl TuningAgent {
    /// Creates an agent using [`SimpleHeuristic`].
    pub fn new(config: TuningConfig) -> Self {
        Self::with_strategy(config, SimpleHeuristic::default())
    }

    pub fn with_strategy<S: TuningStrategy + 'static>(config: TuningConfig, strategy: S) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            strategy: Box::new(strategy),
            state: AgentState::default(),
            status: AgentStatus::default(),
        }
    }

    pub fn config(&self) -> &TuningConfig {
        &self.config
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    /// Runs the tuning loop.
    pub fn run(
        &mut self,
        engine: &AssignmentEngine,
        policy: PolicySet,
        mission: &str,
    ) -> Result<TuningOutcome> {
        self.run_with_progress(engine, policy, mission, |_, _, _| {})
    }

    /// Runs the tuning loop, calling `progress(fraction, fill, cost)` after
    /// every iteration that applied updates.
    pub fn run_with_progress<F>(
        &mut self,
        engine: &AssignmentEngine,
        mut policy: PolicySet,
        mission: &str,
        mut progress: F,
    ) -> Result<TuningOutcome>
    where
        F: FnMut(f64, f64, f64),
    {
        self.state = AgentState::default();
        self.status = AgentStatus::Running;
        self.strategy
            .align_goals(self.config.target_fill, self.config.max_cost);
        info!(
            strategy = self.strategy.name(),
            mission,
            max_iters = self.config.max_iters,
            "tuning run started"
        );

        let mut best: Option<(AssignmentResult, usize, PolicySet)> = None;
        let mut last: Option<Observation> = None;

        for it in 0..self.config.max_iters {
            self.state.iteration = it;
            let result = engine.run(&policy, mission)?;
            let observed = Observation {
                fill_rate: result.summary.fill_rate,
                total_cost: result.summary.total_cost,
            };
            info!(
                iteration = it,
                fill_rate = observed.fill_rate,
                total_cost = observed.total_cost,
                "tuning iteration"
            );

            self.state.history.push(IterationRecord {
                iteration: it,
                fill_rate: observed.fill_rate,
                total_cost: observed.total_cost,
                policy: policy.clone(),
            });

            let improves = best.as_ref().map_or(true, |(b, _, _)| {
                observed.fill_rate > b.summary.fill_rate
                    || (observed.fill_rate == b.summary.fill_rate
                        && observed.total_cost < b.summary.total_cost)
            });
            if improves {
                best = Some((result, it, policy.clone()));
            }

            if last.is_some_and(|prev| self.has_converged(&observed, &prev)) {
                info!(iteration = it, "tuning converged on small deltas");
                self.status = AgentStatus::Converged;
                break;
            }

            let proposal = self.strategy.propose(&policy, &observed, &self.state);
            self.state.fill_rate = observed.fill_rate;
            self.state.total_cost = observed.total_cost;

            let mut updates = proposal.updates;
            if let Some((key, value)) = self.explore(&policy) {
                debug!(key = %key, value, "exploration jitter");
                updates.insert(key, value);
            }

            if updates.is_empty() {
                info!(iteration = it, "strategy proposed no changes");
                self.status = AgentStatus::Converged;
                break;
            }

            self.state.record_updates(&policy, &updates);
            let applied = policy.apply(&updates);
            debug!(iteration = it, applied, "policy updates applied");

            last = Some(observed);
            progress(
                it as f64 / self.config.max_iters as f64,
                observed.fill_rate,
                observed.total_cost,
            );

            if proposal.converged {
                info!(iteration = it, "strategy flagged convergence");
                self.state.converged = true;
                self.status = AgentStatus::Converged;
                break;
            }
        }

        if self.status == AgentStatus::Running {
            self.status = AgentStatus::Exhausted;
        }
        if self.status == AgentStatus::Converged {
            self.state.converged = true;
        }

        let deltas = self.state.policy_deltas(&policy);
        for (key, delta) in &deltas {
            info!(key = %key, delta, "policy change");
        }

        let (best, best_iteration, best_policy) =
            best.unwrap_or_else(|| (AssignmentResult::default(), 0, policy.clone()));
        Ok(TuningOutcome {
            best,
            best_iteration,
            best_policy,
            final_policy: policy,
            status: self.status,
            history: self.state.history.clone(),
            deltas,
        })
    }

    /// Whether fill and cost both moved less than the configured tolerances.
    pub fn has_converged(&self, current: &Observation, previous: &Observation) -> bool {
        (current.fill_rate - previous.fill_rate).abs() < self.config.tol_fill
            && (current.total_cost - previous.total_cost).abs()
                < self.config.tol_cost_frac * previous.total_cost.abs().max(1.0)
    }

    /// Picks one tunable key and jitters it, with probability `explore_prob`.
    fn explore(&mut self, policy: &PolicySet) -> Option<(String, f64)> {
        // NaN disables exploration
        let p = if self.config.explore_prob.is_finite() {
            self.config.explore_prob.clamp(0.0, 1.0)
        } else if self.config.explore_prob == f64::INFINITY {
            1.0
        } else {
            0.0
        };
        if !self.rng.random_bool(p) {
            return None;
        }
        let keys = policy.tunable_keys();
        if keys.is_empty() {
            return None;
        }
        let key = keys[self.rng.random_range(0..keys.len())];
        let lo = self.config.jitter_min.min(self.config.jitter_max);
        let hi = self.config.jitter_min.max(self.config.jitter_max);
        let jitter = self.rng.random_range(lo..=hi);
        Some((key.to_string(), policy.get(key) * jitter))
    }

    /// Summarizes the last iteration with a recommendation.
    pub fn reflect(&self) -> Option<Reflection> {
        let last = self.state.last()?;
        let recommendation = if last.fill_rate < REFLECTION_FILL_FLOOR {
            Some("loosen specialty-mismatch or dwell penalties")
        } else if last.total_cost > self.config.max_cost {
            Some("increase transfer cost weight or adjust priority scaling")
        } else {
            None
        };
        Some(Reflection {
            iterations: last.iteration + 1,
            fill_rate: last.fill_rate,
            total_cost: last.total_cost,
            recommendation,
        })
    }
}

/// Path of a mission's saved policy inside `dir`.
pub fn policy_path(dir: impl AsRef<Path>, mission: &str) -> PathBuf {
    dir.as_ref().join(format!("{mission}_policy.json"))
}

/// Saves a tuned policy for a mission, creating `dir` if needed.
pub fn save_policy(policy: &PolicySet, dir: impl AsRef<Path>, mission: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir.as_ref())?;
    let path = policy_path(dir, mission);
    policy.save(&path)?;
    Ok(path)
}

/// Loads a mission's saved policy, or returns `fallback` when none exists.
pub fn load_policy(dir: impl AsRef<Path>, mission: &str, fallback: PolicySet) -> Result<PolicySet> {
    let path = policy_path(dir, mission);
    if !path.exists() {
        debug!(path = %path.display(), "no saved policy");
        return Ok(fallback);
    }
    PolicySet::load(fallback.name, &path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::TransferCostTable;
    use crate::models::policy::keys;
    use crate::models::{Billet, Soldier};
    use crate::tuning::Proposal;

    fn engine() -> AssignmentEngine {
        let soldiers = (1..=4).map(|id| Soldier::new(id, "JBLM", 4, "11B")).collect();
        let billets = (101..=4 + 100).map(|id| Billet::new(id, "JBLM", "11B")).collect();
        AssignmentEngine::new(soldiers, billets).with_transfer_table(TransferCostTable::free())
    }

    fn quiet() -> TuningConfig {
        TuningConfig::default().with_explore_prob(0.0)
    }

    /// Moves the same-location bonus by a fixed step every iteration.
    #[derive(Debug)]
    struct Drift(f64);

    impl TuningStrategy for Drift {
        fn name(&self) -> &'static str {
            "drift"
        }

        fn propose(&mut self, policy: &PolicySet, _: &Observation, _: &AgentState) -> Proposal {
            let key = keys::SAME_LOCATION_BONUS;
            Proposal {
                updates: [(key.to_string(), policy.get(key) + self.0)].into(),
                converged: false,
            }
        }
    }

    #[derive(Debug)]
    struct Idle;

    impl TuningStrategy for Idle {
        fn name(&self) -> &'static str {
            "idle"
        }

        fn propose(&mut self, _: &PolicySet, _: &Observation, _: &AgentState) -> Proposal {
            Proposal::default()
        }
    }

    #[test]
    fn test_converges_on_stable_observations() {
        let mut agent = TuningAgent::new(quiet());
        let outcome = agent.run(&engine(), PolicySet::default(), "default").unwrap();

        assert_eq!(outcome.status, AgentStatus::Converged);
        assert_eq!(agent.status(), AgentStatus::Converged);
        assert_eq!(outcome.iterations(), 2);
        let last = outcome.history.last().unwrap();
        assert!((outcome.best.summary.fill_rate - last.fill_rate).abs() < 1e-10);
        assert!((outcome.best.summary.total_cost - last.total_cost).abs() < 1e-10);
        assert!(agent.state().converged);
    }

    #[test]
    fn test_exhausted_tracks_best() {
        // bonus -200 → -700 → -1200: each step lowers cost by 4 × 500 × 1.5
        let mut agent = TuningAgent::with_strategy(quiet().with_max_iters(3), Drift(-500.0));
        let outcome = agent.run(&engine(), PolicySet::default(), "default").unwrap();

        assert_eq!(outcome.status, AgentStatus::Exhausted);
        assert_eq!(outcome.iterations(), 3);
        assert_eq!(outcome.best_iteration, 2);
        assert!((outcome.best.summary.total_cost - (-7200.0)).abs() < 1e-10);
    }

    #[test]
    fn test_best_is_not_necessarily_last() {
        let mut agent = TuningAgent::with_strategy(quiet().with_max_iters(4), Drift(500.0));
        let outcome = agent.run(&engine(), PolicySet::default(), "default").unwrap();

        assert_eq!(outcome.best_iteration, 0);
        assert!((outcome.best_policy.get(keys::SAME_LOCATION_BONUS) - (-200.0)).abs() < 1e-10);
        assert!(outcome.history.last().unwrap().total_cost > outcome.best.summary.total_cost);
        // -200 → 1800 after four steps
        assert!((outcome.deltas[keys::SAME_LOCATION_BONUS] - (-10.0)).abs() < 1e-10);
    }

    #[test]
    fn test_nan_explore_prob_never_explores() {
        let config = quiet().with_max_iters(3).with_explore_prob(f64::NAN);
        let mut agent = TuningAgent::with_strategy(config, Drift(-500.0));
        let outcome = agent.run(&engine(), PolicySet::default(), "default").unwrap();

        assert_eq!(outcome.iterations(), 3);
        assert!((outcome.final_policy.get(keys::SAME_LOCATION_BONUS) - (-1700.0)).abs() < 1e-10);
        assert!((outcome.best.summary.total_cost - (-7200.0)).abs() < 1e-10);
    }

    #[test]
    fn test_empty_proposal_converges() {
        let mut agent = TuningAgent::with_strategy(quiet(), Idle);
        let outcome = agent.run(&engine(), PolicySet::default(), "default").unwrap();
        assert_eq!(outcome.status, AgentStatus::Converged);
        assert_eq!(outcome.iterations(), 1);
        assert!(outcome.deltas.is_empty());
    }

    #[test]
    fn test_jitter_is_reproducible() {
        let config = TuningConfig::default()
            .with_explore_prob(1.0)
            .with_max_iters(5)
            .with_seed(7);
        let run = || {
            let mut agent = TuningAgent::with_strategy(config, Idle);
            agent.run(&engine(), PolicySet::default(), "default").unwrap()
        };
        let a = run();
        let b = run();
        assert_eq!(a.final_policy, b.final_policy);
        assert_eq!(a.history, b.history);
        assert!(!a.deltas.is_empty());
    }

    #[test]
    fn test_progress_callback() {
        let mut calls = Vec::new();
        let mut agent = TuningAgent::with_strategy(quiet().with_max_iters(3), Drift(-500.0));
        agent
            .run_with_progress(&engine(), PolicySet::default(), "default", |frac, _, _| {
                calls.push(frac)
            })
            .unwrap();
        assert_eq!(calls.len(), 3);
        assert!((calls[1] - 1.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_reflection() {
        let mut agent = TuningAgent::new(quiet().with_targets(0.95, -1e9));
        assert!(agent.reflect().is_none());
        agent.run(&engine(), PolicySet::default(), "default").unwrap();
        let r = agent.reflect().unwrap();
        assert_eq!(r.fill_rate, 1.0);
        assert!(r.recommendation.unwrap().contains("transfer"));
    }

    #[test]
    fn test_policy_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let tuned = PolicySet::new("pacific").with(keys::MOS_MISMATCH, 1234.0);
        let path = save_policy(&tuned, dir.path().join("policies"), "pacific").unwrap();
        assert!(path.ends_with("pacific_policy.json"));

        let loaded =
            load_policy(dir.path().join("policies"), "pacific", PolicySet::new("pacific")).unwrap();
        assert!((loaded.get(keys::MOS_MISMATCH) - 1234.0).abs() < 1e-10);

        let missing = load_policy(dir.path(), "arctic", PolicySet::new("arctic")).unwrap();
        assert_eq!(missing, PolicySet::new("arctic"));
    }
}
