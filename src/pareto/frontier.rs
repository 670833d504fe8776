//! Frontier extraction, recommendation and comparison.

use serde::{Deserialize, Serialize};

use super::{Objectives, ParetoSolution};

/// Relative tolerance under which two objective values count as equal.
const TIE_EPS: f64 = 1e-9;

fn same(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIE_EPS * a.abs().max(b.abs()).max(1.0)
}

fn same_objectives(a: &Objectives, b: &Objectives) -> bool {
    same(a.fill_rate, b.fill_rate)
        && same(a.total_cost, b.total_cost)
        && same(a.cohesion, b.cohesion)
        && same(a.cross_leveling, b.cross_leveling)
}

/// Non-dominated solutions, in input order.
///
/// # Complexity
/// O(n²) pairwise dominance checks.
pub fn pareto_frontier(solutions: &[ParetoSolution]) -> Vec<&ParetoSolution> {
    solutions
        .iter()
        .filter(|s| !solutions.iter().any(|other| other.dominates(s)))
        .collect()
}

/// Balanced pick from a frontier.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancedRecommendation<'a> {
    pub solution: &'a ParetoSolution,
    /// Euclidean distance to the ideal point in normalized objective space.
    pub distance: f64,
    /// Every frontier member has the same objective tuple.
    pub degenerate: bool,
    /// Distinct objective tuples on the frontier.
    pub effective_choices: usize,
    pub frontier_size: usize,
}

/// Normalizes each objective to [0, 1] across `frontier` (1 = best) and
/// returns the solution closest to the ideal point (1, 1, 1, 1).
///
/// An objective with zero spread normalizes to 1 for every solution. When
/// all solutions share one objective tuple the result is flagged
/// `degenerate` with a single effective choice. Ties go to the earliest
/// solution.
pub fn recommend_balanced<'a>(frontier: &[&'a ParetoSolution]) -> Option<BalancedRecommendation<'a>> {
    let first = frontier.first()?;

    let range = |f: fn(&Objectives) -> f64| {
        frontier.iter().map(|s| f(&s.objectives)).fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), v| (lo.min(v), hi.max(v)),
        )
    };
    let fill = range(|o| o.fill_rate);
    let cost = range(|o| o.total_cost);
    let cohesion = range(|o| o.cohesion);
    let cross = range(|o| o.cross_leveling);

    let higher = |v: f64, (lo, hi): (f64, f64)| if same(lo, hi) { 1.0 } else { (v - lo) / (hi - lo) };
    let lower = |v: f64, (lo, hi): (f64, f64)| if same(lo, hi) { 1.0 } else { (hi - v) / (hi - lo) };

    let mut best = (*first, f64::INFINITY);
    for &s in frontier {
        let o = &s.objectives;
        let d = [
            higher(o.fill_rate, fill),
            lower(o.total_cost, cost),
            higher(o.cohesion, cohesion),
            lower(o.cross_leveling, cross),
        ]
        .iter()
        .map(|x| (1.0 - x).powi(2))
        .sum::<f64>()
        .sqrt();
        if d < best.1 {
            best = (s, d);
        }
    }

    let mut distinct: Vec<&Objectives> = Vec::new();
    for s in frontier {
        if !distinct.iter().any(|o| same_objectives(o, &s.objectives)) {
            distinct.push(&s.objectives);
        }
    }

    Some(BalancedRecommendation {
        solution: best.0,
        distance: best.1,
        degenerate: distinct.len() == 1,
        effective_choices: distinct.len(),
        frontier_size: frontier.len(),
    })
}

/// User priorities over the four objectives. Only relative size matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    pub fill_rate: f64,
    pub total_cost: f64,
    pub cohesion: f64,
    pub cross_leveling: f64,
}

impl ObjectiveWeights {
    pub fn new(fill_rate: f64, total_cost: f64, cohesion: f64, cross_leveling: f64) -> Self {
        Self {
            fill_rate,
            total_cost,
            cohesion,
            cross_leveling,
        }
    }

    fn total(&self) -> f64 {
        self.fill_rate + self.total_cost + self.cohesion + self.cross_leveling
    }
}

/// Highest weighted score across `solutions`.
///
/// | Objective | Normalized score |
/// |-----------|------------------|
/// | fill rate | as is |
/// | cost | 1 − min-max position, 0.5 when all equal |
/// | cohesion | score / 100 |
/// | cross-leveling | 1 − min-max position, 0.5 when all equal |
///
/// Returns `None` for an empty slice or non-positive total weight.
pub fn recommend_weighted<'a>(
    solutions: &[&'a ParetoSolution],
    weights: &ObjectiveWeights,
) -> Option<&'a ParetoSolution> {
    let total = weights.total();
    if solutions.is_empty() || total <= 0.0 || !total.is_finite() {
        return None;
    }

    let bounds = |f: fn(&Objectives) -> f64| {
        solutions.iter().map(|s| f(&s.objectives)).fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), v| (lo.min(v), hi.max(v)),
        )
    };
    let (cost_lo, cost_hi) = bounds(|o| o.total_cost);
    let (cross_lo, cross_hi) = bounds(|o| o.cross_leveling);
    let inverted = |v: f64, lo: f64, hi: f64| if hi > lo { 1.0 - (v - lo) / (hi - lo) } else { 0.5 };

    let mut best: Option<(&ParetoSolution, f64)> = None;
    for &s in solutions {
        let o = &s.objectives;
        let score = (o.fill_rate * weights.fill_rate
            + inverted(o.total_cost, cost_lo, cost_hi) * weights.total_cost
            + o.cohesion / 100.0 * weights.cohesion
            + inverted(o.cross_leveling, cross_lo, cross_hi) * weights.cross_leveling)
            / total;
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((s, score));
        }
    }
    best.map(|(s, _)| s)
}

/// Which side of a comparison is better on one objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    A,
    B,
    Tie,
}

/// One objective compared across two solutions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveDelta {
    pub a: f64,
    pub b: f64,
    /// `b - a`.
    pub delta: f64,
    pub winner: Winner,
}

impl ObjectiveDelta {
    fn new(a: f64, b: f64, maximize: bool) -> Self {
        let winner = if same(a, b) {
            Winner::Tie
        } else if (b > a) == maximize {
            Winner::B
        } else {
            Winner::A
        };
        Self {
            a,
            b,
            delta: b - a,
            winner,
        }
    }
}

/// Side-by-side comparison of two solutions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolutionComparison {
    pub a_id: usize,
    pub b_id: usize,
    pub fill_rate: ObjectiveDelta,
    pub total_cost: ObjectiveDelta,
    pub cohesion: ObjectiveDelta,
    pub cross_leveling: ObjectiveDelta,
}

pub fn compare(a: &ParetoSolution, b: &ParetoSolution) -> SolutionComparison {
    let (x, y) = (&a.objectives, &b.objectives);
    SolutionComparison {
        a_id: a.solution_id,
        b_id: b.solution_id,
        fill_rate: ObjectiveDelta::new(x.fill_rate, y.fill_rate, true),
        total_cost: ObjectiveDelta::new(x.total_cost, y.total_cost, false),
        cohesion: ObjectiveDelta::new(x.cohesion, y.cohesion, true),
        cross_leveling: ObjectiveDelta::new(x.cross_leveling, y.cross_leveling, false),
    }
}
