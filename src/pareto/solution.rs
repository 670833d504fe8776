//! Pareto solutions and their objectives.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{AssignmentResult, PolicySet};

/// Score used when the result carries no unit or capability data.
pub const NEUTRAL_SCORE: f64 = 50.0;
/// Unit count at which cross-leveling complexity saturates.
pub const CROSS_LEVELING_SATURATION: f64 = 10.0;

/// The four objective values of one solution.
///
/// | Objective | Range | Direction |
/// |-----------|-------|-----------|
/// | `fill_rate` | 0..1 | maximize |
/// | `total_cost` | any | minimize |
/// | `cohesion` | 0..100 | maximize |
/// | `cross_leveling` | 0..100 | minimize |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Objectives {
    pub fill_rate: f64,
    pub total_cost: f64,
    pub cohesion: f64,
    pub cross_leveling: f64,
}

impl Objectives {
    /// Computes all four objectives from a run result.
    pub fn from_result(result: &AssignmentResult) -> Self {
        Self {
            fill_rate: result.summary.fill_rate,
            total_cost: result.summary.total_cost,
            cohesion: cohesion_score(result),
            cross_leveling: cross_leveling_score(result),
        }
    }

    /// Whether `self` is at least as good on every objective and strictly
    /// better on one.
    pub fn dominates(&self, other: &Objectives) -> bool {
        let no_worse = self.fill_rate >= other.fill_rate
            && self.total_cost <= other.total_cost
            && self.cohesion >= other.cohesion
            && self.cross_leveling <= other.cross_leveling;
        let better = self.fill_rate > other.fill_rate
            || self.total_cost < other.total_cost
            || self.cohesion > other.cohesion
            || self.cross_leveling < other.cross_leveling;
        no_worse && better
    }
}

/// Percentage of filled capabilities sourced from a single unit.
///
/// Returns [`NEUTRAL_SCORE`] when no row carries a unit or no row carries a
/// capability. Rows without a unit are not counted as a source; a capability
/// whose rows all lack a unit is not single-sourced.
pub fn cohesion_score(result: &AssignmentResult) -> f64 {
    let has_units = result.rows.iter().any(|r| r.soldier.unit.is_some());
    let has_capabilities = result.rows.iter().any(|r| r.billet.capability.is_some());
    if !has_units || !has_capabilities {
        return NEUTRAL_SCORE;
    }

    let mut sources: HashMap<&str, HashSet<&str>> = HashMap::new();
    for row in &result.rows {
        if let Some(cap) = row.billet.capability.as_deref() {
            let units = sources.entry(cap).or_default();
            if let Some(unit) = row.soldier.unit.as_deref() {
                units.insert(unit);
            }
        }
    }

    let intact = sources.values().filter(|units| units.len() == 1).count();
    intact as f64 / sources.len() as f64 * 100.0
}

/// Cross-leveling complexity: distinct source units, saturating at
/// [`CROSS_LEVELING_SATURATION`] units (100).
///
/// Returns [`NEUTRAL_SCORE`] when no row carries a unit.
pub fn cross_leveling_score(result: &AssignmentResult) -> f64 {
    let units: HashSet<&str> = result
        .rows
        .iter()
        .filter_map(|r| r.soldier.unit.as_deref())
        .collect();
    if units.is_empty() {
        return NEUTRAL_SCORE;
    }
    (units.len() as f64 / CROSS_LEVELING_SATURATION * 100.0).min(100.0)
}

/// One evaluated policy combination.
#[derive(Debug, Clone, PartialEq)]
pub struct ParetoSolution {
    /// Index of the combination in the evaluated sample.
    pub solution_id: usize,
    pub objectives: Objectives,
    /// Grid values applied on top of the base policy.
    pub parameters: BTreeMap<String, f64>,
    /// Full policy the run used.
    pub policy: PolicySet,
    pub result: AssignmentResult,
}

impl ParetoSolution {
    pub fn new(
        solution_id: usize,
        parameters: BTreeMap<String, f64>,
        policy: PolicySet,
        result: AssignmentResult,
    ) -> Self {
        Self {
            solution_id,
            objectives: Objectives::from_result(&result),
            parameters,
            policy,
            result,
        }
    }

    pub fn fill_rate(&self) -> f64 {
        self.objectives.fill_rate
    }

    pub fn total_cost(&self) -> f64 {
        self.objectives.total_cost
    }

    pub fn cohesion_score(&self) -> f64 {
        self.objectives.cohesion
    }

    pub fn cross_leveling_score(&self) -> f64 {
        self.objectives.cross_leveling
    }

    pub fn dominates(&self, other: &ParetoSolution) -> bool {
        self.objectives.dominates(&other.objectives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignmentRow, Billet, Soldier};

    fn obj(fill_rate: f64, total_cost: f64, cohesion: f64, cross_leveling: f64) -> Objectives {
        Objectives {
            fill_rate,
            total_cost,
            cohesion,
            cross_leveling,
        }
    }

    fn row(soldier: u32, unit: Option<&str>, billet: u32, capability: Option<&str>) -> AssignmentRow {
        let mut s = Soldier::new(soldier, "JBLM", 4, "11B");
        if let Some(u) = unit {
            s = s.with_unit(u);
        }
        let mut b = Billet::new(billet, "JBLM", "11B");
        if let Some(c) = capability {
            b = b.with_capability(c, true);
        }
        AssignmentRow {
            soldier: s,
            billet: b,
            cost: 0.0,
        }
    }

    #[test]
    fn test_dominance_is_strict() {
        let a = obj(0.9, 1000.0, 60.0, 20.0);
        let b = obj(0.8, 1200.0, 60.0, 30.0);
        assert!(a.dominates(&b));
        assert!(!b.dominates(&a));
        assert!(!a.dominates(&a));
    }

    #[test]
    fn test_trade_off_is_not_dominance() {
        let cheap = obj(0.8, 500.0, 50.0, 50.0);
        let full = obj(1.0, 900.0, 50.0, 50.0);
        assert!(!cheap.dominates(&full));
        assert!(!full.dominates(&cheap));
    }

    #[test]
    fn test_dominance_partial_order_on_grid() {
        let values = [0.0, 1.0];
        let mut all = Vec::new();
        for &f in &values {
            for &c in &values {
                for &h in &values {
                    for &x in &values {
                        all.push(obj(f, c, h, x));
                    }
                }
            }
        }
        for a in &all {
            assert!(!a.dominates(a));
            for b in &all {
                if a.dominates(b) {
                    assert!(!b.dominates(a));
                    for c in &all {
                        if b.dominates(c) {
                            assert!(a.dominates(c));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_cohesion_score() {
        let result = AssignmentResult {
            rows: vec![
                row(1, Some("A"), 1, Some("mortar")),
                row(2, Some("A"), 2, Some("mortar")),
                row(3, Some("A"), 3, Some("medic")),
                row(4, Some("B"), 4, Some("medic")),
                row(5, Some("C"), 5, None),
            ],
            ..AssignmentResult::default()
        };
        assert!((cohesion_score(&result) - 50.0).abs() < 1e-10);
        assert!((cross_leveling_score(&result) - 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_cohesion_ignores_rows_without_unit() {
        let result = AssignmentResult {
            rows: vec![
                row(1, Some("A"), 1, Some("mortar")),
                row(2, None, 2, Some("mortar")),
                row(3, None, 3, Some("medic")),
            ],
            ..AssignmentResult::default()
        };
        // mortar is single-sourced from A; medic has no known source
        assert!((cohesion_score(&result) - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_neutral_without_unit_data() {
        let result = AssignmentResult {
            rows: vec![row(1, None, 1, Some("mortar"))],
            ..AssignmentResult::default()
        };
        assert_eq!(cohesion_score(&result), NEUTRAL_SCORE);
        assert_eq!(cross_leveling_score(&result), NEUTRAL_SCORE);
        assert_eq!(cohesion_score(&AssignmentResult::default()), NEUTRAL_SCORE);
    }

    #[test]
    fn test_cross_leveling_saturates() {
        let rows = (0..12)
            .map(|i| row(i, Some(&format!("U{i}")), i, None))
            .collect();
        let result = AssignmentResult {
            rows,
            ..AssignmentResult::default()
        };
        assert_eq!(cross_leveling_score(&result), 100.0);
    }
}
