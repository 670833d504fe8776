//! Run summary metrics.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total cost | Sum of realized pair costs |
//! | Fill rate | Distinct billets filled / billets in the pool |
//! | Filled by priority | Distinct billets filled per priority tier |
//! | Filled by location | Distinct billets filled per billet location |
//!
//! Every matched pair counts as a fill, whatever its cost.

use std::collections::{BTreeMap, HashSet};

use crate::models::{AssignmentRow, AssignmentSummary};

/// Computes the fill and cost aggregates of a set of output rows.
///
/// # Arguments
/// * `mission` - Mission profile name recorded in the summary.
/// * `rows` - Matched pairs.
/// * `total_billets` - Size of the demand pool.
///
/// Solver name, omissions and notes are left empty for the caller.
pub fn summarize(mission: &str, rows: &[AssignmentRow], total_billets: usize) -> AssignmentSummary {
    let mut seen = HashSet::new();
    let mut by_priority: BTreeMap<u8, usize> = BTreeMap::new();
    let mut by_location: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_cost = 0.0;

    for row in rows {
        total_cost += row.cost;
        if seen.insert(row.billet.id) {
            *by_priority.entry(row.billet.priority.tier()).or_insert(0) += 1;
            *by_location.entry(row.billet.location.clone()).or_insert(0) += 1;
        }
    }

    let filled = seen.len();
    let fill_rate = if total_billets > 0 {
        filled as f64 / total_billets as f64
    } else {
        0.0
    };

    AssignmentSummary {
        mission: mission.to_string(),
        total_cost,
        fill_rate,
        filled_billets: filled,
        total_billets,
        filled_by_priority: by_priority,
        filled_by_location: by_location,
        ..AssignmentSummary::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Billet, Priority, Soldier};

    fn row(soldier: u32, billet: Billet, cost: f64) -> AssignmentRow {
        AssignmentRow {
            soldier: Soldier::new(soldier, "JBLM", 4, "11B"),
            billet,
            cost,
        }
    }

    #[test]
    fn test_breakdowns() {
        let rows = vec![
            row(1, Billet::new(101, "JBLM", "11B").with_priority(Priority::High), -200.0),
            row(2, Billet::new(102, "JBER", "11B"), 1500.0),
            row(3, Billet::new(103, "JBER", "11B").with_priority(Priority::High), 300.0),
        ];
        let s = summarize("pacific", &rows, 4);

        assert_eq!(s.mission, "pacific");
        assert_eq!(s.filled_billets, 3);
        assert_eq!(s.total_billets, 4);
        assert!((s.fill_rate - 0.75).abs() < 1e-10);
        assert!((s.total_cost - 1600.0).abs() < 1e-10);
        assert_eq!(s.filled_by_priority[&3], 2);
        assert_eq!(s.filled_by_priority[&2], 1);
        assert_eq!(s.filled_by_location["JBER"], 2);
        assert!(s.solver.is_empty());
    }

    #[test]
    fn test_no_billets() {
        let s = summarize("default", &[], 0);
        assert_eq!(s.fill_rate, 0.0);
        assert_eq!(s.total_cost, 0.0);
        assert!(s.filled_by_priority.is_empty());
    }
}
