//! Assignment (solution) model.
//!
//! An assignment is a partial one-to-one matching of soldiers to billets.
//! Output rows carry both full input records plus the realized cost; the
//! summary aggregates fill and cost.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Billet, BilletId, Soldier, SoldierId};

/// A matched soldier/billet pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned soldier.
    pub soldier_id: SoldierId,
    /// Filled billet.
    pub billet_id: BilletId,
    /// Realized cost from the final cost matrix.
    pub cost: f64,
}

/// One output row: both input records plus the realized cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRow {
    /// Soldier record (pass-through attributes included).
    pub soldier: Soldier,
    /// Billet record (pass-through attributes included).
    pub billet: Billet,
    /// Realized cost.
    pub cost: f64,
}

impl AssignmentRow {
    /// The compact (soldier, billet, cost) triple.
    pub fn assignment(&self) -> Assignment {
        Assignment {
            soldier_id: self.soldier.id,
            billet_id: self.billet.id,
            cost: self.cost,
        }
    }
}

/// Run summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    /// Mission profile used.
    pub mission: String,
    /// Sum of matched costs.
    pub total_cost: f64,
    /// Distinct billets filled / total billets (0.0 when no billets).
    pub fill_rate: f64,
    /// Distinct billets filled.
    pub filled_billets: usize,
    /// Billets in the demand pool.
    pub total_billets: usize,
    /// Filled billets by priority tier.
    pub filled_by_priority: BTreeMap<u8, usize>,
    /// Filled billets by billet location.
    pub filled_by_location: BTreeMap<String, usize>,
    /// Solver that produced the matching.
    pub solver: String,
    /// Data-quality omissions counted by the penalty passes.
    pub omissions: usize,
    /// Informational notes (skipped passes, solver fallback).
    pub notes: Vec<String>,
}

/// Result of one pipeline invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentResult {
    /// Output rows, sorted by ascending cost.
    pub rows: Vec<AssignmentRow>,
    /// Aggregate summary.
    pub summary: AssignmentSummary,
}

impl AssignmentResult {
    /// Compact matching.
    pub fn assignments(&self) -> Vec<Assignment> {
        self.rows.iter().map(AssignmentRow::assignment).collect()
    }

    /// Finds the row for a soldier.
    pub fn row_for_soldier(&self, soldier_id: SoldierId) -> Option<&AssignmentRow> {
        self.rows.iter().find(|r| r.soldier.id == soldier_id)
    }

    /// Finds the row for a billet.
    pub fn row_for_billet(&self, billet_id: BilletId) -> Option<&AssignmentRow> {
        self.rows.iter().find(|r| r.billet.id == billet_id)
    }

    /// Number of matched pairs.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing was matched.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
