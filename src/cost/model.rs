//! Weighted pair-cost model.
//!
//! # Terms (accumulated in this order)
//!
//! | Term | Condition |
//! |------|-----------|
//! | rank band | soldier rank outside [min, max] |
//! | skill | soldier skill < billet minimum |
//! | clearance | soldier clearance < billet minimum |
//! | specialty | mismatch; ×1.5 at priority 3, ×0.8 at priority 1 |
//! | airborne | required but soldier not airborne |
//! | language | required and soldier does not speak it |
//! | availability | soldier available after billet start |
//! | deployability | soldier not deployable |
//! | transfer | weighted location-transfer cost |
//! | same location | bonus when no move is needed |
//! | dwell | dwell below threshold and a move is needed |
//! | mission bias | [`MissionProfile::adjustment`] |
//!
//! The sum is then multiplied by the billet's priority-tier weight.
//!
//! [`CostModel::build_matrix`] precomputes billet-side terms once per column
//! and runs the same per-cell arithmetic as [`CostModel::pair_cost`], so its
//! entries are bit-identical to the pairwise function.

use crate::models::policy::keys;
use crate::models::{Billet, MissionProfile, PolicySet, Priority, Soldier};

use super::{CostMatrix, TransferCostTable};

/// Specialty-mismatch multiplier at priority 3.
pub const HIGH_PRIORITY_MOS_FACTOR: f64 = 1.5;
/// Specialty-mismatch multiplier at priority 1.
pub const LOW_PRIORITY_MOS_FACTOR: f64 = 0.8;

/// Policy weights read once per build.
#[derive(Debug, Clone, Copy)]
struct Weights {
    min_dwell: f64,
    mos_mismatch: f64,
    rank_band: f64,
    skill_short: f64,
    clearance: f64,
    airborne: f64,
    language: f64,
    availability: f64,
    non_deployable: f64,
    same_location: f64,
    transfer_weight: f64,
    dwell_short: f64,
    priority_low: f64,
    priority_med: f64,
    priority_high: f64,
}

impl Weights {
    fn from_policy(p: &PolicySet) -> Self {
        Self {
            min_dwell: p.get(keys::MIN_DWELL_MONTHS),
            mos_mismatch: p.get(keys::MOS_MISMATCH),
            rank_band: p.get(keys::RANK_OUT_OF_BAND),
            skill_short: p.get(keys::SKILL_SHORT),
            clearance: p.get(keys::CLEARANCE_MISMATCH),
            airborne: p.get(keys::AIRBORNE_REQUIRED),
            language: p.get(keys::LANGUAGE_REQUIRED),
            availability: p.get(keys::AVAILABILITY_MISS),
            non_deployable: p.get(keys::NON_DEPLOYABLE),
            same_location: p.get(keys::SAME_LOCATION_BONUS),
            transfer_weight: p.get(keys::TRANSFER_COST_WEIGHT),
            dwell_short: p.get(keys::DWELL_SHORT),
            priority_low: p.get(keys::PRIORITY_WEIGHT_LOW),
            priority_med: p.get(keys::PRIORITY_WEIGHT_MED),
            priority_high: p.get(keys::PRIORITY_WEIGHT_HIGH),
        }
    }

    fn priority_weight(&self, p: Priority) -> f64 {
        match p {
            Priority::High => self.priority_high,
            Priority::Medium => self.priority_med,
            Priority::Low => self.priority_low,
        }
    }

    fn specialty_penalty(&self, p: Priority) -> f64 {
        match p {
            Priority::High => self.mos_mismatch * HIGH_PRIORITY_MOS_FACTOR,
            Priority::Low => self.mos_mismatch * LOW_PRIORITY_MOS_FACTOR,
            Priority::Medium => self.mos_mismatch,
        }
    }
}

/// Billet-side values shared by every cell of a column.
struct Column<'a> {
    billet: &'a Billet,
    specialty_penalty: f64,
    priority_weight: f64,
}

impl<'a> Column<'a> {
    fn new(billet: &'a Billet, w: &Weights) -> Self {
        Self {
            billet,
            specialty_penalty: w.specialty_penalty(billet.priority),
            priority_weight: w.priority_weight(billet.priority),
        }
    }
}

/// Pair-cost model over a transfer table and one mission profile.
#[derive(Debug, Clone, Default)]
pub struct CostModel {
    transfer: TransferCostTable,
    mission: MissionProfile,
}

impl CostModel {
    /// Creates a model with the given transfer table and a neutral mission.
    pub fn new(transfer: TransferCostTable) -> Self {
        Self {
            transfer,
            mission: MissionProfile::default(),
        }
    }

    /// Sets the mission profile.
    pub fn with_mission(mut self, mission: MissionProfile) -> Self {
        self.mission = mission;
        self
    }

    /// The transfer table.
    pub fn transfer(&self) -> &TransferCostTable {
        &self.transfer
    }

    /// Cost of assigning `soldier` to `billet` under `policy`.
    pub fn pair_cost(&self, soldier: &Soldier, billet: &Billet, policy: &PolicySet) -> f64 {
        let w = Weights::from_policy(policy);
        let column = Column::new(billet, &w);
        let transfer = self.transfer.cost(&soldier.location, &billet.location);
        self.cell(soldier, &column, transfer, &w)
    }

    /// Builds the full soldier × billet matrix, one billet column at a time.
    pub fn build_matrix(
        &self,
        soldiers: &[Soldier],
        billets: &[Billet],
        policy: &PolicySet,
    ) -> CostMatrix {
        let w = Weights::from_policy(policy);
        let mut matrix = CostMatrix::zeros(soldiers.len(), billets.len());

        for (j, billet) in billets.iter().enumerate() {
            let column = Column::new(billet, &w);
            let transfers: Vec<f64> = soldiers
                .iter()
                .map(|s| self.transfer.cost(&s.location, &billet.location))
                .collect();
            for (i, soldier) in soldiers.iter().enumerate() {
                matrix.set(i, j, self.cell(soldier, &column, transfers[i], &w));
            }
        }

        tracing::debug!(
            rows = matrix.rows(),
            cols = matrix.cols(),
            "built base cost matrix"
        );
        matrix
    }

    fn cell(&self, s: &Soldier, col: &Column<'_>, transfer: f64, w: &Weights) -> f64 {
        let b = col.billet;
        let mut cost = 0.0;

        if !b.rank_in_band(s.rank) {
            cost += w.rank_band;
        }
        if s.skill_level < b.min_skill {
            cost += w.skill_short;
        }
        if s.clearance < b.min_clearance {
            cost += w.clearance;
        }
        if s.specialty != b.specialty {
            cost += col.specialty_penalty;
        }
        if b.airborne_required && !s.airborne {
            cost += w.airborne;
        }
        if let Some(lang) = &b.language_required {
            if !s.speaks(lang) {
                cost += w.language;
            }
        }
        if s.available_from > b.start_date {
            cost += w.availability;
        }
        if !s.deployable {
            cost += w.non_deployable;
        }

        cost += w.transfer_weight * transfer;

        let moves = s.location != b.location;
        if !moves {
            cost += w.same_location;
        }
        if f64::from(s.dwell_months) < w.min_dwell && moves {
            cost += w.dwell_short;
        }

        cost += self.mission.adjustment(s, b);

        cost * col.priority_weight
    }
}
