//! Keep-together cohesion pass.
//!
//! A capability is keep-together when any of its billets carries the flag.
//! For every billet of such a capability, each soldier in an organic team
//! gets `keep_together_bonus × cohesion_weight` once per
//! teammate present in the pool (the soldier included), so larger intact
//! teams pull harder toward the capability.

use std::collections::HashSet;

use super::{PassContext, PassReport, PenaltyPass};
use crate::cost::CostMatrix;
use crate::models::policy::keys;

/// Cohesion pass backed by the task organizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CohesionPass;

impl PenaltyPass for CohesionPass {
    fn name(&self) -> &'static str {
        "cohesion"
    }

    fn apply(&self, matrix: &mut CostMatrix, ctx: &PassContext<'_>) -> PassReport {
        let Some(organizer) = ctx.organizer.filter(|o| o.has_teams()) else {
            return PassReport::skipped(self.name(), "no team context");
        };

        let together: HashSet<&str> = ctx
            .billets
            .iter()
            .filter(|b| b.keep_together)
            .filter_map(|b| b.capability.as_deref())
            .collect();
        let columns: Vec<usize> = ctx
            .billets
            .iter()
            .enumerate()
            .filter(|(_, b)| b.capability.as_deref().is_some_and(|c| together.contains(c)))
            .map(|(j, _)| j)
            .collect();
        if columns.is_empty() {
            return PassReport::skipped(self.name(), "no keep-together capabilities");
        }

        let bonus = ctx.policy.get(keys::KEEP_TOGETHER_BONUS) * ctx.policy.get(keys::COHESION_WEIGHT);
        let in_pool: HashSet<_> = ctx.soldiers.iter().map(|s| s.id).collect();

        for (i, soldier) in ctx.soldiers.iter().enumerate() {
            let Some(team) = organizer.team_of(soldier.id) else {
                continue;
            };
            let present = team
                .all_members()
                .iter()
                .filter(|id| in_pool.contains(*id))
                .count();
            let delta = bonus * present as f64;
            for &j in &columns {
                matrix.add(i, j, delta);
            }
        }

        PassReport::applied(self.name(), 0)
    }
}
