//! Cohesion scoring for a completed sourcing decision.
//!
//! | Term | Rule |
//! |------|------|
//! | Team bonus | `unit_cohesion_bonus × kept% × size / 4` when ≥ 80% of a team is kept together |
//! | Split penalty | `unit_split_penalty × disruption × size` per partially taken team, disruption peaking at 50% |
//! | Cross-unit penalty | `cross_unit_penalty × (units − 1)` |

use std::collections::HashSet;

use super::OrganicTeam;
use crate::models::policy::keys;
use crate::models::{PolicySet, SoldierId};

/// Fraction of a team that must be kept for the team bonus.
pub const INTACT_THRESHOLD: f64 = 0.8;

/// Cohesion terms of one sourcing decision.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CohesionBreakdown {
    pub team_bonus: f64,
    pub split_penalty: f64,
    pub cross_unit_penalty: f64,
}

impl CohesionBreakdown {
    pub fn total(&self) -> f64 {
        self.team_bonus + self.split_penalty + self.cross_unit_penalty
    }
}

/// Cohesion calculator with policy-derived base weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CohesionCalculator {
    pub team_bonus: f64,
    pub split_penalty: f64,
    pub cross_unit_penalty: f64,
}

impl Default for CohesionCalculator {
    fn default() -> Self {
        Self::from_policy(&PolicySet::default())
    }
}

impl CohesionCalculator {
    pub fn from_policy(policy: &PolicySet) -> Self {
        Self {
            team_bonus: policy.get(keys::UNIT_COHESION_BONUS),
            split_penalty: policy.get(keys::UNIT_SPLIT_PENALTY),
            cross_unit_penalty: policy.get(keys::CROSS_UNIT_PENALTY),
        }
    }

    /// Bonus for keeping `team` together, scaled by team size.
    pub fn team_bonus(&self, assigned: &HashSet<SoldierId>, team: &OrganicTeam) -> f64 {
        let members = team.all_members();
        let kept = members.iter().filter(|id| assigned.contains(*id)).count();
        let pct = kept as f64 / members.len() as f64;
        if pct >= INTACT_THRESHOLD {
            self.team_bonus * pct * (members.len() as f64 / 4.0)
        } else {
            0.0
        }
    }

    /// Penalty for every team that was only partially taken.
    pub fn split_penalty(&self, taken: &HashSet<SoldierId>, teams: &[OrganicTeam]) -> f64 {
        teams
            .iter()
            .map(|team| {
                let size = team.size();
                let n = team.all_members().iter().filter(|id| taken.contains(*id)).count();
                if n == 0 || n == size {
                    return 0.0;
                }
                let pct = n as f64 / size as f64;
                let disruption = 1.0 - (pct - 0.5).abs() * 2.0;
                self.split_penalty * disruption * size as f64
            })
            .sum()
    }

    /// Coordination penalty for sourcing from several units.
    pub fn cross_unit_penalty(&self, unit_count: usize) -> f64 {
        if unit_count <= 1 {
            0.0
        } else {
            self.cross_unit_penalty * (unit_count - 1) as f64
        }
    }

    /// All three terms for one set of assigned soldiers.
    pub fn evaluate(
        &self,
        assigned: &HashSet<SoldierId>,
        teams: &[OrganicTeam],
        unit_count: usize,
    ) -> CohesionBreakdown {
        CohesionBreakdown {
            team_bonus: teams.iter().map(|t| self.team_bonus(assigned, t)).sum(),
            split_penalty: self.split_penalty(assigned, teams),
            cross_unit_penalty: self.cross_unit_penalty(unit_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organizer::TeamType;

    fn team(leader: SoldierId, members: &[SoldierId]) -> OrganicTeam {
        OrganicTeam {
            id: format!("U_{leader}"),
            unit: "U".into(),
            leader_id: leader,
            member_ids: members.to_vec(),
            team_type: TeamType::Team,
            specialty: "11B".into(),
        }
    }

    #[test]
    fn test_team_bonus_threshold() {
        let calc = CohesionCalculator::default();
        let t = team(1, &[2, 3, 4]);
        let all: HashSet<_> = [1, 2, 3, 4].into();
        // -500 × 1.0 × 4/4
        assert!((calc.team_bonus(&all, &t) - (-500.0)).abs() < 1e-10);
        let most: HashSet<_> = [1, 2, 3].into();
        assert_eq!(calc.team_bonus(&most, &t), 0.0);
    }

    #[test]
    fn test_split_penalty_peaks_at_half() {
        let calc = CohesionCalculator::default();
        let teams = vec![team(1, &[2, 3, 4])];
        let half: HashSet<_> = [1, 2].into();
        let quarter: HashSet<_> = [1].into();
        let whole: HashSet<_> = [1, 2, 3, 4].into();
        // 300 × 1.0 × 4
        assert!((calc.split_penalty(&half, &teams) - 1200.0).abs() < 1e-10);
        // 300 × 0.5 × 4
        assert!((calc.split_penalty(&quarter, &teams) - 600.0).abs() < 1e-10);
        assert_eq!(calc.split_penalty(&whole, &teams), 0.0);
    }

    #[test]
    fn test_evaluate_totals() {
        let calc = CohesionCalculator::default();
        let teams = vec![team(1, &[2, 3, 4]), team(5, &[6])];
        let assigned: HashSet<_> = [1, 2, 3, 4, 5].into();
        let b = calc.evaluate(&assigned, &teams, 3);
        assert!((b.team_bonus - (-500.0)).abs() < 1e-10);
        // team 5 half taken: 300 × 1.0 × 2
        assert!((b.split_penalty - 600.0).abs() < 1e-10);
        assert!((b.cross_unit_penalty - 400.0).abs() < 1e-10);
        assert!((b.total() - 500.0).abs() < 1e-10);
    }
}
