//! Sourcing of capability requirements from organic teams.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::{discover_teams, Hierarchy, OrganicTeam, PersonnelRecord};
use crate::models::{AssignmentResult, Soldier, SoldierId};

/// Bonus per unit fraction of a soldier's team already on the capability.
pub const TEAM_PRESENCE_BONUS: f64 = -300.0;
/// Penalty for leaving an unconsumed source team with a remainder.
pub const TEAM_REMAINDER_PENALTY: f64 = 200.0;
/// A partial team must cover at least this share of the requested size.
pub const PARTIAL_COVERAGE: f64 = 0.5;

/// How a capability requirement was sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourcingMethod {
    IntactTeam,
    PartialTeam,
    /// No team fits; individuals must be backfilled by the matcher.
    Individuals,
}

/// Outcome of [`TaskOrganizer::source_capability`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcingResult {
    pub member_ids: Vec<SoldierId>,
    pub method: SourcingMethod,
    /// Team consumed by this decision.
    pub team_id: Option<String>,
}

impl SourcingResult {
    fn from_team(team: &OrganicTeam, take: usize, method: SourcingMethod) -> Self {
        let mut member_ids = team.all_members();
        member_ids.truncate(take);
        Self {
            member_ids,
            method,
            team_id: Some(team.id.clone()),
        }
    }

    fn individuals() -> Self {
        Self {
            member_ids: Vec::new(),
            method: SourcingMethod::Individuals,
            team_id: None,
        }
    }
}

/// One unit's share of an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitContribution {
    pub unit: String,
    pub soldiers_contributed: usize,
    pub intact_teams_sourced: usize,
    /// Contributed soldiers over the unit's strength on record (0 when unknown).
    pub fill_impact: f64,
}

/// Per-unit sourcing report, largest contributors first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourcingReport {
    pub units: Vec<UnitContribution>,
    /// Matched soldiers without a unit.
    pub unattributed: usize,
}

impl SourcingReport {
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Number of distinct source units.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

/// Organic teams of one run plus the set of teams already consumed.
///
/// The consumed set lives behind a mutex so sourcing stays at-most-once
/// per team when decisions are made from several threads. It belongs to
/// this instance only; build a new organizer for each run.
#[derive(Debug, Default)]
pub struct TaskOrganizer {
    teams: Vec<OrganicTeam>,
    membership: HashMap<SoldierId, usize>,
    unit_strength: HashMap<String, usize>,
    used: Mutex<HashSet<String>>,
}

impl TaskOrganizer {
    /// Builds the hierarchy and discovers teams over `soldiers`.
    pub fn new(soldiers: &[Soldier], records: impl IntoIterator<Item = PersonnelRecord>) -> Self {
        let hierarchy = Hierarchy::build(records);
        let unit_strength = hierarchy
            .unit_strength()
            .into_iter()
            .map(|(u, n)| (u.to_string(), n))
            .collect();
        let mut organizer = Self::from_teams(discover_teams(&hierarchy, soldiers));
        organizer.unit_strength = unit_strength;
        tracing::debug!(
            records = hierarchy.len(),
            teams = organizer.teams.len(),
            "task organizer built"
        );
        organizer
    }

    /// Wraps pre-built teams.
    pub fn from_teams(teams: Vec<OrganicTeam>) -> Self {
        let mut membership = HashMap::new();
        for (idx, team) in teams.iter().enumerate() {
            for id in team.all_members() {
                // First team wins for soldiers that lead one team and serve in another.
                membership.entry(id).or_insert(idx);
            }
        }
        Self {
            teams,
            membership,
            unit_strength: HashMap::new(),
            used: Mutex::new(HashSet::new()),
        }
    }

    pub fn teams(&self) -> &[OrganicTeam] {
        &self.teams
    }

    pub fn has_teams(&self) -> bool {
        !self.teams.is_empty()
    }

    pub fn team(&self, team_id: &str) -> Option<&OrganicTeam> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    /// The team a soldier belongs to.
    pub fn team_of(&self, soldier: SoldierId) -> Option<&OrganicTeam> {
        self.membership.get(&soldier).map(|&i| &self.teams[i])
    }

    fn used(&self) -> MutexGuard<'_, HashSet<String>> {
        self.used.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_used(&self, team_id: &str) -> bool {
        self.used().contains(team_id)
    }

    /// Consumed team ids, sorted.
    pub fn used_team_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.used().iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Sources `size` soldiers of `specialty`.
    ///
    /// Tries, in order: an unused intact team from `prefer_unit`, an unused
    /// intact team from any unit, an unused team of the specialty covering
    /// at least half of `size`. Otherwise returns an empty
    /// [`SourcingMethod::Individuals`] result. Every team returned is
    /// consumed for the life of this organizer.
    pub fn source_capability(
        &self,
        specialty: &str,
        size: usize,
        prefer_intact: bool,
        prefer_unit: Option<&str>,
    ) -> SourcingResult {
        let mut used = self.used();
        let fits = |t: &&OrganicTeam| {
            !used.contains(&t.id) && t.specialty == specialty && t.size() >= size
        };

        if prefer_intact {
            let found = prefer_unit
                .and_then(|unit| self.teams.iter().filter(|t| t.unit == unit).find(fits))
                .or_else(|| self.teams.iter().find(fits));
            if let Some(team) = found {
                let result = SourcingResult::from_team(team, size, SourcingMethod::IntactTeam);
                used.insert(team.id.clone());
                return result;
            }
        }

        let partial = self.teams.iter().find(|t| {
            !used.contains(&t.id)
                && t.specialty == specialty
                && t.size().min(size) as f64 >= size as f64 * PARTIAL_COVERAGE
        });
        if let Some(team) = partial {
            let take = team.size().min(size);
            let result = SourcingResult::from_team(team, take, SourcingMethod::PartialTeam);
            used.insert(team.id.clone());
            return result;
        }

        SourcingResult::individuals()
    }

    /// Cost adjustment for adding `soldier` to a capability whose other
    /// members so far are `partial`.
    ///
    /// Negative when teammates are already present (scaled by the share of
    /// the team that would be together); positive when the soldier's team is
    /// still unconsumed and taking them would leave a remainder behind.
    /// Soldiers outside any team get zero.
    pub fn cohesion_adjustment(&self, soldier: SoldierId, partial: &[SoldierId]) -> f64 {
        let Some(team) = self.team_of(soldier) else {
            return 0.0;
        };

        let present = partial
            .iter()
            .filter(|&&id| id != soldier && team.contains(id))
            .collect::<HashSet<_>>()
            .len();
        let mut adjustment = 0.0;
        if present > 0 {
            adjustment += TEAM_PRESENCE_BONUS * (present + 1) as f64 / team.size() as f64;
        }
        if !self.is_used(&team.id) {
            let remaining = team.size().saturating_sub(present + 1);
            if remaining > 0 && remaining < team.size() {
                adjustment += TEAM_REMAINDER_PENALTY;
            }
        }
        adjustment
    }

    /// Which units contributed to `result` and how many consumed teams each
    /// supplied.
    pub fn sourcing_report(&self, result: &AssignmentResult) -> SourcingReport {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut unattributed = 0;
        for row in &result.rows {
            match row.soldier.unit.as_deref() {
                Some(u) => *counts.entry(u).or_insert(0) += 1,
                None => unattributed += 1,
            }
        }

        let used = self.used();
        let mut units: Vec<UnitContribution> = counts
            .into_iter()
            .map(|(unit, n)| UnitContribution {
                unit: unit.to_string(),
                soldiers_contributed: n,
                intact_teams_sourced: self
                    .teams
                    .iter()
                    .filter(|t| t.unit == unit && used.contains(&t.id))
                    .count(),
                fill_impact: self
                    .unit_strength
                    .get(unit)
                    .map(|&s| n as f64 / s as f64)
                    .unwrap_or(0.0),
            })
            .collect();
        units.sort_by(|a, b| b.soldiers_contributed.cmp(&a.soldiers_contributed));

        SourcingReport {
            units,
            unattributed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignmentRow, Billet};
    use crate::organizer::LeadershipLevel;
    use std::sync::Arc;

    /// Two 4-person 11B teams in different units and one 3-person 68W team.
    fn organizer() -> TaskOrganizer {
        let mut soldiers = Vec::new();
        let mut records = Vec::new();
        let layout = [("WAAA01", "11B", 1), ("WBBB01", "11B", 10), ("WAAA01", "68W", 20)];
        for (unit, mos, leader) in layout {
            let size = if mos == "68W" { 3 } else { 4 };
            for k in 0..size {
                let id = leader + k;
                soldiers.push(Soldier::new(id, "JBLM", 5, mos).with_unit(unit));
                let mut r = PersonnelRecord::new(id, unit);
                if k == 0 {
                    r = r
                        .with_leadership(LeadershipLevel::TeamLeader)
                        .with_position(format!("TM{leader}"));
                } else {
                    r = r.with_supervisor(leader);
                }
                records.push(r);
            }
        }
        TaskOrganizer::new(&soldiers, records)
    }

    #[test]
    fn test_teams_discovered() {
        let org = organizer();
        assert_eq!(org.teams().len(), 3);
        assert_eq!(org.team_of(12).map(|t| t.id.as_str()), Some("WBBB01_TM10"));
        assert!(org.team_of(99).is_none());
    }

    #[test]
    fn test_prefers_requested_unit() {
        let org = organizer();
        let r = org.source_capability("11B", 4, true, Some("WBBB01"));
        assert_eq!(r.method, SourcingMethod::IntactTeam);
        assert_eq!(r.team_id.as_deref(), Some("WBBB01_TM10"));
        assert_eq!(r.member_ids, vec![10, 11, 12, 13]);
    }

    #[test]
    fn test_intact_team_never_reused() {
        let org = organizer();
        let first = org.source_capability("11B", 4, true, None);
        let second = org.source_capability("11B", 4, true, None);
        let third = org.source_capability("11B", 4, true, None);

        assert_eq!(first.method, SourcingMethod::IntactTeam);
        assert_eq!(second.method, SourcingMethod::IntactTeam);
        assert_ne!(first.team_id, second.team_id);
        assert_eq!(third.method, SourcingMethod::Individuals);
        assert!(third.member_ids.is_empty());
        assert_eq!(org.used_team_ids().len(), 2);
    }

    #[test]
    fn test_partial_and_individual_fallbacks() {
        let org = organizer();
        // 68W team has 3; a request for 5 is covered at 60%
        let r = org.source_capability("68W", 5, true, None);
        assert_eq!(r.method, SourcingMethod::PartialTeam);
        assert_eq!(r.member_ids, vec![20, 21, 22]);

        let r = org.source_capability("11B", 9, true, None);
        assert_eq!(r.method, SourcingMethod::Individuals);

        let r = org.source_capability("35F", 1, true, None);
        assert_eq!(r.method, SourcingMethod::Individuals);
    }

    #[test]
    fn test_prefer_intact_false_goes_partial() {
        let org = organizer();
        let r = org.source_capability("11B", 2, false, None);
        assert_eq!(r.method, SourcingMethod::PartialTeam);
        assert_eq!(r.member_ids.len(), 2);
    }

    #[test]
    fn test_concurrent_sourcing_is_at_most_once() {
        let org = Arc::new(organizer());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let org = Arc::clone(&org);
                std::thread::spawn(move || org.source_capability("11B", 4, true, None))
            })
            .collect();
        let ids: Vec<String> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap().team_id)
            .collect();
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn test_cohesion_adjustment() {
        let org = organizer();
        // No teammates present, team unconsumed: remainder penalty only
        assert!((org.cohesion_adjustment(1, &[]) - 200.0).abs() < 1e-10);
        // Two teammates present: -300 × 3/4 + 200
        assert!((org.cohesion_adjustment(1, &[2, 3, 99]) - (-25.0)).abs() < 1e-10);
        // Whole team present: -300 × 4/4, no remainder
        assert!((org.cohesion_adjustment(1, &[2, 3, 4]) - (-300.0)).abs() < 1e-10);
        assert_eq!(org.cohesion_adjustment(99, &[1, 2]), 0.0);

        org.source_capability("11B", 4, true, Some("WAAA01"));
        assert_eq!(org.cohesion_adjustment(1, &[]), 0.0);
    }

    #[test]
    fn test_cohesion_adjustment_repeated_teammates() {
        let org = organizer();
        // Repeats count once: one teammate present, -300 × 2/4 + 200
        assert!((org.cohesion_adjustment(1, &[2, 2, 2, 2]) - 50.0).abs() < 1e-10);
        // Soldier listed alongside every teammate twice: whole team, no remainder
        let adj = org.cohesion_adjustment(1, &[1, 2, 3, 4, 2, 3, 4]);
        assert!((adj - (-300.0)).abs() < 1e-10);
    }

    #[test]
    fn test_sourcing_report() {
        let org = organizer();
        org.source_capability("11B", 4, true, Some("WAAA01"));

        let row = |id: SoldierId, unit: Option<&str>| {
            let mut soldier = Soldier::new(id, "JBLM", 5, "11B");
            soldier.unit = unit.map(str::to_string);
            AssignmentRow {
                soldier,
                billet: Billet::new(100 + id, "JBLM", "11B"),
                cost: 0.0,
            }
        };
        let result = AssignmentResult {
            rows: vec![
                row(1, Some("WAAA01")),
                row(2, Some("WAAA01")),
                row(10, Some("WBBB01")),
                row(50, None),
            ],
            ..AssignmentResult::default()
        };

        let report = org.sourcing_report(&result);
        assert_eq!(report.unit_count(), 2);
        assert_eq!(report.unattributed, 1);
        assert_eq!(report.units[0].unit, "WAAA01");
        assert_eq!(report.units[0].soldiers_contributed, 2);
        assert_eq!(report.units[0].intact_teams_sourced, 1);
        // 2 of 7 on record
        assert!((report.units[0].fill_impact - 2.0 / 7.0).abs() < 1e-10);
        assert_eq!(report.units[1].intact_teams_sourced, 0);
    }

    #[test]
    fn test_without_team_data() {
        let org = TaskOrganizer::new(&[Soldier::new(1, "JBLM", 5, "11B")], Vec::new());
        assert!(!org.has_teams());
        assert_eq!(org.source_capability("11B", 1, true, None).method, SourcingMethod::Individuals);
        assert_eq!(org.cohesion_adjustment(1, &[]), 0.0);
    }
}
