//! Supervisor hierarchy and organic team discovery.
//!
//! The hierarchy is a forest stored as parent indices into an arena of
//! [`PersonnelRecord`]s; child lists are built in a single pass. A
//! supervisor link is kept only when both ends exist and share a unit.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::models::{Soldier, SoldierId};

/// Leadership tier of a duty position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LeadershipLevel {
    #[default]
    None,
    TeamLeader,
    SquadLeader,
    PlatoonSergeant,
    PlatoonLeader,
    FirstSergeant,
    Commander,
}

impl LeadershipLevel {
    /// Whether this tier anchors an organic team.
    pub fn anchors_team(self) -> bool {
        matches!(self, Self::TeamLeader | Self::SquadLeader)
    }
}

/// Position of one soldier in the unit structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonnelRecord {
    pub soldier_id: SoldierId,
    /// Owning unit (UIC).
    pub unit: String,
    #[serde(default)]
    pub supervisor_id: Option<SoldierId>,
    #[serde(default)]
    pub leadership: LeadershipLevel,
    /// Duty position / paragraph-line label.
    #[serde(default)]
    pub position: String,
}

impl PersonnelRecord {
    pub fn new(soldier_id: SoldierId, unit: impl Into<String>) -> Self {
        Self {
            soldier_id,
            unit: unit.into(),
            supervisor_id: None,
            leadership: LeadershipLevel::None,
            position: String::new(),
        }
    }

    pub fn with_supervisor(mut self, supervisor: SoldierId) -> Self {
        self.supervisor_id = Some(supervisor);
        self
    }

    pub fn with_leadership(mut self, level: LeadershipLevel) -> Self {
        self.leadership = level;
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }
}

/// Supervisor forest over personnel records.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    records: Vec<PersonnelRecord>,
    index: HashMap<SoldierId, usize>,
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

impl Hierarchy {
    /// Builds the forest. Duplicate soldier ids keep their first record.
    pub fn build(records: impl IntoIterator<Item = PersonnelRecord>) -> Self {
        let mut h = Self::default();
        for r in records {
            if h.index.contains_key(&r.soldier_id) {
                tracing::debug!(soldier = r.soldier_id, "duplicate personnel record ignored");
                continue;
            }
            h.index.insert(r.soldier_id, h.records.len());
            h.records.push(r);
        }

        h.parent = vec![None; h.records.len()];
        h.children = vec![Vec::new(); h.records.len()];
        for (i, r) in h.records.iter().enumerate() {
            let Some(sup) = r.supervisor_id else { continue };
            match h.index.get(&sup) {
                Some(&p) if p != i && h.records[p].unit == r.unit => {
                    h.parent[i] = Some(p);
                    h.children[p].push(i);
                }
                _ => {}
            }
        }
        h
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PersonnelRecord] {
        &self.records
    }

    pub fn record(&self, soldier: SoldierId) -> Option<&PersonnelRecord> {
        self.index.get(&soldier).map(|&i| &self.records[i])
    }

    /// Direct supervisor, if linked.
    pub fn supervisor(&self, soldier: SoldierId) -> Option<SoldierId> {
        let i = *self.index.get(&soldier)?;
        self.parent[i].map(|p| self.records[p].soldier_id)
    }

    /// Direct subordinates in record order.
    pub fn subordinates(&self, soldier: SoldierId) -> Vec<SoldierId> {
        self.index
            .get(&soldier)
            .map(|&i| {
                self.children[i]
                    .iter()
                    .map(|&c| self.records[c].soldier_id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of records per unit.
    pub fn unit_strength(&self) -> HashMap<&str, usize> {
        let mut strength = HashMap::new();
        for r in &self.records {
            *strength.entry(r.unit.as_str()).or_insert(0) += 1;
        }
        strength
    }
}

/// Kind of organic team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamType {
    Team,
    Squad,
}

/// A leader and their direct subordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganicTeam {
    pub id: String,
    pub unit: String,
    pub leader_id: SoldierId,
    /// Direct subordinates, leader excluded.
    pub member_ids: Vec<SoldierId>,
    pub team_type: TeamType,
    /// Leader's primary specialty.
    pub specialty: String,
}

impl OrganicTeam {
    /// Size including the leader.
    pub fn size(&self) -> usize {
        1 + self.member_ids.len()
    }

    /// Leader first, then members.
    pub fn all_members(&self) -> Vec<SoldierId> {
        std::iter::once(self.leader_id)
            .chain(self.member_ids.iter().copied())
            .collect()
    }

    pub fn contains(&self, soldier: SoldierId) -> bool {
        self.leader_id == soldier || self.member_ids.contains(&soldier)
    }
}

/// Discovers organic teams: every team or squad leader with at least one
/// direct subordinate anchors one team.
///
/// Leaders missing from `soldiers` are skipped since their specialty is
/// unknown.
pub fn discover_teams(hierarchy: &Hierarchy, soldiers: &[Soldier]) -> Vec<OrganicTeam> {
    let specialty: HashMap<SoldierId, &str> = soldiers
        .iter()
        .map(|s| (s.id, s.specialty.as_str()))
        .collect();
    let mut seen_ids = HashSet::new();
    let mut teams = Vec::new();

    for (i, r) in hierarchy.records.iter().enumerate() {
        if !r.leadership.anchors_team() || hierarchy.children[i].is_empty() {
            continue;
        }
        let Some(spec) = specialty.get(&r.soldier_id) else {
            tracing::debug!(leader = r.soldier_id, "team leader not in pool");
            continue;
        };

        let mut id = if r.position.is_empty() {
            format!("{}_{}", r.unit, r.soldier_id)
        } else {
            format!("{}_{}", r.unit, r.position)
        };
        if !seen_ids.insert(id.clone()) {
            id = format!("{id}_{}", r.soldier_id);
            seen_ids.insert(id.clone());
        }

        teams.push(OrganicTeam {
            id,
            unit: r.unit.clone(),
            leader_id: r.soldier_id,
            member_ids: hierarchy.subordinates(r.soldier_id),
            team_type: if r.leadership == LeadershipLevel::SquadLeader {
                TeamType::Squad
            } else {
                TeamType::Team
            },
            specialty: spec.to_string(),
        });
    }

    teams
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squad_records() -> Vec<PersonnelRecord> {
        vec![
            PersonnelRecord::new(1, "WAAA01")
                .with_leadership(LeadershipLevel::SquadLeader)
                .with_position("SQD1"),
            PersonnelRecord::new(2, "WAAA01")
                .with_supervisor(1)
                .with_leadership(LeadershipLevel::TeamLeader)
                .with_position("SQD1A"),
            PersonnelRecord::new(3, "WAAA01").with_supervisor(2),
            PersonnelRecord::new(4, "WAAA01").with_supervisor(2),
            // cross-unit link is dropped
            PersonnelRecord::new(5, "WBBB01").with_supervisor(1),
            // leader without subordinates
            PersonnelRecord::new(6, "WBBB01").with_leadership(LeadershipLevel::TeamLeader),
        ]
    }

    #[test]
    fn test_forest_links() {
        let h = Hierarchy::build(squad_records());
        assert_eq!(h.len(), 6);
        assert_eq!(h.supervisor(3), Some(2));
        assert_eq!(h.supervisor(5), None);
        assert_eq!(h.subordinates(2), vec![3, 4]);
        assert_eq!(h.subordinates(1), vec![2]);
        assert!(h.subordinates(99).is_empty());
        assert_eq!(h.unit_strength()["WAAA01"], 4);
    }

    #[test]
    fn test_self_supervision_and_duplicates_ignored() {
        let h = Hierarchy::build(vec![
            PersonnelRecord::new(1, "U").with_supervisor(1),
            PersonnelRecord::new(1, "V"),
        ]);
        assert_eq!(h.len(), 1);
        assert_eq!(h.record(1).map(|r| r.unit.as_str()), Some("U"));
        assert_eq!(h.supervisor(1), None);
    }

    #[test]
    fn test_discover_teams() {
        let h = Hierarchy::build(squad_records());
        let soldiers: Vec<Soldier> = (1..=6)
            .map(|id| Soldier::new(id, "JBLM", 5, if id == 1 { "11B" } else { "11C" }))
            .collect();
        let teams = discover_teams(&h, &soldiers);

        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].id, "WAAA01_SQD1");
        assert_eq!(teams[0].team_type, TeamType::Squad);
        assert_eq!(teams[0].specialty, "11B");
        assert_eq!(teams[0].all_members(), vec![1, 2]);
        assert_eq!(teams[1].id, "WAAA01_SQD1A");
        assert_eq!(teams[1].size(), 3);
        assert!(teams[1].contains(4));
    }

    #[test]
    fn test_leader_outside_pool_skipped() {
        let h = Hierarchy::build(squad_records());
        let soldiers = vec![Soldier::new(2, "JBLM", 5, "11C")];
        let teams = discover_teams(&h, &soldiers);
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].leader_id, 2);
    }
}
