//! Demand model.
//!
//! A billet is one demand slot to be filled by a soldier. It carries the
//! soft requirements the cost model scores against and optional capability
//! metadata used by the cohesion pass and the Pareto objectives.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Clearance;

/// Billet identifier.
pub type BilletId = u32;

/// Demand importance tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    /// Tier 1.
    Low,
    /// Tier 2.
    #[default]
    Medium,
    /// Tier 3.
    High,
}

impl Priority {
    /// Ordinal tier (1..=3).
    pub fn tier(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(tier: u8) -> Result<Self, Self::Error> {
        match tier {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            other => Err(format!("priority tier must be 1..=3, got {other}")),
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p.tier()
    }
}

/// A demand record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Billet {
    /// Unique billet identifier.
    pub id: BilletId,
    /// Duty location.
    pub location: String,
    /// Priority tier.
    pub priority: Priority,
    /// Required specialty code.
    pub specialty: String,
    /// Lowest acceptable rank ordinal.
    pub min_rank: u8,
    /// Highest acceptable rank ordinal.
    pub max_rank: u8,
    /// Minimum skill level.
    pub min_skill: u8,
    /// Minimum clearance.
    pub min_clearance: Clearance,
    /// Requires airborne qualification.
    pub airborne_required: bool,
    /// Required language, if any.
    pub language_required: Option<String>,
    /// Demand start date.
    pub start_date: NaiveDate,
    /// Capability this billet belongs to (from a manning document).
    #[serde(default)]
    pub capability: Option<String>,
    /// Prefer sourcing the capability from one organic team.
    #[serde(default)]
    pub keep_together: bool,
    /// Pass-through fields outside the schema.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Billet {
    /// Creates a medium-priority billet with an open rank band and no start date.
    pub fn new(id: BilletId, location: impl Into<String>, specialty: impl Into<String>) -> Self {
        Self {
            id,
            location: location.into(),
            priority: Priority::Medium,
            specialty: specialty.into(),
            min_rank: 1,
            max_rank: 9,
            min_skill: 1,
            min_clearance: Clearance::None,
            airborne_required: false,
            language_required: None,
            start_date: NaiveDate::MAX,
            capability: None,
            keep_together: false,
            attributes: BTreeMap::new(),
        }
    }

    /// Sets the priority tier.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the rank band (inclusive).
    pub fn with_rank_band(mut self, min_rank: u8, max_rank: u8) -> Self {
        self.min_rank = min_rank;
        self.max_rank = max_rank;
        self
    }

    /// Sets the minimum skill level.
    pub fn with_min_skill(mut self, level: u8) -> Self {
        self.min_skill = level;
        self
    }

    /// Sets the minimum clearance.
    pub fn with_min_clearance(mut self, clearance: Clearance) -> Self {
        self.min_clearance = clearance;
        self
    }

    /// Sets the airborne requirement.
    pub fn with_airborne_required(mut self, required: bool) -> Self {
        self.airborne_required = required;
        self
    }

    /// Sets the required language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language_required = Some(language.into());
        self
    }

    /// Sets the demand start date.
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    /// Tags the billet with a capability.
    pub fn with_capability(mut self, name: impl Into<String>, keep_together: bool) -> Self {
        self.capability = Some(name.into());
        self.keep_together = keep_together;
        self
    }

    /// Adds a pass-through attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether a rank ordinal falls inside the band.
    #[inline]
    pub fn rank_in_band(&self, rank: u8) -> bool {
        self.min_rank <= rank && rank <= self.max_rank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billet_builder() {
        let b = Billet::new(101, "JBER", "35F")
            .with_priority(Priority::High)
            .with_rank_band(4, 6)
            .with_min_skill(2)
            .with_min_clearance(Clearance::TopSecret)
            .with_language("Korean")
            .with_capability("Intel Cell", true);

        assert_eq!(b.priority.tier(), 3);
        assert!(b.rank_in_band(4));
        assert!(b.rank_in_band(6));
        assert!(!b.rank_in_band(7));
        assert_eq!(b.language_required.as_deref(), Some("Korean"));
        assert!(b.keep_together);
    }

    #[test]
    fn test_priority_conversion() {
        assert_eq!(Priority::try_from(1), Ok(Priority::Low));
        assert_eq!(Priority::try_from(3), Ok(Priority::High));
        assert!(Priority::try_from(4).is_err());
        assert_eq!(u8::from(Priority::Medium), 2);
    }

    #[test]
    fn test_priority_serde_as_tier() {
        let b = Billet::new(1, "FBNC", "11B").with_priority(Priority::Low);
        let v = serde_json::to_value(&b).unwrap();
        assert_eq!(v["priority"], 1);

        let mut v2 = v.clone();
        v2["priority"] = serde_json::json!(5);
        assert!(serde_json::from_value::<Billet>(v2).is_err());
    }
}
