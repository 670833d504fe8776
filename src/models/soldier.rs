//! Personnel (supply) model.
//!
//! A soldier is one record of the personnel pool. Records are immutable for
//! the duration of a run; fields outside the fixed schema are kept in
//! `attributes` and re-attached to assignment output untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Soldier identifier.
pub type SoldierId = u32;

/// Security clearance, ordered by sensitivity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Clearance {
    /// No clearance.
    #[default]
    None,
    /// Secret.
    Secret,
    /// Top Secret.
    TopSecret,
}

impl Clearance {
    /// Ordinal value (0 = none).
    pub fn level(self) -> u8 {
        match self {
            Clearance::None => 0,
            Clearance::Secret => 1,
            Clearance::TopSecret => 2,
        }
    }
}

/// Parses an enlisted paygrade label (`"E-5"`, `"e5"`) to its ordinal.
pub fn parse_paygrade(label: &str) -> Option<u8> {
    let digits = label
        .trim()
        .trim_start_matches(['E', 'e'])
        .trim_start_matches('-');
    match digits.parse::<u8>() {
        Ok(n) if (1..=9).contains(&n) => Some(n),
        _ => None,
    }
}

/// A personnel record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Soldier {
    /// Unique soldier identifier.
    pub id: SoldierId,
    /// Current location (home station).
    pub location: String,
    /// Rank ordinal (enlisted paygrade number, E-4 = 4).
    pub rank: u8,
    /// Primary specialty code (MOS).
    pub specialty: String,
    /// Skill level ordinal.
    pub skill_level: u8,
    /// Security clearance.
    pub clearance: Clearance,
    /// Airborne qualified.
    pub airborne: bool,
    /// Medically and administratively deployable.
    pub deployable: bool,
    /// Foreign language, if any.
    pub language: Option<String>,
    /// Months since last deployment or transfer.
    pub dwell_months: u32,
    /// Earliest date the soldier can report.
    pub available_from: NaiveDate,
    /// Owning unit identifier (UIC), when known.
    #[serde(default)]
    pub unit: Option<String>,
    /// Pass-through fields outside the schema.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Soldier {
    /// Creates a deployable, immediately available soldier.
    pub fn new(
        id: SoldierId,
        location: impl Into<String>,
        rank: u8,
        specialty: impl Into<String>,
    ) -> Self {
        Self {
            id,
            location: location.into(),
            rank,
            specialty: specialty.into(),
            skill_level: 1,
            clearance: Clearance::None,
            airborne: false,
            deployable: true,
            language: None,
            dwell_months: 0,
            available_from: NaiveDate::MIN,
            unit: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Sets the skill level.
    pub fn with_skill(mut self, skill_level: u8) -> Self {
        self.skill_level = skill_level;
        self
    }

    /// Sets the clearance.
    pub fn with_clearance(mut self, clearance: Clearance) -> Self {
        self.clearance = clearance;
        self
    }

    /// Sets the airborne flag.
    pub fn with_airborne(mut self, airborne: bool) -> Self {
        self.airborne = airborne;
        self
    }

    /// Sets the deployable flag.
    pub fn with_deployable(mut self, deployable: bool) -> Self {
        self.deployable = deployable;
        self
    }

    /// Sets the spoken language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets dwell time in months.
    pub fn with_dwell(mut self, months: u32) -> Self {
        self.dwell_months = months;
        self
    }

    /// Sets the earliest availability date.
    pub fn with_available_from(mut self, date: NaiveDate) -> Self {
        self.available_from = date;
        self
    }

    /// Sets the owning unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Adds a pass-through attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether the soldier speaks the given language.
    pub fn speaks(&self, language: &str) -> bool {
        self.language.as_deref() == Some(language)
    }
}
