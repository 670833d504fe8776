//! Policy sets: named, tunable penalty/bonus weights.
//!
//! A policy set is an open name → weight map. Every term used by the cost
//! model or a penalty pass has an entry in [`DEFAULT_POLICY`]; lookups of
//! keys absent from a set fall back to that catalogue, and
//! [`PolicySet::resolved`] materialises the full table before a run.
//!
//! # Sign convention
//! Positive weights are penalties (cost added), negative weights bonuses.
//!
//! # Document format
//! A flat JSON object of `"name": number`. Unknown keys are ignored;
//! missing keys take their documented default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{EngineError, Result};

/// Policy key names.
pub mod keys {
    // Base cost model
    pub const MIN_DWELL_MONTHS: &str = "min_dwell_months_for_tdy";
    pub const MOS_MISMATCH: &str = "mos_mismatch_penalty";
    pub const RANK_OUT_OF_BAND: &str = "rank_out_of_band_penalty";
    pub const SKILL_SHORT: &str = "skill_short_penalty";
    pub const CLEARANCE_MISMATCH: &str = "clearance_mismatch_penalty";
    pub const AIRBORNE_REQUIRED: &str = "airborne_required_penalty";
    pub const LANGUAGE_REQUIRED: &str = "language_required_penalty";
    pub const AVAILABILITY_MISS: &str = "availability_miss_penalty";
    pub const NON_DEPLOYABLE: &str = "deployable_false_penalty";
    pub const SAME_LOCATION_BONUS: &str = "preference_bonus_same_base";
    pub const TRANSFER_COST_WEIGHT: &str = "tdy_cost_weight";
    pub const DWELL_SHORT: &str = "dwell_short_penalty";
    pub const PRIORITY_WEIGHT_LOW: &str = "priority_weight_low";
    pub const PRIORITY_WEIGHT_MED: &str = "priority_weight_med";
    pub const PRIORITY_WEIGHT_HIGH: &str = "priority_weight_high";

    // Cohesion
    pub const UNIT_COHESION_BONUS: &str = "unit_cohesion_bonus";
    pub const UNIT_SPLIT_PENALTY: &str = "unit_split_penalty";
    pub const CROSS_UNIT_PENALTY: &str = "cross_unit_penalty";
    pub const KEEP_TOGETHER_BONUS: &str = "keep_together_bonus";
    pub const COHESION_WEIGHT: &str = "cohesion_weight";

    // Readiness
    pub const READINESS_FAILURE: &str = "readiness_failure_penalty";
    pub const TRAINING_CURRENCY_BONUS: &str = "training_currency_bonus";

    // Geographic
    pub const GEOGRAPHIC_COST_WEIGHT: &str = "geographic_cost_weight";
    pub const OCONUS_LEAD_TIME: &str = "lead_time_penalty_oconus";
    pub const SAME_THEATER_BONUS: &str = "same_theater_bonus";
    pub const DISTANCE_PER_1000MI: &str = "distance_penalty_per_1000mi";

    // Qualifications
    pub const QUALIFICATION_WEIGHT: &str = "qualification_weight";
    pub const EDUCATION_SHORT: &str = "education_short_penalty";
    pub const EDUCATION_PREFERRED_BONUS: &str = "education_preferred_bonus";
    pub const LANGUAGE_PROF_SHORT: &str = "language_prof_short_penalty";
    pub const LANGUAGE_PROF_BONUS: &str = "language_prof_bonus";
    pub const ASI_MISSING: &str = "asi_missing_penalty";
    pub const ASI_PREFERRED_BONUS: &str = "asi_preferred_bonus";
    pub const SQI_MISSING: &str = "sqi_missing_penalty";
    pub const SQI_PREFERRED_BONUS: &str = "sqi_preferred_bonus";
    pub const BADGE_MISSING: &str = "badge_missing_penalty";
    pub const BADGE_PREFERRED_BONUS: &str = "badge_preferred_bonus";
    pub const LICENSE_MISSING: &str = "license_missing_penalty";
    pub const LICENSE_PREFERRED_BONUS: &str = "license_preferred_bonus";
    pub const AWARD_MISSING: &str = "award_missing_penalty";
    pub const AWARD_PREFERRED_BONUS: &str = "award_preferred_bonus";
    pub const DEPLOYMENT_SHORT: &str = "deployment_short_penalty";
    pub const COMBAT_EXPERIENCE_MISSING: &str = "combat_experience_missing_penalty";
    pub const COMBAT_EXPERIENCE_BONUS: &str = "combat_experience_bonus";
    pub const THEATER_EXPERIENCE_MISSING: &str = "theater_experience_missing_penalty";
    pub const LEADERSHIP_SHORT: &str = "leadership_short_penalty";
    pub const TIS_SHORT: &str = "tis_short_penalty";
    pub const TIG_SHORT: &str = "tig_short_penalty";
    pub const ACFT_SHORT: &str = "acft_short_penalty";
    pub const WEAPONS_QUAL_SHORT: &str = "weapons_qual_short_penalty";
    pub const MEDICAL_CATEGORY: &str = "medical_category_penalty";
    pub const DENTAL_CATEGORY: &str = "dental_category_penalty";
    pub const PERFECT_MATCH_BONUS: &str = "perfect_match_bonus";
    pub const CRITICALITY_MULT_LOW: &str = "criticality_multiplier_low";
    pub const CRITICALITY_MULT_MED: &str = "criticality_multiplier_med";
    pub const CRITICALITY_MULT_HIGH: &str = "criticality_multiplier_high";
    pub const CRITICALITY_MULT_CRITICAL: &str = "criticality_multiplier_critical";
}

/// Documented defaults for every policy key.
pub const DEFAULT_POLICY: &[(&str, f64)] = &[
    (keys::MIN_DWELL_MONTHS, 6.0),
    (keys::MOS_MISMATCH, 3000.0),
    (keys::RANK_OUT_OF_BAND, 5000.0),
    (keys::SKILL_SHORT, 1500.0),
    (keys::CLEARANCE_MISMATCH, 2000.0),
    (keys::AIRBORNE_REQUIRED, 1200.0),
    (keys::LANGUAGE_REQUIRED, 1000.0),
    (keys::AVAILABILITY_MISS, 800.0),
    (keys::NON_DEPLOYABLE, 8000.0),
    (keys::SAME_LOCATION_BONUS, -200.0),
    (keys::TRANSFER_COST_WEIGHT, 1.0),
    (keys::DWELL_SHORT, 1500.0),
    (keys::PRIORITY_WEIGHT_LOW, 1.0),
    (keys::PRIORITY_WEIGHT_MED, 1.5),
    (keys::PRIORITY_WEIGHT_HIGH, 2.0),
    (keys::UNIT_COHESION_BONUS, -500.0),
    (keys::UNIT_SPLIT_PENALTY, 300.0),
    (keys::CROSS_UNIT_PENALTY, 200.0),
    (keys::KEEP_TOGETHER_BONUS, -200.0),
    (keys::COHESION_WEIGHT, 1.0),
    (keys::READINESS_FAILURE, 2000.0),
    (keys::TRAINING_CURRENCY_BONUS, -100.0),
    (keys::GEOGRAPHIC_COST_WEIGHT, 1.0),
    (keys::OCONUS_LEAD_TIME, 500.0),
    (keys::SAME_THEATER_BONUS, -300.0),
    (keys::DISTANCE_PER_1000MI, 100.0),
    (keys::QUALIFICATION_WEIGHT, 1.0),
    (keys::EDUCATION_SHORT, 1500.0),
    (keys::EDUCATION_PREFERRED_BONUS, -200.0),
    (keys::LANGUAGE_PROF_SHORT, 2000.0),
    (keys::LANGUAGE_PROF_BONUS, -300.0),
    (keys::ASI_MISSING, 1500.0),
    (keys::ASI_PREFERRED_BONUS, -250.0),
    (keys::SQI_MISSING, 2000.0),
    (keys::SQI_PREFERRED_BONUS, -300.0),
    (keys::BADGE_MISSING, 2500.0),
    (keys::BADGE_PREFERRED_BONUS, -300.0),
    (keys::LICENSE_MISSING, 1200.0),
    (keys::LICENSE_PREFERRED_BONUS, -150.0),
    (keys::AWARD_MISSING, 800.0),
    (keys::AWARD_PREFERRED_BONUS, -100.0),
    (keys::DEPLOYMENT_SHORT, 1000.0),
    (keys::COMBAT_EXPERIENCE_MISSING, 1500.0),
    (keys::COMBAT_EXPERIENCE_BONUS, -250.0),
    (keys::THEATER_EXPERIENCE_MISSING, 800.0),
    (keys::LEADERSHIP_SHORT, 1500.0),
    (keys::TIS_SHORT, 600.0),
    (keys::TIG_SHORT, 600.0),
    (keys::ACFT_SHORT, 700.0),
    (keys::WEAPONS_QUAL_SHORT, 700.0),
    (keys::MEDICAL_CATEGORY, 3000.0),
    (keys::DENTAL_CATEGORY, 1500.0),
    (keys::PERFECT_MATCH_BONUS, -500.0),
    (keys::CRITICALITY_MULT_LOW, 0.5),
    (keys::CRITICALITY_MULT_MED, 1.0),
    (keys::CRITICALITY_MULT_HIGH, 1.5),
    (keys::CRITICALITY_MULT_CRITICAL, 2.0),
];

/// Returns the documented default for a key.
pub fn default_weight(key: &str) -> Option<f64> {
    DEFAULT_POLICY
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Whether a key belongs to the catalogue.
pub fn is_known_key(key: &str) -> bool {
    default_weight(key).is_some()
}

/// A named set of policy weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySet {
    /// Policy set name.
    pub name: String,
    /// Weight overrides by key.
    pub weights: BTreeMap<String, f64>,
}

impl Default for PolicySet {
    fn default() -> Self {
        Self::new("default")
    }
}

impl PolicySet {
    /// Creates a set populated with every default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: DEFAULT_POLICY
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }

    /// Creates a set with no explicit entries (all lookups use defaults).
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: BTreeMap::new(),
        }
    }

    /// Sets a weight (builder form).
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.weights.insert(key.into(), value);
        self
    }

    /// Returns the weight for a key, falling back to its default.
    ///
    /// Unknown keys without an explicit entry read as 0.0.
    pub fn get(&self, key: &str) -> f64 {
        self.weights
            .get(key)
            .copied()
            .or_else(|| default_weight(key))
            .unwrap_or(0.0)
    }

    /// Sets a weight.
    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.weights.insert(key.into(), value);
    }

    /// Applies catalogue updates; keys outside the catalogue are skipped.
    ///
    /// Returns the number of entries applied.
    pub fn apply<'a, I>(&mut self, updates: I) -> usize
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
    {
        let mut applied = 0;
        for (k, v) in updates {
            if is_known_key(k) {
                self.weights.insert(k.clone(), *v);
                applied += 1;
            } else {
                tracing::debug!(key = %k, "ignoring update for unknown policy key");
            }
        }
        applied
    }

    /// Returns a copy holding every catalogue key.
    ///
    /// Fails if any known key holds a non-finite value.
    pub fn resolved(&self) -> Result<PolicySet> {
        let mut weights = BTreeMap::new();
        for (key, default) in DEFAULT_POLICY {
            let value = self.weights.get(*key).copied().unwrap_or(*default);
            if !value.is_finite() {
                return Err(EngineError::MalformedPolicy {
                    key: key.to_string(),
                    reason: format!("value {value} is not finite"),
                });
            }
            weights.insert(key.to_string(), value);
        }
        Ok(PolicySet {
            name: self.name.clone(),
            weights,
        })
    }

    /// Catalogue keys in this set, in name order.
    pub fn tunable_keys(&self) -> Vec<&str> {
        self.weights
            .keys()
            .map(String::as_str)
            .filter(|k| is_known_key(k))
            .collect()
    }

    /// Parses a flat JSON policy document.
    pub fn from_json(name: impl Into<String>, document: &str) -> Result<PolicySet> {
        let value: serde_json::Value = serde_json::from_str(document)?;
        let object = value
            .as_object()
            .ok_or_else(|| EngineError::config("policy document must be a JSON object"))?;

        let mut set = PolicySet::new(name);
        for (key, raw) in object {
            if !is_known_key(key) {
                tracing::debug!(key = %key, "ignoring unknown policy key");
                continue;
            }
            let number = raw.as_f64().ok_or_else(|| EngineError::MalformedPolicy {
                key: key.clone(),
                reason: format!("expected a number, got {raw}"),
            })?;
            set.weights.insert(key.clone(), number);
        }
        Ok(set)
    }

    /// Serializes the set as a flat JSON document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.weights)?)
    }

    /// Loads a policy document from disk.
    pub fn load(name: impl Into<String>, path: impl AsRef<Path>) -> Result<PolicySet> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(name, &text)
    }

    /// Writes the set to disk as a flat JSON document.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }
}
