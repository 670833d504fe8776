//! Readiness gates.
//!
//! A [`ReadinessProfile`] lists what a mission demands (medical and dental
//! category ceilings, minimum dwell, current training gates, equipment
//! qualifications, a deployment-count ceiling). A soldier is evaluated
//! against it using the pool record plus an optional [`ReadinessRecord`].
//!
//! The pass adds `readiness_failure_penalty × failures` to the soldier's
//! row, or `training_currency_bonus` when the soldier is ready and every
//! training gate on record is current.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{PassContext, PassReport, PenaltyPass};
use crate::cost::CostMatrix;
use crate::models::policy::keys;
use crate::models::{Soldier, SoldierId};

/// A completed training event with a currency window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingGate {
    pub completed: NaiveDate,
    /// Days the training stays current after completion.
    pub valid_days: u32,
}

impl TrainingGate {
    pub fn new(completed: NaiveDate, valid_days: u32) -> Self {
        Self {
            completed,
            valid_days,
        }
    }

    /// Last day the gate is current.
    pub fn expires(&self) -> NaiveDate {
        self.completed
            .checked_add_days(Days::new(u64::from(self.valid_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn is_current(&self, as_of: NaiveDate) -> bool {
        as_of <= self.expires()
    }
}

/// An equipment or weapon-system qualification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentQualification {
    pub equipment_type: String,
    pub expires: NaiveDate,
}

impl EquipmentQualification {
    pub fn new(equipment_type: impl Into<String>, expires: NaiveDate) -> Self {
        Self {
            equipment_type: equipment_type.into(),
            expires,
        }
    }

    pub fn is_valid(&self, as_of: NaiveDate) -> bool {
        as_of <= self.expires
    }
}

/// Extended readiness data for one soldier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessRecord {
    pub soldier_id: SoldierId,
    /// Medical category (1 = fully fit, 4 = non-deployable).
    pub medical_category: u8,
    pub dental_category: u8,
    #[serde(default)]
    pub training: BTreeMap<String, TrainingGate>,
    #[serde(default)]
    pub equipment: Vec<EquipmentQualification>,
    #[serde(default)]
    pub deployment_count: u32,
}

impl ReadinessRecord {
    /// A fully fit record with no training on file.
    pub fn new(soldier_id: SoldierId) -> Self {
        Self {
            soldier_id,
            medical_category: 1,
            dental_category: 1,
            training: BTreeMap::new(),
            equipment: Vec::new(),
            deployment_count: 0,
        }
    }

    pub fn with_categories(mut self, medical: u8, dental: u8) -> Self {
        self.medical_category = medical;
        self.dental_category = dental;
        self
    }

    pub fn with_training(mut self, name: impl Into<String>, gate: TrainingGate) -> Self {
        self.training.insert(name.into(), gate);
        self
    }

    pub fn with_equipment(mut self, qualification: EquipmentQualification) -> Self {
        self.equipment.push(qualification);
        self
    }

    pub fn with_deployments(mut self, count: u32) -> Self {
        self.deployment_count = count;
        self
    }

    /// Whether every training gate on record is current.
    pub fn all_training_current(&self, as_of: NaiveDate) -> bool {
        self.training.values().all(|g| g.is_current(as_of))
    }
}

/// Mission readiness requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessProfile {
    pub name: String,
    #[serde(default)]
    pub required_training: Vec<String>,
    #[serde(default)]
    pub required_equipment: Vec<String>,
    #[serde(default)]
    pub min_dwell_months: u32,
    #[serde(default)]
    pub max_deployment_count: Option<u32>,
    pub max_medical_category: u8,
    pub max_dental_category: u8,
}

impl ReadinessProfile {
    /// A profile with only the C2 medical/dental ceilings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required_training: Vec::new(),
            required_equipment: Vec::new(),
            min_dwell_months: 0,
            max_deployment_count: None,
            max_medical_category: 2,
            max_dental_category: 2,
        }
    }

    pub fn with_training(mut self, names: &[&str]) -> Self {
        self.required_training
            .extend(names.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_equipment(mut self, types: &[&str]) -> Self {
        self.required_equipment
            .extend(types.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_min_dwell(mut self, months: u32) -> Self {
        self.min_dwell_months = months;
        self
    }

    pub fn with_max_deployments(mut self, count: u32) -> Self {
        self.max_deployment_count = Some(count);
        self
    }

    pub fn with_max_categories(mut self, medical: u8, dental: u8) -> Self {
        self.max_medical_category = medical;
        self.max_dental_category = dental;
        self
    }

    /// Basic CONUS training exercise.
    pub fn conus_training() -> Self {
        Self::new("CONUS_Training")
            .with_training(&["weapons_qual", "pha"])
            .with_max_categories(3, 3)
    }

    /// OCONUS training exercise.
    pub fn oconus_training() -> Self {
        Self::new("OCONUS_Training")
            .with_training(&["weapons_qual", "pha", "sere"])
            .with_min_dwell(6)
    }

    /// Full deployment readiness.
    pub fn combat_deployment() -> Self {
        Self::new("Combat_Deployment")
            .with_training(&["weapons_qual", "pha", "sere"])
            .with_min_dwell(12)
            .with_max_deployments(4)
    }

    /// Pacific theater exercise.
    pub fn pacific_exercise() -> Self {
        Self::new("Pacific_Exercise")
            .with_training(&["weapons_qual", "pha", "sere"])
            .with_min_dwell(6)
    }

    /// Evaluates one soldier.
    ///
    /// Deployability and dwell come from the pool record; categories,
    /// training, equipment, and deployment history are only checked when
    /// an extended record is supplied.
    pub fn evaluate(
        &self,
        soldier: &Soldier,
        record: Option<&ReadinessRecord>,
        as_of: NaiveDate,
    ) -> ReadinessVerdict {
        let mut v = ReadinessVerdict::default();

        if soldier.deployable {
            v.passes.push("Deployable".into());
        } else {
            v.failures.push("Non-deployable status".into());
        }

        if soldier.dwell_months >= self.min_dwell_months {
            v.passes.push(format!("Dwell: {} months", soldier.dwell_months));
        } else {
            v.failures.push(format!(
                "Dwell: {} months < {} required",
                soldier.dwell_months, self.min_dwell_months
            ));
        }

        let Some(record) = record else {
            return v;
        };

        if record.medical_category <= self.max_medical_category {
            v.passes.push(format!("Medical: C{}", record.medical_category));
        } else {
            v.failures.push(format!(
                "Medical: C{} exceeds max C{}",
                record.medical_category, self.max_medical_category
            ));
        }
        if record.dental_category <= self.max_dental_category {
            v.passes.push(format!("Dental: C{}", record.dental_category));
        } else {
            v.failures.push(format!(
                "Dental: C{} exceeds max C{}",
                record.dental_category, self.max_dental_category
            ));
        }

        for name in &self.required_training {
            match record.training.get(name) {
                Some(gate) if gate.is_current(as_of) => {
                    v.passes.push(format!("Training: {name} current"))
                }
                Some(gate) => v.failures.push(format!(
                    "Training: {name} expired {}",
                    gate.expires()
                )),
                None => v.failures.push(format!("Training: {name} not completed")),
            }
        }

        for eq in &self.required_equipment {
            let qualified = record
                .equipment
                .iter()
                .any(|q| &q.equipment_type == eq && q.is_valid(as_of));
            if qualified {
                v.passes.push(format!("Equipment: {eq} qualified"));
            } else {
                v.failures
                    .push(format!("Equipment: {eq} not qualified or expired"));
            }
        }

        if let Some(max) = self.max_deployment_count {
            if record.deployment_count <= max {
                v.passes
                    .push(format!("Deployments: {}/{max}", record.deployment_count));
            } else {
                v.failures.push(format!(
                    "Deployments: {} exceeds max {max}",
                    record.deployment_count
                ));
            }
        }

        v
    }
}

/// Result of a readiness evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadinessVerdict {
    pub passes: Vec<String>,
    pub failures: Vec<String>,
}

impl ReadinessVerdict {
    pub fn is_ready(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Readiness collaborator: a profile plus per-soldier records.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadinessContext {
    pub profile: ReadinessProfile,
    pub records: HashMap<SoldierId, ReadinessRecord>,
    /// Evaluation date for currency checks.
    pub as_of: NaiveDate,
}

impl ReadinessContext {
    pub fn new(profile: ReadinessProfile, as_of: NaiveDate) -> Self {
        Self {
            profile,
            records: HashMap::new(),
            as_of,
        }
    }

    pub fn with_record(mut self, record: ReadinessRecord) -> Self {
        self.records.insert(record.soldier_id, record);
        self
    }

    pub fn with_records(mut self, records: impl IntoIterator<Item = ReadinessRecord>) -> Self {
        self.records
            .extend(records.into_iter().map(|r| (r.soldier_id, r)));
        self
    }

    pub fn evaluate(&self, soldier: &Soldier) -> ReadinessVerdict {
        self.profile
            .evaluate(soldier, self.records.get(&soldier.id), self.as_of)
    }
}

/// Readiness-gate penalty pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadinessPass;

impl PenaltyPass for ReadinessPass {
    fn name(&self) -> &'static str {
        "readiness"
    }

    fn apply(&self, matrix: &mut CostMatrix, ctx: &PassContext<'_>) -> PassReport {
        let Some(readiness) = ctx.readiness else {
            return PassReport::skipped(self.name(), "no readiness context");
        };
        if readiness.records.is_empty() {
            return PassReport::skipped(self.name(), "no readiness records");
        }

        let penalty = ctx.policy.get(keys::READINESS_FAILURE);
        let bonus = ctx.policy.get(keys::TRAINING_CURRENCY_BONUS);
        let mut missing = 0;

        for (i, soldier) in ctx.soldiers.iter().enumerate() {
            let record = readiness.records.get(&soldier.id);
            if record.is_none() {
                missing += 1;
            }
            let verdict = readiness.profile.evaluate(soldier, record, readiness.as_of);
            if !verdict.is_ready() {
                matrix.add_to_row(i, penalty * verdict.failures.len() as f64);
            } else if record.is_some_and(|r| r.all_training_current(readiness.as_of)) {
                matrix.add_to_row(i, bonus);
            }
        }

        PassReport::applied(self.name(), missing)
    }
}
