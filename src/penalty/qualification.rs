//! Qualification matching.
//!
//! Billets may carry extended [`QualificationRequirements`] (education,
//! languages, ASI/SQI codes, badges, licenses, experience, fitness) and
//! soldiers an extended [`QualificationProfile`]. A [`RequirementScorer`]
//! turns one (profile, requirements) pair into a cost adjustment that the
//! pass adds cell by cell.
//!
//! The default [`PolicyRequirementScorer`] charges each missed requirement
//! its policy penalty scaled by the billet's criticality multiplier, credits
//! each preferred qualification held, and grants the perfect-match bonus
//! when nothing required is missing.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::sync::Arc;

use super::{PassContext, PassReport, PenaltyPass};
use crate::cost::CostMatrix;
use crate::models::policy::keys;
use crate::models::{BilletId, PolicySet, SoldierId};

/// Highest civilian education completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EducationLevel {
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

/// Language proficiency on the ILR scale (0–5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSkill {
    pub code: String,
    pub level: u8,
}

impl LanguageSkill {
    pub fn new(code: impl Into<String>, level: u8) -> Self {
        Self {
            code: code.into(),
            level,
        }
    }
}

/// Extended qualifications of one soldier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualificationProfile {
    pub education: Option<EducationLevel>,
    pub languages: Vec<LanguageSkill>,
    pub asi_codes: BTreeSet<String>,
    pub sqi_codes: BTreeSet<String>,
    pub badges: BTreeSet<String>,
    pub licenses: BTreeSet<String>,
    pub awards: BTreeSet<String>,
    pub deployments: u32,
    pub combat_deployments: u32,
    /// Theaters served in (AOR names).
    pub theaters: BTreeSet<String>,
    /// Leadership tier (0 = none, 1 = team leader, 2 = squad leader, ...).
    pub leadership_level: u8,
    pub time_in_service_months: u32,
    pub time_in_grade_months: u32,
    pub acft_score: Option<u32>,
    pub weapons_qual: Option<u32>,
    pub medical_category: u8,
    pub dental_category: u8,
}

impl QualificationProfile {
    pub fn new() -> Self {
        Self {
            medical_category: 1,
            dental_category: 1,
            ..Self::default()
        }
    }

    pub fn with_education(mut self, level: EducationLevel) -> Self {
        self.education = Some(level);
        self
    }

    pub fn with_language(mut self, code: &str, level: u8) -> Self {
        self.languages.push(LanguageSkill::new(code, level));
        self
    }

    pub fn with_asi(mut self, code: &str) -> Self {
        self.asi_codes.insert(code.to_string());
        self
    }

    pub fn with_sqi(mut self, code: &str) -> Self {
        self.sqi_codes.insert(code.to_string());
        self
    }

    pub fn with_badge(mut self, code: &str) -> Self {
        self.badges.insert(code.to_string());
        self
    }

    pub fn with_license(mut self, code: &str) -> Self {
        self.licenses.insert(code.to_string());
        self
    }

    pub fn with_deployments(mut self, total: u32, combat: u32) -> Self {
        self.deployments = total;
        self.combat_deployments = combat;
        self
    }

    pub fn with_theater(mut self, aor: &str) -> Self {
        self.theaters.insert(aor.to_string());
        self
    }

    pub fn with_leadership(mut self, level: u8) -> Self {
        self.leadership_level = level;
        self
    }

    pub fn with_fitness(mut self, acft: u32, weapons: u32) -> Self {
        self.acft_score = Some(acft);
        self.weapons_qual = Some(weapons);
        self
    }

    fn language_level(&self, code: &str) -> u8 {
        self.languages
            .iter()
            .filter(|l| l.code == code)
            .map(|l| l.level)
            .max()
            .unwrap_or(0)
    }
}

/// Extended requirements of one billet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualificationRequirements {
    pub min_education: Option<EducationLevel>,
    pub preferred_education: Option<EducationLevel>,
    pub languages_required: Vec<LanguageSkill>,
    pub asi_required: BTreeSet<String>,
    pub asi_preferred: BTreeSet<String>,
    pub sqi_required: BTreeSet<String>,
    pub sqi_preferred: BTreeSet<String>,
    pub badges_required: BTreeSet<String>,
    pub badges_preferred: BTreeSet<String>,
    pub licenses_required: BTreeSet<String>,
    pub licenses_preferred: BTreeSet<String>,
    pub awards_required: BTreeSet<String>,
    pub awards_preferred: BTreeSet<String>,
    pub min_deployments: u32,
    pub combat_experience_required: bool,
    pub combat_experience_preferred: bool,
    pub theater_required: Option<String>,
    pub min_leadership_level: u8,
    pub min_time_in_service_months: u32,
    pub min_time_in_grade_months: u32,
    pub min_acft_score: Option<u32>,
    pub min_weapons_qual: Option<u32>,
    pub max_medical_category: u8,
    pub max_dental_category: u8,
    /// 1 = low, 2 = medium, 3 = high, 4 = critical.
    pub criticality: u8,
}

impl Default for QualificationRequirements {
    fn default() -> Self {
        Self {
            min_education: None,
            preferred_education: None,
            languages_required: Vec::new(),
            asi_required: BTreeSet::new(),
            asi_preferred: BTreeSet::new(),
            sqi_required: BTreeSet::new(),
            sqi_preferred: BTreeSet::new(),
            badges_required: BTreeSet::new(),
            badges_preferred: BTreeSet::new(),
            licenses_required: BTreeSet::new(),
            licenses_preferred: BTreeSet::new(),
            awards_required: BTreeSet::new(),
            awards_preferred: BTreeSet::new(),
            min_deployments: 0,
            combat_experience_required: false,
            combat_experience_preferred: false,
            theater_required: None,
            min_leadership_level: 0,
            min_time_in_service_months: 0,
            min_time_in_grade_months: 0,
            min_acft_score: None,
            min_weapons_qual: None,
            max_medical_category: 2,
            max_dental_category: 2,
            criticality: 2,
        }
    }
}

impl QualificationRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_criticality(mut self, level: u8) -> Self {
        self.criticality = level.clamp(1, 4);
        self
    }

    pub fn with_min_education(mut self, level: EducationLevel) -> Self {
        self.min_education = Some(level);
        self
    }

    pub fn with_language(mut self, code: &str, level: u8) -> Self {
        self.languages_required.push(LanguageSkill::new(code, level));
        self
    }

    pub fn require_asi(mut self, code: &str) -> Self {
        self.asi_required.insert(code.to_string());
        self
    }

    pub fn prefer_asi(mut self, code: &str) -> Self {
        self.asi_preferred.insert(code.to_string());
        self
    }

    pub fn require_sqi(mut self, code: &str) -> Self {
        self.sqi_required.insert(code.to_string());
        self
    }

    pub fn require_badge(mut self, code: &str) -> Self {
        self.badges_required.insert(code.to_string());
        self
    }

    pub fn prefer_badge(mut self, code: &str) -> Self {
        self.badges_preferred.insert(code.to_string());
        self
    }

    pub fn require_license(mut self, code: &str) -> Self {
        self.licenses_required.insert(code.to_string());
        self
    }

    pub fn with_min_deployments(mut self, count: u32) -> Self {
        self.min_deployments = count;
        self
    }

    pub fn require_combat_experience(mut self) -> Self {
        self.combat_experience_required = true;
        self
    }

    pub fn with_min_leadership(mut self, level: u8) -> Self {
        self.min_leadership_level = level;
        self
    }

    pub fn with_min_fitness(mut self, acft: u32, weapons: u32) -> Self {
        self.min_acft_score = Some(acft);
        self.min_weapons_qual = Some(weapons);
        self
    }

    /// Whether anything beyond the default fitness ceilings is demanded or preferred.
    pub fn has_extended(&self) -> bool {
        self.min_education.is_some()
            || self.preferred_education.is_some()
            || !self.languages_required.is_empty()
            || !self.asi_required.is_empty()
            || !self.asi_preferred.is_empty()
            || !self.sqi_required.is_empty()
            || !self.sqi_preferred.is_empty()
            || !self.badges_required.is_empty()
            || !self.badges_preferred.is_empty()
            || !self.licenses_required.is_empty()
            || !self.licenses_preferred.is_empty()
            || !self.awards_required.is_empty()
            || !self.awards_preferred.is_empty()
            || self.min_deployments > 0
            || self.combat_experience_required
            || self.combat_experience_preferred
            || self.theater_required.is_some()
            || self.min_leadership_level > 0
            || self.min_time_in_service_months > 0
            || self.min_time_in_grade_months > 0
            || self.min_acft_score.is_some()
            || self.min_weapons_qual.is_some()
    }
}

/// Computes the cost adjustment of one soldier against one billet's requirements.
pub trait RequirementScorer: Send + Sync + Debug {
    /// Positive = penalty, negative = bonus.
    fn score(
        &self,
        profile: &QualificationProfile,
        requirements: &QualificationRequirements,
        policy: &PolicySet,
    ) -> f64;
}

/// Policy-weighted requirement scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyRequirementScorer;

fn criticality_multiplier(policy: &PolicySet, criticality: u8) -> f64 {
    match criticality {
        0 | 1 => policy.get(keys::CRITICALITY_MULT_LOW),
        2 => policy.get(keys::CRITICALITY_MULT_MED),
        3 => policy.get(keys::CRITICALITY_MULT_HIGH),
        _ => policy.get(keys::CRITICALITY_MULT_CRITICAL),
    }
}

fn missing(required: &BTreeSet<String>, held: &BTreeSet<String>) -> usize {
    required.difference(held).count()
}

fn held(preferred: &BTreeSet<String>, held: &BTreeSet<String>) -> usize {
    preferred.intersection(held).count()
}

impl RequirementScorer for PolicyRequirementScorer {
    fn score(
        &self,
        p: &QualificationProfile,
        r: &QualificationRequirements,
        policy: &PolicySet,
    ) -> f64 {
        let mult = criticality_multiplier(policy, r.criticality);
        // (penalty key, number of misses)
        let mut misses: Vec<(&str, usize)> = vec![
            (keys::ASI_MISSING, missing(&r.asi_required, &p.asi_codes)),
            (keys::SQI_MISSING, missing(&r.sqi_required, &p.sqi_codes)),
            (keys::BADGE_MISSING, missing(&r.badges_required, &p.badges)),
            (keys::LICENSE_MISSING, missing(&r.licenses_required, &p.licenses)),
            (keys::AWARD_MISSING, missing(&r.awards_required, &p.awards)),
        ];

        if let Some(min) = r.min_education {
            misses.push((keys::EDUCATION_SHORT, usize::from(p.education < Some(min))));
        }
        let lang_short = r
            .languages_required
            .iter()
            .filter(|req| p.language_level(&req.code) < req.level)
            .count();
        misses.push((keys::LANGUAGE_PROF_SHORT, lang_short));
        misses.push((
            keys::DEPLOYMENT_SHORT,
            usize::from(p.deployments < r.min_deployments),
        ));
        misses.push((
            keys::COMBAT_EXPERIENCE_MISSING,
            usize::from(r.combat_experience_required && p.combat_deployments == 0),
        ));
        if let Some(theater) = &r.theater_required {
            misses.push((
                keys::THEATER_EXPERIENCE_MISSING,
                usize::from(!p.theaters.contains(theater)),
            ));
        }
        misses.push((
            keys::LEADERSHIP_SHORT,
            usize::from(p.leadership_level < r.min_leadership_level),
        ));
        misses.push((
            keys::TIS_SHORT,
            usize::from(p.time_in_service_months < r.min_time_in_service_months),
        ));
        misses.push((
            keys::TIG_SHORT,
            usize::from(p.time_in_grade_months < r.min_time_in_grade_months),
        ));
        if let Some(min) = r.min_acft_score {
            misses.push((keys::ACFT_SHORT, usize::from(p.acft_score.unwrap_or(0) < min)));
        }
        if let Some(min) = r.min_weapons_qual {
            misses.push((
                keys::WEAPONS_QUAL_SHORT,
                usize::from(p.weapons_qual.unwrap_or(0) < min),
            ));
        }
        misses.push((
            keys::MEDICAL_CATEGORY,
            usize::from(p.medical_category > r.max_medical_category),
        ));
        misses.push((
            keys::DENTAL_CATEGORY,
            usize::from(p.dental_category > r.max_dental_category),
        ));

        let mut total_misses = 0;
        let mut cost = 0.0;
        for (key, n) in misses {
            if n > 0 {
                total_misses += n;
                cost += policy.get(key) * n as f64 * mult;
            }
        }

        let bonuses = [
            (keys::ASI_PREFERRED_BONUS, held(&r.asi_preferred, &p.asi_codes)),
            (keys::SQI_PREFERRED_BONUS, held(&r.sqi_preferred, &p.sqi_codes)),
            (keys::BADGE_PREFERRED_BONUS, held(&r.badges_preferred, &p.badges)),
            (keys::LICENSE_PREFERRED_BONUS, held(&r.licenses_preferred, &p.licenses)),
            (keys::AWARD_PREFERRED_BONUS, held(&r.awards_preferred, &p.awards)),
            (
                keys::EDUCATION_PREFERRED_BONUS,
                usize::from(r.preferred_education.is_some() && p.education >= r.preferred_education),
            ),
            (
                keys::LANGUAGE_PROF_BONUS,
                r.languages_required
                    .iter()
                    .filter(|req| p.language_level(&req.code) > req.level)
                    .count(),
            ),
            (
                keys::COMBAT_EXPERIENCE_BONUS,
                usize::from(r.combat_experience_preferred && p.combat_deployments > 0),
            ),
        ];
        for (key, n) in bonuses {
            cost += policy.get(key) * n as f64;
        }

        if total_misses == 0 && r.has_extended() {
            cost += policy.get(keys::PERFECT_MATCH_BONUS);
        }

        cost * policy.get(keys::QUALIFICATION_WEIGHT)
    }
}

/// Qualification collaborator: extended records keyed by pool id.
#[derive(Debug, Clone)]
pub struct QualificationContext {
    pub profiles: HashMap<SoldierId, QualificationProfile>,
    pub requirements: HashMap<BilletId, QualificationRequirements>,
    scorer: Arc<dyn RequirementScorer>,
}

impl Default for QualificationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl QualificationContext {
    /// An empty context scored by [`PolicyRequirementScorer`].
    pub fn new() -> Self {
        Self {
            profiles: HashMap::new(),
            requirements: HashMap::new(),
            scorer: Arc::new(PolicyRequirementScorer),
        }
    }

    pub fn with_scorer<S: RequirementScorer + 'static>(mut self, scorer: S) -> Self {
        self.scorer = Arc::new(scorer);
        self
    }

    pub fn with_profile(mut self, soldier: SoldierId, profile: QualificationProfile) -> Self {
        self.profiles.insert(soldier, profile);
        self
    }

    pub fn with_requirements(mut self, billet: BilletId, requirements: QualificationRequirements) -> Self {
        self.requirements.insert(billet, requirements);
        self
    }

    pub fn scorer(&self) -> &dyn RequirementScorer {
        self.scorer.as_ref()
    }
}

/// Per-cell qualification pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualificationPass;

impl PenaltyPass for QualificationPass {
    fn name(&self) -> &'static str {
        "qualification"
    }

    fn apply(&self, matrix: &mut CostMatrix, ctx: &PassContext<'_>) -> PassReport {
        let Some(quals) = ctx.qualifications else {
            return PassReport::skipped(self.name(), "no qualification context");
        };
        if quals.profiles.is_empty() || quals.requirements.is_empty() {
            return PassReport::skipped(self.name(), "pools lack extended qualification fields");
        }

        // Columns with requirements, resolved once.
        let columns: Vec<(usize, &QualificationRequirements)> = ctx
            .billets
            .iter()
            .enumerate()
            .filter_map(|(j, b)| quals.requirements.get(&b.id).map(|r| (j, r)))
            .collect();

        let mut failures = 0;
        for (i, soldier) in ctx.soldiers.iter().enumerate() {
            let Some(profile) = quals.profiles.get(&soldier.id) else {
                failures += 1;
                continue;
            };
            for &(j, req) in &columns {
                matrix.add(i, j, quals.scorer.score(profile, req, ctx.policy));
            }
        }

        PassReport::applied(self.name(), failures)
    }
}
