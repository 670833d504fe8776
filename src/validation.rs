//! Input validation for assignment problems.
//!
//! Checks structural integrity of the soldier and billet pools before any
//! cost is computed. Detects:
//! - Duplicate IDs
//! - Empty required fields (specialty)
//! - Paygrades and skill levels outside their scales
//! - Inverted billet rank bands
//!
//! Missing locations are not errors: the transfer table prices unknown
//! locations with its fallback cost.

use crate::models::{Billet, Soldier};
use std::collections::HashSet;

/// Highest enlisted paygrade.
pub const MAX_RANK: u8 = 9;
/// Highest skill level.
pub const MAX_SKILL_LEVEL: u8 = 5;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A required text field is empty.
    EmptyField,
    /// A paygrade or skill level lies outside its scale.
    OutOfRange,
    /// A billet's minimum rank exceeds its maximum rank.
    InvertedRankBand,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the soldier and billet pools.
///
/// Checks:
/// 1. No duplicate soldier IDs
/// 2. No duplicate billet IDs
/// 3. Every soldier and billet names a specialty
/// 4. Soldier paygrades in 1..=9 and skill levels in 1..=5
/// 5. Billet rank bands in 1..=9 with min ≤ max
///
/// Empty pools are valid.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_pools(soldiers: &[Soldier], billets: &[Billet]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut soldier_ids = HashSet::new();
    for s in soldiers {
        if !soldier_ids.insert(s.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate soldier ID: {}", s.id),
            ));
        }
        if s.specialty.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyField,
                format!("Soldier {} has no specialty", s.id),
            ));
        }
        if !(1..=MAX_RANK).contains(&s.rank) {
            errors.push(ValidationError::new(
                ValidationErrorKind::OutOfRange,
                format!("Soldier {} has paygrade {} outside 1..={MAX_RANK}", s.id, s.rank),
            ));
        }
        if !(1..=MAX_SKILL_LEVEL).contains(&s.skill_level) {
            errors.push(ValidationError::new(
                ValidationErrorKind::OutOfRange,
                format!(
                    "Soldier {} has skill level {} outside 1..={MAX_SKILL_LEVEL}",
                    s.id, s.skill_level
                ),
            ));
        }
    }

    let mut billet_ids = HashSet::new();
    for b in billets {
        if !billet_ids.insert(b.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate billet ID: {}", b.id),
            ));
        }
        if b.specialty.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyField,
                format!("Billet {} has no required specialty", b.id),
            ));
        }
        if !(1..=MAX_RANK).contains(&b.min_rank) || !(1..=MAX_RANK).contains(&b.max_rank) {
            errors.push(ValidationError::new(
                ValidationErrorKind::OutOfRange,
                format!(
                    "Billet {} has rank band E-{}..E-{} outside 1..={MAX_RANK}",
                    b.id, b.min_rank, b.max_rank
                ),
            ));
        }
        if b.min_rank > b.max_rank {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvertedRankBand,
                format!(
                    "Billet {} has min rank E-{} above max rank E-{}",
                    b.id, b.min_rank, b.max_rank
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_soldiers() -> Vec<Soldier> {
        vec![
            Soldier::new(1, "JBLM", 4, "11B"),
            Soldier::new(2, "FBNC", 5, "68W").with_skill(2),
        ]
    }

    fn sample_billets() -> Vec<Billet> {
        vec![
            Billet::new(101, "JBLM", "11B").with_rank_band(3, 5),
            Billet::new(102, "JBER", "68W"),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_pools(&sample_soldiers(), &sample_billets()).is_ok());
    }

    #[test]
    fn test_empty_pools_are_valid() {
        assert!(validate_pools(&[], &[]).is_ok());
    }

    #[test]
    fn test_duplicate_soldier_id() {
        let soldiers = vec![
            Soldier::new(1, "JBLM", 4, "11B"),
            Soldier::new(1, "FBNC", 4, "11B"),
        ];
        let errors = validate_pools(&soldiers, &sample_billets()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("soldier")));
    }

    #[test]
    fn test_duplicate_billet_id() {
        let billets = vec![Billet::new(7, "JBLM", "11B"), Billet::new(7, "JBLM", "11C")];
        let errors = validate_pools(&sample_soldiers(), &billets).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("billet")));
    }

    #[test]
    fn test_empty_specialty() {
        let soldiers = vec![Soldier::new(1, "JBLM", 4, "  ")];
        let errors = validate_pools(&soldiers, &[]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyField);
    }

    #[test]
    fn test_out_of_range_rank_and_skill() {
        let soldiers = vec![Soldier::new(1, "JBLM", 0, "11B").with_skill(7)];
        let errors = validate_pools(&soldiers, &[]).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::OutOfRange));
    }

    #[test]
    fn test_inverted_rank_band() {
        let billets = vec![Billet::new(1, "JBLM", "11B").with_rank_band(6, 4)];
        let errors = validate_pools(&[], &billets).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvertedRankBand));
    }

    #[test]
    fn test_multiple_errors() {
        let soldiers = vec![
            Soldier::new(1, "JBLM", 4, ""),
            Soldier::new(1, "JBLM", 4, "11B"),
        ];
        let billets = vec![Billet::new(1, "JBLM", "11B").with_rank_band(6, 4)];
        let errors = validate_pools(&soldiers, &billets).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
