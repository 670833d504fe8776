//! Mission profiles: per-mission cost biases.
//!
//! Each component is independently optional; an empty profile contributes
//! nothing to the pair cost.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Billet, Soldier};

/// Mission-specific bias terms added to the pair cost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionProfile {
    /// Bias keyed by billet location (negative favours filling there).
    #[serde(default)]
    pub location_bias: HashMap<String, f64>,
    /// Bonus keyed by billet specialty, applied when the soldier holds it.
    #[serde(default)]
    pub specialty_bonus: HashMap<String, f64>,
    /// Bias applied to airborne-qualified soldiers (0 = off).
    #[serde(default)]
    pub airborne_bias: f64,
    /// Bias keyed by the soldier's language.
    #[serde(default)]
    pub language_bonus: HashMap<String, f64>,
}

impl MissionProfile {
    /// Creates an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a location bias.
    pub fn with_location_bias(mut self, location: impl Into<String>, bias: f64) -> Self {
        self.location_bias.insert(location.into(), bias);
        self
    }

    /// Adds a specialty bonus.
    pub fn with_specialty_bonus(mut self, specialty: impl Into<String>, bonus: f64) -> Self {
        self.specialty_bonus.insert(specialty.into(), bonus);
        self
    }

    /// Sets the airborne bias.
    pub fn with_airborne_bias(mut self, bias: f64) -> Self {
        self.airborne_bias = bias;
        self
    }

    /// Adds a language bonus.
    pub fn with_language_bonus(mut self, language: impl Into<String>, bonus: f64) -> Self {
        self.language_bonus.insert(language.into(), bonus);
        self
    }

    /// Total bias for a soldier/billet pair.
    pub fn adjustment(&self, soldier: &Soldier, billet: &Billet) -> f64 {
        let mut adj = 0.0;
        if let Some(b) = self.location_bias.get(&billet.location) {
            adj += b;
        }
        if soldier.specialty == billet.specialty {
            if let Some(b) = self.specialty_bonus.get(&billet.specialty) {
                adj += b;
            }
        }
        if self.airborne_bias != 0.0 && soldier.airborne {
            adj += self.airborne_bias;
        }
        if let Some(lang) = &soldier.language {
            if let Some(b) = self.language_bonus.get(lang) {
                adj += b;
            }
        }
        adj
    }

    /// Whether the profile contributes nothing.
    pub fn is_neutral(&self) -> bool {
        self.location_bias.is_empty()
            && self.specialty_bonus.is_empty()
            && self.airborne_bias == 0.0
            && self.language_bonus.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_profile_is_neutral() {
        let p = MissionProfile::new();
        let s = Soldier::new(1, "JBER", 4, "11B").with_airborne(true);
        let b = Billet::new(101, "JBER", "11B");
        assert!(p.is_neutral());
        assert_eq!(p.adjustment(&s, &b), 0.0);
    }

    #[test]
    fn test_each_component() {
        let p = MissionProfile::new()
            .with_location_bias("JBER", -100.0)
            .with_specialty_bonus("68W", -250.0)
            .with_airborne_bias(-50.0)
            .with_language_bonus("Arabic", -200.0);

        let medic = Soldier::new(1, "FBNC", 4, "68W")
            .with_airborne(true)
            .with_language("Arabic");
        let b = Billet::new(101, "JBER", "68W");
        assert!((p.adjustment(&medic, &b) - (-600.0)).abs() < 1e-10);

        // Specialty bonus requires the soldier to hold the specialty
        let rifleman = Soldier::new(2, "FBNC", 4, "11B");
        assert!((p.adjustment(&rifleman, &b) - (-100.0)).abs() < 1e-10);
    }
}
