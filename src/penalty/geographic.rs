//! Geographic penalties.
//!
//! Prices the trip from each soldier's home station to the exercise
//! location and adds it to the soldier's whole row:
//!
//! ```text
//! travel × geographic_cost_weight
//!   + lead_time_penalty_oconus        (OCONUS exercises)
//!   + same_theater_bonus              (same AOR, outside the home theater)
//!   + miles / 1000 × distance_penalty_per_1000mi
//! ```
//!
//! # Travel cost tiers
//!
//! | Distance | Transport |
//! |----------|-----------|
//! | < 500 mi | 150 + 0.67 / mi (ground) |
//! | < 3000 mi | 400 + 0.15 / mi (domestic flight) |
//! | otherwise | 1200 + 0.20 / mi (international flight) |
//!
//! Per diem is 150/day CONUS and 200/day OCONUS.
//!
//! # Reference
//! Sinnott (1984), "Virtues of the Haversine", Sky and Telescope 68(2)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{PassContext, PassReport, PenaltyPass};
use crate::cost::CostMatrix;
use crate::models::policy::keys;

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Area of responsibility that never earns the same-theater bonus.
pub const HOME_THEATER: &str = "NORTHCOM";

/// A named location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// ISO country code.
    pub country: String,
    /// Combatant command area of responsibility.
    pub aor: String,
}

impl GeoPoint {
    pub fn new(
        name: impl Into<String>,
        lat: f64,
        lon: f64,
        country: impl Into<String>,
        aor: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            country: country.into(),
            aor: aor.into(),
        }
    }
}

/// Great-circle distance in miles.
pub fn haversine_miles(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * h.sqrt().asin() * EARTH_RADIUS_MILES
}

/// Case-insensitive location lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationTable {
    points: HashMap<String, GeoPoint>,
}

impl LocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installations and exercise areas commonly used for sourcing.
    pub fn standard() -> Self {
        let us = |name: &str, lat, lon| GeoPoint::new(name, lat, lon, "US", HOME_THEATER);
        Self::new()
            .with("JBLM", us("Joint Base Lewis-McChord", 47.0979, -122.5811))
            .with("FBNC", us("Fort Bragg", 35.1391, -79.0066))
            .with("FHTX", us("Fort Hood", 31.1350, -97.7760))
            .with("FBGA", us("Fort Benning", 32.3543, -84.9486))
            .with("JBER", us("Joint Base Elmendorf-Richardson", 61.2500, -149.8067))
            .with("FCKY", us("Fort Campbell", 36.6584, -87.4592))
            .with("FCCO", us("Fort Carson", 38.7355, -104.7891))
            .with("FSGA", us("Fort Stewart", 31.8796, -81.6103))
            .with("FDNY", us("Fort Drum", 44.0447, -75.7537))
            .with("NTC", us("National Training Center", 35.2609, -116.6890))
            .with("JRTC", us("Joint Readiness Training Center", 31.0545, -93.2091))
            .with(
                "Schofield Barracks",
                GeoPoint::new("Schofield Barracks", 21.4966, -158.0640, "US", "INDOPACOM"),
            )
            .with(
                "Camp Humphreys",
                GeoPoint::new("Camp Humphreys", 36.9676, 127.0356, "KR", "INDOPACOM"),
            )
            .with(
                "Kadena AB",
                GeoPoint::new("Kadena Air Base", 26.3560, 127.7684, "JP", "INDOPACOM"),
            )
            .with(
                "Camp Zama",
                GeoPoint::new("Camp Zama", 35.5160, 139.3996, "JP", "INDOPACOM"),
            )
            .with(
                "Guam",
                GeoPoint::new("Andersen Air Force Base", 13.5840, 144.9301, "GU", "INDOPACOM"),
            )
            .with(
                "Darwin",
                GeoPoint::new("Robertson Barracks", -12.4262, 130.8845, "AU", "INDOPACOM"),
            )
            .with(
                "Grafenwoehr",
                GeoPoint::new("Grafenwoehr Training Area", 49.7167, 11.9167, "DE", "EUCOM"),
            )
            .with(
                "Hohenfels",
                GeoPoint::new("Hohenfels Training Area", 49.2133, 11.8353, "DE", "EUCOM"),
            )
            .with(
                "Poland",
                GeoPoint::new("Drawsko Pomorskie", 53.5333, 15.8167, "PL", "EUCOM"),
            )
            .with(
                "Kuwait",
                GeoPoint::new("Camp Arifjan", 29.0983, 48.0708, "KW", "CENTCOM"),
            )
            .with(
                "Djibouti",
                GeoPoint::new("Camp Lemonnier", 11.5450, 43.1597, "DJ", "AFRICOM"),
            )
            .with(
                "Honduras",
                GeoPoint::new("Soto Cano Air Base", 14.3828, -87.6217, "HN", "SOUTHCOM"),
            )
    }

    /// Adds or replaces a location under `key`.
    pub fn with(mut self, key: &str, point: GeoPoint) -> Self {
        self.points.insert(key.to_lowercase(), point);
        self
    }

    pub fn get(&self, key: &str) -> Option<&GeoPoint> {
        self.points.get(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Locations within one area of responsibility.
    pub fn in_aor<'a>(&'a self, aor: &'a str) -> impl Iterator<Item = &'a GeoPoint> + 'a {
        self.points.values().filter(move |p| p.aor == aor)
    }
}

/// Reporting bucket for a trip length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceCategory {
    Local,
    Regional,
    DomesticNear,
    DomesticFar,
    OconusNear,
    OconusFar,
}

impl DistanceCategory {
    pub fn from_miles(miles: f64) -> Self {
        match miles {
            m if m < 100.0 => Self::Local,
            m if m < 500.0 => Self::Regional,
            m if m < 1500.0 => Self::DomesticNear,
            m if m < 3000.0 => Self::DomesticFar,
            m if m < 7000.0 => Self::OconusNear,
            _ => Self::OconusFar,
        }
    }
}

/// Travel cost and lead-time estimates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TravelCostEstimator;

impl TravelCostEstimator {
    pub const GROUND_BASE: f64 = 150.0;
    pub const MILEAGE_RATE: f64 = 0.67;
    pub const DOMESTIC_FLIGHT_BASE: f64 = 400.0;
    pub const DOMESTIC_FLIGHT_PER_MILE: f64 = 0.15;
    pub const INTERNATIONAL_FLIGHT_BASE: f64 = 1200.0;
    pub const INTERNATIONAL_FLIGHT_PER_MILE: f64 = 0.20;
    pub const PER_DIEM_CONUS: f64 = 150.0;
    pub const PER_DIEM_OCONUS: f64 = 200.0;

    /// Transport plus per diem for a trip of `duration_days`.
    pub fn estimate(miles: f64, duration_days: u32, oconus: bool) -> f64 {
        let transport = if miles < 500.0 {
            Self::GROUND_BASE + miles * Self::MILEAGE_RATE
        } else if miles < 3000.0 {
            Self::DOMESTIC_FLIGHT_BASE + miles * Self::DOMESTIC_FLIGHT_PER_MILE
        } else {
            Self::INTERNATIONAL_FLIGHT_BASE + miles * Self::INTERNATIONAL_FLIGHT_PER_MILE
        };
        let per_diem = if oconus {
            Self::PER_DIEM_OCONUS
        } else {
            Self::PER_DIEM_CONUS
        };
        transport + f64::from(duration_days) * per_diem
    }

    /// Coordination lead time in days.
    pub fn lead_time_days(miles: f64, oconus: bool) -> u32 {
        match (oconus, miles) {
            (true, m) if m > 7000.0 => 28,
            (true, _) => 21,
            (false, m) if m > 2000.0 => 14,
            (false, m) if m > 500.0 => 7,
            _ => 3,
        }
    }
}

/// Geographic collaborator: where the exercise is and how long it runs.
#[derive(Debug, Clone, PartialEq)]
pub struct GeographicContext {
    pub locations: LocationTable,
    pub exercise_location: String,
    pub duration_days: u32,
    /// Overrides the OCONUS flag derived from the exercise country.
    pub oconus: Option<bool>,
}

impl GeographicContext {
    /// A 14-day exercise at `exercise_location`, using the standard table.
    pub fn new(exercise_location: impl Into<String>) -> Self {
        Self {
            locations: LocationTable::standard(),
            exercise_location: exercise_location.into(),
            duration_days: 14,
            oconus: None,
        }
    }

    pub fn with_locations(mut self, locations: LocationTable) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_duration(mut self, days: u32) -> Self {
        self.duration_days = days;
        self
    }

    pub fn with_oconus(mut self, oconus: bool) -> Self {
        self.oconus = Some(oconus);
        self
    }

    /// Whether the exercise is OCONUS: the explicit flag, else a non-US
    /// exercise country.
    pub fn is_oconus(&self, exercise: &GeoPoint) -> bool {
        self.oconus.unwrap_or(exercise.country != "US")
    }
}

/// Travel-distance penalty pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeographicPass;

impl PenaltyPass for GeographicPass {
    fn name(&self) -> &'static str {
        "geographic"
    }

    fn apply(&self, matrix: &mut CostMatrix, ctx: &PassContext<'_>) -> PassReport {
        let Some(geo) = ctx.geography else {
            return PassReport::skipped(self.name(), "no geographic context");
        };
        let Some(exercise) = geo.locations.get(&geo.exercise_location) else {
            tracing::warn!(location = %geo.exercise_location, "unknown exercise location");
            return PassReport::skipped(
                self.name(),
                format!("unknown exercise location '{}'", geo.exercise_location),
            );
        };

        let oconus = geo.is_oconus(exercise);
        let weight = ctx.policy.get(keys::GEOGRAPHIC_COST_WEIGHT);
        let lead = if oconus {
            ctx.policy.get(keys::OCONUS_LEAD_TIME)
        } else {
            0.0
        };
        let theater_bonus = ctx.policy.get(keys::SAME_THEATER_BONUS);
        let per_1000 = ctx.policy.get(keys::DISTANCE_PER_1000MI);
        let mut failures = 0;

        for (i, soldier) in ctx.soldiers.iter().enumerate() {
            let Some(home) = geo.locations.get(&soldier.location) else {
                tracing::debug!(soldier = soldier.id, location = %soldier.location, "home station not found");
                failures += 1;
                continue;
            };

            let miles = haversine_miles(home, exercise);
            let mut delta = TravelCostEstimator::estimate(miles, geo.duration_days, oconus) * weight;
            delta += lead;
            if home.aor == exercise.aor && home.aor != HOME_THEATER {
                delta += theater_bonus;
            }
            delta += miles / 1000.0 * per_1000;
            matrix.add_to_row(i, delta);
        }

        PassReport::applied(self.name(), failures)
    }
}
