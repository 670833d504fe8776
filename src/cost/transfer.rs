//! Location-transfer cost table.
//!
//! Symmetric location × location cost lookup. Costs are derived from a
//! mileage table (`flat + rate × miles`) or set explicitly per pair.
//! Same-location transfers are free; unlisted pairs fall back to a default.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Flat cost per transfer (USD).
pub const FLAT_TRANSFER_COST: f64 = 600.0;
/// Cost per mile (USD).
pub const RATE_PER_MILE: f64 = 0.6;
/// Mileage assumed for pairs missing from a distance table.
pub const DEFAULT_MILES: f64 = 2000.0;
/// Cost used when a pair is not listed at all.
pub const DEFAULT_TRANSFER_COST: f64 = 2000.0;

/// Symmetric transfer cost table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferCostTable {
    costs: HashMap<String, f64>,
    default_cost: f64,
}

impl Default for TransferCostTable {
    fn default() -> Self {
        Self::new()
    }
}

fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}|{b}")
    } else {
        format!("{b}|{a}")
    }
}

impl TransferCostTable {
    /// Creates an empty table with the standard fallback cost.
    pub fn new() -> Self {
        Self {
            costs: HashMap::new(),
            default_cost: DEFAULT_TRANSFER_COST,
        }
    }

    /// Creates a table with every pair free (useful for same-theater runs).
    pub fn free() -> Self {
        Self {
            costs: HashMap::new(),
            default_cost: 0.0,
        }
    }

    /// Builds costs for every pair of `locations` from a mileage table.
    ///
    /// Pairs absent from `miles` are priced at [`DEFAULT_MILES`].
    pub fn from_distances(locations: &[&str], miles: &[(&str, &str, f64)]) -> Self {
        let distances: HashMap<String, f64> = miles
            .iter()
            .map(|(a, b, m)| (pair_key(a, b), *m))
            .collect();

        let mut table = Self::new();
        for (i, a) in locations.iter().enumerate() {
            for b in &locations[i + 1..] {
                let key = pair_key(a, b);
                let m = distances.get(&key).copied().unwrap_or(DEFAULT_MILES);
                table
                    .costs
                    .insert(key, (FLAT_TRANSFER_COST + RATE_PER_MILE * m).trunc());
            }
        }
        table
    }

    /// Standard CONUS installation table.
    pub fn conus() -> Self {
        Self::from_distances(
            &["FBNC", "JBLM", "JBER", "FHTX", "FBGA"],
            &[
                ("FBNC", "FHTX", 1300.0),
                ("FBNC", "FBGA", 350.0),
                ("FBNC", "JBLM", 2800.0),
                ("FBNC", "JBER", 4300.0),
                ("FHTX", "FBGA", 800.0),
                ("FHTX", "JBLM", 2100.0),
                ("FHTX", "JBER", 3900.0),
                ("FBGA", "JBLM", 2700.0),
                ("FBGA", "JBER", 4200.0),
                ("JBLM", "JBER", 2300.0),
            ],
        )
    }

    /// Sets the cost of one pair (both directions).
    pub fn with_cost(mut self, a: &str, b: &str, cost: f64) -> Self {
        self.costs.insert(pair_key(a, b), cost);
        self
    }

    /// Sets the fallback cost for unlisted pairs.
    pub fn with_default_cost(mut self, cost: f64) -> Self {
        self.default_cost = cost;
        self
    }

    /// Transfer cost from `from` to `to`.
    pub fn cost(&self, from: &str, to: &str) -> f64 {
        if from == to {
            return 0.0;
        }
        self.costs
            .get(&pair_key(from, to))
            .copied()
            .unwrap_or(self.default_cost)
    }

    /// Whether the pair is explicitly listed.
    pub fn contains(&self, a: &str, b: &str) -> bool {
        a == b || self.costs.contains_key(&pair_key(a, b))
    }
}
