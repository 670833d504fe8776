//! Manning domain models.
//!
//! Provides the core data types for representing a personnel-to-demand
//! assignment problem and its solution.
//!
//! # Domain Mappings
//!
//! | u-manning | Exercise planning | Generic assignment |
//! |-----------|-------------------|--------------------|
//! | Soldier | Service member | Worker / agent |
//! | Billet | Manning requirement | Job / slot |
//! | PolicySet | Sourcing guidance | Objective weights |
//! | Assignment | Fill decision | Matching edge |

mod assignment;
mod billet;
mod mission;
pub mod policy;
mod soldier;

pub use assignment::{Assignment, AssignmentResult, AssignmentRow, AssignmentSummary};
pub use billet::{Billet, BilletId, Priority};
pub use mission::MissionProfile;
pub use policy::{PolicySet, DEFAULT_POLICY};
pub use soldier::{parse_paygrade, Clearance, Soldier, SoldierId};
