//! Task organization and unit cohesion.
//!
//! Discovers organic teams (a team or squad leader plus direct
//! subordinates) from a supervisor forest, sources capability requirements
//! from intact teams where possible, and scores how well a sourcing
//! decision keeps teams together.
//!
//! Without personnel records every operation degrades to "no teams":
//! sourcing returns [`SourcingMethod::Individuals`] and adjustments are zero.
//!
//! # Usage
//!
//! ```
//! use u_manning::models::Soldier;
//! use u_manning::organizer::{LeadershipLevel, PersonnelRecord, SourcingMethod, TaskOrganizer};
//!
//! let soldiers = vec![
//!     Soldier::new(1, "JBLM", 6, "11B").with_unit("WAAA01"),
//!     Soldier::new(2, "JBLM", 4, "11B").with_unit("WAAA01"),
//! ];
//! let records = vec![
//!     PersonnelRecord::new(1, "WAAA01").with_leadership(LeadershipLevel::TeamLeader),
//!     PersonnelRecord::new(2, "WAAA01").with_supervisor(1),
//! ];
//! let organizer = TaskOrganizer::new(&soldiers, records);
//!
//! let first = organizer.source_capability("11B", 2, true, None);
//! assert_eq!(first.method, SourcingMethod::IntactTeam);
//! let second = organizer.source_capability("11B", 2, true, None);
//! assert_eq!(second.method, SourcingMethod::Individuals);
//! ```

mod cohesion;
mod hierarchy;
mod task_organizer;

pub use cohesion::{CohesionBreakdown, CohesionCalculator, INTACT_THRESHOLD};
pub use hierarchy::{
    discover_teams, Hierarchy, LeadershipLevel, OrganicTeam, PersonnelRecord, TeamType,
};
pub use task_organizer::{
    SourcingMethod, SourcingReport, SourcingResult, TaskOrganizer, UnitContribution,
    PARTIAL_COVERAGE, TEAM_PRESENCE_BONUS, TEAM_REMAINDER_PENALTY,
};
