//! Aggregate views over parsed time entries.
//!
//! Every function here is a pure function of a `&[TimeEntry]` slice: nothing is
//! mutated and empty input yields an empty, well-formed result.

pub mod area;
pub mod compare;
pub mod roles;
pub mod types;
pub mod utility;
pub mod weekly;

pub use area::{area_totals, site_welfare_split};
pub use compare::{comparison_stats, contractor_comparison};
pub use roles::role_distribution;
pub use types::*;
pub use weekly::{weekly_workforce, weekly_workforce_by_role, workforce_summary};
