//! Planning module for reconciliation.
//!
//! This module compares desired resources against live cluster state,
//! assembles ordered plans and applies them.

mod diff;
mod executor;
mod plan;
pub mod structural;

pub use diff::{Action, DiffEngine, DiffResult, Narrative, NarrativeLine};
pub use executor::{Applier, ApplyReport, ItemResult};
pub use plan::{Plan, PlanItem, Planner};
pub use structural::{Change, ChangeKind, ChangeTag};
