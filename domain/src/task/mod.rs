//! Agent tasks: plans, lifecycle, outcomes and termination rules.

pub mod entities;
pub mod outcome;
pub mod plan;
pub mod termination;
