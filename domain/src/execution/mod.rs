//! Per-execution state shared between the steps of one task.

pub mod context;
