//! Domain layer for dealflow
//!
//! This crate contains the core business types and rules of the agent task
//! engine. It has no dependencies on persistence, configuration or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Tasks and plans
//!
//! A [`Task`] carries a [`Plan`] of named action steps and a starting context.
//! The engine runs the steps in order against one mutable
//! [`ExecutionContext`] and records a [`TaskOutcome`].
//!
//! ## Termination rules
//!
//! [`evaluate_termination`] matches `(action, result)` pairs against the fixed
//! rule table and classifies early exits as `needs_review` or `no_action`.
//!
//! ## Negotiation threads
//!
//! A [`NegotiationThread`] is the conversation with one counterparty. Its
//! [`ThreadState`] (latest offer, offer history) is always derived from the
//! message log.

pub mod core;
pub mod execution;
pub mod negotiation;
pub mod policy;
pub mod task;

// Re-export commonly used types
pub use core::{
    error::DomainError,
    id::{MessageId, TaskId, ThreadId, UserId},
};
pub use execution::context::{ExecutionContext, keys};
pub use negotiation::{
    counterparty::CounterpartyKey,
    entities::{MessageDirection, NegotiationThread, NewThreadMessage, ThreadMessage, ThreadStatus},
    offer::{Offer, ParsedAmount, normalise_currency, parse_amount},
    state::ThreadState,
};
pub use policy::{NegotiationPolicy, Policy};
pub use task::{
    entities::{Task, TaskInput, TaskStatus},
    outcome::{Annotation, AnnotationStatus, OutputEntry, StepResult, TaskOutcome, TerminationReason},
    plan::{Plan, Step, actions},
    termination::{TERMINATION_RULES, TerminationRule, evaluate_termination},
};
