//! Negotiation threads.
//!
//! A thread is the long-lived conversation between one user and one
//! counterparty. Its message log is append-only, and the negotiation state
//! (latest offer, offer history) is always derived from that log on demand.

pub mod counterparty;
pub mod entities;
pub mod offer;
pub mod state;
