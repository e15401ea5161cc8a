//! Task and negotiation thread stores.
//!
//! Both stores implement [`TaskStore`](dealflow_application::TaskStore) and
//! [`ThreadStore`](dealflow_application::ThreadStore) over the same state,
//! which enforces one thread per `(user, counterparty)`.

mod json_file;
mod memory;
mod state;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;
