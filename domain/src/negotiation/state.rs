//! Derived negotiation state.

use super::entities::ThreadMessage;
use super::offer::Offer;
use serde::{Deserialize, Serialize};

/// Snapshot of a thread's offers, computed from its message log.
///
/// Never stored. `history` lists every identifiable offer, newest first, and
/// `last_offer` is its head.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadState {
    pub last_offer: Option<Offer>,
    pub history: Vec<Offer>,
}

impl ThreadState {
    /// Scan the messages most recent first and collect their offers.
    ///
    /// The input order does not matter; messages are ordered by their
    /// append sequence.
    pub fn from_messages(messages: &[ThreadMessage]) -> Self {
        let mut ordered: Vec<&ThreadMessage> = messages.iter().collect();
        ordered.sort_by(|a, b| ThreadMessage::chronological(b, a));

        let history: Vec<Offer> = ordered.into_iter().filter_map(Offer::from_message).collect();

        Self {
            last_offer: history.first().cloned(),
            history,
        }
    }

    /// The offer made before the latest one, if any.
    pub fn previous_offer(&self) -> Option<&Offer> {
        self.history.get(1)
    }
}
