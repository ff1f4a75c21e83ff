// File: src/validators/active.rs
// Purpose: ActiveCustom rule checked by a server callback

use serde::{Deserialize, Serialize};

/// Remote rule. Evaluation queues a request and keeps the prior validity
/// until the answer arrives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveCustomRule {
    /// Server control handling the callback, defaults to the validator id
    pub event_target: Option<String>,
}

impl ActiveCustomRule {
    pub fn new(event_target: impl Into<String>) -> Self {
        Self {
            event_target: Some(event_target.into()),
        }
    }

    pub(crate) fn event_target<'a>(&'a self, validator_id: &'a str) -> &'a str {
        self.event_target
            .as_deref()
            .filter(|target| !target.is_empty())
            .unwrap_or(validator_id)
    }
}
