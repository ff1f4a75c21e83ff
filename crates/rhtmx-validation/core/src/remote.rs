// File: src/remote.rs
// Purpose: Remote (callback) validation requests, transports and policies

use crate::error::RemoteError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A check an ActiveCustom validator asks the server to perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRequest {
    pub form_id: String,
    pub validator_id: String,
    /// Server-side control that handles the callback
    pub event_target: String,
    /// Value being validated
    pub parameter: String,
    /// Identifies the in-flight request; stale tickets are ignored
    pub ticket: u64,
}

/// Performs remote checks on behalf of the coordinator
#[async_trait(?Send)]
pub trait RemoteTransport {
    /// Ask the server whether `request.parameter` is valid
    async fn check(&self, request: &RemoteRequest) -> Result<bool, RemoteError>;
}

/// What to do with a result whose value no longer matches the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleResultPolicy {
    /// Apply the result anyway
    #[default]
    Accept,
    /// Drop it; the next pass dispatches the current value
    Discard,
}

/// What a transport failure does to validity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RemoteFailurePolicy {
    /// Validity stays as it was before the request
    #[default]
    #[serde(rename = "keep")]
    KeepPrevious,
    #[serde(rename = "invalidate")]
    MarkInvalid,
}

/// Interpret a callback response body as a validity outcome.
///
/// Accepts `true`/`false`, `1`/`0`, JSON booleans and `{"valid": bool}`.
pub fn parse_callback_response(body: &str) -> Result<bool, RemoteError> {
    let text = body.trim();
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" => return Ok(true),
        "false" | "0" | "" => return Ok(false),
        _ => {}
    }

    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Bool(valid)) => Ok(valid),
        Ok(serde_json::Value::Object(map)) => map
            .get("valid")
            .and_then(|v| v.as_bool())
            .ok_or_else(|| RemoteError::InvalidResponse(text.to_string())),
        _ => Err(RemoteError::InvalidResponse(text.to_string())),
    }
}

/// Single-slot request state of an ActiveCustom validator
#[derive(Debug, Default)]
pub(crate) struct RemoteSlot {
    in_flight: Option<u64>,
    /// Last value handed to the server
    validating_value: Option<String>,
    queued: Option<RemoteRequest>,
}

impl RemoteSlot {
    pub(crate) fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True when a request may go out for `value`
    pub(crate) fn should_dispatch(&self, value: &str) -> bool {
        !self.is_in_flight() && self.validating_value.as_deref() != Some(value)
    }

    pub(crate) fn dispatch(&mut self, request: RemoteRequest) {
        self.validating_value = Some(request.parameter.clone());
        self.in_flight = Some(request.ticket);
        self.queued = Some(request);
    }

    pub(crate) fn take_queued(&mut self) -> Option<RemoteRequest> {
        self.queued.take()
    }

    /// Close the slot if `ticket` is the in-flight request
    pub(crate) fn complete(&mut self, ticket: u64) -> bool {
        if self.in_flight != Some(ticket) {
            return false;
        }
        self.in_flight = None;
        self.queued = None;
        true
    }

    pub(crate) fn validating_value(&self) -> Option<&str> {
        self.validating_value.as_deref()
    }

    pub(crate) fn forget_value(&mut self) {
        self.validating_value = None;
    }
}

/// Transport answering from a fixed table keyed by validator id.
///
/// Used by the CLI and by tests; unknown validators fail with a transport error.
#[derive(Debug, Clone, Default)]
pub struct StaticTransport {
    answers: HashMap<String, bool>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, validator_id: impl Into<String>, valid: bool) -> Self {
        self.answers.insert(validator_id.into(), valid);
        self
    }
}

impl FromIterator<(String, bool)> for StaticTransport {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

#[async_trait(?Send)]
impl RemoteTransport for StaticTransport {
    async fn check(&self, request: &RemoteRequest) -> Result<bool, RemoteError> {
        self.answers
            .get(&request.validator_id)
            .copied()
            .ok_or_else(|| {
                RemoteError::Transport(format!("no answer for '{}'", request.validator_id))
            })
    }
}
