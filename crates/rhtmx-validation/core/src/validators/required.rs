// File: src/validators/required.rs
// Purpose: Required field rule

use super::RuleContext;
use crate::binding::InputKind;
use serde::{Deserialize, Serialize};

/// Fails while the value still equals `initial_value`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequiredFieldRule {
    #[serde(deserialize_with = "super::lenient_string")]
    pub initial_value: String,
}

impl RequiredFieldRule {
    pub fn new(initial_value: impl Into<String>) -> Self {
        Self {
            initial_value: initial_value.into(),
        }
    }

    pub(crate) fn is_valid(&self, ctx: &RuleContext<'_>) -> bool {
        // File inputs cannot be inspected
        if ctx.control.kind() == InputKind::File {
            return true;
        }
        ctx.validation_value() != self.initial_value.trim()
    }
}
