// File: src/validators/pattern.rs
// Purpose: Regular expression and email address rules

use super::RuleContext;
use crate::error::{Result, ValidationError};
use once_cell::unsync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default pattern of EmailAddress validators
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// The whole value must match `validation_expression`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegexRule {
    pub validation_expression: String,
    #[serde(skip)]
    compiled: OnceCell<Regex>,
}

impl PartialEq for RegexRule {
    fn eq(&self, other: &Self) -> bool {
        self.validation_expression == other.validation_expression
    }
}

impl RegexRule {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            validation_expression: expression.into(),
            compiled: OnceCell::new(),
        }
    }

    /// Rule using [`EMAIL_PATTERN`]
    pub fn email() -> Self {
        Self::new(EMAIL_PATTERN)
    }

    pub(crate) fn compile(&self, validator_id: &str) -> Result<()> {
        self.compiled
            .get_or_try_init(|| Regex::new(&self.validation_expression))
            .map_err(|source| ValidationError::InvalidPattern {
                validator: validator_id.to_string(),
                source,
            })?;
        Ok(())
    }

    pub(crate) fn is_valid(&self, ctx: &RuleContext<'_>) -> bool {
        self.matches(&ctx.validation_value())
    }

    /// Empty values pass; otherwise the first match must span the whole value
    pub fn matches(&self, value: &str) -> bool {
        if value.is_empty() {
            return true;
        }
        let Ok(regex) = self
            .compiled
            .get_or_try_init(|| Regex::new(&self.validation_expression))
        else {
            return false;
        };
        regex
            .find(value)
            .is_some_and(|m| m.start() == 0 && m.end() == value.len())
    }
}
