// File: src/validators/custom.rs
// Purpose: Custom rule delegating to a registered client function

use super::RuleContext;
use crate::functions::CustomContext;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomRule {
    /// Name of the function in the page's function registry
    pub client_validation_function: Option<String>,
}

impl CustomRule {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            client_validation_function: Some(function.into()),
        }
    }

    pub(crate) fn is_valid(&self, ctx: &RuleContext<'_>) -> bool {
        let Some(name) = self
            .client_validation_function
            .as_deref()
            .filter(|name| !name.is_empty())
        else {
            return true;
        };

        let Some(function) = ctx.page.function(name) else {
            warn!(
                validator = %ctx.options.id,
                function = name,
                "Client validation function is not registered"
            );
            return true;
        };

        let value = ctx.validation_value();
        function(&CustomContext {
            validator_id: &ctx.options.id,
            value: &value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use crate::validators::test_support::validator;
    use crate::validators::ValidatorKind;
    use std::rc::Rc;

    #[test]
    fn test_unset_function_is_valid() {
        let doc = Rc::new(MemoryDocument::new());
        doc.input("input1", "anything");
        let mut validator = validator(&doc, ValidatorKind::Custom(CustomRule::default()));
        assert!(validator.validate(None));
    }

    #[test]
    fn test_unregistered_function_is_valid() {
        let doc = Rc::new(MemoryDocument::new());
        doc.input("input1", "anything");
        let mut validator = validator(&doc, ValidatorKind::Custom(CustomRule::new("missing")));
        assert!(validator.validate(None));
    }

    #[test]
    fn test_registered_function_decides() {
        let doc = Rc::new(MemoryDocument::new());
        let input = doc.input("input1", " odd ");
        let mut validator = validator(&doc, ValidatorKind::Custom(CustomRule::new("isEven")));
        validator.page().register_function("isEven", |ctx| {
            ctx.value.parse::<i64>().map(|n| n % 2 == 0).unwrap_or(false)
        });

        assert!(!validator.validate(None));
        input.set_value("4");
        assert!(validator.validate(None));
    }
}
