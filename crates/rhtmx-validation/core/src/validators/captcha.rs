// File: src/validators/captcha.rs
// Purpose: Captcha rule comparing a checksum with the server token hash

use super::RuleContext;
use serde::{Deserialize, Serialize};

/// Advisory check; the server must still verify the captcha
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptchaRule {
    pub token_hash: u64,
}

impl CaptchaRule {
    pub fn new(token_hash: u64) -> Self {
        Self { token_hash }
    }

    pub(crate) fn is_valid(&self, ctx: &RuleContext<'_>) -> bool {
        checksum(&ctx.validation_value()) == self.token_hash
    }
}

/// Sum of the UTF-16 code units of `value`
pub fn checksum(value: &str) -> u64 {
    value.encode_utf16().map(u64::from).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use crate::validators::test_support::validator;
    use crate::validators::ValidatorKind;
    use std::rc::Rc;

    #[test]
    fn test_checksum() {
        assert_eq!(checksum(""), 0);
        assert_eq!(checksum("AB"), 65 + 66);
        assert_eq!(checksum("é"), 0xE9);
    }

    #[test]
    fn test_captcha() {
        let doc = Rc::new(MemoryDocument::new());
        let input = doc.input("input1", " abc ");
        let mut validator = validator(&doc, ValidatorKind::Captcha(CaptchaRule::new(294)));

        assert!(validator.validate(None));
        input.set_value("abd");
        assert!(!validator.validate(None));
    }
}
