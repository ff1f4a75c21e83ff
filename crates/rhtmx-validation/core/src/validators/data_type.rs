// File: src/validators/data_type.rs
// Purpose: Data type rule

use super::RuleContext;
use crate::convert::DataType;
use serde::{Deserialize, Serialize};

/// Passes when the value converts to `data_type`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataTypeRule {
    pub data_type: DataType,
}

impl DataTypeRule {
    pub fn new(data_type: DataType) -> Self {
        Self { data_type }
    }

    pub(crate) fn is_valid(&self, ctx: &RuleContext<'_>) -> bool {
        let value = ctx.validation_value();
        value.is_empty() || self.data_type.convert(&value, &ctx.format()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use crate::options::ValidatorOptions;
    use crate::validators::test_support::{page, validator};
    use crate::validators::{Validator, ValidatorConfig, ValidatorKind};
    use rstest::rstest;
    use std::rc::Rc;

    #[rstest]
    #[case(DataType::Integer, "42", true)]
    #[case(DataType::Integer, "4.2", false)]
    #[case(DataType::Float, "4.2", true)]
    #[case(DataType::Float, "four", false)]
    #[case(DataType::Date, "2024-02-30", false)]
    #[case(DataType::Date, "2024-02-29", true)]
    #[case(DataType::String, "anything", true)]
    #[case(DataType::Integer, "", true)]
    fn test_data_type(#[case] data_type: DataType, #[case] value: &str, #[case] expected: bool) {
        let doc = Rc::new(MemoryDocument::new());
        doc.input("input1", value);
        let mut validator = validator(&doc, ValidatorKind::DataType(DataTypeRule::new(data_type)));
        assert_eq!(validator.validate(None), expected);
    }

    #[test]
    fn test_validator_date_format_override() {
        let doc = Rc::new(MemoryDocument::new());
        doc.input("input1", "29/02/2024");
        doc.message("v1");
        let mut options = ValidatorOptions::new("v1", "form1", "input1");
        options.date_format = Some("dd/MM/yyyy".to_string());
        let kind = ValidatorKind::DataType(DataTypeRule::new(DataType::Date));
        let mut validator = Validator::new(ValidatorConfig::new(options, kind), page(&doc))
            .unwrap()
            .unwrap();
        assert!(validator.validate(None));
    }
}
