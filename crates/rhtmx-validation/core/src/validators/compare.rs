// File: src/validators/compare.rs
// Purpose: Compare rule (against another control or a constant)

use super::RuleContext;
use crate::binding::Element;
use crate::convert::{ConversionFormat, DataType};
use crate::value::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompareOperator {
    #[default]
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
}

impl CompareOperator {
    pub fn apply(self, left: &Value, right: &Value) -> bool {
        match self {
            CompareOperator::Equal => left == right,
            CompareOperator::NotEqual => left != right,
            CompareOperator::GreaterThan => left > right,
            CompareOperator::GreaterThanEqual => left >= right,
            CompareOperator::LessThan => left < right,
            CompareOperator::LessThanEqual => left <= right,
        }
    }
}

/// Compares the value with another control's value or with `value_to_compare`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareRule {
    pub control_to_compare: Option<String>,
    #[serde(deserialize_with = "super::lenient_opt_string")]
    pub value_to_compare: Option<String>,
    pub operator: CompareOperator,
    pub data_type: DataType,
}

impl CompareRule {
    pub fn with_value(value: impl Into<String>, operator: CompareOperator, data_type: DataType) -> Self {
        Self {
            control_to_compare: None,
            value_to_compare: Some(value.into()),
            operator,
            data_type,
        }
    }

    pub fn with_control(
        control: impl Into<String>,
        operator: CompareOperator,
        data_type: DataType,
    ) -> Self {
        Self {
            control_to_compare: Some(control.into()),
            value_to_compare: None,
            operator,
            data_type,
        }
    }

    /// Evaluate and hand back the comparee element when one is in use
    pub(crate) fn evaluate(&self, ctx: &RuleContext<'_>) -> (bool, Option<Element>) {
        let value = ctx.validation_value();
        if value.is_empty() {
            return (true, None);
        }

        let comparee = self
            .control_to_compare
            .as_deref()
            .filter(|id| !id.is_empty())
            .and_then(|id| ctx.document().element(id));
        let compare_to = match &comparee {
            Some(element) => ctx.value_of(element),
            None => self.value_to_compare.clone().unwrap_or_default(),
        };

        let valid = self.compare(&value, &compare_to, &ctx.format());
        (valid, comparee)
    }

    /// A left operand that does not convert fails; a right operand that does
    /// not convert passes.
    pub fn compare(&self, left: &str, right: &str, format: &ConversionFormat) -> bool {
        let Some(left) = self.data_type.convert(left, format) else {
            return false;
        };
        let Some(right) = self.data_type.convert(right, format) else {
            return true;
        };
        self.operator.apply(&left, &right)
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
    #[case("abc", "5", CompareOperator::Equal, DataType::Integer, false)]
    #[case("5", "abc", CompareOperator::Equal, DataType::Integer, true)]
    #[case("10", "5", CompareOperator::GreaterThan, DataType::Integer, true)]
    #[case("5", "10", CompareOperator::GreaterThan, DataType::Integer, false)]
    #[case("5", "5", CompareOperator::GreaterThanEqual, DataType::Integer, true)]
    #[case("5", "5", CompareOperator::NotEqual, DataType::Integer, false)]
    #[case("1.5", "2", CompareOperator::LessThan, DataType::Float, true)]
    #[case("2", "2.0", CompareOperator::LessThanEqual, DataType::Float, true)]
    #[case("2024-01-01", "2024-06-01", CompareOperator::LessThan, DataType::Date, true)]
    #[case("apple", "apple", CompareOperator::Equal, DataType::String, true)]
    #[case("apple", "banana", CompareOperator::GreaterThan, DataType::String, false)]
    fn test_compare(
        #[case] left: &str,
        #[case] right: &str,
        #[case] operator: CompareOperator,
        #[case] data_type: DataType,
        #[case] expected: bool,
    ) {
        let rule = CompareRule::with_value(right, operator, data_type);
        assert_eq!(
            rule.compare(left, right, &ConversionFormat::default()),
            expected
        );
    }

    #[test]
    fn test_empty_value_is_valid() {
        let doc = Rc::new(MemoryDocument::new());
        doc.input("input1", "  ");
        let mut validator = validator(
            &doc,
            ValidatorKind::Compare(CompareRule::with_value(
                "x",
                CompareOperator::Equal,
                DataType::String,
            )),
        );
        assert!(validator.validate(None));
    }

    #[test]
    fn test_compare_with_control() {
        let doc = Rc::new(MemoryDocument::new());
        doc.input("password", "secret");
        let confirm = doc.input("confirm", "secrte");
        doc.message("v1");

        let options = ValidatorOptions::new("v1", "form1", "confirm").css_class("mismatch");
        let kind = ValidatorKind::Compare(CompareRule::with_control(
            "password",
            CompareOperator::Equal,
            DataType::String,
        ));
        let mut validator = Validator::new(ValidatorConfig::new(options, kind), page(&doc))
            .unwrap()
            .unwrap();

        assert!(!validator.validate(None));
        assert!(doc.get("password").unwrap().has_class("mismatch"));
        assert!(validator.is_observing("password"));
        assert!(validator.is_observing("confirm"));

        confirm.set_value("secret");
        assert!(validator.validate(None));
        assert!(!doc.get("password").unwrap().has_class("mismatch"));
    }

    #[test]
    fn test_missing_comparee_uses_constant() {
        let doc = Rc::new(MemoryDocument::new());
        doc.input("input1", "7");
        let mut rule = CompareRule::with_value("7", CompareOperator::Equal, DataType::Integer);
        rule.control_to_compare = Some("missing".to_string());
        let mut validator = validator(&doc, ValidatorKind::Compare(rule));
        assert!(validator.validate(None));
    }
}
