// File: src/validators/range.rs
// Purpose: Range rule for numbers, dates, strings and string lengths

use super::RuleContext;
use crate::convert::{parse_float, ConversionFormat, DataType};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Operand type of a range check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RangeType {
    Integer,
    #[serde(alias = "Double")]
    Float,
    Date,
    #[default]
    String,
    /// Bounds apply to the value's length
    StringLength,
}

impl RangeType {
    fn data_type(self) -> Option<DataType> {
        match self {
            RangeType::Integer => Some(DataType::Integer),
            RangeType::Float => Some(DataType::Float),
            RangeType::Date => Some(DataType::Date),
            RangeType::String => Some(DataType::String),
            RangeType::StringLength => None,
        }
    }
}

/// Checks the value lies between `min_value` and `max_value`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeRule {
    #[serde(deserialize_with = "super::lenient_opt_string")]
    pub min_value: Option<String>,
    #[serde(deserialize_with = "super::lenient_opt_string")]
    pub max_value: Option<String>,
    pub data_type: RangeType,
    /// Exclude the bounds themselves
    pub strict_comparison: bool,
}

impl RangeRule {
    pub fn new(data_type: RangeType, min: Option<&str>, max: Option<&str>) -> Self {
        Self {
            min_value: min.map(str::to_string),
            max_value: max.map(str::to_string),
            data_type,
            strict_comparison: false,
        }
    }

    pub(crate) fn is_valid(&self, ctx: &RuleContext<'_>) -> bool {
        self.check(&ctx.validation_value(), &ctx.format())
    }

    pub fn check(&self, value: &str, format: &ConversionFormat) -> bool {
        if value.is_empty() {
            return true;
        }

        let (value, min, max) = match self.data_type.data_type() {
            Some(data_type) => {
                let convert = |bound: &Option<String>| {
                    bound
                        .as_deref()
                        .and_then(|raw| data_type.convert(raw, format))
                };
                (
                    data_type.convert(value, format),
                    convert(&self.min_value),
                    convert(&self.max_value),
                )
            }
            None => {
                let length = value.encode_utf16().count() as f64;
                let bound = |raw: &Option<String>, fallback: f64| match raw.as_deref() {
                    Some(raw) => parse_float(raw, '.').unwrap_or(f64::NAN),
                    None => fallback,
                };
                (
                    Some(Value::Float(length)),
                    Some(Value::Float(bound(&self.min_value, 0.0))),
                    Some(Value::Float(bound(&self.max_value, f64::INFINITY))),
                )
            }
        };

        let Some(value) = value else {
            return false;
        };

        let mut valid = true;
        if let Some(min) = min {
            valid &= if self.strict_comparison {
                value > min
            } else {
                value >= min
            };
        }
        if let Some(max) = max {
            valid &= if self.strict_comparison {
                value < max
            } else {
                value <= max
            };
        }
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn check(rule: &RangeRule, value: &str) -> bool {
        rule.check(value, &ConversionFormat::default())
    }

    #[rstest]
    #[case("", RangeType::Integer, Some("1"), Some("10"), true)]
    #[case("15", RangeType::Integer, Some("1"), Some("10"), false)]
    #[case("10", RangeType::Integer, Some("1"), Some("10"), true)]
    #[case("x", RangeType::Integer, Some("1"), Some("10"), false)]
    #[case("5", RangeType::Integer, None, Some("10"), true)]
    #[case("abcd", RangeType::StringLength, Some("2"), Some("5"), true)]
    #[case("abcdef", RangeType::StringLength, Some("2"), Some("5"), false)]
    #[case("a", RangeType::StringLength, Some("2"), None, false)]
    #[case("1.5", RangeType::Float, Some("1"), Some("2"), true)]
    #[case("2024-03-01", RangeType::Date, Some("2024-01-01"), Some("2024-12-31"), true)]
    #[case("m", RangeType::String, Some("a"), Some("k"), false)]
    fn test_range(
        #[case] value: &str,
        #[case] data_type: RangeType,
        #[case] min: Option<&str>,
        #[case] max: Option<&str>,
        #[case] expected: bool,
    ) {
        let rule = RangeRule::new(data_type, min, max);
        assert_eq!(check(&rule, value), expected);
    }

    #[test]
    fn test_strict_comparison() {
        let mut rule = RangeRule::new(RangeType::Integer, Some("1"), Some("10"));
        assert!(check(&rule, "10"));

        rule.strict_comparison = true;
        assert!(!check(&rule, "10"));
        assert!(!check(&rule, "1"));
        assert!(check(&rule, "5"));
    }

    #[test]
    fn test_unconvertible_bound_is_ignored() {
        let rule = RangeRule::new(RangeType::Integer, Some("low"), Some("10"));
        assert!(check(&rule, "-50"));
    }

    #[test]
    fn test_string_length_counts_characters() {
        let rule = RangeRule::new(RangeType::StringLength, None, Some("3"));
        assert!(check(&rule, "héé"));
    }
}
