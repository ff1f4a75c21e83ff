// File: src/validators/list.rs
// Purpose: List control rule (number and values of selections)

use super::RuleContext;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static REQUIRED_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*").unwrap());

/// Checks how many items of a list control are selected and which
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListControlRule {
    /// Comma separated values that must all be selected
    pub required: Option<String>,
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl ListControlRule {
    pub(crate) fn is_valid(&self, ctx: &RuleContext<'_>) -> bool {
        let items = ctx.list_items();
        if items.is_empty() {
            return true;
        }

        let values: Vec<&str> = items
            .iter()
            .filter(|item| item.selected)
            .map(|item| item.value.as_str())
            .collect();
        self.is_valid_list(values.len(), &values)
    }

    /// Values listed in `required`
    pub fn required_values(&self) -> Vec<&str> {
        match self.required.as_deref() {
            Some(required) if !required.is_empty() => REQUIRED_SEPARATOR.split(required).collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_valid_list(&self, checked: usize, values: &[&str]) -> bool {
        let required = self.required_values();
        if values.len() < required.len() {
            return false;
        }
        let exists = required.iter().all(|value| values.contains(value));

        exists
            && self.min.map_or(true, |min| checked >= min)
            && self.max.map_or(true, |max| checked <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{InputKind, ListOption};
    use crate::memory::MemoryDocument;
    use crate::options::{ControlType, ValidatorOptions};
    use crate::validators::test_support::page;
    use crate::validators::{Validator, ValidatorConfig, ValidatorKind};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn rule(required: Option<&str>, min: Option<usize>, max: Option<usize>) -> ListControlRule {
        ListControlRule {
            required: required.map(str::to_string),
            min,
            max,
        }
    }

    #[test]
    fn test_required_values_split() {
        let rule = rule(Some("red, green,blue"), None, None);
        assert_eq!(rule.required_values(), vec!["red", "green", "blue"]);
        assert!(ListControlRule::default().required_values().is_empty());
    }

    #[test]
    fn test_is_valid_list() {
        let rule = rule(Some("a, b"), Some(2), Some(3));
        assert!(rule.is_valid_list(2, &["a", "b"]));
        assert!(rule.is_valid_list(3, &["a", "c", "b"]));
        assert!(!rule.is_valid_list(1, &["a"]));
        assert!(!rule.is_valid_list(2, &["a", "c"]));
        assert!(!rule.is_valid_list(4, &["a", "b", "c", "d"]));
    }

    fn checkbox_list(doc: &Rc<MemoryDocument>, checked: &[bool]) {
        doc.insert("colors");
        for (i, &on) in checked.iter().enumerate() {
            let item = doc.input(format!("colors_c{}", i), format!("v{}", i));
            item.set_kind(InputKind::Checkbox);
            item.set_checked(on);
        }
        doc.message("v1");
    }

    fn list_validator(
        doc: &Rc<MemoryDocument>,
        control_type: ControlType,
        total_items: usize,
        rule: ListControlRule,
    ) -> Validator {
        let mut options = ValidatorOptions::new("v1", "form1", "colors").control_type(control_type);
        options.total_items = total_items;
        Validator::new(
            ValidatorConfig::new(options, ValidatorKind::ListControl(rule)),
            page(doc),
        )
        .unwrap()
        .unwrap()
    }

    #[test]
    fn test_checkbox_list_counts() {
        let doc = Rc::new(MemoryDocument::new());
        checkbox_list(&doc, &[true, false, true]);

        let mut at_least_two =
            list_validator(&doc, ControlType::CheckBoxList, 3, rule(None, Some(2), None));
        assert!(at_least_two.validate(None));

        let mut needs_v1 =
            list_validator(&doc, ControlType::CheckBoxList, 3, rule(Some("v1"), None, None));
        assert!(!needs_v1.validate(None));
    }

    #[test]
    fn test_items_beyond_total_are_ignored() {
        let doc = Rc::new(MemoryDocument::new());
        checkbox_list(&doc, &[true, true, true]);

        let mut at_most_one =
            list_validator(&doc, ControlType::CheckBoxList, 1, rule(None, None, Some(1)));
        assert!(at_most_one.validate(None));
    }

    #[test]
    fn test_empty_list_is_valid() {
        let doc = Rc::new(MemoryDocument::new());
        checkbox_list(&doc, &[]);
        let mut validator =
            list_validator(&doc, ControlType::CheckBoxList, 0, rule(None, Some(1), None));
        assert!(validator.validate(None));
    }

    #[test]
    fn test_list_box_options() {
        let doc = Rc::new(MemoryDocument::new());
        let select = doc.insert("colors");
        select.set_kind(InputKind::SelectMultiple);
        select.set_options(vec![
            ListOption::new("red", true),
            ListOption::new("green", false),
            ListOption::new("blue", true),
        ]);
        doc.message("v1");

        let mut validator = list_validator(
            &doc,
            ControlType::ListBox,
            0,
            rule(Some("red,blue"), None, Some(2)),
        );
        assert!(validator.validate(None));

        select.set_options(vec![ListOption::new("red", true)]);
        assert!(!validator.validate(None));
    }
}
