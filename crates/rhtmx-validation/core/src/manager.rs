// File: src/manager.rs
// Purpose: Per-form validation manager: groups, validation passes and summaries

use crate::error::{RemoteError, Result, ValidationError};
use crate::remote::RemoteRequest;
use crate::summary::Summary;
use crate::validators::Validator;
use tracing::debug;

/// Owns the validators and summaries of one form
#[derive(Debug)]
pub struct Manager {
    form_id: String,
    validators: Vec<Validator>,
    summaries: Vec<Summary>,
    groups: Vec<String>,
}

impl Manager {
    pub(crate) fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            validators: Vec::new(),
            summaries: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    /// Validators in registration order
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn summaries(&self) -> &[Summary] {
        &self.summaries
    }

    /// Groups declared by the registered validators, in order of appearance
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn validator(&self, id: &str) -> Option<&Validator> {
        self.validators.iter().find(|v| v.id() == id)
    }

    pub fn validator_mut(&mut self, id: &str) -> Option<&mut Validator> {
        self.validators.iter_mut().find(|v| v.id() == id)
    }

    pub fn summary_mut(&mut self, id: &str) -> Option<&mut Summary> {
        self.summaries.iter_mut().find(|s| s.id() == id)
    }

    pub fn add_validator(&mut self, validator: Validator) {
        if let Some(group) = validator.group() {
            if !self.groups.iter().any(|g| g == group) {
                self.groups.push(group.to_string());
            }
        }
        self.validators.push(validator);
    }

    pub fn add_summary(&mut self, summary: Summary) {
        self.summaries.push(summary);
    }

    /// Validate the validators of `group` (or the ungrouped ones).
    ///
    /// Every in-scope validator runs; validators outside the scope are hidden.
    pub fn validate(&mut self, group: Option<&str>, invoker: Option<&str>) -> bool {
        let group = normalize(group);
        let (in_scope, out_of_scope) = self.partition(group);
        debug!(
            form = %self.form_id,
            group = group.unwrap_or_default(),
            validators = in_scope.len(),
            "Validating"
        );

        let mut valid = true;
        for &index in &in_scope {
            valid &= self.validators[index].validate(invoker);
        }

        self.focus_on_error(&in_scope);
        for &index in &out_of_scope {
            self.validators[index].hide();
        }
        self.update_summary(group, true);

        valid
    }

    /// Current validity of the scope, without evaluating anything
    pub fn is_valid(&self, group: Option<&str>) -> bool {
        let (in_scope, _) = self.partition(normalize(group));
        in_scope.iter().all(|&index| self.validators[index].is_valid())
    }

    /// Mark every validator of the scope valid and refresh its summaries
    pub fn reset(&mut self, group: Option<&str>) {
        let group = normalize(group);
        let (in_scope, _) = self.partition(group);
        for &index in &in_scope {
            self.validators[index].reset();
        }
        self.update_summary(group, true);
    }

    /// In-scope validators that are currently invalid
    pub fn validators_with_error(&self, group: Option<&str>) -> Vec<&Validator> {
        let (in_scope, _) = self.partition(normalize(group));
        in_scope
            .into_iter()
            .map(|index| &self.validators[index])
            .filter(|validator| !validator.is_valid())
            .collect()
    }

    /// Push the scope's errors to matching summaries and hide the others
    pub fn update_summary(&mut self, group: Option<&str>, refresh: bool) {
        let group = normalize(group);
        let (in_scope, _) = self.partition(group);
        let errors: Vec<&Validator> = in_scope
            .into_iter()
            .map(|index| &self.validators[index])
            .filter(|validator| !validator.is_valid())
            .collect();

        for summary in &mut self.summaries {
            if summary.group() == group {
                summary.update_summary(&errors, refresh);
            } else {
                summary.hide_summary(&[]);
            }
        }
    }

    /// Re-run visible validators observing `element_id`.
    /// Returns the number of validators that ran.
    pub fn control_changed(&mut self, element_id: &str) -> usize {
        let affected: Vec<usize> = self
            .validators
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_visible() && v.is_observing(element_id))
            .map(|(index, _)| index)
            .collect();

        for &index in &affected {
            self.validators[index].validate(None);
            let group = self.validators[index].group().map(str::to_string);
            self.update_summary(group.as_deref(), false);
        }
        affected.len()
    }

    /// Drain requests queued by ActiveCustom validators
    pub fn take_remote_requests(&mut self) -> Vec<RemoteRequest> {
        self.validators
            .iter_mut()
            .filter_map(|validator| validator.take_remote_request())
            .collect()
    }

    /// Deliver a remote answer; refreshes the validator's summaries when applied
    pub fn complete_remote(
        &mut self,
        request: &RemoteRequest,
        outcome: std::result::Result<bool, RemoteError>,
    ) -> Result<bool> {
        let validator = self
            .validator_mut(&request.validator_id)
            .ok_or_else(|| ValidationError::UnknownValidator(request.validator_id.clone()))?;

        let applied = validator.complete_remote(request.ticket, outcome);
        if applied {
            let group = validator.group().map(str::to_string);
            self.update_summary(group.as_deref(), false);
        }
        Ok(applied)
    }

    /// Indices of (in scope, out of scope) validators.
    ///
    /// Grouped and ungrouped validators never share a pass; an unknown group
    /// selects nothing.
    fn partition(&self, group: Option<&str>) -> (Vec<usize>, Vec<usize>) {
        if let Some(group) = group {
            if !self.groups.iter().any(|g| g == group) {
                return (Vec::new(), Vec::new());
            }
        }
        (0..self.validators.len()).partition(|&index| self.validators[index].group() == group)
    }

    fn focus_on_error(&self, in_scope: &[usize]) {
        let first = in_scope
            .iter()
            .map(|&index| &self.validators[index])
            .find(|validator| !validator.is_valid() && validator.options().focus_on_error);
        if let Some(validator) = first {
            validator.focus();
        }
    }
}

fn normalize(group: Option<&str>) -> Option<&str> {
    group.filter(|g| !g.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use crate::options::ValidatorOptions;
    use crate::summary::SummaryOptions;
    use crate::validators::test_support::page;
    use crate::validators::{RequiredFieldRule, ValidatorConfig, ValidatorKind};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn add(
        manager: &mut Manager,
        doc: &Rc<MemoryDocument>,
        id: &str,
        value: &str,
        group: Option<&str>,
    ) {
        let control = format!("{}_input", id);
        doc.input(control.clone(), value);
        doc.message(id);
        let mut options =
            ValidatorOptions::new(id, "form1", control).error_message(format!("{} failed", id));
        options.validation_group = group.map(str::to_string);
        let kind = ValidatorKind::RequiredField(RequiredFieldRule::default());
        let validator = Validator::new(ValidatorConfig::new(options, kind), page(doc))
            .unwrap()
            .unwrap();
        manager.add_validator(validator);
    }

    fn ids(validators: Vec<&Validator>) -> Vec<String> {
        validators.iter().map(|v| v.id().to_string()).collect()
    }

    #[test]
    fn test_groups_are_recorded_once() {
        let doc = Rc::new(MemoryDocument::new());
        let mut manager = Manager::new("form1");
        add(&mut manager, &doc, "a", "", Some("g1"));
        add(&mut manager, &doc, "b", "", Some("g1"));
        add(&mut manager, &doc, "c", "", None);
        add(&mut manager, &doc, "d", "", Some("g2"));

        assert_eq!(manager.groups(), &["g1".to_string(), "g2".to_string()]);
    }

    #[test]
    fn test_partition_is_exclusive() {
        let doc = Rc::new(MemoryDocument::new());
        let mut manager = Manager::new("form1");
        add(&mut manager, &doc, "grouped", "", Some("g1"));
        add(&mut manager, &doc, "plain", "", None);

        assert!(!manager.validate(None, None));
        assert_eq!(ids(manager.validators_with_error(None)), vec!["plain"]);
        assert!(manager.validators_with_error(Some("g1")).is_empty());

        assert!(!manager.validate(Some("g1"), None));
        assert_eq!(ids(manager.validators_with_error(Some("g1"))), vec!["grouped"]);
        // The ungrouped validator was hidden and reset by the grouped pass
        assert!(manager.validators_with_error(None).is_empty());
    }

    #[test]
    fn test_unknown_group_selects_nothing() {
        let doc = Rc::new(MemoryDocument::new());
        let mut manager = Manager::new("form1");
        add(&mut manager, &doc, "a", "", Some("g1"));
        add(&mut manager, &doc, "b", "", None);

        assert!(manager.validate(Some("other"), None));
        assert!(manager.validators()[0].validity() == crate::validators::Validity::Unknown);
    }

    #[test]
    fn test_validate_runs_every_validator() {
        let doc = Rc::new(MemoryDocument::new());
        let mut manager = Manager::new("form1");
        add(&mut manager, &doc, "a", "", None);
        add(&mut manager, &doc, "b", "", None);

        assert!(!manager.validate(None, None));
        assert_eq!(ids(manager.validators_with_error(None)), vec!["a", "b"]);
    }

    #[test]
    fn test_focus_first_invalid() {
        let doc = Rc::new(MemoryDocument::new());
        let mut manager = Manager::new("form1");
        for (id, value) in [("a", "ok"), ("b", ""), ("c", "")] {
            let control = format!("{}_input", id);
            doc.input(control.clone(), value);
            doc.message(id);
            let options = ValidatorOptions::new(id, "form1", control).focus_on_error();
            let kind = ValidatorKind::RequiredField(RequiredFieldRule::default());
            manager.add_validator(
                Validator::new(ValidatorConfig::new(options, kind), page(&doc))
                    .unwrap()
                    .unwrap(),
            );
        }

        manager.validate(None, None);
        assert_eq!(doc.focused().as_deref(), Some("b_input"));
    }

    #[test]
    fn test_reset_then_is_valid() {
        let doc = Rc::new(MemoryDocument::new());
        let mut manager = Manager::new("form1");
        add(&mut manager, &doc, "a", "", None);
        manager.validate(None, None);
        assert!(!manager.is_valid(None));

        manager.reset(None);
        assert!(manager.is_valid(None));
        assert!(manager.validators().iter().all(|v| v.is_valid()));
    }

    #[test]
    fn test_update_summary_scoping() {
        let doc = Rc::new(MemoryDocument::new());
        let mut manager = Manager::new("form1");
        add(&mut manager, &doc, "a", "", Some("g2"));
        add(&mut manager, &doc, "b", "", None);
        doc.message("s_g1");
        doc.message("s_none");
        manager.add_summary(
            Summary::new(SummaryOptions::new("s_g1", "form1").group("g1"), page(&doc)).unwrap(),
        );
        manager.add_summary(Summary::new(SummaryOptions::new("s_none", "form1"), page(&doc)).unwrap());

        manager.validate(None, None);
        assert_eq!(doc.get("s_none").unwrap().content(), "<ul><li>b failed</li></ul>");
        assert!(!manager.summaries()[0].is_visible());

        manager.validate(Some("g2"), None);
        assert_eq!(doc.get("s_g1").unwrap().content(), "");
        assert!(!manager.summaries()[0].is_visible());
        assert!(!manager.summaries()[1].is_visible());
    }

    #[test]
    fn test_control_changed_only_visible() {
        let doc = Rc::new(MemoryDocument::new());
        let mut manager = Manager::new("form1");
        add(&mut manager, &doc, "a", "", None);

        // Not yet validated: not observing, nothing runs
        assert_eq!(manager.control_changed("a_input"), 0);

        manager.validate(None, None);
        doc.get("a_input").unwrap().set_value("filled");
        assert_eq!(manager.control_changed("a_input"), 1);
        assert!(manager.is_valid(None));
    }
}
