// File: src/validators/mod.rs
// Purpose: Validator base contract and the tagged set of validation rules

mod active;
mod captcha;
mod compare;
mod custom;
mod data_type;
mod list;
mod pattern;
mod range;
mod required;

pub use active::ActiveCustomRule;
pub use captcha::CaptchaRule;
pub use compare::{CompareOperator, CompareRule};
pub use custom::CustomRule;
pub use data_type::DataTypeRule;
pub use list::ListControlRule;
pub use pattern::{RegexRule, EMAIL_PATTERN};
pub use range::{RangeRule, RangeType};
pub use required::RequiredFieldRule;

use crate::binding::{Document, Element, ListOption};
use crate::convert::ConversionFormat;
use crate::coordinator::PageContext;
use crate::error::{RemoteError, Result};
use crate::options::{ControlType, Display, ValidatorEvent, ValidatorHooks, ValidatorOptions};
use crate::remote::{RemoteFailurePolicy, RemoteRequest, RemoteSlot, StaleResultPolicy};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Rule evaluated by a validator, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ValidatorKind {
    RequiredField(RequiredFieldRule),
    Compare(CompareRule),
    Range(RangeRule),
    RegularExpression(RegexRule),
    EmailAddress(RegexRule),
    Custom(CustomRule),
    ActiveCustom(ActiveCustomRule),
    ListControl(ListControlRule),
    DataType(DataTypeRule),
    Captcha(CaptchaRule),
}

impl ValidatorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValidatorKind::RequiredField(_) => "RequiredField",
            ValidatorKind::Compare(_) => "Compare",
            ValidatorKind::Range(_) => "Range",
            ValidatorKind::RegularExpression(_) => "RegularExpression",
            ValidatorKind::EmailAddress(_) => "EmailAddress",
            ValidatorKind::Custom(_) => "Custom",
            ValidatorKind::ActiveCustom(_) => "ActiveCustom",
            ValidatorKind::ListControl(_) => "ListControl",
            ValidatorKind::DataType(_) => "DataType",
            ValidatorKind::Captcha(_) => "Captcha",
        }
    }

    /// Value a list control reports when nothing else is selected
    fn initial_value(&self) -> &str {
        match self {
            ValidatorKind::RequiredField(rule) => &rule.initial_value,
            _ => "",
        }
    }

    /// Compile patterns and fill variant defaults
    fn prepare(&mut self, validator_id: &str) -> Result<()> {
        match self {
            ValidatorKind::RegularExpression(rule) => rule.compile(validator_id),
            ValidatorKind::EmailAddress(rule) => {
                if rule.validation_expression.is_empty() {
                    rule.validation_expression = EMAIL_PATTERN.to_string();
                }
                rule.compile(validator_id)
            }
            _ => Ok(()),
        }
    }
}

/// Everything needed to construct a validator: common options plus its rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    #[serde(flatten)]
    pub options: ValidatorOptions,
    #[serde(flatten)]
    pub kind: ValidatorKind,
}

impl ValidatorConfig {
    pub fn new(options: ValidatorOptions, kind: ValidatorKind) -> Self {
        Self { options, kind }
    }
}

/// Validity of the last evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validity {
    /// Never evaluated; counts as valid
    #[default]
    Unknown,
    Valid,
    Invalid,
}

impl Validity {
    pub fn is_valid(self) -> bool {
        self != Validity::Invalid
    }
}

impl From<bool> for Validity {
    fn from(valid: bool) -> Self {
        if valid {
            Validity::Valid
        } else {
            Validity::Invalid
        }
    }
}

/// What a rule sees while evaluating
pub(crate) struct RuleContext<'a> {
    pub options: &'a ValidatorOptions,
    pub control: &'a Element,
    pub page: &'a PageContext,
    pub initial_value: &'a str,
}

impl<'a> RuleContext<'a> {
    pub fn document(&self) -> &dyn Document {
        self.page.document()
    }

    pub fn format(&self) -> ConversionFormat {
        self.page.conversion_format(self.options)
    }

    /// Value of the validated control
    pub fn validation_value(&self) -> String {
        self.value_of(self.control)
    }

    /// Value of `element` according to the configured control type
    pub fn value_of(&self, element: &Element) -> String {
        let grouped = self
            .options
            .group_name
            .as_deref()
            .is_some_and(|name| !name.is_empty());

        match self.options.control_type {
            ControlType::RadioButton if grouped => self.radio_group_value(element),
            control_type if control_type.is_list() => self.first_selected_list_value(),
            _ => element.value().trim().to_string(),
        }
    }

    /// Checkbox/radio items or select options of a list control
    pub fn list_items(&self) -> Vec<ListOption> {
        let control_id = &self.options.control_to_validate;
        match self.options.control_type {
            ControlType::CheckBoxList | ControlType::RadioButtonList => (0..self.options.total_items)
                .filter_map(|i| self.document().element(&format!("{}_c{}", control_id, i)))
                .filter(|element| element.kind().is_check_box())
                .map(|element| ListOption::new(element.value(), element.is_checked()))
                .collect(),
            ControlType::ListBox => self
                .document()
                .element(control_id)
                .filter(|element| element.kind().is_select())
                .map(|element| element.options())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn radio_group_value(&self, element: &Element) -> String {
        let Some(name) = element.name() else {
            return String::new();
        };
        self.document()
            .elements_by_name(&name)
            .iter()
            .filter(|radio| radio.is_checked())
            .last()
            .map(|radio| radio.value())
            .unwrap_or_default()
    }

    fn first_selected_list_value(&self) -> String {
        let initial = self.initial_value;
        self.list_items()
            .into_iter()
            .find(|item| item.selected && item.value != initial)
            .map(|item| item.value)
            .unwrap_or_else(|| initial.to_string())
    }
}

enum Outcome {
    Ready(bool),
    Compared { valid: bool, comparee: Option<Element> },
    Remote { parameter: String, event_target: String },
}

/// One validated input bound to a message element.
///
/// Created once per declared validator; every validation pass mutates its
/// validity and visibility.
pub struct Validator {
    options: ValidatorOptions,
    kind: ValidatorKind,
    page: Rc<PageContext>,
    control: Option<Element>,
    message: Element,
    validity: Validity,
    visible: bool,
    observing: HashSet<String>,
    remote: RemoteSlot,
    hooks: ValidatorHooks,
}

impl Validator {
    /// Bind a validator to its control and message element.
    ///
    /// Returns `Ok(None)` when either element is missing from the document;
    /// such validators are never registered.
    pub fn new(config: ValidatorConfig, page: Rc<PageContext>) -> Result<Option<Self>> {
        let ValidatorConfig { options, mut kind } = config;

        let control = page.document().element(&options.control_to_validate);
        let message = page.document().element(&options.id);
        let (Some(control), Some(message)) = (control, message) else {
            debug!(
                validator = %options.id,
                control = %options.control_to_validate,
                "Control or message element missing, validator skipped"
            );
            return Ok(None);
        };

        kind.prepare(&options.id)?;

        Ok(Some(Self {
            options,
            kind,
            page,
            control: Some(control),
            message,
            validity: Validity::Unknown,
            visible: false,
            observing: HashSet::new(),
            remote: RemoteSlot::default(),
            hooks: ValidatorHooks::default(),
        }))
    }

    pub fn with_hooks(mut self, hooks: ValidatorHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn set_hooks(&mut self, hooks: ValidatorHooks) {
        self.hooks = hooks;
    }

    pub fn id(&self) -> &str {
        &self.options.id
    }

    pub fn form_id(&self) -> &str {
        &self.options.form_id
    }

    pub fn group(&self) -> Option<&str> {
        self.options.group_id()
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    pub fn kind(&self) -> &ValidatorKind {
        &self.kind
    }

    pub fn page(&self) -> &Rc<PageContext> {
        &self.page
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub fn is_valid(&self) -> bool {
        self.validity.is_valid()
    }

    /// Whether the message has been updated since the last hide
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.options.enabled = enabled;
    }

    pub fn error_message(&self) -> &str {
        &self.options.error_message
    }

    /// Replace the error message and write it into the message element
    pub fn set_error_message(&mut self, message: impl Into<String>) {
        self.options.error_message = message.into();
        self.message.set_content(&self.options.error_message);
    }

    /// True if change events of `element_id` re-run this validator
    pub fn is_observing(&self, element_id: &str) -> bool {
        self.observing.contains(element_id)
    }

    /// A remote check has been dispatched and not answered yet
    pub fn has_pending_request(&self) -> bool {
        self.remote.is_in_flight()
    }

    /// Evaluate the rule, refresh the display and start observing the control
    pub fn validate(&mut self, invoker: Option<&str>) -> bool {
        let Some(control) = self.resolve_control() else {
            self.validity = Validity::Valid;
            return true;
        };
        if control.is_disabled() {
            self.validity = Validity::Valid;
            return true;
        }

        if !self.remote.is_in_flight() {
            if let Some(hook) = self.hooks.on_validate.clone() {
                hook(&self.event(invoker));
            }
        }

        self.validity = if self.options.enabled {
            self.evaluate(&control)
        } else {
            Validity::Valid
        };

        self.update_validation_display(invoker);
        self.observe_changes(&control);

        self.is_valid()
    }

    /// Mark valid and refresh the display
    pub fn reset(&mut self) {
        self.validity = Validity::Valid;
        self.update_control();
    }

    /// Reset, then mark the message as not shown
    pub fn hide(&mut self) {
        self.reset();
        self.visible = false;
    }

    /// Move input focus to the configured focus target
    pub fn focus(&self) {
        let target = self.options.focus_target();
        match self.page.document().element(target) {
            Some(element) => element.focus(),
            None => debug!(validator = %self.options.id, target, "Focus target not found"),
        }
    }

    /// Hand out the queued remote request, if any
    pub fn take_remote_request(&mut self) -> Option<RemoteRequest> {
        self.remote.take_queued()
    }

    /// Apply the answer of a remote check.
    ///
    /// Returns true when validity or display changed as a result.
    pub fn complete_remote(&mut self, ticket: u64, outcome: Result<bool, RemoteError>) -> bool {
        if !self.remote.complete(ticket) {
            debug!(validator = %self.options.id, ticket, "Ignoring result of superseded request");
            return false;
        }

        let stale_results = self.page.settings().stale_results;
        let remote_failure = self.page.settings().remote_failure;
        match outcome {
            Ok(valid) => {
                if stale_results == StaleResultPolicy::Discard {
                    let current = self.current_value();
                    if current.as_deref() != self.remote.validating_value() {
                        debug!(validator = %self.options.id, "Discarding stale remote result");
                        self.remote.forget_value();
                        return false;
                    }
                }

                self.validity = Validity::from(valid);
                if let Some(hook) = self.hooks.on_remote_success.clone() {
                    hook(&self.event(None));
                }
                self.update_validation_display(None);
                true
            }
            Err(err) => {
                warn!(validator = %self.options.id, error = %err, "Remote validation failed");
                self.remote.forget_value();

                let invalidate = remote_failure == RemoteFailurePolicy::MarkInvalid;
                if invalidate {
                    self.validity = Validity::Invalid;
                }
                if let Some(hook) = self.hooks.on_remote_failure.clone() {
                    hook(&self.event(None));
                }
                if invalidate {
                    self.update_validation_display(None);
                }
                invalidate
            }
        }
    }

    fn event<'a>(&'a self, invoker: Option<&'a str>) -> ValidatorEvent<'a> {
        ValidatorEvent {
            validator_id: &self.options.id,
            is_valid: self.is_valid(),
            invoker,
        }
    }

    /// Re-resolve the control if it was never bound or has left the document
    fn resolve_control(&mut self) -> Option<Element> {
        let bound = self
            .control
            .as_ref()
            .filter(|control| control.is_attached())
            .cloned();
        if bound.is_none() {
            self.control = self
                .page
                .document()
                .element(&self.options.control_to_validate);
        }
        self.control.clone()
    }

    fn current_value(&self) -> Option<String> {
        let control = self.control.as_ref()?;
        let ctx = RuleContext {
            options: &self.options,
            control,
            page: &self.page,
            initial_value: self.kind.initial_value(),
        };
        Some(ctx.validation_value())
    }

    fn evaluate(&mut self, control: &Element) -> Validity {
        let outcome = {
            let ctx = RuleContext {
                options: &self.options,
                control,
                page: &self.page,
                initial_value: self.kind.initial_value(),
            };
            match &self.kind {
                ValidatorKind::RequiredField(rule) => Outcome::Ready(rule.is_valid(&ctx)),
                ValidatorKind::Compare(rule) => {
                    let (valid, comparee) = rule.evaluate(&ctx);
                    Outcome::Compared { valid, comparee }
                }
                ValidatorKind::Range(rule) => Outcome::Ready(rule.is_valid(&ctx)),
                ValidatorKind::RegularExpression(rule) | ValidatorKind::EmailAddress(rule) => {
                    Outcome::Ready(rule.is_valid(&ctx))
                }
                ValidatorKind::Custom(rule) => Outcome::Ready(rule.is_valid(&ctx)),
                ValidatorKind::ActiveCustom(rule) => Outcome::Remote {
                    parameter: ctx.validation_value(),
                    event_target: rule.event_target(&self.options.id).to_string(),
                },
                ValidatorKind::ListControl(rule) => Outcome::Ready(rule.is_valid(&ctx)),
                ValidatorKind::DataType(rule) => Outcome::Ready(rule.is_valid(&ctx)),
                ValidatorKind::Captcha(rule) => Outcome::Ready(rule.is_valid(&ctx)),
            }
        };

        match outcome {
            Outcome::Ready(valid) => Validity::from(valid),
            Outcome::Compared { valid, comparee } => {
                if let Some(comparee) = comparee {
                    self.toggle_css_class(&comparee, valid);
                    self.observe_changes(&comparee);
                }
                Validity::from(valid)
            }
            Outcome::Remote {
                parameter,
                event_target,
            } => self.dispatch_remote(parameter, event_target),
        }
    }

    /// Queue a remote check unless one is in flight or the value was already sent.
    /// Returns the validity held before the request, `Unknown` included.
    fn dispatch_remote(&mut self, parameter: String, event_target: String) -> Validity {
        if self.remote.should_dispatch(&parameter) {
            let request = RemoteRequest {
                form_id: self.options.form_id.clone(),
                validator_id: self.options.id.clone(),
                event_target,
                parameter,
                ticket: self.page.next_ticket(),
            };
            debug!(validator = %self.options.id, ticket = request.ticket, "Remote check dispatched");
            self.remote.dispatch(request);
        }
        self.validity
    }

    fn update_validation_display(&mut self, invoker: Option<&str>) {
        let hook = if self.is_valid() {
            self.hooks.on_success.clone()
        } else {
            self.hooks.on_error.clone()
        };

        match hook {
            Some(hook) => {
                if !self.remote.is_in_flight() {
                    self.refresh_control_and_message();
                    hook(&self.event(invoker));
                }
            }
            None => self.update_control(),
        }
    }

    fn update_control(&mut self) {
        self.refresh_control_and_message();
        self.visible = true;
    }

    fn refresh_control_and_message(&mut self) {
        self.visible = true;
        let valid = self.is_valid();

        match self.options.display {
            Display::Dynamic => self.message.set_displayed(!valid),
            Display::None => self.message.set_displayed(false),
            Display::Fixed => {}
        }
        self.message.set_visible(!valid);

        if let Some(control) = self.control.clone() {
            self.toggle_css_class(&control, valid);
        }
    }

    fn toggle_css_class(&self, element: &Element, valid: bool) {
        let Some(class) = self
            .options
            .control_css_class
            .as_deref()
            .filter(|class| !class.is_empty())
        else {
            return;
        };
        if valid {
            element.remove_class(class);
        } else {
            element.add_class(class);
        }
    }

    fn observe_changes(&mut self, element: &Element) {
        if !self.options.observe_changes {
            return;
        }
        if self.observing.insert(element.id()) {
            self.page.document().observe_changes(element);
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("id", &self.options.id)
            .field("kind", &self.kind.name())
            .field("validity", &self.validity)
            .field("visible", &self.visible)
            .field("hooks", &self.hooks)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Integer(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

/// Accept strings or bare numbers for textual rule options
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(String::from)
        .unwrap_or_default())
}

/// Optional variant of [`lenient_string`]; empty strings become `None`
pub(crate) fn lenient_opt_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(String::from)
        .filter(|s| !s.is_empty()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::Settings;
    use crate::memory::MemoryDocument;

    pub fn page(doc: &Rc<MemoryDocument>) -> Rc<PageContext> {
        Rc::new(PageContext::new(doc.clone(), Settings::default()))
    }

    /// Build a validator on `input1` with message `v1`
    pub fn validator(doc: &Rc<MemoryDocument>, kind: ValidatorKind) -> Validator {
        doc.message("v1");
        let options = ValidatorOptions::new("v1", "form1", "input1").error_message("Invalid");
        Validator::new(ValidatorConfig::new(options, kind), page(doc))
            .unwrap()
            .unwrap()
    }
}
