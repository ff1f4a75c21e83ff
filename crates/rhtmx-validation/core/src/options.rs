// File: src/options.rs
// Purpose: Options shared by every validator and validator hooks

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// How a validator message (or summary) reacts to validity changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Display {
    /// Never shown
    None,
    /// Space is reserved; only `visibility` toggles
    #[default]
    #[serde(alias = "Static")]
    Fixed,
    /// `display` toggles as well, so no space is reserved
    Dynamic,
}

/// The kind of control a validator reads its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlType {
    #[default]
    TextBox,
    /// Checkbox items `<id>_c0 .. <id>_c<total_items - 1>`
    CheckBoxList,
    /// Radio items `<id>_c0 .. <id>_c<total_items - 1>`
    RadioButtonList,
    /// Options of a select element
    ListBox,
    /// A radio button; with `group_name` the checked value of its group is used
    RadioButton,
}

impl ControlType {
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            ControlType::CheckBoxList | ControlType::RadioButtonList | ControlType::ListBox
        )
    }
}

/// Options recognized by every validator. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    /// Id of the message element; also the validator id
    pub id: String,
    pub form_id: String,
    pub control_to_validate: String,
    pub error_message: String,
    pub display: Display,
    pub focus_on_error: bool,
    /// Element focused on error, defaults to the validated control
    pub focus_element_id: Option<String>,
    pub validation_group: Option<String>,
    /// Class added to the control while invalid
    pub control_css_class: Option<String>,
    pub observe_changes: bool,
    pub enabled: bool,
    pub control_type: ControlType,
    pub total_items: usize,
    pub group_name: Option<String>,
    /// Overrides the page date format
    pub date_format: Option<String>,
    /// Overrides the page decimal separator
    pub decimal_char: Option<char>,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            id: String::new(),
            form_id: String::new(),
            control_to_validate: String::new(),
            error_message: String::new(),
            display: Display::default(),
            focus_on_error: false,
            focus_element_id: None,
            validation_group: None,
            control_css_class: None,
            observe_changes: true,
            enabled: true,
            control_type: ControlType::default(),
            total_items: 0,
            group_name: None,
            date_format: None,
            decimal_char: None,
        }
    }
}

impl ValidatorOptions {
    pub fn new(
        id: impl Into<String>,
        form_id: impl Into<String>,
        control_to_validate: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            form_id: form_id.into(),
            control_to_validate: control_to_validate.into(),
            ..Self::default()
        }
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.validation_group = Some(group.into());
        self
    }

    pub fn focus_on_error(mut self) -> Self {
        self.focus_on_error = true;
        self
    }

    pub fn css_class(mut self, class: impl Into<String>) -> Self {
        self.control_css_class = Some(class.into());
        self
    }

    pub fn display(mut self, display: Display) -> Self {
        self.display = display;
        self
    }

    pub fn control_type(mut self, control_type: ControlType) -> Self {
        self.control_type = control_type;
        self
    }

    /// Validation group with empty names treated as no group
    pub fn group_id(&self) -> Option<&str> {
        self.validation_group.as_deref().filter(|g| !g.is_empty())
    }

    /// Element that receives focus when this validator fails
    pub fn focus_target(&self) -> &str {
        self.focus_element_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.control_to_validate)
    }
}

/// What a validator hook receives
#[derive(Debug, Clone, Copy)]
pub struct ValidatorEvent<'a> {
    pub validator_id: &'a str,
    pub is_valid: bool,
    /// Element that triggered the pass, if known
    pub invoker: Option<&'a str>,
}

pub type ValidatorHook = Rc<dyn Fn(&ValidatorEvent<'_>)>;

/// Optional callbacks layered on top of a validator
#[derive(Clone, Default)]
pub struct ValidatorHooks {
    /// Called before evaluation unless a remote request is outstanding
    pub on_validate: Option<ValidatorHook>,
    /// Called after the display refresh when valid
    pub on_success: Option<ValidatorHook>,
    /// Called after the display refresh when invalid
    pub on_error: Option<ValidatorHook>,
    /// Called when a remote check answers
    pub on_remote_success: Option<ValidatorHook>,
    /// Called when a remote check fails to answer
    pub on_remote_failure: Option<ValidatorHook>,
}

impl fmt::Debug for ValidatorHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorHooks")
            .field("on_validate", &self.on_validate.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_remote_success", &self.on_remote_success.is_some())
            .field("on_remote_failure", &self.on_remote_failure.is_some())
            .finish()
    }
}
