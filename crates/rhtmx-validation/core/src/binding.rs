// File: src/binding.rs
// Purpose: Document abstraction used by validators and summaries

use std::rc::Rc;

/// Kind of form control, taken from the `type` attribute or the tag name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    #[default]
    Text,
    File,
    Checkbox,
    Radio,
    SelectOne,
    SelectMultiple,
    TextArea,
    Other,
}

impl InputKind {
    /// Parse an HTML `type` attribute (case-insensitive)
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "" | "text" | "password" | "email" | "search" | "tel" | "url" | "number"
            | "hidden" | "date" => InputKind::Text,
            "file" => InputKind::File,
            "checkbox" => InputKind::Checkbox,
            "radio" => InputKind::Radio,
            "select-one" => InputKind::SelectOne,
            "select-multiple" => InputKind::SelectMultiple,
            "textarea" => InputKind::TextArea,
            _ => InputKind::Other,
        }
    }

    /// Checkbox or radio input
    pub fn is_check_box(&self) -> bool {
        matches!(self, InputKind::Checkbox | InputKind::Radio)
    }

    /// Select element (single or multiple)
    pub fn is_select(&self) -> bool {
        matches!(self, InputKind::SelectOne | InputKind::SelectMultiple)
    }
}

/// One entry of a list control: a select option or a checkbox/radio item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOption {
    pub value: String,
    pub selected: bool,
}

impl ListOption {
    pub fn new(value: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            selected,
        }
    }
}

/// A single element of the page.
///
/// Methods take `&self`: elements are handles onto a document that owns the
/// actual state, the same way a browser element handle behaves.
pub trait ElementBinding {
    /// Element id
    fn id(&self) -> String;

    /// Current value (untrimmed)
    fn value(&self) -> String;

    fn kind(&self) -> InputKind {
        InputKind::Text
    }

    fn is_disabled(&self) -> bool {
        false
    }

    /// Checked state for checkbox/radio inputs
    fn is_checked(&self) -> bool {
        false
    }

    /// `name` attribute
    fn name(&self) -> Option<String> {
        None
    }

    /// Options of a select element
    fn options(&self) -> Vec<ListOption> {
        Vec::new()
    }

    /// False once the element has been removed from the document
    fn is_attached(&self) -> bool {
        true
    }

    /// True unless hidden via `visibility` or `display`
    fn is_visible(&self) -> bool;

    /// Set `style.visibility`
    fn set_visible(&self, visible: bool);

    /// Set `style.display` (shown or `none`)
    fn set_displayed(&self, displayed: bool);

    fn add_class(&self, class: &str);

    fn remove_class(&self, class: &str);

    /// Replace the inner HTML
    fn set_content(&self, html: &str);

    fn focus(&self);

    fn scroll_into_view(&self) {}
}

/// Shared element handle
pub type Element = Rc<dyn ElementBinding>;

/// The page document that validators and summaries bind to
pub trait Document {
    /// Look up an element by id
    fn element(&self, id: &str) -> Option<Element>;

    /// All elements with the given `name` attribute, in document order
    fn elements_by_name(&self, _name: &str) -> Vec<Element> {
        Vec::new()
    }

    /// Show a blocking message box
    fn alert(&self, message: &str);

    /// Start delivering `change` events of this element to the coordinator.
    /// Called at most once per validator and element.
    fn observe_changes(&self, element: &Element);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_kind_parse() {
        assert_eq!(InputKind::parse("FILE"), InputKind::File);
        assert_eq!(InputKind::parse("text"), InputKind::Text);
        assert_eq!(InputKind::parse("select-multiple"), InputKind::SelectMultiple);
        assert_eq!(InputKind::parse("range"), InputKind::Other);
        assert!(InputKind::Radio.is_check_box());
        assert!(!InputKind::SelectOne.is_check_box());
    }
}
