// File: src/memory.rs
// Purpose: In-memory document used by tests and the CLI

use crate::binding::{Document, Element, ElementBinding, InputKind, ListOption};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

#[derive(Debug)]
struct ElementState {
    value: String,
    kind: InputKind,
    disabled: bool,
    checked: bool,
    name: Option<String>,
    options: Vec<ListOption>,
    visible: bool,
    displayed: bool,
    classes: BTreeSet<String>,
    content: String,
    attached: bool,
    scrolled: usize,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            value: String::new(),
            kind: InputKind::Text,
            disabled: false,
            checked: false,
            name: None,
            options: Vec::new(),
            visible: true,
            displayed: true,
            classes: BTreeSet::new(),
            content: String::new(),
            attached: true,
            scrolled: 0,
        }
    }
}

/// Element stored in a [`MemoryDocument`]
#[derive(Debug)]
pub struct MemoryElement {
    id: String,
    state: RefCell<ElementState>,
    focus: Rc<RefCell<Option<String>>>,
}

impl MemoryElement {
    /// Set the current value
    pub fn set_value(&self, value: impl Into<String>) {
        self.state.borrow_mut().value = value.into();
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.state.borrow_mut().disabled = disabled;
    }

    pub fn set_checked(&self, checked: bool) {
        self.state.borrow_mut().checked = checked;
    }

    pub fn set_kind(&self, kind: InputKind) {
        self.state.borrow_mut().kind = kind;
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.state.borrow_mut().name = Some(name.into());
    }

    /// Replace the options of a select element
    pub fn set_options(&self, options: Vec<ListOption>) {
        self.state.borrow_mut().options = options;
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.state.borrow().classes.contains(class)
    }

    /// Inner HTML written by summaries or `set_error_message`
    pub fn content(&self) -> String {
        self.state.borrow().content.clone()
    }

    /// `style.display` is not `none`
    pub fn is_displayed(&self) -> bool {
        self.state.borrow().displayed
    }

    /// Number of scroll-into-view requests
    pub fn scroll_count(&self) -> usize {
        self.state.borrow().scrolled
    }
}

impl ElementBinding for MemoryElement {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    fn kind(&self) -> InputKind {
        self.state.borrow().kind
    }

    fn is_disabled(&self) -> bool {
        self.state.borrow().disabled
    }

    fn is_checked(&self) -> bool {
        self.state.borrow().checked
    }

    fn name(&self) -> Option<String> {
        self.state.borrow().name.clone()
    }

    fn options(&self) -> Vec<ListOption> {
        self.state.borrow().options.clone()
    }

    fn is_attached(&self) -> bool {
        self.state.borrow().attached
    }

    fn is_visible(&self) -> bool {
        let state = self.state.borrow();
        state.visible && state.displayed
    }

    fn set_visible(&self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }

    fn set_displayed(&self, displayed: bool) {
        self.state.borrow_mut().displayed = displayed;
    }

    fn add_class(&self, class: &str) {
        self.state.borrow_mut().classes.insert(class.to_string());
    }

    fn remove_class(&self, class: &str) {
        self.state.borrow_mut().classes.remove(class);
    }

    fn set_content(&self, html: &str) {
        self.state.borrow_mut().content = html.to_string();
    }

    fn focus(&self) {
        *self.focus.borrow_mut() = Some(self.id.clone());
    }

    fn scroll_into_view(&self) {
        self.state.borrow_mut().scrolled += 1;
    }
}

/// A document held entirely in memory.
///
/// Records alerts, focus and observed elements so tests can assert on the
/// side effects of a validation pass.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: RefCell<Vec<Rc<MemoryElement>>>,
    alerts: RefCell<Vec<String>>,
    observed: RefCell<Vec<String>>,
    focus: Rc<RefCell<Option<String>>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an element with the given id
    pub fn insert(&self, id: impl Into<String>) -> Rc<MemoryElement> {
        let id = id.into();
        self.remove(&id);
        let element = Rc::new(MemoryElement {
            id,
            state: RefCell::new(ElementState::default()),
            focus: self.focus.clone(),
        });
        self.elements.borrow_mut().push(element.clone());
        element
    }

    /// Add a text input with a value
    pub fn input(&self, id: impl Into<String>, value: impl Into<String>) -> Rc<MemoryElement> {
        let element = self.insert(id);
        element.set_value(value);
        element
    }

    /// Add an empty message container (validator span or summary div)
    pub fn message(&self, id: impl Into<String>) -> Rc<MemoryElement> {
        self.insert(id)
    }

    /// Remove an element; existing handles report themselves detached
    pub fn remove(&self, id: &str) {
        self.elements.borrow_mut().retain(|element| {
            if element.id == id {
                element.state.borrow_mut().attached = false;
                false
            } else {
                true
            }
        });
    }

    /// Typed handle to a stored element
    pub fn get(&self, id: &str) -> Option<Rc<MemoryElement>> {
        self.elements
            .borrow()
            .iter()
            .find(|element| element.id == id)
            .cloned()
    }

    /// Id of the element that last received focus
    pub fn focused(&self) -> Option<String> {
        self.focus.borrow().clone()
    }

    pub fn clear_focus(&self) {
        *self.focus.borrow_mut() = None;
    }

    /// Messages passed to `alert`, oldest first
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    /// Ids of elements that were put under change observation
    pub fn observed(&self) -> Vec<String> {
        self.observed.borrow().clone()
    }
}

impl Document for MemoryDocument {
    fn element(&self, id: &str) -> Option<Element> {
        self.get(id).map(|element| element as Element)
    }

    fn elements_by_name(&self, name: &str) -> Vec<Element> {
        self.elements
            .borrow()
            .iter()
            .filter(|element| element.state.borrow().name.as_deref() == Some(name))
            .map(|element| element.clone() as Element)
            .collect()
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn observe_changes(&self, element: &Element) {
        self.observed.borrow_mut().push(element.id());
    }
}
