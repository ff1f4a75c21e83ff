// File: src/dom.rs
// Purpose: Browser document and element bindings over web-sys

use crate::Shared;
use rhtmx_validation_core::{Document, Element, ElementBinding, InputKind, ListOption};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlInputElement, HtmlOptionElement, HtmlSelectElement, HtmlTextAreaElement};

/// A live element of the page
pub struct DomElement {
    element: HtmlElement,
}

impl DomElement {
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }

    fn input(&self) -> Option<&HtmlInputElement> {
        self.element.dyn_ref::<HtmlInputElement>()
    }

    fn select(&self) -> Option<&HtmlSelectElement> {
        self.element.dyn_ref::<HtmlSelectElement>()
    }

    fn text_area(&self) -> Option<&HtmlTextAreaElement> {
        self.element.dyn_ref::<HtmlTextAreaElement>()
    }

    fn style_value(&self, property: &str) -> String {
        self.element
            .style()
            .get_property_value(property)
            .unwrap_or_default()
    }
}

impl ElementBinding for DomElement {
    fn id(&self) -> String {
        self.element.id()
    }

    fn value(&self) -> String {
        if let Some(input) = self.input() {
            input.value()
        } else if let Some(select) = self.select() {
            select.value()
        } else if let Some(text_area) = self.text_area() {
            text_area.value()
        } else {
            self.element.get_attribute("value").unwrap_or_default()
        }
    }

    fn kind(&self) -> InputKind {
        if let Some(input) = self.input() {
            InputKind::parse(&input.type_())
        } else if let Some(select) = self.select() {
            InputKind::parse(&select.type_())
        } else if self.text_area().is_some() {
            InputKind::TextArea
        } else {
            InputKind::Other
        }
    }

    fn is_disabled(&self) -> bool {
        if let Some(input) = self.input() {
            input.disabled()
        } else if let Some(select) = self.select() {
            select.disabled()
        } else if let Some(text_area) = self.text_area() {
            text_area.disabled()
        } else {
            self.element.has_attribute("disabled")
        }
    }

    fn is_checked(&self) -> bool {
        self.input().map_or(false, |input| input.checked())
    }

    fn name(&self) -> Option<String> {
        self.element.get_attribute("name")
    }

    fn options(&self) -> Vec<ListOption> {
        let Some(select) = self.select() else {
            return Vec::new();
        };
        let options = select.options();
        (0..options.length())
            .filter_map(|index| options.item(index))
            .filter_map(|item| item.dyn_into::<HtmlOptionElement>().ok())
            .map(|option| ListOption::new(option.value(), option.selected()))
            .collect()
    }

    fn is_attached(&self) -> bool {
        self.element.is_connected()
    }

    fn is_visible(&self) -> bool {
        self.style_value("visibility") != "hidden" && self.style_value("display") != "none"
    }

    fn set_visible(&self, visible: bool) {
        let value = if visible { "visible" } else { "hidden" };
        let _ = self.element.style().set_property("visibility", value);
    }

    fn set_displayed(&self, displayed: bool) {
        let style = self.element.style();
        let _ = if displayed {
            style.remove_property("display").map(|_| ())
        } else {
            style.set_property("display", "none")
        };
    }

    fn add_class(&self, class: &str) {
        let _ = self.element.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.element.class_list().remove_1(class);
    }

    fn set_content(&self, html: &str) {
        self.element.set_inner_html(html);
    }

    fn focus(&self) {
        let _ = self.element.focus();
    }

    fn scroll_into_view(&self) {
        self.element.scroll_into_view();
    }
}

type ChangeListener = Closure<dyn FnMut(web_sys::Event)>;

/// The browser document. Change events are fed back into the coordinator.
pub struct DomDocument {
    window: web_sys::Window,
    document: web_sys::Document,
    shared: RefCell<Weak<Shared>>,
    /// One listener per element id, kept alive for the page lifetime
    listeners: RefCell<HashMap<String, ChangeListener>>,
}

impl DomDocument {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document available"))?;
        Ok(Self {
            window,
            document,
            shared: RefCell::new(Weak::new()),
            listeners: RefCell::new(HashMap::new()),
        })
    }

    pub(crate) fn attach(&self, shared: Weak<Shared>) {
        *self.shared.borrow_mut() = shared;
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl Document for DomDocument {
    fn element(&self, id: &str) -> Option<Element> {
        let element = self.document.get_element_by_id(id)?;
        let element = element.dyn_into::<HtmlElement>().ok()?;
        Some(Rc::new(DomElement::new(element)))
    }

    fn elements_by_name(&self, name: &str) -> Vec<Element> {
        let nodes = self.document.get_elements_by_name(name);
        (0..nodes.length())
            .filter_map(|index| nodes.get(index))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .map(|element| Rc::new(DomElement::new(element)) as Element)
            .collect()
    }

    fn alert(&self, message: &str) {
        let _ = self.window.alert_with_message(message);
    }

    fn observe_changes(&self, element: &Element) {
        let id = element.id();
        if id.is_empty() || self.listeners.borrow().contains_key(&id) {
            return;
        }
        let Some(target) = self.document.get_element_by_id(&id) else {
            return;
        };

        let shared = self.shared.borrow().clone();
        let element_id = id.clone();
        let listener: ChangeListener = Closure::new(move |_event: web_sys::Event| {
            if let Some(shared) = shared.upgrade() {
                shared.control_changed(&element_id);
            }
        });

        if target
            .add_event_listener_with_callback("change", listener.as_ref().unchecked_ref())
            .is_ok()
        {
            self.listeners.borrow_mut().insert(id, listener);
        }
    }
}
