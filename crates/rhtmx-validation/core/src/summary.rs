// File: src/summary.rs
// Purpose: Validation summaries aggregating error messages of a group

use crate::binding::Element;
use crate::coordinator::PageContext;
use crate::options::Display;
use crate::validators::Validator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Layout of the summary messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SummaryDisplayMode {
    List,
    #[default]
    BulletList,
    SingleParagraph,
}

struct Format {
    header: &'static str,
    first: &'static str,
    pre: &'static str,
    post: &'static str,
    last: &'static str,
}

impl SummaryDisplayMode {
    fn format(self) -> Format {
        match self {
            SummaryDisplayMode::List => Format {
                header: "<br />",
                first: "",
                pre: "",
                post: "<br />",
                last: "",
            },
            SummaryDisplayMode::SingleParagraph => Format {
                header: " ",
                first: "",
                pre: "",
                post: " ",
                last: "<br />",
            },
            SummaryDisplayMode::BulletList => Format {
                header: "",
                first: "<ul>",
                pre: "<li>",
                post: "</li>",
                last: "</ul>",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    /// Id of the container element
    pub id: String,
    pub form_id: String,
    pub validation_group: Option<String>,
    pub header_text: Option<String>,
    pub display_mode: SummaryDisplayMode,
    pub display: Display,
    /// Render messages inline
    pub show_summary: bool,
    /// Also show the messages in an alert
    pub show_message_box: bool,
    pub scroll_to_summary: bool,
    /// Refresh even when not forced
    pub refresh: bool,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            id: String::new(),
            form_id: String::new(),
            validation_group: None,
            header_text: None,
            display_mode: SummaryDisplayMode::default(),
            display: Display::default(),
            show_summary: true,
            show_message_box: false,
            scroll_to_summary: true,
            refresh: true,
        }
    }
}

impl SummaryOptions {
    pub fn new(id: impl Into<String>, form_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            form_id: form_id.into(),
            ..Self::default()
        }
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.validation_group = Some(group.into());
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header_text = Some(header.into());
        self
    }

    pub fn display_mode(mut self, mode: SummaryDisplayMode) -> Self {
        self.display_mode = mode;
        self
    }
}

/// What a summary hook receives
#[derive(Debug, Clone, Copy)]
pub struct SummaryEvent<'a> {
    pub summary_id: &'a str,
    pub messages: &'a [String],
}

pub type SummaryHook = Rc<dyn Fn(&SummaryEvent<'_>)>;

/// Replacements for the default show/hide behaviour, e.g. an animation
#[derive(Clone, Default)]
pub struct SummaryHooks {
    pub on_show: Option<SummaryHook>,
    pub on_hide: Option<SummaryHook>,
}

impl fmt::Debug for SummaryHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryHooks")
            .field("on_show", &self.on_show.is_some())
            .field("on_hide", &self.on_hide.is_some())
            .finish()
    }
}

/// Renders the error messages of one validation group
pub struct Summary {
    options: SummaryOptions,
    page: Rc<PageContext>,
    element: Element,
    visible: bool,
    hooks: SummaryHooks,
}

impl Summary {
    /// Bind to the container element; `None` when it is missing
    pub fn new(options: SummaryOptions, page: Rc<PageContext>) -> Option<Self> {
        let Some(element) = page.document().element(&options.id) else {
            debug!(summary = %options.id, "Summary element missing, summary skipped");
            return None;
        };
        let visible = element.is_visible();
        Some(Self {
            options,
            page,
            element,
            visible,
            hooks: SummaryHooks::default(),
        })
    }

    pub fn with_hooks(mut self, hooks: SummaryHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn set_hooks(&mut self, hooks: SummaryHooks) {
        self.hooks = hooks;
    }

    pub fn id(&self) -> &str {
        &self.options.id
    }

    pub fn form_id(&self) -> &str {
        &self.options.form_id
    }

    pub fn group(&self) -> Option<&str> {
        self.options.validation_group.as_deref().filter(|g| !g.is_empty())
    }

    pub fn options(&self) -> &SummaryOptions {
        &self.options
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide according to the failing validators.
    /// `update` forces a refresh.
    pub fn update_summary(&mut self, validators: &[&Validator], update: bool) {
        let messages = messages(validators);

        if validators.is_empty() {
            if update || self.options.refresh {
                self.hide_summary(&messages);
            }
            return;
        }

        let refresh = update || !self.visible || self.options.refresh;
        if !refresh {
            return;
        }

        if self.options.show_summary {
            self.element.set_content(&self.format_summary(&messages));
            self.show_summary(&messages);
        }
        if self.options.scroll_to_summary {
            self.element.scroll_into_view();
        }
        if self.options.show_message_box {
            self.page.document().alert(&self.format_message_box(&messages));
            self.visible = true;
        }
    }

    pub fn hide_summary(&mut self, messages: &[String]) {
        match self.hooks.on_hide.clone() {
            Some(hook) => {
                self.element.set_visible(true);
                hook(&SummaryEvent {
                    summary_id: &self.options.id,
                    messages,
                });
            }
            None => {
                self.element.set_visible(false);
                if matches!(self.options.display, Display::None | Display::Dynamic) {
                    self.element.set_displayed(false);
                }
            }
        }
        self.visible = false;
    }

    pub fn show_summary(&mut self, messages: &[String]) {
        self.element.set_visible(true);
        match self.hooks.on_show.clone() {
            Some(hook) => hook(&SummaryEvent {
                summary_id: &self.options.id,
                messages,
            }),
            None => self.element.set_displayed(true),
        }
        self.visible = true;
    }

    /// Inline HTML for the messages
    pub fn format_summary(&self, messages: &[String]) -> String {
        let format = self.options.display_mode.format();
        let mut output = match self.header() {
            Some(header) => format!("{}{}", header, format.header),
            None => String::new(),
        };
        output.push_str(format.first);
        for message in messages.iter().filter(|m| !m.is_empty()) {
            output.push_str(format.pre);
            output.push_str(message);
            output.push_str(format.post);
        }
        output.push_str(format.last);
        output
    }

    /// Plain text for the alert
    pub fn format_message_box(&self, messages: &[String]) -> String {
        let mut output = match self.header() {
            Some(header) => format!("{}\n", header),
            None => String::new(),
        };
        for message in messages {
            match self.options.display_mode {
                SummaryDisplayMode::List => {
                    output.push_str(message);
                    output.push('\n');
                }
                SummaryDisplayMode::BulletList => {
                    output.push_str("  - ");
                    output.push_str(message);
                    output.push('\n');
                }
                SummaryDisplayMode::SingleParagraph => {
                    output.push_str(message);
                    output.push(' ');
                }
            }
        }
        output
    }

    fn header(&self) -> Option<&str> {
        self.options.header_text.as_deref().filter(|h| !h.is_empty())
    }
}

impl fmt::Debug for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Summary")
            .field("options", &self.options)
            .field("visible", &self.visible)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Non-empty error messages in validator order
fn messages(validators: &[&Validator]) -> Vec<String> {
    validators
        .iter()
        .map(|validator| validator.error_message())
        .filter(|message| !message.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::ElementBinding;
    use crate::memory::MemoryDocument;
    use crate::validators::test_support::page;
    use crate::validators::{RequiredFieldRule, ValidatorConfig, ValidatorKind};
    use crate::options::ValidatorOptions;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn summary(doc: &Rc<MemoryDocument>, options: SummaryOptions) -> Summary {
        doc.message(options.id.clone());
        Summary::new(options, page(doc)).unwrap()
    }

    fn failing(doc: &Rc<MemoryDocument>, id: &str, message: &str) -> Validator {
        let control = format!("{}_input", id);
        doc.input(control.clone(), "");
        doc.message(id);
        let options = ValidatorOptions::new(id, "form1", control).error_message(message);
        let kind = ValidatorKind::RequiredField(RequiredFieldRule::default());
        let mut validator = Validator::new(ValidatorConfig::new(options, kind), page(doc))
            .unwrap()
            .unwrap();
        validator.validate(None);
        validator
    }

    fn messages(list: &[&str]) -> Vec<String> {
        list.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_missing_element() {
        let doc = Rc::new(MemoryDocument::new());
        assert!(Summary::new(SummaryOptions::new("s1", "form1"), page(&doc)).is_none());
    }

    #[test]
    fn test_format_modes() {
        let doc = Rc::new(MemoryDocument::new());
        let list = messages(&["A", "", "B"]);

        let bullet = summary(&doc, SummaryOptions::new("s1", "form1").header("Errors:"));
        assert_eq!(
            bullet.format_summary(&list),
            "Errors:<ul><li>A</li><li>B</li></ul>"
        );

        let plain = summary(
            &doc,
            SummaryOptions::new("s2", "form1").display_mode(SummaryDisplayMode::List),
        );
        assert_eq!(plain.format_summary(&list), "A<br />B<br />");

        let paragraph = summary(
            &doc,
            SummaryOptions::new("s3", "form1")
                .header("Fix:")
                .display_mode(SummaryDisplayMode::SingleParagraph),
        );
        assert_eq!(paragraph.format_summary(&list), "Fix: A B <br />");
    }

    #[test]
    fn test_format_message_box() {
        let doc = Rc::new(MemoryDocument::new());
        let list = messages(&["A", "B"]);

        let bullet = summary(&doc, SummaryOptions::new("s1", "form1").header("Errors"));
        assert_eq!(bullet.format_message_box(&list), "Errors\n  - A\n  - B\n");

        let plain = summary(
            &doc,
            SummaryOptions::new("s2", "form1").display_mode(SummaryDisplayMode::List),
        );
        assert_eq!(plain.format_message_box(&list), "A\nB\n");

        let paragraph = summary(
            &doc,
            SummaryOptions::new("s3", "form1").display_mode(SummaryDisplayMode::SingleParagraph),
        );
        assert_eq!(paragraph.format_message_box(&list), "A B ");
    }

    #[test]
    fn test_update_shows_and_hides() {
        let doc = Rc::new(MemoryDocument::new());
        let v1 = failing(&doc, "v1", "Name is required");
        let mut summary = summary(&doc, SummaryOptions::new("s1", "form1"));
        let element = doc.get("s1").unwrap();

        summary.update_summary(&[&v1], true);
        assert!(summary.is_visible());
        assert!(element.is_visible());
        assert_eq!(element.content(), "<ul><li>Name is required</li></ul>");
        assert_eq!(element.scroll_count(), 1);

        summary.update_summary(&[], true);
        assert!(!summary.is_visible());
        assert!(!element.is_visible());
    }

    #[test]
    fn test_refresh_gate() {
        let doc = Rc::new(MemoryDocument::new());
        let v1 = failing(&doc, "v1", "First");
        let mut options = SummaryOptions::new("s1", "form1");
        options.refresh = false;
        let mut summary = summary(&doc, options);
        let element = doc.get("s1").unwrap();

        summary.update_summary(&[&v1], true);
        assert_eq!(element.content(), "<ul><li>First</li></ul>");

        // Visible and not forced: content stays
        element.set_content("kept");
        summary.update_summary(&[&v1], false);
        assert_eq!(element.content(), "kept");

        // No errors and not forced: stays shown
        summary.update_summary(&[], false);
        assert!(summary.is_visible());
    }

    #[test]
    fn test_message_box() {
        let doc = Rc::new(MemoryDocument::new());
        let v1 = failing(&doc, "v1", "First");
        let mut options = SummaryOptions::new("s1", "form1").header("Please fix");
        options.show_summary = false;
        options.show_message_box = true;
        options.scroll_to_summary = false;
        let mut summary = summary(&doc, options);

        summary.update_summary(&[&v1], true);
        assert_eq!(doc.alerts(), vec!["Please fix\n  - First\n".to_string()]);
        assert_eq!(doc.get("s1").unwrap().content(), "");
        assert_eq!(doc.get("s1").unwrap().scroll_count(), 0);
        assert!(summary.is_visible());
    }

    #[test]
    fn test_dynamic_hide_removes_display() {
        let doc = Rc::new(MemoryDocument::new());
        let mut options = SummaryOptions::new("s1", "form1");
        options.display = Display::Dynamic;
        let mut summary = summary(&doc, options);

        summary.hide_summary(&[]);
        assert!(!doc.get("s1").unwrap().is_displayed());

        summary.show_summary(&[]);
        assert!(doc.get("s1").unwrap().is_displayed());
    }

    #[test]
    fn test_hooks_replace_default_toggle() {
        let doc = Rc::new(MemoryDocument::new());
        let shown = Rc::new(Cell::new(0));
        let hidden = Rc::new(Cell::new(0));

        let on_show = shown.clone();
        let on_hide = hidden.clone();
        let mut options = SummaryOptions::new("s1", "form1");
        options.display = Display::Dynamic;
        let mut summary = summary(&doc, options).with_hooks(SummaryHooks {
            on_show: Some(Rc::new(move |_| on_show.set(on_show.get() + 1))),
            on_hide: Some(Rc::new(move |_| on_hide.set(on_hide.get() + 1))),
        });

        summary.hide_summary(&[]);
        let element = doc.get("s1").unwrap();
        assert!(element.is_visible());
        assert!(!summary.is_visible());
        assert_eq!(hidden.get(), 1);

        summary.show_summary(&[]);
        assert!(summary.is_visible());
        assert_eq!(shown.get(), 1);
    }
}
