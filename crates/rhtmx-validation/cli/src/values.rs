// File: src/values.rs
// Purpose: Sample page state (control values, remote answers) loaded from JSON

use anyhow::{Context, Result};
use rhtmx_validation_core::{
    Config, InputKind, ListOption, MemoryDocument, StaticTransport,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// Contents of a `--values` file
///
/// ```json
/// {
///   "controls": {
///     "name": "Alice",
///     "terms": { "type": "checkbox", "checked": true },
///     "country": { "type": "select-one", "options": [{ "value": "nz", "selected": true }] }
///   },
///   "remote": { "username_free": false }
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct PageValues {
    #[serde(default)]
    pub controls: BTreeMap<String, ControlValue>,

    /// Answers of remote checks by validator id
    #[serde(default)]
    pub remote: BTreeMap<String, bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    Text(String),
    Control(ControlState),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ControlState {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub checked: bool,
    pub disabled: bool,
    pub options: Vec<OptionState>,
}

#[derive(Debug, Deserialize)]
pub struct OptionState {
    pub value: String,
    #[serde(default)]
    pub selected: bool,
}

impl PageValues {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read values: {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse values: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Build the page: given controls, then an empty input for every other
    /// validated control and a container for every message and summary
    pub fn document(&self, config: &Config) -> Rc<MemoryDocument> {
        let doc = Rc::new(MemoryDocument::new());

        for (id, control) in &self.controls {
            match control {
                ControlValue::Text(value) => {
                    doc.input(id.as_str(), value.as_str());
                }
                ControlValue::Control(state) => {
                    let element = doc.input(id.as_str(), state.value.as_str());
                    if let Some(kind) = &state.kind {
                        element.set_kind(InputKind::parse(kind));
                    }
                    if let Some(name) = &state.name {
                        element.set_name(name.as_str());
                    }
                    element.set_checked(state.checked);
                    element.set_disabled(state.disabled);
                    element.set_options(
                        state
                            .options
                            .iter()
                            .map(|option| ListOption::new(option.value.as_str(), option.selected))
                            .collect(),
                    );
                }
            }
        }

        for validator in &config.validators {
            let control = &validator.options.control_to_validate;
            if !control.is_empty() && doc.get(control).is_none() {
                doc.input(control.as_str(), "");
            }
            if doc.get(&validator.options.id).is_none() {
                doc.message(validator.options.id.as_str());
            }
        }
        for summary in &config.summaries {
            if doc.get(&summary.id).is_none() {
                doc.message(summary.id.as_str());
            }
        }

        doc
    }

    pub fn transport(&self) -> StaticTransport {
        self.remote
            .iter()
            .map(|(id, valid)| (id.clone(), *valid))
            .collect()
    }
}
