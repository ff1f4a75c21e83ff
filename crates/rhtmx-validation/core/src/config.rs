// File: src/config.rs
// Purpose: Page validation configuration parsed from TOML

use crate::remote::{RemoteFailurePolicy, StaleResultPolicy};
use crate::summary::SummaryOptions;
use crate::validators::ValidatorConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything needed to wire validation for a page
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub forms: Vec<FormConfig>,

    #[serde(default)]
    pub validators: Vec<ValidatorConfig>,

    #[serde(default)]
    pub summaries: Vec<SummaryOptions>,
}

/// Page-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Decimal separator for Float conversion
    #[serde(default = "default_decimal_char")]
    pub decimal_char: char,

    /// Date pattern for Date conversion, e.g. `dd/MM/yyyy`
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub stale_results: StaleResultPolicy,

    #[serde(default)]
    pub remote_failure: RemoteFailurePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    pub id: String,
}

fn default_decimal_char() -> char {
    '.'
}

fn default_date_format() -> String {
    "yyyy-MM-dd".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            decimal_char: default_decimal_char(),
            date_format: default_date_format(),
            stale_results: StaleResultPolicy::default(),
            remote_failure: RemoteFailurePolicy::default(),
        }
    }
}

impl Config {
    /// Load a page configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Missing or empty file means no validation
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read validation config: {:?}", path))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse validation config: {:?}", path))
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Ids of the configured forms
    pub fn form_ids(&self) -> impl Iterator<Item = &str> {
        self.forms.iter().map(|form| form.id.as_str())
    }
}
