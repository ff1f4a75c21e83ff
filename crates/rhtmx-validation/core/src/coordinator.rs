// File: src/coordinator.rs
// Purpose: Page-level registry of form managers and the shared page context

use crate::binding::Document;
use crate::config::{Config, Settings};
use crate::convert::ConversionFormat;
use crate::error::{RemoteError, Result, ValidationError};
use crate::functions::{CustomContext, CustomFunction, FunctionRegistry};
use crate::manager::Manager;
use crate::options::{ValidatorHooks, ValidatorOptions};
use crate::remote::{RemoteRequest, RemoteTransport};
use crate::summary::{Summary, SummaryHooks, SummaryOptions};
use crate::validators::{Validator, ValidatorConfig};
use futures::future::join_all;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// State shared by every validator and summary of a page
pub struct PageContext {
    document: Rc<dyn Document>,
    settings: Settings,
    functions: RefCell<FunctionRegistry>,
    next_ticket: Cell<u64>,
}

impl PageContext {
    pub fn new(document: Rc<dyn Document>, settings: Settings) -> Self {
        Self {
            document,
            settings,
            functions: RefCell::new(FunctionRegistry::new()),
            next_ticket: Cell::new(1),
        }
    }

    pub fn document(&self) -> &dyn Document {
        self.document.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn register_function<F>(&self, name: impl Into<String>, function: F)
    where
        F: Fn(&CustomContext<'_>) -> bool + 'static,
    {
        self.functions.borrow_mut().register(name, function);
    }

    pub fn function(&self, name: &str) -> Option<CustomFunction> {
        self.functions.borrow().get(name)
    }

    /// Page settings overridden by the validator's own options
    pub fn conversion_format(&self, options: &ValidatorOptions) -> ConversionFormat {
        ConversionFormat {
            decimal_char: options.decimal_char.unwrap_or(self.settings.decimal_char),
            date_format: options
                .date_format
                .clone()
                .filter(|format| !format.is_empty())
                .unwrap_or_else(|| self.settings.date_format.clone()),
        }
    }

    pub(crate) fn next_ticket(&self) -> u64 {
        let ticket = self.next_ticket.get();
        self.next_ticket.set(ticket + 1);
        ticket
    }
}

impl fmt::Debug for PageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContext")
            .field("settings", &self.settings)
            .field("functions", &self.functions)
            .field("next_ticket", &self.next_ticket.get())
            .finish()
    }
}

/// Entry point of page validation: one manager per form
#[derive(Debug)]
pub struct Coordinator {
    page: Rc<PageContext>,
    managers: Vec<Manager>,
}

impl Coordinator {
    pub fn new(document: Rc<dyn Document>) -> Self {
        Self::with_settings(document, Settings::default())
    }

    pub fn with_settings(document: Rc<dyn Document>, settings: Settings) -> Self {
        Self {
            page: Rc::new(PageContext::new(document, settings)),
            managers: Vec::new(),
        }
    }

    /// Build a coordinator and register forms, validators and summaries in that order
    pub fn from_config(document: Rc<dyn Document>, config: &Config) -> Result<Self> {
        let mut coordinator = Self::with_settings(document, config.settings.clone());
        for form in &config.forms {
            coordinator.register_form(&form.id);
        }

        let mut skipped = 0;
        for validator in &config.validators {
            if !coordinator.create_validator(validator.clone())? {
                skipped += 1;
            }
        }
        for summary in &config.summaries {
            if !coordinator.create_summary(summary.clone())? {
                skipped += 1;
            }
        }

        info!(
            forms = coordinator.managers.len(),
            validators = config.validators.len(),
            summaries = config.summaries.len(),
            skipped,
            "Validation configured"
        );
        Ok(coordinator)
    }

    pub fn page(&self) -> &Rc<PageContext> {
        &self.page
    }

    /// Create the manager of a form. Registering a form twice keeps the
    /// existing manager.
    pub fn register_form(&mut self, form_id: &str) -> &mut Manager {
        let index = match self.managers.iter().position(|m| m.form_id() == form_id) {
            Some(index) => index,
            None => {
                debug!(form = form_id, "Registering form");
                self.managers.push(Manager::new(form_id));
                self.managers.len() - 1
            }
        };
        &mut self.managers[index]
    }

    /// Managers in registration order
    pub fn managers(&self) -> &[Manager] {
        &self.managers
    }

    pub fn manager(&self, form_id: &str) -> Option<&Manager> {
        self.managers.iter().find(|m| m.form_id() == form_id)
    }

    pub fn manager_mut(&mut self, form_id: &str) -> Option<&mut Manager> {
        self.managers.iter_mut().find(|m| m.form_id() == form_id)
    }

    /// Find a validator in any form
    pub fn validator(&self, validator_id: &str) -> Option<&Validator> {
        self.managers.iter().find_map(|m| m.validator(validator_id))
    }

    pub fn validator_mut(&mut self, validator_id: &str) -> Option<&mut Validator> {
        self.managers
            .iter_mut()
            .find_map(|m| m.validator_mut(validator_id))
    }

    /// Construct a validator and register it with its form.
    ///
    /// Returns `Ok(false)` when its control or message element is missing.
    pub fn create_validator(&mut self, config: ValidatorConfig) -> Result<bool> {
        let form_id = config.options.form_id.clone();
        match Validator::new(config, self.page.clone())? {
            Some(validator) => {
                self.add_validator(&form_id, validator)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn add_validator(&mut self, form_id: &str, validator: Validator) -> Result<&mut Manager> {
        let manager = self
            .manager_mut(form_id)
            .ok_or_else(|| ValidationError::FormNotRegistered(form_id.to_string()))?;
        manager.add_validator(validator);
        Ok(manager)
    }

    /// Construct a summary and register it with its form.
    ///
    /// Returns `Ok(false)` when its element is missing.
    pub fn create_summary(&mut self, options: SummaryOptions) -> Result<bool> {
        let form_id = options.form_id.clone();
        match Summary::new(options, self.page.clone()) {
            Some(summary) => {
                self.add_summary(&form_id, summary)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn add_summary(&mut self, form_id: &str, summary: Summary) -> Result<&mut Manager> {
        let manager = self
            .manager_mut(form_id)
            .ok_or_else(|| ValidationError::FormNotRegistered(form_id.to_string()))?;
        manager.add_summary(summary);
        Ok(manager)
    }

    /// Run a validation pass. Without a form id the first registered form is used.
    pub fn validate(
        &mut self,
        form_id: Option<&str>,
        group: Option<&str>,
        invoker: Option<&str>,
    ) -> Result<bool> {
        let form_id = self
            .resolve_form(form_id)
            .ok_or(ValidationError::NoFormsRegistered)?;
        let manager = self
            .manager_mut(&form_id)
            .ok_or(ValidationError::FormNotRegistered(form_id.clone()))?;
        Ok(manager.validate(group, invoker))
    }

    /// Current validity without evaluating. Unknown forms are valid.
    pub fn is_valid(&self, form_id: Option<&str>, group: Option<&str>) -> bool {
        self.resolve_form(form_id)
            .and_then(|form_id| self.manager(&form_id))
            .map_or(true, |manager| manager.is_valid(group))
    }

    /// Reset a group of the first registered form
    pub fn reset(&mut self, group: Option<&str>) {
        if let Some(manager) = self.managers.first_mut() {
            manager.reset(group);
        }
    }

    /// Replace a validator's error message and write it into its message element
    pub fn set_error_message(&mut self, validator_id: &str, message: &str) -> Result<()> {
        let validator = self
            .validator_mut(validator_id)
            .ok_or_else(|| ValidationError::UnknownValidator(validator_id.to_string()))?;
        validator.set_error_message(message);
        Ok(())
    }

    pub fn set_validator_hooks(&mut self, validator_id: &str, hooks: ValidatorHooks) -> Result<()> {
        let validator = self
            .validator_mut(validator_id)
            .ok_or_else(|| ValidationError::UnknownValidator(validator_id.to_string()))?;
        validator.set_hooks(hooks);
        Ok(())
    }

    pub fn set_summary_hooks(&mut self, summary_id: &str, hooks: SummaryHooks) -> bool {
        match self
            .managers
            .iter_mut()
            .find_map(|m| m.summary_mut(summary_id))
        {
            Some(summary) => {
                summary.set_hooks(hooks);
                true
            }
            None => false,
        }
    }

    /// Make a function available to Custom validators
    pub fn register_function<F>(&self, name: impl Into<String>, function: F)
    where
        F: Fn(&CustomContext<'_>) -> bool + 'static,
    {
        self.page.register_function(name, function);
    }

    /// Feed a `change` event of `element_id` back into validation
    pub fn control_changed(&mut self, element_id: &str) -> usize {
        self.managers
            .iter_mut()
            .map(|manager| manager.control_changed(element_id))
            .sum()
    }

    /// Drain remote requests queued during validation passes
    pub fn take_remote_requests(&mut self) -> Vec<RemoteRequest> {
        self.managers
            .iter_mut()
            .flat_map(|manager| manager.take_remote_requests())
            .collect()
    }

    /// Deliver the answer of a remote request.
    ///
    /// Returns whether the answer was applied.
    pub fn complete_remote(
        &mut self,
        request: &RemoteRequest,
        outcome: std::result::Result<bool, RemoteError>,
    ) -> Result<bool> {
        let manager = self
            .manager_mut(&request.form_id)
            .ok_or_else(|| ValidationError::FormNotRegistered(request.form_id.clone()))?;
        manager.complete_remote(request, outcome)
    }

    /// Send every queued remote request through `transport`, concurrently,
    /// and apply the answers. Returns the number of applied answers.
    pub async fn dispatch_remote<T>(&mut self, transport: &T) -> Result<usize>
    where
        T: RemoteTransport + ?Sized,
    {
        let requests = self.take_remote_requests();
        if requests.is_empty() {
            return Ok(0);
        }
        debug!(requests = requests.len(), "Dispatching remote checks");

        let outcomes = join_all(requests.iter().map(|request| transport.check(request))).await;

        let mut applied = 0;
        for (request, outcome) in requests.iter().zip(outcomes) {
            if self.complete_remote(request, outcome)? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Explicit form id, or the first registered form
    fn resolve_form(&self, form_id: Option<&str>) -> Option<String> {
        if let Some(form_id) = form_id.filter(|id| !id.is_empty()) {
            return Some(form_id.to_string());
        }
        if self.managers.len() > 1 {
            warn!(
                forms = self.managers.len(),
                "No form given, falling back to the first registered form"
            );
        }
        self.managers.first().map(|m| m.form_id().to_string())
    }
}
