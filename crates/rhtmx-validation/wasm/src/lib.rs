//! RHTMX Validation WASM
//!
//! WebAssembly bindings for RHTMX client validation. The page's validators,
//! summaries and groups are coordinated by the core crate; this crate binds it
//! to the browser document and to a JavaScript remote handler.
//!
//! # Example (JavaScript)
//! ```javascript
//! const validation = new Validation();
//! validation.registerForm('signup');
//! validation.addValidator({
//!     type: 'RequiredField',
//!     id: 'name_required',
//!     form_id: 'signup',
//!     control_to_validate: 'name',
//!     error_message: 'Name is required',
//! });
//! validation.setRemoteHandler(req => fetch(`/check?${req.parameter}`).then(r => r.text()));
//! if (!validation.validate('signup')) event.preventDefault();
//! ```

mod dom;
mod remote;

pub use dom::{DomDocument, DomElement};
pub use remote::{read_answer, JsTransport};

use futures::future::join_all;
use rhtmx_validation_core::{
    Config, Coordinator, Document, RemoteError, RemoteTransport, Settings, SummaryEvent, SummaryHook,
    SummaryHooks, SummaryOptions, ValidatorConfig, ValidatorEvent, ValidatorHook, ValidatorHooks,
};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

/// Set panic hook for better error messages in the browser
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// State reachable from both the exported object and DOM listeners
pub(crate) struct Shared {
    coordinator: RefCell<Coordinator>,
    remote_handler: RefCell<Option<js_sys::Function>>,
    /// Change events raised while a pass held the coordinator
    deferred_changes: RefCell<Vec<String>>,
}

impl Shared {
    /// Entry point of `change` listeners
    pub(crate) fn control_changed(self: &Rc<Self>, element_id: &str) {
        match self.coordinator.try_borrow_mut() {
            Ok(mut coordinator) => {
                coordinator.control_changed(element_id);
            }
            // Raised synchronously inside a running pass, e.g. by focus moving
            Err(_) => {
                let mut deferred = self.deferred_changes.borrow_mut();
                if !deferred.iter().any(|id| id == element_id) {
                    deferred.push(element_id.to_string());
                }
                return;
            }
        }
        self.after_pass();
    }

    /// Replay change events deferred during a pass, then send queued remote checks
    fn after_pass(self: &Rc<Self>) {
        loop {
            let pending = std::mem::take(&mut *self.deferred_changes.borrow_mut());
            if pending.is_empty() {
                break;
            }
            let Ok(mut coordinator) = self.coordinator.try_borrow_mut() else {
                self.deferred_changes.borrow_mut().extend(pending);
                return;
            };
            for element_id in &pending {
                coordinator.control_changed(element_id);
            }
        }
        self.dispatch_remote();
    }

    /// Send queued remote checks without holding the coordinator across awaits
    fn dispatch_remote(self: &Rc<Self>) {
        let requests = match self.coordinator.try_borrow_mut() {
            Ok(mut coordinator) => coordinator.take_remote_requests(),
            Err(_) => return,
        };
        if requests.is_empty() {
            return;
        }

        let handler = self.remote_handler.borrow().clone();
        let shared = Rc::clone(self);
        spawn_local(async move {
            let outcomes = match handler {
                Some(handler) => {
                    let transport = JsTransport::new(handler);
                    join_all(requests.iter().map(|request| transport.check(request))).await
                }
                None => requests
                    .iter()
                    .map(|_| Err(RemoteError::Transport("no remote handler registered".to_string())))
                    .collect(),
            };

            // Continuations run from the microtask queue, never inside a pass
            let borrowed = shared.coordinator.try_borrow_mut();
            debug_assert!(borrowed.is_ok(), "remote answer applied during a validation pass");
            let Ok(mut coordinator) = borrowed else {
                return;
            };
            for (request, outcome) in requests.iter().zip(outcomes) {
                if let Err(err) = coordinator.complete_remote(request, outcome) {
                    warn(&err.to_string());
                }
            }
        });
    }
}

/// Page validation bound to the browser document
#[wasm_bindgen]
pub struct Validation {
    shared: Rc<Shared>,
    document: Rc<DomDocument>,
}

impl Validation {
    fn build(
        make: impl FnOnce(Rc<dyn Document>) -> Result<Coordinator, JsValue>,
    ) -> Result<Validation, JsValue> {
        let document = Rc::new(DomDocument::new()?);
        let coordinator = make(document.clone())?;
        let shared = Rc::new(Shared {
            coordinator: RefCell::new(coordinator),
            remote_handler: RefCell::new(None),
            deferred_changes: RefCell::new(Vec::new()),
        });
        document.attach(Rc::downgrade(&shared));
        Ok(Validation { shared, document })
    }

    fn coordinator(&self) -> Result<Ref<'_, Coordinator>, JsValue> {
        self.shared
            .coordinator
            .try_borrow()
            .map_err(|_| JsValue::from_str("Validation is busy"))
    }

    fn coordinator_mut(&self) -> Result<RefMut<'_, Coordinator>, JsValue> {
        self.shared
            .coordinator
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("Validation is busy"))
    }
}

#[wasm_bindgen]
impl Validation {
    /// Create validation for the current page.
    /// `settings` is optional, e.g. `{ decimal_char: ',', date_format: 'dd/MM/yyyy' }`.
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue) -> Result<Validation, JsValue> {
        let settings: Settings = if settings.is_undefined() || settings.is_null() {
            Settings::default()
        } else {
            serde_wasm_bindgen::from_value(settings)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse settings: {}", e)))?
        };
        Self::build(|document| Ok(Coordinator::with_settings(document, settings)))
    }

    /// Create validation from a TOML page configuration
    #[wasm_bindgen(js_name = fromToml)]
    pub fn from_toml(config: &str) -> Result<Validation, JsValue> {
        let config = Config::parse(config).map_err(|e| to_js(format!("{:#}", e)))?;
        Self::build(|document| Coordinator::from_config(document, &config).map_err(to_js))
    }

    #[wasm_bindgen(js_name = registerForm)]
    pub fn register_form(&self, form_id: &str) -> Result<(), JsValue> {
        self.coordinator_mut()?.register_form(form_id);
        Ok(())
    }

    /// Add a validator; false when its control or message element is missing
    #[wasm_bindgen(js_name = addValidator)]
    pub fn add_validator(&self, config: JsValue) -> Result<bool, JsValue> {
        let config: ValidatorConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse validator: {}", e)))?;
        self.coordinator_mut()?.create_validator(config).map_err(to_js)
    }

    /// Add a summary; false when its element is missing
    #[wasm_bindgen(js_name = addSummary)]
    pub fn add_summary(&self, options: JsValue) -> Result<bool, JsValue> {
        let options: SummaryOptions = serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse summary: {}", e)))?;
        self.coordinator_mut()?.create_summary(options).map_err(to_js)
    }

    /// Run a validation pass, then replay change events it raised and send
    /// any remote checks it queued
    pub fn validate(
        &self,
        form_id: Option<String>,
        group: Option<String>,
        invoker: Option<String>,
    ) -> Result<bool, JsValue> {
        let valid = self
            .coordinator_mut()?
            .validate(form_id.as_deref(), group.as_deref(), invoker.as_deref())
            .map_err(to_js)?;
        self.shared.after_pass();
        Ok(valid)
    }

    #[wasm_bindgen(js_name = isValid)]
    pub fn is_valid(&self, form_id: Option<String>, group: Option<String>) -> Result<bool, JsValue> {
        Ok(self
            .coordinator()?
            .is_valid(form_id.as_deref(), group.as_deref()))
    }

    pub fn reset(&self, group: Option<String>) -> Result<(), JsValue> {
        self.coordinator_mut()?.reset(group.as_deref());
        Ok(())
    }

    #[wasm_bindgen(js_name = setErrorMessage)]
    pub fn set_error_message(&self, validator_id: &str, message: &str) -> Result<(), JsValue> {
        self.coordinator_mut()?
            .set_error_message(validator_id, message)
            .map_err(to_js)
    }

    /// Register `function(validatorId, value)` for Custom validators.
    /// A function that throws counts as valid.
    #[wasm_bindgen(js_name = registerFunction)]
    pub fn register_function(&self, name: &str, function: js_sys::Function) -> Result<(), JsValue> {
        let function_name = name.to_string();
        self.coordinator()?.register_function(name, move |ctx| {
            match function.call2(
                &JsValue::NULL,
                &JsValue::from_str(ctx.validator_id),
                &JsValue::from_str(ctx.value),
            ) {
                Ok(result) => result.is_truthy(),
                Err(_) => {
                    warn(&format!("Validation function '{}' threw", function_name));
                    true
                }
            }
        });
        Ok(())
    }

    /// Handler for ActiveCustom checks: receives the request and returns a
    /// boolean, a response body or a Promise of either
    #[wasm_bindgen(js_name = setRemoteHandler)]
    pub fn set_remote_handler(&self, handler: js_sys::Function) {
        *self.shared.remote_handler.borrow_mut() = Some(handler);
    }

    /// Callbacks `onValidate`, `onSuccess`, `onError`, `onRemoteSuccess` and
    /// `onRemoteFailure`, each called as `(validatorId, isValid, invoker)`
    #[wasm_bindgen(js_name = setValidatorHooks)]
    pub fn set_validator_hooks(&self, validator_id: &str, hooks: &js_sys::Object) -> Result<(), JsValue> {
        let hooks = ValidatorHooks {
            on_validate: validator_hook(hooks, "onValidate"),
            on_success: validator_hook(hooks, "onSuccess"),
            on_error: validator_hook(hooks, "onError"),
            on_remote_success: validator_hook(hooks, "onRemoteSuccess"),
            on_remote_failure: validator_hook(hooks, "onRemoteFailure"),
        };
        self.coordinator_mut()?
            .set_validator_hooks(validator_id, hooks)
            .map_err(to_js)
    }

    /// Callbacks `onShow` and `onHide`, each called as `(summaryId, messages)`.
    /// Returns false for an unknown summary.
    #[wasm_bindgen(js_name = setSummaryHooks)]
    pub fn set_summary_hooks(&self, summary_id: &str, hooks: &js_sys::Object) -> Result<bool, JsValue> {
        let hooks = SummaryHooks {
            on_show: summary_hook(hooks, "onShow"),
            on_hide: summary_hook(hooks, "onHide"),
        };
        Ok(self.coordinator_mut()?.set_summary_hooks(summary_id, hooks))
    }

    /// Number of controls with a change listener
    #[wasm_bindgen(getter, js_name = observedControls)]
    pub fn observed_controls(&self) -> usize {
        self.document.listener_count()
    }
}

fn callback(hooks: &js_sys::Object, name: &str) -> Option<js_sys::Function> {
    js_sys::Reflect::get(hooks, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()
}

fn validator_hook(hooks: &js_sys::Object, name: &str) -> Option<ValidatorHook> {
    let function = callback(hooks, name)?;
    let hook: ValidatorHook = Rc::new(move |event: &ValidatorEvent<'_>| {
        let invoker = event.invoker.map_or(JsValue::NULL, JsValue::from_str);
        if function
            .call3(
                &JsValue::NULL,
                &JsValue::from_str(event.validator_id),
                &JsValue::from_bool(event.is_valid),
                &invoker,
            )
            .is_err()
        {
            warn(&format!("Validator hook for '{}' threw", event.validator_id));
        }
    });
    Some(hook)
}

fn summary_hook(hooks: &js_sys::Object, name: &str) -> Option<SummaryHook> {
    let function = callback(hooks, name)?;
    let hook: SummaryHook = Rc::new(move |event: &SummaryEvent<'_>| {
        let messages: js_sys::Array = event.messages.iter().map(|m| JsValue::from_str(m)).collect();
        if function
            .call2(&JsValue::NULL, &JsValue::from_str(event.summary_id), &messages)
            .is_err()
        {
            warn(&format!("Summary hook for '{}' threw", event.summary_id));
        }
    });
    Some(hook)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use serde::Serialize;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn body() -> web_sys::HtmlElement {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body())
            .unwrap()
    }

    fn append(html: &str) {
        let container = web_sys::window()
            .unwrap()
            .document()
            .unwrap()
            .create_element("div")
            .unwrap();
        container.set_inner_html(html);
        body().append_child(&container).unwrap();
    }

    fn required(id: &str, control: &str) -> JsValue {
        let config = ValidatorConfig::new(
            rhtmx_validation_core::ValidatorOptions::new(id, "form1", control)
                .error_message(format!("{} is required", control)),
            rhtmx_validation_core::ValidatorKind::RequiredField(Default::default()),
        );
        config
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn test_required_field_in_browser() {
        append(r#"<input id="w_name" value=""><span id="w_name_required"></span>"#);

        let validation = Validation::new(JsValue::UNDEFINED).unwrap();
        validation.register_form("form1").unwrap();
        assert!(validation.add_validator(required("w_name_required", "w_name")).unwrap());
        assert!(!validation.validate(None, None, None).unwrap());
        assert!(!validation.is_valid(Some("form1".to_string()), None).unwrap());
        assert_eq!(validation.observed_controls(), 1);
    }

    #[wasm_bindgen_test]
    fn test_missing_elements_are_skipped() {
        let validation = Validation::new(JsValue::UNDEFINED).unwrap();
        validation.register_form("form1").unwrap();
        assert!(!validation.add_validator(required("absent", "absent_input")).unwrap());
    }

    #[wasm_bindgen_test]
    fn test_change_listener_added_once() {
        append(r#"<input id="w_shared" value=""><span id="w_a"></span><span id="w_b"></span>"#);

        let validation = Validation::new(JsValue::UNDEFINED).unwrap();
        validation.register_form("form1").unwrap();
        validation.add_validator(required("w_a", "w_shared")).unwrap();
        validation.add_validator(required("w_b", "w_shared")).unwrap();
        validation.validate(None, None, None).unwrap();
        validation.validate(None, None, None).unwrap();
        assert_eq!(validation.observed_controls(), 1);
    }

    #[wasm_bindgen_test]
    fn test_change_raised_during_pass_is_replayed() {
        append(
            r#"<input id="w_edit" value=""><span id="w_edit_required"></span>
               <input id="w_touch" value="x"><span id="w_touch_custom"></span>"#,
        );

        let validation = Validation::new(JsValue::UNDEFINED).unwrap();
        validation.register_form("form1").unwrap();
        validation.add_validator(required("w_edit_required", "w_edit")).unwrap();

        // Fills the first control and fires its change event mid-pass
        let touch = js_sys::Function::new_with_args(
            "validatorId, value",
            "const el = document.getElementById('w_edit');
             el.value = 'filled';
             el.dispatchEvent(new Event('change'));
             return true;",
        );
        validation.register_function("touch", touch).unwrap();
        let custom = ValidatorConfig::new(
            rhtmx_validation_core::ValidatorOptions::new("w_touch_custom", "form1", "w_touch"),
            rhtmx_validation_core::ValidatorKind::Custom(
                rhtmx_validation_core::CustomRule::new("touch"),
            ),
        );
        validation
            .add_validator(
                custom
                    .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
                    .unwrap(),
            )
            .unwrap();

        // The pass saw the empty value; the deferred change revalidated it after
        assert!(!validation.validate(None, None, None).unwrap());
        assert!(validation.is_valid(None, None).unwrap());
        assert!(validation.shared.deferred_changes.borrow().is_empty());
    }

    #[wasm_bindgen_test]
    fn test_read_answer() {
        assert_eq!(read_answer(&JsValue::TRUE), Ok(true));
        assert_eq!(read_answer(&JsValue::from_str("false")), Ok(false));
        assert!(read_answer(&JsValue::from_f64(3.0)).is_err());
    }
}
