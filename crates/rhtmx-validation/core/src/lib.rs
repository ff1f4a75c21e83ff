//! RHTMX Validation Core
//!
//! Client-side validation coordination for RHTMX forms. A [`Coordinator`]
//! tracks one [`Manager`] per form; managers own validators and summaries,
//! partition them by validation group and run validation passes.
//!
//! The page is reached only through the [`Document`] and [`ElementBinding`]
//! traits, so the same logic runs against a browser document (see the wasm
//! crate) or the in-memory [`MemoryDocument`].
//!
//! ```
//! use rhtmx_validation_core::*;
//! use std::rc::Rc;
//!
//! let doc = Rc::new(MemoryDocument::new());
//! doc.input("name", "");
//! doc.message("name_required");
//!
//! let mut validation = Coordinator::new(doc.clone());
//! validation.register_form("form1");
//! validation
//!     .create_validator(ValidatorConfig::new(
//!         ValidatorOptions::new("name_required", "form1", "name")
//!             .error_message("Name is required"),
//!         ValidatorKind::RequiredField(RequiredFieldRule::default()),
//!     ))
//!     .unwrap();
//!
//! assert!(!validation.validate(Some("form1"), None, None).unwrap());
//! ```

pub mod binding;
pub mod config;
pub mod convert;
pub mod coordinator;
pub mod error;
pub mod functions;
pub mod manager;
pub mod memory;
pub mod options;
pub mod remote;
pub mod summary;
pub mod validators;
pub mod value;

pub use binding::{Document, Element, ElementBinding, InputKind, ListOption};
pub use config::{Config, FormConfig, Settings};
pub use convert::{ConversionFormat, DataType};
pub use coordinator::{Coordinator, PageContext};
pub use error::{RemoteError, Result, ValidationError};
pub use functions::{CustomContext, CustomFunction, FunctionRegistry};
pub use manager::Manager;
pub use memory::{MemoryDocument, MemoryElement};
pub use options::{ControlType, Display, ValidatorEvent, ValidatorHook, ValidatorHooks, ValidatorOptions};
pub use remote::{
    parse_callback_response, RemoteFailurePolicy, RemoteRequest, RemoteTransport,
    StaleResultPolicy, StaticTransport,
};
pub use summary::{Summary, SummaryDisplayMode, SummaryEvent, SummaryHook, SummaryHooks, SummaryOptions};
pub use validators::{
    ActiveCustomRule, CaptchaRule, CompareOperator, CompareRule, CustomRule, DataTypeRule,
    ListControlRule, RangeRule, RangeType, RegexRule, RequiredFieldRule, Validator,
    ValidatorConfig, ValidatorKind, Validity, EMAIL_PATTERN,
};
pub use value::Value;
