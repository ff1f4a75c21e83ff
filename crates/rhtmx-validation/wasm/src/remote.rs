// File: src/remote.rs
// Purpose: Remote checks through a JavaScript handler returning a value or a Promise

use async_trait::async_trait;
use rhtmx_validation_core::{parse_callback_response, RemoteError, RemoteRequest, RemoteTransport};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// Calls `handler(request)` and reads its (possibly async) answer
pub struct JsTransport {
    handler: js_sys::Function,
}

impl JsTransport {
    pub fn new(handler: js_sys::Function) -> Self {
        Self { handler }
    }
}

#[async_trait(?Send)]
impl RemoteTransport for JsTransport {
    async fn check(&self, request: &RemoteRequest) -> Result<bool, RemoteError> {
        let argument = serde_wasm_bindgen::to_value(request)
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        let returned = self
            .handler
            .call1(&JsValue::NULL, &argument)
            .map_err(|e| RemoteError::Transport(describe(&e)))?;

        // Plain values resolve immediately
        let answer = JsFuture::from(js_sys::Promise::resolve(&returned))
            .await
            .map_err(|e| RemoteError::Transport(describe(&e)))?;
        read_answer(&answer)
    }
}

/// Interpret a handler answer: a boolean, a response body, or `{ valid }`
pub fn read_answer(answer: &JsValue) -> Result<bool, RemoteError> {
    if let Some(valid) = answer.as_bool() {
        return Ok(valid);
    }
    if let Some(body) = answer.as_string() {
        return parse_callback_response(&body);
    }
    if answer.is_object() {
        let body = js_sys::JSON::stringify(answer)
            .map(String::from)
            .map_err(|e| RemoteError::InvalidResponse(describe(&e)))?;
        return parse_callback_response(&body);
    }
    Err(RemoteError::InvalidResponse(describe(answer)))
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
