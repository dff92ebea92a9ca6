//! Shared helpers for the browser binding
//!
//! Property access on untyped host objects, JSON-compatible conversion and
//! error extraction. Everything the host hands us is a plain `JsValue`.

use js_sys::{Function, Promise, Reflect};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::errors::HostError;

// ============================================================================
// Serialization/Deserialization Helpers
// ============================================================================

/// Deserialize a value from JavaScript with context in the error
pub fn deserialize<T: DeserializeOwned>(value: JsValue, error_context: &str) -> Result<T, HostError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| HostError::new(format!("{}: {}", error_context, e)))
}

/// Serialize to plain JS objects (not `Map`s), as host code expects
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, HostError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| HostError::new(format!("{}: {}", error_context, e)))
}

// ============================================================================
// Property Access
// ============================================================================

pub fn get(target: &JsValue, key: &str) -> Result<JsValue, HostError> {
    Reflect::get(target, &JsValue::from_str(key)).map_err(|e| host_error(&e))
}

pub fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<(), HostError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| host_error(&e))
}

/// Call `target[method](...args)`
pub fn call(target: &JsValue, method: &str, args: &[&JsValue]) -> Result<JsValue, HostError> {
    let function: Function = get(target, method)?
        .dyn_into()
        .map_err(|_| HostError::new(format!("{} is not a function", method)))?;
    let result = match args {
        [] => function.call0(target),
        [a] => function.call1(target, a),
        [a, b] => function.call2(target, a, b),
        _ => {
            let array = js_sys::Array::new();
            for arg in args {
                array.push(arg);
            }
            function.apply(target, &array)
        }
    };
    result.map_err(|e| host_error(&e))
}

/// Await `value` if it is a promise, otherwise return it as is
pub async fn resolve(value: JsValue) -> Result<JsValue, HostError> {
    match value.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise).await.map_err(|e| host_error(&e)),
        Err(value) => Ok(value),
    }
}

// ============================================================================
// Error Extraction
// ============================================================================

/// Best-effort message of a thrown JS value (`Error`, `{message}` or string)
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(message) = Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
    {
        return message;
    }
    format!("{:?}", value)
}

pub fn host_error(value: &JsValue) -> HostError {
    HostError::new(js_error_message(value))
}

impl From<HostError> for JsValue {
    fn from(e: HostError) -> Self {
        js_sys::Error::new(&e.message).into()
    }
}
