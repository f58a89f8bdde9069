use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("no browser window in this context")]
    NoWindow,
    #[error("window has no HTML document")]
    NoDocument,
    #[error("javascript error: {0}")]
    Js(String),
    #[error("player endpoint answered with status {0}")]
    Status(u16),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Net(#[from] net::NetError),
}

/// Best readable form of a thrown value.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(err) => String::from(err.message()),
        None => format!("{value:?}"),
    }
}

impl From<JsValue> for PlatformError {
    fn from(value: JsValue) -> Self {
        PlatformError::Js(describe(&value))
    }
}

impl From<PlatformError> for JsValue {
    fn from(err: PlatformError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
