//! Extension APIs: synced storage, runtime messaging and tab broadcast.
//!
//! Values cross the boundary as JSON so the serde types in `bus` stay the
//! only description of each payload.

use bus::{ContentMessage, ContentResponse, StoredSettings};
use js_sys::{Array, Function, JSON, Promise, Reflect};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::error::PlatformError;

/// Tabs that may run the content script.
pub const HOST_TAB_PATTERN: &str = "*://*.youtube.com/*";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "storage", "sync"], js_name = get, catch)]
    fn storage_sync_get(keys: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "sync"], js_name = set, catch)]
    fn storage_sync_set(items: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener, catch)]
    fn on_message_add_listener(listener: &Function) -> Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = query, catch)]
    fn tabs_query(query: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = sendMessage, catch)]
    fn tabs_send_message(tab_id: i32, message: &JsValue) -> Result<Promise, JsValue>;
}

pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue, PlatformError> {
    let text = serde_json::to_string(value)?;
    Ok(JSON::parse(&text)?)
}

pub(crate) fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T, PlatformError> {
    let text = JSON::stringify(value)?
        .as_string()
        .ok_or_else(|| PlatformError::Js("value has no JSON form".into()))?;
    Ok(serde_json::from_str(&text)?)
}

pub async fn load_settings() -> Result<StoredSettings, PlatformError> {
    let keys = Array::new();
    for key in StoredSettings::KEYS {
        keys.push(&JsValue::from_str(key));
    }
    let items = JsFuture::from(storage_sync_get(&keys)?).await?;
    from_js(&items)
}

pub async fn save_settings(settings: &StoredSettings) -> Result<(), PlatformError> {
    JsFuture::from(storage_sync_set(&to_js(settings)?)?).await?;
    Ok(())
}

pub fn add_message_listener(listener: &Function) -> Result<(), PlatformError> {
    Ok(on_message_add_listener(listener)?)
}

/// Send `message` to every host tab and count the ones whose script
/// answered with success. Tabs without a script fail silently.
pub async fn broadcast(message: &ContentMessage) -> Result<usize, PlatformError> {
    let query = js_sys::Object::new();
    Reflect::set(&query, &"url".into(), &HOST_TAB_PATTERN.into())?;
    let tabs: Array = JsFuture::from(tabs_query(&query)?).await?.dyn_into()?;
    let payload = to_js(message)?;

    let mut delivered = 0;
    for tab in tabs.iter() {
        let Some(id) = Reflect::get(&tab, &"id".into())?.as_f64() else {
            continue;
        };
        let reply = match tabs_send_message(id as i32, &payload) {
            Ok(promise) => JsFuture::from(promise).await,
            Err(err) => Err(err),
        };
        match reply.map_err(PlatformError::from).and_then(|r| from_js::<ContentResponse>(&r)) {
            Ok(response) if response.success => delivered += 1,
            Ok(_) => {}
            Err(err) => log::debug!(target: "undub::platform", "tab {id} did not answer: {err}"),
        }
    }
    Ok(delivered)
}
