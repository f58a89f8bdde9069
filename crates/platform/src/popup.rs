//! Toggle surface of the extension popup.

use bus::{ContentMessage, StoredSettings};
use wasm_bindgen::prelude::*;

use crate::chrome;

/// Stored switch state; unreadable storage reads as on.
#[wasm_bindgen(js_name = popupLoadEnabled)]
pub async fn popup_load_enabled() -> bool {
    match chrome::load_settings().await {
        Ok(settings) => settings.enabled(),
        Err(err) => {
            log::warn!(target: "undub::platform", "could not read settings: {err}");
            true
        }
    }
}

/// Persist the switch and tell every open host tab. Resolves to the number
/// of tabs that acknowledged.
#[wasm_bindgen(js_name = popupSetEnabled)]
pub async fn popup_set_enabled(enabled: bool) -> Result<u32, JsValue> {
    chrome::save_settings(&StoredSettings { enabled: Some(enabled) }).await?;
    let delivered = chrome::broadcast(&ContentMessage::ToggleEnabled { enabled }).await?;
    log::info!(target: "undub::platform", "toggle enabled={enabled} reached {delivered} tab(s)");
    Ok(delivered as u32)
}
