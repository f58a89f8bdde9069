//! Extension entry point: one wasm module shared by the content script and
//! the popup. On a host page it installs the content engine; elsewhere it
//! only exposes the popup functions.

use wasm_bindgen::prelude::*;

pub use platform::{popup_load_enabled, popup_set_enabled};

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    platform::init_logger();
    if platform::on_host_page() {
        platform::run()?;
    }
    Ok(())
}
