//! Browser side of the extension.
//!
//! [`run`] installs the content engine on a host page over [`WebHost`];
//! the popup exports drive the same stored setting from the toolbar.

mod chrome;
mod error;
mod host;
mod logger;
mod popup;
mod runtime;

pub use crate::chrome::HOST_TAB_PATTERN;
pub use crate::error::PlatformError;
pub use crate::host::WebHost;
pub use crate::logger::{LOG_PREFIX, init_logger};
pub use crate::popup::{popup_load_enabled, popup_set_enabled};
pub use crate::runtime::run;

/// Whether this context is a host page rather than an extension page.
pub fn on_host_page() -> bool {
    web_sys::window()
        .and_then(|w| w.location().hostname().ok())
        .is_some_and(|host| host == "youtube.com" || host.ends_with(".youtube.com"))
}
