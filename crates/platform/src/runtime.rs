//! Owns the page's scheduler and feeds it every browser callback.

use std::cell::RefCell;
use std::collections::VecDeque;

use bus::{ContentMessage, ContentResponse, HostEvent, Task};
use content::{ContentConfig, ContentError, Scheduler};
use core_types::TimerId;
use js_sys::Function;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use crate::chrome;
use crate::error::PlatformError;
use crate::host::WebHost;

enum Pending {
    Event(HostEvent),
    Timer { id: TimerId, task: Task },
    Message(ContentMessage),
}

type MessageListener = Closure<dyn FnMut(JsValue, JsValue, Function) -> bool>;

thread_local! {
    static SCHEDULER: RefCell<Option<Scheduler<WebHost>>> = const { RefCell::new(None) };
    static PENDING: RefCell<VecDeque<Pending>> = const { RefCell::new(VecDeque::new()) };
    static MESSAGE_LISTENER: RefCell<Option<MessageListener>> = const { RefCell::new(None) };
}

/// Install the scheduler on this page and request the stored settings.
/// A second injection into the same page stops here.
pub fn run() -> Result<(), PlatformError> {
    let host = WebHost::new()?;
    let scheduler = match Scheduler::install(host, ContentConfig::default()) {
        Ok(scheduler) => scheduler,
        Err(ContentError::AlreadyInstalled) => {
            log::info!(target: "undub::platform", "already running on this page");
            return Ok(());
        }
        Err(err) => return Err(PlatformError::Js(err.to_string())),
    };
    SCHEDULER.with_borrow_mut(|slot| *slot = Some(scheduler));
    install_message_listener()?;

    wasm_bindgen_futures::spawn_local(async {
        let settings = chrome::load_settings().await.map_err(|err| err.to_string());
        dispatch(HostEvent::SettingsLoaded(settings));
    });
    Ok(())
}

pub(crate) fn dispatch(event: HostEvent) {
    drain(Pending::Event(event));
}

pub(crate) fn timer_fired(id: TimerId, task: Task) {
    drain(Pending::Timer { id, task });
}

/// Queue `item`, then run the queue unless a dispatch further up the stack
/// already holds the scheduler; that one picks the item up.
fn drain(item: Pending) {
    PENDING.with_borrow_mut(|queue| queue.push_back(item));
    SCHEDULER.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            return;
        };
        let Some(scheduler) = slot.as_mut() else {
            return;
        };
        scheduler.host_mut().release_retired();
        while let Some(item) = PENDING.with_borrow_mut(|queue| queue.pop_front()) {
            match item {
                Pending::Event(event) => scheduler.handle(event),
                Pending::Timer { id, task } => {
                    scheduler.host_mut().timer_fired(id);
                    scheduler.handle(HostEvent::Timer(task));
                }
                Pending::Message(message) => {
                    scheduler.on_message(message);
                }
            }
        }
    });
}

fn on_message(message: JsValue, respond: &Function) -> bool {
    let message: ContentMessage = match chrome::from_js(&message) {
        Ok(message) => message,
        Err(_) => return false,
    };
    let ContentMessage::ToggleEnabled { enabled } = message;
    log::info!(target: "undub::platform", "toggle received: enabled={enabled}");
    drain(Pending::Message(message));

    match chrome::to_js(&ContentResponse::ok(enabled)) {
        Ok(response) => {
            if let Err(err) = respond.call1(&JsValue::NULL, &response) {
                log::debug!(target: "undub::platform", "could not answer toggle: {err:?}");
            }
        }
        Err(err) => log::warn!(target: "undub::platform", "could not encode response: {err}"),
    }
    false
}

fn install_message_listener() -> Result<(), PlatformError> {
    let listener: MessageListener = Closure::new(|message: JsValue, _sender: JsValue, respond: Function| {
        on_message(message, &respond)
    });
    chrome::add_message_listener(listener.as_ref().unchecked_ref())?;
    MESSAGE_LISTENER.with_borrow_mut(|slot| *slot = Some(listener));
    Ok(())
}
