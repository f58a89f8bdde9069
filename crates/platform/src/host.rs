use std::any::Any;
use std::collections::HashMap;
use std::time::Duration;

use bus::{FetchOutcome, HostEvent, MutationScope, Task};
use content::{AudioTrack, HostError, HostPage, selectors};
use core_types::{ObserverId, RequestId, TimerId};
use js_sys::{Array, JSON, Reflect};
use net::{PlayerDetails, PlayerRequest};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, Event, HtmlDocument, HtmlElement, MutationObserver, MutationObserverInit, Request,
    RequestInit, Response, Window,
};

use crate::error::{PlatformError, describe};
use crate::runtime;

/// Window property marking the page as claimed.
const INSTANCE_MARKER: &str = "__undubContentScript";
/// Host global holding the first render's player data.
const INITIAL_PLAYER_RESPONSE: &str = "ytInitialPlayerResponse";
/// Fired by the host once an in-app navigation has rendered.
const NAVIGATE_FINISH_EVENT: &str = "yt-navigate-finish";

struct Timer {
    handle: i32,
    repeating: bool,
    callback: Closure<dyn FnMut()>,
}

struct Observer {
    observer: MutationObserver,
    callback: Closure<dyn FnMut(Array, MutationObserver)>,
}

/// [`HostPage`] over the live page.
///
/// Callbacks are owned here and released when their timer, observer or
/// listener is retired. A retired callback may be the one currently
/// running, so it is parked and only dropped at the next dispatch.
pub struct WebHost {
    window: Window,
    document: Document,
    next_id: u64,
    timers: HashMap<TimerId, Timer>,
    observers: HashMap<ObserverId, Observer>,
    navigation: Option<Closure<dyn FnMut(Event)>>,
    retired: Vec<Box<dyn Any>>,
}

impl WebHost {
    pub fn new() -> Result<Self, PlatformError> {
        let window = web_sys::window().ok_or(PlatformError::NoWindow)?;
        let document = window.document().ok_or(PlatformError::NoDocument)?;
        Ok(Self {
            window,
            document,
            next_id: 1,
            timers: HashMap::new(),
            observers: HashMap::new(),
            navigation: None,
            retired: Vec::new(),
        })
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Drop callbacks retired during earlier dispatches.
    pub(crate) fn release_retired(&mut self) {
        self.retired.clear();
    }

    /// Bookkeeping for a timer that just fired.
    pub(crate) fn timer_fired(&mut self, timer: TimerId) {
        if self.timers.get(&timer).is_some_and(|t| !t.repeating) {
            if let Some(timer) = self.timers.remove(&timer) {
                self.retired.push(Box::new(timer.callback));
            }
        }
    }

    fn html_document(&self) -> Option<&HtmlDocument> {
        self.document.dyn_ref::<HtmlDocument>()
    }

    fn media_tracks(&self) -> Option<JsValue> {
        let media = self.document.query_selector(selectors::MEDIA).ok()??;
        let tracks = Reflect::get(&media, &"audioTracks".into()).ok()?;
        (!tracks.is_undefined() && !tracks.is_null()).then_some(tracks)
    }

    fn scope_root(&self, scope: MutationScope) -> Option<Element> {
        match scope {
            MutationScope::DocumentTitle => self.document.query_selector("title").ok()?,
            MutationScope::Body => self.document.body().map(Element::from),
            MutationScope::Description => self
                .document
                .query_selector(selectors::DESCRIPTION_CONTAINER)
                .ok()?,
        }
    }

    fn schedule_with(&mut self, delay: Duration, task: Task, repeating: bool) -> TimerId {
        let id = self.next_id();
        let callback = Closure::<dyn FnMut()>::new(move || runtime::timer_fired(id, task.clone()));
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let function: &js_sys::Function = callback.as_ref().unchecked_ref();
        let handle = if repeating {
            self.window
                .set_interval_with_callback_and_timeout_and_arguments_0(function, millis)
        } else {
            self.window
                .set_timeout_with_callback_and_timeout_and_arguments_0(function, millis)
        };
        match handle {
            Ok(handle) => {
                self.timers.insert(
                    id,
                    Timer {
                        handle,
                        repeating,
                        callback,
                    },
                );
            }
            Err(err) => log::warn!(target: "undub::platform", "could not arm timer: {}", describe(&err)),
        }
        id
    }
}

fn elements(list: Result<web_sys::NodeList, JsValue>, selectors: &str) -> Vec<Element> {
    let list = match list {
        Ok(list) => list,
        Err(err) => {
            log::debug!(target: "undub::platform", "query {selectors:?} failed: {}", describe(&err));
            return Vec::new();
        }
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

async fn fetch_player(request: &PlayerRequest) -> Result<PlayerDetails, PlatformError> {
    let window = web_sys::window().ok_or(PlatformError::NoWindow)?;
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(&request.body()));
    let http = Request::new_with_str_and_init(request.url()?.as_str(), &init)?;
    http.headers().set("Content-Type", "application/json")?;

    let response: Response = JsFuture::from(window.fetch_with_request(&http)).await?.dyn_into()?;
    if !response.ok() {
        return Err(PlatformError::Status(response.status()));
    }
    let body = JsFuture::from(response.text()?)
        .await?
        .as_string()
        .unwrap_or_default();
    Ok(net::parse_player_response(&body)?)
}

impl HostPage for WebHost {
    type Element = Element;

    fn claim_instance(&mut self) -> bool {
        let key = JsValue::from_str(INSTANCE_MARKER);
        if Reflect::get(&self.window, &key).is_ok_and(|v| v.is_truthy()) {
            return false;
        }
        Reflect::set(&self.window, &key, &JsValue::TRUE).unwrap_or(false)
    }

    fn location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn replace_location(&mut self, url: &str) -> Result<(), HostError> {
        let history = self
            .window
            .history()
            .map_err(|err| HostError::History(describe(&err)))?;
        history
            .replace_state_with_url(&JsValue::NULL, "", Some(url))
            .map_err(|err| HostError::History(describe(&err)))
    }

    fn query_all(&self, selectors: &str) -> Vec<Element> {
        elements(self.document.query_selector_all(selectors), selectors)
    }

    fn query_within(&self, scope: &Element, selectors: &str) -> Vec<Element> {
        elements(scope.query_selector_all(selectors), selectors)
    }

    fn text_content(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn set_text_content(&mut self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn click(&mut self, element: &Element) {
        if let Some(element) = element.dyn_ref::<HtmlElement>() {
            element.click();
        }
    }

    fn document_title(&self) -> String {
        self.document.title()
    }

    fn set_document_title(&mut self, title: &str) {
        self.document.set_title(title);
    }

    fn page_source(&self) -> String {
        self.document
            .document_element()
            .map(|root| root.outer_html())
            .unwrap_or_default()
    }

    fn initial_player_response(&self) -> Option<serde_json::Value> {
        let value = Reflect::get(&self.window, &INITIAL_PLAYER_RESPONSE.into()).ok()?;
        if !value.is_object() {
            return None;
        }
        let text = JSON::stringify(&value).ok()?.as_string()?;
        serde_json::from_str(&text).ok()
    }

    fn audio_tracks(&self) -> Option<Vec<AudioTrack>> {
        let tracks = self.media_tracks()?;
        let length = Reflect::get(&tracks, &"length".into()).ok()?.as_f64()? as u32;
        let list = (0..length)
            .filter_map(|i| Reflect::get_u32(&tracks, i).ok())
            .map(|track| AudioTrack {
                label: Reflect::get(&track, &"label".into())
                    .ok()
                    .and_then(|l| l.as_string())
                    .unwrap_or_default(),
                enabled: Reflect::get(&track, &"enabled".into())
                    .ok()
                    .and_then(|e| e.as_bool())
                    .unwrap_or(false),
            })
            .collect();
        Some(list)
    }

    fn set_audio_track_enabled(&mut self, index: usize, enabled: bool) {
        let Some(tracks) = self.media_tracks() else {
            return;
        };
        let Ok(track) = Reflect::get_u32(&tracks, index as u32) else {
            return;
        };
        if let Err(err) = Reflect::set(&track, &"enabled".into(), &JsValue::from_bool(enabled)) {
            log::debug!(target: "undub::platform", "track {index} rejected enabled={enabled}: {}", describe(&err));
        }
    }

    fn cookie(&self, name: &str) -> Option<String> {
        let jar = self.html_document()?.cookie().ok()?;
        jar.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }

    fn set_cookie(&mut self, cookie: &str) -> Result<(), HostError> {
        let document = self
            .html_document()
            .ok_or_else(|| HostError::CookieRejected("no HTML document".into()))?;
        document
            .set_cookie(cookie)
            .map_err(|err| HostError::CookieRejected(describe(&err)))?;

        // The jar drops writes it refuses without raising.
        let pair = cookie.split(';').next().unwrap_or_default();
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        if self.cookie(name).as_deref() == Some(value) {
            Ok(())
        } else {
            Err(HostError::CookieRejected(name.to_string()))
        }
    }

    fn schedule(&mut self, delay: Duration, task: Task) -> TimerId {
        self.schedule_with(delay, task, false)
    }

    fn schedule_repeating(&mut self, period: Duration, task: Task) -> TimerId {
        self.schedule_with(period, task, true)
    }

    fn cancel_timer(&mut self, timer: TimerId) {
        let Some(timer) = self.timers.remove(&timer) else {
            return;
        };
        if timer.repeating {
            self.window.clear_interval_with_handle(timer.handle);
        } else {
            self.window.clear_timeout_with_handle(timer.handle);
        }
        self.retired.push(Box::new(timer.callback));
    }

    fn observe(&mut self, scope: MutationScope) -> Option<ObserverId> {
        let root = self.scope_root(scope)?;
        let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(move |_records, _observer| {
            runtime::dispatch(HostEvent::Mutation(scope));
        });
        let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(err) => {
                log::warn!(target: "undub::platform", "could not create observer: {}", describe(&err));
                return None;
            }
        };

        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        if scope != MutationScope::Body {
            options.set_character_data(true);
        }
        if let Err(err) = observer.observe_with_options(&root, &options) {
            log::warn!(target: "undub::platform", "could not observe {scope:?}: {}", describe(&err));
            return None;
        }

        let id = self.next_id();
        self.observers.insert(id, Observer { observer, callback });
        Some(id)
    }

    fn disconnect(&mut self, observer: ObserverId) {
        if let Some(Observer { observer, callback }) = self.observers.remove(&observer) {
            observer.disconnect();
            self.retired.push(Box::new(callback));
        }
    }

    fn listen_for_navigation(&mut self, active: bool) {
        if let Some(listener) = self.navigation.take() {
            let _ = self
                .window
                .remove_event_listener_with_callback(NAVIGATE_FINISH_EVENT, listener.as_ref().unchecked_ref());
            self.retired.push(Box::new(listener));
        }
        if !active {
            return;
        }
        let listener = Closure::<dyn FnMut(Event)>::new(|_event: Event| runtime::dispatch(HostEvent::NavigationFinished));
        match self
            .window
            .add_event_listener_with_callback(NAVIGATE_FINISH_EVENT, listener.as_ref().unchecked_ref())
        {
            Ok(()) => self.navigation = Some(listener),
            Err(err) => log::warn!(target: "undub::platform", "could not listen for navigation: {}", describe(&err)),
        }
    }

    fn fetch_player_data(&mut self, request: PlayerRequest) -> RequestId {
        let request_id = self.next_id();
        wasm_bindgen_futures::spawn_local(async move {
            let result = fetch_player(&request).await.map_err(|err| err.to_string());
            runtime::dispatch(HostEvent::FetchCompleted(FetchOutcome {
                request_id,
                video: request.video_id,
                result,
            }));
        });
        request_id
    }
}
