//! Simulated host page for scheduler tests.
//!
//! The page is a [`dom::Document`]; timers run on a virtual clock and only
//! fire from [`advance`], mutation records reach the scheduler only from
//! [`deliver_mutations`], so each test decides exactly which callbacks have
//! happened.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use bus::{FetchOutcome, HostEvent, MutationScope, StoredSettings, Task};
use core_types::{ObserverId, RequestId, TimerId};
use dom::{Document, Id};
use net::{PlayerDetails, PlayerRequest};

use crate::{AudioTrack, ContentConfig, HostError, HostPage, Scheduler, selectors};

pub const WATCH_URL: &str = "https://www.youtube.com/watch?v=abc123";
pub const API_KEY: &str = "AIzaTestKey";

#[derive(Clone, Copy, Debug)]
pub struct PageIds {
    pub title: Id,
    pub container: Id,
    pub snippet: Id,
    pub expanded: Id,
}

#[derive(Clone, Debug)]
pub struct FakeTimer {
    pub id: TimerId,
    pub due: Duration,
    pub period: Option<Duration>,
    pub task: Task,
}

pub struct FakeHost {
    pub doc: Document,
    pub page: PageIds,
    pub location: String,
    pub instance_marker: Rc<Cell<bool>>,
    pub cookies: Vec<(String, String)>,
    pub cookie_writes: Vec<String>,
    pub reject_cookies: bool,
    pub tracks: Option<Vec<AudioTrack>>,
    pub ignore_track_writes: bool,
    pub track_writes: usize,
    pub initial_player_response: Option<serde_json::Value>,
    pub page_source: String,
    pub now: Duration,
    pub timers: Vec<FakeTimer>,
    pub observers: Vec<(ObserverId, MutationScope)>,
    pub navigation_listener: bool,
    pub fetches: Vec<(RequestId, PlayerRequest)>,
    pub clicks: Vec<Id>,
    pub dom_writes: usize,
    pub replaced_locations: Vec<String>,
    next_id: u64,
}

impl FakeHost {
    pub fn new() -> Self {
        let doc = Document::new();
        let root = doc.root();
        Self {
            doc,
            page: PageIds {
                title: root,
                container: root,
                snippet: root,
                expanded: root,
            },
            location: WATCH_URL.to_string(),
            instance_marker: Rc::new(Cell::new(false)),
            cookies: Vec::new(),
            cookie_writes: Vec::new(),
            reject_cookies: false,
            tracks: None,
            ignore_track_writes: false,
            track_writes: 0,
            initial_player_response: None,
            page_source: String::new(),
            now: Duration::ZERO,
            timers: Vec::new(),
            observers: Vec::new(),
            navigation_listener: false,
            fetches: Vec::new(),
            clicks: Vec::new(),
            dom_writes: 0,
            replaced_locations: Vec::new(),
            next_id: 1,
        }
    }

    /// A watch page for `abc123` rendered in translation, with schema tags
    /// naming the video and the API key in the inline config.
    pub fn watch_page() -> Self {
        let mut host = Self::new();
        let doc = &mut host.doc;
        doc.set_title("Titre traduit - YouTube");
        let head = doc.head();
        doc.append_element(head, "meta", &[("itemprop", "videoId"), ("content", "abc123")]);
        doc.append_element(head, "meta", &[("itemprop", "name"), ("content", "Schema Title")]);
        doc.append_element(head, "meta", &[("itemprop", "description"), ("content", "Schema description")]);

        let body = doc.body();
        let metadata = doc.append_element(body, "ytd-watch-metadata", &[]);
        let h1 = doc.append_element(metadata, "h1", &[("class", "style-scope ytd-watch-metadata")]);
        let title = doc.append_element(h1, "yt-formatted-string", &[]);
        doc.append_text(title, "Titre traduit");

        let container = doc.append_element(
            metadata,
            "ytd-text-inline-expander",
            &[("id", "description-inline-expander")],
        );
        let snippet_box = doc.append_element(container, "div", &[("id", "snippet")]);
        let snippet = doc.append_element(snippet_box, "yt-attributed-string", &[]);
        doc.append_text(snippet, "Description tra…");
        let expanded_box = doc.append_element(container, "div", &[("id", "expanded")]);
        let expanded = doc.append_element(expanded_box, "yt-attributed-string", &[]);
        doc.append_text(expanded, "Description traduite");
        doc.take_mutations();

        host.page = PageIds {
            title,
            container,
            snippet,
            expanded,
        };
        host.page_source = format!(r#"<script>ytcfg.set({{"INNERTUBE_API_KEY":"{API_KEY}"}});</script>"#);
        host
    }

    /// Another handle on the same page: shares the installation marker.
    pub fn same_page_as(other: &FakeHost) -> Self {
        let mut host = Self::new();
        host.instance_marker = Rc::clone(&other.instance_marker);
        host
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn scope_roots(&self, scope: MutationScope) -> Vec<Id> {
        match scope {
            MutationScope::DocumentTitle => self
                .doc
                .query_selector_all_within(self.doc.head(), "title")
                .expect("valid selector"),
            MutationScope::Body => vec![self.doc.body()],
            MutationScope::Description => self
                .doc
                .query_selector_all(selectors::DESCRIPTION_CONTAINER)
                .expect("valid selector"),
        }
    }

    /// Pop the earliest timer due by `deadline`, advancing the clock to it.
    fn pop_due(&mut self, deadline: Duration) -> Option<Task> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= deadline)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;
        let FakeTimer { due, period, task, .. } = self.timers[index].clone();
        self.now = due;
        match period {
            Some(period) => self.timers[index].due += period,
            None => {
                self.timers.remove(index);
            }
        }
        Some(task)
    }

    pub fn has_timer(&self, task: &Task) -> bool {
        self.timers.iter().any(|t| &t.task == task)
    }

    pub fn observes(&self, scope: MutationScope) -> bool {
        self.observers.iter().any(|(_, s)| *s == scope)
    }
}

impl HostPage for FakeHost {
    type Element = Id;

    fn claim_instance(&mut self) -> bool {
        !self.instance_marker.replace(true)
    }

    fn location(&self) -> String {
        self.location.clone()
    }

    fn replace_location(&mut self, url: &str) -> Result<(), HostError> {
        self.location = url.to_string();
        self.replaced_locations.push(url.to_string());
        Ok(())
    }

    fn query_all(&self, selectors: &str) -> Vec<Id> {
        self.doc.query_selector_all(selectors).expect("valid selector")
    }

    fn query_within(&self, scope: &Id, selectors: &str) -> Vec<Id> {
        self.doc
            .query_selector_all_within(*scope, selectors)
            .expect("valid selector")
    }

    fn text_content(&self, element: &Id) -> String {
        self.doc.text_content(*element)
    }

    fn set_text_content(&mut self, element: &Id, text: &str) {
        self.dom_writes += 1;
        self.doc.set_text_content(*element, text);
    }

    fn attribute(&self, element: &Id, name: &str) -> Option<String> {
        self.doc.attribute(*element, name).map(str::to_string)
    }

    fn click(&mut self, element: &Id) {
        self.clicks.push(*element);
        let is_settings_button = self
            .doc
            .attribute(*element, "class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == "ytp-settings-button"));
        if is_settings_button {
            let open = self.doc.attribute(*element, "aria-expanded") == Some("true");
            self.doc
                .set_attribute(*element, "aria-expanded", if open { "false" } else { "true" });
        }
    }

    fn document_title(&self) -> String {
        self.doc.title()
    }

    fn set_document_title(&mut self, title: &str) {
        self.dom_writes += 1;
        self.doc.set_title(title);
    }

    fn page_source(&self) -> String {
        self.page_source.clone()
    }

    fn initial_player_response(&self) -> Option<serde_json::Value> {
        self.initial_player_response.clone()
    }

    fn audio_tracks(&self) -> Option<Vec<AudioTrack>> {
        self.tracks.clone()
    }

    fn set_audio_track_enabled(&mut self, index: usize, enabled: bool) {
        self.track_writes += 1;
        if self.ignore_track_writes {
            return;
        }
        if let Some(track) = self.tracks.as_mut().and_then(|t| t.get_mut(index)) {
            track.enabled = enabled;
        }
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn set_cookie(&mut self, cookie: &str) -> Result<(), HostError> {
        if self.reject_cookies {
            return Err(HostError::CookieRejected(cookie.to_string()));
        }
        let pair = cookie.split(';').next().unwrap_or_default();
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        self.cookies.retain(|(k, _)| k != name);
        self.cookies.push((name.to_string(), value.to_string()));
        self.cookie_writes.push(cookie.to_string());
        Ok(())
    }

    fn schedule(&mut self, delay: Duration, task: Task) -> TimerId {
        let id = self.next_id();
        self.timers.push(FakeTimer {
            id,
            due: self.now + delay,
            period: None,
            task,
        });
        id
    }

    fn schedule_repeating(&mut self, period: Duration, task: Task) -> TimerId {
        let id = self.next_id();
        self.timers.push(FakeTimer {
            id,
            due: self.now + period,
            period: Some(period),
            task,
        });
        id
    }

    fn cancel_timer(&mut self, timer: TimerId) {
        self.timers.retain(|t| t.id != timer);
    }

    fn observe(&mut self, scope: MutationScope) -> Option<ObserverId> {
        if self.scope_roots(scope).is_empty() {
            return None;
        }
        let id = self.next_id();
        self.observers.push((id, scope));
        Some(id)
    }

    fn disconnect(&mut self, observer: ObserverId) {
        self.observers.retain(|(id, _)| *id != observer);
    }

    fn listen_for_navigation(&mut self, active: bool) {
        self.navigation_listener = active;
    }

    fn fetch_player_data(&mut self, request: PlayerRequest) -> RequestId {
        let id = self.next_id();
        self.fetches.push((id, request));
        id
    }
}

/// Player settings menu: a settings button, one main-panel entry and the
/// audio-track items as they appear once the submenu is open.
pub struct SettingsMenu {
    pub button: Id,
    pub audio_entry: Id,
    pub tracks: Vec<Id>,
}

impl SettingsMenu {
    pub fn install(host: &mut FakeHost, entry_label: &str, tracks: &[(&str, bool)]) -> Self {
        let doc = &mut host.doc;
        let body = doc.body();
        let player = doc.append_element(body, "div", &[("id", "movie_player")]);
        let button = doc.append_element(
            player,
            "button",
            &[("class", "ytp-button ytp-settings-button"), ("aria-expanded", "false")],
        );
        let menu = doc.append_element(player, "div", &[("class", "ytp-popup ytp-settings-menu")]);
        let panel = doc.append_element(menu, "div", &[("class", "ytp-panel")]);

        let audio_entry = doc.append_element(panel, "div", &[("class", "ytp-menuitem")]);
        let label = doc.append_element(audio_entry, "div", &[("class", "ytp-menuitem-label")]);
        doc.append_text(label, entry_label);

        let tracks = tracks
            .iter()
            .map(|(text, selected)| {
                let item = doc.append_element(
                    panel,
                    "div",
                    &[
                        ("class", "ytp-menuitem"),
                        ("role", "menuitemradio"),
                        ("aria-checked", if *selected { "true" } else { "false" }),
                    ],
                );
                let label = doc.append_element(item, "div", &[("class", "ytp-menuitem-label")]);
                doc.append_text(label, text);
                item
            })
            .collect();
        doc.take_mutations();

        Self {
            button,
            audio_entry,
            tracks,
        }
    }
}

pub fn installed(host: FakeHost) -> Scheduler<FakeHost> {
    Scheduler::install(host, ContentConfig::default()).expect("first install on the page")
}

/// Install on a watch page and load settings with nothing stored.
pub fn started(host: FakeHost) -> Scheduler<FakeHost> {
    let mut scheduler = installed(host);
    scheduler.handle(HostEvent::SettingsLoaded(Ok(StoredSettings::default())));
    scheduler
}

/// Hand pending mutation records to the observers whose subtree they
/// touch, one callback per observer per round, until the page is quiet.
pub fn deliver_mutations(scheduler: &mut Scheduler<FakeHost>) {
    for _ in 0..16 {
        let host = scheduler.host_mut();
        let mutations = host.doc.take_mutations();
        if mutations.is_empty() {
            return;
        }
        let mut hit: Vec<MutationScope> = Vec::new();
        for (_, scope) in &host.observers {
            let roots = host.scope_roots(*scope);
            let touched = mutations
                .iter()
                .any(|m| roots.iter().any(|&root| host.doc.contains(root, m.target())));
            if touched && !hit.contains(scope) {
                hit.push(*scope);
            }
        }
        for scope in hit {
            scheduler.handle(HostEvent::Mutation(scope));
        }
    }
    panic!("mutation callbacks keep re-triggering each other");
}

/// Run the virtual clock forward, firing due timers in order and
/// delivering the mutations each callback causes.
pub fn advance(scheduler: &mut Scheduler<FakeHost>, by: Duration) {
    let deadline = scheduler.host().now + by;
    loop {
        deliver_mutations(scheduler);
        let Some(task) = scheduler.host_mut().pop_due(deadline) else {
            break;
        };
        scheduler.handle(HostEvent::Timer(task));
    }
    scheduler.host_mut().now = deadline;
}

/// Resolve the `index`-th issued player lookup with `result`.
pub fn complete_fetch(
    scheduler: &mut Scheduler<FakeHost>,
    index: usize,
    result: Result<PlayerDetails, String>,
) {
    let (request_id, request) = scheduler.host().fetches[index].clone();
    scheduler.handle(HostEvent::FetchCompleted(FetchOutcome {
        request_id,
        video: request.video_id,
        result,
    }));
    deliver_mutations(scheduler);
}

pub fn details(video: &str, title: &str, description: &str) -> PlayerDetails {
    PlayerDetails {
        video_id: core_types::VideoId::new(video),
        title: title.to_string(),
        description: Some(description.to_string()),
    }
}
