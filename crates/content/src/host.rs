use std::time::Duration;

use bus::{MutationScope, Task};
use core_types::{ObserverId, RequestId, TimerId};
use net::PlayerRequest;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("cookie write was rejected: {0}")]
    CookieRejected(String),
    #[error("history update failed: {0}")]
    History(String),
}

/// One entry of the media element's audio track list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AudioTrack {
    pub label: String,
    pub enabled: bool,
}

/// Everything the engine needs from the page it runs in.
///
/// All calls are synchronous except the ones that complete later through a
/// [`bus::HostEvent`]: scheduled tasks come back as `Timer`, observed
/// subtrees as `Mutation`, the navigation listener as `NavigationFinished`
/// and player lookups as `FetchCompleted`.
///
/// Lookups never fail: an absent element, attribute or API reads as empty.
pub trait HostPage {
    type Element: Clone;

    /// Set the page-global installation marker; `false` if another instance
    /// set it first.
    fn claim_instance(&mut self) -> bool;

    fn location(&self) -> String;
    /// Replace the current history entry without reloading.
    fn replace_location(&mut self, url: &str) -> Result<(), HostError>;

    fn query_all(&self, selectors: &str) -> Vec<Self::Element>;
    fn query_within(&self, scope: &Self::Element, selectors: &str) -> Vec<Self::Element>;
    fn text_content(&self, element: &Self::Element) -> String;
    fn set_text_content(&mut self, element: &Self::Element, text: &str);
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn click(&mut self, element: &Self::Element);

    fn document_title(&self) -> String;
    fn set_document_title(&mut self, title: &str);

    /// Serialized page markup, scanned for the embedded API key.
    fn page_source(&self) -> String;
    /// The page-global initial player response, if the host rendered one.
    fn initial_player_response(&self) -> Option<serde_json::Value>;

    /// `None` when the media element or its track list is not exposed.
    fn audio_tracks(&self) -> Option<Vec<AudioTrack>>;
    fn set_audio_track_enabled(&mut self, index: usize, enabled: bool);

    fn cookie(&self, name: &str) -> Option<String>;
    /// Write a full `Set-Cookie`-style string (`name=value; attr; ...`).
    fn set_cookie(&mut self, cookie: &str) -> Result<(), HostError>;

    fn schedule(&mut self, delay: Duration, task: Task) -> TimerId;
    fn schedule_repeating(&mut self, period: Duration, task: Task) -> TimerId;
    /// Unknown or already fired ids are ignored.
    fn cancel_timer(&mut self, timer: TimerId);

    /// `None` if the scope's root element is not rendered yet.
    fn observe(&mut self, scope: MutationScope) -> Option<ObserverId>;
    fn disconnect(&mut self, observer: ObserverId);
    fn listen_for_navigation(&mut self, active: bool);

    fn fetch_player_data(&mut self, request: PlayerRequest) -> RequestId;
}
