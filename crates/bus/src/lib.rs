use core_types::{RequestId, VideoId};
use net::PlayerDetails;
use serde::{Deserialize, Serialize};

/// Work the scheduler hands to the host's timers; the host gives it back
/// unchanged as [`HostEvent::Timer`] once due.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    AudioPoll,
    MetadataPoll,
    InitialCheck,
    NavigationSettle,
    MetadataRetry { attempt: u8 },
    MenuStep { video: VideoId, step: MenuStep },
}

/// Stages of the settings-menu automation. Opening the menu happens
/// synchronously; each variant here runs one step delay later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuStep {
    OpenAudioSubmenu,
    PickOriginal,
    Close,
}

/// Subtrees the scheduler watches for host re-renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationScope {
    DocumentTitle,
    Body,
    Description,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOutcome {
    pub request_id: RequestId,
    pub video: VideoId,
    pub result: Result<PlayerDetails, String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    SettingsLoaded(Result<StoredSettings, String>),
    Timer(Task),
    NavigationFinished,
    Mutation(MutationScope),
    FetchCompleted(FetchOutcome),
}

/// Settings persisted in shared extension storage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl StoredSettings {
    pub const KEYS: [&'static str; 1] = ["enabled"];

    /// Unset means on.
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// Message from the popup to a content script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ContentMessage {
    #[serde(rename = "toggleEnabled")]
    ToggleEnabled { enabled: bool },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl ContentResponse {
    pub fn ok(enabled: bool) -> Self {
        Self {
            success: true,
            enabled: Some(enabled),
        }
    }
}
