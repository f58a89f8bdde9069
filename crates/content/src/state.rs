use core_types::VideoId;

/// Lifecycle of one page's scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Disabled,
    Initializing,
    Monitoring,
    ProcessingAudioMenu,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtensionState {
    pub enabled: bool,
    /// Listeners, observers and timers are attached.
    pub initialized: bool,
    /// A settings-menu automation is in flight.
    pub processing: bool,
    /// The menu automation already ran for the current video.
    pub has_applied_audio_fix: bool,
    pub current_video_id: Option<VideoId>,
}

impl ExtensionState {
    pub fn phase(&self) -> Phase {
        if !self.enabled {
            Phase::Disabled
        } else if !self.initialized {
            Phase::Initializing
        } else if self.processing {
            Phase::ProcessingAudioMenu
        } else {
            Phase::Monitoring
        }
    }
}
