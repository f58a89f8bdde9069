use std::collections::HashMap;
use std::time::Duration;

use bus::{ContentMessage, ContentResponse, FetchOutcome, HostEvent, MenuStep, MutationScope, Task};
use core_types::{ObserverId, RequestId, TimerId, VideoId};
use net::PlayerRequest;

use crate::metadata::{self, MetadataCache, OriginalMetadata};
use crate::{ContentConfig, ContentError, ExtensionState, HostPage, audio, prefs, url_params};

/// Observers that live as long as the scheduler is running.
const PAGE_SCOPES: [MutationScope; 2] = [MutationScope::DocumentTitle, MutationScope::Body];

/// The player lookup currently allowed to write to the page.
#[derive(Clone, Debug)]
struct PendingFetch {
    request_id: RequestId,
    video: VideoId,
}

/// One page's reconciliation loop.
///
/// Owns [`ExtensionState`] and every timer, observer and lookup it started.
/// The host reports back only through [`Scheduler::handle`]; while disabled,
/// anything but the settings load is dropped, so callbacks that were already
/// queued when the toggle flipped cannot touch the page.
pub struct Scheduler<H: HostPage> {
    host: H,
    config: ContentConfig,
    state: ExtensionState,

    cache: MetadataCache,
    /// Last metadata rendered for the current video; placeholder or final.
    applied: Option<OriginalMetadata>,
    api_key: Option<String>,
    pending_fetch: Option<PendingFetch>,
    fetch_attempts: HashMap<VideoId, u8>,
    metadata_attempts: u8,
    retry_pending: bool,

    repeating: Vec<TimerId>,
    one_shots: Vec<(TimerId, Task)>,
    observers: Vec<(MutationScope, ObserverId)>,
    description_observer: Option<ObserverId>,
    last_location: String,
}

impl<H: HostPage> Scheduler<H> {
    /// Claim the page for this instance. Nothing runs until the stored
    /// settings arrive as [`HostEvent::SettingsLoaded`].
    pub fn install(mut host: H, config: ContentConfig) -> Result<Self, ContentError> {
        if !host.claim_instance() {
            return Err(ContentError::AlreadyInstalled);
        }
        let last_location = host.location();
        Ok(Self {
            host,
            config,
            state: ExtensionState::default(),
            cache: MetadataCache::default(),
            applied: None,
            api_key: None,
            pending_fetch: None,
            fetch_attempts: HashMap::new(),
            metadata_attempts: 0,
            retry_pending: false,
            repeating: Vec::new(),
            one_shots: Vec::new(),
            observers: Vec::new(),
            description_observer: None,
            last_location,
        })
    }

    pub fn state(&self) -> &ExtensionState {
        &self.state
    }

    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn cached(&self, video: &VideoId) -> Option<&OriginalMetadata> {
        self.cache.get(video)
    }

    // -- Entry Points ---

    pub fn handle(&mut self, event: HostEvent) {
        if !self.state.enabled && !matches!(event, HostEvent::SettingsLoaded(_)) {
            log::trace!(target: "undub::scheduler", "disabled, dropping {event:?}");
            return;
        }
        match event {
            HostEvent::SettingsLoaded(settings) => {
                let enabled = match settings {
                    Ok(settings) => settings.enabled(),
                    Err(err) => {
                        log::warn!(target: "undub::scheduler", "could not read settings, assuming enabled: {err}");
                        true
                    }
                };
                if enabled {
                    self.start();
                } else {
                    log::info!(target: "undub::scheduler", "disabled in settings");
                }
            }
            HostEvent::Timer(task) => self.on_timer(task),
            HostEvent::NavigationFinished => self.on_navigation(),
            HostEvent::Mutation(scope) => self.on_mutation(scope),
            HostEvent::FetchCompleted(outcome) => self.on_fetch_completed(outcome),
        }
    }

    pub fn on_message(&mut self, message: ContentMessage) -> ContentResponse {
        match message {
            ContentMessage::ToggleEnabled { enabled: true } => self.start(),
            ContentMessage::ToggleEnabled { enabled: false } => self.stop(),
        }
        ContentResponse::ok(self.state.enabled)
    }

    /// Attach listeners and timers. A no-op when already running.
    pub fn start(&mut self) {
        self.state.enabled = true;
        if self.state.initialized {
            return;
        }

        prefs::ensure_preference(&mut self.host);
        self.strip_translation_params();
        self.last_location = self.host.location();
        self.host.listen_for_navigation(true);
        self.ensure_page_observers();

        let audio = self
            .host
            .schedule_repeating(self.config.audio_poll_interval, Task::AudioPoll);
        let metadata = self
            .host
            .schedule_repeating(self.config.metadata_poll_interval, Task::MetadataPoll);
        self.repeating.extend([audio, metadata]);
        self.schedule_once(self.config.initial_check_delay, Task::InitialCheck);

        self.sync_video_id();
        self.state.initialized = true;
        log::info!(target: "undub::scheduler", "started on {}", self.last_location);
    }

    /// Tear down everything [`Scheduler::start`] attached and forget the
    /// in-flight lookup, so its result is dropped if it still arrives.
    pub fn stop(&mut self) {
        if !self.state.enabled && !self.state.initialized {
            return;
        }
        if self.state.processing {
            audio::close_settings_menu(&mut self.host);
        }
        for timer in self.repeating.drain(..) {
            self.host.cancel_timer(timer);
        }
        for (timer, _) in self.one_shots.drain(..) {
            self.host.cancel_timer(timer);
        }
        for (_, observer) in self.observers.drain(..) {
            self.host.disconnect(observer);
        }
        self.drop_description_observer();
        self.host.listen_for_navigation(false);

        self.pending_fetch = None;
        self.retry_pending = false;
        self.state.enabled = false;
        self.state.initialized = false;
        self.state.processing = false;
        log::info!(target: "undub::scheduler", "stopped");
    }

    // -- Triggers ---

    fn on_timer(&mut self, task: Task) {
        if !matches!(task, Task::AudioPoll | Task::MetadataPoll) {
            let Some(pos) = self.one_shots.iter().position(|(_, t)| *t == task) else {
                log::debug!(target: "undub::scheduler", "ignoring unscheduled {task:?}");
                return;
            };
            self.one_shots.remove(pos);
        }

        match task {
            Task::AudioPoll => self.check_audio(),
            Task::MetadataPoll => self.check_metadata(),
            Task::InitialCheck | Task::NavigationSettle => {
                self.check_metadata();
                self.check_audio();
            }
            Task::MetadataRetry { attempt } => {
                self.retry_pending = false;
                self.metadata_attempts = attempt;
                self.check_metadata();
            }
            Task::MenuStep { video, step } => self.on_menu_step(video, step),
        }
    }

    fn on_navigation(&mut self) {
        log::debug!(target: "undub::scheduler", "navigation finished: {}", self.host.location());
        self.state.has_applied_audio_fix = false;
        prefs::ensure_preference(&mut self.host);
        self.strip_translation_params();
        self.last_location = self.host.location();
        self.drop_description_observer();
        self.ensure_page_observers();
        self.sync_video_id();
        self.schedule_once(self.config.navigation_settle_delay, Task::NavigationSettle);
    }

    fn on_mutation(&mut self, scope: MutationScope) {
        match scope {
            MutationScope::Body => {
                if self.host.location() != self.last_location {
                    log::debug!(target: "undub::scheduler", "location changed without a navigation event");
                    self.on_navigation();
                } else {
                    self.check_metadata();
                }
            }
            MutationScope::DocumentTitle => self.check_metadata(),
            MutationScope::Description => self.reapply_description(),
        }
    }

    // -- Metadata ---

    fn check_metadata(&mut self) {
        self.sync_video_id();
        let Some(video) = self.state.current_video_id.clone() else {
            return;
        };

        if let Some(original) = self.cache.get(&video).cloned() {
            self.apply_metadata(&video, &original);
            return;
        }

        let placeholder = self.applied.clone().or_else(|| {
            metadata::from_schema(&self.host, &video)
                .or_else(|| metadata::from_initial_response(&self.host, &video))
        });
        if let Some(placeholder) = placeholder {
            self.apply_metadata(&video, &placeholder);
        }
        self.request_original(&video);
    }

    fn apply_metadata(&mut self, video: &VideoId, original: &OriginalMetadata) {
        if self.state.current_video_id.as_ref() != Some(video) {
            log::debug!(target: "undub::metadata", "not applying metadata of {video}, no longer current");
            return;
        }

        let report = metadata::apply(&mut self.host, original, self.config.description_snippet_len);
        if report.writes > 0 {
            log::info!(
                target: "undub::metadata",
                "restored original metadata for {video} ({} writes)",
                report.writes
            );
        }
        self.applied = Some(original.clone());

        if report.title_targets == 0 {
            self.schedule_retry();
        }
        if self.description_observer.is_none() && original.description.is_some() {
            self.description_observer = self.host.observe(MutationScope::Description);
        }
    }

    fn reapply_description(&mut self) {
        let Some(description) = self.applied.as_ref().and_then(|m| m.description.clone()) else {
            return;
        };
        let writes = metadata::apply_description(&mut self.host, &description, self.config.description_snippet_len);
        if writes > 0 {
            log::debug!(target: "undub::metadata", "description re-rendered by host, restored it");
        }
    }

    fn schedule_retry(&mut self) {
        if self.retry_pending {
            return;
        }
        if self.metadata_attempts >= self.config.max_metadata_attempts {
            log::debug!(
                target: "undub::metadata",
                "title still missing after {} attempts",
                self.metadata_attempts
            );
            return;
        }
        self.retry_pending = true;
        let attempt = self.metadata_attempts + 1;
        self.schedule_once(self.config.metadata_retry_delay, Task::MetadataRetry { attempt });
    }

    fn api_key(&mut self) -> Option<String> {
        if self.api_key.is_none() {
            self.api_key = net::extract_api_key(&self.host.page_source());
        }
        self.api_key.clone()
    }

    fn request_original(&mut self, video: &VideoId) {
        if self.cache.get(video).is_some() {
            return;
        }
        if self.pending_fetch.as_ref().is_some_and(|p| &p.video == video) {
            return;
        }
        let attempts = self.fetch_attempts.get(video).copied().unwrap_or(0);
        if attempts >= self.config.max_fetch_attempts {
            return;
        }
        let Some(api_key) = self.api_key() else {
            log::debug!(target: "undub::metadata", "no API key on the page, skipping player lookup");
            return;
        };

        self.fetch_attempts.insert(video.clone(), attempts + 1);
        let request_id = self
            .host
            .fetch_player_data(PlayerRequest::new(video.clone(), api_key));
        log::debug!(target: "undub::metadata", "requested player data for {video} (request {request_id})");
        self.pending_fetch = Some(PendingFetch {
            request_id,
            video: video.clone(),
        });
    }

    fn on_fetch_completed(&mut self, outcome: FetchOutcome) {
        let Some(pending) = self
            .pending_fetch
            .take_if(|p| p.request_id == outcome.request_id)
        else {
            log::debug!(
                target: "undub::metadata",
                "dropping result of superseded request {}",
                outcome.request_id
            );
            return;
        };

        let details = match outcome.result {
            Ok(details) => details,
            Err(err) => {
                log::warn!(target: "undub::metadata", "player lookup for {} failed: {err}", pending.video);
                return;
            }
        };
        if details.video_id.as_ref().is_some_and(|id| *id != pending.video) {
            log::warn!(target: "undub::metadata", "player data answered for another video than {}", pending.video);
            return;
        }

        let original = OriginalMetadata::from(details);
        self.cache.insert(pending.video.clone(), original.clone());
        if self.state.current_video_id.as_ref() != Some(&pending.video) {
            log::debug!(target: "undub::metadata", "discarding stale player data for {}", pending.video);
            return;
        }
        self.apply_metadata(&pending.video, &original);
    }

    // -- Audio ---

    fn check_audio(&mut self) {
        self.sync_video_id();
        if self.state.current_video_id.is_none() {
            return;
        }
        let correction = audio::correct_tracks(&mut self.host);
        if correction.took_effect() || self.state.has_applied_audio_fix || self.state.processing {
            return;
        }
        self.start_menu_automation();
    }

    fn start_menu_automation(&mut self) {
        let Some(video) = self.state.current_video_id.clone() else {
            return;
        };
        if !audio::open_settings_menu(&mut self.host) {
            log::debug!(target: "undub::audio", "settings button not rendered yet");
            return;
        }
        self.state.processing = true;
        log::debug!(target: "undub::audio", "track list not honored, using settings menu for {video}");
        self.schedule_once(
            self.config.menu_step_delay,
            Task::MenuStep {
                video,
                step: MenuStep::OpenAudioSubmenu,
            },
        );
    }

    fn on_menu_step(&mut self, video: VideoId, step: MenuStep) {
        if !self.state.processing {
            return;
        }
        if self.state.current_video_id.as_ref() != Some(&video) {
            log::debug!(target: "undub::audio", "video changed during menu automation, closing menu");
            audio::close_settings_menu(&mut self.host);
            self.state.processing = false;
            return;
        }
        match audio::run_menu_step(&mut self.host, step) {
            Some(next) => self.schedule_once(self.config.menu_step_delay, Task::MenuStep { video, step: next }),
            None => {
                self.state.processing = false;
                self.state.has_applied_audio_fix = true;
            }
        }
    }

    // -- Helpers ---

    /// Follow the location's video id. A change forgets everything that was
    /// specific to the previous video.
    fn sync_video_id(&mut self) {
        let video = url_params::video_id_from_url(&self.host.location());
        if video == self.state.current_video_id {
            return;
        }
        log::info!(
            target: "undub::scheduler",
            "current video: {}",
            video.as_ref().map_or("none", VideoId::as_str)
        );
        self.state.current_video_id = video;
        self.state.has_applied_audio_fix = false;
        self.applied = None;
        self.metadata_attempts = 0;
        self.drop_description_observer();
        if self.retry_pending {
            self.retry_pending = false;
            self.cancel_one_shot(|t| matches!(t, Task::MetadataRetry { .. }));
        }
    }

    fn strip_translation_params(&mut self) {
        let location = self.host.location();
        let Some(clean) = url_params::strip_translation_params(&location) else {
            return;
        };
        match self.host.replace_location(&clean) {
            Ok(()) => log::info!(target: "undub::scheduler", "removed translation parameters: {clean}"),
            Err(err) => log::warn!(target: "undub::scheduler", "could not rewrite location: {err}"),
        }
    }

    fn ensure_page_observers(&mut self) {
        for scope in PAGE_SCOPES {
            if self.observers.iter().any(|(s, _)| *s == scope) {
                continue;
            }
            if let Some(observer) = self.host.observe(scope) {
                self.observers.push((scope, observer));
            }
        }
    }

    fn drop_description_observer(&mut self) {
        if let Some(observer) = self.description_observer.take() {
            self.host.disconnect(observer);
        }
    }

    /// Arm `task` once; an identical task still pending is replaced.
    fn schedule_once(&mut self, delay: Duration, task: Task) {
        self.cancel_one_shot(|t| *t == task);
        let timer = self.host.schedule(delay, task.clone());
        self.one_shots.push((timer, task));
    }

    fn cancel_one_shot(&mut self, mut pred: impl FnMut(&Task) -> bool) {
        let host = &mut self.host;
        self.one_shots.retain(|(timer, task)| {
            if pred(task) {
                host.cancel_timer(*timer);
                false
            } else {
                true
            }
        });
    }
}
