//! Keeps the original audio track selected.
//!
//! Two ways exist. The declarative one flips `enabled` on the media
//! element's track list and is cheap enough to run on every poll. When the
//! list is missing or the player ignores it, the scheduler falls back to
//! driving the player's settings menu, one step per [`MenuStep`].

use bus::MenuStep;

use crate::{AudioTrack, HostPage, labels, selectors};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackCorrection {
    /// No media element or no exposed track list.
    Unavailable,
    SingleTrack,
    AlreadyOriginal,
    Corrected { index: usize },
    /// The flags were written but the player did not keep them.
    Ignored,
}

impl TrackCorrection {
    pub fn took_effect(self) -> bool {
        matches!(
            self,
            TrackCorrection::SingleTrack
                | TrackCorrection::AlreadyOriginal
                | TrackCorrection::Corrected { .. }
        )
    }
}

fn is_dubbed(track: &AudioTrack) -> bool {
    labels::matches_any(&track.label, labels::DUBBED)
}

/// Index 0 unless it is labelled as a dub and some other track is not.
pub fn original_track_index(tracks: &[AudioTrack]) -> usize {
    match tracks.first() {
        Some(first) if is_dubbed(first) => tracks.iter().position(|t| !is_dubbed(t)).unwrap_or(0),
        _ => 0,
    }
}

fn only_enabled(tracks: &[AudioTrack], index: usize) -> bool {
    tracks.iter().enumerate().all(|(i, t)| t.enabled == (i == index))
}

/// Make the original track the only enabled one. Writes nothing when the
/// list is already in that state.
pub fn correct_tracks<H: HostPage>(host: &mut H) -> TrackCorrection {
    let Some(tracks) = host.audio_tracks() else {
        return TrackCorrection::Unavailable;
    };
    if tracks.len() < 2 {
        return TrackCorrection::SingleTrack;
    }
    let target = original_track_index(&tracks);
    if only_enabled(&tracks, target) {
        return TrackCorrection::AlreadyOriginal;
    }

    for (index, track) in tracks.iter().enumerate() {
        let want = index == target;
        if track.enabled != want {
            host.set_audio_track_enabled(index, want);
        }
    }

    match host.audio_tracks() {
        Some(after) if only_enabled(&after, target) => {
            log::info!(
                target: "undub::audio",
                "switched to original audio track {target} ({:?})",
                tracks[target].label
            );
            TrackCorrection::Corrected { index: target }
        }
        _ => TrackCorrection::Ignored,
    }
}

fn settings_button<H: HostPage>(host: &H) -> Option<H::Element> {
    host.query_all(selectors::SETTINGS_BUTTON).into_iter().next()
}

/// Click the settings button. `false` if the player has not rendered it.
pub fn open_settings_menu<H: HostPage>(host: &mut H) -> bool {
    let Some(button) = settings_button(host) else {
        return false;
    };
    host.click(&button);
    true
}

pub fn close_settings_menu<H: HostPage>(host: &mut H) {
    let Some(button) = settings_button(host) else {
        return;
    };
    if host.attribute(&button, "aria-expanded").as_deref() == Some("true") {
        host.click(&button);
    }
}

fn menu_item_label<H: HostPage>(host: &H, item: &H::Element) -> String {
    match host.query_within(item, selectors::MENU_ITEM_LABEL).first() {
        Some(label) => host.text_content(label),
        None => host.text_content(item),
    }
}

/// First visible menu item whose label matches `table`. With
/// `skip_selected`, items already marked checked are passed over.
pub fn find_menu_item<H: HostPage>(host: &H, table: &[&str], skip_selected: bool) -> Option<H::Element> {
    host.query_all(selectors::MENU_ITEM).into_iter().find(|item| {
        if skip_selected && host.attribute(item, "aria-checked").as_deref() == Some("true") {
            return false;
        }
        labels::matches_any(&menu_item_label(host, item), table)
    })
}

/// Run one automation step and return the next, or `None` once the menu
/// is closed again.
pub fn run_menu_step<H: HostPage>(host: &mut H, step: MenuStep) -> Option<MenuStep> {
    match step {
        MenuStep::OpenAudioSubmenu => match find_menu_item(host, labels::AUDIO_TRACK, false) {
            Some(entry) => {
                host.click(&entry);
                Some(MenuStep::PickOriginal)
            }
            None => {
                log::debug!(target: "undub::audio", "settings menu has no audio track entry");
                close_settings_menu(host);
                None
            }
        },
        MenuStep::PickOriginal => {
            match find_menu_item(host, labels::ORIGINAL, true) {
                Some(item) => {
                    log::info!(target: "undub::audio", "selecting original audio track from settings menu");
                    host.click(&item);
                }
                None => log::debug!(target: "undub::audio", "original track already selected or not offered"),
            }
            Some(MenuStep::Close)
        }
        MenuStep::Close => {
            close_settings_menu(host);
            None
        }
    }
}
