//! DOM contract of the host page.
//!
//! These break whenever the host ships a redesign; they can only be kept
//! current, not made robust.

/// Rendered video title, current and legacy layouts.
pub const TITLE: &str = "h1.ytd-watch-metadata yt-formatted-string, \
     h1.ytd-video-primary-info-renderer yt-formatted-string";

/// Element whose subtree is watched to reapply the description.
pub const DESCRIPTION_CONTAINER: &str =
    "#description-inline-expander, ytd-video-secondary-info-renderer #description";

/// Full description text.
pub const DESCRIPTION_EXPANDED: &str = "#description-inline-expander #expanded yt-attributed-string, \
     ytd-video-secondary-info-renderer #description yt-formatted-string";

/// Collapsed description preview.
pub const DESCRIPTION_SNIPPET: &str = "#description-inline-expander #snippet yt-attributed-string, \
     #description-inline-expander #attributed-snippet-text";

pub const SCHEMA_VIDEO_ID: &str = r#"meta[itemprop="videoId"], meta[itemprop="identifier"]"#;
pub const SCHEMA_NAME: &str = r#"meta[itemprop="name"]"#;
pub const SCHEMA_DESCRIPTION: &str = r#"meta[itemprop="description"]"#;

pub const MEDIA: &str = "#movie_player video, video.html5-main-video, video";

pub const SETTINGS_BUTTON: &str = ".ytp-settings-button";
pub const MENU_ITEM: &str = ".ytp-settings-menu .ytp-menuitem";
pub const MENU_ITEM_LABEL: &str = ".ytp-menuitem-label";
