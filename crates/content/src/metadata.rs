//! Resolves and renders a video's untranslated title and description.

use std::collections::HashMap;

use core_types::VideoId;
use net::PlayerDetails;

use crate::{HostPage, selectors};

/// Kept by the host at the end of the document title.
pub const TITLE_SUFFIX: &str = " - YouTube";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OriginalMetadata {
    pub title: String,
    pub description: Option<String>,
}

impl From<PlayerDetails> for OriginalMetadata {
    fn from(details: PlayerDetails) -> Self {
        Self {
            title: details.title,
            description: details.description,
        }
    }
}

/// Authoritative metadata per video, filled from player lookups only.
/// Never evicted; a page lives for a handful of videos.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: HashMap<VideoId, OriginalMetadata>,
}

impl MetadataCache {
    pub fn get(&self, video: &VideoId) -> Option<&OriginalMetadata> {
        self.entries.get(video)
    }

    pub fn insert(&mut self, video: VideoId, metadata: OriginalMetadata) {
        self.entries.insert(video, metadata);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn first_content<H: HostPage>(host: &H, selector: &str) -> Option<String> {
    host.query_all(selector)
        .iter()
        .filter_map(|el| host.attribute(el, "content"))
        .map(|c| c.trim().to_string())
        .find(|c| !c.is_empty())
}

/// Schema tags, accepted only while they still name `video`; the host does
/// not refresh them on in-app navigation.
pub fn from_schema<H: HostPage>(host: &H, video: &VideoId) -> Option<OriginalMetadata> {
    let names_video = host
        .query_all(selectors::SCHEMA_VIDEO_ID)
        .iter()
        .filter_map(|el| host.attribute(el, "content"))
        .any(|c| c.trim() == video.as_str());
    if !names_video {
        return None;
    }
    Some(OriginalMetadata {
        title: first_content(host, selectors::SCHEMA_NAME)?,
        description: first_content(host, selectors::SCHEMA_DESCRIPTION),
    })
}

pub fn from_initial_response<H: HostPage>(host: &H, video: &VideoId) -> Option<OriginalMetadata> {
    let value = host.initial_player_response()?;
    net::details_from_initial_response(&value, video).map(OriginalMetadata::from)
}

/// Bound `text` to `max_chars` characters, marking a cut with an ellipsis.
pub fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.truncate(out.trim_end().len());
    out.push('…');
    out
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Title elements found on the page, written or not.
    pub title_targets: usize,
    pub writes: usize,
}

fn write_if_different<H: HostPage>(host: &mut H, selector: &str, text: &str) -> (usize, usize) {
    let targets = host.query_all(selector);
    let mut writes = 0;
    for el in &targets {
        if host.text_content(el) != text {
            host.set_text_content(el, text);
            writes += 1;
        }
    }
    (targets.len(), writes)
}

/// Render `metadata` into the page. Elements already showing the right
/// text are not touched.
pub fn apply<H: HostPage>(host: &mut H, metadata: &OriginalMetadata, snippet_len: usize) -> ApplyReport {
    let (title_targets, mut writes) = write_if_different(host, selectors::TITLE, &metadata.title);

    let document_title = host.document_title();
    if let Some(shown) = document_title.strip_suffix(TITLE_SUFFIX) {
        if shown != metadata.title {
            host.set_document_title(&format!("{}{TITLE_SUFFIX}", metadata.title));
            writes += 1;
        }
    }

    if let Some(description) = &metadata.description {
        writes += apply_description(host, description, snippet_len);
    }

    ApplyReport {
        title_targets,
        writes,
    }
}

pub fn apply_description<H: HostPage>(host: &mut H, description: &str, snippet_len: usize) -> usize {
    let (_, expanded) = write_if_different(host, selectors::DESCRIPTION_EXPANDED, description);
    let (_, snippet) = write_if_different(
        host,
        selectors::DESCRIPTION_SNIPPET,
        &clip(description, snippet_len),
    );
    expanded + snippet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_harness::FakeHost;
    use serde_json::json;

    fn vid(raw: &str) -> VideoId {
        VideoId::new(raw).unwrap()
    }

    fn original() -> OriginalMetadata {
        OriginalMetadata {
            title: "Original Title".into(),
            description: Some("Original description that is long enough".into()),
        }
    }

    #[test]
    fn apply_overwrites_translated_text_and_keeps_title_suffix() {
        let mut host = FakeHost::watch_page();
        let report = apply(&mut host, &original(), 12);

        assert_eq!(report.title_targets, 1);
        assert_eq!(host.doc.text_content(host.page.title), "Original Title");
        assert_eq!(host.doc.title(), "Original Title - YouTube");
        assert_eq!(
            host.doc.text_content(host.page.expanded),
            "Original description that is long enough"
        );
        assert_eq!(host.doc.text_content(host.page.snippet), "Original de…");
        assert_eq!(report.writes, 4);
    }

    #[test]
    fn second_apply_writes_nothing() {
        let mut host = FakeHost::watch_page();
        apply(&mut host, &original(), 200);
        let writes = host.dom_writes;

        let report = apply(&mut host, &original(), 200);
        assert_eq!(report.writes, 0);
        assert_eq!(host.dom_writes, writes);
    }

    #[test]
    fn document_title_without_suffix_is_left_alone() {
        let mut host = FakeHost::watch_page();
        host.doc.set_title("YouTube");
        apply(&mut host, &original(), 200);
        assert_eq!(host.doc.title(), "YouTube");
    }

    #[test]
    fn clip_bounds_characters_not_bytes() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("ééééé", 3), "éé…");
        assert_eq!(clip("abc def", 5), "abc…");
        assert_eq!(clip("abc", 0), "");
        assert!(clip(&"x".repeat(500), 200).chars().count() <= 200);
    }

    #[test]
    fn schema_needs_matching_video_id() {
        let host = FakeHost::watch_page();
        let meta = from_schema(&host, &vid("abc123")).expect("schema for current video");
        assert_eq!(meta.title, "Schema Title");
        assert_eq!(meta.description.as_deref(), Some("Schema description"));
        assert_eq!(from_schema(&host, &vid("xyz789")), None);
    }

    #[test]
    fn initial_response_is_read_for_matching_video() {
        let mut host = FakeHost::watch_page();
        host.initial_player_response = Some(json!({
            "videoDetails": { "videoId": "abc123", "title": "From Player", "shortDescription": "pd" }
        }));
        assert_eq!(
            from_initial_response(&host, &vid("abc123")),
            Some(OriginalMetadata {
                title: "From Player".into(),
                description: Some("pd".into())
            })
        );
        assert_eq!(from_initial_response(&host, &vid("xyz789")), None);
    }
}
