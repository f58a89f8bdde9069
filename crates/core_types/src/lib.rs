use std::fmt;

pub type RequestId = u64;
pub type TimerId = u64;
pub type ObserverId = u64;

const MAX_VIDEO_ID_LEN: usize = 64;

/// Identifier of a watch/shorts page as it appears in the page URL.
///
/// Only the URL-safe base64 alphabet is accepted, so a `VideoId` can be
/// placed in a URL, a JSON body or a log line without escaping.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.len() > MAX_VIDEO_ID_LEN {
            return None;
        }
        if !raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
