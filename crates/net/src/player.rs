use core_types::VideoId;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::NetError;

pub const PLAYER_ENDPOINT: &str = "https://www.youtube.com/youtubei/v1/player";

// A fixed desktop client without hl/gl: the endpoint then answers with the
// uploader's own title and description instead of a localized copy.
pub const CLIENT_NAME: &str = "WEB";
pub const CLIENT_VERSION: &str = "2.20240726.00.00";

/// A single best-effort lookup of a video's untranslated details.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerRequest {
    pub video_id: VideoId,
    pub api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestBody<'a> {
    video_id: &'a str,
    context: RequestContext,
}

#[derive(Serialize)]
struct RequestContext {
    client: ClientContext,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientContext {
    client_name: &'static str,
    client_version: &'static str,
}

impl PlayerRequest {
    pub fn new(video_id: VideoId, api_key: impl Into<String>) -> Self {
        Self {
            video_id,
            api_key: api_key.into(),
        }
    }

    pub fn url(&self) -> Result<Url, NetError> {
        player_endpoint(&self.api_key)
    }

    /// JSON body for the `POST`.
    pub fn body(&self) -> String {
        let body = RequestBody {
            video_id: self.video_id.as_str(),
            context: RequestContext {
                client: ClientContext {
                    client_name: CLIENT_NAME,
                    client_version: CLIENT_VERSION,
                },
            },
        };
        // Serializing string fields into a fresh buffer cannot fail.
        serde_json::to_string(&body).unwrap_or_default()
    }
}

pub fn player_endpoint(api_key: &str) -> Result<Url, NetError> {
    Ok(Url::parse_with_params(
        PLAYER_ENDPOINT,
        &[("key", api_key), ("prettyPrint", "false")],
    )?)
}

/// Original (untranslated) details of one video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerDetails {
    /// Present when the payload names its video; absent in some trimmed
    /// responses.
    pub video_id: Option<VideoId>,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    #[serde(default)]
    video_details: Option<VideoDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoDetails {
    #[serde(default)]
    video_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    short_description: Option<String>,
}

impl VideoDetails {
    fn into_player_details(self) -> Result<PlayerDetails, NetError> {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(NetError::MissingTitle)?;
        Ok(PlayerDetails {
            video_id: self.video_id.as_deref().and_then(VideoId::new),
            title,
            description: self.short_description.filter(|d| !d.trim().is_empty()),
        })
    }
}

pub fn parse_player_response(body: &str) -> Result<PlayerDetails, NetError> {
    let response: PlayerResponse = serde_json::from_str(body)?;
    response
        .video_details
        .ok_or(NetError::MissingDetails)?
        .into_player_details()
}

/// Read the page-global initial player response the host renders into the
/// first page load.
///
/// Returns `None` unless the payload belongs to `expected`; after an in-app
/// navigation the global still describes the first video.
pub fn details_from_initial_response(
    value: &serde_json::Value,
    expected: &VideoId,
) -> Option<PlayerDetails> {
    let details = value.get("videoDetails")?;
    let details: VideoDetails = match serde_json::from_value(details.clone()) {
        Ok(details) => details,
        Err(err) => {
            log::debug!(target: "undub::net", "unreadable initial player response: {err}");
            return None;
        }
    };
    let details = details.into_player_details().ok()?;
    match &details.video_id {
        Some(id) if id == expected => Some(details),
        _ => None,
    }
}
