use core_types::VideoId;
use url::Url;

/// Query parameters through which the host forces an interface locale.
pub const TRANSLATION_PARAMS: [&str; 4] = ["hl", "gl", "persist_hl", "persist_gl"];

/// Video shown by a watch, shorts or live URL; `None` on every other page.
pub fn video_id_from_url(raw: &str) -> Option<VideoId> {
    let url = Url::parse(raw).ok()?;
    let mut segments = url.path_segments()?;
    match segments.next()? {
        "watch" => url
            .query_pairs()
            .find(|(k, _)| k == "v")
            .and_then(|(_, v)| VideoId::new(&v)),
        "shorts" | "live" => segments.next().and_then(VideoId::new),
        _ => None,
    }
}

/// `raw` without translation parameters, or `None` if it had none.
pub fn strip_translation_params(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw).ok()?;
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let kept: Vec<(String, String)> = pairs
        .iter()
        .filter(|(k, _)| !TRANSLATION_PARAMS.contains(&k.as_str()))
        .cloned()
        .collect();
    if kept.len() == pairs.len() {
        return None;
    }
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&kept);
    }
    Some(url.into())
}
