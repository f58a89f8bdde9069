use memchr::memmem;

/// Markers preceding the API key in the config blobs the host inlines into
/// every page. Newer pages use the first form; the second survives on some
/// embedded players.
const KEY_MARKERS: [&[u8]; 2] = [b"\"INNERTUBE_API_KEY\":\"", b"\"innertubeApiKey\":\""];

const MAX_KEY_LEN: usize = 128;

/// Scan page source for the API key the host embeds for its own client.
pub fn extract_api_key(source: &str) -> Option<String> {
    let hay = source.as_bytes();
    for marker in KEY_MARKERS {
        let Some(start) = memmem::find(hay, marker) else {
            continue;
        };
        let rest = &hay[start + marker.len()..];
        let len = rest
            .iter()
            .take_while(|&&b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
            .count();
        // the key must be closed by the string quote, not cut by some other byte
        if len == 0 || len > MAX_KEY_LEN || rest.get(len) != Some(&b'"') {
            continue;
        }
        return Some(String::from_utf8_lossy(&rest[..len]).into_owned());
    }
    None
}
