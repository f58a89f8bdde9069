//! Player-menu wording in the interface languages the host ships most.
//!
//! Entries are lowercase; matching lowercases the rendered text and looks
//! for any entry as a substring.

/// Settings entry that opens the audio-track submenu.
pub const AUDIO_TRACK: &[&str] = &[
    "audio track",
    "piste audio",
    "audiospur",
    "pista de audio",
    "traccia audio",
    "faixa de áudio",
    "audiotrack",
    "ścieżka dźwiękowa",
    "ses parçası",
    "trek audio",
    "звуковая дорожка",
    "аудиодорожка",
    "オーディオ トラック",
    "オーディオトラック",
    "音轨",
    "音訊軌",
    "오디오 트랙",
    "ऑडियो ट्रैक",
];

/// Marker of the uploader's own track inside that submenu.
pub const ORIGINAL: &[&str] = &[
    "original",
    "d'origine",
    "oryginalna",
    "orijinal",
    "asli",
    "оригинал",
    "オリジナル",
    "原始",
    "原声",
    "原音",
    "원본",
    "मूल",
];

/// Markers of a generated dub in a media track label.
pub const DUBBED: &[&str] = &[
    "dub",
    "doublé",
    "doblad",
    "dublad",
    "synchron",
    "дубл",
    "吹き替え",
    "配音",
    "더빙",
];

pub fn matches_any(text: &str, table: &[&str]) -> bool {
    let lower = text.to_lowercase();
    table.iter().any(|entry| lower.contains(entry))
}
