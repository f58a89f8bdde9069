use std::time::Duration;

/// Timing and bounds of the reconciliation loop.
///
/// The host gives no reliable "ready" signal, so every wait here is a fixed
/// delay tuned against how long its player and metadata panels take to
/// settle.
#[derive(Clone, Debug)]
pub struct ContentConfig {
    /// Period of the declarative audio-track check.
    pub audio_poll_interval: Duration,
    /// Period of the cache-backed metadata check.
    pub metadata_poll_interval: Duration,
    /// First full check after start.
    pub initial_check_delay: Duration,
    /// Wait after a navigation before both correctors run again.
    pub navigation_settle_delay: Duration,
    /// Gap between open/click/close steps of the settings-menu automation.
    pub menu_step_delay: Duration,
    pub metadata_retry_delay: Duration,
    /// Retries while the title element has not rendered yet.
    pub max_metadata_attempts: u8,
    /// Player-data lookups per video before giving up for the page's life.
    pub max_fetch_attempts: u8,
    /// Character bound of the collapsed description snippet.
    pub description_snippet_len: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            audio_poll_interval: Duration::from_millis(2_000),
            metadata_poll_interval: Duration::from_millis(3_000),
            initial_check_delay: Duration::from_millis(1_000),
            navigation_settle_delay: Duration::from_millis(1_000),
            menu_step_delay: Duration::from_millis(500),
            metadata_retry_delay: Duration::from_millis(500),
            max_metadata_attempts: 10,
            max_fetch_attempts: 2,
            description_snippet_len: 200,
        }
    }
}
