//! Contract of the host's internal player-data endpoint.
//!
//! Nothing in here performs I/O: the platform layer owns the transport and
//! this crate only builds requests and reads responses, so both halves stay
//! testable off the browser.

mod api_key;
mod error;
mod player;

pub use api_key::extract_api_key;
pub use error::NetError;
pub use player::{
    CLIENT_NAME, CLIENT_VERSION, PLAYER_ENDPOINT, PlayerDetails, PlayerRequest,
    details_from_initial_response, parse_player_response, player_endpoint,
};
