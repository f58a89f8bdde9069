use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("invalid player endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("malformed player response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("player response has no videoDetails")]
    MissingDetails,
    #[error("player response has no title")]
    MissingTitle,
}
