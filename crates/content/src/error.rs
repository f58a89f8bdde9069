use thiserror::Error;

use crate::HostError;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("another instance is already running on this page")]
    AlreadyInstalled,
    #[error(transparent)]
    Host(#[from] HostError),
}
