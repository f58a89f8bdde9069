//! Keeps a watch page on its original language.
//!
//! The host page is a single-page app that re-renders whenever it likes, so
//! nothing here runs once and trusts the result. [`Scheduler`] owns the
//! state and re-runs three small correctors on timers, navigation events
//! and DOM mutations:
//!
//! - [`prefs`] writes the "do not auto-translate" preference cookie,
//! - [`audio`] forces the original audio track,
//! - [`metadata`] puts the untranslated title and description back.
//!
//! Everything the engine touches goes through [`HostPage`], which the
//! platform crate implements over the real browser APIs.

pub mod audio;
pub mod config;
mod error;
mod host;
pub mod labels;
pub mod metadata;
pub mod prefs;
mod scheduler;
pub mod selectors;
mod state;
pub mod url_params;

#[cfg(test)]
mod test_harness;

pub use crate::config::ContentConfig;
pub use crate::error::ContentError;
pub use crate::host::{AudioTrack, HostError, HostPage};
pub use crate::metadata::OriginalMetadata;
pub use crate::scheduler::Scheduler;
pub use crate::state::{ExtensionState, Phase};
