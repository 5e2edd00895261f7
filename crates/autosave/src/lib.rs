//! Debounced autosave for in-progress edits
//!
//! This crate provides:
//! - `DebouncedPersister`: coalesces bursts of edits into one save after a
//!   quiet period, with at most one save in flight per persister
//! - `SaveStatus` reporting through a watch channel
//! - `SaveTarget` implementations (async closures, atomic JSON files)
//! - `EventDraft`, the event form this application edits

pub mod config;
pub mod draft;
pub mod persister;
pub mod status;
pub mod target;

// Re-exports
pub use config::{AutosaveConfig, SavePredicate, DEFAULT_INTERVAL};
pub use draft::{Draft, DraftFieldError, EventDraft};
pub use persister::DebouncedPersister;
pub use status::{SaveFailure, SaveStatus};
pub use target::{save_fn, FnTarget, JsonFileTarget, SaveTarget};
