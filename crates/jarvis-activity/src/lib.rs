//! # jarvis-activity
//!
//! Durable record of what was done during a project.
//!
//! - [`classifier::classify`] maps a free-text description ("Fixed auth bug")
//!   onto an [`ActivityType`] with a deterministic keyword heuristic
//! - [`paths::normalize_file_path`] makes affected-file paths relative to the
//!   context root
//! - [`ActivityLogger`] writes an activity, its tags and its affected files
//!   as one `SQLite` transaction, and reads them back for reporting

#![deny(unsafe_code)]

pub mod classifier;
pub mod errors;
pub mod logger;
pub mod paths;
pub mod sqlite;
pub mod types;

pub use classifier::classify;
pub use errors::{ActivityError, Result};
pub use logger::{ActivityLogger, MAX_TAGS, normalize_tags};
pub use paths::{absolute_root, normalize_file_path};
pub use types::{
    ActivityRecord, ActivityType, AffectedFile, DEFAULT_FILE_OPERATION, FileInput,
    LogActivityParams, LoggedActivity, TagUsage,
};
