//! # jarvis-tools
//!
//! Callable operations exposed by the Jarvis context server.
//!
//! [`ToolRegistry`] maps names to [`ContextTool`] implementations, validates
//! arguments against each tool's JSON schema (draft 7) and turns every
//! outcome into a [`jarvis_core::tools::ToolResult`]. The only tool today is
//! [`LogActivityTool`].

#![deny(unsafe_code)]

pub mod errors;
pub mod log_activity;
pub mod registry;
pub mod traits;

pub use errors::ToolError;
pub use log_activity::LogActivityTool;
pub use registry::ToolRegistry;
pub use traits::ContextTool;
