//! # jarvis-server
//!
//! The context server an AI coding assistant talks to.
//!
//! [`ContextServer`] owns one instance of each component and exposes the
//! two request/response surfaces: prompts (`list_prompts` / `get_prompt`)
//! and tools (`list_tools` / `call_tool`). Transport is left to the host.

#![deny(unsafe_code)]

pub mod errors;
pub mod options;
pub mod server;

pub use errors::{Result, ServerError};
pub use options::{DatabaseLocation, ServerOptions};
pub use server::ContextServer;
