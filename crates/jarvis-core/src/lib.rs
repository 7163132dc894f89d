//! # jarvis-core
//!
//! Shared vocabulary for the Jarvis context server crates.
//!
//! - **Tools**: [`tools::ToolDefinition`], [`tools::ToolResult`] and the
//!   `text_result` / `error_result` factories used by every tool handler
//! - **Prompts**: [`prompts::PromptDescriptor`] and [`prompts::GetPromptResult`],
//!   the shapes returned by the prompt listing and rendering surfaces
//! - **Logging**: [`logging::init_subscriber`] and a capture layer for tests

#![deny(unsafe_code)]

pub mod logging;
pub mod prompts;
pub mod tools;
