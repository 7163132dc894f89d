//! Prompt listing and rendering shapes.
//!
//! These are the values handed back by `listPrompts` and `getPrompt`.

use serde::{Deserialize, Serialize};

/// A declared prompt argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptArgument {
    /// Argument name as referenced by `args.<name>` in the template.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Whether rendering fails when the argument is absent.
    #[serde(default)]
    pub required: bool,
}

/// Metadata for one discoverable prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptDescriptor {
    /// Unique prompt name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared arguments in declaration order.
    pub arguments: Vec<PromptArgument>,
}

impl PromptDescriptor {
    /// Names of the arguments marked required.
    pub fn required_arguments(&self) -> impl Iterator<Item = &str> {
        self.arguments
            .iter()
            .filter(|a| a.required)
            .map(|a| a.name.as_str())
    }
}

/// Speaker of a prompt message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    /// Message authored on behalf of the user.
    User,
    /// Message authored on behalf of the assistant.
    Assistant,
}

/// Content of a prompt message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PromptContent {
    /// Plain text.
    Text {
        /// The rendered text.
        text: String,
    },
}

/// One rendered message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Speaker.
    pub role: PromptRole,
    /// Content block.
    pub content: PromptContent,
}

impl PromptMessage {
    /// A user-role text message.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: PromptContent::Text { text: text.into() },
        }
    }

    /// The message text.
    pub fn text(&self) -> &str {
        match &self.content {
            PromptContent::Text { text } => text,
        }
    }
}

/// Result of `getPrompt`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPromptResult {
    /// Description of the rendered prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Rendered messages.
    pub messages: Vec<PromptMessage>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
