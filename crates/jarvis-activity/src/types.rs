//! Activity taxonomy, write parameters and stored records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operation recorded for a file when the caller does not name one.
pub const DEFAULT_FILE_OPERATION: &str = "modified";

/// Canonical classification bucket for an activity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    /// New code, files or features.
    Create,
    /// Changes to existing behavior.
    Update,
    /// Bug fixes.
    Fix,
    /// Reviews and audits.
    Review,
    /// Investigation and exploration.
    Research,
    /// Documentation.
    Document,
    /// Tests and verification.
    Test,
    /// Releases and deployments.
    Deploy,
    /// Environment and tool configuration.
    Configure,
    /// Restructuring without behavior change.
    Refactor,
    /// Removals.
    Delete,
    /// Measurement and analysis.
    Analyze,
    /// Planning and design.
    Plan,
    /// Debugging.
    Debug,
    /// Nothing recognizable.
    Other,
    /// The leading word of a description that matched no category.
    Unlisted(String),
}

impl ActivityType {
    /// Every scored category, in tie-break order.
    pub fn categories() -> [Self; 14] {
        [
            Self::Create,
            Self::Update,
            Self::Fix,
            Self::Review,
            Self::Research,
            Self::Document,
            Self::Test,
            Self::Deploy,
            Self::Configure,
            Self::Refactor,
            Self::Delete,
            Self::Analyze,
            Self::Plan,
            Self::Debug,
        ]
    }

    /// Stored string form.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Fix => "fix",
            Self::Review => "review",
            Self::Research => "research",
            Self::Document => "document",
            Self::Test => "test",
            Self::Deploy => "deploy",
            Self::Configure => "configure",
            Self::Refactor => "refactor",
            Self::Delete => "delete",
            Self::Analyze => "analyze",
            Self::Plan => "plan",
            Self::Debug => "debug",
            Self::Other => "other",
            Self::Unlisted(word) => word,
        }
    }
}

impl From<&str> for ActivityType {
    fn from(value: &str) -> Self {
        let lower = value.to_lowercase();
        Self::categories()
            .into_iter()
            .find(|c| c.as_str() == lower)
            .unwrap_or_else(|| {
                if lower == "other" {
                    Self::Other
                } else {
                    Self::Unlisted(lower)
                }
            })
    }
}

impl From<String> for ActivityType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ActivityType> for String {
    fn from(value: ActivityType) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An affected file as supplied by the caller: a bare path or a path with
/// an explicit operation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileInput {
    /// Path only; the operation defaults to [`DEFAULT_FILE_OPERATION`].
    Path(String),
    /// Path plus operation (`created`, `deleted`, ...).
    Detailed {
        /// File path as the caller wrote it.
        path: String,
        /// What happened to the file.
        #[serde(default)]
        operation: Option<String>,
    },
}

impl FileInput {
    /// Path as supplied.
    pub fn path(&self) -> &str {
        match self {
            Self::Path(path) | Self::Detailed { path, .. } => path,
        }
    }

    /// Operation, falling back to the default.
    pub fn operation(&self) -> &str {
        match self {
            Self::Detailed {
                operation: Some(op),
                ..
            } if !op.trim().is_empty() => op,
            _ => DEFAULT_FILE_OPERATION,
        }
    }
}

impl From<&str> for FileInput {
    fn from(value: &str) -> Self {
        Self::Path(value.to_owned())
    }
}

fn default_true() -> bool {
    true
}

/// Input to [`crate::ActivityLogger::log_activity`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogActivityParams {
    /// What was done, in free text.
    pub activity: String,
    /// Name of the tool or agent that did it.
    pub tool_name: String,
    /// Whether it succeeded.
    #[serde(default = "default_true")]
    pub success: bool,
    /// Error message when it did not.
    #[serde(default)]
    pub error: Option<String>,
    /// Free-text context note; a configured context name selects that root.
    #[serde(default)]
    pub context: Option<String>,
    /// Tag names; only the first three distinct ones are kept.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Files touched.
    #[serde(default)]
    pub files_affected: Vec<FileInput>,
    /// Related issue number.
    #[serde(default)]
    pub issue_number: Option<i64>,
    /// Related URL.
    #[serde(default)]
    pub link: Option<String>,
}

impl LogActivityParams {
    /// Minimal successful activity.
    pub fn new(activity: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            activity: activity.into(),
            tool_name: tool_name.into(),
            success: true,
            error: None,
            context: None,
            tags: Vec::new(),
            files_affected: Vec::new(),
            issue_number: None,
            link: None,
        }
    }
}

/// A stored affected-file row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AffectedFile {
    /// Path relative to the context root.
    pub path: String,
    /// What happened to the file.
    pub operation: String,
}

/// A stored activity with its tags and files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// `act_<uuid v7>`.
    pub id: String,
    /// RFC 3339 UTC write time.
    pub timestamp: String,
    /// Free-text description.
    pub activity: String,
    /// Classifier output.
    pub activity_type: ActivityType,
    /// Tool or agent name.
    pub tool_name: String,
    /// Whether it succeeded.
    pub success: bool,
    /// Error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Context note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Related issue number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_number: Option<i64>,
    /// Related URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Case-folded tag names, alphabetical.
    pub tags: Vec<String>,
    /// Affected files in insertion order.
    pub files: Vec<AffectedFile>,
}

/// Outcome of a successful write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggedActivity {
    /// `act_<uuid v7>`.
    pub id: String,
    /// The type stored with the row.
    pub activity_type: ActivityType,
}

/// A tag and how many activities link to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagUsage {
    /// Case-folded tag name.
    pub name: String,
    /// Number of linked activities.
    pub count: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
