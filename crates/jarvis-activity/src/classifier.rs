//! Keyword classifier for free-text activity descriptions.
//!
//! Decision order:
//! 1. A leading past-tense verb ("Fixed", "Created") decides immediately
//! 2. Literal overrides for phrasings that keyword scoring gets wrong
//! 3. Keyword scoring across every category; ties go to the earlier category
//! 4. The leading word itself when it is longer than two characters, else
//!    [`ActivityType::Other`]
//!
//! The function is pure and case-insensitive.

use crate::types::ActivityType;

/// Score for a keyword that appears as a whole word.
const WHOLE_WORD: u32 = 3;
/// Score for a keyword that only appears inside another word.
const SUBSTRING: u32 = 1;
/// Extra score when the keyword is the leading word.
const LEADING_WORD: u32 = 5;
/// Words that earn a position bonus (3, 2, 1 for the first three).
const POSITION_WINDOW: usize = 3;

/// Classify `text` into an [`ActivityType`].
pub fn classify(text: &str) -> ActivityType {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let Some(&first) = words.first() else {
        return ActivityType::Other;
    };

    if let Some(kind) = past_tense(first) {
        return kind;
    }
    if let Some(kind) = disambiguate(&lower, &words) {
        return kind;
    }

    let mut best: Option<(ActivityType, u32)> = None;
    for category in ActivityType::categories() {
        let points = score(&category, &lower, &words);
        if points > best.as_ref().map_or(0, |(_, s)| *s) {
            best = Some((category, points));
        }
    }
    if let Some((kind, _)) = best {
        return kind;
    }

    if first.chars().count() > 2 {
        ActivityType::from(first)
    } else {
        ActivityType::Other
    }
}

fn score(category: &ActivityType, text: &str, words: &[&str]) -> u32 {
    let first = words.first().copied().unwrap_or_default();
    let mut total = 0;
    for &keyword in keywords(category) {
        if let Some(pos) = words.iter().position(|w| *w == keyword) {
            total += WHOLE_WORD;
            if pos < POSITION_WINDOW {
                total += u32::try_from(POSITION_WINDOW - pos).unwrap_or(0);
            }
        } else if text.contains(keyword) {
            total += SUBSTRING;
        }
        if first == keyword {
            total += LEADING_WORD;
        }
    }
    total
}

/// Known traps for plain keyword scoring.
fn disambiguate(text: &str, words: &[&str]) -> Option<ActivityType> {
    const MUTATION_VERBS: &[&str] = &[
        "update", "updates", "updated", "updating", "change", "changes", "changed", "changing",
        "modify", "modifies", "modified", "modifying", "adjust", "adjusted", "tweak", "tweaked",
        "edit", "edited",
    ];

    if text.contains("clean") && text.contains("branch") {
        return Some(ActivityType::Delete);
    }
    if text.contains("config") && words.iter().any(|w| MUTATION_VERBS.contains(w)) {
        return Some(ActivityType::Update);
    }
    if text.contains("check") && text.contains("quality") {
        return Some(ActivityType::Review);
    }
    if words.contains(&"team") && words.contains(&"reviewed") {
        return Some(ActivityType::Review);
    }
    None
}

fn past_tense(word: &str) -> Option<ActivityType> {
    let kind = match word {
        "created" | "added" | "implemented" | "built" | "generated" | "introduced"
        | "scaffolded" | "initialized" | "bootstrapped" => ActivityType::Create,
        "updated" | "modified" | "changed" | "upgraded" | "improved" | "enhanced" | "bumped"
        | "adjusted" | "edited" | "tweaked" | "revised" => ActivityType::Update,
        "fixed" | "resolved" | "repaired" | "patched" | "corrected" | "hotfixed" => {
            ActivityType::Fix
        }
        "reviewed" | "audited" | "inspected" | "approved" => ActivityType::Review,
        "researched" | "investigated" | "explored" | "studied" | "compared" | "surveyed" => {
            ActivityType::Research
        }
        "documented" | "commented" | "annotated" | "described" => ActivityType::Document,
        "tested" | "verified" | "validated" => ActivityType::Test,
        "deployed" | "released" | "published" | "shipped" | "launched" => ActivityType::Deploy,
        "configured" | "installed" | "provisioned" => ActivityType::Configure,
        "refactored" | "restructured" | "reorganized" | "simplified" | "extracted" | "renamed"
        | "modularized" => ActivityType::Refactor,
        "deleted" | "removed" | "dropped" | "purged" | "erased" | "deprecated" | "pruned"
        | "uninstalled" => ActivityType::Delete,
        "analyzed" | "analysed" | "measured" | "profiled" | "assessed" | "evaluated"
        | "benchmarked" => ActivityType::Analyze,
        "planned" | "designed" | "outlined" | "scoped" | "prioritized" | "estimated" => {
            ActivityType::Plan
        }
        "debugged" | "diagnosed" | "troubleshot" | "traced" => ActivityType::Debug,
        _ => return None,
    };
    Some(kind)
}

fn keywords(category: &ActivityType) -> &'static [&'static str] {
    match category {
        ActivityType::Create => &[
            "create", "add", "implement", "build", "new", "generate", "introduce", "scaffold",
            "initialize", "bootstrap",
        ],
        ActivityType::Update => &[
            "update", "modify", "change", "upgrade", "improve", "enhance", "bump", "adjust",
            "edit", "tweak", "revise",
        ],
        ActivityType::Fix => &[
            "fix", "bug", "resolve", "repair", "patch", "correct", "hotfix", "broken", "error",
            "issue",
        ],
        ActivityType::Review => &["review", "audit", "inspect", "approve", "feedback", "critique"],
        ActivityType::Research => &[
            "research", "investigate", "explore", "study", "learn", "compare", "survey", "spike",
        ],
        ActivityType::Document => &[
            "document", "docs", "documentation", "readme", "comment", "guide", "changelog", "wiki",
        ],
        ActivityType::Test => &[
            "test", "tests", "testing", "coverage", "verify", "validate", "e2e", "integration",
        ],
        ActivityType::Deploy => &[
            "deploy", "release", "publish", "ship", "launch", "rollout", "production", "staging",
        ],
        ActivityType::Configure => &[
            "configure", "config", "configuration", "setup", "install", "settings", "environment",
            "provision",
        ],
        ActivityType::Refactor => &[
            "refactor", "restructure", "reorganize", "simplify", "cleanup", "extract", "rename",
            "modularize", "dedupe",
        ],
        ActivityType::Delete => &[
            "delete", "remove", "drop", "purge", "erase", "deprecate", "prune", "uninstall",
        ],
        ActivityType::Analyze => &[
            "analyze", "analyse", "analysis", "measure", "profile", "assess", "evaluate",
            "metrics", "benchmark",
        ],
        ActivityType::Plan => &[
            "plan", "planning", "design", "roadmap", "outline", "scope", "prioritize", "estimate",
            "strategy", "architecture",
        ],
        ActivityType::Debug => &[
            "debug", "debugging", "trace", "diagnose", "troubleshoot", "crash", "stacktrace",
            "breakpoint",
        ],
        ActivityType::Other | ActivityType::Unlisted(_) => &[],
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
