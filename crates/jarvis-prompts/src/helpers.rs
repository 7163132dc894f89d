//! Handlebars registry setup.
//!
//! The comparison and logic helpers (`eq`, `ne`, `gt`, `gte`, `lt`, `lte`,
//! `and`, `or`, `not`, `len`) ship with `handlebars`; this module adds
//! `includes` and `join` and turns HTML escaping off.

use handlebars::{Handlebars, handlebars_helper};
use serde_json::Value;

handlebars_helper!(includes: |list: Json, item: Json| {
    list.as_array().is_some_and(|items| items.contains(item))
});

// a bare string passes through so `stack: rust` and `stack: [rust]` read alike
handlebars_helper!(join: |list: Json, separator: str| {
    match list {
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(separator),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
});

/// A registry with prompt helpers and no escaping.
pub fn new_registry() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.register_escape_fn(handlebars::no_escape);
    registry.register_helper("includes", Box::new(includes));
    registry.register_helper("join", Box::new(join));
    registry
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
