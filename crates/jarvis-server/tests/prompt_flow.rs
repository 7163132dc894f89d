//! Prompt listing, rendering and hot reload through the server facade.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use assert_matches::assert_matches;
use jarvis_prompts::PromptError;
use jarvis_server::{ContextServer, DatabaseLocation, ServerOptions};
use tempfile::TempDir;

const CONFIG: &str = "\
project:
  name: shop
  description: Online store
  riskLevel: 42
shared:
  tooling:
    linting:
      enabled: true
      command: npm run lint
contexts:
  - name: api
    path: services/api
    stack: [rust, postgres]
    tooling:
      linting:
        enabled: true
        command: cargo clippy
  - name: web
    path: web
    stack: typescript
";

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), ".jarvis/config.yaml", CONFIG);
    tmp
}

fn options(dir: &Path) -> ServerOptions {
    ServerOptions::new(dir).with_database(DatabaseLocation::InMemory)
}

fn args(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

#[test]
fn shipped_prompts_are_listed() {
    let tmp = project();
    let server = ContextServer::open(options(tmp.path())).unwrap();
    let prompts = server.list_prompts();
    let names: Vec<_> = prompts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["log-work", "plan-feature", "review-changes", "start-session"]
    );
    let plan = prompts.iter().find(|p| p.name == "plan-feature").unwrap();
    assert_eq!(plan.required_arguments().collect::<Vec<_>>(), vec!["feature"]);
}

#[test]
fn renders_resolved_contexts() {
    let tmp = project();
    let server = ContextServer::open(options(tmp.path())).unwrap();
    let result = server
        .get_prompt("plan-feature", &args(&[("feature", "wishlists"), ("context", "web")]))
        .unwrap();
    assert_eq!(result.messages.len(), 1);
    let text = result.messages[0].text();
    assert!(text.contains("**Project:** shop"));
    assert!(text.contains("Online store"));
    // out-of-range risk level is dropped at load
    assert!(!text.contains("Risk level"));
    assert!(text.contains("`api` at `services/api` [rust, postgres]"));
    assert!(text.contains("tooling `linting`: `cargo clippy`"));
    assert!(text.contains("tooling `linting`: `npm run lint`"));
    assert!(text.contains("Scope: the `web` context only."));
    assert!(server.config().is_feature_enabled("tooling.linting"));
}

#[test]
fn user_errors_are_typed() {
    let tmp = project();
    let server = ContextServer::open(options(tmp.path())).unwrap();
    assert_matches!(
        server.get_prompt("missing", &BTreeMap::new()),
        Err(PromptError::UnknownPrompt(_))
    );
    assert_matches!(
        server.get_prompt("review-changes", &args(&[("focus", "security")])),
        Err(PromptError::MissingArgument { argument, .. }) if argument == "scope"
    );
}

#[test]
fn project_templates_shadow_builtins() {
    let tmp = project();
    write(
        tmp.path(),
        ".jarvis/prompts/start-session.yaml",
        "description: Custom start\ntemplate: \"{{> banner}} {{project.name}}\"\n",
    );
    write(tmp.path(), ".jarvis/prompts/partials/banner.hbs", "Welcome to");
    write(tmp.path(), ".jarvis/prompts/constitution.md", "Shop rules.");

    let server = ContextServer::open(options(tmp.path())).unwrap();
    let result = server.get_prompt("start-session", &BTreeMap::new()).unwrap();
    assert_eq!(result.description.as_deref(), Some("Custom start"));
    assert_eq!(result.messages[0].text(), "Shop rules.\n\nWelcome to shop");
    assert_eq!(server.list_prompts().len(), 4);
}

#[test]
fn hot_reload_without_explicit_clear() {
    let tmp = project();
    let builtin = TempDir::new().unwrap();
    write(builtin.path(), "note.yaml", "template: \"first {{args.x}}\"\n");

    let server = ContextServer::open(
        options(tmp.path())
            .with_builtin_prompts_dir(builtin.path())
            .with_watch(true),
    )
    .unwrap();
    let mut changes = server.subscribe_prompt_changes();
    let x = args(&[("x", "1")]);
    assert_eq!(server.get_prompt("note", &x).unwrap().messages[0].text(), "first 1");

    write(builtin.path(), "note.yaml", "template: \"second {{args.x}}\"\n");

    let mut seen = String::new();
    for _ in 0..50 {
        seen = server
            .get_prompt("note", &x)
            .map(|r| r.messages[0].text().to_owned())
            .unwrap_or_default();
        if seen == "second 1" {
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    assert_eq!(seen, "second 1");
    let change = changes.try_recv().unwrap();
    assert!(change.path.ends_with("note.yaml"));
}

#[test]
fn new_prompt_file_appears_in_listing() {
    let tmp = project();
    let builtin = TempDir::new().unwrap();
    write(builtin.path(), "one.yaml", "template: one\n");
    let server = ContextServer::open(
        options(tmp.path())
            .with_builtin_prompts_dir(builtin.path())
            .with_watch(true),
    )
    .unwrap();
    assert_eq!(server.list_prompts().len(), 1);

    write(builtin.path(), "two.yaml", "template: two\n");
    let mut count = 0;
    for _ in 0..50 {
        count = server.list_prompts().len();
        if count == 2 {
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    assert_eq!(count, 2);
}
