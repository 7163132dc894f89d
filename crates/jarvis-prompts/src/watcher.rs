//! File-system watcher for template directories.
//!
//! The notify callback never touches store state. It forwards changed
//! template paths over an mpsc channel and publishes [`PromptsChanged`] to
//! subscribers; [`crate::TemplateStore`] drains the channel at the start of
//! each operation.
//!
//! A directory that does not exist at startup is kept pending. Each drain
//! checks pending directories and attaches a watch to any that appeared,
//! reporting the directory itself as changed so templates written before
//! the watch existed are not missed.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError, channel};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::loader::WATCHED_EXTENSIONS;
use crate::types::PromptsChanged;

/// Watches template directories and queues changed paths.
pub struct TemplateWatcher {
    inner: Mutex<Inner>,
    notifier: broadcast::Sender<PromptsChanged>,
}

struct Inner {
    watcher: RecommendedWatcher,
    rx: Receiver<PathBuf>,
    pending: Vec<PathBuf>,
}

impl TemplateWatcher {
    /// Watch every directory in `dirs`, recursively. Missing directories are
    /// picked up on the first drain after they are created.
    pub fn start(dirs: &[PathBuf], notifier: broadcast::Sender<PromptsChanged>) -> Result<Self> {
        let (tx, rx) = channel();

        let events = notifier.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_relevant_kind(&event.kind) => {
                    for path in event.paths.into_iter().filter(|p| is_template_file(p)) {
                        let _ = events.send(PromptsChanged { path: path.clone() });
                        let _ = tx.send(path);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "template watcher error"),
            },
            notify::Config::default(),
        )?;

        let mut pending = Vec::new();
        for dir in dirs {
            if dir.is_dir() {
                watcher.watch(dir, RecursiveMode::Recursive)?;
                debug!(dir = %dir.display(), "watching template directory");
            } else {
                debug!(dir = %dir.display(), "template directory absent, watching once created");
                pending.push(dir.clone());
            }
        }

        Ok(Self {
            inner: Mutex::new(Inner {
                watcher,
                rx,
                pending,
            }),
            notifier,
        })
    }

    /// Take every path queued since the last drain, deduplicated.
    ///
    /// A pending directory that now exists is watched from here on and
    /// appears in the result.
    pub fn drain(&self) -> Vec<PathBuf> {
        let mut inner = self.inner.lock();
        let mut changed: Vec<PathBuf> = Vec::new();

        for dir in inner.attach_pending() {
            let _ = self.notifier.send(PromptsChanged { path: dir.clone() });
            changed.push(dir);
        }

        loop {
            match inner.rx.try_recv() {
                Ok(path) => {
                    if !changed.contains(&path) {
                        changed.push(path);
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        changed
    }
}

impl Inner {
    /// Watch pending directories that exist now; return the ones attached.
    fn attach_pending(&mut self) -> Vec<PathBuf> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        let (present, absent): (Vec<PathBuf>, Vec<PathBuf>) =
            std::mem::take(&mut self.pending)
                .into_iter()
                .partition(|dir| dir.is_dir());
        self.pending = absent;

        let mut attached = Vec::with_capacity(present.len());
        for dir in present {
            match self.watcher.watch(&dir, RecursiveMode::Recursive) {
                Ok(()) => {
                    debug!(dir = %dir.display(), "template directory appeared, watching");
                    attached.push(dir);
                }
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "cannot watch template directory, hot reload off for it");
                }
            }
        }
        attached
    }
}

fn is_relevant_kind(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Whether a change to `path` can affect rendered prompts.
pub fn is_template_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| WATCHED_EXTENSIONS.contains(&ext))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
