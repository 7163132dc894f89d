//! Transactional activity writer and audit queries.
//!
//! [`ActivityLogger::log_activity`] is the only write path. One call is one
//! `SQLite` transaction covering the activity row, tag upserts, tag links
//! and file rows; any failure rolls all of them back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classifier::classify;
use crate::errors::{ActivityError, Result};
use crate::paths::{absolute_root, normalize_file_path};
use crate::sqlite::connection::{self, ConnectionConfig, ConnectionPool, PooledConnection};
use crate::sqlite::migrations::run_migrations;
use crate::sqlite::repositories::{ActivityRepo, ActivityRow, FileRepo, NewActivity, TagRepo};
use crate::types::{
    ActivityRecord, ActivityType, AffectedFile, LogActivityParams, LoggedActivity, TagUsage,
};

/// Tags kept per activity.
pub const MAX_TAGS: usize = 3;

/// Case-fold, trim, drop blanks, dedupe, keep the first [`MAX_TAGS`].
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(MAX_TAGS);
    for tag in tags {
        let folded = tag.trim().to_lowercase();
        if folded.is_empty() || kept.contains(&folded) {
            continue;
        }
        kept.push(folded);
        if kept.len() == MAX_TAGS {
            break;
        }
    }
    kept
}

/// Writes and reads activity records.
pub struct ActivityLogger {
    pool: ConnectionPool,
    project_root: PathBuf,
    context_roots: HashMap<String, PathBuf>,
}

impl ActivityLogger {
    /// Wrap an already-migrated pool. A relative root is anchored at the
    /// current directory.
    pub fn new(pool: ConnectionPool, project_root: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            project_root: absolute_root(&project_root.into()),
            context_roots: HashMap::new(),
        }
    }

    /// Open (creating if needed) and migrate the database at `db_path`.
    pub fn open(db_path: &Path, project_root: impl Into<PathBuf>) -> Result<Self> {
        let pool = connection::new_file(db_path, &ConnectionConfig::default())?;
        Self::migrated(pool, project_root)
    }

    /// In-memory database, migrated.
    pub fn in_memory(project_root: impl Into<PathBuf>) -> Result<Self> {
        let pool = connection::new_in_memory(&ConnectionConfig::default())?;
        Self::migrated(pool, project_root)
    }

    fn migrated(pool: ConnectionPool, project_root: impl Into<PathBuf>) -> Result<Self> {
        {
            let conn = pool.get()?;
            let _ = run_migrations(&conn)?;
        }
        Ok(Self::new(pool, project_root))
    }

    /// Roots used when an activity's `context` names a configured context.
    #[must_use]
    pub fn with_context_roots(mut self, roots: impl IntoIterator<Item = (String, PathBuf)>) -> Self {
        self.context_roots.extend(
            roots
                .into_iter()
                .map(|(name, root)| (name, absolute_root(&root))),
        );
        self
    }

    /// The underlying pool.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Root that file paths of an activity are made relative to.
    pub fn root_for(&self, context: Option<&str>) -> &Path {
        context
            .and_then(|name| self.context_roots.get(name))
            .map_or(self.project_root.as_path(), PathBuf::as_path)
    }

    /// Classify and persist one activity. Returns the new id and the type
    /// that was stored.
    pub fn log_activity(&self, params: LogActivityParams) -> Result<LoggedActivity> {
        let activity = params.activity.trim();
        if activity.is_empty() {
            return Err(ActivityError::InvalidInput("activity must not be empty".into()));
        }
        let tool_name = params.tool_name.trim();
        if tool_name.is_empty() {
            return Err(ActivityError::InvalidInput("toolName must not be empty".into()));
        }

        let id = format!("act_{}", Uuid::now_v7());
        let timestamp = chrono::Utc::now().to_rfc3339();
        let activity_type = classify(activity);
        let tags = normalize_tags(&params.tags);
        let root = self.root_for(params.context.as_deref());
        let files: Vec<AffectedFile> = params
            .files_affected
            .iter()
            .map(|f| AffectedFile {
                path: normalize_file_path(f.path(), root),
                operation: f.operation().to_owned(),
            })
            .collect();

        let row = NewActivity {
            id: &id,
            timestamp: &timestamp,
            activity,
            activity_type: &activity_type,
            tool_name,
            success: params.success,
            error: params.error.as_deref(),
            context: params.context.as_deref(),
            issue_number: params.issue_number,
            link: params.link.as_deref(),
        };

        let conn = self.conn()?;
        if let Err(error) = write_activity(&conn, &row, &tags, &files) {
            warn!(id = %id, error = %error, "activity write rolled back");
            return Err(error);
        }

        info!(
            id = %id,
            activity_type = %activity_type,
            tags = tags.len(),
            files = files.len(),
            "activity logged"
        );
        Ok(LoggedActivity { id, activity_type })
    }

    /// Full record by id.
    pub fn get(&self, id: &str) -> Result<Option<ActivityRecord>> {
        let conn = self.conn()?;
        ActivityRepo::get(&conn, id)?
            .map(|row| hydrate(&conn, row))
            .transpose()
    }

    /// Newest records first.
    pub fn recent(&self, limit: usize) -> Result<Vec<ActivityRecord>> {
        let conn = self.conn()?;
        let rows = ActivityRepo::recent(&conn, limit)?;
        rows.into_iter().map(|row| hydrate(&conn, row)).collect()
    }

    /// Newest records of one type first.
    pub fn by_type(&self, activity_type: &ActivityType, limit: usize) -> Result<Vec<ActivityRecord>> {
        let conn = self.conn()?;
        let rows = ActivityRepo::by_type(&conn, activity_type, limit)?;
        rows.into_iter().map(|row| hydrate(&conn, row)).collect()
    }

    /// Newest records carrying `tag` (case-insensitive) first.
    pub fn by_tag(&self, tag: &str, limit: usize) -> Result<Vec<ActivityRecord>> {
        let conn = self.conn()?;
        let rows = ActivityRepo::by_tag(&conn, &tag.trim().to_lowercase(), limit)?;
        rows.into_iter().map(|row| hydrate(&conn, row)).collect()
    }

    /// Every tag with its link count.
    pub fn tag_usage(&self) -> Result<Vec<TagUsage>> {
        let conn = self.conn()?;
        TagRepo::usage(&conn)
    }

    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }
}

fn write_activity(
    conn: &Connection,
    row: &NewActivity<'_>,
    tags: &[String],
    files: &[AffectedFile],
) -> Result<()> {
    // Dropping the transaction without commit rolls it back.
    let tx = conn.unchecked_transaction()?;
    ActivityRepo::insert(&tx, row)?;
    for tag in tags {
        let tag_id = TagRepo::upsert(&tx, tag)?;
        TagRepo::link(&tx, row.id, tag_id)?;
    }
    for file in files {
        FileRepo::insert(&tx, row.id, file)?;
    }
    tx.commit()?;
    debug!(id = row.id, "activity transaction committed");
    Ok(())
}

fn hydrate(conn: &Connection, row: ActivityRow) -> Result<ActivityRecord> {
    let tags = TagRepo::for_activity(conn, &row.id)?;
    let files = FileRepo::for_activity(conn, &row.id)?;
    Ok(ActivityRecord {
        id: row.id,
        timestamp: row.timestamp,
        activity: row.activity,
        activity_type: row.activity_type,
        tool_name: row.tool_name,
        success: row.success,
        error: row.error,
        context: row.context,
        issue_number: row.issue_number,
        link: row.link,
        tags,
        files,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
