//! Affected-file repository.

use rusqlite::{Connection, params};

use crate::errors::Result;
use crate::types::AffectedFile;

/// Affected-file repository.
pub struct FileRepo;

impl FileRepo {
    /// Insert one file row for an activity.
    pub fn insert(conn: &Connection, activity_id: &str, file: &AffectedFile) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO affected_files (activity_id, path, operation) VALUES (?1, ?2, ?3)",
            params![activity_id, file.path, file.operation],
        )?;
        Ok(())
    }

    /// Files of an activity in insertion order.
    pub fn for_activity(conn: &Connection, activity_id: &str) -> Result<Vec<AffectedFile>> {
        let mut stmt = conn.prepare(
            "SELECT path, operation FROM affected_files WHERE activity_id = ?1 ORDER BY id",
        )?;
        let files = stmt
            .query_map(params![activity_id], |row| {
                Ok(AffectedFile {
                    path: row.get(0)?,
                    operation: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(files)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
