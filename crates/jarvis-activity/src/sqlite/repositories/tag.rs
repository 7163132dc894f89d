//! Tag repository: the shared tag vocabulary and activity links.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::{ActivityError, Result};
use crate::types::TagUsage;

/// Tag repository.
pub struct TagRepo;

impl TagRepo {
    /// Insert `name` if absent and return its id.
    ///
    /// The name must already be case-folded. A missing id after the insert
    /// means the table is not behaving as a unique vocabulary and is
    /// reported as [`ActivityError::Invariant`].
    pub fn upsert(conn: &Connection, name: &str) -> Result<i64> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO tags (name) VALUES (?1)",
            params![name],
        )?;
        conn.query_row(
            "SELECT id FROM tags WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| ActivityError::Invariant(format!("tag '{name}' has no id after insert")))
    }

    /// Link a tag to an activity.
    pub fn link(conn: &Connection, activity_id: &str, tag_id: i64) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO activity_tags (activity_id, tag_id) VALUES (?1, ?2)",
            params![activity_id, tag_id],
        )?;
        Ok(())
    }

    /// Tag names linked to an activity, alphabetical.
    pub fn for_activity(conn: &Connection, activity_id: &str) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT t.name FROM tags t
             JOIN activity_tags atg ON atg.tag_id = t.id
             WHERE atg.activity_id = ?1
             ORDER BY t.name",
        )?;
        let names = stmt
            .query_map(params![activity_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Every tag with its link count, most used first.
    pub fn usage(conn: &Connection) -> Result<Vec<TagUsage>> {
        let mut stmt = conn.prepare(
            "SELECT t.name, COUNT(atg.activity_id) AS uses FROM tags t
             LEFT JOIN activity_tags atg ON atg.tag_id = t.id
             GROUP BY t.id
             ORDER BY uses DESC, t.name",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TagUsage {
                    name: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
