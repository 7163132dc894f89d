//! Activity repository: rows of the `activities` table.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::types::ActivityType;

/// Values for a new `activities` row.
#[derive(Debug)]
pub struct NewActivity<'a> {
    /// Row id.
    pub id: &'a str,
    /// RFC 3339 timestamp.
    pub timestamp: &'a str,
    /// Free-text description.
    pub activity: &'a str,
    /// Classifier output.
    pub activity_type: &'a ActivityType,
    /// Tool or agent name.
    pub tool_name: &'a str,
    /// Whether it succeeded.
    pub success: bool,
    /// Error message.
    pub error: Option<&'a str>,
    /// Context note.
    pub context: Option<&'a str>,
    /// Related issue.
    pub issue_number: Option<i64>,
    /// Related URL.
    pub link: Option<&'a str>,
}

/// A stored `activities` row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityRow {
    /// Row id.
    pub id: String,
    /// RFC 3339 timestamp.
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
    pub error: Option<String>,
    /// Context note.
    pub context: Option<String>,
    /// Related issue.
    pub issue_number: Option<i64>,
    /// Related URL.
    pub link: Option<String>,
}

const COLUMNS: &str = "a.id, a.timestamp, a.activity, a.activity_type, a.tool_name, a.success, \
                       a.error, a.context, a.issue_number, a.link";

/// Activity repository.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Insert one row.
    pub fn insert(conn: &Connection, row: &NewActivity<'_>) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO activities (id, timestamp, activity, activity_type, tool_name,
                 success, error, context, issue_number, link)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                row.id,
                row.timestamp,
                row.activity,
                row.activity_type.as_str(),
                row.tool_name,
                row.success,
                row.error,
                row.context,
                row.issue_number,
                row.link
            ],
        )?;
        Ok(())
    }

    /// Fetch one row by id.
    pub fn get(conn: &Connection, id: &str) -> Result<Option<ActivityRow>> {
        let row = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM activities a WHERE a.id = ?1"),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Newest rows first.
    pub fn recent(conn: &Connection, limit: usize) -> Result<Vec<ActivityRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM activities a
             ORDER BY a.timestamp DESC, a.id DESC LIMIT ?1"
        ))?;
        let rows = stmt
            .query_map(params![to_sql_limit(limit)], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Newest rows of one type first.
    pub fn by_type(
        conn: &Connection,
        activity_type: &ActivityType,
        limit: usize,
    ) -> Result<Vec<ActivityRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM activities a WHERE a.activity_type = ?1
             ORDER BY a.timestamp DESC, a.id DESC LIMIT ?2"
        ))?;
        let rows = stmt
            .query_map(
                params![activity_type.as_str(), to_sql_limit(limit)],
                Self::map_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Newest rows linked to a tag first.
    pub fn by_tag(conn: &Connection, tag: &str, limit: usize) -> Result<Vec<ActivityRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM activities a
             JOIN activity_tags atg ON atg.activity_id = a.id
             JOIN tags t ON t.id = atg.tag_id
             WHERE t.name = ?1
             ORDER BY a.timestamp DESC, a.id DESC LIMIT ?2"
        ))?;
        let rows = stmt
            .query_map(params![tag, to_sql_limit(limit)], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityRow> {
        Ok(ActivityRow {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            activity: row.get(2)?,
            activity_type: ActivityType::from(row.get::<_, String>(3)?),
            tool_name: row.get(4)?,
            success: row.get(5)?,
            error: row.get(6)?,
            context: row.get(7)?,
            issue_number: row.get(8)?,
            link: row.get(9)?,
        })
    }
}

fn to_sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
