//! Project registry: idempotent create-or-fetch over the `projects` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{now_timestamp, Database, DatabaseError};

/// A project row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRow {
    pub id: i64,
    pub name: String,
    pub base_path: Option<String>,
    pub created_at: String,
}

impl ProjectRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            base_path: row.get("base_path")?,
            created_at: row.get("created_at")?,
        })
    }
}

fn select_by_name(conn: &Connection, name: &str) -> Result<Option<ProjectRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM projects WHERE name = ?1",
            params![name],
            ProjectRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Returns the project named `name`, creating it with `base_path` if absent.
///
/// An existing project is returned unchanged: `base_path` is ignored on a
/// hit so a rerun never relocates a project.
pub fn ensure_project(
    db: &Database,
    name: &str,
    base_path: &str,
) -> Result<ProjectRow, DatabaseError> {
    db.with_conn(|conn| {
        if let Some(existing) = select_by_name(conn, name)? {
            log::debug!("Reusing project '{}' (id {})", name, existing.id);
            return Ok(existing);
        }

        let created_at = now_timestamp();
        conn.execute(
            "INSERT INTO projects (name, base_path, created_at) VALUES (?1, ?2, ?3)",
            params![name, base_path, created_at],
        )?;
        let id = conn.last_insert_rowid();
        log::info!("Created project '{}' (id {})", name, id);

        Ok(ProjectRow {
            id,
            name: name.to_string(),
            base_path: Some(base_path.to_string()),
            created_at,
        })
    })
}

/// Finds a project by its unique name.
pub fn find_by_name(db: &Database, name: &str) -> Result<Option<ProjectRow>, DatabaseError> {
    db.with_conn(|conn| select_by_name(conn, name))
}

/// Finds a project by its surrogate id.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<ProjectRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM projects WHERE id = ?1",
                params![id],
                ProjectRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}
