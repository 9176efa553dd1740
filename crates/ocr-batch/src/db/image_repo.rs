//! Image catalog: one lifecycle row per processing attempt in `images`.

use rusqlite::{params, OptionalExtension, Row};

use crate::model::ImageStatus;

use super::{now_timestamp, Database, DatabaseError};

/// An image row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRow {
    pub id: i64,
    pub project_id: i64,
    pub filename: String,
    pub relative_path: String,
    pub output_dir: String,
    pub status: ImageStatus,
    pub created_at: String,
    pub ocr_finished_at: Option<String>,
}

impl ImageRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let column = row.as_ref().column_index("status")?;
        let status: String = row.get(column)?;
        let status = status.parse::<ImageStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(DatabaseError::InvalidValue {
                    column: "status",
                    value: e,
                }),
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            filename: row.get("filename")?,
            relative_path: row.get("relative_path")?,
            output_dir: row.get("output_dir")?,
            status,
            created_at: row.get("created_at")?,
            ocr_finished_at: row.get("ocr_finished_at")?,
        })
    }
}

/// Registers a source file for processing under `project_id`.
///
/// Always inserts a new `pending` row; earlier rows for the same filename
/// are kept as history. Fails with [`DatabaseError::NotFound`] when the
/// project does not exist.
pub fn register_image(
    db: &Database,
    project_id: i64,
    filename: &str,
    output_dir: &str,
) -> Result<ImageRow, DatabaseError> {
    db.with_conn(|conn| {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1)",
            params![project_id],
            |r| r.get(0),
        )?;
        if !exists {
            return Err(DatabaseError::NotFound {
                entity: "Project",
                id: project_id,
            });
        }

        let created_at = now_timestamp();
        conn.execute(
            "INSERT INTO images (project_id, filename, relative_path, output_dir, status, created_at)
             VALUES (?1, ?2, ?2, ?3, ?4, ?5)",
            params![
                project_id,
                filename,
                output_dir,
                ImageStatus::Pending.as_str(),
                created_at
            ],
        )?;

        Ok(ImageRow {
            id: conn.last_insert_rowid(),
            project_id,
            filename: filename.to_string(),
            relative_path: filename.to_string(),
            output_dir: output_dir.to_string(),
            status: ImageStatus::Pending,
            created_at,
            ocr_finished_at: None,
        })
    })
}

/// Sets the status and completion timestamp of an image.
///
/// `finished_at` defaults to the current time.
pub fn update_status(
    db: &Database,
    id: i64,
    status: ImageStatus,
    finished_at: Option<&str>,
) -> Result<(), DatabaseError> {
    let finished_at = finished_at.map(str::to_string).unwrap_or_else(now_timestamp);
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE images SET status = ?2, ocr_finished_at = ?3 WHERE id = ?1",
            params![id, status.as_str(), finished_at],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound { entity: "Image", id });
        }
        Ok(())
    })
}

/// Finds an image by its ID.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<ImageRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM images WHERE id = ?1",
                params![id],
                ImageRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Lists every image row of a project, oldest first.
pub fn list_by_project(db: &Database, project_id: i64) -> Result<Vec<ImageRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT * FROM images WHERE project_id = ?1 ORDER BY id ASC")?;
        let rows = stmt
            .query_map(params![project_id], ImageRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Returns the most recent registration of `filename` within a project.
pub fn latest_by_filename(
    db: &Database,
    project_id: i64,
    filename: &str,
) -> Result<Option<ImageRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM images WHERE project_id = ?1 AND filename = ?2
                 ORDER BY id DESC LIMIT 1",
                params![project_id, filename],
                ImageRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Counts a project's images with the given status.
pub fn count_by_status(
    db: &Database,
    project_id: i64,
    status: ImageStatus,
) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM images WHERE project_id = ?1 AND status = ?2",
            params![project_id, status.as_str()],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}
