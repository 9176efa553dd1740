//! Output artifact manager: the `ocr_outputs` rows of each image.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Row};

use crate::model::{ArtifactKind, OutputMode};

use super::{now_timestamp, Database, DatabaseError};

/// A stored output artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactRow {
    pub id: i64,
    pub image_id: i64,
    pub kind: ArtifactKind,
    pub file_path: String,
    pub created_at: String,
}

impl ArtifactRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let column = row.as_ref().column_index("file_type")?;
        let file_type: String = row.get(column)?;
        let kind = file_type.parse::<ArtifactKind>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(DatabaseError::InvalidValue {
                    column: "file_type",
                    value: e,
                }),
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            image_id: row.get("image_id")?,
            kind,
            file_path: row.get("file_path")?,
            created_at: row.get("created_at")?,
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf, DatabaseError> {
    std::path::absolute(path).map_err(|e| DatabaseError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Replaces the artifact rows of `image_id` according to `mode`.
///
/// `pdf` is recorded whenever present; `img` and `json` only in full mode.
/// Kinds missing from `artifact_paths` are skipped without error. Delete and
/// insert run in one transaction.
pub fn replace_artifacts(
    db: &Database,
    image_id: i64,
    artifact_paths: &BTreeMap<ArtifactKind, PathBuf>,
    mode: OutputMode,
) -> Result<(), DatabaseError> {
    let mut selected = Vec::new();
    for kind in ArtifactKind::ALL {
        if !mode.includes(kind) {
            continue;
        }
        if let Some(path) = artifact_paths.get(&kind) {
            selected.push((kind, absolute(path)?));
        }
    }

    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM ocr_outputs WHERE image_id = ?1",
            params![image_id],
        )?;

        let created_at = now_timestamp();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO ocr_outputs (image_id, file_type, file_path, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (kind, path) in &selected {
                stmt.execute(params![
                    image_id,
                    kind.as_str(),
                    path.to_string_lossy(),
                    created_at
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    })?;

    log::debug!(
        "Recorded {} artifact(s) for image {} ({} mode)",
        selected.len(),
        image_id,
        mode
    );
    Ok(())
}

/// Lists the artifacts of an image in insertion order.
pub fn list_for_image(db: &Database, image_id: i64) -> Result<Vec<ArtifactRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT * FROM ocr_outputs WHERE image_id = ?1 ORDER BY id")?;
        let rows = stmt
            .query_map(params![image_id], ArtifactRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
