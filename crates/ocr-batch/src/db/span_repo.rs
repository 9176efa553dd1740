//! Recognition result store: the `ocr_texts` span set of each image.

use rusqlite::{params, Row};

use crate::model::TextSpan;

use super::{Database, DatabaseError};

/// A stored recognition span.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanRow {
    pub id: i64,
    pub image_id: i64,
    pub text: String,
    /// Confidence exactly as it was written (textual form of the score).
    pub confidence: String,
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl SpanRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            image_id: row.get("image_id")?,
            text: row.get("text")?,
            confidence: row.get("confidence")?,
            x1: row.get("x1")?,
            y1: row.get("y1")?,
            x2: row.get("x2")?,
            y2: row.get("y2")?,
        })
    }

    pub fn bbox(&self) -> [i64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

/// Replaces the complete span set of `image_id` with `spans`.
///
/// Delete and insert run in one transaction, so readers see either the old
/// or the new set. An empty slice clears the set.
pub fn replace_spans(db: &Database, image_id: i64, spans: &[TextSpan]) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;

        let removed = tx.execute(
            "DELETE FROM ocr_texts WHERE image_id = ?1",
            params![image_id],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO ocr_texts (image_id, text, confidence, x1, y1, x2, y2)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for span in spans {
                let [x1, y1, x2, y2] = span.bbox;
                stmt.execute(params![
                    image_id,
                    span.text,
                    span.confidence.to_string(),
                    x1,
                    y1,
                    x2,
                    y2
                ])?;
            }
        }

        tx.commit()?;
        log::debug!(
            "Replaced spans for image {}: {} removed, {} inserted",
            image_id,
            removed,
            spans.len()
        );
        Ok(())
    })
}

/// Lists the spans of an image in insertion order.
pub fn list_for_image(db: &Database, image_id: i64) -> Result<Vec<SpanRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM ocr_texts WHERE image_id = ?1 ORDER BY id")?;
        let rows = stmt
            .query_map(params![image_id], SpanRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Counts the spans of an image.
pub fn count_for_image(db: &Database, image_id: i64) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM ocr_texts WHERE image_id = ?1",
            params![image_id],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{image_repo, project_repo};

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().expect("Failed to create test database");
        let project = project_repo::ensure_project(&db, "proj", "/in").unwrap();
        let image = image_repo::register_image(&db, project.id, "a.png", "/out").unwrap();
        (db, image.id)
    }

    fn texts(db: &Database, image_id: i64) -> Vec<String> {
        list_for_image(db, image_id)
            .unwrap()
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn test_replace_inserts_spans() {
        let (db, image_id) = setup();
        replace_spans(
            &db,
            image_id,
            &[TextSpan::new("invoice", 0.97, [10, 10, 50, 30])],
        )
        .unwrap();

        let rows = list_for_image(&db, image_id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "invoice");
        assert_eq!(rows[0].confidence, "0.97");
        assert_eq!(rows[0].bbox(), [10, 10, 50, 30]);
    }

    #[test]
    fn test_second_replace_leaves_no_residue() {
        let (db, image_id) = setup();
        let first = vec![
            TextSpan::new("old one", 0.5, [0, 0, 1, 1]),
            TextSpan::new("old two", 0.6, [1, 1, 2, 2]),
        ];
        let second = vec![TextSpan::new("new", 0.9, [5, 5, 9, 9])];

        replace_spans(&db, image_id, &first).unwrap();
        replace_spans(&db, image_id, &second).unwrap();

        assert_eq!(texts(&db, image_id), vec!["new".to_string()]);
    }

    #[test]
    fn test_replace_with_empty_clears() {
        let (db, image_id) = setup();
        replace_spans(&db, image_id, &[TextSpan::new("x", 0.1, [0, 0, 1, 1])]).unwrap();
        replace_spans(&db, image_id, &[]).unwrap();

        assert_eq!(count_for_image(&db, image_id).unwrap(), 0);
    }

    #[test]
    fn test_out_of_range_confidence_is_stored_as_is() {
        let (db, image_id) = setup();
        replace_spans(&db, image_id, &[TextSpan::new("x", 1.5, [0, 0, 1, 1])]).unwrap();

        assert_eq!(list_for_image(&db, image_id).unwrap()[0].confidence, "1.5");
    }

    #[test]
    fn test_replace_only_touches_target_image() {
        let (db, image_id) = setup();
        let other = image_repo::register_image(&db, 1, "b.png", "/out").unwrap();
        replace_spans(&db, other.id, &[TextSpan::new("keep", 0.8, [0, 0, 1, 1])]).unwrap();

        replace_spans(&db, image_id, &[]).unwrap();

        assert_eq!(texts(&db, other.id), vec!["keep".to_string()]);
    }

    #[test]
    fn test_unknown_image_is_rejected() {
        let (db, image_id) = setup();
        replace_spans(&db, image_id, &[TextSpan::new("kept", 0.8, [0, 0, 1, 1])]).unwrap();

        // Unknown image id violates the foreign key on insert.
        let bad = replace_spans(&db, 9999, &[TextSpan::new("x", 0.1, [0, 0, 1, 1])]);
        assert!(bad.is_err());
        assert_eq!(texts(&db, image_id), vec!["kept".to_string()]);
    }
}
