//! Record store statistics.

use crate::database::Database;
use crate::error::DbResult;
use rusqlite::params;

/// Counters shown by `papyr status`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStats {
    pub total_documents: i64,
    pub with_text: i64,
    pub with_message: i64,
    pub database_size_bytes: i64,
}

impl Database {
    /// Get statistics for one owner's records.
    pub fn get_stats(&self, owner: &str) -> DbResult<DocumentStats> {
        let conn = self.conn()?;

        let (total_documents, with_text, with_message): (i64, i64, i64) = conn.query_row(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(CASE WHEN extracted_text IS NOT NULL AND extracted_text != '' THEN 1 ELSE 0 END), 0),
                   COALESCE(SUM(CASE WHEN message_id IS NOT NULL THEN 1 ELSE 0 END), 0)
            FROM documents WHERE owner = ?1
            "#,
            params![owner],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        // Database size (page_count * page_size)
        let page_count: i64 = conn.pragma_query_value(None, "page_count", |row| row.get(0))?;
        let page_size: i64 = conn.pragma_query_value(None, "page_size", |row| row.get(0))?;

        Ok(DocumentStats {
            total_documents,
            with_text,
            with_message,
            database_size_bytes: page_count * page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papyr_core::Document;

    #[test]
    fn test_get_stats() {
        let db = Database::open_in_memory().unwrap();

        let a = Document::new("alice", "a.png", "ocr_uploads/a")
            .unwrap()
            .with_extracted_text("text")
            .with_message(Some("m1".to_string()));
        let b = Document::new("alice", "b.png", "ocr_uploads/b")
            .unwrap()
            .with_extracted_text("");
        let c = Document::new("bob", "c.png", "ocr_uploads/c").unwrap();
        db.create_document(&a).unwrap();
        db.create_document(&b).unwrap();
        db.create_document(&c).unwrap();

        let stats = db.get_stats("alice").unwrap();
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.with_text, 1);
        assert_eq!(stats.with_message, 1);
        assert!(stats.database_size_bytes > 0);

        assert_eq!(db.get_stats("carol").unwrap(), DocumentStats {
            database_size_bytes: stats.database_size_bytes,
            ..DocumentStats::default()
        });
    }
}
