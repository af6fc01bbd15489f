//! Extraction record operations.
//!
//! Every read, update and delete is filtered by `owner`; a record owned by
//! somebody else is reported exactly like a missing one.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use chrono::{DateTime, SecondsFormat, Utc};
use papyr_core::{Document, DocumentUpdate};
use rusqlite::{params, OptionalExtension};

const DOCUMENT_COLUMNS: &str = "id, owner, file_path, filename, extracted_text, extracted_data, \
                                uploaded_at, chat_id, message_id, tags";

impl Database {
    /// Insert a fully extracted record.
    pub fn create_document(&self, doc: &Document) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO documents (id, owner, file_path, filename, extracted_text, extracted_data,
                                   uploaded_at, chat_id, message_id, tags)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                doc.id,
                doc.owner,
                doc.file_path,
                doc.filename,
                doc.extracted_text,
                doc.extracted_data.as_ref().map(|v| v.to_string()),
                format_timestamp(&doc.uploaded_at),
                doc.chat_id,
                doc.message_id,
                doc.tags,
            ],
        )?;
        Ok(())
    }

    /// Get a record by ID, only if `owner` owns it.
    pub fn get_document(&self, id: &str, owner: &str) -> DbResult<Document> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM documents WHERE id = ?1 AND owner = ?2",
            DOCUMENT_COLUMNS
        );
        conn.query_row(&sql, params![id, owner], row_to_document)
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("Document not found: {}", id)))
    }

    /// Apply the mutable subset of fields and return the stored result.
    ///
    /// Fields absent from `update` keep their value; `Some(None)` stores NULL.
    pub fn update_document(
        &self,
        id: &str,
        owner: &str,
        update: &DocumentUpdate,
    ) -> DbResult<Document> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let rows = tx.execute(
            r#"
            UPDATE documents
            SET tags = CASE WHEN ?3 THEN ?4 ELSE tags END,
                extracted_data = CASE WHEN ?5 THEN ?6 ELSE extracted_data END
            WHERE id = ?1 AND owner = ?2
            "#,
            params![
                id,
                owner,
                update.tags.is_some(),
                update.tags.clone().flatten(),
                update.extracted_data.is_some(),
                update
                    .extracted_data
                    .as_ref()
                    .and_then(|data| data.as_ref())
                    .map(|v| v.to_string()),
            ],
        )?;

        if rows == 0 {
            return Err(DbError::NotFound(format!("Document not found: {}", id)));
        }

        let sql = format!(
            "SELECT {} FROM documents WHERE id = ?1 AND owner = ?2",
            DOCUMENT_COLUMNS
        );
        let doc = tx.query_row(&sql, params![id, owner], row_to_document)?;
        tx.commit()?;

        Ok(doc)
    }

    /// Delete a record and return what was removed.
    pub fn delete_document(&self, id: &str, owner: &str) -> DbResult<Document> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let sql = format!(
            "SELECT {} FROM documents WHERE id = ?1 AND owner = ?2",
            DOCUMENT_COLUMNS
        );
        let doc = tx
            .query_row(&sql, params![id, owner], row_to_document)
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("Document not found: {}", id)))?;

        tx.execute(
            "DELETE FROM documents WHERE id = ?1 AND owner = ?2",
            params![id, owner],
        )?;
        tx.commit()?;

        Ok(doc)
    }

    /// List an owner's records, newest first.
    pub fn list_documents(&self, owner: &str, limit: Option<i64>) -> DbResult<Vec<Document>> {
        let conn = self.conn()?;
        let limit = limit.unwrap_or(100);

        let sql = format!(
            "SELECT {} FROM documents WHERE owner = ?1 ORDER BY uploaded_at DESC, rowid DESC LIMIT ?2",
            DOCUMENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let docs = stmt.query_map(params![owner, limit], row_to_document)?;
        docs.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Oldest record the owner attached to a message.
    pub fn find_document_by_message(
        &self,
        message_id: &str,
        owner: &str,
    ) -> DbResult<Option<Document>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM documents WHERE owner = ?1 AND message_id = ?2
             ORDER BY uploaded_at ASC, rowid ASC LIMIT 1",
            DOCUMENT_COLUMNS
        );
        conn.query_row(&sql, params![owner, message_id], row_to_document)
            .optional()
            .map_err(DbError::from)
    }

    /// Void the chat association on every record pointing at a deleted chat.
    pub fn clear_chat_association(&self, chat_id: &str) -> DbResult<usize> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE documents SET chat_id = NULL WHERE chat_id = ?1",
            params![chat_id],
        )?;
        Ok(rows)
    }

    /// Void the message association on every record pointing at a deleted message.
    pub fn clear_message_association(&self, message_id: &str) -> DbResult<usize> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE documents SET message_id = NULL WHERE message_id = ?1",
            params![message_id],
        )?;
        Ok(rows)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<Document> {
    let extracted_data_str: Option<String> = row.get(5)?;
    let uploaded_at_str: String = row.get(6)?;

    Ok(Document {
        id: row.get(0)?,
        owner: row.get(1)?,
        file_path: row.get(2)?,
        filename: row.get(3)?,
        extracted_text: row.get(4)?,
        extracted_data: extracted_data_str.and_then(|s| serde_json::from_str(&s).ok()),
        uploaded_at: DateTime::parse_from_rfc3339(&uploaded_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        chat_id: row.get(7)?,
        message_id: row.get(8)?,
        tags: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(owner: &str, filename: &str) -> Document {
        Document::new(owner, filename, format!("ocr_uploads/{}", filename))
            .unwrap()
            .with_extracted_text("a b\nc")
            .with_tags("")
    }

    #[test]
    fn test_document_crud() {
        let db = Database::open_in_memory().unwrap();

        let doc = sample("alice", "scan.png").with_message(Some("m1".to_string()));
        db.create_document(&doc).unwrap();

        let fetched = db.get_document(&doc.id, "alice").unwrap();
        assert_eq!(fetched.filename, "scan.png");
        assert_eq!(fetched.extracted_text.as_deref(), Some("a b\nc"));
        assert_eq!(fetched.message_id.as_deref(), Some("m1"));

        let updated = db
            .update_document(
                &doc.id,
                "alice",
                &DocumentUpdate::default().with_tags(Some("receipts".to_string())),
            )
            .unwrap();
        assert_eq!(updated.tags.as_deref(), Some("receipts"));
        assert!(updated.extracted_data.is_none());
        assert_eq!(updated.filename, "scan.png");

        let removed = db.delete_document(&doc.id, "alice").unwrap();
        assert_eq!(removed.file_path, "ocr_uploads/scan.png");
        assert!(matches!(
            db.get_document(&doc.id, "alice"),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn test_owner_isolation() {
        let db = Database::open_in_memory().unwrap();
        let doc = sample("alice", "scan.png");
        db.create_document(&doc).unwrap();

        assert!(matches!(db.get_document(&doc.id, "bob"), Err(DbError::NotFound(_))));
        assert!(matches!(
            db.update_document(&doc.id, "bob", &DocumentUpdate::default()),
            Err(DbError::NotFound(_))
        ));
        assert!(matches!(db.delete_document(&doc.id, "bob"), Err(DbError::NotFound(_))));
        assert!(db.list_documents("bob", None).unwrap().is_empty());

        // Still intact for the owner
        assert!(db.get_document(&doc.id, "alice").is_ok());
    }

    #[test]
    fn test_extracted_data_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let doc = sample("alice", "scan.png");
        db.create_document(&doc).unwrap();

        let data = serde_json::json!({"rows": [["a", "b"]]});
        let updated = db
            .update_document(
                &doc.id,
                "alice",
                &DocumentUpdate::default().with_extracted_data(Some(data.clone())),
            )
            .unwrap();
        assert_eq!(updated.extracted_data, Some(data));
        assert_eq!(updated.tags.as_deref(), Some(""));
    }

    #[test]
    fn test_update_null_clears_field() {
        let db = Database::open_in_memory().unwrap();
        let doc = sample("alice", "scan.png").with_tags("receipts");
        db.create_document(&doc).unwrap();
        db.update_document(
            &doc.id,
            "alice",
            &DocumentUpdate::default().with_extracted_data(Some(serde_json::json!([1]))),
        )
        .unwrap();

        let cleared = db
            .update_document(&doc.id, "alice", &DocumentUpdate::default().with_tags(None))
            .unwrap();
        assert!(cleared.tags.is_none());
        assert_eq!(cleared.extracted_data, Some(serde_json::json!([1])));

        let cleared = db
            .update_document(
                &doc.id,
                "alice",
                &DocumentUpdate::default().with_extracted_data(None),
            )
            .unwrap();
        assert!(cleared.extracted_data.is_none());
        assert!(cleared.tags.is_none());
    }

    #[test]
    fn test_find_by_message_returns_oldest_owned() {
        let db = Database::open_in_memory().unwrap();

        let first = sample("alice", "one.png").with_message(Some("m1".to_string()));
        let mut second = sample("alice", "two.png").with_message(Some("m1".to_string()));
        second.uploaded_at = first.uploaded_at + chrono::Duration::seconds(5);
        let foreign = sample("bob", "three.png").with_message(Some("m1".to_string()));

        db.create_document(&second).unwrap();
        db.create_document(&first).unwrap();
        db.create_document(&foreign).unwrap();

        let found = db.find_document_by_message("m1", "alice").unwrap().unwrap();
        assert_eq!(found.id, first.id);

        assert!(db.find_document_by_message("m2", "alice").unwrap().is_none());
        assert_eq!(
            db.find_document_by_message("m1", "bob").unwrap().unwrap().id,
            foreign.id
        );
    }

    #[test]
    fn test_list_documents_newest_first() {
        let db = Database::open_in_memory().unwrap();

        let old = sample("alice", "old.png");
        let mut new = sample("alice", "new.png");
        new.uploaded_at = old.uploaded_at + chrono::Duration::minutes(1);
        db.create_document(&old).unwrap();
        db.create_document(&new).unwrap();

        let docs = db.list_documents("alice", None).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, new.id);

        assert_eq!(db.list_documents("alice", Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_clearing_associations() {
        let db = Database::open_in_memory().unwrap();
        let doc = sample("alice", "scan.png")
            .with_chat(Some("c1".to_string()))
            .with_message(Some("m1".to_string()));
        db.create_document(&doc).unwrap();

        assert_eq!(db.clear_message_association("m1").unwrap(), 1);
        assert_eq!(db.clear_chat_association("c1").unwrap(), 1);
        assert_eq!(db.clear_chat_association("c1").unwrap(), 0);

        let fetched = db.get_document(&doc.id, "alice").unwrap();
        assert!(fetched.chat_id.is_none());
        assert!(fetched.message_id.is_none());
        assert_eq!(fetched.extracted_text, doc.extracted_text);
    }
}
