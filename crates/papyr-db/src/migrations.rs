//! Database migrations and schema management.

use crate::error::DbResult;
use rusqlite::Connection;
use tracing::info;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> DbResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating initial database schema...");
        create_initial_schema(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            "Migrating database from version {} to {}",
            current_version, SCHEMA_VERSION
        );
        set_schema_version(conn, SCHEMA_VERSION)?;
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> DbResult<()> {
    conn.pragma_update(None, "user_version", version)?;
    Ok(())
}

fn create_initial_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- One row per successful ingestion
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            owner TEXT NOT NULL,
            file_path TEXT NOT NULL,
            filename TEXT NOT NULL CHECK (length(filename) > 0),
            extracted_text TEXT,
            extracted_data TEXT,
            uploaded_at TEXT NOT NULL,
            chat_id TEXT,
            message_id TEXT,
            tags TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_documents_owner ON documents(owner, uploaded_at);
        CREATE INDEX IF NOT EXISTS idx_documents_message ON documents(owner, message_id);
        CREATE INDEX IF NOT EXISTS idx_documents_chat ON documents(chat_id);
        "#,
    )?;

    Ok(())
}
