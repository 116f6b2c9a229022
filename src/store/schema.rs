//! Table bootstrap for the libSQL backend.
//!
//! There is a single table and no versioning; `init_schema` is safe to run on
//! every startup.

use libsql::Connection;
use tracing::info;

use crate::error::DatabaseError;

/// Timestamps default to RFC 3339 UTC with milliseconds, generated by SQLite.
const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        completed INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    );
    CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos(created_at);
"#;

/// Create the `todos` table and its index if they do not exist yet.
pub async fn init_schema(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(SCHEMA)
        .await
        .map_err(|e| DatabaseError::Migration(format!("Failed to create todos table: {e}")))?;
    info!("Database schema ready");
    Ok(())
}
