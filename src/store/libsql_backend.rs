//! libSQL backend — async `TodoStore` implementation.
//!
//! Supports local file and in-memory databases. Every statement uses bound
//! parameters.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::{DatabaseError, TodoError};
use crate::store::schema;
use crate::store::traits::TodoStore;
use crate::todos::model::Todo;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and bootstrap the schema.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        schema::init_schema(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

const TODO_COLUMNS: &str = "id, title, description, completed, created_at, updated_at";

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // SQLite datetime() output with fractional seconds
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }
    // ...and without
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|ndt| ndt.and_utc())
}

/// Read a timestamp column. An unparseable value is a storage fault.
fn get_datetime(row: &libsql::Row, idx: i32, op: &str) -> Result<DateTime<Utc>, TodoError> {
    let raw: String = row.get(idx).map_err(|e| query_err(op, e))?;
    parse_datetime(&raw).ok_or_else(|| {
        TodoError::Storage(DatabaseError::Query(format!(
            "{op}: invalid timestamp in column {idx}: {raw:?}"
        )))
    })
}

/// Map a libsql Row to a Todo.
///
/// Column order matches TODO_COLUMNS:
/// 0:id, 1:title, 2:description, 3:completed, 4:created_at, 5:updated_at
fn row_to_todo(row: &libsql::Row, op: &str) -> Result<Todo, TodoError> {
    Ok(Todo {
        id: row.get(0).map_err(|e| query_err(op, e))?,
        title: row.get(1).map_err(|e| query_err(op, e))?,
        description: row.get(2).map_err(|e| query_err(op, e))?,
        completed: row.get::<i64>(3).map_err(|e| query_err(op, e))? != 0,
        created_at: get_datetime(row, 4, op)?,
        updated_at: get_datetime(row, 5, op)?,
    })
}

fn query_err(op: &str, e: libsql::Error) -> TodoError {
    TodoError::Storage(DatabaseError::Query(format!("{op}: {e}")))
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl TodoStore for LibSqlBackend {
    async fn create(&self, todo: &mut Todo) -> Result<(), TodoError> {
        let mut rows = self
            .conn()
            .query(
                "INSERT INTO todos (title, description, completed) VALUES (?1, ?2, ?3)
                 RETURNING id, created_at, updated_at",
                params![
                    todo.title.as_str(),
                    todo.description.as_str(),
                    todo.completed as i64,
                ],
            )
            .await
            .map_err(|e| query_err("create todo", e))?;

        let row = rows
            .next()
            .await
            .map_err(|e| query_err("create todo", e))?
            .ok_or_else(|| {
                TodoError::Storage(DatabaseError::Query(
                    "create todo: insert returned no row".into(),
                ))
            })?;

        todo.id = row.get(0).map_err(|e| query_err("create todo", e))?;
        todo.created_at = get_datetime(&row, 1, "create todo")?;
        todo.updated_at = get_datetime(&row, 2, "create todo")?;

        debug!(id = todo.id, "Todo created");
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Todo, TodoError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| query_err("get todo", e))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_todo(&row, "get todo row"),
            Ok(None) => Err(TodoError::NotFound),
            Err(e) => Err(query_err("get todo", e)),
        }
    }

    async fn list(&self) -> Result<Vec<Todo>, TodoError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {TODO_COLUMNS} FROM todos ORDER BY created_at DESC, id DESC"),
                (),
            )
            .await
            .map_err(|e| query_err("list todos", e))?;

        let mut todos = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| query_err("list todos", e))? {
            todos.push(row_to_todo(&row, "scan todo")?);
        }
        Ok(todos)
    }

    async fn update(&self, todo: &mut Todo) -> Result<(), TodoError> {
        // The floor is taken from the stored row, not the caller's copy, so
        // concurrent writers still move updated_at forward.
        let mut rows = self
            .conn()
            .query(
                "UPDATE todos SET title = ?1, description = ?2, completed = ?3,
                     updated_at = MAX(
                         strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                         strftime('%Y-%m-%dT%H:%M:%fZ', updated_at, '+0.001 seconds')
                     )
                 WHERE id = ?4
                 RETURNING created_at, updated_at",
                params![
                    todo.title.as_str(),
                    todo.description.as_str(),
                    todo.completed as i64,
                    todo.id,
                ],
            )
            .await
            .map_err(|e| query_err("update todo", e))?;

        let row = match rows.next().await {
            Ok(Some(row)) => row,
            Ok(None) => return Err(TodoError::NotFound),
            Err(e) => return Err(query_err("update todo", e)),
        };

        todo.created_at = get_datetime(&row, 0, "update todo")?;
        todo.updated_at = get_datetime(&row, 1, "update todo")?;

        debug!(id = todo.id, "Todo updated");
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), TodoError> {
        let count = self
            .conn()
            .execute("DELETE FROM todos WHERE id = ?1", params![id])
            .await
            .map_err(|e| query_err("delete todo", e))?;

        if count == 0 {
            return Err(TodoError::NotFound);
        }
        debug!(id, "Todo deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::SecondsFormat;

    use super::*;

    async fn test_db() -> LibSqlBackend {
        LibSqlBackend::new_memory().await.unwrap()
    }

    async fn insert(db: &LibSqlBackend, title: &str) -> Todo {
        let mut todo = Todo::new(title, "");
        db.create(&mut todo).await.unwrap();
        todo
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let db = test_db().await;
        let todo = insert(&db, "Buy milk").await;

        assert!(todo.id > 0);
        assert!(!todo.completed);
        assert_eq!(todo.created_at, todo.updated_at);
        assert!(todo.created_at > DateTime::<Utc>::MIN_UTC);
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let db = test_db().await;
        let mut todo = Todo::new("Walk dog", "around the block");
        db.create(&mut todo).await.unwrap();

        let fetched = db.get_by_id(todo.id).await.unwrap();
        assert_eq!(fetched, todo);
    }

    #[tokio::test]
    async fn get_by_id_not_found() {
        let db = test_db().await;
        let err = db.get_by_id(999).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn list_is_newest_first_without_duplicates() {
        let db = test_db().await;
        let a = insert(&db, "a").await;
        let b = insert(&db, "b").await;
        let c = insert(&db, "c").await;

        let todos = db.list().await.unwrap();
        assert_eq!(todos.len(), 3);
        let ids: Vec<i64> = todos.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 3);
    }

    #[tokio::test]
    async fn list_empty() {
        let db = test_db().await;
        assert!(db.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_persists_and_advances_updated_at() {
        let db = test_db().await;
        let mut todo = insert(&db, "Draft").await;
        let before = todo.updated_at;

        todo.title = "Final".into();
        todo.completed = true;
        db.update(&mut todo).await.unwrap();

        assert!(todo.updated_at > before);
        let fetched = db.get_by_id(todo.id).await.unwrap();
        assert_eq!(fetched.title, "Final");
        assert!(fetched.completed);
        assert_eq!(fetched.updated_at, todo.updated_at);
        assert_eq!(fetched.created_at, todo.created_at);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let db = test_db().await;
        let mut ghost = Todo::new("ghost", "");
        ghost.id = 12345;

        let err = db.update(&mut ghost).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(db.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_floor_comes_from_stored_row() {
        let db = test_db().await;
        let mut stale = insert(&db, "contended").await;

        // Another writer already moved the stored row far ahead.
        db.conn()
            .execute(
                "UPDATE todos SET updated_at = '2999-01-01T00:00:00.000Z' WHERE id = ?1",
                params![stale.id],
            )
            .await
            .unwrap();

        stale.completed = true;
        db.update(&mut stale).await.unwrap();

        let ahead = parse_datetime("2999-01-01T00:00:00.000Z").unwrap();
        assert!(stale.updated_at > ahead);
        let fetched = db.get_by_id(stale.id).await.unwrap();
        assert_eq!(fetched.updated_at, stale.updated_at);
    }

    #[tokio::test]
    async fn corrupt_timestamp_is_storage_fault() {
        let db = test_db().await;
        let good = insert(&db, "fine").await;
        db.conn()
            .execute(
                "INSERT INTO todos (title, created_at) VALUES (?1, ?2)",
                params!["broken", "garbage"],
            )
            .await
            .unwrap();
        let bad_id = db.conn().last_insert_rowid();

        let err = db.get_by_id(bad_id).await.unwrap_err();
        assert!(matches!(err, TodoError::Storage(DatabaseError::Query(_))));
        assert!(err.to_string().contains("invalid timestamp"));
        assert!(matches!(db.list().await.unwrap_err(), TodoError::Storage(_)));
        assert_eq!(db.get_by_id(good.id).await.unwrap(), good);
    }

    #[tokio::test]
    async fn delete_then_get_and_delete_again() {
        let db = test_db().await;
        let todo = insert(&db, "temp").await;

        db.delete(todo.id).await.unwrap();
        assert!(db.get_by_id(todo.id).await.unwrap_err().is_not_found());
        assert!(db.delete(todo.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn ids_not_reused_after_delete() {
        let db = test_db().await;
        let first = insert(&db, "first").await;
        db.delete(first.id).await.unwrap();
        let second = insert(&db, "second").await;
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn hostile_title_is_stored_verbatim() {
        let db = test_db().await;
        let title = "x'); DROP TABLE todos; --";
        let todo = insert(&db, title).await;

        let fetched = db.get_by_id(todo.id).await.unwrap();
        assert_eq!(fetched.title, title);
        assert_eq!(db.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn local_file_persists_across_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("todos.db");

        let id = {
            let db = LibSqlBackend::new_local(&path).await.unwrap();
            insert(&db, "durable").await.id
        };

        let db = LibSqlBackend::new_local(&path).await.unwrap();
        let fetched = db.get_by_id(id).await.unwrap();
        assert_eq!(fetched.title, "durable");
    }

    #[test]
    fn parse_datetime_formats() {
        let dt = parse_datetime("2026-01-02T03:04:05.678Z").unwrap();
        assert_eq!(dt.to_rfc3339_opts(SecondsFormat::Millis, true), "2026-01-02T03:04:05.678Z");

        let dt = parse_datetime("2026-01-02 03:04:05").unwrap();
        assert_eq!(dt.to_rfc3339_opts(SecondsFormat::Secs, true), "2026-01-02T03:04:05Z");

        assert_eq!(parse_datetime("garbage"), None);
    }
}
