//! In-memory todo store, for tests and as a fallback backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::traits::TodoStore;
use crate::error::TodoError;
use crate::todos::model::Todo;

#[derive(Debug)]
struct Inner {
    todos: HashMap<i64, Todo>,
    /// Next ID to hand out. Never reused, even after a delete.
    next_id: i64,
}

/// Map-backed store guarded by a single reader/writer lock.
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                todos: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn create(&self, todo: &mut Todo) -> Result<(), TodoError> {
        let mut inner = self.inner.write().await;

        let now = Utc::now();
        todo.id = inner.next_id;
        todo.created_at = now;
        todo.updated_at = now;
        inner.todos.insert(todo.id, todo.clone());
        inner.next_id += 1;

        debug!(id = todo.id, "Todo created");
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Todo, TodoError> {
        let inner = self.inner.read().await;
        inner.todos.get(&id).cloned().ok_or(TodoError::NotFound)
    }

    /// Newest first, matching the libSQL backend.
    async fn list(&self) -> Result<Vec<Todo>, TodoError> {
        let inner = self.inner.read().await;
        let mut todos: Vec<Todo> = inner.todos.values().cloned().collect();
        todos.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(todos)
    }

    async fn update(&self, todo: &mut Todo) -> Result<(), TodoError> {
        let mut inner = self.inner.write().await;

        let stored = inner.todos.get_mut(&todo.id).ok_or(TodoError::NotFound)?;
        todo.created_at = stored.created_at;
        todo.updated_at = stored.next_updated_at();
        *stored = todo.clone();

        debug!(id = todo.id, "Todo updated");
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), TodoError> {
        let mut inner = self.inner.write().await;
        if inner.todos.remove(&id).is_none() {
            return Err(TodoError::NotFound);
        }
        debug!(id, "Todo deleted");
        Ok(())
    }
}
