//! Todo service — validation and orchestration on top of a `TodoStore`.

use std::sync::Arc;

use tracing::info;

use super::model::Todo;
use crate::error::TodoError;
use crate::store::TodoStore;

/// Business rules the store does not enforce.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// Create a todo. The title must be non-empty.
    pub async fn create(&self, title: &str, description: &str) -> Result<Todo, TodoError> {
        if title.is_empty() {
            return Err(TodoError::InvalidInput("title required".into()));
        }

        let mut todo = Todo::new(title, description);
        self.store.create(&mut todo).await?;
        info!(id = todo.id, title = %todo.title, "Todo created");
        Ok(todo)
    }

    pub async fn get(&self, id: i64) -> Result<Todo, TodoError> {
        self.store.get_by_id(id).await
    }

    pub async fn list(&self) -> Result<Vec<Todo>, TodoError> {
        self.store.list().await
    }

    /// Partial update: empty `title`/`description` keep the stored values.
    /// `completed` always overwrites the stored flag.
    pub async fn update(
        &self,
        id: i64,
        title: &str,
        description: &str,
        completed: bool,
    ) -> Result<Todo, TodoError> {
        let mut todo = self.store.get_by_id(id).await?;

        if !title.is_empty() {
            todo.title = title.to_string();
        }
        if !description.is_empty() {
            todo.description = description.to_string();
        }
        todo.completed = completed;

        self.store.update(&mut todo).await?;
        info!(id, completed = todo.completed, "Todo updated");
        Ok(todo)
    }

    pub async fn delete(&self, id: i64) -> Result<(), TodoError> {
        self.store.delete(id).await?;
        info!(id, "Todo deleted");
        Ok(())
    }
}
