//! `TodoStore` trait — the persistence seam shared by every backend.

use async_trait::async_trait;

use crate::error::TodoError;
use crate::todos::model::Todo;

/// Backend-agnostic todo storage.
///
/// Every method is a cancellable future: dropping it aborts whatever I/O is
/// still outstanding.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Persist a new todo. Assigns `id`, `created_at` and `updated_at` on the
    /// passed-in value.
    async fn create(&self, todo: &mut Todo) -> Result<(), TodoError>;

    /// Fetch a todo by ID, or `TodoError::NotFound`.
    async fn get_by_id(&self, id: i64) -> Result<Todo, TodoError>;

    /// All todos. Ordering is up to the backend.
    async fn list(&self) -> Result<Vec<Todo>, TodoError>;

    /// Overwrite an existing todo and refresh its `updated_at`.
    async fn update(&self, todo: &mut Todo) -> Result<(), TodoError>;

    /// Remove a todo permanently.
    async fn delete(&self, id: i64) -> Result<(), TodoError>;
}
