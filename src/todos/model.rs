//! Todo data model — the entity and its request payloads.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Store-assigned ID. Zero until the todo has been created.
    pub id: i64,
    /// Short title.
    pub title: String,
    /// Longer description, may be empty.
    pub description: String,
    /// Whether the todo is done.
    pub completed: bool,
    /// When the todo was created.
    pub created_at: DateTime<Utc>,
    /// When the todo was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Create an unsaved todo. The store fills in `id` and both timestamps.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title: title.into(),
            description: description.into(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Next `updated_at` value for a mutation: now, but always strictly after
    /// the current one.
    pub fn next_updated_at(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let floor = self.updated_at + Duration::microseconds(1);
        if now > floor { now } else { floor }
    }
}

/// Body of `POST /todos`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `PUT /todos/{id}`.
///
/// Empty or missing `title`/`description` leave the stored value alone.
/// `completed` is always written; a missing flag means `false`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}
