//! Todos — entity model, service layer, and REST routes.

pub mod model;
pub mod routes;
pub mod service;

pub use model::Todo;
pub use routes::{TodoState, todo_routes};
pub use service::TodoService;
