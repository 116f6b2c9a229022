//! Persistence layer — the `TodoStore` trait and its two backends.

pub mod libsql_backend;
pub mod memory;
pub mod schema;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use memory::MemoryStore;
pub use traits::TodoStore;
