//! Storage module for the API.
//!
//! Provides in-memory, file-based and PostgreSQL backends for published forms.

pub mod error;
pub mod traits;

// Storage backend implementations
pub mod file;
pub mod memory;
pub mod postgres;

pub use error::StorageError;
pub use file::FileFormStore;
pub use memory::MemoryFormStore;
pub use postgres::PostgresFormStore;
pub use traits::{FormStore, UserContext};
