// API module for the form builder backend
pub mod api;

// Draft state owned by the form builder
pub mod builder;

// Re-export api modules at crate root for library tests (so routes can use crate::services, crate::models)
pub use api::config;
pub use api::middleware;
pub use api::models;
pub use api::routes;
pub use api::services;
pub use api::storage;
