//! Services module - business logic shared by the route handlers.

pub mod export_service;
pub mod jwt_service;
pub mod submission_service;

// Re-export for convenience
pub use export_service::{CsvExport, ExportError, ExportService};
pub use jwt_service::{Claims, JwtService, SharedJwtService, TokenPair, TokenType};
pub use submission_service::{SubmissionError, SubmissionService};
