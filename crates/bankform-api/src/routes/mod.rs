//! Route modules for the API server
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: HTMX fragment endpoints
//! - page.rs: HTML rendering

pub mod create;
pub mod transactions;
