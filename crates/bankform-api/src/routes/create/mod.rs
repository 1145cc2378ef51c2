//! Transaction create routes - Create form, field changes, submission
//!
//! The form is stateless on the server: every request carries the field
//! values plus hidden fields for the derived state (balance, read-only
//! amount, transfer check result, touched fields).
//!
//! Structure:
//! - api.rs: HTMX endpoints and form body decoding
//! - page.rs: Form rendering

pub mod api;
pub mod page;

pub use api::{
    htmx_transaction_create_form,
    htmx_transaction_form_change,
    htmx_transaction_store,
};

pub use page::render_transaction_form;
