//! Transaction routes - Transaction page, paginated table, delete, refresh events
//!
//! Features:
//! - Transaction table joined with account holder names
//! - Paginator with page size selection
//! - Delete with a toast on success or failure
//! - Server-sent `refreshed` events after every list reload
//!
//! Structure:
//! - api.rs: HTMX and SSE endpoints
//! - page.rs: Full page and table rendering

pub mod api;
pub mod page;

pub use api::{
    htmx_transactions_list,
    htmx_transaction_delete,
    sse_transaction_events,
};

pub use page::{
    page_transactions,
    render_transactions_table,
};
