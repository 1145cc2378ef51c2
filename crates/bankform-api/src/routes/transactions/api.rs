//! Transactions endpoints - HTMX partial responses and refresh events
//!
//! Endpoints:
//! - htmx_transactions_list: Table page (HTML fragment)
//! - htmx_transaction_delete: Delete, then the refreshed table (HTML fragment + toast)
//! - sse_transaction_events: `refreshed` event after every list reload (SSE)

use std::convert::Infallible;

use axum::extract::{Path, Query};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Html;
use futures::stream::{self, Stream};
use serde::Deserialize;

use bankform_config::PaginationConfig;

use super::page::render_transactions_table;
use crate::{toast_html, AppState};

/// Paginator position; defaults to the first page at the configured size
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl ListParams {
    /// Page index and size; the size is capped at the largest offered option
    fn resolve(&self, pagination: &PaginationConfig) -> (usize, usize) {
        let max_size = pagination
            .page_size_options
            .iter()
            .copied()
            .max()
            .unwrap_or(pagination.page_size)
            .max(pagination.page_size);
        let size = self
            .size
            .filter(|s| *s > 0)
            .unwrap_or(pagination.page_size)
            .min(max_size);
        (self.page.unwrap_or(0), size)
    }
}

/// HTMX: Transaction table page
pub async fn htmx_transactions_list(
    state: axum::extract::State<AppState>,
    params: Query<ListParams>,
) -> Html<String> {
    let pagination = &state.config.pagination;
    let (index, size) = params.resolve(pagination);
    let page = state.list.page(index, size).await;
    Html(render_transactions_table(&page, &pagination.page_size_options))
}

/// HTMX: Delete a transaction
pub async fn htmx_transaction_delete(
    state: axum::extract::State<AppState>,
    Path(id): Path<i64>,
    params: Query<ListParams>,
) -> Html<String> {
    let notification = state.list.delete(id).await;

    let pagination = &state.config.pagination;
    let (index, size) = params.resolve(pagination);
    let page = state.list.page(index, size).await;

    let mut html = render_transactions_table(&page, &pagination.page_size_options);
    html.push_str(&toast_html(&notification));
    Html(html)
}

/// SSE: one `refreshed` event per list reload, for as long as the client stays
pub async fn sse_transaction_events(
    state: axum::extract::State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let refreshes = state.list.refreshes();
    log::debug!("Refresh stream opened");

    let events = stream::unfold(refreshes, |mut refreshes| async move {
        refreshes.changed().await.ok()?;
        let generation = *refreshes.borrow_and_update();
        let event = Event::default().event("refreshed").data(generation.to_string());
        Some((Ok(event), refreshes))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    use bankform_core::services::memory::InMemoryBank;
    use bankform_core::TransactionType;

    use crate::test_support::{get, post_form, send, state};

    fn delete(uri: &str) -> Request<Body> {
        Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_page_reloads_and_renders_table() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        bank.add_transaction(TransactionType::Transfer, Some(1), Some(2), 10.0);
        let (status, body) = send(&state(&bank), get("/transactions")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<!DOCTYPE html>"));
        assert!(body.contains("sse-connect='/transactions/events'"));
        assert!(body.contains("id='create-panel'"));
        assert!(body.contains("Thomas Christopher Wright"));
        assert_eq!(bank.transaction_loads(), 1);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        for i in 0..12 {
            bank.add_transaction(TransactionType::Deposit, None, Some(1), i as f64 + 1.0);
        }
        let state = state(&bank);
        state.list.reload().await.unwrap();

        let (_, body) = send(&state, get("/transactions/list?page=1&size=5")).await;
        assert!(body.contains("6 - 10 of 12"));
        assert!(body.contains("id='transaction-6'"));
        assert!(!body.contains("id='transaction-11'"));

        // Default size from the configuration
        let (_, body) = send(&state, get("/transactions/list")).await;
        assert!(body.contains("1 - 10 of 12"));
    }

    #[tokio::test]
    async fn test_huge_page_size_is_capped() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        for i in 0..25 {
            bank.add_transaction(TransactionType::Deposit, None, Some(1), i as f64 + 1.0);
        }
        let state = state(&bank);
        state.list.reload().await.unwrap();

        let (status, body) = send(&state, get("/transactions/list?size=18446744073709551615")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("1 - 20 of 25"));
        assert!(body.contains("hx-get='/transactions/list?page=1&size=20'"));
    }

    #[test]
    fn test_list_params_resolve() {
        let pagination = bankform_config::PaginationConfig::default();
        let params = |page, size| super::ListParams { page, size };

        assert_eq!(params(None, None).resolve(&pagination), (0, 10));
        assert_eq!(params(Some(2), Some(5)).resolve(&pagination), (2, 5));
        assert_eq!(params(None, Some(0)).resolve(&pagination), (0, 10));
        assert_eq!(params(None, Some(usize::MAX)).resolve(&pagination), (0, 20));
    }

    #[tokio::test]
    async fn test_delete_returns_refreshed_table() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let tx = bank.add_transaction(TransactionType::Deposit, None, Some(1), 5.0);
        let state = state(&bank);
        state.list.reload().await.unwrap();

        let (status, body) = send(&state, delete(&format!("/transactions/{}?page=0&size=10", tx.id))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Transaction has been deleted."));
        assert!(body.contains("No transactions yet"));
    }

    #[tokio::test]
    async fn test_failed_delete_shows_error() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let (status, body) = send(&state(&bank), delete("/transactions/42")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Error Deleting Transaction"));
        assert_eq!(bank.transaction_loads(), 1);
    }

    #[tokio::test]
    async fn test_created_transaction_appears_in_list() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let state = state(&bank);
        let mut refreshes = state.list.refreshes();

        let request = post_form(
            "/transactions",
            None,
            "transaction_type=DEPOSIT&target_bank_account_id=2&amount=75",
        );
        send(&state, request).await;

        tokio::time::timeout(Duration::from_secs(5), refreshes.changed())
            .await
            .unwrap()
            .unwrap();
        let (_, body) = send(&state, get("/transactions/list")).await;
        assert!(body.contains("id='transaction-1'"));
        assert!(body.contains("Thomas Christopher Wright"));
    }

    #[tokio::test]
    async fn test_events_endpoint_streams_sse() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let response = tower::ServiceExt::oneshot(
            crate::create_router(state(&bank)),
            get("/transactions/events"),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");
    }
}
