//! HTTP server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::create: Transaction create form and submission
//! - routes::transactions: Transaction page, paginated table, delete, refresh events

pub mod error;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    response::Redirect,
    routing::{delete, get},
    Router,
};
use tokio::net::TcpListener;

use bankform_config::Config;
use bankform_core::{
    BankAccountServiceRef, ListenerGuard, Notification, TransactionCreateController,
    TransactionEvents, TransactionListView, TransactionServiceRef,
};
use bankform_utils::{escape_html, generate_id};

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub controller: Arc<TransactionCreateController>,
    pub list: Arc<TransactionListView>,
    /// Keeps the list subscribed to creation events while the server lives
    _listener: Arc<ListenerGuard>,
}

impl AppState {
    /// Wire the controller and the list view to one event channel.
    ///
    /// Must be called inside a tokio runtime: the list listener is spawned here.
    pub fn new(
        config: Config,
        accounts: BankAccountServiceRef,
        transactions: TransactionServiceRef,
    ) -> Self {
        let events = TransactionEvents::new(config.events.capacity);
        let controller = TransactionCreateController::new(
            accounts.clone(),
            transactions.clone(),
            events.clone(),
            &config.notifications,
        );
        let list = Arc::new(TransactionListView::new(
            accounts,
            transactions,
            config.notifications.duration_ms,
        ));
        let listener = list.attach(&events);

        Self {
            config: Arc::new(config),
            controller: Arc::new(controller),
            list,
            _listener: Arc::new(listener),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::create::{htmx_transaction_create_form, htmx_transaction_form_change, htmx_transaction_store};
    use routes::transactions::{htmx_transaction_delete, htmx_transactions_list, page_transactions, sse_transaction_events};

    Router::new()
        .route("/api/health", get(health_check))
        .route("/", get(|| async { Redirect::to("/transactions") }))
        .route("/transactions", get(page_transactions).post(htmx_transaction_store))
        .route("/transactions/list", get(htmx_transactions_list))
        .route("/transactions/events", get(sse_transaction_events))
        .route("/transactions/:id", delete(htmx_transaction_delete))
        .route(
            "/transactions/create/form",
            get(htmx_transaction_create_form).post(htmx_transaction_form_change),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Bankform</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://unpkg.com/htmx.org@1.9.10/dist/ext/sse.js"></script>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/tailwindcss@2.2.19/dist/tailwind.min.css">
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
    <div id='toasts' class='fixed bottom-4 right-4 space-y-2 z-50'></div>
</body>
</html>"#,
        title, content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [("/transactions", "Transactions")];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Bankform</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label) in &links {
        let active_class = if current_path.starts_with(path) {
            "bg-indigo-50 text-indigo-600"
        } else {
            "text-gray-600 hover:bg-gray-50"
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'><span>{}</span></a></li>"#,
            path, active_class, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Toast appended out-of-band to `#toasts`, removed after its duration
pub fn toast_html(notification: &Notification) -> String {
    let id = generate_id("toast");
    let (box_class, text_class) = if notification.is_error() {
        ("bg-red-50 border-red-200", "text-red-800")
    } else {
        ("bg-green-50 border-green-200", "text-green-800")
    };
    format!(
        r#"<div hx-swap-oob='beforeend:#toasts'><div id='{id}' class='border rounded-lg shadow p-3 flex items-center gap-3 {box_class}'><span class='font-medium {text_class}'>{message}</span><span class='text-sm text-gray-500'>{action}</span></div><script>setTimeout(function() {{ var el = document.getElementById('{id}'); if (el) {{ el.remove(); }} }}, {duration});</script></div>"#,
        id = id,
        box_class = box_class,
        text_class = text_class,
        message = escape_html(&notification.message),
        action = notification.action(),
        duration = notification.duration_ms,
    )
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#, inner_content)
    } else {
        base_html(title, &format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            nav_sidebar(current_path), inner_content))
    }
}

/// Start the HTTP server
///
/// Loads the transaction list once, then serves until the process exits.
pub async fn start_server(
    config: Config,
    accounts: BankAccountServiceRef,
    transactions: TransactionServiceRef,
) -> anyhow::Result<()> {
    let addr = config.listen_addr();
    let state = AppState::new(config, accounts, transactions);

    if let Err(e) = state.list.reload().await {
        log::warn!("Initial transaction load failed: {}", e);
    }

    let router = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    log::info!("Starting Bankform server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - /transactions (Create form and transaction list)");
    log::info!("  - /transactions/events (List refresh stream)");
    log::info!("  - /api/health (Health check)");

    axum::serve(listener, router).await.context("server error")?;
    log::info!("Server stopped");
    Ok(())
}
