//! Transactions page rendering
//!
//! Endpoints:
//! - page_transactions: Create form next to the transaction table
//!
//! Helper functions:
//! - render_transactions_table: Table fragment with paginator

use bankform_core::{ExtendedTransaction, Page};
use bankform_utils::{escape_html, format_amount, format_number};

use crate::AppState;

/// Transactions page - create form and transaction table.
/// Opening the page reloads the list from the backend.
pub async fn page_transactions(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    if let Err(e) = state.list.reload().await {
        log::warn!("Failed to reload transactions for the page: {}", e);
    }
    let pagination = &state.config.pagination;
    let page = state.list.page(0, pagination.page_size).await;

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-4'>
            <h2 class='text-2xl font-bold'>Transactions</h2>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-3 gap-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>New transaction</h3>
                <div id='create-panel' hx-get='/transactions/create/form' hx-trigger='load' hx-swap='innerHTML'>
                    <div class='flex items-center justify-center py-12'>
                        <div class='animate-spin rounded-full h-8 w-8 border-b-2 border-indigo-600'></div>
                    </div>
                </div>
            </div>
            <div class='lg:col-span-2 bg-white rounded-xl shadow-sm p-6' hx-ext='sse' sse-connect='/transactions/events'>
                {}
            </div>
        </div>"#,
        render_transactions_table(&page, &pagination.page_size_options)
    );

    axum::response::Html(crate::page_response(&headers, "Transactions", "/transactions", &inner_content))
}

/// Render the table with its paginator.
///
/// The fragment reloads itself, at the same page, on every `refreshed`
/// server-sent event.
pub fn render_transactions_table(page: &Page<ExtendedTransaction>, size_options: &[usize]) -> String {
    let mut html = format!(
        r#"<div id='transactions-table' hx-get='/transactions/list?page={}&size={}' hx-trigger='sse:refreshed' hx-swap='outerHTML'>
<table class='min-w-full divide-y divide-gray-200 text-sm'>
    <thead class='bg-gray-50'>
        <tr>
            <th class='px-4 py-2 text-left font-medium text-gray-600'>Id</th>
            <th class='px-4 py-2 text-left font-medium text-gray-600'>Type</th>
            <th class='px-4 py-2 text-right font-medium text-gray-600'>Amount</th>
            <th class='px-4 py-2 text-left font-medium text-gray-600'>Source</th>
            <th class='px-4 py-2 text-left font-medium text-gray-600'>Target</th>
            <th class='px-4 py-2 text-right font-medium text-gray-600'>Actions</th>
        </tr>
    </thead>
    <tbody class='divide-y divide-gray-100'>"#,
        page.index, page.size
    );

    if page.items.is_empty() {
        html.push_str("<tr><td colspan='6' class='px-4 py-12 text-center text-gray-500'>No transactions yet</td></tr>");
    }
    for row in &page.items {
        let tx = &row.transaction;
        html.push_str(&format!(
            r#"<tr id='transaction-{id}'>
            <td class='px-4 py-2'>{id}</td>
            <td class='px-4 py-2'>{kind}</td>
            <td class='px-4 py-2 text-right font-mono'>{amount}</td>
            <td class='px-4 py-2'>{source}</td>
            <td class='px-4 py-2'>{target}</td>
            <td class='px-4 py-2 text-right'>
                <button hx-delete='/transactions/{id}?page={index}&size={size}' hx-target='#transactions-table' hx-swap='outerHTML'
                    hx-confirm='Delete transaction {id}?' class='px-3 py-1 text-red-600 hover:bg-red-50 rounded'>Delete</button>
            </td>
        </tr>"#,
            id = tx.id,
            kind = tx.transaction_type,
            amount = format_amount(tx.amount),
            source = escape_html(row.source_account_holder_name()),
            target = escape_html(row.target_account_holder_name()),
            index = page.index,
            size = page.size,
        ));
    }
    html.push_str("</tbody></table>");

    // Paginator
    let mut sizes = String::new();
    for size in size_options {
        let selected = if *size == page.size { " selected" } else { "" };
        sizes.push_str(&format!("<option value='{}'{}>{}</option>", size, selected, size));
    }
    let nav_button = |enabled: bool, target_page: usize, label: &str| {
        if enabled {
            format!(
                "<button hx-get='/transactions/list?page={}&size={}' hx-target='#transactions-table' hx-swap='outerHTML' class='px-3 py-1 border rounded hover:bg-gray-50'>{}</button>",
                target_page, page.size, label
            )
        } else {
            format!("<button disabled class='px-3 py-1 border rounded text-gray-300'>{}</button>", label)
        }
    };
    html.push_str(&format!(
        r#"<div class='flex items-center justify-end gap-4 mt-4 text-sm text-gray-600'>
    <label class='flex items-center gap-2'>Items per page
        <select name='size' hx-get='/transactions/list' hx-vals='{{"page": 0}}' hx-target='#transactions-table' hx-swap='outerHTML' class='px-2 py-1 border rounded'>{}</select>
    </label>
    <span>{} - {} of {}</span>
    {}
    {}
</div>
</div>"#,
        sizes,
        page.first_row(),
        page.last_row(),
        format_number(page.total),
        nav_button(page.has_previous(), page.index.saturating_sub(1), "Previous"),
        nav_button(page.has_next(), page.index + 1, "Next"),
    ));
    html
}
