//! Transaction create endpoints - HTMX partial responses
//!
//! Endpoints:
//! - htmx_transaction_create_form: Fresh form (HTML fragment)
//! - htmx_transaction_form_change: Re-render after one field changed (HTML fragment)
//! - htmx_transaction_store: Submit the form (HTML fragment + toast)

use std::collections::{BTreeSet, HashMap};

use axum::http::HeaderMap;
use axum::response::Html;

use bankform_core::{FormEvent, FormField, FormState, FormValues, Notification, TransactionForm};

use super::page::render_transaction_form;
use crate::{toast_html, ApiError, ApiResult, AppState};

/// HTMX: Empty create form.
///
/// Without the account list the form cannot be filled in, so a backend
/// failure here is reported instead of rendering empty selects.
pub async fn htmx_transaction_create_form(
    state: axum::extract::State<AppState>,
) -> ApiResult<Html<String>> {
    let options = state.controller.load_accounts().await?;
    Ok(Html(render_transaction_form(&TransactionForm::new(), &options)))
}

/// HTMX: One field changed.
///
/// The changed field is named by the `HX-Trigger-Name` header; its new
/// value is already in the body with the rest of the form.
pub async fn htmx_transaction_form_change(
    state: axum::extract::State<AppState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<Html<String>> {
    let trigger = headers
        .get("hx-trigger-name")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest {
            message: "missing HX-Trigger-Name header".to_string(),
        })?;
    let field: FormField = trigger
        .parse()
        .map_err(|message| ApiError::BadRequest { message })?;

    let mut form = form_from_params(&parse_form_body(&body));
    let event = change_event(field, &form);
    log::debug!("Transaction form change: {:?}", event);
    state.controller.handle(&mut form, event).await;

    Ok(Html(render_panel(&state, &form, None).await))
}

/// HTMX: Submit the form
pub async fn htmx_transaction_store(
    state: axum::extract::State<AppState>,
    body: String,
) -> Html<String> {
    let mut form = form_from_params(&parse_form_body(&body));
    let notification = state.controller.submit(&mut form).await;
    Html(render_panel(&state, &form, notification.as_ref()).await)
}

/// Form with fresh account options, plus an optional toast
async fn render_panel(
    state: &AppState,
    form: &TransactionForm,
    notification: Option<&Notification>,
) -> String {
    let options = match state.controller.load_accounts().await {
        Ok(options) => options,
        Err(e) => {
            log::warn!("Failed to load bank accounts for the create form: {}", e);
            Default::default()
        }
    };

    let mut html = render_transaction_form(form, &options);
    if let Some(notification) = notification {
        html.push_str(&toast_html(notification));
    }
    html
}

/// Event for a changed field, carrying the value now in the form
fn change_event(field: FormField, form: &TransactionForm) -> FormEvent {
    let values = form.values();
    match field {
        FormField::TransactionType => FormEvent::TypeChanged(values.transaction_type),
        FormField::SourceBankAccountId => FormEvent::SourceChanged(values.source_bank_account_id),
        FormField::TargetBankAccountId => FormEvent::TargetChanged(values.target_bank_account_id),
        FormField::Amount => FormEvent::AmountChanged(values.amount.clone()),
        FormField::WithdrawFullValue => FormEvent::WithdrawFullValueChanged(values.withdraw_full_value),
        FormField::Description => FormEvent::DescriptionChanged(values.description.clone()),
    }
}

// ==================== Form Body ====================

/// Decode an `application/x-www-form-urlencoded` body
pub(crate) fn parse_form_body(body: &str) -> HashMap<String, String> {
    fn decode(raw: &str) -> String {
        let raw = raw.replace('+', " ");
        match urlencoding::decode(&raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.clone(),
        }
    }

    let mut params = HashMap::new();
    for pair in body.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(decode(key), decode(value));
    }
    params
}

/// Rebuild the form from submitted fields and the hidden state fields
pub(crate) fn form_from_params(params: &HashMap<String, String>) -> TransactionForm {
    let text = |field: FormField| params.get(field.name()).cloned().unwrap_or_default();
    let id = |field: FormField| params.get(field.name()).and_then(|v| v.parse::<i64>().ok());
    let flag = |key: &str| params.get(key).map(|v| v == "true").unwrap_or(false);

    let values = FormValues {
        transaction_type: params
            .get(FormField::TransactionType.name())
            .and_then(|v| v.parse().ok()),
        source_bank_account_id: id(FormField::SourceBankAccountId),
        target_bank_account_id: id(FormField::TargetBankAccountId),
        amount: text(FormField::Amount),
        // Unchecked boxes are not submitted
        withdraw_full_value: params.contains_key(FormField::WithdrawFullValue.name()),
        description: text(FormField::Description),
    };

    let touched: BTreeSet<FormField> = params
        .get("touched")
        .map(|v| v.split(',').filter_map(|name| name.parse().ok()).collect())
        .unwrap_or_default();

    let state = FormState {
        current_account_value: params
            .get("current_account_value")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0),
        amount_readonly: flag("amount_readonly"),
        transfer_mismatch: flag("transfer_mismatch"),
        touched,
    };

    TransactionForm::from_parts(values, state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use bankform_core::services::memory::InMemoryBank;
    use bankform_core::validation::TRANSFER_VALIDATION_MESSAGE;
    use bankform_core::TransactionType;

    use super::*;
    use crate::test_support::{get, post_form, send, state};

    #[test]
    fn test_parse_form_body() {
        let params = parse_form_body("description=rent+for+May&amount=10.5&withdrawFullValue=on&note=a%26b");
        assert_eq!(params["description"], "rent for May");
        assert_eq!(params["amount"], "10.5");
        assert_eq!(params["withdrawFullValue"], "on");
        assert_eq!(params["note"], "a&b");
    }

    #[test]
    fn test_form_from_params_restores_state() {
        let params = parse_form_body(
            "transaction_type=WITHDRAW&source_bank_account_id=2&amount=46.2&withdrawFullValue=on\
             &current_account_value=46.2&amount_readonly=true&transfer_mismatch=false&touched=amount,source_bank_account_id",
        );
        let form = form_from_params(&params);

        assert_eq!(form.transaction_type(), Some(TransactionType::Withdraw));
        assert_eq!(form.values().source_bank_account_id, Some(2));
        assert!(form.values().withdraw_full_value);
        assert_eq!(form.current_account_value(), 46.2);
        assert!(form.is_amount_readonly());
        assert!(form.state().touched.contains(&FormField::Amount));
        assert!(form.is_valid());
    }

    #[test]
    fn test_empty_selects_are_unset() {
        let form = form_from_params(&parse_form_body("transaction_type=&source_bank_account_id=&amount="));
        assert_eq!(form.transaction_type(), None);
        assert_eq!(form.values().source_bank_account_id, None);
        assert!(form.state().touched.is_empty());
    }

    #[tokio::test]
    async fn test_fresh_form_has_type_select_only() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let (status, body) = send(&state(&bank), get("/transactions/create/form")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("name='transaction_type'"));
        assert!(!body.contains("name='source_bank_account_id'"));
        assert!(!body.contains("name='target_bank_account_id'"));
    }

    #[tokio::test]
    async fn test_fresh_form_reports_unreachable_backend() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        bank.fail_lookups(true);
        let (status, body) = send(&state(&bank), get("/transactions/create/form")).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("Backend unreachable: connection refused"));
        assert!(!body.contains("name='transaction_type'"));
    }

    #[tokio::test]
    async fn test_type_change_shows_fields_for_type() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let request = post_form(
            "/transactions/create/form",
            Some("transaction_type"),
            "transaction_type=WITHDRAW&amount=12&description=cash",
        );
        let (status, body) = send(&state(&bank), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("name='source_bank_account_id'"));
        assert!(!body.contains("name='target_bank_account_id'"));
        assert!(body.contains("name='withdrawFullValue'"));
        // Values cleared except the description
        assert!(body.contains("name='amount' value=''"));
        assert!(body.contains("value='cash'"));
    }

    #[tokio::test]
    async fn test_source_change_fills_amount_with_balance() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let request = post_form(
            "/transactions/create/form",
            Some("source_bank_account_id"),
            "transaction_type=WITHDRAW&source_bank_account_id=2&amount=&current_account_value=0",
        );
        let (_, body) = send(&state(&bank), request).await;

        assert!(body.contains("name='current_account_value' value='46.2'"));
        assert!(body.contains("name='amount' value='46.2'"));
    }

    #[tokio::test]
    async fn test_transfer_between_clients_is_flagged() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let request = post_form(
            "/transactions/create/form",
            Some("target_bank_account_id"),
            "transaction_type=TRANSFER&source_bank_account_id=1&target_bank_account_id=3\
             &current_account_value=128746.281&touched=source_bank_account_id",
        );
        let (_, body) = send(&state(&bank), request).await;

        assert!(body.contains(TRANSFER_VALIDATION_MESSAGE));
        assert!(body.contains("name='transfer_mismatch' value='true'"));
    }

    #[tokio::test]
    async fn test_unknown_trigger_is_rejected() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let request = post_form("/transactions/create/form", Some("payee"), "payee=x");
        let (status, _) = send(&state(&bank), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = post_form("/transactions/create/form", None, "amount=1");
        let (status, _) = send(&state(&bank), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_store_valid_deposit() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let request = post_form(
            "/transactions",
            None,
            "transaction_type=DEPOSIT&target_bank_account_id=1&amount=500&description=salary",
        );
        let (status, body) = send(&state(&bank), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Deposit has been created."));
        assert_eq!(bank.transaction_count(), 1);
        // Form is reset
        assert!(!body.contains("value='salary'"));
    }

    #[tokio::test]
    async fn test_store_invalid_form_shows_errors() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let request = post_form("/transactions", None, "transaction_type=DEPOSIT&amount=abc");
        let (_, body) = send(&state(&bank), request).await;

        assert!(body.contains("This field is required."));
        assert!(body.contains("Please enter a valid number."));
        assert!(!body.contains("hx-swap-oob"));
        assert_eq!(bank.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_store_rejects_transfer_between_clients() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let request = post_form(
            "/transactions",
            None,
            "transaction_type=TRANSFER&source_bank_account_id=1&target_bank_account_id=3&amount=5\
             &current_account_value=128746.281&transfer_mismatch=false",
        );
        let (_, body) = send(&state(&bank), request).await;

        assert!(body.contains(TRANSFER_VALIDATION_MESSAGE));
        assert!(!body.contains("hx-swap-oob"));
        assert_eq!(bank.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_store_rejects_withdraw_above_real_balance() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let request = post_form(
            "/transactions",
            None,
            "transaction_type=WITHDRAW&source_bank_account_id=2&amount=1000&current_account_value=1000000",
        );
        let (_, body) = send(&state(&bank), request).await;

        assert!(body.contains("Amount exceeds the current value."));
        assert!(body.contains("name='current_account_value' value='46.2'"));
        assert!(!body.contains("hx-swap-oob"));
        assert_eq!(bank.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_store_lone_decimal_point_shows_error() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let request = post_form(
            "/transactions",
            None,
            "transaction_type=DEPOSIT&target_bank_account_id=1&amount=.",
        );
        let (_, body) = send(&state(&bank), request).await;

        assert!(body.contains("Please enter a valid number."));
        assert_eq!(bank.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_values() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        bank.fail_writes(true);
        let request = post_form(
            "/transactions",
            None,
            "transaction_type=DEPOSIT&target_bank_account_id=1&amount=500&description=salary",
        );
        let (_, body) = send(&state(&bank), request).await;

        assert!(body.contains("Error Creating Transaction"));
        assert!(body.contains("value='salary'"));
    }
}
