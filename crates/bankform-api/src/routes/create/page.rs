//! Transaction create form rendering

use bankform_core::{AccountOptions, FormField, NestedBankAccount, TransactionForm, TransactionType};
use bankform_utils::{escape_html, format_amount};

const INPUT_CLASS: &str = "w-full px-3 py-2.5 border rounded-lg focus:ring-2 focus:ring-indigo-500";

/// Attributes that post a field change back to the server
const CHANGE_ATTRS: &str =
    "hx-post='/transactions/create/form' hx-trigger='change' hx-target='#create-panel' hx-swap='innerHTML'";

/// Render the create form.
///
/// Account selects, the full-value checkbox and the balance hint only
/// appear for the transaction types that use them.
pub fn render_transaction_form(form: &TransactionForm, options: &AccountOptions) -> String {
    let values = form.values();
    let state = form.state();
    let kind = form.transaction_type();

    let touched: Vec<&str> = state.touched.iter().map(|f| f.name()).collect();
    let mut html = format!(
        r#"<form id='transaction-form' hx-post='/transactions' hx-target='#create-panel' hx-swap='innerHTML' class='space-y-4'>
    <input type='hidden' name='current_account_value' value='{}'>
    <input type='hidden' name='amount_readonly' value='{}'>
    <input type='hidden' name='transfer_mismatch' value='{}'>
    <input type='hidden' name='touched' value='{}'>"#,
        state.current_account_value,
        state.amount_readonly,
        state.transfer_mismatch,
        touched.join(",")
    );

    // Transaction type
    let mut type_options = String::from("<option value=''>Select a type</option>");
    for t in TransactionType::ALL {
        let selected = if kind == Some(t) { " selected" } else { "" };
        type_options.push_str(&format!("<option value='{}'{}>{}</option>", t.as_str(), selected, type_label(t)));
    }
    html.push_str(&field_wrapper(
        form,
        FormField::TransactionType,
        "Transaction type",
        &format!(
            "<select name='transaction_type' {} class='{}'>{}</select>",
            CHANGE_ATTRS, INPUT_CLASS, type_options
        ),
    ));

    let debits_source = kind.map(|t| t.debits_source()).unwrap_or(false);
    let credits_target = matches!(kind, Some(TransactionType::Deposit) | Some(TransactionType::Transfer));

    if debits_source {
        html.push_str(&field_wrapper(
            form,
            FormField::SourceBankAccountId,
            "Source account",
            &account_select(FormField::SourceBankAccountId, &options.source_accounts, values.source_bank_account_id),
        ));
    }
    if credits_target {
        html.push_str(&field_wrapper(
            form,
            FormField::TargetBankAccountId,
            "Target account",
            &account_select(FormField::TargetBankAccountId, &options.target_accounts, values.target_bank_account_id),
        ));
    }

    // Amount
    let readonly = if state.amount_readonly { " readonly" } else { "" };
    let mut amount = format!(
        "<input type='text' name='amount' value='{}' {} class='{}' placeholder='0.00'{}>",
        escape_html(&values.amount),
        CHANGE_ATTRS,
        INPUT_CLASS,
        readonly
    );
    if debits_source {
        amount.push_str(&format!(
            "<p class='text-xs text-gray-500 mt-1'>Current balance: {}</p>",
            format_amount(state.current_account_value)
        ));
    }
    html.push_str(&field_wrapper(form, FormField::Amount, "Amount", &amount));

    if debits_source {
        let checked = if values.withdraw_full_value { " checked" } else { "" };
        html.push_str(&format!(
            r#"<label class='flex items-center gap-2 text-sm text-gray-700'><input type='checkbox' name='withdrawFullValue' {}{}> Withdraw full value</label>"#,
            CHANGE_ATTRS, checked
        ));
    }

    html.push_str(&field_wrapper(
        form,
        FormField::Description,
        "Description",
        &format!(
            "<input type='text' name='description' value='{}' {} class='{}'>",
            escape_html(&values.description),
            CHANGE_ATTRS,
            INPUT_CLASS
        ),
    ));

    html.push_str(
        r#"
    <div class='flex items-center gap-4 pt-4 border-t'>
        <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Create</button>
        <button type='button' hx-get='/transactions/create/form' hx-target='#create-panel' hx-swap='innerHTML' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Reset</button>
    </div>
</form>"#,
    );
    html
}

fn type_label(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Deposit => "Deposit",
        TransactionType::Withdraw => "Withdraw",
        TransactionType::Transfer => "Transfer",
    }
}

/// Label, control and the visible errors of one field
fn field_wrapper(form: &TransactionForm, field: FormField, label: &str, control: &str) -> String {
    let errors: String = form
        .visible_errors(field)
        .iter()
        .map(|e| format!("<p class='text-sm text-red-600 mt-1' data-error='{}'>{}</p>", e.key(), escape_html(e.message())))
        .collect();
    format!(
        "\n    <div><label class='block text-sm font-medium text-gray-700 mb-1'>{}</label>{}{}</div>",
        label, control, errors
    )
}

fn account_select(field: FormField, accounts: &[NestedBankAccount], selected: Option<i64>) -> String {
    let mut options = String::from("<option value=''>Select an account</option>");
    for account in accounts {
        let is_selected = if selected == Some(account.id) { " selected" } else { "" };
        options.push_str(&format!(
            "<option value='{}'{}>{}</option>",
            account.id,
            is_selected,
            escape_html(&account.label())
        ));
    }
    format!(
        "<select name='{}' {} class='{}'>{}</select>",
        field.name(),
        CHANGE_ATTRS,
        INPUT_CLASS,
        options
    )
}
