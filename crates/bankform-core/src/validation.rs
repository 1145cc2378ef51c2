//! Field-level validation rules for the transaction form

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Shared message attached to both account fields of a rejected transfer
pub const TRANSFER_VALIDATION_MESSAGE: &str =
    "Source and Target accounts must be selected and have the same client ID for a transfer.";

/// Why an amount was rejected against the source balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountIssue {
    NotPositive,
    DoesNotMatchBalance,
    ExceedsBalance,
}

impl AmountIssue {
    pub fn message(&self) -> &'static str {
        match self {
            AmountIssue::NotPositive => "Amount must be greater than 0.",
            AmountIssue::DoesNotMatchBalance => "Amount does not match the current value.",
            AmountIssue::ExceedsBalance => "Amount exceeds the current value.",
        }
    }
}

/// A validation error on a single form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldError {
    Required,
    InvalidNumber,
    InvalidAmount(AmountIssue),
    /// Transfer accounts missing or owned by different clients
    TransferValidation,
}

impl FieldError {
    /// Stable key, usable as a CSS hook or in JSON
    pub fn key(&self) -> &'static str {
        match self {
            FieldError::Required => "required",
            FieldError::InvalidNumber => "invalidNumber",
            FieldError::InvalidAmount(_) => "invalidAmount",
            FieldError::TransferValidation => "transferValidation",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FieldError::Required => "This field is required.",
            FieldError::InvalidNumber => "Please enter a valid number.",
            FieldError::InvalidAmount(issue) => issue.message(),
            FieldError::TransferValidation => TRANSFER_VALIDATION_MESSAGE,
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Value must be present
pub fn required(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        Err(FieldError::Required)
    } else {
        Ok(())
    }
}

/// Plain non-negative decimal: digits, at most one '.', no sign or exponent.
/// At least one digit is needed, so a lone "." fails. Empty values pass;
/// pair with [`required`] to reject them.
pub fn number_or_float(value: &str) -> Result<(), FieldError> {
    static NUMBER_OR_FLOAT: OnceCell<Regex> = OnceCell::new();
    let pattern = NUMBER_OR_FLOAT.get_or_init(|| Regex::new(r"^([0-9]+\.?[0-9]*|\.[0-9]+)$").unwrap());

    if value.is_empty() || pattern.is_match(value) {
        Ok(())
    } else {
        Err(FieldError::InvalidNumber)
    }
}

/// Amount against the selected source account's balance.
///
/// Unparseable amounts count as 0 and are reported as not positive.
pub fn within_balance(
    amount: &str,
    current_value: f64,
    withdraw_full_value: bool,
) -> Result<(), FieldError> {
    let amount: f64 = amount.trim().parse().unwrap_or(0.0);

    // NaN fails this comparison too
    if !(amount > 0.0) {
        return Err(FieldError::InvalidAmount(AmountIssue::NotPositive));
    }

    if withdraw_full_value {
        if amount == current_value {
            Ok(())
        } else {
            Err(FieldError::InvalidAmount(AmountIssue::DoesNotMatchBalance))
        }
    } else if amount <= current_value {
        Ok(())
    } else {
        Err(FieldError::InvalidAmount(AmountIssue::ExceedsBalance))
    }
}

/// Both transfer accounts resolved and owned by the same client
pub fn same_client(source_client: Option<i64>, target_client: Option<i64>) -> Result<(), FieldError> {
    match (source_client, target_client) {
        (Some(source), Some(target)) if source == target => Ok(()),
        _ => Err(FieldError::TransferValidation),
    }
}

/// Values a rule may need beyond the field's own value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RuleContext {
    /// Balance of the selected source account
    pub current_account_value: f64,
    pub withdraw_full_value: bool,
}

/// A validation rule attachable to a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Required,
    NumberOrFloat,
    WithinBalance,
}

impl Rule {
    pub fn check(&self, value: &str, ctx: &RuleContext) -> Result<(), FieldError> {
        match self {
            Rule::Required => required(value),
            Rule::NumberOrFloat => number_or_float(value),
            Rule::WithinBalance => {
                within_balance(value, ctx.current_account_value, ctx.withdraw_full_value)
            }
        }
    }
}

/// Run every rule and collect the failures, in rule order
pub fn check_all(rules: &[Rule], value: &str, ctx: &RuleContext) -> Vec<FieldError> {
    rules
        .iter()
        .filter_map(|rule| rule.check(value, ctx).err())
        .collect()
}
