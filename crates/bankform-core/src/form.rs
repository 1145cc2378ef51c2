//! Transaction create form
//!
//! The form is a plain value driven by [`TransactionForm::apply`]: the hosting
//! view feeds one [`FormEvent`] per field change and gets back the
//! [`Effect`]s (account lookups) it has to run. Lookup results come back in as
//! events too, so the form never performs I/O itself.
//!
//! Validation rules are not stored on the form. They are selected from the
//! current transaction type by [`rules_for`], so changing the type can never
//! leave rules of the previous type behind.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::TransactionCreate;
use crate::types::{FormField, TransactionType};
use crate::validation::{check_all, same_client, FieldError, Rule, RuleContext};

// ==================== Rules ====================

const NO_RULES: &[Rule] = &[];
const REQUIRED: &[Rule] = &[Rule::Required];
const AMOUNT: &[Rule] = &[Rule::Required, Rule::NumberOrFloat];
const BOUNDED_AMOUNT: &[Rule] = &[Rule::Required, Rule::NumberOrFloat, Rule::WithinBalance];

/// Rule set of the form for one transaction type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormRules {
    pub source_bank_account_id: &'static [Rule],
    pub target_bank_account_id: &'static [Rule],
    pub amount: &'static [Rule],
    pub withdraw_full_value: &'static [Rule],
    /// Source and target must belong to the same client
    pub same_client: bool,
}

impl FormRules {
    pub fn for_field(&self, field: FormField) -> &'static [Rule] {
        match field {
            FormField::TransactionType => REQUIRED,
            FormField::SourceBankAccountId => self.source_bank_account_id,
            FormField::TargetBankAccountId => self.target_bank_account_id,
            FormField::Amount => self.amount,
            FormField::WithdrawFullValue => self.withdraw_full_value,
            FormField::Description => NO_RULES,
        }
    }
}

/// Select the rule set for a transaction type. `None` is the initial,
/// type-less form.
pub fn rules_for(kind: Option<TransactionType>) -> FormRules {
    match kind {
        None => FormRules {
            source_bank_account_id: NO_RULES,
            target_bank_account_id: NO_RULES,
            amount: AMOUNT,
            withdraw_full_value: NO_RULES,
            same_client: false,
        },
        Some(TransactionType::Deposit) => FormRules {
            source_bank_account_id: NO_RULES,
            target_bank_account_id: REQUIRED,
            amount: AMOUNT,
            withdraw_full_value: NO_RULES,
            same_client: false,
        },
        Some(TransactionType::Withdraw) => FormRules {
            source_bank_account_id: REQUIRED,
            target_bank_account_id: NO_RULES,
            amount: BOUNDED_AMOUNT,
            withdraw_full_value: NO_RULES,
            same_client: false,
        },
        Some(TransactionType::Transfer) => FormRules {
            source_bank_account_id: REQUIRED,
            target_bank_account_id: REQUIRED,
            amount: BOUNDED_AMOUNT,
            withdraw_full_value: NO_RULES,
            same_client: true,
        },
    }
}

// ==================== State ====================

/// Values of the form fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormValues {
    pub transaction_type: Option<TransactionType>,
    pub source_bank_account_id: Option<i64>,
    pub target_bank_account_id: Option<i64>,
    pub amount: String,
    #[serde(rename = "withdrawFullValue")]
    pub withdraw_full_value: bool,
    pub description: String,
}

/// Derived state that is not a field value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    /// Balance of the selected source account, 0 until resolved
    pub current_account_value: f64,
    /// Amount input is locked to the balance
    pub amount_readonly: bool,
    /// Last transfer check rejected the account pair
    pub transfer_mismatch: bool,
    /// Fields the user has changed; errors are only shown for these
    pub touched: BTreeSet<FormField>,
}

/// A change coming from the hosting view
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    TypeChanged(Option<TransactionType>),
    SourceChanged(Option<i64>),
    TargetChanged(Option<i64>),
    AmountChanged(String),
    WithdrawFullValueChanged(bool),
    DescriptionChanged(String),
    /// Result of [`Effect::LookupSourceAccount`]; `None` when missing or failed
    SourceAccountResolved {
        requested: i64,
        current_value: Option<f64>,
    },
    /// Result of [`Effect::VerifySourceBalance`]; only the balance moves
    SourceBalanceVerified {
        requested: i64,
        current_value: Option<f64>,
    },
    /// Result of [`Effect::CheckTransferClients`]
    TransferAccountsResolved {
        source: i64,
        target: i64,
        source_client: Option<i64>,
        target_client: Option<i64>,
    },
    Reset,
}

/// Asynchronous work requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    LookupSourceAccount(i64),
    VerifySourceBalance(i64),
    CheckTransferClients { source: i64, target: i64 },
}

/// The transaction create form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    values: FormValues,
    state: FormState,
}

impl TransactionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a form from values and state kept by a stateless view
    pub fn from_parts(values: FormValues, state: FormState) -> Self {
        Self { values, state }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn transaction_type(&self) -> Option<TransactionType> {
        self.values.transaction_type
    }

    pub fn current_account_value(&self) -> f64 {
        self.state.current_account_value
    }

    pub fn is_amount_readonly(&self) -> bool {
        self.state.amount_readonly
    }

    /// Rules in force for the current transaction type
    pub fn rules(&self) -> FormRules {
        rules_for(self.values.transaction_type)
    }

    /// Field value as the rules see it; unset selections are empty
    pub fn value_of(&self, field: FormField) -> String {
        fn id(value: Option<i64>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }
        match field {
            FormField::TransactionType => self
                .values
                .transaction_type
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            FormField::SourceBankAccountId => id(self.values.source_bank_account_id),
            FormField::TargetBankAccountId => id(self.values.target_bank_account_id),
            FormField::Amount => self.values.amount.clone(),
            FormField::WithdrawFullValue => self.values.withdraw_full_value.to_string(),
            FormField::Description => self.values.description.clone(),
        }
    }

    /// Apply one event and return the effects the caller must run
    pub fn apply(&mut self, event: FormEvent) -> Vec<Effect> {
        match event {
            FormEvent::TypeChanged(kind) => {
                self.change_type(kind);
                self.touch(FormField::TransactionType);
                vec![]
            }
            FormEvent::SourceChanged(id) => {
                self.values.source_bank_account_id = id;
                self.touch(FormField::SourceBankAccountId);
                let mut effects = Vec::new();
                if let Some(id) = id {
                    effects.push(Effect::LookupSourceAccount(id));
                }
                effects.extend(self.transfer_check());
                effects
            }
            FormEvent::TargetChanged(id) => {
                self.values.target_bank_account_id = id;
                self.touch(FormField::TargetBankAccountId);
                self.transfer_check().into_iter().collect()
            }
            FormEvent::AmountChanged(amount) => {
                // A locked amount only follows the balance
                if !self.state.amount_readonly {
                    self.values.amount = amount;
                }
                self.touch(FormField::Amount);
                vec![]
            }
            FormEvent::WithdrawFullValueChanged(checked) => {
                self.values.withdraw_full_value = checked;
                self.state.amount_readonly = checked;
                if checked {
                    self.values.amount = format_value(self.state.current_account_value);
                }
                self.touch(FormField::WithdrawFullValue);
                vec![]
            }
            FormEvent::DescriptionChanged(description) => {
                self.values.description = description;
                self.touch(FormField::Description);
                vec![]
            }
            FormEvent::SourceAccountResolved { requested, current_value } => {
                if self.values.source_bank_account_id == Some(requested) {
                    self.state.current_account_value = current_value.unwrap_or(0.0);
                    self.values.amount = format_value(self.state.current_account_value);
                } else {
                    log::debug!("Dropping stale balance lookup for account {}", requested);
                }
                vec![]
            }
            FormEvent::SourceBalanceVerified { requested, current_value } => {
                if self.values.source_bank_account_id == Some(requested) {
                    self.state.current_account_value = current_value.unwrap_or(0.0);
                }
                vec![]
            }
            FormEvent::TransferAccountsResolved { source, target, source_client, target_client } => {
                let current = (
                    self.values.source_bank_account_id,
                    self.values.target_bank_account_id,
                );
                if self.rules().same_client && current == (Some(source), Some(target)) {
                    self.state.transfer_mismatch = same_client(source_client, target_client).is_err();
                } else {
                    log::debug!("Dropping stale transfer check for {} -> {}", source, target);
                }
                vec![]
            }
            FormEvent::Reset => {
                *self = Self::default();
                vec![]
            }
        }
    }

    fn change_type(&mut self, kind: Option<TransactionType>) {
        self.values = FormValues {
            transaction_type: kind,
            description: std::mem::take(&mut self.values.description),
            ..FormValues::default()
        };
        let touched = std::mem::take(&mut self.state.touched);
        self.state = FormState {
            touched,
            ..FormState::default()
        };
        // Cleared fields start out untouched again
        self.state.touched.retain(|f| *f == FormField::Description);
    }

    /// Transfer pair check for the current selection. Missing ids are
    /// rejected right away; a complete pair needs both accounts looked up.
    fn transfer_check(&mut self) -> Option<Effect> {
        if !self.rules().same_client {
            return None;
        }
        match (self.values.source_bank_account_id, self.values.target_bank_account_id) {
            (Some(source), Some(target)) => Some(Effect::CheckTransferClients { source, target }),
            _ => {
                self.state.transfer_mismatch = true;
                None
            }
        }
    }

    /// Lookups that re-establish the derived state before a submit.
    ///
    /// Balance and transfer check may come from a client round trip, so both
    /// are resolved again from the backend; the amount itself is left alone.
    pub fn submit_checks(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.rules().amount.contains(&Rule::WithinBalance) {
            match self.values.source_bank_account_id {
                Some(id) => effects.push(Effect::VerifySourceBalance(id)),
                None => self.state.current_account_value = 0.0,
            }
        }
        effects.extend(self.transfer_check());
        effects
    }

    fn touch(&mut self, field: FormField) {
        self.state.touched.insert(field);
    }

    /// Mark every field as touched so all errors become visible
    pub fn touch_all(&mut self) {
        self.state.touched.extend(FormField::ALL);
    }

    /// All validation errors of a field
    pub fn errors(&self, field: FormField) -> Vec<FieldError> {
        let ctx = RuleContext {
            current_account_value: self.state.current_account_value,
            withdraw_full_value: self.values.withdraw_full_value,
        };
        let mut errors = check_all(self.rules().for_field(field), &self.value_of(field), &ctx);

        let account_field = matches!(
            field,
            FormField::SourceBankAccountId | FormField::TargetBankAccountId
        );
        if account_field && self.rules().same_client && self.state.transfer_mismatch {
            errors.push(FieldError::TransferValidation);
        }
        errors
    }

    /// Errors to display: only for touched fields
    pub fn visible_errors(&self, field: FormField) -> Vec<FieldError> {
        if self.state.touched.contains(&field) {
            self.errors(field)
        } else {
            vec![]
        }
    }

    pub fn has_error(&self, field: FormField, key: &str) -> bool {
        self.errors(field).iter().any(|e| e.key() == key)
    }

    pub fn is_valid(&self) -> bool {
        FormField::ALL.iter().all(|field| self.errors(*field).is_empty())
    }

    /// Request body for the current values
    pub fn payload(&self) -> CoreResult<TransactionCreate> {
        if !self.is_valid() {
            return Err(CoreError::Validation {
                message: "form has invalid fields".to_string(),
            });
        }
        let transaction_type = self.values.transaction_type.ok_or_else(|| CoreError::Validation {
            message: "transaction type is required".to_string(),
        })?;
        let amount: f64 = self.values.amount.parse().map_err(|_| CoreError::Validation {
            message: format!("amount '{}' is not a number", self.values.amount),
        })?;

        Ok(TransactionCreate {
            transaction_type,
            source_bank_account_id: self.values.source_bank_account_id,
            target_bank_account_id: self.values.target_bank_account_id,
            amount,
            withdraw_full_value: self.values.withdraw_full_value,
            description: self.values.description.clone(),
        })
    }
}

/// Balance as written into the amount field
pub fn format_value(value: f64) -> String {
    value.to_string()
}
