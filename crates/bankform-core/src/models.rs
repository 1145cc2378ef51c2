//! Data models exchanged with the REST backend

use serde::{Deserialize, Serialize};

use super::types::TransactionType;

/// Bank account as served by `/api/bank_accounts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: i64,
    pub bank_name: String,
    pub account_holder_name: String,
    pub sort_code: String,
    pub account_number: String,
    /// Owning client; transfers stay within one client
    pub client_id: i64,
    /// Current balance
    pub current_value: f64,
}

/// Account projection used for the source/target select lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedBankAccount {
    pub id: i64,
    pub bank_name: String,
    pub account_holder_name: String,
    pub sort_code: String,
    pub account_number: String,
}

impl NestedBankAccount {
    /// Option label, e.g. "Bank A - Miss Jane A Smith (111111 11111111)"
    pub fn label(&self) -> String {
        format!(
            "{} - {} ({} {})",
            self.bank_name, self.account_holder_name, self.sort_code, self.account_number
        )
    }
}

impl From<&BankAccount> for NestedBankAccount {
    fn from(account: &BankAccount) -> Self {
        Self {
            id: account.id,
            bank_name: account.bank_name.clone(),
            account_holder_name: account.account_holder_name.clone(),
            sort_code: account.sort_code.clone(),
            account_number: account.account_number.clone(),
        }
    }
}

/// Transaction as served by `/api/transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub transaction_type: TransactionType,
    pub source_bank_account_id: Option<i64>,
    pub target_bank_account_id: Option<i64>,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
}

/// Transaction joined with its source and target accounts for display.
/// Built client side, never sent back to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub source: Option<BankAccount>,
    pub target: Option<BankAccount>,
}

impl ExtendedTransaction {
    /// Wrap a transaction with unresolved accounts
    pub fn unresolved(transaction: Transaction) -> Self {
        Self {
            transaction,
            source: None,
            target: None,
        }
    }

    pub fn source_account_holder_name(&self) -> &str {
        self.source
            .as_ref()
            .map(|a| a.account_holder_name.as_str())
            .unwrap_or("")
    }

    pub fn target_account_holder_name(&self) -> &str {
        self.target
            .as_ref()
            .map(|a| a.account_holder_name.as_str())
            .unwrap_or("")
    }
}

/// Body of `POST /api/transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCreate {
    pub transaction_type: TransactionType,
    pub source_bank_account_id: Option<i64>,
    pub target_bank_account_id: Option<i64>,
    pub amount: f64,
    /// Form-only flag, ignored by the backend
    #[serde(rename = "withdrawFullValue")]
    pub withdraw_full_value: bool,
    pub description: String,
}
