//! Transient user notifications (toasts)

use serde::{Deserialize, Serialize};

use crate::types::TransactionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A message shown for a short time, then dismissed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    /// How long the toast stays visible
    pub duration_ms: u64,
}

impl Notification {
    pub fn success(message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            duration_ms,
        }
    }

    pub fn error(message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
            duration_ms,
        }
    }

    /// Action label shown next to the message
    pub fn action(&self) -> &'static str {
        match self.kind {
            NotificationKind::Success => "Success",
            NotificationKind::Error => "Error",
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

/// Text shown after a transaction was created
pub fn created_message(transaction_type: Option<TransactionType>) -> &'static str {
    match transaction_type {
        Some(TransactionType::Deposit) => "Deposit has been created.",
        Some(TransactionType::Withdraw) => "Withdraw has been created.",
        _ => "Transaction has been created.",
    }
}

pub const CREATE_FAILED_MESSAGE: &str = "Error Creating Transaction";
pub const DELETE_FAILED_MESSAGE: &str = "Error Deleting Transaction";
pub const DELETED_MESSAGE: &str = "Transaction has been deleted.";
