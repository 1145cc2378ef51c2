//! Bankform core: transaction form rules, backend service traits and the
//! views built on them.

pub mod controller;
pub mod error;
pub mod events;
pub mod form;
pub mod models;
pub mod notification;
pub mod services;
pub mod types;
pub mod validation;
pub mod view;

pub use controller::{AccountOptions, TransactionCreateController};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use events::{TransactionCreated, TransactionEvents, TransactionSubscription};
pub use form::{rules_for, Effect, FormEvent, FormRules, FormState, FormValues, TransactionForm};
pub use models::{BankAccount, ExtendedTransaction, NestedBankAccount, Transaction, TransactionCreate};
pub use notification::{Notification, NotificationKind};
pub use services::{BankAccountService, BankAccountServiceRef, TransactionService, TransactionServiceRef};
pub use types::{FormField, TransactionType};
pub use validation::{FieldError, Rule};
pub use view::{ListenerGuard, Page, TransactionListView};
