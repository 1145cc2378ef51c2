//! Create-form controller
//!
//! Hosts a [`TransactionForm`]: runs the effects its transitions request
//! against the services and feeds the results back in, and submits the form.

use bankform_config::NotificationConfig;

use crate::error::CoreResult;
use crate::events::TransactionEvents;
use crate::form::{Effect, FormEvent, TransactionForm};
use crate::models::{BankAccount, NestedBankAccount};
use crate::notification::{created_message, Notification, CREATE_FAILED_MESSAGE};
use crate::services::{BankAccountServiceRef, TransactionServiceRef};

/// Options for the source and target selects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountOptions {
    pub source_accounts: Vec<NestedBankAccount>,
    pub target_accounts: Vec<NestedBankAccount>,
}

pub struct TransactionCreateController {
    accounts: BankAccountServiceRef,
    transactions: TransactionServiceRef,
    events: TransactionEvents,
    notification_duration_ms: u64,
}

impl TransactionCreateController {
    pub fn new(
        accounts: BankAccountServiceRef,
        transactions: TransactionServiceRef,
        events: TransactionEvents,
        notifications: &NotificationConfig,
    ) -> Self {
        Self {
            accounts,
            transactions,
            events,
            notification_duration_ms: notifications.duration_ms,
        }
    }

    pub fn events(&self) -> &TransactionEvents {
        &self.events
    }

    /// Both selects list every account
    pub async fn load_accounts(&self) -> CoreResult<AccountOptions> {
        let accounts = self.accounts.nested_bank_accounts().await?;
        Ok(AccountOptions {
            source_accounts: accounts.clone(),
            target_accounts: accounts,
        })
    }

    /// Apply a change to the form and settle the lookups it triggers
    pub async fn handle(&self, form: &mut TransactionForm, event: FormEvent) {
        let effects = form.apply(event);
        self.settle(form, effects).await;
    }

    /// Run effects concurrently, then feed the results back in order
    async fn settle(&self, form: &mut TransactionForm, effects: Vec<Effect>) {
        let resolved = futures::future::join_all(effects.into_iter().map(|effect| self.run(effect))).await;
        for event in resolved {
            let follow_up = form.apply(event);
            debug_assert!(follow_up.is_empty());
        }
    }

    async fn run(&self, effect: Effect) -> FormEvent {
        match effect {
            Effect::LookupSourceAccount(id) => {
                let current_value = self.lookup(id).await.map(|a| a.current_value);
                FormEvent::SourceAccountResolved { requested: id, current_value }
            }
            Effect::VerifySourceBalance(id) => {
                let current_value = self.lookup(id).await.map(|a| a.current_value);
                FormEvent::SourceBalanceVerified { requested: id, current_value }
            }
            Effect::CheckTransferClients { source, target } => {
                let (source_account, target_account) =
                    futures::join!(self.lookup(source), self.lookup(target));
                FormEvent::TransferAccountsResolved {
                    source,
                    target,
                    source_client: source_account.map(|a| a.client_id),
                    target_client: target_account.map(|a| a.client_id),
                }
            }
        }
    }

    /// Account lookup where failures count as "no account"
    async fn lookup(&self, id: i64) -> Option<BankAccount> {
        match self.accounts.bank_account(id).await {
            Ok(account) => {
                if account.is_none() {
                    log::debug!("Bank account {} not found", id);
                }
                account
            }
            Err(e) => {
                log::warn!("Failed to look up bank account {}: {}", id, e);
                None
            }
        }
    }

    /// Submit the form.
    ///
    /// The source balance and the transfer client check are looked up
    /// again first. Returns `None` without creating anything when the form is
    /// invalid; all fields are then marked touched so their errors show.
    pub async fn submit(&self, form: &mut TransactionForm) -> Option<Notification> {
        let checks = form.submit_checks();
        self.settle(form, checks).await;

        let payload = match form.payload() {
            Ok(payload) => payload,
            Err(e) => {
                log::debug!("Not submitting transaction form: {}", e);
                form.touch_all();
                return None;
            }
        };

        match self.transactions.create_transaction(&payload).await {
            Ok(created) => {
                log::info!(
                    "Created {} transaction {} for amount {}",
                    created.transaction_type,
                    created.id,
                    created.amount
                );
                let message = created_message(form.transaction_type());
                form.apply(FormEvent::Reset);
                self.events.notify_transaction_created(created.id);
                Some(Notification::success(message, self.notification_duration_ms))
            }
            Err(e) => {
                log::log!(e.log_level(), "Failed to create transaction: {}", e.to_details());
                Some(Notification::error(CREATE_FAILED_MESSAGE, self.notification_duration_ms))
            }
        }
    }
}
