//! Transaction list joined with account data

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::error::CoreResult;
use crate::events::{TransactionEvents, TransactionSubscription};
use crate::models::{BankAccount, ExtendedTransaction};
use crate::notification::{Notification, DELETED_MESSAGE, DELETE_FAILED_MESSAGE};
use crate::services::{BankAccountServiceRef, TransactionServiceRef};

/// One page of rows, paginator style: zero-based index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub index: usize,
    pub size: usize,
    /// Row count over all pages
    pub total: usize,
}

impl<T> Page<T> {
    pub fn page_count(&self) -> usize {
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.size.max(1))
        }
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.page_count()
    }

    /// 1-based position of the first row on this page, 0 when empty
    pub fn first_row(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.index * self.size + 1
        }
    }

    pub fn last_row(&self) -> usize {
        self.index * self.size + self.items.len()
    }
}

/// Cached, account-joined transaction rows.
///
/// Rows are replaced wholesale on every [`reload`](Self::reload). Each
/// finished reload bumps a generation counter, observable through
/// [`refreshes`](Self::refreshes).
pub struct TransactionListView {
    accounts: BankAccountServiceRef,
    transactions: TransactionServiceRef,
    rows: RwLock<Vec<ExtendedTransaction>>,
    reloading: Mutex<()>,
    generation: watch::Sender<u64>,
    notification_duration_ms: u64,
}

impl TransactionListView {
    pub fn new(
        accounts: BankAccountServiceRef,
        transactions: TransactionServiceRef,
        notification_duration_ms: u64,
    ) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            accounts,
            transactions,
            rows: RwLock::new(Vec::new()),
            reloading: Mutex::new(()),
            generation,
            notification_duration_ms,
        }
    }

    /// Fetch all transactions and join each with its source and target account
    pub async fn reload(&self) -> CoreResult<usize> {
        // One reload at a time so an older result never overwrites a newer one
        let _reloading = self.reloading.lock().await;

        let transactions = self.transactions.enhanced_transactions().await?;
        let rows = futures::future::join_all(transactions.into_iter().map(|row| self.join(row))).await;

        let count = rows.len();
        *self.rows.write().await = rows;
        self.generation.send_modify(|generation| *generation += 1);
        log::debug!("Transaction list reloaded with {} rows", count);
        Ok(count)
    }

    async fn join(&self, mut row: ExtendedTransaction) -> ExtendedTransaction {
        let (source, target) = futures::join!(
            self.lookup(row.transaction.source_bank_account_id),
            self.lookup(row.transaction.target_bank_account_id)
        );
        row.source = source;
        row.target = target;
        row
    }

    async fn lookup(&self, id: Option<i64>) -> Option<BankAccount> {
        let id = id?;
        match self.accounts.bank_account(id).await {
            Ok(account) => account,
            Err(e) => {
                log::warn!("Failed to look up bank account {} for the transaction list: {}", id, e);
                None
            }
        }
    }

    pub async fn rows(&self) -> Vec<ExtendedTransaction> {
        self.rows.read().await.clone()
    }

    /// Rows of one page; an index past the end yields the last page
    pub async fn page(&self, index: usize, size: usize) -> Page<ExtendedTransaction> {
        let rows = self.rows.read().await;
        let size = size.max(1);
        let total = rows.len();
        let last = if total == 0 { 0 } else { (total - 1) / size };
        let index = index.min(last);
        let items = rows.iter().skip(index * size).take(size).cloned().collect();

        Page { items, index, size, total }
    }

    /// Delete a transaction, then reload the list whatever the outcome
    pub async fn delete(&self, id: i64) -> Notification {
        let notification = match self.transactions.delete_transaction(id).await {
            Ok(()) => {
                log::info!("Deleted transaction {}", id);
                Notification::success(DELETED_MESSAGE, self.notification_duration_ms)
            }
            Err(e) => {
                log::log!(e.log_level(), "Failed to delete transaction {}: {}", id, e.to_details());
                Notification::error(DELETE_FAILED_MESSAGE, self.notification_duration_ms)
            }
        };

        if let Err(e) = self.reload().await {
            log::log!(e.log_level(), "Failed to reload transactions after delete: {}", e.to_details());
        }
        notification
    }

    /// Reload once per received event until the channel closes
    pub async fn listen(&self, mut subscription: TransactionSubscription) {
        while let Some(event) = subscription.recv().await {
            log::debug!("Transaction {} created, reloading list", event.id);
            if let Err(e) = self.reload().await {
                log::log!(e.log_level(), "Failed to reload transactions: {}", e.to_details());
            }
        }
    }

    /// Generation counter bumped after every reload
    pub fn refreshes(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    /// Subscribe now and listen on a background task.
    ///
    /// Dropping the returned guard stops the listener and releases the
    /// subscription.
    pub fn attach(self: &Arc<Self>, events: &TransactionEvents) -> ListenerGuard {
        let subscription = events.subscribe();
        let view = Arc::clone(self);
        let handle = tokio::spawn(async move { view.listen(subscription).await });
        ListenerGuard { handle }
    }
}

/// Keeps a view's event listener alive
#[derive(Debug)]
pub struct ListenerGuard {
    handle: JoinHandle<()>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::services::memory::InMemoryBank;
    use crate::types::TransactionType;

    fn view(bank: &Arc<InMemoryBank>) -> Arc<TransactionListView> {
        Arc::new(TransactionListView::new(bank.clone(), bank.clone(), 2000))
    }

    async fn wait_for_generation(rx: &mut watch::Receiver<u64>, generation: u64) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while *rx.borrow_and_update() < generation {
                rx.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_reload_joins_accounts() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        bank.add_transaction(TransactionType::Deposit, None, Some(1), 500.0);
        bank.add_transaction(TransactionType::Transfer, Some(1), Some(2), 10.0);
        let view = view(&bank);

        assert_eq!(view.reload().await.unwrap(), 2);
        let rows = view.rows().await;
        assert_eq!(rows[0].source, None);
        assert_eq!(rows[0].source_account_holder_name(), "");
        assert_eq!(rows[0].target_account_holder_name(), "Miss Jane A Smith");
        assert_eq!(rows[1].source_account_holder_name(), "Miss Jane A Smith");
        assert_eq!(rows[1].target_account_holder_name(), "Thomas Christopher Wright");
        // Absent ids are not looked up
        assert_eq!(bank.account_lookups(), 3);
    }

    #[tokio::test]
    async fn test_failed_lookup_leaves_account_empty() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        bank.add_transaction(TransactionType::Withdraw, Some(2), None, 5.0);
        bank.fail_lookups(true);
        let view = view(&bank);

        view.reload().await.unwrap();
        let rows = view.rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source, None);
        assert_eq!(rows[0].transaction.amount, 5.0);
    }

    #[tokio::test]
    async fn test_pagination() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        for i in 0..12 {
            bank.add_transaction(TransactionType::Deposit, None, Some(1), i as f64);
        }
        let view = view(&bank);
        view.reload().await.unwrap();

        let first = view.page(0, 5).await;
        assert_eq!(first.items.len(), 5);
        assert_eq!(first.page_count(), 3);
        assert!(!first.has_previous());
        assert!(first.has_next());
        assert_eq!((first.first_row(), first.last_row()), (1, 5));

        let last = view.page(2, 5).await;
        assert_eq!(last.items.len(), 2);
        assert_eq!(last.items[0].transaction.id, 11);
        assert!(!last.has_next());

        // Past the end clamps to the last page
        assert_eq!(view.page(9, 5).await.index, 2);
    }

    #[tokio::test]
    async fn test_empty_page() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let page = view(&bank).page(3, 10).await;
        assert!(page.items.is_empty());
        assert_eq!(page.index, 0);
        assert_eq!(page.page_count(), 1);
        assert_eq!(page.first_row(), 0);
    }

    #[tokio::test]
    async fn test_page_with_maximum_size() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        bank.add_transaction(TransactionType::Deposit, None, Some(1), 1.0);
        bank.add_transaction(TransactionType::Deposit, None, Some(2), 2.0);
        let view = view(&bank);
        view.reload().await.unwrap();

        let page = view.page(0, usize::MAX).await;
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.page_count(), 1);
        assert!(!page.has_next());
        assert_eq!(page.last_row(), 2);
    }

    #[tokio::test]
    async fn test_delete_reloads() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let tx = bank.add_transaction(TransactionType::Deposit, None, Some(1), 1.0);
        let view = view(&bank);
        view.reload().await.unwrap();

        let notification = view.delete(tx.id).await;
        assert!(!notification.is_error());
        assert!(view.rows().await.is_empty());
        assert_eq!(bank.transaction_loads(), 2);
    }

    #[tokio::test]
    async fn test_failed_delete_still_reloads() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let view = view(&bank);

        let notification = view.delete(42).await;
        assert!(notification.is_error());
        assert_eq!(notification.message, "Error Deleting Transaction");
        assert_eq!(bank.transaction_loads(), 1);
    }

    #[tokio::test]
    async fn test_reloads_exactly_once_per_event() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let events = TransactionEvents::new(8);
        let view = view(&bank);
        let mut refreshes = view.refreshes();
        let _guard = view.attach(&events);

        bank.add_transaction(TransactionType::Deposit, None, Some(1), 1.0);
        events.notify_transaction_created(1);
        events.notify_transaction_created(2);
        wait_for_generation(&mut refreshes, 2).await;

        // Give a spurious extra reload the chance to show up
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(bank.transaction_loads(), 2);
        assert_eq!(view.rows().await.len(), 1);
    }

    #[tokio::test]
    async fn test_dropping_guard_stops_listening() {
        let bank = Arc::new(InMemoryBank::with_sample_accounts());
        let events = TransactionEvents::new(8);
        let view = view(&bank);

        let guard = view.attach(&events);
        assert_eq!(events.subscriber_count(), 1);
        drop(guard);

        tokio::time::timeout(Duration::from_secs(5), async {
            while events.subscriber_count() > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(events.notify_transaction_created(1), 0);
        assert_eq!(bank.transaction_loads(), 0);
    }
}
