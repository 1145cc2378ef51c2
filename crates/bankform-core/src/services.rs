//! Service traits for the REST backend
//!
//! The web layer and the controllers only see these traits; the HTTP
//! implementation lives in `bankform-backend`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::models::{BankAccount, ExtendedTransaction, NestedBankAccount, Transaction, TransactionCreate};

/// Bank account lookups
#[async_trait]
pub trait BankAccountService: Send + Sync {
    /// `GET /api/bank_accounts`
    async fn bank_accounts(&self) -> CoreResult<Vec<BankAccount>>;

    /// `GET /api/bank_accounts/{id}`; `Ok(None)` when the backend has no such account
    async fn bank_account(&self, id: i64) -> CoreResult<Option<BankAccount>>;

    /// Accounts projected for the source/target select lists
    async fn nested_bank_accounts(&self) -> CoreResult<Vec<NestedBankAccount>> {
        let accounts = self.bank_accounts().await?;
        Ok(accounts.iter().map(NestedBankAccount::from).collect())
    }
}

/// Transaction listing and mutation
#[async_trait]
pub trait TransactionService: Send + Sync {
    /// `GET /api/transactions`
    async fn transactions(&self) -> CoreResult<Vec<Transaction>>;

    /// `POST /api/transactions`
    async fn create_transaction(&self, data: &TransactionCreate) -> CoreResult<Transaction>;

    /// `DELETE /api/transactions/{id}`
    async fn delete_transaction(&self, id: i64) -> CoreResult<()>;

    /// Transactions with `source`/`target` placeholders left unresolved
    async fn enhanced_transactions(&self) -> CoreResult<Vec<ExtendedTransaction>> {
        let transactions = self.transactions().await?;
        Ok(transactions.into_iter().map(ExtendedTransaction::unresolved).collect())
    }
}

/// Shared service handles
pub type BankAccountServiceRef = Arc<dyn BankAccountService>;
pub type TransactionServiceRef = Arc<dyn TransactionService>;

#[cfg(any(test, feature = "testing"))]
pub mod memory {
    //! In-memory services standing in for the REST backend in tests

    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::error::CoreError;
    use crate::types::TransactionType;

    #[derive(Default)]
    struct Store {
        accounts: BTreeMap<i64, BankAccount>,
        transactions: BTreeMap<i64, Transaction>,
        next_id: i64,
    }

    /// In-memory bank with switchable failures
    #[derive(Default)]
    pub struct InMemoryBank {
        store: Mutex<Store>,
        fail_lookups: Mutex<bool>,
        fail_writes: Mutex<bool>,
        account_lookups: AtomicUsize,
        transaction_loads: AtomicUsize,
    }

    impl InMemoryBank {
        /// The three accounts used throughout the tests: accounts 1 and 2
        /// belong to client 1, account 3 to client 2.
        pub fn with_sample_accounts() -> Self {
            let bank = Self::default();
            bank.add_account(account(1, "Bank A", "Miss Jane A Smith", "111111", "11111111", 1, 128746.281));
            bank.add_account(account(2, "Bank B", "Thomas Christopher Wright", "222222", "22222222", 1, 46.2));
            bank.add_account(account(3, "Bank C", "Mr John Doe", "333333", "33333333", 2, 123.82));
            bank
        }

        pub fn add_account(&self, account: BankAccount) {
            self.store.lock().unwrap().accounts.insert(account.id, account);
        }

        pub fn add_transaction(
            &self,
            transaction_type: TransactionType,
            source: Option<i64>,
            target: Option<i64>,
            amount: f64,
        ) -> Transaction {
            let mut store = self.store.lock().unwrap();
            store.next_id += 1;
            let tx = Transaction {
                id: store.next_id,
                transaction_type,
                source_bank_account_id: source,
                target_bank_account_id: target,
                amount,
                description: String::new(),
            };
            store.transactions.insert(tx.id, tx.clone());
            tx
        }

        pub fn transaction_count(&self) -> usize {
            self.store.lock().unwrap().transactions.len()
        }

        /// Make account listing and lookups fail with a transport error
        pub fn fail_lookups(&self, fail: bool) {
            *self.fail_lookups.lock().unwrap() = fail;
        }

        /// Make create and delete fail with a backend error
        pub fn fail_writes(&self, fail: bool) {
            *self.fail_writes.lock().unwrap() = fail;
        }

        pub fn account_lookups(&self) -> usize {
            self.account_lookups.load(Ordering::SeqCst)
        }

        /// Number of `transactions()` calls
        pub fn transaction_loads(&self) -> usize {
            self.transaction_loads.load(Ordering::SeqCst)
        }
    }

    pub fn account(
        id: i64,
        bank_name: &str,
        holder: &str,
        sort_code: &str,
        account_number: &str,
        client_id: i64,
        current_value: f64,
    ) -> BankAccount {
        BankAccount {
            id,
            bank_name: bank_name.to_string(),
            account_holder_name: holder.to_string(),
            sort_code: sort_code.to_string(),
            account_number: account_number.to_string(),
            client_id,
            current_value,
        }
    }

    #[async_trait]
    impl BankAccountService for InMemoryBank {
        async fn bank_accounts(&self) -> CoreResult<Vec<BankAccount>> {
            if *self.fail_lookups.lock().unwrap() {
                return Err(CoreError::Transport { message: "connection refused".to_string() });
            }
            Ok(self.store.lock().unwrap().accounts.values().cloned().collect())
        }

        async fn bank_account(&self, id: i64) -> CoreResult<Option<BankAccount>> {
            self.account_lookups.fetch_add(1, Ordering::SeqCst);
            if *self.fail_lookups.lock().unwrap() {
                return Err(CoreError::Transport { message: "connection refused".to_string() });
            }
            Ok(self.store.lock().unwrap().accounts.get(&id).cloned())
        }
    }

    #[async_trait]
    impl TransactionService for InMemoryBank {
        async fn transactions(&self) -> CoreResult<Vec<Transaction>> {
            self.transaction_loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.store.lock().unwrap().transactions.values().cloned().collect())
        }

        async fn create_transaction(&self, data: &TransactionCreate) -> CoreResult<Transaction> {
            if *self.fail_writes.lock().unwrap() {
                return Err(CoreError::Backend { status: 500, message: "write failed".to_string() });
            }
            let mut store = self.store.lock().unwrap();
            store.next_id += 1;
            let tx = Transaction {
                id: store.next_id,
                transaction_type: data.transaction_type,
                source_bank_account_id: data.source_bank_account_id,
                target_bank_account_id: data.target_bank_account_id,
                amount: data.amount,
                description: data.description.clone(),
            };
            store.transactions.insert(tx.id, tx.clone());
            Ok(tx)
        }

        async fn delete_transaction(&self, id: i64) -> CoreResult<()> {
            if *self.fail_writes.lock().unwrap() {
                return Err(CoreError::Backend { status: 500, message: "write failed".to_string() });
            }
            match self.store.lock().unwrap().transactions.remove(&id) {
                Some(_) => Ok(()),
                None => Err(CoreError::TransactionNotFound { id }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::InMemoryBank;
    use super::*;
    use crate::types::TransactionType;

    #[tokio::test]
    async fn test_nested_bank_accounts_projection() {
        let bank = InMemoryBank::with_sample_accounts();
        let nested = bank.nested_bank_accounts().await.unwrap();
        assert_eq!(nested.len(), 3);
        assert_eq!(nested[1].account_holder_name, "Thomas Christopher Wright");
    }

    #[tokio::test]
    async fn test_enhanced_transactions_are_unresolved() {
        let bank = InMemoryBank::with_sample_accounts();
        bank.add_transaction(TransactionType::Deposit, None, Some(1), 10.0);
        let enhanced = bank.enhanced_transactions().await.unwrap();
        assert_eq!(enhanced.len(), 1);
        assert!(enhanced[0].source.is_none());
        assert!(enhanced[0].target.is_none());
    }
}
