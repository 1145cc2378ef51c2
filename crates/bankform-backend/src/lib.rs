//! REST backend client
//!
//! [`HttpBackend`] implements the core service traits against the backend's
//! JSON API:
//!
//! - `GET    /api/bank_accounts`
//! - `GET    /api/bank_accounts/{id}`
//! - `GET    /api/transactions`
//! - `POST   /api/transactions`
//! - `DELETE /api/transactions/{id}`

use async_trait::async_trait;
use hyper::StatusCode;

use bankform_config::BackendConfig;
use bankform_core::{
    BankAccount, BankAccountService, CoreError, CoreResult, Transaction, TransactionCreate,
    TransactionService,
};

mod client;

use client::JsonClient;

/// HTTP implementation of both service traits
#[derive(Clone)]
pub struct HttpBackend {
    client: JsonClient,
}

impl HttpBackend {
    /// `base_url` is the backend root, e.g. `http://127.0.0.1:8000`
    pub fn new(base_url: &str) -> Self {
        Self {
            client: JsonClient::new(base_url),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.base())
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

#[async_trait]
impl BankAccountService for HttpBackend {
    async fn bank_accounts(&self) -> CoreResult<Vec<BankAccount>> {
        self.client.get("/api/bank_accounts").await?.error_for_status()?.json()
    }

    async fn bank_account(&self, id: i64) -> CoreResult<Option<BankAccount>> {
        let response = self.client.get(&format!("/api/bank_accounts/{}", id)).await?;
        if response.status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        response.error_for_status()?.json().map(Some)
    }
}

#[async_trait]
impl TransactionService for HttpBackend {
    async fn transactions(&self) -> CoreResult<Vec<Transaction>> {
        self.client.get("/api/transactions").await?.error_for_status()?.json()
    }

    async fn create_transaction(&self, data: &TransactionCreate) -> CoreResult<Transaction> {
        self.client.post("/api/transactions", data).await?.error_for_status()?.json()
    }

    async fn delete_transaction(&self, id: i64) -> CoreResult<()> {
        let response = self.client.delete(&format!("/api/transactions/{}", id)).await?;
        if response.status == StatusCode::NOT_FOUND {
            return Err(CoreError::TransactionNotFound { id });
        }
        response.error_for_status()?;
        Ok(())
    }
}
