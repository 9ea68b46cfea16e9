//! Shared fixtures for document adapter tests

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessera_core_types::Entity;
use tessera_repository::Repository;
use tessera_store_document::{
    CollectionError, DocumentCollection, DocumentRecord, DocumentRepository, MemoryCollection,
    ScanOptions,
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

impl Account {
    pub fn new(id: i64, name: &str, active: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            active,
        }
    }
}

impl Entity for Account {
    type Key = i64;
    const NAME: &'static str = "account";

    fn key(&self) -> i64 {
        self.id
    }
}

impl DocumentRecord for Account {
    const KEY_FIELD: &'static str = "id";
}

pub fn account_repository() -> (DocumentRepository<Account>, Arc<MemoryCollection>) {
    let collection = Arc::new(MemoryCollection::new());
    let repo = DocumentRepository::new(collection.clone() as Arc<dyn DocumentCollection>);
    (repo, collection)
}

/// Seed 100 active accounts with explicit natural keys 1..=100.
pub async fn seed_accounts(repo: &DocumentRepository<Account>, cancel: &CancellationToken) {
    for i in 1..=100 {
        repo.add(Account::new(i, &format!("TITLE_{:03}", i), true), cancel)
            .await
            .unwrap();
    }
}

/// Driver double whose every call fails natively.
pub struct UnavailableCollection;

#[async_trait]
impl DocumentCollection for UnavailableCollection {
    async fn insert(&self, _id: String, _document: Value) -> Result<(), CollectionError> {
        Err(CollectionError::Unavailable("node down".to_string()))
    }

    async fn replace(&self, _id: &str, _document: Value) -> Result<bool, CollectionError> {
        Err(CollectionError::Unavailable("node down".to_string()))
    }

    async fn delete(&self, _id: &str) -> Result<bool, CollectionError> {
        Err(CollectionError::Unavailable("node down".to_string()))
    }

    async fn get(&self, _id: &str) -> Result<Option<Value>, CollectionError> {
        Err(CollectionError::Unavailable("node down".to_string()))
    }

    async fn scan(
        &self,
        _filter: &Value,
        _options: &ScanOptions,
    ) -> Result<Vec<Value>, CollectionError> {
        Err(CollectionError::Unavailable("node down".to_string()))
    }
}

/// Driver double whose calls never complete, for cancellation tests.
pub struct StalledCollection;

#[async_trait]
impl DocumentCollection for StalledCollection {
    async fn insert(&self, _id: String, _document: Value) -> Result<(), CollectionError> {
        std::future::pending().await
    }

    async fn replace(&self, _id: &str, _document: Value) -> Result<bool, CollectionError> {
        std::future::pending().await
    }

    async fn delete(&self, _id: &str) -> Result<bool, CollectionError> {
        std::future::pending().await
    }

    async fn get(&self, _id: &str) -> Result<Option<Value>, CollectionError> {
        std::future::pending().await
    }

    async fn scan(
        &self,
        _filter: &Value,
        _options: &ScanOptions,
    ) -> Result<Vec<Value>, CollectionError> {
        std::future::pending().await
    }
}
