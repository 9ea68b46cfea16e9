//! Shared fixtures for instrumentation tests

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
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            active: true,
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

/// Plain (uninstrumented) repository over an in-memory collection.
pub fn plain_repository() -> Arc<dyn Repository<Account>> {
    Arc::new(DocumentRepository::<Account>::new(
        Arc::new(MemoryCollection::new()) as Arc<dyn DocumentCollection>,
    ))
}

/// Repository over a driver whose every call fails natively.
pub fn failing_repository() -> Arc<dyn Repository<Account>> {
    Arc::new(DocumentRepository::<Account>::new(
        Arc::new(DeadCollection) as Arc<dyn DocumentCollection>
    ))
}

pub async fn seed(repo: &Arc<dyn Repository<Account>>, count: i64) {
    let cancel = CancellationToken::new();
    for i in 1..=count {
        repo.add(Account::new(i, &format!("TITLE_{:03}", i)), &cancel)
            .await
            .unwrap();
    }
}

/// Driver double whose every call fails natively.
pub struct DeadCollection;

#[async_trait]
impl DocumentCollection for DeadCollection {
    async fn insert(&self, _id: String, _document: Value) -> Result<(), CollectionError> {
        Err(CollectionError::Unavailable("replica lost".to_string()))
    }

    async fn replace(&self, _id: &str, _document: Value) -> Result<bool, CollectionError> {
        Err(CollectionError::Unavailable("replica lost".to_string()))
    }

    async fn delete(&self, _id: &str) -> Result<bool, CollectionError> {
        Err(CollectionError::Unavailable("replica lost".to_string()))
    }

    async fn get(&self, _id: &str) -> Result<Option<Value>, CollectionError> {
        Err(CollectionError::Unavailable("replica lost".to_string()))
    }

    async fn scan(
        &self,
        _filter: &Value,
        _options: &ScanOptions,
    ) -> Result<Vec<Value>, CollectionError> {
        Err(CollectionError::Unavailable("replica lost".to_string()))
    }
}
