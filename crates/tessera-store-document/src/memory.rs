//! In-process document collection
//!
//! Implements the narrow driver surface over an ordered map guarded by
//! an async RwLock. Store-default scan order is document-id order.
//! Useful as an embedded store and as the driver under test doubles
//! would otherwise mock.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::client::{CollectionError, DocumentCollection, ScanOptions};

/// Ordered in-memory document collection.
#[derive(Debug, Default)]
pub struct MemoryCollection {
    documents: RwLock<BTreeMap<String, Value>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

/// Equality with numeric coercion: `1` equals `1.0`.
fn equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Order comparison; only numbers and strings order-compare.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

static NULL: Value = Value::Null;

fn field_value<'a>(document: &'a Value, field: &str) -> &'a Value {
    document.get(field).unwrap_or(&NULL)
}

/// Evaluate a filter document against a document.
fn matches(filter: &Value, document: &Value) -> Result<bool, CollectionError> {
    let clauses = filter.as_object().ok_or_else(|| {
        CollectionError::BadFilter(format!("filter must be an object, got {}", filter))
    })?;

    for (name, condition) in clauses {
        let holds = match name.as_str() {
            "$and" => {
                let arms = condition.as_array().ok_or_else(|| {
                    CollectionError::BadFilter("$and expects an array".to_string())
                })?;
                let mut all = true;
                for arm in arms {
                    all &= matches(arm, document)?;
                }
                all
            }
            "$or" => {
                let arms = condition.as_array().ok_or_else(|| {
                    CollectionError::BadFilter("$or expects an array".to_string())
                })?;
                let mut any = false;
                for arm in arms {
                    any |= matches(arm, document)?;
                }
                any
            }
            "$not" => !matches(condition, document)?,
            field => {
                let actual = field_value(document, field);
                match condition.as_object() {
                    Some(ops) if ops.keys().any(|k| k.starts_with('$')) => {
                        let mut all = true;
                        for (op, operand) in ops {
                            all &= match op.as_str() {
                                "$eq" => equals(actual, operand),
                                "$ne" => !equals(actual, operand),
                                "$gt" => {
                                    compare(actual, operand) == Some(Ordering::Greater)
                                }
                                "$gte" => matches!(
                                    compare(actual, operand),
                                    Some(Ordering::Greater | Ordering::Equal)
                                ),
                                "$lt" => compare(actual, operand) == Some(Ordering::Less),
                                "$lte" => matches!(
                                    compare(actual, operand),
                                    Some(Ordering::Less | Ordering::Equal)
                                ),
                                other => {
                                    return Err(CollectionError::BadFilter(format!(
                                        "unknown operator '{}'",
                                        other
                                    )))
                                }
                            };
                        }
                        all
                    }
                    // A bare value is equality.
                    _ => equals(actual, condition),
                }
            }
        };
        if !holds {
            return Ok(false);
        }
    }
    Ok(true)
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    async fn insert(&self, id: String, document: Value) -> Result<(), CollectionError> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(&id) {
            return Err(CollectionError::DuplicateId(id));
        }
        documents.insert(id, document);
        Ok(())
    }

    async fn replace(&self, id: &str, document: Value) -> Result<bool, CollectionError> {
        let mut documents = self.documents.write().await;
        match documents.get_mut(id) {
            Some(slot) => {
                *slot = document;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, CollectionError> {
        Ok(self.documents.write().await.remove(id).is_some())
    }

    async fn get(&self, id: &str) -> Result<Option<Value>, CollectionError> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn scan(
        &self,
        filter: &Value,
        options: &ScanOptions,
    ) -> Result<Vec<Value>, CollectionError> {
        let documents = self.documents.read().await;

        // BTreeMap iteration gives document-id order, the store default.
        let mut matched: Vec<(&String, &Value)> = Vec::new();
        for (id, document) in documents.iter() {
            if matches(filter, document)? {
                matched.push((id, document));
            }
        }

        if let Some(sort) = &options.sort {
            // Stable sort: ties keep the id-order tiebreak.
            matched.sort_by(|(_, a), (_, b)| {
                let ordering = compare(field_value(a, &sort.field), field_value(b, &sort.field))
                    .unwrap_or(Ordering::Equal);
                if sort.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        let skip = options.skip.unwrap_or(0) as usize;
        let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|(_, document)| document.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: i64, name: &str, active: bool) -> Value {
        json!({ "id": id, "name": name, "active": active })
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let collection = MemoryCollection::new();
        collection.insert("1".into(), doc(1, "a", true)).await.unwrap();

        let found = collection.get("1").await.unwrap().unwrap();
        assert_eq!(found["name"], "a");
        assert!(collection.get("2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let collection = MemoryCollection::new();
        collection.insert("1".into(), doc(1, "a", true)).await.unwrap();

        let err = collection.insert("1".into(), doc(1, "b", true)).await;
        assert!(matches!(err, Err(CollectionError::DuplicateId(_))));
    }

    #[tokio::test]
    async fn test_replace_absent_returns_false() {
        let collection = MemoryCollection::new();
        assert!(!collection.replace("9", doc(9, "x", true)).await.unwrap());
    }

    #[tokio::test]
    async fn test_scan_with_operators() {
        let collection = MemoryCollection::new();
        for i in 1..=5 {
            collection
                .insert(i.to_string(), doc(i, &format!("n{}", i), i % 2 == 0))
                .await
                .unwrap();
        }

        let matched = collection
            .scan(&json!({"id": {"$gt": 2}}), &ScanOptions::default())
            .await
            .unwrap();
        assert_eq!(matched.len(), 3);

        let matched = collection
            .scan(
                &json!({"$or": [{"id": 1}, {"name": {"$eq": "n5"}}]}),
                &ScanOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(matched.len(), 2);
    }

    #[tokio::test]
    async fn test_scan_sort_is_numeric_not_lexicographic() {
        let collection = MemoryCollection::new();
        for i in [2, 10, 1] {
            collection
                .insert(i.to_string(), doc(i, "x", true))
                .await
                .unwrap();
        }

        let sorted = collection
            .scan(
                &json!({}),
                &ScanOptions {
                    sort: Some(crate::client::SortSpec {
                        field: "id".into(),
                        ascending: true,
                    }),
                    skip: None,
                    limit: None,
                },
            )
            .await
            .unwrap();
        let ids: Vec<i64> = sorted.iter().map(|d| d["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 10]);
    }

    #[tokio::test]
    async fn test_numeric_coercion_in_equality() {
        let collection = MemoryCollection::new();
        collection
            .insert("1".into(), json!({"id": 1, "score": 1.0}))
            .await
            .unwrap();

        let matched = collection
            .scan(&json!({"score": 1}), &ScanOptions::default())
            .await
            .unwrap();
        assert_eq!(matched.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_operator_is_bad_filter() {
        let collection = MemoryCollection::new();
        collection.insert("1".into(), doc(1, "a", true)).await.unwrap();

        let err = collection
            .scan(&json!({"id": {"$regex": "a"}}), &ScanOptions::default())
            .await;
        assert!(matches!(err, Err(CollectionError::BadFilter(_))));
    }
}
