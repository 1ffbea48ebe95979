// src/db/memory_store.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{CollectionPath, Document, DocumentStore, Query, StoredDocument},
};

const CHANGES_CAPACITY: usize = 256;

struct Entry {
    seq: u64,
    data: Document,
}

/// Banco em memória do processo. Usado nos testes e em execuções locais
/// (`STORE_BACKEND=memory`).
pub struct MemoryStore {
    collections: RwLock<HashMap<CollectionPath, HashMap<String, Entry>>>,
    seq: AtomicU64,
    changes: broadcast::Sender<CollectionPath>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGES_CAPACITY);
        Self {
            collections: RwLock::new(HashMap::new()),
            seq: AtomicU64::new(0),
            changes,
        }
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    fn notify(&self, collection: &CollectionPath) {
        // Sem ninguém ouvindo o envio falha, e tudo bem
        let _ = self.changes.send(collection.clone());
    }

    // Ordem de inserção, como o Postgres ordena por created_at
    fn sorted(entries: &HashMap<String, Entry>, query: Option<&Query>) -> Vec<StoredDocument> {
        let mut found: Vec<(&String, &Entry)> = entries
            .iter()
            .filter(|(_, e)| query.is_none_or(|q| q.matches(&e.data)))
            .collect();
        found.sort_by_key(|(_, e)| e.seq);
        found
            .into_iter()
            .map(|(id, e)| StoredDocument {
                id: id.clone(),
                data: e.data.clone(),
            })
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(
        &self,
        collection: &CollectionPath,
        mut data: Document,
    ) -> Result<StoredDocument, AppError> {
        let id = Uuid::new_v4().to_string();
        data.insert("id".to_string(), Value::String(id.clone()));

        let entry = Entry {
            seq: self.next_seq(),
            data: data.clone(),
        };
        self.collections
            .write()
            .await
            .entry(collection.clone())
            .or_default()
            .insert(id.clone(), entry);

        self.notify(collection);
        Ok(StoredDocument { id, data })
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        mut data: Document,
    ) -> Result<StoredDocument, AppError> {
        data.insert("id".to_string(), Value::String(id.to_string()));
        {
            let mut collections = self.collections.write().await;
            let entries = collections.entry(collection.clone()).or_default();
            let seq = entries.get(id).map(|e| e.seq).unwrap_or_else(|| self.next_seq());
            entries.insert(
                id.to_string(),
                Entry {
                    seq,
                    data: data.clone(),
                },
            );
        }
        self.notify(collection);
        Ok(StoredDocument {
            id: id.to_string(),
            data,
        })
    }

    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<StoredDocument>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|entries| entries.get(id))
            .map(|e| StoredDocument {
                id: id.to_string(),
                data: e.data.clone(),
            }))
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<StoredDocument>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|entries| Self::sorted(entries, None))
            .unwrap_or_default())
    }

    async fn query(&self, query: &Query) -> Result<Vec<StoredDocument>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&query.collection)
            .map(|entries| Self::sorted(entries, Some(query)))
            .unwrap_or_default())
    }

    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: Document,
    ) -> Result<Option<StoredDocument>, AppError> {
        let updated = {
            let mut collections = self.collections.write().await;
            let Some(entry) = collections.get_mut(collection).and_then(|e| e.get_mut(id)) else {
                return Ok(None);
            };
            for (key, value) in fields {
                entry.data.insert(key, value);
            }
            StoredDocument {
                id: id.to_string(),
                data: entry.data.clone(),
            }
        };
        self.notify(collection);
        Ok(Some(updated))
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<bool, AppError> {
        let removed = self
            .collections
            .write()
            .await
            .get_mut(collection)
            .and_then(|entries| entries.remove(id))
            .is_some();
        if removed {
            self.notify(collection);
        }
        Ok(removed)
    }

    fn changes(&self) -> broadcast::Receiver<CollectionPath> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::to_document;
    use serde_json::json;

    fn path(name: &str) -> CollectionPath {
        CollectionPath::from_raw(format!("u1/data/{}", name))
    }

    #[tokio::test]
    async fn insert_writes_generated_id_into_document() {
        let store = MemoryStore::new();
        let stored = store
            .insert(&path("clientes"), to_document(&json!({ "nome": "Ana" })).unwrap())
            .await
            .unwrap();

        let fetched = store.get(&path("clientes"), &stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.data["id"], json!(stored.id));
        assert_eq!(fetched.data["nome"], json!("Ana"));
    }

    #[tokio::test]
    async fn list_keeps_insertion_order_and_isolates_collections() {
        let store = MemoryStore::new();
        for nome in ["a", "b", "c"] {
            store
                .insert(&path("clientes"), to_document(&json!({ "nome": nome })).unwrap())
                .await
                .unwrap();
        }
        store
            .insert(&path("operacoes"), to_document(&json!({ "x": 1 })).unwrap())
            .await
            .unwrap();

        let nomes: Vec<Value> = store
            .list(&path("clientes"))
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.data["nome"].clone())
            .collect();
        assert_eq!(nomes, vec![json!("a"), json!("b"), json!("c")]);
        assert!(store.list(&path("nada")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_merges_top_level_fields_and_reports_missing() {
        let store = MemoryStore::new();
        let stored = store
            .insert(&path("clientes"), to_document(&json!({ "nome": "Ana", "cpf": "1" })).unwrap())
            .await
            .unwrap();

        let updated = store
            .update(&path("clientes"), &stored.id, to_document(&json!({ "nome": "Bia" })).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.data["nome"], json!("Bia"));
        assert_eq!(updated.data["cpf"], json!("1"));

        let missing = store
            .update(&path("clientes"), "nao-existe", Document::new())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_something_was_removed() {
        let store = MemoryStore::new();
        let stored = store.insert(&path("clientes"), Document::new()).await.unwrap();
        assert!(store.delete(&path("clientes"), &stored.id).await.unwrap());
        assert!(!store.delete(&path("clientes"), &stored.id).await.unwrap());
    }

    #[tokio::test]
    async fn writes_are_announced_on_changes() {
        let store = MemoryStore::new();
        let mut changes = store.changes();
        store.insert(&path("clientes"), Document::new()).await.unwrap();
        assert_eq!(changes.recv().await.unwrap(), path("clientes"));
    }
}
