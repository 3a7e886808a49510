//! # Document Store
//!
//! Named collections of JSON documents addressed by string ids.
//!
//! ## Live
//!
//! - Redis hash per collection: `{prefix}:{collection}`
//! - Hash field is the document id, value is the JSON text of the document
//! - Merges are read, overlay, write. No transactions, last write wins
//! - Field filters load the whole hash and compare in process
//!
//! ## Fallback
//!
//! - Used when the credential resolver finds no live store
//! - Insertion ordered, process local, lost on restart
//! - Seeded with the starter catalog, no ideas, no preferences
//!
//! Every document read back carries its key as `"id"`.
use std::{collections::HashMap, sync::Arc};

use catalog::seed::seed_components;
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::credentials::StoreMode;

pub type Document = Map<String, Value>;

const ID: &str = "id";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Malformed document: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Value is not a document")]
    NotADocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Components,
    Ideas,
    Preferences,
    ConnectionTest,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Components => "components",
            Collection::Ideas => "ideas",
            Collection::Preferences => "preferences",
            Collection::ConnectionTest => "test",
        }
    }
}

#[derive(Clone)]
pub enum Store {
    Live(RedisStore),
    Memory(MemoryStore),
}

impl Store {
    pub fn from_mode(mode: &StoreMode, prefix: &str) -> Self {
        match mode {
            StoreMode::Live { connection, .. } => Store::Live(RedisStore {
                connection: connection.clone(),
                prefix: prefix.to_string(),
            }),
            StoreMode::Offline => Store::Memory(MemoryStore::fallback()),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Store::Live(_))
    }

    pub async fn all<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, StoreError> {
        self.documents(collection)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<T>, StoreError> {
        self.document(collection, id).await?.map(decode).transpose()
    }

    /// Creates or fully replaces the document at `id`.
    pub async fn set<T: Serialize>(
        &self,
        collection: Collection,
        id: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        self.write(collection, id, encode(value)?).await?;

        Ok(())
    }

    /// Overlays the top-level fields of `value` onto the stored document,
    /// creating it when absent, and returns the result.
    pub async fn merge<T: Serialize, R: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
        value: &T,
    ) -> Result<R, StoreError> {
        let fields = encode(value)?;
        let mut document = self.document(collection, id).await?.unwrap_or_default();
        document.extend(fields);

        decode(self.write(collection, id, document).await?)
    }

    /// Like [`Store::merge`] but only for existing documents. Returns `false`
    /// when nothing is stored at `id`.
    pub async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> Result<bool, StoreError> {
        let Some(mut document) = self.document(collection, id).await? else {
            return Ok(false);
        };
        document.extend(fields);
        self.write(collection, id, document).await?;

        Ok(true)
    }

    /// Returns `false` when nothing was stored at `id`.
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        match self {
            Store::Live(store) => store.delete(collection, id).await,
            Store::Memory(store) => Ok(store.delete(collection, id).await),
        }
    }

    pub async fn filter_eq<T: DeserializeOwned>(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<T>, StoreError> {
        self.documents(collection)
            .await?
            .into_iter()
            .filter(|document| document.get(field) == Some(value))
            .map(decode)
            .collect()
    }

    pub async fn count(&self, collection: Collection) -> Result<usize, StoreError> {
        match self {
            Store::Live(store) => store.count(collection).await,
            Store::Memory(store) => Ok(store.count(collection).await),
        }
    }

    pub async fn is_empty(&self, collection: Collection) -> Result<bool, StoreError> {
        Ok(self.count(collection).await? == 0)
    }

    async fn documents(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        match self {
            Store::Live(store) => store.documents(collection).await,
            Store::Memory(store) => Ok(store.documents(collection).await),
        }
    }

    async fn document(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        match self {
            Store::Live(store) => store.document(collection, id).await,
            Store::Memory(store) => Ok(store.document(collection, id).await),
        }
    }

    async fn write(
        &self,
        collection: Collection,
        id: &str,
        mut document: Document,
    ) -> Result<Document, StoreError> {
        document.insert(ID.to_string(), Value::String(id.to_string()));

        match self {
            Store::Live(store) => store.write(collection, id, &document).await?,
            Store::Memory(store) => store.write(collection, id, document.clone()).await,
        }

        Ok(document)
    }
}

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    fn key(&self, collection: Collection) -> String {
        format!("{}:{}", self.prefix, collection.as_str())
    }

    async fn documents(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let mut connection = self.connection.clone();
        let raw: HashMap<String, String> = connection.hgetall(self.key(collection)).await?;

        raw.into_iter()
            .map(|(id, text)| parse(&id, &text))
            .collect()
    }

    async fn document(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let mut connection = self.connection.clone();
        let raw: Option<String> = connection.hget(self.key(collection), id).await?;

        raw.map(|text| parse(id, &text)).transpose()
    }

    async fn write(
        &self,
        collection: Collection,
        id: &str,
        document: &Document,
    ) -> Result<(), StoreError> {
        let text = serde_json::to_string(document)?;
        let mut connection = self.connection.clone();
        let _: () = connection.hset(self.key(collection), id, text).await?;

        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();
        let removed: usize = connection.hdel(self.key(collection), id).await?;

        Ok(removed > 0)
    }

    async fn count(&self, collection: Collection) -> Result<usize, StoreError> {
        let mut connection = self.connection.clone();

        Ok(connection.hlen(self.key(collection)).await?)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<(String, Document)>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memory store holding the starter catalog.
    pub fn fallback() -> Self {
        let components = seed_components()
            .into_iter()
            .filter_map(|component| {
                let id = component.id.clone()?;
                let document = encode(&component).ok()?;
                Some((id, document))
            })
            .collect();

        Self {
            collections: Arc::new(RwLock::new(HashMap::from([(
                Collection::Components,
                components,
            )]))),
        }
    }

    async fn documents(&self, collection: Collection) -> Vec<Document> {
        let collections = self.collections.read().await;

        collections
            .get(&collection)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(id, document)| with_id(id, document.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn document(&self, collection: Collection, id: &str) -> Option<Document> {
        let collections = self.collections.read().await;

        collections
            .get(&collection)?
            .iter()
            .find(|(key, _)| key == id)
            .map(|(key, document)| with_id(key, document.clone()))
    }

    async fn write(&self, collection: Collection, id: &str, document: Document) {
        let mut collections = self.collections.write().await;
        let entries = collections.entry(collection).or_default();

        match entries.iter_mut().find(|(key, _)| key == id) {
            Some((_, existing)) => *existing = document,
            None => entries.push((id.to_string(), document)),
        }
    }

    async fn delete(&self, collection: Collection, id: &str) -> bool {
        let mut collections = self.collections.write().await;
        let Some(entries) = collections.get_mut(&collection) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|(key, _)| key != id);

        entries.len() != before
    }

    async fn count(&self, collection: Collection) -> usize {
        let collections = self.collections.read().await;

        collections.get(&collection).map_or(0, Vec::len)
    }
}

fn with_id(id: &str, mut document: Document) -> Document {
    document.insert(ID.to_string(), Value::String(id.to_string()));
    document
}

fn parse(id: &str, text: &str) -> Result<Document, StoreError> {
    match serde_json::from_str(text)? {
        Value::Object(document) => Ok(with_id(id, document)),
        _ => Err(StoreError::NotADocument),
    }
}

pub fn encode<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(document) => Ok(document),
        _ => Err(StoreError::NotADocument),
    }
}

fn decode<T: DeserializeOwned>(document: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(document))?)
}
