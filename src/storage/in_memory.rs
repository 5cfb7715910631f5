//! In-memory implementation of CrudRepository for testing and development

use crate::core::{CrudError, CrudRepository, Entity, Options};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

type IdGenerator<Id> = Arc<dyn Fn() -> Id + Send + Sync>;

/// In-memory repository
///
/// Keeps entities in insertion order behind an `RwLock`. New keys come from
/// the generator given at construction and are stamped into the payload's
/// key field before it is deserialized into `T`.
pub struct InMemoryRepository<T: Entity> {
    entities: Arc<RwLock<Vec<T>>>,
    generator: IdGenerator<T::Id>,
}

impl<T: Entity> InMemoryRepository<T> {
    /// Create a repository using a custom key generator
    pub fn new(generator: impl Fn() -> T::Id + Send + Sync + 'static) -> Self {
        Self {
            entities: Arc::new(RwLock::new(Vec::new())),
            generator: Arc::new(generator),
        }
    }

    /// Seed the repository with existing entities
    pub fn with_entities(self, entities: impl IntoIterator<Item = T>) -> Self {
        self.entities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(entities);
        self
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.entities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Entity> InMemoryRepository<T>
where
    T::Id: From<u64>,
{
    /// Keys 1, 2, 3, ...
    pub fn sequential() -> Self {
        let next = AtomicU64::new(1);
        Self::new(move || T::Id::from(next.fetch_add(1, Ordering::SeqCst)))
    }
}

impl<T: Entity> InMemoryRepository<T>
where
    T::Id: From<Uuid>,
{
    /// Random v4 UUID keys
    pub fn with_uuid() -> Self {
        Self::new(|| T::Id::from(Uuid::new_v4()))
    }
}

impl<T: Entity> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            entities: self.entities.clone(),
            generator: self.generator.clone(),
        }
    }
}

#[async_trait]
impl<T: Entity + DeserializeOwned> CrudRepository<T> for InMemoryRepository<T> {
    async fn detail_by_id(&self, id: &T::Id, _options: &Options) -> Result<Option<T>> {
        let entities = self
            .entities
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(entities.iter().find(|e| &e.id() == id).cloned())
    }

    async fn create(&self, data: Value, _options: &Options) -> Result<T> {
        let id = (self.generator)();
        let entity: T = with_key(data, &id)?;

        let mut entities = self
            .entities
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        entities.push(entity.clone());

        Ok(entity)
    }

    async fn update_by_id(&self, id: &T::Id, data: Value, _options: &Options) -> Result<T> {
        let entity: T = with_key(data, id)?;

        let mut entities = self
            .entities
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let slot = entities
            .iter_mut()
            .find(|e| &e.id() == id)
            .ok_or(CrudError::NotFound)?;
        *slot = entity.clone();

        Ok(entity)
    }

    async fn delete_by_id(&self, id: &T::Id, _options: &Options) -> Result<Value> {
        let mut entities = self
            .entities
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let position = entities
            .iter()
            .position(|e| &e.id() == id)
            .ok_or(CrudError::NotFound)?;
        entities.remove(position);

        Ok(Value::Bool(true))
    }

    async fn list(&self, filters: Value, _options: &Options) -> Result<Vec<T>> {
        let entities = self
            .entities
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut matching = Vec::new();
        for entity in entities.iter() {
            let fields = serde_json::to_value(entity).map_err(CrudError::serialization)?;
            if matches_filters(&fields, &filters) {
                matching.push(entity.clone());
            }
        }
        Ok(matching)
    }
}

/// Write `id` into the payload's key field and deserialize
fn with_key<T: Entity + DeserializeOwned>(data: Value, id: &T::Id) -> Result<T, CrudError> {
    let mut fields = match data {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            return Err(CrudError::serialization(format!(
                "expected an object payload, got {}",
                other
            )));
        }
    };
    fields.insert(
        T::ID_FIELD.to_string(),
        serde_json::to_value(id).map_err(CrudError::serialization)?,
    );
    serde_json::from_value(Value::Object(fields)).map_err(CrudError::serialization)
}

/// Exact match on every filter entry
///
/// A string filter value also matches a number or boolean field with the
/// same text, so filters taken from a query string work. Anything other than
/// an object filter matches everything.
fn matches_filters(fields: &Value, filters: &Value) -> bool {
    let Some(filters) = filters.as_object() else {
        return true;
    };

    filters.iter().all(|(key, expected)| {
        let Some(actual) = fields.get(key) else {
            return false;
        };
        if actual == expected {
            return true;
        }
        match (actual, expected) {
            (Value::Number(n), Value::String(s)) => n.to_string() == *s,
            (Value::Bool(b), Value::String(s)) => b.to_string() == *s,
            _ => false,
        }
    })
}
