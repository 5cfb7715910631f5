//! Repository contract consumed by the bootstrap's repository layer

use crate::core::{Entity, Options};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Storage adapter covering all five operations
///
/// Supplying a repository to [`Definitions`](crate::service::Definitions)
/// fills every operation the definitions leave empty with a thin call into
/// the matching method. The framework is agnostic to the underlying storage
/// mechanism.
#[async_trait]
pub trait CrudRepository<T: Entity>: Send + Sync {
    /// Find an entity by key; `None` when it does not exist
    async fn detail_by_id(&self, id: &T::Id, options: &Options) -> Result<Option<T>>;

    /// Persist a new entity from a payload
    async fn create(&self, data: Value, options: &Options) -> Result<T>;

    /// Replace an entity with a complete representation
    async fn update_by_id(&self, id: &T::Id, data: Value, options: &Options) -> Result<T>;

    /// Destroy an entity
    async fn delete_by_id(&self, id: &T::Id, options: &Options) -> Result<Value>;

    /// List entities matching filters
    async fn list(&self, filters: Value, options: &Options) -> Result<Vec<T>>;
}
