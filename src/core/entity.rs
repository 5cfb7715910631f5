//! Entity trait defining the resource managed by one generated service

use serde::Serialize;
use std::fmt::Debug;

/// A domain resource managed by a [`CrudService`](crate::service::CrudService).
///
/// Entities only need a key and a JSON representation: the key is what the
/// detail/update/delete handlers are addressed with, and the JSON form is
/// what UPDATE merges incoming payloads into.
pub trait Entity: Clone + Serialize + Send + Sync + 'static {
    /// Type of the key field (e.g. `Uuid`, `u64`)
    type Id: Clone + Debug + PartialEq + Serialize + Send + Sync + 'static;

    /// Name of the key field in the JSON representation
    const ID_FIELD: &'static str = "id";

    /// Resource name used in logs and routes (e.g., "dalmatians")
    fn resource_name() -> &'static str;

    /// Get the key of this entity instance
    fn id(&self) -> Self::Id;
}
