//! Operation contexts
//!
//! Every handler call assembles one context describing the whole in-flight
//! operation: the caller's request context, the merged options, and the
//! operation-specific fields (id, fetched entity, payload, filters). The
//! `type`/`write`/`safe` triple is never stored; it is derived from the
//! context's type, so no caller input can override it.
//!
//! | context           | type   | write | safe  | extra fields                  |
//! |-------------------|--------|-------|-------|-------------------------------|
//! | [`DetailContext`] | DETAIL | false | true  | id, entity                    |
//! | [`CreateContext`] | CREATE | true  | false | data, bare_data               |
//! | [`UpdateContext`] | UPDATE | true  | false | id, entity, data, bare_data   |
//! | [`DeleteContext`] | DELETE | false | false | id, entity                    |
//! | [`ListContext`]   | LIST   | false | true  | filters                       |

use crate::core::{CrudError, Entity, Operation, Options};
use serde::Serialize;
use serde_json::{Map, Value};

/// Bounds every caller-supplied request context satisfies
///
/// Contexts are cloned into each hook call and serialized into the options
/// layer, so they must be cheap to clone and serializable.
pub trait RequestContext: Clone + Serialize + Send + Sync + 'static {}

impl<C: Clone + Serialize + Send + Sync + 'static> RequestContext for C {}

/// Accessors shared by every operation context
pub trait OperationContext<C> {
    /// The operation this context type is fixed to
    const OPERATION: Operation;

    /// Caller-supplied request context
    fn context(&self) -> &C;

    /// Options merged for this call
    fn options(&self) -> &Options;

    fn operation(&self) -> Operation {
        Self::OPERATION
    }

    /// True for CREATE and UPDATE
    fn is_write(&self) -> bool {
        Self::OPERATION.is_write()
    }

    /// True for DETAIL and LIST
    fn is_safe(&self) -> bool {
        Self::OPERATION.is_safe()
    }
}

/// DETAIL-tagged lookup passed to the `detail` implementation
///
/// Same shape as [`DetailContext`] minus the entity, which is what the
/// lookup is about to produce.
#[derive(Debug, Clone)]
pub struct FetchContext<T: Entity, C> {
    pub id: T::Id,
    pub context: C,
    pub options: Options,
}

#[derive(Debug, Clone)]
pub struct DetailContext<T: Entity, C> {
    pub id: T::Id,
    /// The fetched resource
    pub entity: T,
    pub context: C,
    pub options: Options,
}

#[derive(Debug, Clone)]
pub struct CreateContext<C> {
    /// Payload to persist, after `process_data`
    pub data: Value,
    /// Payload exactly as the caller sent it
    pub bare_data: Value,
    pub context: C,
    pub options: Options,
}

#[derive(Debug, Clone)]
pub struct UpdateContext<T: Entity, C> {
    pub id: T::Id,
    /// State before the update
    pub entity: T,
    /// Complete representation: the entity with the caller's attributes
    /// written over it (then passed through `process_data`)
    pub data: Value,
    /// Payload exactly as the caller sent it
    pub bare_data: Value,
    pub context: C,
    pub options: Options,
}

#[derive(Debug, Clone)]
pub struct DeleteContext<T: Entity, C> {
    pub id: T::Id,
    /// Entity about to be destroyed
    pub entity: T,
    pub context: C,
    pub options: Options,
}

#[derive(Debug, Clone)]
pub struct ListContext<C> {
    /// Query filters, after `process_data`
    pub filters: Value,
    pub context: C,
    pub options: Options,
}

macro_rules! impl_operation_context {
    ($ty:ident <T, C>, $op:expr) => {
        impl<T: Entity, C> OperationContext<C> for $ty<T, C> {
            const OPERATION: Operation = $op;

            fn context(&self) -> &C {
                &self.context
            }

            fn options(&self) -> &Options {
                &self.options
            }
        }
    };
    ($ty:ident <C>, $op:expr) => {
        impl<C> OperationContext<C> for $ty<C> {
            const OPERATION: Operation = $op;

            fn context(&self) -> &C {
                &self.context
            }

            fn options(&self) -> &Options {
                &self.options
            }
        }
    };
}

impl_operation_context!(FetchContext<T, C>, Operation::Detail);
impl_operation_context!(DetailContext<T, C>, Operation::Detail);
impl_operation_context!(CreateContext<C>, Operation::Create);
impl_operation_context!(UpdateContext<T, C>, Operation::Update);
impl_operation_context!(DeleteContext<T, C>, Operation::Delete);
impl_operation_context!(ListContext<C>, Operation::List);

/// Any operation context, tagged by operation
///
/// This is what `authorize`, `process_data` and `postprocess_data` receive;
/// match on it to recover the operation-specific fields.
#[derive(Debug, Clone)]
pub enum CrudContext<T: Entity, C> {
    Detail(DetailContext<T, C>),
    Create(CreateContext<C>),
    Update(UpdateContext<T, C>),
    Delete(DeleteContext<T, C>),
    List(ListContext<C>),
}

impl<T: Entity, C> CrudContext<T, C> {
    pub fn operation(&self) -> Operation {
        match self {
            CrudContext::Detail(ctx) => ctx.operation(),
            CrudContext::Create(ctx) => ctx.operation(),
            CrudContext::Update(ctx) => ctx.operation(),
            CrudContext::Delete(ctx) => ctx.operation(),
            CrudContext::List(ctx) => ctx.operation(),
        }
    }

    pub fn is_write(&self) -> bool {
        self.operation().is_write()
    }

    pub fn is_safe(&self) -> bool {
        self.operation().is_safe()
    }

    pub fn context(&self) -> &C {
        match self {
            CrudContext::Detail(ctx) => &ctx.context,
            CrudContext::Create(ctx) => &ctx.context,
            CrudContext::Update(ctx) => &ctx.context,
            CrudContext::Delete(ctx) => &ctx.context,
            CrudContext::List(ctx) => &ctx.context,
        }
    }

    pub fn options(&self) -> &Options {
        match self {
            CrudContext::Detail(ctx) => &ctx.options,
            CrudContext::Create(ctx) => &ctx.options,
            CrudContext::Update(ctx) => &ctx.options,
            CrudContext::Delete(ctx) => &ctx.options,
            CrudContext::List(ctx) => &ctx.options,
        }
    }

    /// Existing resource (DETAIL, UPDATE, DELETE)
    pub fn entity(&self) -> Option<&T> {
        match self {
            CrudContext::Detail(ctx) => Some(&ctx.entity),
            CrudContext::Update(ctx) => Some(&ctx.entity),
            CrudContext::Delete(ctx) => Some(&ctx.entity),
            CrudContext::Create(_) | CrudContext::List(_) => None,
        }
    }

    /// Payload to persist (CREATE, UPDATE)
    pub fn data(&self) -> Option<&Value> {
        match self {
            CrudContext::Create(ctx) => Some(&ctx.data),
            CrudContext::Update(ctx) => Some(&ctx.data),
            _ => None,
        }
    }

    /// Payload as sent by the caller (CREATE, UPDATE)
    pub fn bare_data(&self) -> Option<&Value> {
        match self {
            CrudContext::Create(ctx) => Some(&ctx.bare_data),
            CrudContext::Update(ctx) => Some(&ctx.bare_data),
            _ => None,
        }
    }

    /// Query filters (LIST)
    pub fn filters(&self) -> Option<&Value> {
        match self {
            CrudContext::List(ctx) => Some(&ctx.filters),
            _ => None,
        }
    }
}

impl<T: Entity, C: Serialize> CrudContext<T, C> {
    /// JSON view of the context using the wire field names
    /// (`type`, `write`, `safe`, `context`, `options`, `id`, `entity`,
    /// `data`, `bareData`, `filters`)
    pub fn to_json(&self) -> Result<Value, CrudError> {
        let mut map = Map::new();
        map.insert("type".into(), Value::String(self.operation().as_str().into()));
        map.insert("write".into(), Value::Bool(self.is_write()));
        map.insert("safe".into(), Value::Bool(self.is_safe()));
        map.insert("context".into(), to_value(self.context())?);
        map.insert("options".into(), Value::Object(self.options().clone()));

        let id = match self {
            CrudContext::Detail(ctx) => Some(to_value(&ctx.id)?),
            CrudContext::Update(ctx) => Some(to_value(&ctx.id)?),
            CrudContext::Delete(ctx) => Some(to_value(&ctx.id)?),
            CrudContext::Create(_) | CrudContext::List(_) => None,
        };
        if let Some(id) = id {
            map.insert("id".into(), id);
        }
        if let Some(entity) = self.entity() {
            map.insert("entity".into(), to_value(entity)?);
        }
        if let Some(data) = self.data() {
            map.insert("data".into(), data.clone());
        }
        if let Some(bare) = self.bare_data() {
            map.insert("bareData".into(), bare.clone());
        }
        if let Some(filters) = self.filters() {
            map.insert("filters".into(), filters.clone());
        }
        Ok(Value::Object(map))
    }
}

fn to_value<V: Serialize + ?Sized>(value: &V) -> Result<Value, CrudError> {
    serde_json::to_value(value).map_err(CrudError::serialization)
}

macro_rules! impl_from_variant {
    ($variant:ident, $ty:ty) => {
        impl<T: Entity, C> From<$ty> for CrudContext<T, C> {
            fn from(ctx: $ty) -> Self {
                CrudContext::$variant(ctx)
            }
        }
    };
}

impl_from_variant!(Detail, DetailContext<T, C>);
impl_from_variant!(Create, CreateContext<C>);
impl_from_variant!(Update, UpdateContext<T, C>);
impl_from_variant!(Delete, DeleteContext<T, C>);
impl_from_variant!(List, ListContext<C>);

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Dog {
        id: u64,
        name: String,
    }

    impl Entity for Dog {
        type Id = u64;

        fn resource_name() -> &'static str {
            "dogs"
        }

        fn id(&self) -> u64 {
            self.id
        }
    }

    fn dog() -> Dog {
        Dog {
            id: 7,
            name: "pongo".into(),
        }
    }

    #[test]
    fn test_flags_follow_variant() {
        let delete: CrudContext<Dog, ()> = DeleteContext {
            id: 7,
            entity: dog(),
            context: (),
            options: Options::new(),
        }
        .into();
        assert_eq!(delete.operation(), Operation::Delete);
        assert!(!delete.is_write());
        assert!(!delete.is_safe());

        let list: CrudContext<Dog, ()> = ListContext {
            filters: json!({}),
            context: (),
            options: Options::new(),
        }
        .into();
        assert!(list.is_safe());
        assert!(list.entity().is_none());
        assert_eq!(list.filters(), Some(&json!({})));
    }

    #[test]
    fn test_fetch_context_is_detail_tagged() {
        let fetch: FetchContext<Dog, ()> = FetchContext {
            id: 1,
            context: (),
            options: Options::new(),
        };
        assert_eq!(fetch.operation(), Operation::Detail);
        assert!(fetch.is_safe());
        assert!(!fetch.is_write());
    }

    #[test]
    fn test_to_json_uses_wire_names() {
        let ctx: CrudContext<Dog, _> = UpdateContext {
            id: 7,
            entity: dog(),
            data: json!({"id": 7, "name": "perdita"}),
            bare_data: json!({"name": "perdita"}),
            context: json!({"user": "roger"}),
            options: Options::new(),
        }
        .into();

        let value = ctx.to_json().unwrap();
        assert_eq!(value["type"], json!("UPDATE"));
        assert_eq!(value["write"], json!(true));
        assert_eq!(value["safe"], json!(false));
        assert_eq!(value["id"], json!(7));
        assert_eq!(value["entity"], json!({"id": 7, "name": "pongo"}));
        assert_eq!(value["bareData"], json!({"name": "perdita"}));
        assert_eq!(value["context"]["user"], json!("roger"));
        assert!(value.get("filters").is_none());
    }
}
