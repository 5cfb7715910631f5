//! Constructors stamping an operation onto a partial context
//!
//! The handlers never build contexts by hand; they go through these so the
//! operation-specific invariants hold in one place. The only one with logic
//! is [`forge_update_context`], which always recomputes `data` as the fetched
//! entity with the caller's attributes written over it.

use crate::core::options::merge_objects;
use crate::core::{
    CreateContext, CrudError, DeleteContext, DetailContext, Entity, FetchContext, ListContext,
    Options, UpdateContext,
};
use serde_json::Value;

pub fn forge_fetch_context<T: Entity, C>(
    id: T::Id,
    context: C,
    options: Options,
) -> FetchContext<T, C> {
    FetchContext {
        id,
        context,
        options,
    }
}

pub fn forge_detail_context<T: Entity, C>(
    id: T::Id,
    entity: T,
    context: C,
    options: Options,
) -> DetailContext<T, C> {
    DetailContext {
        id,
        entity,
        context,
        options,
    }
}

/// `bare_data` keeps the payload as sent; `data` starts out identical and is
/// later replaced by the processed payload.
pub fn forge_create_context<C>(data: Value, context: C, options: Options) -> CreateContext<C> {
    CreateContext {
        bare_data: data.clone(),
        data,
        context,
        options,
    }
}

/// `data` becomes `merge(entity, data)`: attributes the caller omitted keep
/// their stored value. Callers never pre-merge.
///
/// Fails only if the entity cannot be represented as JSON.
pub fn forge_update_context<T: Entity, C>(
    id: T::Id,
    entity: T,
    data: Value,
    context: C,
    options: Options,
) -> Result<UpdateContext<T, C>, CrudError> {
    let current = serde_json::to_value(&entity).map_err(CrudError::serialization)?;
    Ok(UpdateContext {
        id,
        data: merge_objects(&current, &data),
        bare_data: data,
        entity,
        context,
        options,
    })
}

pub fn forge_delete_context<T: Entity, C>(
    id: T::Id,
    entity: T,
    context: C,
    options: Options,
) -> DeleteContext<T, C> {
    DeleteContext {
        id,
        entity,
        context,
        options,
    }
}

pub fn forge_list_context<C>(filters: Value, context: C, options: Options) -> ListContext<C> {
    ListContext {
        filters,
        context,
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CrudContext, Operation, OperationContext};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Person {
        id: u32,
        name: String,
        age: u32,
    }

    impl Entity for Person {
        type Id = u32;

        fn resource_name() -> &'static str {
            "people"
        }

        fn id(&self) -> u32 {
            self.id
        }
    }

    fn john() -> Person {
        Person {
            id: 2,
            name: "john".into(),
            age: 40,
        }
    }

    #[test]
    fn test_update_merges_payload_over_entity() {
        let ctx = forge_update_context::<Person, ()>(
            2,
            john(),
            json!({"name": "jane"}),
            (),
            Options::new(),
        )
        .unwrap();

        assert_eq!(ctx.data, json!({"id": 2, "name": "jane", "age": 40}));
        assert_eq!(ctx.bare_data, json!({"name": "jane"}));
        assert_eq!(ctx.entity, john());
        assert_eq!(ctx.operation(), Operation::Update);
        assert!(ctx.is_write());
    }

    #[test]
    fn test_update_with_empty_payload_keeps_entity() {
        let ctx =
            forge_update_context::<Person, ()>(2, john(), json!({}), (), Options::new()).unwrap();
        assert_eq!(ctx.data, serde_json::to_value(john()).unwrap());
    }

    #[test]
    fn test_create_keeps_bare_data() {
        let ctx = forge_create_context(json!({"name": "X"}), (), Options::new());
        assert_eq!(ctx.data, ctx.bare_data);
        assert_eq!(ctx.operation(), Operation::Create);
    }

    #[test]
    fn test_each_forge_stamps_its_operation() {
        let detail: CrudContext<Person, ()> =
            forge_detail_context(2, john(), (), Options::new()).into();
        let delete: CrudContext<Person, ()> =
            forge_delete_context(2, john(), (), Options::new()).into();
        let list: CrudContext<Person, ()> =
            forge_list_context(json!({"nice": true}), (), Options::new()).into();

        assert_eq!(detail.operation(), Operation::Detail);
        assert_eq!(delete.operation(), Operation::Delete);
        assert_eq!(list.operation(), Operation::List);
        assert_eq!(
            forge_fetch_context::<Person, ()>(2, (), Options::new()).operation(),
            Operation::Detail
        );
    }
}
