//! Handler orchestration
//!
//! Each handler runs the same pipeline, every step awaited before the next:
//!
//! ```text
//! resolve options ─▶ [safe fetch] ─▶ forge context ─▶ [process data]
//!                 ─▶ authorize ─▶ implementation ─▶ postprocess ─▶ result
//! ```
//!
//! Fetching (UPDATE, DELETE, DETAIL) and data processing (CREATE, UPDATE,
//! LIST) happen before `authorize`, because the context must be complete
//! before it can be judged. A denied call therefore may already have
//! performed the lookup and run `process_data`; it never reaches the
//! implementation call.

use crate::core::forge::{
    forge_create_context, forge_delete_context, forge_detail_context, forge_fetch_context,
    forge_list_context, forge_update_context,
};
use crate::core::options::context_options;
use crate::core::{
    CrudContext, CrudError, Entity, Operation, Options, RequestContext, merge_options,
};
use crate::service::bootstrap::Implementation;
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Factory for the five handlers of one service
pub struct Handlers<T: Entity, C> {
    implementation: Arc<Implementation<T, C>>,
}

impl<T: Entity, C: RequestContext> Handlers<T, C> {
    pub fn new(implementation: Implementation<T, C>) -> Self {
        Self {
            implementation: Arc::new(implementation),
        }
    }

    /// The resolved implementation set backing these handlers
    pub fn implementation(&self) -> &Implementation<T, C> {
        &self.implementation
    }

    pub fn detail_handler(&self, options: Options) -> DetailHandler<T, C> {
        DetailHandler {
            implementation: self.implementation.clone(),
            options,
        }
    }

    pub fn create_handler(&self, options: Options) -> CreateHandler<T, C> {
        CreateHandler {
            implementation: self.implementation.clone(),
            options,
        }
    }

    pub fn update_handler(&self, options: Options) -> UpdateHandler<T, C> {
        UpdateHandler {
            implementation: self.implementation.clone(),
            options,
        }
    }

    pub fn delete_handler(&self, options: Options) -> DeleteHandler<T, C> {
        DeleteHandler {
            implementation: self.implementation.clone(),
            options,
        }
    }

    pub fn list_handler(&self, options: Options) -> ListHandler<T, C> {
        ListHandler {
            implementation: self.implementation.clone(),
            options,
        }
    }
}

impl<T: Entity, C> Clone for Handlers<T, C> {
    fn clone(&self) -> Self {
        Self {
            implementation: self.implementation.clone(),
        }
    }
}

macro_rules! handler_struct {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<T: Entity, C> {
            implementation: Arc<Implementation<T, C>>,
            options: Options,
        }

        impl<T: Entity, C> $name<T, C> {
            /// Static options given to the factory
            pub fn options(&self) -> &Options {
                &self.options
            }
        }

        impl<T: Entity, C> Clone for $name<T, C> {
            fn clone(&self) -> Self {
                Self {
                    implementation: self.implementation.clone(),
                    options: self.options.clone(),
                }
            }
        }
    };
}

handler_struct!(
    /// `(id, context) -> entity`
    DetailHandler
);
handler_struct!(
    /// `(data, context) -> created entity`
    CreateHandler
);
handler_struct!(
    /// `(id, data, context) -> updated entity`
    UpdateHandler
);
handler_struct!(
    /// `(id, context) -> whatever the delete implementation returns`
    DeleteHandler
);
handler_struct!(
    /// `(filters, context) -> entities`
    ListHandler
);

impl<T: Entity, C: RequestContext> DetailHandler<T, C> {
    pub async fn call(&self, id: T::Id, context: C) -> Result<Value> {
        let imp = &*self.implementation;
        let options = resolve_options(imp, Operation::Detail, &self.options, &context).await?;
        let entity = safe_detail(imp, id.clone(), context.clone(), options.clone()).await?;

        let ctx = forge_detail_context(id, entity, context, options);
        authorize(imp, ctx.clone().into()).await?;

        let result = to_json(&ctx.entity)?;
        completed::<T>(Operation::Detail);
        (imp.postprocess_data)(result, ctx.into()).await
    }
}

impl<T: Entity, C: RequestContext> CreateHandler<T, C> {
    pub async fn call(&self, data: Value, context: C) -> Result<Value> {
        let imp = &*self.implementation;
        let options = resolve_options(imp, Operation::Create, &self.options, &context).await?;

        let mut ctx = forge_create_context(data, context, options);
        ctx.data = (imp.process_data)(ctx.data.clone(), ctx.clone().into()).await?;
        authorize(imp, ctx.clone().into()).await?;

        let created = (imp.create)(ctx.clone()).await?;
        completed::<T>(Operation::Create);
        (imp.postprocess_data)(to_json(&created)?, ctx.into()).await
    }
}

impl<T: Entity, C: RequestContext> UpdateHandler<T, C> {
    pub async fn call(&self, id: T::Id, data: Value, context: C) -> Result<Value> {
        let imp = &*self.implementation;
        let options = resolve_options(imp, Operation::Update, &self.options, &context).await?;
        let entity = safe_detail(imp, id.clone(), context.clone(), options.clone()).await?;

        let mut ctx = forge_update_context(id, entity, data, context, options)?;
        ctx.data = (imp.process_data)(ctx.data.clone(), ctx.clone().into()).await?;
        authorize(imp, ctx.clone().into()).await?;

        let updated = (imp.update)(ctx.clone()).await?;
        completed::<T>(Operation::Update);
        (imp.postprocess_data)(to_json(&updated)?, ctx.into()).await
    }
}

impl<T: Entity, C: RequestContext> DeleteHandler<T, C> {
    pub async fn call(&self, id: T::Id, context: C) -> Result<Value> {
        let imp = &*self.implementation;
        let options = resolve_options(imp, Operation::Delete, &self.options, &context).await?;
        let entity = safe_detail(imp, id.clone(), context.clone(), options.clone()).await?;

        let ctx = forge_delete_context(id, entity, context, options);
        authorize(imp, ctx.clone().into()).await?;

        let deleted = (imp.delete)(ctx.clone()).await?;
        completed::<T>(Operation::Delete);
        (imp.postprocess_data)(deleted, ctx.into()).await
    }
}

impl<T: Entity, C: RequestContext> ListHandler<T, C> {
    pub async fn call(&self, filters: Value, context: C) -> Result<Value> {
        let imp = &*self.implementation;
        let options = resolve_options(imp, Operation::List, &self.options, &context).await?;

        let mut ctx = forge_list_context(filters, context, options);
        ctx.filters = (imp.process_data)(ctx.filters.clone(), ctx.clone().into()).await?;
        authorize(imp, ctx.clone().into()).await?;

        let entities = (imp.list)(ctx.clone()).await?;
        completed::<T>(Operation::List);
        (imp.postprocess_data)(to_json(&entities)?, ctx.into()).await
    }
}

/// `get_options(operation)` < static options < request context
async fn resolve_options<T: Entity, C: RequestContext>(
    imp: &Implementation<T, C>,
    operation: Operation,
    fixed: &Options,
    context: &C,
) -> Result<Options> {
    let dynamic = (imp.get_options)(operation).await?;
    let options = merge_options([dynamic, fixed.clone(), context_options(context)?]);
    tracing::debug!(
        resource = T::resource_name(),
        operation = %operation,
        keys = options.len(),
        "options resolved"
    );
    Ok(options)
}

/// Run the `detail` implementation and turn an empty result into the
/// configured not-found error
async fn safe_detail<T: Entity, C: RequestContext>(
    imp: &Implementation<T, C>,
    id: T::Id,
    context: C,
    options: Options,
) -> Result<T> {
    match (imp.detail)(forge_fetch_context(id.clone(), context, options)).await? {
        Some(entity) => {
            tracing::debug!(resource = T::resource_name(), id = ?id, "entity fetched");
            Ok(entity)
        }
        None => {
            tracing::debug!(resource = T::resource_name(), id = ?id, "lookup returned nothing");
            Err((imp.create_not_found_error)())
        }
    }
}

/// Run the `authorize` hook; the full context is traced when enabled
async fn authorize<T: Entity, C: RequestContext>(
    imp: &Implementation<T, C>,
    ctx: CrudContext<T, C>,
) -> Result<()> {
    let operation = ctx.operation();
    if tracing::enabled!(tracing::Level::TRACE) {
        match ctx.to_json() {
            Ok(json) => {
                tracing::trace!(resource = T::resource_name(), context = %json, "authorizing")
            }
            Err(err) => {
                tracing::trace!(resource = T::resource_name(), error = %err, "authorizing")
            }
        }
    }

    (imp.authorize)(ctx).await?;
    tracing::debug!(resource = T::resource_name(), operation = %operation, "authorized");
    Ok(())
}

fn completed<T: Entity>(operation: Operation) {
    tracing::debug!(
        resource = T::resource_name(),
        operation = %operation,
        "implementation completed"
    );
}

fn to_json<V: Serialize + ?Sized>(value: &V) -> Result<Value, CrudError> {
    serde_json::to_value(value).map_err(CrudError::serialization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::options_from;
    use crate::service::bootstrap::bootstrap;
    use crate::service::definitions::Definitions;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Person {
        id: u32,
        name: String,
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

    fn handlers(defs: Definitions<Person, Value>) -> Handlers<Person, Value> {
        Handlers::new(bootstrap(&defs))
    }

    #[tokio::test]
    async fn test_detail_passes_merged_options_and_id() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let spy = seen.clone();
        let defs = Definitions::<Person, Value>::new()
            .get_options(|_| async { Ok(options_from(json!({"a": 1, "b": 1, "c": 1}))) })
            .detail(move |ctx| {
                spy.lock().unwrap().push((ctx.id, ctx.options.clone()));
                async move {
                    Ok(Some(Person {
                        id: ctx.id,
                        name: "john".into(),
                    }))
                }
            });

        let handler = handlers(defs)
            .detail_handler(options_from(json!({"b": 2, "d": 2})));
        let result = handler.call(5, json!({"c": 3, "e": 3})).await.unwrap();

        assert_eq!(result, json!({"id": 5, "name": "john"}));
        let calls = seen.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, 5);
        assert_eq!(
            Value::Object(calls[0].1.clone()),
            json!({"a": 1, "b": 2, "c": 3, "d": 2, "e": 3})
        );
    }

    #[tokio::test]
    async fn test_postprocess_shapes_result() {
        let defs = Definitions::<Person, Value>::new()
            .create(|ctx| async move {
                let mut person: Person = serde_json::from_value(ctx.data)?;
                person.id = 9;
                Ok(person)
            })
            .postprocess_data(|mut data, ctx| async move {
                data["operation"] = json!(ctx.operation().as_str());
                Ok(data)
            });

        let result = handlers(defs)
            .create_handler(Options::new())
            .call(json!({"id": 0, "name": "X"}), json!({}))
            .await
            .unwrap();

        assert_eq!(result, json!({"id": 9, "name": "X", "operation": "CREATE"}));
    }

    #[tokio::test]
    async fn test_list_processes_filters_before_listing() {
        let defs = Definitions::<Person, Value>::new()
            .process_data(|mut filters, _| async move {
                filters["active"] = json!(true);
                Ok(filters)
            })
            .list(|ctx| async move {
                assert_eq!(ctx.filters, json!({"name": "X", "active": true}));
                Ok(vec![])
            });

        let result = handlers(defs)
            .list_handler(Options::new())
            .call(json!({"name": "X"}), Value::Null)
            .await
            .unwrap();
        assert_eq!(result, json!([]));
    }
}
