//! Axum routes for a generated service
//!
//! - `GET    {resource}`        list (query string as filters)
//! - `POST   {resource}`        create (JSON body)
//! - `GET    {resource}/{id}`   detail
//! - `PUT    {resource}/{id}`   update (JSON body)
//! - `DELETE {resource}/{id}`   delete
//!
//! Only the operations allowed by the [`ServiceConfig`] are mounted.

use crate::config::ServiceConfig;
use crate::core::{Entity, Operation, RequestContext};
use crate::server::error::ApiError;
use crate::service::{
    CreateHandler, CrudService, DeleteHandler, DetailHandler, ListHandler, UpdateHandler,
};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::MethodRouter;
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds the request context from the incoming headers
pub type ContextExtractor<C> = Arc<dyn Fn(&HeaderMap) -> C + Send + Sync>;

/// Exposes a [`CrudService`] as an axum [`Router`]
///
/// ```rust,ignore
/// let app = CrudRouter::new(service, ServiceConfig::new("/dalmatians"))
///     .with_context(|headers| Session::from_headers(headers))
///     .into_router();
/// ```
pub struct CrudRouter<T: Entity, C> {
    service: CrudService<T, C>,
    config: ServiceConfig,
    context: ContextExtractor<C>,
}

impl<T: Entity, C: RequestContext + Default> CrudRouter<T, C> {
    /// Router whose request context is always `C::default()`
    pub fn new(service: CrudService<T, C>, config: ServiceConfig) -> Self {
        Self {
            service,
            config,
            context: Arc::new(|_| C::default()),
        }
    }
}

impl<T, C> CrudRouter<T, C>
where
    T: Entity,
    T::Id: DeserializeOwned,
    C: RequestContext,
{
    /// Derive the request context from the request headers
    pub fn with_context(
        mut self,
        extractor: impl Fn(&HeaderMap) -> C + Send + Sync + 'static,
    ) -> Self {
        self.context = Arc::new(extractor);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn into_router(self) -> Router {
        let config = &self.config;
        let state = RouteState {
            detail: self.service.detail_handler(config.options_for(Operation::Detail)),
            create: self.service.create_handler(config.options_for(Operation::Create)),
            update: self.service.update_handler(config.options_for(Operation::Update)),
            delete: self.service.delete_handler(config.options_for(Operation::Delete)),
            list: self.service.list_handler(config.options_for(Operation::List)),
            context: self.context.clone(),
        };

        let mut mounted = Vec::new();
        let mut collection: MethodRouter<RouteState<T, C>> = MethodRouter::new();
        let mut item: MethodRouter<RouteState<T, C>> = MethodRouter::new();

        if config.allows(Operation::List) {
            collection = collection.get(list_entities::<T, C>);
            mounted.push(Operation::List);
        }
        if config.allows(Operation::Create) {
            collection = collection.post(create_entity::<T, C>);
            mounted.push(Operation::Create);
        }
        if config.allows(Operation::Detail) {
            item = item.get(detail_entity::<T, C>);
            mounted.push(Operation::Detail);
        }
        if config.allows(Operation::Update) {
            item = item.put(update_entity::<T, C>);
            mounted.push(Operation::Update);
        }
        if config.allows(Operation::Delete) {
            item = item.delete(delete_entity::<T, C>);
            mounted.push(Operation::Delete);
        }

        let mut router = Router::new();
        if mounted.iter().any(|op| matches!(op, Operation::List | Operation::Create)) {
            router = router.route(&config.collection_path(), collection);
        }
        if mounted.iter().any(|op| {
            matches!(op, Operation::Detail | Operation::Update | Operation::Delete)
        }) {
            router = router.route(&config.item_path(), item);
        }

        tracing::info!(
            resource = T::resource_name(),
            path = %config.collection_path(),
            operations = ?mounted,
            "crud routes mounted"
        );

        router.with_state(state)
    }
}

impl<T, C> From<CrudRouter<T, C>> for Router
where
    T: Entity,
    T::Id: DeserializeOwned,
    C: RequestContext,
{
    fn from(router: CrudRouter<T, C>) -> Self {
        router.into_router()
    }
}

/// Handlers shared by every route of one service
struct RouteState<T: Entity, C> {
    detail: DetailHandler<T, C>,
    create: CreateHandler<T, C>,
    update: UpdateHandler<T, C>,
    delete: DeleteHandler<T, C>,
    list: ListHandler<T, C>,
    context: ContextExtractor<C>,
}

impl<T: Entity, C> Clone for RouteState<T, C> {
    fn clone(&self) -> Self {
        Self {
            detail: self.detail.clone(),
            create: self.create.clone(),
            update: self.update.clone(),
            delete: self.delete.clone(),
            list: self.list.clone(),
            context: self.context.clone(),
        }
    }
}

async fn detail_entity<T, C>(
    State(state): State<RouteState<T, C>>,
    Path(id): Path<T::Id>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError>
where
    T: Entity,
    T::Id: DeserializeOwned,
    C: RequestContext,
{
    let context = (state.context)(&headers);
    let entity = state.detail.call(id, context).await?;
    Ok(Json(entity))
}

async fn create_entity<T, C>(
    State(state): State<RouteState<T, C>>,
    headers: HeaderMap,
    Json(data): Json<Value>,
) -> Result<Json<Value>, ApiError>
where
    T: Entity,
    T::Id: DeserializeOwned,
    C: RequestContext,
{
    let context = (state.context)(&headers);
    let created = state.create.call(data, context).await?;
    Ok(Json(created))
}

async fn update_entity<T, C>(
    State(state): State<RouteState<T, C>>,
    Path(id): Path<T::Id>,
    headers: HeaderMap,
    Json(data): Json<Value>,
) -> Result<Json<Value>, ApiError>
where
    T: Entity,
    T::Id: DeserializeOwned,
    C: RequestContext,
{
    let context = (state.context)(&headers);
    let updated = state.update.call(id, data, context).await?;
    Ok(Json(updated))
}

async fn delete_entity<T, C>(
    State(state): State<RouteState<T, C>>,
    Path(id): Path<T::Id>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError>
where
    T: Entity,
    T::Id: DeserializeOwned,
    C: RequestContext,
{
    let context = (state.context)(&headers);
    let deleted = state.delete.call(id, context).await?;
    Ok(Json(deleted))
}

async fn list_entities<T, C>(
    State(state): State<RouteState<T, C>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError>
where
    T: Entity,
    T::Id: DeserializeOwned,
    C: RequestContext,
{
    let filters = Value::Object(
        query
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
    );
    let context = (state.context)(&headers);
    let entities = state.list.call(filters, context).await?;
    Ok(Json(entities))
}
