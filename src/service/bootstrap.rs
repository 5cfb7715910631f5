//! Resolve partial definitions into a complete implementation set
//!
//! Three layers are overlaid, later layers winning field by field:
//!
//! 1. defaults: every operation fails with [`CrudError::NotImplemented`],
//!    `authorize` accepts, `process_data`/`postprocess_data` are identity,
//!    the not-found error is [`CrudError::NotFound`], options are empty
//! 2. the repository, when one is supplied: each operation delegates to
//!    the matching [`CrudRepository`] method
//! 3. the user's [`Definitions`]

use crate::core::{
    CreateContext, CrudContext, CrudError, CrudRepository, DeleteContext, Entity, FetchContext,
    ListContext, Operation, Options, RequestContext, UpdateContext,
};
use crate::service::definitions::{
    AuthorizeFn, CreateFn, DataHookFn, Definitions, DeleteFn, DetailFn, GetOptionsFn, HookFuture,
    ListFn, NotFoundFn, UpdateFn,
};
use futures::FutureExt;
use futures::future::ready;
use serde_json::Value;
use std::sync::Arc;

/// Fully resolved implementation set
///
/// Built once per service and only read afterwards; every call clones the
/// `Arc`s it needs, so concurrent handler calls never contend.
pub struct Implementation<T: Entity, C> {
    pub detail: DetailFn<T, C>,
    pub create: CreateFn<T, C>,
    pub update: UpdateFn<T, C>,
    pub delete: DeleteFn<T, C>,
    pub list: ListFn<T, C>,
    pub process_data: DataHookFn<T, C>,
    pub postprocess_data: DataHookFn<T, C>,
    pub authorize: AuthorizeFn<T, C>,
    pub create_not_found_error: NotFoundFn,
    pub get_options: GetOptionsFn,
}

/// Resolve `defs` into an [`Implementation`]
///
/// Pure: calling it twice with the same definitions yields equivalent sets.
pub fn bootstrap<T: Entity, C: RequestContext>(defs: &Definitions<T, C>) -> Implementation<T, C> {
    let defaults = Implementation::defaults();
    let layered = match &defs.repository {
        Some(repo) => defaults.overlay(&repository_layer(repo.clone())),
        None => defaults,
    };
    layered.overlay(defs)
}

impl<T: Entity, C: RequestContext> Implementation<T, C> {
    /// The default layer
    pub fn defaults() -> Self {
        Self {
            detail: Arc::new(|_: FetchContext<T, C>| {
                not_implemented::<Option<T>>(Operation::Detail)
            }),
            create: Arc::new(|_: CreateContext<C>| not_implemented::<T>(Operation::Create)),
            update: Arc::new(|_: UpdateContext<T, C>| not_implemented::<T>(Operation::Update)),
            delete: Arc::new(|_: DeleteContext<T, C>| not_implemented::<Value>(Operation::Delete)),
            list: Arc::new(|_: ListContext<C>| not_implemented::<Vec<T>>(Operation::List)),
            process_data: Arc::new(identity::<T, C>),
            postprocess_data: Arc::new(identity::<T, C>),
            authorize: Arc::new(accept::<T, C>),
            create_not_found_error: Arc::new(default_not_found),
            get_options: Arc::new(no_options),
        }
    }
}

impl<T: Entity, C> Implementation<T, C> {
    /// Replace every field the definitions set
    pub fn overlay(self, defs: &Definitions<T, C>) -> Self {
        Self {
            detail: defs.detail.clone().unwrap_or(self.detail),
            create: defs.create.clone().unwrap_or(self.create),
            update: defs.update.clone().unwrap_or(self.update),
            delete: defs.delete.clone().unwrap_or(self.delete),
            list: defs.list.clone().unwrap_or(self.list),
            process_data: defs.process_data.clone().unwrap_or(self.process_data),
            postprocess_data: defs.postprocess_data.clone().unwrap_or(self.postprocess_data),
            authorize: defs.authorize.clone().unwrap_or(self.authorize),
            create_not_found_error: defs
                .create_not_found_error
                .clone()
                .unwrap_or(self.create_not_found_error),
            get_options: defs.get_options.clone().unwrap_or(self.get_options),
        }
    }
}

impl<T: Entity, C> Clone for Implementation<T, C> {
    fn clone(&self) -> Self {
        Self {
            detail: self.detail.clone(),
            create: self.create.clone(),
            update: self.update.clone(),
            delete: self.delete.clone(),
            list: self.list.clone(),
            process_data: self.process_data.clone(),
            postprocess_data: self.postprocess_data.clone(),
            authorize: self.authorize.clone(),
            create_not_found_error: self.create_not_found_error.clone(),
            get_options: self.get_options.clone(),
        }
    }
}

fn not_implemented<R: Send + 'static>(operation: Operation) -> HookFuture<R> {
    ready(Err(CrudError::not_implemented(operation).into())).boxed()
}

fn identity<T: Entity, C>(data: Value, _: CrudContext<T, C>) -> HookFuture<Value> {
    ready(Ok(data)).boxed()
}

fn accept<T: Entity, C>(_: CrudContext<T, C>) -> HookFuture<()> {
    ready(Ok(())).boxed()
}

fn default_not_found() -> anyhow::Error {
    CrudError::NotFound.into()
}

fn no_options(_: Operation) -> HookFuture<Options> {
    ready(Ok(Options::new())).boxed()
}

/// Operations backed by a repository
///
/// UPDATE and DELETE address the repository with the key of the entity the
/// handler fetched, not the raw id the caller passed.
fn repository_layer<T: Entity, C: RequestContext>(
    repo: Arc<dyn CrudRepository<T>>,
) -> Definitions<T, C> {
    let mut layer = Definitions::new();

    let r = repo.clone();
    layer.detail = Some(Arc::new(move |ctx: FetchContext<T, C>| {
        let r = r.clone();
        async move { r.detail_by_id(&ctx.id, &ctx.options).await }.boxed()
    }));

    let r = repo.clone();
    layer.create = Some(Arc::new(move |ctx: CreateContext<C>| {
        let r = r.clone();
        async move { r.create(ctx.data, &ctx.options).await }.boxed()
    }));

    let r = repo.clone();
    layer.update = Some(Arc::new(move |ctx: UpdateContext<T, C>| {
        let r = r.clone();
        async move { r.update_by_id(&ctx.entity.id(), ctx.data, &ctx.options).await }.boxed()
    }));

    let r = repo.clone();
    layer.delete = Some(Arc::new(move |ctx: DeleteContext<T, C>| {
        let r = r.clone();
        async move { r.delete_by_id(&ctx.entity.id(), &ctx.options).await }.boxed()
    }));

    let r = repo;
    layer.list = Some(Arc::new(move |ctx: ListContext<C>| {
        let r = r.clone();
        async move { r.list(ctx.filters, &ctx.options).await }.boxed()
    }));

    layer
}
