//! User-supplied service definitions
//!
//! A [`Definitions`] value is the partial description of a service: any
//! subset of the five operation implementations, an optional repository, and
//! the cross-cutting hooks. Nothing is required; whatever is left empty is
//! filled by [`bootstrap`](crate::service::bootstrap) from the repository
//! layer or the defaults.
//!
//! # Example
//!
//! ```rust,ignore
//! let defs = Definitions::<Dog, Session>::new()
//!     .detail(|ctx| async move { store.find(ctx.id).await })
//!     .authorize(|ctx| async move {
//!         if ctx.is_safe() || ctx.context().is_admin {
//!             Ok(())
//!         } else {
//!             Err(anyhow::anyhow!("forbidden"))
//!         }
//!     });
//! ```

use crate::core::{
    CreateContext, CrudContext, CrudRepository, DeleteContext, Entity, FetchContext, ListContext,
    Operation, Options, RequestContext, UpdateContext,
};
use anyhow::Result;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Boxed future returned by every hook and implementation
pub type HookFuture<R> = BoxFuture<'static, Result<R>>;

/// Find an entity by id; `None` means "not found"
pub type DetailFn<T, C> = Arc<dyn Fn(FetchContext<T, C>) -> HookFuture<Option<T>> + Send + Sync>;
pub type CreateFn<T, C> = Arc<dyn Fn(CreateContext<C>) -> HookFuture<T> + Send + Sync>;
pub type UpdateFn<T, C> = Arc<dyn Fn(UpdateContext<T, C>) -> HookFuture<T> + Send + Sync>;
pub type DeleteFn<T, C> = Arc<dyn Fn(DeleteContext<T, C>) -> HookFuture<Value> + Send + Sync>;
pub type ListFn<T, C> = Arc<dyn Fn(ListContext<C>) -> HookFuture<Vec<T>> + Send + Sync>;

/// Reject access by returning an error; the error reaches the caller as-is
pub type AuthorizeFn<T, C> = Arc<dyn Fn(CrudContext<T, C>) -> HookFuture<()> + Send + Sync>;

/// Transform a value (payload, filters, or result) in the light of its context
pub type DataHookFn<T, C> =
    Arc<dyn Fn(Value, CrudContext<T, C>) -> HookFuture<Value> + Send + Sync>;

/// Produce the error returned when a lookup comes back empty
pub type NotFoundFn = Arc<dyn Fn() -> anyhow::Error + Send + Sync>;

/// Options derived per operation, merged below static and context options
pub type GetOptionsFn = Arc<dyn Fn(Operation) -> HookFuture<Options> + Send + Sync>;

/// Partial service definition
pub struct Definitions<T: Entity, C> {
    pub detail: Option<DetailFn<T, C>>,
    pub create: Option<CreateFn<T, C>>,
    pub update: Option<UpdateFn<T, C>>,
    pub delete: Option<DeleteFn<T, C>>,
    pub list: Option<ListFn<T, C>>,
    pub repository: Option<Arc<dyn CrudRepository<T>>>,
    /// Called on CREATE/UPDATE data and LIST filters before authorization
    pub process_data: Option<DataHookFn<T, C>>,
    /// Called on every result before it is returned
    pub postprocess_data: Option<DataHookFn<T, C>>,
    pub authorize: Option<AuthorizeFn<T, C>>,
    pub create_not_found_error: Option<NotFoundFn>,
    pub get_options: Option<GetOptionsFn>,
}

impl<T: Entity, C> Definitions<T, C> {
    /// Empty definitions: every operation falls through to the defaults
    pub fn new() -> Self {
        Self {
            detail: None,
            create: None,
            update: None,
            delete: None,
            list: None,
            repository: None,
            process_data: None,
            postprocess_data: None,
            authorize: None,
            create_not_found_error: None,
            get_options: None,
        }
    }

    /// Field-wise overlay: anything set in `over` replaces the value here
    pub fn merge(self, over: Definitions<T, C>) -> Self {
        Self {
            detail: over.detail.or(self.detail),
            create: over.create.or(self.create),
            update: over.update.or(self.update),
            delete: over.delete.or(self.delete),
            list: over.list.or(self.list),
            repository: over.repository.or(self.repository),
            process_data: over.process_data.or(self.process_data),
            postprocess_data: over.postprocess_data.or(self.postprocess_data),
            authorize: over.authorize.or(self.authorize),
            create_not_found_error: over.create_not_found_error.or(self.create_not_found_error),
            get_options: over.get_options.or(self.get_options),
        }
    }

    /// True when the operation has an explicit implementation here
    /// (the repository is not taken into account)
    pub fn implements(&self, operation: Operation) -> bool {
        match operation {
            Operation::Detail => self.detail.is_some(),
            Operation::Create => self.create.is_some(),
            Operation::Update => self.update.is_some(),
            Operation::Delete => self.delete.is_some(),
            Operation::List => self.list.is_some(),
        }
    }

    pub fn with_repository(mut self, repository: impl CrudRepository<T> + 'static) -> Self {
        self.repository = Some(Arc::new(repository));
        self
    }

    pub fn with_shared_repository(mut self, repository: Arc<dyn CrudRepository<T>>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Custom not-found error; any error type is accepted and returned as-is
    pub fn create_not_found_error<F>(mut self, f: F) -> Self
    where
        F: Fn() -> anyhow::Error + Send + Sync + 'static,
    {
        self.create_not_found_error = Some(Arc::new(f));
        self
    }

    pub fn get_options<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Operation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Options>> + Send + 'static,
    {
        self.get_options = Some(Arc::new(move |op| f(op).boxed()));
        self
    }
}

impl<T: Entity, C: RequestContext> Definitions<T, C> {
    pub fn detail<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(FetchContext<T, C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<T>>> + Send + 'static,
    {
        self.detail = Some(Arc::new(move |ctx| f(ctx).boxed()));
        self
    }

    pub fn create<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(CreateContext<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.create = Some(Arc::new(move |ctx| f(ctx).boxed()));
        self
    }

    pub fn update<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(UpdateContext<T, C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.update = Some(Arc::new(move |ctx| f(ctx).boxed()));
        self
    }

    pub fn delete<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(DeleteContext<T, C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.delete = Some(Arc::new(move |ctx| f(ctx).boxed()));
        self
    }

    pub fn list<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ListContext<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
    {
        self.list = Some(Arc::new(move |ctx| f(ctx).boxed()));
        self
    }

    pub fn authorize<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(CrudContext<T, C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.authorize = Some(Arc::new(move |ctx| f(ctx).boxed()));
        self
    }

    pub fn process_data<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Value, CrudContext<T, C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.process_data = Some(Arc::new(move |data, ctx| f(data, ctx).boxed()));
        self
    }

    pub fn postprocess_data<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Value, CrudContext<T, C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.postprocess_data = Some(Arc::new(move |data, ctx| f(data, ctx).boxed()));
        self
    }
}

impl<T: Entity, C> Default for Definitions<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity, C> Clone for Definitions<T, C> {
    fn clone(&self) -> Self {
        Self {
            detail: self.detail.clone(),
            create: self.create.clone(),
            update: self.update.clone(),
            delete: self.delete.clone(),
            list: self.list.clone(),
            repository: self.repository.clone(),
            process_data: self.process_data.clone(),
            postprocess_data: self.postprocess_data.clone(),
            authorize: self.authorize.clone(),
            create_not_found_error: self.create_not_found_error.clone(),
            get_options: self.get_options.clone(),
        }
    }
}

impl<T: Entity, C> fmt::Debug for Definitions<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definitions")
            .field("resource", &T::resource_name())
            .field("detail", &self.detail.is_some())
            .field("create", &self.create.is_some())
            .field("update", &self.update.is_some())
            .field("delete", &self.delete.is_some())
            .field("list", &self.list.is_some())
            .field("repository", &self.repository.is_some())
            .field("process_data", &self.process_data.is_some())
            .field("postprocess_data", &self.postprocess_data.is_some())
            .field("authorize", &self.authorize.is_some())
            .field("create_not_found_error", &self.create_not_found_error.is_some())
            .field("get_options", &self.get_options.is_some())
            .finish()
    }
}
