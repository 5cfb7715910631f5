//! Service facade and composable definitions
//!
//! # Example
//!
//! ```rust,ignore
//! let service = CrudService::new(
//!     Definitions::<Dog, Session>::new()
//!         .with_repository(InMemoryRepository::sequential())
//!         .authorize(|ctx| async move { check(&ctx).await }),
//! );
//!
//! let detail = service.detail_handler(Options::new());
//! let dog = detail.call(101, session).await?;
//! ```

use crate::core::{Entity, Options, RequestContext};
use crate::service::bootstrap::{Implementation, bootstrap};
use crate::service::definitions::Definitions;
use crate::service::handlers::{
    CreateHandler, DeleteHandler, DetailHandler, Handlers, ListHandler, UpdateHandler,
};

/// A generated CRUD service for one entity type
///
/// The implementation set is resolved once at construction; handlers created
/// afterwards share it read-only and may be called concurrently.
pub struct CrudService<T: Entity, C> {
    definitions: Definitions<T, C>,
    handlers: Handlers<T, C>,
}

impl<T: Entity, C: RequestContext> CrudService<T, C> {
    pub fn new(definitions: Definitions<T, C>) -> Self {
        let handlers = Handlers::new(bootstrap(&definitions));
        tracing::debug!(
            resource = T::resource_name(),
            definitions = ?definitions,
            "service created"
        );
        Self {
            definitions,
            handlers,
        }
    }

    /// Definitions the service was built from
    pub fn definitions(&self) -> &Definitions<T, C> {
        &self.definitions
    }

    /// The resolved implementation set
    pub fn implementation(&self) -> &Implementation<T, C> {
        self.handlers.implementation()
    }

    pub fn handlers(&self) -> &Handlers<T, C> {
        &self.handlers
    }

    pub fn detail_handler(&self, options: Options) -> DetailHandler<T, C> {
        self.handlers.detail_handler(options)
    }

    pub fn create_handler(&self, options: Options) -> CreateHandler<T, C> {
        self.handlers.create_handler(options)
    }

    pub fn update_handler(&self, options: Options) -> UpdateHandler<T, C> {
        self.handlers.update_handler(options)
    }

    pub fn delete_handler(&self, options: Options) -> DeleteHandler<T, C> {
        self.handlers.delete_handler(options)
    }

    pub fn list_handler(&self, options: Options) -> ListHandler<T, C> {
        self.handlers.list_handler(options)
    }
}

impl<T: Entity, C> Clone for CrudService<T, C> {
    fn clone(&self) -> Self {
        Self {
            definitions: self.definitions.clone(),
            handlers: self.handlers.clone(),
        }
    }
}

/// Accumulates shared definitions for a family of services
///
/// Layers given to the builder are fixed: they win over the definitions of
/// each service built from it. Extending a builder adds a newer layer that
/// wins over the layers already accumulated.
///
/// ```rust,ignore
/// let secured = ServiceBuilder::new(Definitions::new().authorize(require_login));
/// let audited = secured.extend(Definitions::new().postprocess_data(audit));
///
/// let dogs = audited.build(Definitions::new().with_repository(dog_repo));
/// ```
pub struct ServiceBuilder<T: Entity, C> {
    layers: Definitions<T, C>,
}

impl<T: Entity, C: RequestContext> ServiceBuilder<T, C> {
    pub fn new(definitions: Definitions<T, C>) -> Self {
        Self {
            layers: definitions,
        }
    }

    /// New builder where `definitions` overrides the accumulated layers
    pub fn extend(&self, definitions: Definitions<T, C>) -> Self {
        Self {
            layers: self.layers.clone().merge(definitions),
        }
    }

    /// Build a service; accumulated layers override `definitions`
    pub fn build(&self, definitions: Definitions<T, C>) -> CrudService<T, C> {
        CrudService::new(definitions.merge(self.layers.clone()))
    }

    /// Accumulated layers
    pub fn definitions(&self) -> &Definitions<T, C> {
        &self.layers
    }
}

impl<T: Entity, C> Clone for ServiceBuilder<T, C> {
    fn clone(&self) -> Self {
        Self {
            layers: self.layers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Operation;
    use serde::{Deserialize, Serialize};

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

    fn named(name: &'static str) -> Definitions<Dog, ()> {
        Definitions::new().detail(move |ctx| async move {
            Ok(Some(Dog {
                id: ctx.id,
                name: name.to_string(),
            }))
        })
    }

    #[tokio::test]
    async fn test_builder_layers_win_over_service_definitions() {
        let builder = ServiceBuilder::new(named("builder"));
        let service = builder.build(named("service"));

        let dog = service.detail_handler(Options::new()).call(1, ()).await.unwrap();
        assert_eq!(dog["name"], "builder");
    }

    #[tokio::test]
    async fn test_extend_prefers_newer_layer() {
        let builder = ServiceBuilder::new(named("old")).extend(named("new"));
        let service = builder.build(Definitions::new());

        let dog = service.detail_handler(Options::new()).call(1, ()).await.unwrap();
        assert_eq!(dog["name"], "new");
    }

    #[test]
    fn test_build_keeps_service_only_fields() {
        let builder = ServiceBuilder::new(named("builder"));
        let service = builder.build(
            Definitions::new().list(|_| async { Ok(vec![]) }),
        );

        assert!(service.definitions().implements(Operation::Detail));
        assert!(service.definitions().implements(Operation::List));
        assert!(!service.definitions().implements(Operation::Create));
    }
}
