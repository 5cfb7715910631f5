//! # Crudella
//!
//! Generate CRUD request handlers for a resource from a small set of
//! optional definitions.
//!
//! ## Features
//!
//! - **Five operations**: detail, create, update, delete and list handlers
//! - **Safe fetching**: detail, update and delete resolve the entity first and
//!   fail with a not-found error when it is missing
//! - **Authorization hook**: one callback sees the complete context of every
//!   operation before any implementation runs
//! - **Data hooks**: `process_data` before authorization, `postprocess_data`
//!   on every result
//! - **Option cascade**: dynamic per-operation options, static handler
//!   options and the request context are merged into one bag
//! - **Repository layer**: plug a [`CrudRepository`](core::CrudRepository)
//!   and get every operation for free
//! - **HTTP exposure**: mount a service on an axum router
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crudella::prelude::*;
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Dalmatian {
//!     id: u64,
//!     name: String,
//! }
//!
//! impl Entity for Dalmatian {
//!     type Id = u64;
//!     fn resource_name() -> &'static str { "dalmatians" }
//!     fn id(&self) -> u64 { self.id }
//! }
//!
//! let service = CrudService::new(
//!     Definitions::<Dalmatian, ()>::new()
//!         .with_repository(InMemoryRepository::sequential())
//!         .authorize(|ctx| async move {
//!             if ctx.is_write() { anyhow::bail!("read only") }
//!             Ok(())
//!         }),
//! );
//!
//! let pongo = service.detail_handler(Options::new()).call(1, ()).await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod service;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        CreateContext, CrudContext, CrudError, CrudRepository, DeleteContext, DetailContext,
        Entity, FetchContext, ListContext, Operation, OperationContext, Options, RequestContext,
        UpdateContext, merge_options,
    };

    // === Service ===
    pub use crate::service::{
        CreateHandler, CrudService, DeleteHandler, Definitions, DetailHandler, ListHandler,
        ServiceBuilder, UpdateHandler,
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryRepository;

    // === Config ===
    pub use crate::config::ServiceConfig;

    // === Server ===
    pub use crate::server::{ApiError, CrudRouter};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
    pub use uuid::Uuid;

    // === Axum ===
    pub use axum::{Router, http::HeaderMap};
}
