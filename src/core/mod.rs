//! Core module containing the operation vocabulary, contexts and contracts

pub mod context;
pub mod entity;
pub mod error;
pub mod forge;
pub mod operation;
pub mod options;
pub mod repository;

pub use context::{
    CreateContext, CrudContext, DeleteContext, DetailContext, FetchContext, ListContext,
    OperationContext, RequestContext, UpdateContext,
};
pub use entity::Entity;
pub use error::{CrudError, ErrorResponse};
pub use operation::Operation;
pub use options::{Options, merge_options};
pub use repository::CrudRepository;
