//! Service generation: definitions, bootstrap and handler orchestration

pub mod bootstrap;
pub mod builder;
pub mod definitions;
pub mod handlers;

pub use bootstrap::{Implementation, bootstrap};
pub use builder::{CrudService, ServiceBuilder};
pub use definitions::Definitions;
pub use handlers::{
    CreateHandler, DeleteHandler, DetailHandler, Handlers, ListHandler, UpdateHandler,
};
