//! HTTP exposure of generated services
//!
//! A [`CrudRouter`] mounts the five handlers of a service on an axum
//! `Router`; [`ApiError`] turns handler failures into JSON responses.

pub mod error;
pub mod router;

pub use error::ApiError;
pub use router::{ContextExtractor, CrudRouter};
