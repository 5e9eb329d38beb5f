//! Content routing: classify `/title/...` paths and resolve them to page models.

pub mod classifier;
pub mod resolver;

pub use classifier::{classify, route_identifier, MAIN_PAGE};
pub use resolver::{PageResolver, Resolution, ResolveError};
