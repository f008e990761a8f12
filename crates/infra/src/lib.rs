//! Infrastructure layer: storage backends, configuration, and the order
//! mutation pipeline that keeps vendor metrics current.

pub mod config;
pub mod mutation;
pub mod store;
