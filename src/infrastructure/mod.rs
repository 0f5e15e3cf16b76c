//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements the I/O boundary traits, the JSON codec, the
//! annotation artifact store, and wires up services.

pub mod annotation_store;
pub mod di;
pub mod error;
pub mod json;
pub mod traits;

pub use error::InfraError;
