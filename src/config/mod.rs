//! Configuration module
//!
//! YAML match configuration: schema, loading, and validation.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::{MatchConfig, MatchPreset};
