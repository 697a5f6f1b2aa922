//! Configuration system for flux-extract
//!
//! Layered YAML configuration: built-in defaults, the root config file, an
//! explicit config file, then environment overrides.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::ExtractConfig;
