//! Configuration loading and schema definitions
//!
//! Settings for template rendering and build script generation.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
