//! Android build script generation for white-label Flutter apps
//!
//! This crate provides:
//! - Typed per-customer build descriptions with validation
//! - The built-in `app/build.gradle.kts` template
//! - Rendering and writing build scripts, one app or many in parallel

#![warn(missing_docs)]

pub mod app;
pub mod gradle;

pub use app::{BuildType, Dependency, ResValue, SigningConfig, WhiteLabelApp};
pub use gradle::{write_build_script, GradleGenerator, DEFAULT_TEMPLATE};
