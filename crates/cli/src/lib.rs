//! CLI utilities for the white-label build tools
//!
//! Provides shared CLI functionality:
//! - Status messages
//! - Validation and template error reports
//! - Size, duration and count formatting

#![warn(missing_docs)]

pub mod output;
