//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! decomposition logic.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading, validation and logging setup

pub mod config;
