//! Configuration Module
//!
//! Layered configuration: built-in defaults, global config, project config,
//! environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{AnalysisConfig, Config, DomainConfig, OutputConfig};
