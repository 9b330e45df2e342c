//! Configuration management for the rating seeder
//!
//! This module handles configuration loading from defaults, environment
//! variables, and TOML files, along with validation.

pub mod app;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, SeedSettings, ServiceSettings, StoreSettings};
