//! Main application configuration
//!
//! This module defines the configuration structures for the rating seeder,
//! including environment variable loading, TOML files, and validation.

use crate::error::SeedError;
use crate::rating::{NoiseWidths, DEFAULT_MIN_VARIANTS};
use crate::types::{default_variants, RankingMode, VariantBase};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub store: StoreSettings,
    pub seeding: SeedSettings,
    pub variants: Vec<VariantBase>,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name used in logs and as the MongoDB application name
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Document store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// MongoDB connection string
    pub uri: String,
    /// Database holding the users collection
    pub database: String,
    /// Collection of user documents
    pub users_collection: String,
    /// Server selection timeout in seconds
    pub connect_timeout_seconds: u64,
}

/// Settings controlling how ratings are generated and written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedSettings {
    /// Smallest number of variants a user is seeded with
    pub min_variants: usize,
    /// Uniform noise half-widths
    pub noise: NoiseWidths,
    /// Clamp generated ratings to positive values
    pub clamp_ratings: bool,
    /// Whether a run replaces or merges the stored ranking
    pub ranking_mode: RankingMode,
    /// Fixed RNG seed for reproducible runs
    pub rng_seed: Option<u64>,
    /// Generate without writing
    pub dry_run: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceSettings::default(),
            store: StoreSettings::default(),
            seeding: SeedSettings::default(),
            variants: default_variants(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "rating-seeder".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "govariants".to_string(),
            users_collection: "users".to_string(),
            connect_timeout_seconds: 10,
        }
    }
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            min_variants: DEFAULT_MIN_VARIANTS,
            noise: NoiseWidths::default(),
            clamp_ratings: true,
            ranking_mode: RankingMode::Overwrite,
            rng_seed: None,
            dry_run: false,
        }
    }
}

/// Parse an environment value, naming the variable on failure
fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid {} value: {}", key, value))
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok())?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Service settings
        if let Some(name) = lookup("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Some(log_level) = lookup("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Store settings
        if let Some(uri) = lookup("MONGODB_URI") {
            self.store.uri = uri;
        }
        if let Some(database) = lookup("MONGODB_DATABASE") {
            self.store.database = database;
        }
        if let Some(collection) = lookup("USERS_COLLECTION") {
            self.store.users_collection = collection;
        }
        if let Some(timeout) = lookup("CONNECT_TIMEOUT_SECONDS") {
            self.store.connect_timeout_seconds = parse_var("CONNECT_TIMEOUT_SECONDS", &timeout)?;
        }

        // Seeding settings
        if let Some(min) = lookup("MIN_VARIANTS") {
            self.seeding.min_variants = parse_var("MIN_VARIANTS", &min)?;
        }
        if let Some(clamp) = lookup("CLAMP_RATINGS") {
            self.seeding.clamp_ratings = parse_var("CLAMP_RATINGS", &clamp)?;
        }
        if let Some(mode) = lookup("RANKING_MODE") {
            self.seeding.ranking_mode = parse_var("RANKING_MODE", &mode)?;
        }
        if let Some(seed) = lookup("SEED_RNG_SEED") {
            self.seeding.rng_seed = Some(parse_var("SEED_RNG_SEED", &seed)?);
        }
        if let Some(dry_run) = lookup("DRY_RUN") {
            self.seeding.dry_run = parse_var("DRY_RUN", &dry_run)?;
        }

        Ok(())
    }
}

impl StoreSettings {
    /// Get the connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    SeedError::ConfigurationError {
        message: message.into(),
    }
    .into()
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => {
            return Err(invalid(format!(
                "Invalid log level: {}",
                config.service.log_level
            )))
        }
    }

    // Validate store settings
    if config.store.uri.is_empty() {
        return Err(invalid("MongoDB URI cannot be empty"));
    }
    if config.store.database.is_empty() {
        return Err(invalid("Database name cannot be empty"));
    }
    if config.store.users_collection.is_empty() {
        return Err(invalid("Users collection name cannot be empty"));
    }
    if config.store.connect_timeout_seconds == 0 {
        return Err(invalid("Connect timeout must be greater than 0"));
    }

    // Validate seeding settings
    if config.seeding.min_variants == 0 {
        return Err(invalid("Minimum variant count must be at least 1"));
    }
    config.seeding.noise.validate()?;

    // Validate variants
    if config.variants.is_empty() {
        return Err(invalid("At least one variant must be configured"));
    }
    let mut names = HashSet::new();
    for variant in &config.variants {
        if variant.name.is_empty() {
            return Err(invalid("Variant names cannot be empty"));
        }
        // Names become document field names
        if variant.name.contains('.') || variant.name.starts_with('$') {
            return Err(invalid(format!(
                "Variant name {:?} cannot contain '.' or start with '$'",
                variant.name
            )));
        }
        if !names.insert(variant.name.as_str()) {
            return Err(invalid(format!("Duplicate variant: {}", variant.name)));
        }
        if !variant.base.is_finite() {
            return Err(invalid(format!(
                "Base rating for {} must be finite",
                variant.name
            )));
        }
    }

    Ok(())
}
