//! Main entry point for the rating seeder
//!
//! Loads configuration, initializes logging, and runs one seeding pass
//! against the configured MongoDB database.

use anyhow::Result;
use clap::Parser;
use rating_seeder::config::{validate_config, AppConfig};
use rating_seeder::seeder::run_against_mongo;
use rating_seeder::RankingMode;
use std::path::PathBuf;
use tracing::info;

/// Rating Seeder - synthetic Glicko-2 style ratings for game variants
#[derive(Parser)]
#[command(
    name = "rating-seeder",
    version,
    about = "Seeds randomized variant ratings onto user documents",
    long_about = "Rating Seeder connects to MongoDB, loads every user document, picks a random \
                 subset of game variants for each user with a username, and writes rating / \
                 deviation / volatility values perturbed around per-variant bases onto the \
                 user's ranking field. Intended for development and test databases only."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// MongoDB URI override
    #[arg(long, value_name = "URI", help = "Override MongoDB connection string")]
    mongodb_uri: Option<String>,

    /// Database override
    #[arg(long, value_name = "NAME", help = "Override database name")]
    database: Option<String>,

    /// Collection override
    #[arg(long, value_name = "NAME", help = "Override users collection name")]
    collection: Option<String>,

    /// Fixed RNG seed
    #[arg(long, value_name = "N", help = "Seed the random generator for a reproducible run")]
    seed: Option<u64>,

    /// Merge instead of overwrite
    #[arg(
        long,
        help = "Only set the selected variants, keeping previously seeded ones"
    )]
    merge: bool,

    /// Disable clamping
    #[arg(long, help = "Do not clamp generated ratings to positive values")]
    no_clamp: bool,

    /// Dry run mode
    #[arg(
        long,
        help = "Generate ratings and print them as JSON lines without writing"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Display startup banner with the effective configuration
fn display_startup_banner(config: &AppConfig) {
    info!("🌱 Rating Seeder v{}", rating_seeder::VERSION);
    info!("   MongoDB: {}", config.store.uri);
    info!(
        "   Target: {}.{}",
        config.store.database, config.store.users_collection
    );
    let names: Vec<&str> = config.variants.iter().map(|v| v.name.as_str()).collect();
    info!("   Variants: {}", names.join(", "));
    info!("   Ranking mode: {}", config.seeding.ranking_mode);
    info!("   Clamp ratings: {}", config.seeding.clamp_ratings);
    if let Some(seed) = config.seeding.rng_seed {
        info!("   RNG seed: {}", seed);
    }
    if config.seeding.dry_run {
        info!("   Dry run: nothing will be written");
    }
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment, file, and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }
    if args.debug {
        config.service.log_level = "debug".to_string();
    }
    if let Some(uri) = &args.mongodb_uri {
        config.store.uri = uri.clone();
    }
    if let Some(database) = &args.database {
        config.store.database = database.clone();
    }
    if let Some(collection) = &args.collection {
        config.store.users_collection = collection.clone();
    }
    if let Some(seed) = args.seed {
        config.seeding.rng_seed = Some(seed);
    }
    if args.merge {
        config.seeding.ranking_mode = RankingMode::Merge;
    }
    if args.no_clamp {
        config.seeding.clamp_ratings = false;
    }
    if args.dry_run {
        config.seeding.dry_run = true;
    }

    validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Some(config_path) = &args.config {
        info!("Loaded configuration from: {}", config_path.display());
    }
    display_startup_banner(&config);

    // The outcome is already logged by the run
    let Ok(report) = run_against_mongo(&config).await else {
        std::process::exit(1);
    };

    for planned in &report.planned {
        println!("{}", serde_json::to_string(planned)?);
    }
    Ok(())
}
