//! CLI module for the EasyEvents command-line interface.
//!
//! Without a subcommand (or with `serve`) the web server starts. The other
//! subcommands work directly on the configured database and image folder:
//! - `seed` - Insert the built-in venue and supplier catalog
//! - `images` - Print the category image manifest as JSON

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::catalog::ImageLibrary;
use crate::config::Config;
use crate::db;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "easyevents")]
#[command(author, version, about = "Event planning: venues, suppliers, guests and checklists", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "EASYEVENTS_CONFIG", default_value = "easyevents.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Subcommand to run (if none, starts the server)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Start the web server
    Serve,

    /// Insert the built-in catalog (venues and suppliers missing by name)
    Seed,

    /// Print every image category with its files
    Images,
}

/// Seed the configured database and report what was inserted
pub async fn run_seed(config: &Config) -> Result<()> {
    std::fs::create_dir_all(&config.server.data_dir).with_context(|| {
        format!(
            "Failed to create data directory: {}",
            config.server.data_dir.display()
        )
    })?;

    let pool = db::init(&config.server.data_dir, config.server.max_connections).await?;
    let images = ImageLibrary::scan(&config.catalog.images_dir);
    let report = db::seeders::seed_catalog(&pool, &images).await?;

    println!(
        "Seeded {} venues and {} suppliers",
        report.venues, report.suppliers
    );
    Ok(())
}

/// Print the image manifest
pub fn run_images(config: &Config) -> Result<()> {
    let images = ImageLibrary::scan(&config.catalog.images_dir);
    let manifest = serde_json::to_string_pretty(&images.manifest())
        .context("Failed to serialize image manifest")?;
    println!("{}", manifest);
    Ok(())
}
