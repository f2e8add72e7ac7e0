//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.refgen/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options,
//! along with a sample letter template.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::export::{DEFAULT_END_MONTH, DEFAULT_START_MONTH, ExportSettings};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RefgenConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    pub database: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ExportConfig {
    pub template: Option<String>,
    pub output_dir: Option<String>,
    pub start_month: Option<String>,
    pub end_month: Option<String>,
    pub post_export_command: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;
pub const DEFAULT_DATABASE_FILE: &str = "reference_list.sqlite3";
pub const DEFAULT_TEMPLATE_FILE: &str = "reference_template.md";

/// Sample template written next to the config on first run.
pub const SAMPLE_TEMPLATE: &str = include_str!("../../assets/reference_template.md");

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub log_level: LevelFilter,
    pub database: PathBuf,
    pub export: ExportSettings,
    pub post_export_command: Option<String>,
}

/// Values taken from command-line flags (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub database: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.refgen`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".refgen"))
}

/// Returns the path to `~/.refgen/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.refgen/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default (and the
/// sample template) and returns `RefgenConfig::default()`. If it exists but
/// is malformed, returns `ConfigError::Parse`.
pub fn load_config() -> Result<RefgenConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(RefgenConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        if let Some(dir) = path.parent() {
            generate_sample_template(&dir.join(DEFAULT_TEMPLATE_FILE));
        }
        return Ok(RefgenConfig::default());
    }

    load_config_from(&path)
}

/// Parse a config file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<RefgenConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: RefgenConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# refgen configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# log_level = "info"                 # "off", "error", "warn", "info", "debug", "trace"

# [storage]
# database = "~/.refgen/reference_list.sqlite3"   # Or set REFGEN_DB, or pass --db

# [export]
# template = "~/.refgen/reference_template.md"    # Or REFGEN_TEMPLATE / --template
# output_dir = "."                                # Or REFGEN_OUTPUT_DIR / --output-dir
# start_month = "Sep"                # Prefix for the start year ("Sep 2019")
# end_month = "June"                 # Prefix for the end year ("June 2022")
# post_export_command = "xdg-open"   # Run with the written file; unset = do nothing
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

/// Writes the bundled sample template unless something is already there.
fn generate_sample_template(path: &Path) {
    if path.exists() {
        return;
    }
    match fs::write(path, SAMPLE_TEMPLATE) {
        Ok(()) => info!("Wrote sample template to {}", path.display()),
        Err(e) => warn!("Failed to write sample template: {}", e),
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &RefgenConfig, cli: &CliOverrides) -> ResolvedConfig {
    let base_dir = config_dir().unwrap_or_else(|| PathBuf::from("."));

    let log_level = config
        .general
        .log_level
        .as_deref()
        .and_then(|level| match level.parse::<LevelFilter>() {
            Ok(filter) => Some(filter),
            Err(_) => {
                warn!("Unknown log level {:?}, using default", level);
                None
            }
        })
        .unwrap_or(DEFAULT_LOG_LEVEL);

    // Database: CLI → env → config → default
    let database = cli
        .database
        .clone()
        .or_else(|| env_path("REFGEN_DB"))
        .or_else(|| config.storage.database.as_deref().map(expand_home))
        .unwrap_or_else(|| base_dir.join(DEFAULT_DATABASE_FILE));

    // Template: CLI → env → config → default
    let template = cli
        .template
        .clone()
        .or_else(|| env_path("REFGEN_TEMPLATE"))
        .or_else(|| config.export.template.as_deref().map(expand_home))
        .unwrap_or_else(|| base_dir.join(DEFAULT_TEMPLATE_FILE));

    // Output directory: CLI → env → config → current directory
    let output_dir = cli
        .output_dir
        .clone()
        .or_else(|| env_path("REFGEN_OUTPUT_DIR"))
        .or_else(|| config.export.output_dir.as_deref().map(expand_home))
        .unwrap_or_else(|| PathBuf::from("."));

    ResolvedConfig {
        log_level,
        database,
        export: ExportSettings {
            template,
            output_dir,
            start_month: config
                .export
                .start_month
                .clone()
                .unwrap_or_else(|| DEFAULT_START_MONTH.to_string()),
            end_month: config
                .export
                .end_month
                .clone()
                .unwrap_or_else(|| DEFAULT_END_MONTH.to_string()),
        },
        post_export_command: config
            .export
            .post_export_command
            .clone()
            .filter(|cmd| !cmd.trim().is_empty()),
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(|v| expand_home(&v))
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
