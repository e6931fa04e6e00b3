//! # Configuration
//!
//! Session settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.rentacar/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::catalog::SortKey;
use crate::core::wallet::DEFAULT_STARTING_BALANCE;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RentacarConfig {
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WalletConfig {
    pub starting_balance: Option<f64>,
    pub max_rental_cost: Option<f64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    pub default_sort: Option<SortKey>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_MAX_RENTAL_COST: f64 = 400.0;

pub const ENV_BALANCE: &str = "RENTACAR_BALANCE";
pub const ENV_MAX_RENTAL_COST: &str = "RENTACAR_MAX_RENTAL_COST";
pub const ENV_SORT: &str = "RENTACAR_SORT";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub starting_balance: f64,
    pub max_rental_cost: f64,
    pub default_sort: SortKey,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_STARTING_BALANCE,
            max_rental_cost: DEFAULT_MAX_RENTAL_COST,
            default_sort: SortKey::None,
        }
    }
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub starting_balance: Option<f64>,
    pub max_rental_cost: Option<f64>,
    pub sort: Option<SortKey>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.rentacar/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".rentacar").join("config.toml"))
}

/// Load config from `~/.rentacar/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `RentacarConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<RentacarConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(RentacarConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(RentacarConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<RentacarConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# Rent-a-car Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [wallet]
# starting_balance = 500.0           # Or set RENTACAR_BALANCE
# max_rental_cost = 400.0            # Per-booking limit, or RENTACAR_MAX_RENTAL_COST

# [catalog]
# default_sort = "none"              # "none", "rating_desc", "year_desc", "cost_asc"
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

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &RentacarConfig, cli: Overrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |name| std::env::var(name).ok())
}

/// Same as [`resolve`], with the environment supplied by `env`.
pub fn resolve_with_env(
    config: &RentacarConfig,
    cli: Overrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let starting_balance = cli
        .starting_balance
        .or_else(|| env_amount(&env, ENV_BALANCE))
        .or(config.wallet.starting_balance)
        .and_then(|v| non_negative("starting_balance", v))
        .unwrap_or(DEFAULT_STARTING_BALANCE);

    let max_rental_cost = cli
        .max_rental_cost
        .or_else(|| env_amount(&env, ENV_MAX_RENTAL_COST))
        .or(config.wallet.max_rental_cost)
        .and_then(|v| non_negative("max_rental_cost", v))
        .unwrap_or(DEFAULT_MAX_RENTAL_COST);

    let default_sort = cli
        .sort
        .or_else(|| env_sort(&env))
        .or(config.catalog.default_sort)
        .unwrap_or_default();

    ResolvedConfig {
        starting_balance,
        max_rental_cost,
        default_sort,
    }
}

fn env_amount(env: &impl Fn(&str) -> Option<String>, name: &str) -> Option<f64> {
    let raw = env(name)?;
    match raw.trim().parse::<f64>() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", name, raw, e);
            None
        }
    }
}

fn env_sort(env: &impl Fn(&str) -> Option<String>) -> Option<SortKey> {
    let raw = env(ENV_SORT)?;
    match <SortKey as clap::ValueEnum>::from_str(raw.trim(), true) {
        Ok(key) => Some(key),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", ENV_SORT, raw, e);
            None
        }
    }
}

fn non_negative(name: &str, value: f64) -> Option<f64> {
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        warn!("Ignoring {} = {}: must be a non-negative amount", name, value);
        None
    }
}
