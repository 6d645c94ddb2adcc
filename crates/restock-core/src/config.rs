use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Shops file: the seed URLs to crawl plus optional product filters.
#[derive(Debug, Deserialize)]
pub struct ShopsFile {
    pub urls: Vec<String>,
    #[serde(default)]
    pub filters: Option<FiltersConfig>,
}

/// Declarative product filters applied between extraction and persistence.
#[derive(Debug, Default, Deserialize)]
pub struct FiltersConfig {
    /// Keep only products whose name matches this regex.
    #[serde(default)]
    pub include: Option<String>,
    /// Drop products whose name matches this regex.
    #[serde(default)]
    pub exclude: Option<String>,
    /// Per-model price windows.
    #[serde(default)]
    pub ranges: Vec<RangeConfig>,
}

/// One price window: applies to products whose name matches `model`.
#[derive(Debug, Deserialize)]
pub struct RangeConfig {
    pub model: String,
    #[serde(default)]
    pub min: f64,
    /// `0` means unbounded above.
    #[serde(default)]
    pub max: f64,
    /// ISO 4217 code the bounds are expressed in; defaults to EUR.
    #[serde(default)]
    pub currency: Option<String>,
}

/// Load and validate the shops configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_shops_file(path: &Path) -> Result<ShopsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ShopsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let shops_file: ShopsFile = serde_yaml::from_str(&content)?;
    validate_shops_file(&shops_file)?;
    Ok(shops_file)
}

fn validate_shops_file(shops_file: &ShopsFile) -> Result<(), ConfigError> {
    if shops_file.urls.is_empty() {
        return Err(ConfigError::Validation(
            "shops file must list at least one url".to_owned(),
        ));
    }
    for url in &shops_file.urls {
        if shop_name_of(url).is_none() {
            return Err(ConfigError::Validation(format!(
                "cannot extract a shop name from url: {url}"
            )));
        }
    }
    Ok(())
}

/// Derives the shop name from a seed URL: the host with any leading `www.`
/// dropped, e.g. `https://www.ldlc.com/informatique/` → `ldlc.com`.
#[must_use]
pub fn shop_name_of(url: &str) -> Option<String> {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = without_scheme.split('/').next().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_owned())
    }
}

/// Groups seed URLs by shop name, preserving per-shop URL order.
///
/// URLs whose shop name cannot be derived are skipped with a warning.
#[must_use]
pub fn group_urls_by_shop(urls: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut shops: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for url in urls {
        match shop_name_of(url) {
            Some(name) => shops.entry(name).or_default().push(url.clone()),
            None => tracing::warn!(url = %url, "cannot extract shop name from url; skipping"),
        }
    }
    shops
}

/// Runtime settings read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub shops_path: PathBuf,
    /// Number of shops crawled concurrently.
    pub workers: usize,
    pub fetch_timeout_secs: u64,
    /// Bounded wait for a page's required element to appear.
    pub element_wait_secs: u64,
    pub user_agent: String,
    /// Safety cap on pages followed per seed URL.
    pub max_pages: usize,
    pub webhook_url: Option<String>,
    pub webhook_token: Option<String>,
    pub webhook_timeout_secs: u64,
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env
/// vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup.
///
/// The parsing logic is decoupled from the process environment so it can be
/// tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_owned()) };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_owned(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_owned(),
                reason: e.to_string(),
            })
    };

    Ok(AppConfig {
        database_url: or_default("RESTOCK_DATABASE_URL", "sqlite:restock.db?mode=rwc"),
        shops_path: PathBuf::from(or_default("RESTOCK_SHOPS_PATH", "./config/shops.yaml")),
        workers: parse_usize("RESTOCK_WORKERS", "1")?,
        fetch_timeout_secs: parse_u64("RESTOCK_FETCH_TIMEOUT_SECS", "30")?,
        element_wait_secs: parse_u64("RESTOCK_ELEMENT_WAIT_SECS", "3")?,
        user_agent: or_default("RESTOCK_USER_AGENT", "restock/0.1 (availability-watch)"),
        max_pages: parse_usize("RESTOCK_MAX_PAGES", "50")?,
        webhook_url: lookup("RESTOCK_WEBHOOK_URL").ok(),
        webhook_token: lookup("RESTOCK_WEBHOOK_TOKEN").ok(),
        webhook_timeout_secs: parse_u64("RESTOCK_WEBHOOK_TIMEOUT_SECS", "10")?,
    })
}
