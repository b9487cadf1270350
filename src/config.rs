use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Prefix of every environment override, e.g. `SALESFEED_DB_PATH`.
pub const ENV_PREFIX: &str = "SALESFEED_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub paging: PagingConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    // listen address: eg: 0.0.0.0:5000
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    // database file, opened read-only on every query
    #[serde(default = "default_db_path")]
    pub path: String,

    // how long a query waits on a locked database before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshConfig {
    // seconds between two snapshot refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub interval_secs: u64,

    // the refresh window covers today and this many days before it
    #[serde(default = "default_refresh_window_days")]
    pub window_days: u32,

    // rows kept per snapshot (page 1 of this size)
    #[serde(default = "default_refresh_page_size")]
    pub page_size: u32,

    // offset from UTC, in hours, of the calendar that decides "today"
    #[serde(default)]
    pub utc_offset_hours: i8,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PagingConfig {
    // used when a request has no `limite`
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    // requests with a larger `limite` are rejected
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

fn default_listen_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_db_path() -> String {
    "winthor.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_refresh_interval_secs() -> u64 {
    10
}

fn default_refresh_window_days() -> u32 {
    7
}

fn default_refresh_page_size() -> u32 {
    10
}

fn default_page_size() -> u32 {
    100
}

fn default_max_page_size() -> u32 {
    1000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_refresh_interval_secs(),
            window_days: default_refresh_window_days(),
            page_size: default_refresh_page_size(),
            utc_offset_hours: 0,
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl PagingConfig {
    /// Page size for a request: the default when none was asked for, `None`
    /// when the request exceeds the maximum.
    pub fn page_size(&self, requested: Option<u32>) -> Option<u32> {
        match requested {
            None => Some(self.default_page_size),
            Some(size) if size > self.max_page_size => None,
            Some(size) => Some(size),
        }
    }
}

/// Load configuration with precedence environment > file > defaults.
///
/// A missing file is not an error; every field then keeps its default.
pub fn load(path: &str) -> anyhow::Result<Config> {
    let mut config = if Path::new(path).exists() {
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read config {path}"))?;
        from_toml(&content).with_context(|| format!("failed to parse config {path}"))?
    } else {
        tracing::info!("config file {} not found, using defaults", path);
        Config::default()
    };

    config.apply_env(|name| std::env::var(name).ok())?;
    config.validate()?;
    Ok(config)
}

pub fn from_toml(content: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}

impl Config {
    /// Override fields from `SALESFEED_*` variables resolved through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            lookup(&format!("{ENV_PREFIX}{suffix}"))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        if let Some(addr) = var("LISTEN_ADDR") {
            self.http.listen_addr = addr;
        }
        if let Some(path) = var("DB_PATH") {
            self.database.path = path;
        }
        if let Some(v) = var("DB_BUSY_TIMEOUT_MS") {
            self.database.busy_timeout_ms = parse_number("DB_BUSY_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = var("REFRESH_INTERVAL_SECS") {
            self.refresh.interval_secs = parse_number("REFRESH_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = var("REFRESH_WINDOW_DAYS") {
            self.refresh.window_days = parse_number("REFRESH_WINDOW_DAYS", &v)?;
        }
        if let Some(v) = var("REFRESH_PAGE_SIZE") {
            self.refresh.page_size = parse_number("REFRESH_PAGE_SIZE", &v)?;
        }
        if let Some(v) = var("REFRESH_UTC_OFFSET_HOURS") {
            self.refresh.utc_offset_hours = parse_number("REFRESH_UTC_OFFSET_HOURS", &v)?;
        }
        if let Some(v) = var("DEFAULT_PAGE_SIZE") {
            self.paging.default_page_size = parse_number("DEFAULT_PAGE_SIZE", &v)?;
        }
        if let Some(v) = var("MAX_PAGE_SIZE") {
            self.paging.max_page_size = parse_number("MAX_PAGE_SIZE", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.refresh.interval_secs == 0 {
            bail!("refresh.interval_secs must be positive");
        }
        if self.refresh.page_size == 0 {
            bail!("refresh.page_size must be positive");
        }
        if !(-12..=14).contains(&self.refresh.utc_offset_hours) {
            bail!(
                "refresh.utc_offset_hours ({}) must be between -12 and 14",
                self.refresh.utc_offset_hours
            );
        }
        if self.paging.max_page_size == 0 || self.paging.default_page_size == 0 {
            bail!("paging sizes must be positive");
        }
        if self.paging.default_page_size > self.paging.max_page_size {
            bail!(
                "paging.default_page_size ({}) exceeds paging.max_page_size ({})",
                self.paging.default_page_size,
                self.paging.max_page_size
            );
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(suffix: &str, value: &str) -> anyhow::Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("{ENV_PREFIX}{suffix} is not a valid number: {value}"))
}
