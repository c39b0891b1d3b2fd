use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OdooConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: f64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_count_limit")]
    pub count_limit: u64,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetsConfig {
    #[serde(default = "default_sheets_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
    /// Base64-encoded service-account key JSON. Takes precedence over
    /// `credentials_path` when non-empty.
    #[serde(default)]
    pub credentials_base64: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: f64,
}

/// Per-dataset destination. The field specification and column schema for a
/// dataset live in code; config only says where its output goes.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    pub name: String,
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub tab: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub odoo: OdooConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
}

impl Default for OdooConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            database: String::new(),
            username: String::new(),
            password: String::new(),
            timeout_seconds: default_timeout_seconds(),
            page_size: default_page_size(),
            count_limit: default_count_limit(),
            lang: default_lang(),
            timezone: default_timezone(),
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_sheets_endpoint(),
            token_endpoint: default_token_endpoint(),
            credentials_path: default_credentials_path(),
            credentials_base64: String::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            odoo: OdooConfig::default(),
            sheets: SheetsConfig::default(),
            datasets: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn dataset(&self, name: &str) -> Option<&DatasetConfig> {
        self.datasets.iter().find(|d| d.name == name)
    }
}

fn default_timeout_seconds() -> f64 {
    30.0
}

fn default_page_size() -> usize {
    2000
}

fn default_count_limit() -> u64 {
    100_000
}

fn default_lang() -> String {
    "en_US".to_string()
}

fn default_timezone() -> String {
    "Asia/Dhaka".to_string()
}

fn default_sheets_endpoint() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_token_endpoint() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_credentials_path() -> String {
    "~/.sheetfeed/service-account.json".to_string()
}

fn default_enabled() -> bool {
    true
}

pub fn expand_path(path: &str) -> String {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{}", home.to_string_lossy(), stripped);
        }
    }
    path.to_string()
}

fn home_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".sheetfeed").join("config.toml"))
}

fn repo_default_config_path() -> PathBuf {
    PathBuf::from("config/sheetfeed.toml")
}

fn resolve_config_path_with_overrides(
    raw_path: Option<PathBuf>,
    env_keys: &[&str],
    home_path: Option<PathBuf>,
    repo_default: PathBuf,
) -> PathBuf {
    if let Some(path) = raw_path {
        return path;
    }

    for key in env_keys {
        if let Ok(value) = std::env::var(key) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
    }

    if let Some(path) = home_path {
        if path.exists() {
            return path;
        }
    }

    if repo_default.exists() {
        return repo_default;
    }

    home_config_path().unwrap_or(repo_default)
}

pub fn resolve_config_path(raw_path: Option<PathBuf>) -> PathBuf {
    resolve_config_path_with_overrides(
        raw_path,
        &["SHEETFEED_CONFIG"],
        home_config_path(),
        repo_default_config_path(),
    )
}

/// Secrets may be injected through the environment so the config file can stay
/// free of credentials; a non-empty env value wins over the file.
fn apply_env_overrides(mut cfg: AppConfig) -> AppConfig {
    if let Ok(password) = std::env::var("SHEETFEED_ODOO_PASSWORD") {
        if !password.trim().is_empty() {
            cfg.odoo.password = password;
        }
    }
    if let Ok(blob) = std::env::var("SHEETFEED_GOOGLE_CREDS") {
        if !blob.trim().is_empty() {
            cfg.sheets.credentials_base64 = blob.trim().to_string();
        }
    }
    cfg
}

fn normalize_config(mut cfg: AppConfig) -> AppConfig {
    cfg.sheets.credentials_path = expand_path(&cfg.sheets.credentials_path);
    apply_env_overrides(cfg)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read config {}", path.as_ref().display()))?;
    let cfg: AppConfig = toml::from_str(&content).context("failed to parse TOML config")?;
    Ok(normalize_config(cfg))
}
