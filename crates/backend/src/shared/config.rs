use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub digikey: DigiKeyConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DigiKeyConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_locale_site")]
    pub locale_site: String,
    #[serde(default = "default_locale_language")]
    pub locale_language: String,
    #[serde(default = "default_locale_currency")]
    pub locale_currency: String,
    #[serde(default = "default_customer_id")]
    pub customer_id: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_retry_delay_ms")]
    pub initial_retry_delay_ms: u64,
    #[serde(default)]
    pub no_proxy: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            upload_dir: default_upload_dir(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.digikey.com".to_string()
}
fn default_locale_site() -> String {
    "US".to_string()
}
fn default_locale_language() -> String {
    "EN".to_string()
}
fn default_locale_currency() -> String {
    "USD".to_string()
}
fn default_customer_id() -> String {
    "0".to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_max_attempts() -> u32 {
    3
}
fn default_initial_retry_delay_ms() -> u64 {
    1000
}
fn default_port() -> u16 {
    3000
}
fn default_upload_dir() -> String {
    "uploads".to_string()
}
fn default_max_upload_mb() -> usize {
    16
}
fn default_snapshot_path() -> String {
    "product_details.json".to_string()
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[digikey]
client_id = ""
client_secret = ""
api_base = "https://api.digikey.com"

[server]
port = 3000
upload_dir = "uploads"
max_upload_mb = 16

[storage]
snapshot_path = "product_details.json"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// DIGIKEY_CLIENT_ID / DIGIKEY_CLIENT_SECRET override the file.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = load_file_config()?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    if config.digikey.client_id.is_empty() || config.digikey.client_secret.is_empty() {
        tracing::warn!("DigiKey credentials are not configured (config.toml or DIGIKEY_CLIENT_ID/DIGIKEY_CLIENT_SECRET)");
    }

    Ok(config)
}

fn load_file_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(id) = lookup("DIGIKEY_CLIENT_ID").filter(|v| !v.trim().is_empty()) {
        config.digikey.client_id = id;
    }
    if let Some(secret) = lookup("DIGIKEY_CLIENT_SECRET").filter(|v| !v.trim().is_empty()) {
        config.digikey.client_secret = secret;
    }
}

/// Resolves relative paths relative to the executable directory
pub fn resolve_path(path_str: &str) -> PathBuf {
    let path = Path::new(path_str);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(path);
        }
    }

    PathBuf::from(path_str)
}

pub fn get_upload_dir(config: &Config) -> PathBuf {
    resolve_path(&config.server.upload_dir)
}

pub fn get_snapshot_path(config: &Config) -> PathBuf {
    resolve_path(&config.storage.snapshot_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.digikey.api_base, "https://api.digikey.com");
        assert_eq!(config.digikey.request_timeout_secs, 10);
        assert_eq!(config.digikey.max_attempts, 3);
        assert_eq!(config.digikey.initial_retry_delay_ms, 1000);
        assert_eq!(config.digikey.locale_currency, "USD");
        assert_eq!(config.server.max_upload_mb, 16);
        assert_eq!(config.storage.snapshot_path, "product_details.json");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = toml::from_str("[digikey]\nclient_id = \"abc\"\n").unwrap();
        assert_eq!(config.digikey.client_id, "abc");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.upload_dir, "uploads");
    }

    #[test]
    fn test_env_overrides_credentials() {
        let mut config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        apply_env_overrides(&mut config, |key| match key {
            "DIGIKEY_CLIENT_ID" => Some("env-id".to_string()),
            "DIGIKEY_CLIENT_SECRET" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.digikey.client_id, "env-id");
        assert_eq!(config.digikey.client_secret, "");
    }

    #[test]
    fn test_absolute_path_is_kept() {
        let abs = std::env::temp_dir().join("x.json");
        assert_eq!(resolve_path(abs.to_str().unwrap()), abs);
    }
}
