use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sales: SalesConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SalesConfig {
    /// CSV used when nothing was uploaded
    pub default_data_path: String,
    /// Max number of parsed sources kept in memory
    pub cache_capacity: usize,
    /// Rows of the product ranking returned by default
    pub top_products: usize,
}

impl Default for SalesConfig {
    fn default() -> Self {
        Self {
            default_data_path: "vendas_exemplo.csv".to_string(),
            cache_capacity: 4,
            top_products: 10,
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 3000

[sales]
default_data_path = "vendas_exemplo.csv"
cache_capacity = 4
top_products = 10
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    // Try to find config.toml next to the executable
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

    // Fall back to default config
    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Load config.toml once and keep it for the lifetime of the process
pub fn init_config() -> anyhow::Result<&'static Config> {
    let config = load_config()?;
    Ok(CONFIG.get_or_init(|| config))
}

pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config has not been initialized")
}

/// Resolve the default sales CSV path.
///
/// Relative paths are looked up next to the executable first, then in the
/// current directory.
pub fn get_default_data_path(config: &Config) -> PathBuf {
    let data_path = Path::new(&config.sales.default_data_path);

    // If absolute path, use as is
    if data_path.is_absolute() {
        return data_path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let resolved_path = exe_dir.join(data_path);
            if resolved_path.exists() {
                return resolved_path;
            }
        }
    }

    // Fallback: use relative to current directory
    data_path.to_path_buf()
}
