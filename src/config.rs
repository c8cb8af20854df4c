use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub credits: CreditsConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// A configured URL selects the SQL backend; otherwise the service falls back
/// to flat JSON files under `storage.data_dir`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

/// Ledger behavior. `free_mode` flips the debit semantics globally: usage is
/// logged but balances are never decremented.
#[derive(Debug, Clone, Deserialize)]
pub struct CreditsConfig {
    pub free_mode: bool,
    pub initial_grant: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    pub chat: ChatProviderConfig,
    pub image: ImageProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub request_timeout_ms: u64,
    pub retry_attempts: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    pub api_base: String,
    pub model_version: String,
    pub poll_interval_ms: u64,
    pub poll_attempts: u32,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for environment variable overrides)
        dotenvy::dotenv().ok();

        // Build config from config.yml (required) with environment variable overrides
        let config = config::Config::builder()
            // Load config.yml (REQUIRED)
            .add_source(config::File::with_name("config").required(true))
            // Allow environment variables to override config file
            .add_source(
                config::Environment::with_prefix("PANELX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
