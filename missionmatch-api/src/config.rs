use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "MISSIONMATCH";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub api_keys: Option<ApiKeysConfig>,
    pub cors: Option<CorsConfig>,
    pub server: Option<ServerConfig>,
    pub vapi: Option<VapiConfig>,
    pub agent: Option<AgentConfig>,
    pub call_summaries: Option<CallSummariesConfig>,
    pub database: Option<DatabaseConfig>,
    pub supabase: Option<SupabaseConfig>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_keys: None,
            cors: Some(CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
            }),
            server: Some(ServerConfig::default()),
            vapi: None,
            agent: None,
            call_summaries: Some(CallSummariesConfig::default()),
            database: None,
            supabase: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ApiKeysConfig {
    pub anthropic_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
    pub google_places_api_key: Option<String>,
    pub vapi_api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct VapiConfig {
    pub phone_number_id: Option<String>,
    pub assistant_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct AgentConfig {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallSummaryBackend {
    #[default]
    Sqlite,
    Supabase,
    None,
}

impl CallSummaryBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallSummaryBackend::Sqlite => "sqlite",
            CallSummaryBackend::Supabase => "supabase",
            CallSummaryBackend::None => "none",
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct CallSummariesConfig {
    #[serde(default)]
    pub backend: CallSummaryBackend,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub service_key: Option<String>,
    pub table: Option<String>,
}

const DEFAULT_CONFIG: &str = r#"
[api_keys]
# anthropic_api_key = "sk-ant-..."
# tavily_api_key = "tvly-..."
# google_places_api_key = "your-places-key"
# vapi_api_key = "your-vapi-key"

[cors]
allowed_origins = ["http://localhost:3000"]

[server]
host = "127.0.0.1"
port = 4000

[vapi]
# phone_number_id = "your-vapi-phone-number-id"
# assistant_id = "your-vapi-assistant-id"

[agent]
# model = "claude-sonnet-4-5-20250929"
# max_tokens = 1024

[call_summaries]
# sqlite, supabase or none
backend = "sqlite"

[database]
# path = "/path/to/db.sqlite"

[supabase]
# url = "https://your-project.supabase.co"
# service_key = "your-service-role-key"
# table = "call_summaries"
"#;

impl ApiConfig {
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        let config_path = get_config_path();
        let config = Self::load_from(&config_path)?;
        Ok((config, config_path))
    }

    /// Reads `config_path`, writing the commented default first if it is missing.
    /// `MISSIONMATCH__SECTION__KEY` environment variables override file values.
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            std::fs::write(config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.to_path_buf()))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        builder.try_deserialize()
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn api_keys(&self) -> ApiKeysConfig {
        self.api_keys.clone().unwrap_or_default()
    }

    pub fn call_summary_backend(&self) -> CallSummaryBackend {
        self.call_summaries
            .as_ref()
            .map(|c| c.backend)
            .unwrap_or_default()
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("missionmatch").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}

/// Treats blank strings in the config file as unset
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
