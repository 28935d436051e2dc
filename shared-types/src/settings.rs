use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Configuration state of one third-party provider
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct ProviderStatus {
    pub name: String,
    pub key: Option<String>,
    pub is_configured: bool,
}

/// Response for settings endpoint
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct SettingsResponse {
    pub config_file_path: String,
    pub providers: Vec<ProviderStatus>,
    pub call_summary_backend: String,
}
