use crate::config::{non_empty, ApiConfig};
use actix_web::{web, HttpResponse, Result};
use shared_types::{ProviderStatus, SettingsResponse};
use std::sync::Arc;

#[derive(Clone)]
pub struct SettingsAppState {
    pub config: Arc<ApiConfig>,
    pub call_summary_backend: &'static str,
}

fn mask_api_key(key: Option<&str>) -> Option<String> {
    key.map(|k| {
        if k.len() <= 6 {
            k.to_string()
        } else {
            let visible: String = k.chars().take(6).collect();
            let masked = format!("{}{}", visible, "*".repeat(k.chars().count() - 6));
            if masked.chars().count() > 40 {
                format!("{}...", masked.chars().take(37).collect::<String>())
            } else {
                masked
            }
        }
    })
}

fn provider(name: &str, key: Option<&str>) -> ProviderStatus {
    ProviderStatus {
        name: name.to_string(),
        key: mask_api_key(key),
        is_configured: key.is_some(),
    }
}

pub async fn get_settings(data: web::Data<SettingsAppState>) -> Result<HttpResponse> {
    let config = &data.config;
    let keys = config.api_keys();
    let vapi = config.vapi.clone().unwrap_or_default();
    let supabase = config.supabase.clone().unwrap_or_default();

    let vapi_ready = non_empty(&vapi.phone_number_id).is_some()
        && non_empty(&vapi.assistant_id).is_some();

    let mut providers = vec![
        provider("anthropic", non_empty(&keys.anthropic_api_key)),
        provider("tavily", non_empty(&keys.tavily_api_key)),
        provider("google_places", non_empty(&keys.google_places_api_key)),
    ];

    let mut vapi_status = provider("vapi", non_empty(&keys.vapi_api_key));
    vapi_status.is_configured &= vapi_ready;
    providers.push(vapi_status);

    let mut supabase_status = provider("supabase", non_empty(&supabase.service_key));
    supabase_status.is_configured &= non_empty(&supabase.url).is_some();
    providers.push(supabase_status);

    let config_path = crate::config::get_config_path();
    let response = SettingsResponse {
        config_file_path: config_path.to_string_lossy().to_string(),
        providers,
        call_summary_backend: data.call_summary_backend.to_string(),
    };

    Ok(HttpResponse::Ok().json(response))
}
