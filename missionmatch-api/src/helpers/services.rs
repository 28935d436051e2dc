use crate::config::{non_empty, ApiConfig};
use missionmatch_agents::llm::claude::DEFAULT_MODEL;
use missionmatch_agents::{ClaudeClient, LlmClient, MissionRefinerAgent, MissionToolExecutor};
use providers::{
    OrganizationProvider, OrganizationSearch, PlacesClient, TavilyClient, VapiClient,
    VapiSettings, WebSearch,
};
use std::sync::Arc;

const DEFAULT_MAX_TOKENS: u32 = 1024;

pub fn build_tavily_client(config: &ApiConfig, http: &reqwest::Client) -> Option<Arc<TavilyClient>> {
    let keys = config.api_keys();
    non_empty(&keys.tavily_api_key).map(|key| Arc::new(TavilyClient::new(http.clone(), key)))
}

/// Refiner agent, or `None` when no Anthropic key is configured
pub fn build_mission_refiner(
    config: &ApiConfig,
    http: &reqwest::Client,
) -> Option<Arc<MissionRefinerAgent>> {
    let keys = config.api_keys();
    let Some(anthropic_key) = non_empty(&keys.anthropic_api_key) else {
        tracing::warn!("anthropic_api_key not set; mission refinement disabled");
        return None;
    };

    let llm: Arc<dyn LlmClient> = Arc::new(ClaudeClient::new(http.clone(), anthropic_key));
    let web_search = build_tavily_client(config, http).map(|c| c as Arc<dyn WebSearch>);
    if web_search.is_none() {
        tracing::info!("tavily_api_key not set; refiner runs without web search");
    }

    let agent_config = config.agent.clone().unwrap_or_default();
    let agent = MissionRefinerAgent::new(llm, Arc::new(MissionToolExecutor::new(web_search)))
        .with_model(
            non_empty(&agent_config.model)
                .unwrap_or(DEFAULT_MODEL)
                .to_string(),
        )
        .with_max_tokens(agent_config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS));

    Some(Arc::new(agent))
}

/// Organization search over every provider that has a key
pub fn build_organization_search(config: &ApiConfig, http: &reqwest::Client) -> OrganizationSearch {
    let keys = config.api_keys();
    let mut sources: Vec<Arc<dyn OrganizationProvider>> = Vec::new();

    if let Some(key) = non_empty(&keys.google_places_api_key) {
        sources.push(Arc::new(PlacesClient::new(http.clone(), key)));
    }
    if let Some(tavily) = build_tavily_client(config, http) {
        sources.push(tavily);
    }

    let search = OrganizationSearch::new(sources);
    if search.is_empty() {
        tracing::warn!("No organization search providers configured");
    } else {
        tracing::info!("Organization search providers: {:?}", search.provider_names());
    }
    search
}

/// VAPI client, or `None` unless the key, phone number id and assistant id are all set
pub fn build_vapi_client(config: &ApiConfig, http: &reqwest::Client) -> Option<Arc<VapiClient>> {
    let keys = config.api_keys();
    let vapi = config.vapi.clone().unwrap_or_default();

    match (
        non_empty(&keys.vapi_api_key),
        non_empty(&vapi.phone_number_id),
        non_empty(&vapi.assistant_id),
    ) {
        (Some(api_key), Some(phone_number_id), Some(assistant_id)) => {
            let settings = VapiSettings {
                api_key: api_key.to_string(),
                phone_number_id: phone_number_id.to_string(),
                assistant_id: assistant_id.to_string(),
            };
            Some(Arc::new(VapiClient::new(http.clone(), settings)))
        }
        _ => {
            tracing::warn!("VAPI is not fully configured; voice calls disabled");
            None
        }
    }
}
