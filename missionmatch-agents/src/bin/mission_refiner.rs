use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use missionmatch_agents::llm::claude::DEFAULT_MODEL;
use missionmatch_agents::{ClaudeClient, LlmClient, MissionRefinerAgent, MissionToolExecutor};
use providers::{TavilyClient, WebSearch};

#[derive(Parser, Debug)]
#[command(name = "mission-refiner", about = "Run the mission refiner agent from the terminal")]
struct Cli {
    /// Free-text description of the help being offered
    #[arg(long)]
    mission: String,

    /// City or region to search around
    #[arg(long, default_value = "")]
    location: String,

    /// Override the Claude model ID
    #[arg(long)]
    model: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
struct ApiConfig {
    api_keys: Option<ApiKeysConfig>,
    agent: Option<AgentConfig>,
}

#[derive(Debug, Deserialize, Clone)]
struct ApiKeysConfig {
    anthropic_api_key: Option<String>,
    tavily_api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
struct AgentConfig {
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let (config, config_path) = load_api_config().context("Failed to load MissionMatch API config")?;
    let keys = config.api_keys.clone();

    let api_key = keys
        .as_ref()
        .and_then(|keys| keys.anthropic_api_key.clone())
        .ok_or_else(|| anyhow::anyhow!("Missing anthropic_api_key in config at {:?}", config_path))?;

    let http = reqwest::Client::new();
    let search: Option<Arc<dyn WebSearch>> = keys
        .and_then(|keys| keys.tavily_api_key)
        .map(|key| Arc::new(TavilyClient::new(http.clone(), key)) as Arc<dyn WebSearch>);
    if search.is_none() {
        tracing::warn!("tavily_api_key not set; the agent will run without web search");
    }

    let model = cli
        .model
        .or_else(|| config.agent.and_then(|agent| agent.model))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let llm_client: Arc<dyn LlmClient> = Arc::new(ClaudeClient::new(http, api_key));
    let agent = MissionRefinerAgent::new(llm_client, Arc::new(MissionToolExecutor::new(search)))
        .with_model(model);

    let timestamp = chrono::Utc::now().to_rfc3339();
    let result = agent.execute(&cli.location, &cli.mission, &timestamp).await?;

    println!("{result}");
    Ok(())
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init();
}

fn load_api_config() -> Result<(ApiConfig, PathBuf)> {
    let config_path = get_config_path();
    if !config_path.exists() {
        return Err(anyhow::anyhow!(
            "Config file not found at {:?}. Run missionmatch-api once or create it.",
            config_path
        ));
    }

    let builder = Config::builder()
        .add_source(File::from(config_path.clone()))
        .add_source(Environment::with_prefix("MISSIONMATCH").separator("__"))
        .build()?;

    let config: ApiConfig = builder.try_deserialize()?;
    Ok((config, config_path))
}

fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("missionmatch").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}
