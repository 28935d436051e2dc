use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use missionmatch_api::config::ApiConfig;
use missionmatch_api::handlers::{self, agents, organizations, settings, voice};
use missionmatch_api::helpers::{services, store};
use std::sync::Arc;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    log_file_path: Option<String>,
}

fn init_tracing(log_file_path: Option<String>) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = log_file_path {
        let log_path = std::path::Path::new(&log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("missionmatch-api.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file_path);

    let (config, config_path) = ApiConfig::load().map_err(std::io::Error::other)?;
    tracing::info!("Loaded config from {}", config_path.display());

    let http = reqwest::Client::new();

    let call_store = store::build_call_summary_store(&config, &http).map_err(|e| {
        std::io::Error::other(format!("Failed to initialize call summary store: {e:#}"))
    })?;
    tracing::info!("Call summaries stored via {}", call_store.backend());

    let agent_state = agents::AgentAppState {
        refiner: services::build_mission_refiner(&config, &http),
    };
    let search_state = organizations::SearchAppState {
        search: Arc::new(services::build_organization_search(&config, &http)),
    };
    let voice_state = voice::VoiceAppState {
        vapi: services::build_vapi_client(&config, &http),
        store: call_store.clone(),
    };
    let settings_state = settings::SettingsAppState {
        config: Arc::new(config.clone()),
        call_summary_backend: call_store.backend(),
    };

    let server_config = config.server();
    let (host, port) = (server_config.host, server_config.port);
    let cors_config = config.cors.clone();

    tracing::info!("Starting server on {}:{}", host, port);

    let server = HttpServer::new(move || {
        // Configure CORS
        let cors = if let Some(cors_config) = &cors_config {
            let mut cors_builder = Cors::default();
            for origin in &cors_config.allowed_origins {
                cors_builder = cors_builder.allowed_origin(origin);
            }
            cors_builder
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
                .max_age(3600)
        } else {
            Cors::default()
                .allow_any_origin()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(call_store.clone()))
            .app_data(web::Data::new(agent_state.clone()))
            .app_data(web::Data::new(search_state.clone()))
            .app_data(web::Data::new(voice_state.clone()))
            .app_data(web::Data::new(settings_state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((host.as_str(), port))?
    .run();

    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }

        tracing::info!("Ctrl+C received, shutting down...");
        handle.stop(true).await;
    });

    server.await
}
