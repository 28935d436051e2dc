pub mod agents;
pub mod call_summaries;
pub mod notes;
pub mod organizations;
pub mod settings;
pub mod voice;

use actix_web::{get, web, HttpResponse, Responder};
use std::sync::Arc;

use crate::database::CallSummaryStore;

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "MissionMatch API"
    }))
}

#[get("/health")]
async fn health(store: web::Data<Arc<dyn CallSummaryStore>>) -> impl Responder {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "store": store.backend()
        })),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "store": store.backend()
            }))
        }
    }
}

/// Registers every route. Handler state (`AgentAppState`, `SearchAppState`,
/// `VoiceAppState`, `SettingsAppState` and the shared store) is added by the caller.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(hello)
        .service(health)
        .route("/settings", web::get().to(settings::get_settings))
        .route("/api/agents/refine", web::post().to(agents::refine_mission))
        .route(
            "/api/organizations/search",
            web::post().to(organizations::search_organizations),
        )
        .route("/api/voice/call", web::post().to(voice::start_call))
        .route("/api/voice/call/{id}", web::get().to(voice::get_call_status))
        .route("/api/voice/webhook", web::post().to(voice::vapi_webhook))
        .route(
            "/api/call-summaries",
            web::get().to(call_summaries::get_call_summary),
        )
        .route("/api/notes", web::get().to(notes::list_notes));
}
