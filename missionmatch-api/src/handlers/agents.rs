use actix_web::{web, HttpResponse, Result as ActixResult};
use missionmatch_agents::MissionRefinerAgent;
use shared_types::{ErrorResponse, RefineRequest, RefineResponse};
use std::sync::Arc;

#[derive(Clone)]
pub struct AgentAppState {
    pub refiner: Option<Arc<MissionRefinerAgent>>,
}

pub async fn refine_mission(
    state: web::Data<AgentAppState>,
    request: web::Json<RefineRequest>,
) -> ActixResult<HttpResponse> {
    let received = request.into_inner();

    let mission = match received.mission.as_deref().map(str::trim) {
        Some(mission) if !mission.is_empty() => mission.to_string(),
        _ => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("mission is required")));
        }
    };

    let Some(refiner) = state.refiner.as_ref() else {
        tracing::error!("Refine requested but the mission refiner is not configured");
        return Ok(HttpResponse::InternalServerError()
            .json(ErrorResponse::new("Mission refiner is not configured")));
    };

    let location = received.location.clone().unwrap_or_default();
    let timestamp = received
        .timestamp
        .clone()
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

    tracing::info!("Refining mission for location {:?}", location);

    match refiner.execute(&location, &mission, &timestamp).await {
        Ok(agent_response) => Ok(HttpResponse::Ok().json(RefineResponse {
            ok: true,
            received,
            agent_response,
        })),
        Err(e) => {
            tracing::error!("Mission refiner failed: {:#}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Failed to refine mission")))
        }
    }
}
