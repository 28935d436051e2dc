use actix_web::{web, HttpResponse, Result as ActixResult};
use providers::{OutboundCall, ServerMessageEnvelope, VapiClient};
use shared_types::{
    normalize_e164, summary_key, CallStatusResponse, ErrorResponse, VoiceCallRequest,
    VoiceCallResponse,
};
use std::sync::Arc;

use crate::database::{CallIdentity, CallSummaryStore};

#[derive(Clone)]
pub struct VoiceAppState {
    pub vapi: Option<Arc<VapiClient>>,
    pub store: Arc<dyn CallSummaryStore>,
}

fn default_first_message(organization_name: Option<&str>) -> String {
    match organization_name {
        Some(name) => format!(
            "Hi, I'm calling on behalf of a local volunteer who would like to help {name}. Do you have a moment?"
        ),
        None => "Hi, I'm calling on behalf of a local volunteer who would like to help. Do you have a moment?"
            .to_string(),
    }
}

fn not_configured() -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse::new("Voice calling is not configured"))
}

pub async fn start_call(
    state: web::Data<VoiceAppState>,
    request: web::Json<VoiceCallRequest>,
) -> ActixResult<HttpResponse> {
    let request = request.into_inner();

    let to = match request.to.as_deref().map(normalize_e164) {
        Some(Ok(to)) => to,
        Some(Err(e)) => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(format!(
                "Invalid phone number: {e}"
            ))));
        }
        None => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("to is required")));
        }
    };

    let Some(vapi) = state.vapi.as_ref() else {
        tracing::error!("Voice call requested but VAPI is not configured");
        return Ok(not_configured());
    };

    let organization_name = request
        .organization_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let first_message = request
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_first_message(organization_name.as_deref()));

    let call = OutboundCall {
        to: to.clone(),
        first_message,
        organization_name: organization_name.clone(),
    };

    let call_id = match vapi.create_call(&call).await {
        Ok(call_id) => call_id,
        Err(e) => {
            tracing::error!("Failed to start call to {}: {}", to, e);
            return Ok(HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Failed to start call")));
        }
    };

    let identity = CallIdentity {
        key: to.clone(),
        call_id: Some(call_id.clone()),
        phone: Some(to),
        organization_name,
    };
    if let Err(e) = state.store.record_call(&identity).await {
        tracing::warn!("Failed to record call {}: {}", call_id, e);
    }

    Ok(HttpResponse::Ok().json(VoiceCallResponse { ok: true, call_id }))
}

/// Reports whether a call has ended. An ended call's summary is stored before
/// the response goes out so a follow-up summary lookup finds it.
pub async fn get_call_status(
    state: web::Data<VoiceAppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let call_id = path.into_inner();

    let Some(vapi) = state.vapi.as_ref() else {
        return Ok(not_configured());
    };

    let call = match vapi.get_call(&call_id).await {
        Ok(call) => call,
        Err(e) => {
            tracing::error!("Failed to fetch call {}: {}", call_id, e);
            return Ok(HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Failed to fetch call status")));
        }
    };

    if !call.is_ended() {
        return Ok(HttpResponse::Ok().json(CallStatusResponse {
            ok: true,
            completed: false,
            summary: None,
        }));
    }

    let summary = call.call_summary();
    if let Some(summary) = &summary {
        let phone = call.customer_number();
        if let Some(key) = summary_key(phone, Some(call.id.as_str())) {
            let identity = CallIdentity {
                key: key.to_string(),
                call_id: Some(call.id.clone()),
                phone: phone.map(str::to_string),
                organization_name: None,
            };
            if let Err(e) = state.store.upsert_summary(&identity, summary).await {
                tracing::warn!("Failed to store summary for call {}: {}", call.id, e);
            }
        }
    }

    Ok(HttpResponse::Ok().json(CallStatusResponse {
        ok: true,
        completed: true,
        summary,
    }))
}

/// VAPI server-message webhook. Only `end-of-call-report` is acted on.
pub async fn vapi_webhook(
    state: web::Data<VoiceAppState>,
    payload: web::Json<ServerMessageEnvelope>,
) -> ActixResult<HttpResponse> {
    let message = payload.into_inner().message;

    if !message.is_end_of_call_report() {
        tracing::debug!("Ignoring VAPI server message {}", message.message_type);
        return Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })));
    }

    let call_id = message.call.as_ref().map(|c| c.id.clone());
    let phone = message.customer_number().map(str::to_string);
    let Some(key) = summary_key(phone.as_deref(), call_id.as_deref()).map(str::to_string) else {
        return Ok(HttpResponse::BadRequest()
            .json(ErrorResponse::new("end-of-call-report has no phone number or call id")));
    };

    let identity = CallIdentity {
        key,
        call_id,
        phone,
        organization_name: None,
    };
    let summary = message.call_summary();

    match state.store.upsert_summary(&identity, &summary).await {
        Ok(()) => {
            tracing::info!("Stored end-of-call report for {}", identity.key);
            Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
        }
        Err(e) => {
            tracing::error!("Failed to store end-of-call report for {}: {}", identity.key, e);
            Ok(HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Failed to store call summary")))
        }
    }
}
