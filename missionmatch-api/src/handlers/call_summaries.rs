use actix_web::{web, HttpResponse, Result as ActixResult};
use serde::Deserialize;
use shared_types::{CallSummaryResponse, ErrorResponse};
use std::sync::Arc;

use crate::database::CallSummaryStore;

#[derive(Deserialize)]
pub struct SummaryQuery {
    key: Option<String>,
}

/// Looks a stored summary up by phone number or call id
pub async fn get_call_summary(
    store: web::Data<Arc<dyn CallSummaryStore>>,
    query: web::Query<SummaryQuery>,
) -> ActixResult<HttpResponse> {
    let key = match query.key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => key,
        _ => return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("key is required"))),
    };

    let data = store.get_summary(key).await.map_err(|e| {
        tracing::error!("Failed to read call summary {}: {}", key, e);
        actix_web::error::ErrorInternalServerError("Failed to read call summary")
    })?;

    Ok(HttpResponse::Ok().json(CallSummaryResponse { ok: true, data }))
}
