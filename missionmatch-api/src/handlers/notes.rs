use actix_web::{web, HttpResponse, Result as ActixResult};
use shared_types::{NotesResponse, OrgNote};
use std::sync::Arc;

use crate::database::CallSummaryStore;

const NOTES_LIMIT: usize = 500;

pub async fn list_notes(store: web::Data<Arc<dyn CallSummaryStore>>) -> ActixResult<HttpResponse> {
    let records = store.list_records(NOTES_LIMIT).await.map_err(|e| {
        tracing::error!("Failed to list call records: {}", e);
        actix_web::error::ErrorInternalServerError("Failed to list notes")
    })?;

    let notes = records.iter().map(OrgNote::from).collect();

    Ok(HttpResponse::Ok().json(NotesResponse { ok: true, notes }))
}
