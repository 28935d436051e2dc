use crate::config::{non_empty, ApiConfig, CallSummaryBackend};
use crate::database::{CallSummaryStore, NoopCallSummaryStore, SqliteCallSummaryStore};
use crate::integrations::supabase::{SupabaseCallSummaryStore, DEFAULT_TABLE};
use std::sync::Arc;

/// Builds the call summary store selected by `[call_summaries] backend`.
///
/// Supabase without a URL and service key falls back to the no-op store.
pub fn build_call_summary_store(
    config: &ApiConfig,
    http: &reqwest::Client,
) -> anyhow::Result<Arc<dyn CallSummaryStore>> {
    match config.call_summary_backend() {
        CallSummaryBackend::Sqlite => {
            let db_path = super::database::get_db_path(config)?;
            let db = super::database::initialize_database(&db_path)?;
            Ok(Arc::new(SqliteCallSummaryStore::new(db.async_connection.clone())))
        }
        CallSummaryBackend::Supabase => {
            let supabase = config.supabase.clone().unwrap_or_default();
            match (non_empty(&supabase.url), non_empty(&supabase.service_key)) {
                (Some(url), Some(service_key)) => {
                    let table = non_empty(&supabase.table).unwrap_or(DEFAULT_TABLE);
                    tracing::info!("Storing call summaries in Supabase table {}", table);
                    Ok(Arc::new(SupabaseCallSummaryStore::new(
                        http.clone(),
                        url,
                        service_key,
                        table,
                    )))
                }
                _ => {
                    tracing::warn!(
                        "Supabase selected for call summaries but url/service_key are missing; summaries will not be stored"
                    );
                    Ok(Arc::new(NoopCallSummaryStore))
                }
            }
        }
        CallSummaryBackend::None => {
            tracing::info!("Call summary storage disabled");
            Ok(Arc::new(NoopCallSummaryStore))
        }
    }
}
