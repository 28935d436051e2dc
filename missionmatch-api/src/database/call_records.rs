use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use shared_types::{CallRecord, CallSummary};

use super::{AsyncDbConnection, CallIdentity, CallSummaryStore, StoreError};

/// SQLite-backed call summary store (the default backend)
#[derive(Clone)]
pub struct SqliteCallSummaryStore {
    conn: AsyncDbConnection,
}

impl SqliteCallSummaryStore {
    pub fn new(conn: AsyncDbConnection) -> Self {
        Self { conn }
    }
}

fn parse_summary(raw: Option<String>) -> Result<Option<CallSummary>, StoreError> {
    match raw {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<(CallRecord, Option<String>)> {
    Ok((
        CallRecord {
            key: row.get(0)?,
            call_id: row.get(1)?,
            phone: row.get(2)?,
            organization_name: row.get(3)?,
            summary: None,
            updated_at: row.get(5)?,
        },
        row.get(4)?,
    ))
}

#[async_trait]
impl CallSummaryStore for SqliteCallSummaryStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn record_call(&self, identity: &CallIdentity) -> Result<(), StoreError> {
        let conn = self.conn.lock().await?;
        let now = chrono::Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO call_records
             (key, call_id, phone, organization_name, summary, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?5)
             ON CONFLICT(key) DO UPDATE SET
                call_id = COALESCE(excluded.call_id, call_records.call_id),
                phone = COALESCE(excluded.phone, call_records.phone),
                organization_name = COALESCE(excluded.organization_name, call_records.organization_name),
                summary = NULL,
                updated_at = excluded.updated_at",
            params![
                identity.key,
                identity.call_id,
                identity.phone,
                identity.organization_name,
                now,
            ],
        )?;

        tracing::debug!("Recorded call under key {}", identity.key);
        Ok(())
    }

    async fn upsert_summary(
        &self,
        identity: &CallIdentity,
        summary: &CallSummary,
    ) -> Result<(), StoreError> {
        let summary_json = serde_json::to_string(summary)?;
        let conn = self.conn.lock().await?;
        let now = chrono::Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO call_records
             (key, call_id, phone, organization_name, summary, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(key) DO UPDATE SET
                call_id = COALESCE(excluded.call_id, call_records.call_id),
                phone = COALESCE(excluded.phone, call_records.phone),
                organization_name = COALESCE(excluded.organization_name, call_records.organization_name),
                summary = excluded.summary,
                updated_at = excluded.updated_at",
            params![
                identity.key,
                identity.call_id,
                identity.phone,
                identity.organization_name,
                summary_json,
                now,
            ],
        )?;

        tracing::debug!("Stored call summary under key {}", identity.key);
        Ok(())
    }

    async fn get_summary(&self, key: &str) -> Result<Option<CallSummary>, StoreError> {
        let conn = self.conn.lock().await?;

        let raw: Option<Option<String>> = conn
            .query_row(
                "SELECT summary FROM call_records
                 WHERE key = ?1 OR call_id = ?1
                 ORDER BY (key = ?1) DESC, updated_at DESC
                 LIMIT 1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        parse_summary(raw.flatten())
    }

    async fn list_records(&self, limit: usize) -> Result<Vec<CallRecord>, StoreError> {
        let conn = self.conn.lock().await?;

        let mut stmt = conn.prepare(
            "SELECT key, call_id, phone, organization_name, summary, updated_at
             FROM call_records
             ORDER BY updated_at DESC
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit as i64], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(rows.len());
        for (mut record, raw_summary) in rows {
            record.summary = match parse_summary(raw_summary) {
                Ok(summary) => summary,
                Err(e) => {
                    tracing::warn!("Skipping unreadable summary for {}: {}", record.key, e);
                    None
                }
            };
            records.push(record);
        }

        Ok(records)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().await?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn store() -> (tempfile::TempDir, SqliteCallSummaryStore) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("db.sqlite")).unwrap();
        (dir, SqliteCallSummaryStore::new(db.async_connection))
    }

    fn identity(key: &str, call_id: &str) -> CallIdentity {
        CallIdentity {
            key: key.to_string(),
            call_id: Some(call_id.to_string()),
            phone: Some(key.to_string()),
            organization_name: Some("Food Bank".to_string()),
        }
    }

    fn summary(text: &str) -> CallSummary {
        CallSummary {
            summary: text.to_string(),
            interested: Some(true),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_recorded_call_is_pending() {
        let (_dir, store) = store();
        store.record_call(&identity("+14155551212", "call-1")).await.unwrap();

        assert!(store.get_summary("+14155551212").await.unwrap().is_none());

        let records = store.list_records(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].organization_name.as_deref(), Some("Food Bank"));
        assert!(records[0].summary.is_none());
    }

    #[tokio::test]
    async fn test_upsert_then_lookup_by_key_or_call_id() {
        let (_dir, store) = store();
        store.record_call(&identity("+14155551212", "call-1")).await.unwrap();

        // Status updates usually know only the key and call id
        let update = CallIdentity {
            call_id: Some("call-1".to_string()),
            ..CallIdentity::new("+14155551212")
        };
        store.upsert_summary(&update, &summary("They need drivers.")).await.unwrap();

        let by_phone = store.get_summary("+14155551212").await.unwrap().unwrap();
        assert_eq!(by_phone.summary, "They need drivers.");
        let by_call = store.get_summary("call-1").await.unwrap().unwrap();
        assert_eq!(by_call, by_phone);

        let records = store.list_records(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].organization_name.as_deref(), Some("Food Bank"));
    }

    #[tokio::test]
    async fn test_new_call_clears_previous_summary() {
        let (_dir, store) = store();
        store
            .upsert_summary(&identity("+14155551212", "call-1"), &summary("First call."))
            .await
            .unwrap();
        store.record_call(&identity("+14155551212", "call-2")).await.unwrap();

        assert!(store.get_summary("+14155551212").await.unwrap().is_none());
        let records = store.list_records(10).await.unwrap();
        assert_eq!(records[0].call_id.as_deref(), Some("call-2"));
    }

    #[tokio::test]
    async fn test_list_records_newest_first_with_limit() {
        let (_dir, store) = store();
        for (i, phone) in ["+14155550001", "+14155550002", "+14155550003"].iter().enumerate() {
            store
                .upsert_summary(&identity(phone, &format!("call-{i}")), &summary("ok"))
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let records = store.list_records(2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, "+14155550003");
        assert_eq!(records[1].key, "+14155550002");
    }

    #[tokio::test]
    async fn test_ping_and_missing_key() {
        let (_dir, store) = store();
        store.ping().await.unwrap();
        assert!(store.get_summary("nobody").await.unwrap().is_none());
    }
}
