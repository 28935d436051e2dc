use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use shared_types::{CallRecord, CallSummary};

use crate::database::{CallIdentity, CallSummaryStore, StoreError};

pub const DEFAULT_TABLE: &str = "call_summaries";

#[derive(Debug, Deserialize)]
struct SupabaseRow {
    key: String,
    #[serde(default)]
    call_id: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    organization_name: Option<String>,
    #[serde(default)]
    summary: Option<CallSummary>,
    #[serde(default)]
    updated_at: Option<i64>,
}

impl From<SupabaseRow> for CallRecord {
    fn from(row: SupabaseRow) -> Self {
        CallRecord {
            key: row.key,
            call_id: row.call_id,
            phone: row.phone,
            organization_name: row.organization_name,
            summary: row.summary,
            updated_at: row.updated_at.unwrap_or_default(),
        }
    }
}

/// Call summary store backed by a Supabase table through PostgREST.
///
/// Writes are upserts on the `key` column with
/// `Prefer: resolution=merge-duplicates`; columns absent from the payload keep
/// their stored values.
pub struct SupabaseCallSummaryStore {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
    table: String,
}

impl SupabaseCallSummaryStore {
    pub fn new(
        http: reqwest::Client,
        url: impl Into<String>,
        service_key: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            table: table.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn upsert_row(&self, row: Map<String, Value>) -> Result<(), StoreError> {
        let response = self
            .authorized(self.http.post(self.table_url()))
            .query(&[("on_conflict", "key")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&Value::Object(row))
            .send()
            .await?;

        check(response).await.map(|_| ())
    }

    async fn select(&self, query: &[(&str, String)]) -> Result<Vec<SupabaseRow>, StoreError> {
        let response = self
            .authorized(self.http.get(self.table_url()))
            .query(query)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Remote {
            status: status.as_u16(),
            body,
        })
    }
}

fn identity_row(identity: &CallIdentity) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert("key".to_string(), Value::from(identity.key.as_str()));
    let optional = [
        ("call_id", &identity.call_id),
        ("phone", &identity.phone),
        ("organization_name", &identity.organization_name),
    ];
    for (column, value) in optional {
        if let Some(value) = value {
            row.insert(column.to_string(), Value::from(value.as_str()));
        }
    }
    row.insert(
        "updated_at".to_string(),
        Value::from(chrono::Utc::now().timestamp_millis()),
    );
    row
}

/// PostgREST filter value, quoted so `+` and `.` in phone numbers and ids survive
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

#[async_trait]
impl CallSummaryStore for SupabaseCallSummaryStore {
    fn backend(&self) -> &'static str {
        "supabase"
    }

    async fn record_call(&self, identity: &CallIdentity) -> Result<(), StoreError> {
        let mut row = identity_row(identity);
        row.insert("summary".to_string(), Value::Null);
        self.upsert_row(row).await
    }

    async fn upsert_summary(
        &self,
        identity: &CallIdentity,
        summary: &CallSummary,
    ) -> Result<(), StoreError> {
        let mut row = identity_row(identity);
        row.insert("summary".to_string(), serde_json::to_value(summary)?);
        self.upsert_row(row).await
    }

    async fn get_summary(&self, key: &str) -> Result<Option<CallSummary>, StoreError> {
        let value = quoted(key);
        let rows = self
            .select(&[
                ("select", "*".to_string()),
                ("or", format!("(key.eq.{value},call_id.eq.{value})")),
                ("order", "updated_at.desc".to_string()),
                ("limit", "5".to_string()),
            ])
            .await?;

        // Prefer the row keyed by `key` over one that only matches by call id
        let preferred = rows.iter().position(|row| row.key == key).unwrap_or(0);
        Ok(rows.into_iter().nth(preferred).and_then(|row| row.summary))
    }

    async fn list_records(&self, limit: usize) -> Result<Vec<CallRecord>, StoreError> {
        let rows = self
            .select(&[
                ("select", "*".to_string()),
                ("order", "updated_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .await?;

        Ok(rows.into_iter().map(CallRecord::from).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.select(&[("select", "key".to_string()), ("limit", "1".to_string())])
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn store(server: &mockito::Server) -> SupabaseCallSummaryStore {
        SupabaseCallSummaryStore::new(reqwest::Client::new(), server.url(), "service-key", "notes")
    }

    #[tokio::test]
    async fn test_upsert_summary_merges_on_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/notes")
            .match_query(Matcher::UrlEncoded("on_conflict".into(), "key".into()))
            .match_header("apikey", "service-key")
            .match_header("authorization", "Bearer service-key")
            .match_header("prefer", "resolution=merge-duplicates,return=minimal")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "key": "+14155551212",
                "call_id": "call-1",
                "summary": { "summary": "They need drivers.", "interested": true }
            })))
            .with_status(201)
            .create_async()
            .await;

        let identity = CallIdentity {
            call_id: Some("call-1".to_string()),
            ..CallIdentity::new("+14155551212")
        };
        let summary = CallSummary {
            summary: "They need drivers.".to_string(),
            interested: Some(true),
            ..Default::default()
        };
        store(&server).upsert_summary(&identity, &summary).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_record_call_clears_summary() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/notes")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "key": "+14155551212",
                "organization_name": "Food Bank",
                "summary": null
            })))
            .with_status(201)
            .create_async()
            .await;

        let identity = CallIdentity {
            organization_name: Some("Food Bank".to_string()),
            ..CallIdentity::new("+14155551212")
        };
        store(&server).record_call(&identity).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_summary_matches_key_or_call_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/notes")
            .match_query(Matcher::UrlEncoded(
                "or".into(),
                "(key.eq.\"call-1\",call_id.eq.\"call-1\")".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"key":"+14155551212","call_id":"call-1","summary":{"summary":"Call back Monday.","callbackDate":"Monday"},"updated_at":10}]"#,
            )
            .create_async()
            .await;

        let summary = store(&server).get_summary("call-1").await.unwrap().unwrap();

        mock.assert_async().await;
        assert_eq!(summary.summary, "Call back Monday.");
        assert_eq!(summary.callback_date.as_deref(), Some("Monday"));
    }

    #[tokio::test]
    async fn test_list_records_and_remote_error() {
        let mut server = mockito::Server::new_async().await;
        let _list = server
            .mock("GET", "/rest/v1/notes")
            .match_query(Matcher::UrlEncoded("limit".into(), "50".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"key":"call-9","summary":null}]"#)
            .create_async()
            .await;

        let records = store(&server).list_records(50).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "call-9");
        assert!(records[0].summary.is_none());

        let _fail = server
            .mock("GET", "/rest/v1/notes")
            .match_query(Matcher::UrlEncoded("limit".into(), "1".into()))
            .with_status(401)
            .with_body("invalid key")
            .create_async()
            .await;

        match store(&server).ping().await {
            Err(StoreError::Remote { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid key");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
