pub mod call_records;
pub mod migrations;
pub mod noop;

pub use call_records::SqliteCallSummaryStore;
pub use noop::NoopCallSummaryStore;

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use shared_types::{CallRecord, CallSummary};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Invalid stored summary: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote store returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },
}

/// Identifies the call a record belongs to. `key` is the phone number when
/// known, otherwise the VAPI call id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallIdentity {
    pub key: String,
    pub call_id: Option<String>,
    pub phone: Option<String>,
    pub organization_name: Option<String>,
}

impl CallIdentity {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }
}

/// Persistence for call records and their summaries
#[async_trait]
pub trait CallSummaryStore: Send + Sync {
    fn backend(&self) -> &'static str;

    /// Records a freshly placed call. Any summary previously stored under the
    /// same key is cleared so the record reads as pending again.
    async fn record_call(&self, identity: &CallIdentity) -> Result<(), StoreError>;

    /// Inserts or updates the summary for `identity.key`. Identity fields that
    /// are `None` keep their stored value.
    async fn upsert_summary(
        &self,
        identity: &CallIdentity,
        summary: &CallSummary,
    ) -> Result<(), StoreError>;

    /// Looks a summary up by record key or by call id
    async fn get_summary(&self, key: &str) -> Result<Option<CallSummary>, StoreError>;

    /// Most recently updated records first
    async fn list_records(&self, limit: usize) -> Result<Vec<CallRecord>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Clone)]
pub struct AsyncDbConnection {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl AsyncDbConnection {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn lock(&self) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.pool.get()?)
    }
}

pub struct Database {
    pub async_connection: AsyncDbConnection,
}

impl Database {
    /// Create a new database connection and run migrations
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        // Ensure directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Run migrations before the pool opens so every pooled connection sees the schema
        {
            let conn = Connection::open(db_path)?;
            migrations::run_migrations(&conn)?;
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            Ok(())
        });

        let pool = Pool::builder().max_size(8).build(manager)?;

        Ok(Database {
            async_connection: AsyncDbConnection::new(pool),
        })
    }
}
