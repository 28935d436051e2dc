use async_trait::async_trait;
use shared_types::{CallRecord, CallSummary};

use super::{CallIdentity, CallSummaryStore, StoreError};

/// Used when call summaries are not persisted: writes succeed, reads find nothing.
#[derive(Debug, Default, Clone)]
pub struct NoopCallSummaryStore;

#[async_trait]
impl CallSummaryStore for NoopCallSummaryStore {
    fn backend(&self) -> &'static str {
        "none"
    }

    async fn record_call(&self, identity: &CallIdentity) -> Result<(), StoreError> {
        tracing::debug!("Call summaries disabled, not recording {}", identity.key);
        Ok(())
    }

    async fn upsert_summary(
        &self,
        identity: &CallIdentity,
        _summary: &CallSummary,
    ) -> Result<(), StoreError> {
        tracing::debug!("Call summaries disabled, dropping summary for {}", identity.key);
        Ok(())
    }

    async fn get_summary(&self, _key: &str) -> Result<Option<CallSummary>, StoreError> {
        Ok(None)
    }

    async fn list_records(&self, _limit: usize) -> Result<Vec<CallRecord>, StoreError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_succeed_reads_are_empty() {
        let store = NoopCallSummaryStore;
        let identity = CallIdentity::new("+14155551212");
        store.record_call(&identity).await.unwrap();
        store
            .upsert_summary(&identity, &CallSummary::default())
            .await
            .unwrap();

        assert!(store.get_summary("+14155551212").await.unwrap().is_none());
        assert!(store.list_records(10).await.unwrap().is_empty());
    }
}
