//! Persistence seam for analysis history. The analysis core never reads the
//! store back; a failing store must never fail a request.

use crate::types::AnalysisRecord;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn record(&self, record: AnalysisRecord) -> Result<()>;

    /// Most recent records, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>>;
}

/// Bounded in-memory store. Oldest records are dropped once the capacity is
/// exceeded.
pub struct MemoryStore {
    capacity: usize,
    records: RwLock<Vec<AnalysisRecord>>,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn record(&self, record: AnalysisRecord) -> Result<()> {
        debug!(id = %record.id, "recording analysis");

        let mut records = self.records.write().await;
        records.push(record);

        if records.len() > self.capacity {
            let excess = records.len() - self.capacity;
            records.drain(0..excess);
        }

        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }
}

/// Used when history is disabled; accepts and discards everything.
pub struct NoopStore;

#[async_trait]
impl AnalysisStore for NoopStore {
    async fn record(&self, _record: AnalysisRecord) -> Result<()> {
        Ok(())
    }

    async fn recent(&self, _limit: usize) -> Result<Vec<AnalysisRecord>> {
        Ok(Vec::new())
    }
}
