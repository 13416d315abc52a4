use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::sync_log;
use crate::errors::ServiceError;
use crate::models::{SyncAudit, SyncStatus};

/// Persistence of submission audit records, keyed by order id.
///
/// `upsert` supersedes the existing record for the order (scheduled runs);
/// `append` always writes a fresh row (manual retriggers, for
/// traceability).
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn upsert(&self, record: SyncAudit) -> Result<(), ServiceError>;
    async fn append(&self, record: SyncAudit) -> Result<(), ServiceError>;
    async fn find_latest(&self, order_id: &str) -> Result<Option<SyncAudit>, ServiceError>;
}

/// Database-backed audit store.
pub struct SeaOrmAuditStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmAuditStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn latest_model(&self, order_id: &str) -> Result<Option<sync_log::Model>, ServiceError> {
        Ok(sync_log::Entity::find()
            .filter(sync_log::Column::OrderId.eq(order_id))
            .order_by_desc(sync_log::Column::CreatedAt)
            .one(&*self.db)
            .await?)
    }

    fn fresh_model(record: &SyncAudit) -> sync_log::ActiveModel {
        sync_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(record.order_id.clone()),
            status: Set(record.status.as_i32()),
            message: Set(record.message.clone()),
            correlation_id: Set(record.correlation_id.clone()),
            raw_response: Set(record.raw_response.clone()),
            retry_count: Set(record.retry_count),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
    }
}

#[async_trait]
impl AuditStore for SeaOrmAuditStore {
    async fn upsert(&self, record: SyncAudit) -> Result<(), ServiceError> {
        match self.latest_model(&record.order_id).await? {
            Some(existing) => {
                let mut active: sync_log::ActiveModel = existing.into();
                active.status = Set(record.status.as_i32());
                active.message = Set(record.message.clone());
                active.correlation_id = Set(record.correlation_id.clone());
                active.raw_response = Set(record.raw_response.clone());
                active.retry_count = Set(record.retry_count);
                active.updated_at = Set(Some(Utc::now()));
                active.update(&*self.db).await?;
            }
            None => {
                Self::fresh_model(&record).insert(&*self.db).await?;
            }
        }
        Ok(())
    }

    async fn append(&self, record: SyncAudit) -> Result<(), ServiceError> {
        Self::fresh_model(&record).insert(&*self.db).await?;
        Ok(())
    }

    async fn find_latest(&self, order_id: &str) -> Result<Option<SyncAudit>, ServiceError> {
        Ok(self.latest_model(order_id).await?.map(|model| SyncAudit {
            order_id: model.order_id,
            status: SyncStatus::from_i32(model.status),
            message: model.message,
            correlation_id: model.correlation_id,
            raw_response: model.raw_response,
            retry_count: model.retry_count,
        }))
    }
}

/// In-memory audit store for tests and degraded startup.
#[derive(Default)]
pub struct InMemoryAuditStore {
    records: DashMap<String, Vec<SyncAudit>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records for one order, oldest first.
    pub fn history(&self, order_id: &str) -> Vec<SyncAudit> {
        self.records
            .get(order_id)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn upsert(&self, record: SyncAudit) -> Result<(), ServiceError> {
        let mut entry = self.records.entry(record.order_id.clone()).or_default();
        if let Some(last) = entry.last_mut() {
            *last = record;
        } else {
            entry.push(record);
        }
        Ok(())
    }

    async fn append(&self, record: SyncAudit) -> Result<(), ServiceError> {
        self.records
            .entry(record.order_id.clone())
            .or_default()
            .push(record);
        Ok(())
    }

    async fn find_latest(&self, order_id: &str) -> Result<Option<SyncAudit>, ServiceError> {
        Ok(self
            .records
            .get(order_id)
            .and_then(|entry| entry.last().cloned()))
    }
}
