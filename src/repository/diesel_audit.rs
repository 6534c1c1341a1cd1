//! Diesel-based audit log repository.
//!
//! Append-only: entries are inserted and listed, never updated or removed.

use async_trait::async_trait;
use diesel::prelude::*;

use super::diesel_models::{AuditLogRecord, NewAuditLog};
use super::diesel_pool::{run_blocking, DieselError, SqlitePool};
use super::{now_rfc3339, parse_datetime};
use crate::models::{AuditEntry, AuditRecord};
use crate::registry::EntityType;
use crate::schema::audit_log;
use crate::services::AuditSink;

impl From<AuditLogRecord> for AuditRecord {
    fn from(record: AuditLogRecord) -> Self {
        AuditRecord {
            id: record.id,
            user_id: record.user_id,
            username: record.username,
            action: record.action,
            target_type: record.target_type,
            target_id: record.target_id,
            details: record.details,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

/// Diesel-based audit log repository.
#[derive(Clone)]
pub struct DieselAuditLogRepository {
    pool: SqlitePool,
}

impl DieselAuditLogRepository {
    /// Create a new audit log repository with an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    pub async fn append(&self, entry: &AuditEntry) -> Result<(), DieselError> {
        let entry = entry.clone();
        let now = now_rfc3339();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            diesel::insert_into(audit_log::table)
                .values(&NewAuditLog {
                    user_id: entry.user_id,
                    username: &entry.username,
                    action: entry.action.as_str(),
                    target_type: entry.target_type.as_str(),
                    target_id: entry.target_id,
                    details: entry.details.as_deref(),
                    created_at: &now,
                })
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    /// Most recent entries first.
    pub async fn get_recent(&self, limit: u32) -> Result<Vec<AuditRecord>, DieselError> {
        let limit = limit as i64;
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            audit_log::table
                .order((audit_log::created_at.desc(), audit_log::id.desc()))
                .limit(limit)
                .select(AuditLogRecord::as_select())
                .load(conn)
        })
        .await
        .map(|records| records.into_iter().map(AuditRecord::from).collect())
    }

    /// History of one record, oldest first.
    pub async fn get_for_target(
        &self,
        entity: EntityType,
        id: i32,
    ) -> Result<Vec<AuditRecord>, DieselError> {
        let target_type = entity.as_str();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            audit_log::table
                .filter(audit_log::target_type.eq(target_type))
                .filter(audit_log::target_id.eq(id))
                .order(audit_log::id.asc())
                .select(AuditLogRecord::as_select())
                .load(conn)
        })
        .await
        .map(|records| records.into_iter().map(AuditRecord::from).collect())
    }
}

#[async_trait]
impl AuditSink for DieselAuditLogRepository {
    async fn record(&self, entry: &AuditEntry) -> anyhow::Result<()> {
        self.append(entry).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuditAction;
    use crate::repository::test_support::setup_test_db;

    fn entry(action: AuditAction, target_id: i32) -> AuditEntry {
        AuditEntry {
            user_id: Some(1),
            username: "nadia".to_string(),
            action,
            target_type: EntityType::Candidate,
            target_id,
            details: Some("{\"dependents\":3}".to_string()),
        }
    }

    #[tokio::test]
    async fn test_audit_log_append_and_query() {
        let (pool, _dir) = setup_test_db().await;
        let repo = DieselAuditLogRepository::new(pool);

        repo.append(&entry(AuditAction::SoftDelete, 7)).await.unwrap();
        repo.append(&entry(AuditAction::Restore, 7)).await.unwrap();
        repo.append(&entry(AuditAction::SoftDelete, 8)).await.unwrap();

        let history = repo.get_for_target(EntityType::Candidate, 7).await.unwrap();
        let actions: Vec<&str> = history.iter().map(|r| r.action.as_str()).collect();
        assert_eq!(actions, vec!["soft_delete", "restore"]);
        assert_eq!(history[0].target_type, "candidates");

        let recent = repo.get_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].target_id, 8);
    }
}
