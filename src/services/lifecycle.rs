//! Lifecycle service: the entry point the UI layer calls for soft delete,
//! restore, purge and the recycle bin.
//!
//! Each call checks permissions, runs one repository transaction, appends
//! an audit entry on success, and hands back an [`OpResult`] envelope
//! instead of an error so nothing throws across the IPC boundary.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::permissions::{PermissionChecker, RoleHierarchy};
use super::AuditSink;
use crate::error::{LifecycleError, LifecycleResult};
use crate::models::{
    ActingUser, AuditAction, AuditEntry, CascadeReport, DeletedRecord, PurgePolicy, PurgeReport,
    Role,
};
use crate::registry::EntityType;
use crate::repository::DieselLifecycleRepository;

/// Role needed to soft-delete or restore.
const MUTATE_ROLE: Role = Role::Staff;
/// Role needed to purge.
const PURGE_ROLE: Role = Role::SuperAdmin;

/// `{success, data?, error?, message?}` envelope returned to the UI.
///
/// `error` carries the stable code (`NotFound`, `PermissionDenied`, ...),
/// `message` the human-readable text.
#[derive(Debug, Clone, Serialize)]
pub struct OpResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> OpResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn failed(error: &LifecycleError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.code().to_string()),
            message: Some(error.to_string()),
        }
    }
}

impl<T> From<LifecycleResult<T>> for OpResult<T> {
    fn from(result: LifecycleResult<T>) -> Self {
        match result {
            Ok(data) => OpResult::ok(data),
            Err(e) => OpResult::failed(&e),
        }
    }
}

/// Lifecycle operations with permission checks and auditing.
#[derive(Clone)]
pub struct LifecycleService {
    repo: DieselLifecycleRepository,
    audit: Arc<dyn AuditSink>,
    permissions: Arc<dyn PermissionChecker>,
    purge_policy: PurgePolicy,
}

impl LifecycleService {
    /// Create a service using the role hierarchy and the default purge policy.
    pub fn new(repo: DieselLifecycleRepository, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            repo,
            audit,
            permissions: Arc::new(RoleHierarchy),
            purge_policy: PurgePolicy::default(),
        }
    }

    pub fn with_permissions(mut self, permissions: Arc<dyn PermissionChecker>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_purge_policy(mut self, purge_policy: PurgePolicy) -> Self {
        self.purge_policy = purge_policy;
        self
    }

    pub fn purge_policy(&self) -> PurgePolicy {
        self.purge_policy
    }

    /// Soft-delete a record and its dependents.
    pub async fn soft_delete(
        &self,
        entity: EntityType,
        id: i32,
        actor: &ActingUser,
    ) -> OpResult<CascadeReport> {
        self.try_soft_delete(entity, id, actor).await.into()
    }

    /// Restore a record and the dependents deleted with it.
    pub async fn restore(
        &self,
        entity: EntityType,
        id: i32,
        actor: &ActingUser,
    ) -> OpResult<CascadeReport> {
        self.try_restore(entity, id, actor).await.into()
    }

    /// Permanently remove a single record.
    pub async fn purge(
        &self,
        entity: EntityType,
        id: i32,
        actor: &ActingUser,
    ) -> OpResult<PurgeReport> {
        self.try_purge(entity, id, actor).await.into()
    }

    /// Recycle bin contents for one entity type.
    pub async fn list_deleted(&self, entity: EntityType) -> OpResult<Vec<DeletedRecord>> {
        self.try_list_deleted(entity, None).await.into()
    }

    pub async fn try_soft_delete(
        &self,
        entity: EntityType,
        id: i32,
        actor: &ActingUser,
    ) -> LifecycleResult<CascadeReport> {
        self.authorize(actor, MUTATE_ROLE)?;

        let report = match self.repo.soft_delete(entity, id).await {
            Ok(report) => report,
            Err(e) => {
                warn!(%entity, id, user = %actor.username, error = %e, "soft delete failed");
                return Err(e);
            }
        };

        info!(
            %entity,
            id,
            user = %actor.username,
            batch = report.batch_id.as_deref().unwrap_or("-"),
            dependents = report.dependent_count(),
            "soft deleted"
        );
        self.write_audit(actor, AuditAction::SoftDelete, entity, id, cascade_details(&report))
            .await;
        Ok(report)
    }

    pub async fn try_restore(
        &self,
        entity: EntityType,
        id: i32,
        actor: &ActingUser,
    ) -> LifecycleResult<CascadeReport> {
        self.authorize(actor, MUTATE_ROLE)?;

        let report = match self.repo.restore(entity, id).await {
            Ok(report) => report,
            Err(e) => {
                warn!(%entity, id, user = %actor.username, error = %e, "restore failed");
                return Err(e);
            }
        };

        info!(
            %entity,
            id,
            user = %actor.username,
            dependents = report.dependent_count(),
            "restored"
        );
        self.write_audit(actor, AuditAction::Restore, entity, id, cascade_details(&report))
            .await;
        Ok(report)
    }

    pub async fn try_purge(
        &self,
        entity: EntityType,
        id: i32,
        actor: &ActingUser,
    ) -> LifecycleResult<PurgeReport> {
        self.authorize(actor, PURGE_ROLE)?;

        let report = match self.repo.purge(entity, id, self.purge_policy).await {
            Ok(report) => report,
            Err(e) => {
                warn!(%entity, id, user = %actor.username, error = %e, "purge failed");
                return Err(e);
            }
        };

        if report.orphaned_dependents > 0 {
            warn!(
                %entity,
                id,
                orphaned = report.orphaned_dependents,
                "purge left dependent rows without a parent"
            );
        }
        info!(%entity, id, user = %actor.username, "purged");

        let details = json!({ "orphaned_dependents": report.orphaned_dependents }).to_string();
        self.write_audit(actor, AuditAction::Purge, entity, id, Some(details))
            .await;
        Ok(report)
    }

    pub async fn try_list_deleted(
        &self,
        entity: EntityType,
        limit: Option<u32>,
    ) -> LifecycleResult<Vec<DeletedRecord>> {
        Ok(self.repo.list_deleted(entity, limit).await?)
    }

    fn authorize(&self, actor: &ActingUser, required: Role) -> LifecycleResult<()> {
        if self.permissions.allows(actor, required) {
            return Ok(());
        }
        warn!(
            user = %actor.username,
            role = %actor.role,
            %required,
            "permission denied"
        );
        Err(LifecycleError::PermissionDenied {
            required,
            actual: actor.role,
        })
    }

    /// Audit failures are logged; the mutation has already committed.
    async fn write_audit(
        &self,
        actor: &ActingUser,
        action: AuditAction,
        entity: EntityType,
        id: i32,
        details: Option<String>,
    ) {
        let entry = AuditEntry {
            user_id: actor.id,
            username: actor.username.clone(),
            action,
            target_type: entity,
            target_id: id,
            details,
        };
        if let Err(e) = self.audit.record(&entry).await {
            warn!(
                action = action.as_str(),
                %entity,
                id,
                error = %e,
                "failed to write audit entry"
            );
        }
    }
}

fn cascade_details(report: &CascadeReport) -> Option<String> {
    let counts: serde_json::Map<String, serde_json::Value> = report
        .dependents
        .iter()
        .map(|(entity, ids)| (entity.to_string(), json!(ids.len())))
        .collect();
    Some(json!({ "batch_id": report.batch_id, "dependents": counts }).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::repository::test_support::setup_test_db;
    use crate::repository::DieselRecordRepository;

    #[derive(Default)]
    struct RecordingSink {
        entries: Mutex<Vec<AuditEntry>>,
    }

    #[async_trait]
    impl AuditSink for RecordingSink {
        async fn record(&self, entry: &AuditEntry) -> anyhow::Result<()> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn record(&self, _entry: &AuditEntry) -> anyhow::Result<()> {
            anyhow::bail!("audit store offline")
        }
    }

    #[tokio::test]
    async fn test_purge_requires_super_admin() {
        let (pool, _dir) = setup_test_db().await;
        let records = DieselRecordRepository::new(pool.clone());
        let sink = Arc::new(RecordingSink::default());
        let service = LifecycleService::new(DieselLifecycleRepository::new(pool.clone()), sink.clone());

        let candidate = records.add_candidate("Grace Achieng", None).await.unwrap();
        let admin = ActingUser::new("nadia", Role::Admin);

        let result = service.purge(EntityType::Candidate, candidate, &admin).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("PermissionDenied"));
        assert!(records.get_candidate(candidate).await.unwrap().is_some());
        assert!(sink.entries.lock().unwrap().is_empty());

        let root = ActingUser::new("root", Role::SuperAdmin);
        let result = service.purge(EntityType::Candidate, candidate, &root).await;
        assert!(result.success);
        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Purge);
        assert_eq!(entries[0].username, "root");
    }

    /// Denies purge to everyone, as during a records freeze.
    struct NoPurge;

    impl PermissionChecker for NoPurge {
        fn allows(&self, user: &ActingUser, required: Role) -> bool {
            required != Role::SuperAdmin && user.role.at_least(required)
        }
    }

    #[tokio::test]
    async fn test_custom_permission_checker() {
        let (pool, _dir) = setup_test_db().await;
        let records = DieselRecordRepository::new(pool.clone());
        let service = LifecycleService::new(
            DieselLifecycleRepository::new(pool),
            Arc::new(RecordingSink::default()),
        )
        .with_permissions(Arc::new(NoPurge));

        let candidate = records.add_candidate("Lydia Chebet", None).await.unwrap();
        let root = ActingUser::new("root", Role::SuperAdmin);

        assert!(service.soft_delete(EntityType::Candidate, candidate, &root).await.success);
        let result = service.purge(EntityType::Candidate, candidate, &root).await;
        assert_eq!(result.error.as_deref(), Some("PermissionDenied"));
        assert!(service.restore(EntityType::Candidate, candidate, &root).await.success);
    }

    #[tokio::test]
    async fn test_mutations_are_audited() {
        let (pool, _dir) = setup_test_db().await;
        let records = DieselRecordRepository::new(pool.clone());
        let sink = Arc::new(RecordingSink::default());
        let service = LifecycleService::new(DieselLifecycleRepository::new(pool), sink.clone());
        let staff = ActingUser::new("bilal", Role::Staff);

        let candidate = records.add_candidate("Peter Otieno", None).await.unwrap();
        records.add_payment(candidate, 40.0, "Registration").await.unwrap();

        assert!(service.soft_delete(EntityType::Candidate, candidate, &staff).await.success);
        assert!(service.restore(EntityType::Candidate, candidate, &staff).await.success);
        // Failed operations are not audited
        assert!(!service.restore(EntityType::Candidate, candidate, &staff).await.success);

        let entries = sink.entries.lock().unwrap();
        let actions: Vec<AuditAction> = entries.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![AuditAction::SoftDelete, AuditAction::Restore]);
        let details: serde_json::Value =
            serde_json::from_str(entries[0].details.as_deref().unwrap()).unwrap();
        assert_eq!(details["dependents"]["payments"], 1);
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_fail_operation() {
        let (pool, _dir) = setup_test_db().await;
        let records = DieselRecordRepository::new(pool.clone());
        let service =
            LifecycleService::new(DieselLifecycleRepository::new(pool), Arc::new(FailingSink));

        let employer = records.add_employer("Northwind Care", None).await.unwrap();
        let result = service
            .soft_delete(EntityType::Employer, employer, &ActingUser::new("bilal", Role::Staff))
            .await;
        assert!(result.success);
        assert!(records.get_employer(employer).await.unwrap().is_none());
    }

    #[test]
    fn test_envelope_serialization() {
        let ok: OpResult<Vec<i32>> = OpResult::ok(vec![1, 2]);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "success": true, "data": [1, 2] })
        );

        let err: OpResult<()> = OpResult::failed(&LifecycleError::PermissionDenied {
            required: Role::SuperAdmin,
            actual: Role::Admin,
        });
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "PermissionDenied");
        assert!(value.get("data").is_none());
    }
}
