//! Application bootstrap shared by the CLI and the desktop bridge.

use std::sync::Arc;

use anyhow::Context;
use tracing::debug;

use crate::config::Settings;
use crate::repository::migrations;
use crate::repository::{
    create_diesel_pool, DieselAuditLogRepository, DieselLifecycleRepository,
    DieselRecordRepository, DieselUserRepository,
};
use crate::services::{AuditSink, LifecycleService, NoopAuditSink};

/// Repositories and services wired against one database.
#[derive(Clone)]
pub struct AppContext {
    pub settings: Settings,
    pub records: DieselRecordRepository,
    pub users: DieselUserRepository,
    pub audit_log: DieselAuditLogRepository,
    pub lifecycle: LifecycleService,
}

impl AppContext {
    /// Create directories, migrate the database and build the services.
    pub async fn open(settings: Settings) -> anyhow::Result<Self> {
        settings
            .ensure_directories()
            .with_context(|| format!("failed to create {}", settings.data_dir.display()))?;

        let version = migrations::run_migrations(&settings.database_url(), false)
            .await
            .context("failed to migrate database")?;
        debug!(version, path = %settings.database_path().display(), "database ready");

        let pool = create_diesel_pool(&settings.database_path())
            .context("failed to open database pool")?;

        let audit_log = DieselAuditLogRepository::new(pool.clone());
        let sink: Arc<dyn AuditSink> = if settings.audit_enabled {
            Arc::new(audit_log.clone())
        } else {
            Arc::new(NoopAuditSink)
        };
        let lifecycle = LifecycleService::new(DieselLifecycleRepository::new(pool.clone()), sink)
            .with_purge_policy(settings.purge_policy);

        Ok(Self {
            records: DieselRecordRepository::new(pool.clone()),
            users: DieselUserRepository::new(pool),
            audit_log,
            lifecycle,
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActingUser, Role};
    use crate::registry::EntityType;

    #[tokio::test]
    async fn test_open_creates_database_and_audits() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::open(Settings::with_data_dir(dir.path().join("desk")))
            .await
            .unwrap();
        assert!(ctx.settings.database_path().exists());
        assert!(ctx.settings.documents_dir.is_dir());

        let id = ctx.records.add_employer("Harbor Logistics", Some("AE")).await.unwrap();
        let actor = ActingUser::new("bilal", Role::Staff);
        assert!(ctx.lifecycle.soft_delete(EntityType::Employer, id, &actor).await.success);

        let recent = ctx.audit_log.get_recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].action, "soft_delete");
    }

    #[tokio::test]
    async fn test_audit_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::with_data_dir(dir.path().to_path_buf());
        settings.audit_enabled = false;
        let ctx = AppContext::open(settings).await.unwrap();

        let id = ctx.records.add_candidate("Amina Yusuf", None).await.unwrap();
        let actor = ActingUser::new("bilal", Role::Staff);
        assert!(ctx.lifecycle.soft_delete(EntityType::Candidate, id, &actor).await.success);
        assert!(ctx.audit_log.get_recent(10).await.unwrap().is_empty());
    }
}
