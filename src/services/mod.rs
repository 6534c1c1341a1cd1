//! Service layer for agencydesk business logic.
//!
//! This module contains domain logic separated from UI concerns.
//! Services can be used by the CLI, the desktop IPC bridge, or tests.

pub mod lifecycle;
pub mod permissions;

use async_trait::async_trait;

use crate::models::AuditEntry;

pub use lifecycle::{LifecycleService, OpResult};
pub use permissions::{PermissionChecker, RoleHierarchy};

/// Destination for audit entries written after lifecycle mutations.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> anyhow::Result<()>;
}

/// Audit sink that drops every entry. Used when auditing is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _entry: &AuditEntry) -> anyhow::Result<()> {
        Ok(())
    }
}
