//! Domain models shared by the repositories, services and CLI.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::EntityType;

/// Operator role. Ordered `Staff < Admin < SuperAdmin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Staff,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Whether this role grants everything `required` grants.
    pub fn at_least(self, required: Role) -> bool {
        self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            "super_admin" | "superadmin" | "super-admin" => Ok(Role::SuperAdmin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// The operator performing a lifecycle action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingUser {
    /// Row id in `users`, if the actor is a stored user.
    pub id: Option<i32>,
    pub username: String,
    pub role: Role,
}

impl ActingUser {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            id: None,
            username: username.into(),
            role,
        }
    }
}

/// A stored operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for ActingUser {
    fn from(user: &User) -> Self {
        ActingUser {
            id: Some(user.id),
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Candidate (live rows only leave the repository as this type).
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub id: i32,
    pub name: String,
    pub passport_no: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Employer {
    pub id: i32,
    pub company_name: String,
    pub country: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobOrder {
    pub id: i32,
    pub employer_id: i32,
    pub position_title: String,
    pub openings_count: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Soft-delete state of a single row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordState {
    pub id: i32,
    pub is_deleted: bool,
    pub deleted_batch_id: Option<String>,
}

/// Listing projection shared by the active read path and the recycle bin.
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub entity: EntityType,
    pub id: i32,
    pub label: Option<String>,
    /// Label of the parent row (candidate name for a document, and so on).
    pub context: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A soft-deleted row as shown in the recycle bin.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedRecord {
    pub entity: EntityType,
    pub id: i32,
    pub label: Option<String>,
    pub context: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_batch_id: Option<String>,
}

/// Rows touched by a soft delete or restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub entity: EntityType,
    pub id: i32,
    /// Batch the rows were deleted in. `None` for legacy rows deleted
    /// before batch ids were recorded.
    pub batch_id: Option<String>,
    /// Dependent ids changed, per entity type.
    pub dependents: BTreeMap<EntityType, Vec<i32>>,
}

impl CascadeReport {
    pub fn new(entity: EntityType, id: i32, batch_id: Option<String>) -> Self {
        Self {
            entity,
            id,
            batch_id,
            dependents: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, entity: EntityType, ids: &[i32]) {
        if ids.is_empty() {
            return;
        }
        self.dependents.entry(entity).or_default().extend_from_slice(ids);
    }

    /// Number of dependent rows changed.
    pub fn dependent_count(&self) -> usize {
        self.dependents.values().map(Vec::len).sum()
    }

    /// Dependent ids of one entity type.
    pub fn ids(&self, entity: EntityType) -> &[i32] {
        self.dependents
            .get(&entity)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Result of a permanent purge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub entity: EntityType,
    pub id: i32,
    /// Soft-deleted dependents left pointing at the purged row.
    pub orphaned_dependents: i64,
}

/// What purge does when the row still has dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurgePolicy {
    /// Refuse while any dependent is still live; soft-deleted dependents
    /// are left behind as orphans.
    #[default]
    RefuseLiveDependents,
    /// Always delete the single row, whatever references it.
    AllowOrphans,
}

/// Candidate sub-tracking tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingKind {
    Visa,
    Passport,
    Medical,
    Interview,
    Travel,
}

impl TrackingKind {
    pub fn entity(self) -> EntityType {
        match self {
            TrackingKind::Visa => EntityType::VisaTracking,
            TrackingKind::Passport => EntityType::PassportTracking,
            TrackingKind::Medical => EntityType::MedicalTracking,
            TrackingKind::Interview => EntityType::InterviewTracking,
            TrackingKind::Travel => EntityType::TravelTracking,
        }
    }
}

/// Lifecycle action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    SoftDelete,
    Restore,
    Purge,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::SoftDelete => "soft_delete",
            AuditAction::Restore => "restore",
            AuditAction::Purge => "purge",
        }
    }
}

/// Audit log entry to append.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub user_id: Option<i32>,
    pub username: String,
    pub action: AuditAction,
    pub target_type: EntityType,
    pub target_id: i32,
    pub details: Option<String>,
}

/// Audit log entry as stored.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub id: i32,
    pub user_id: Option<i32>,
    pub username: String,
    pub action: String,
    pub target_type: String,
    pub target_id: i32,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}
