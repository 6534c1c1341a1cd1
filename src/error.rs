//! Errors raised by lifecycle operations.

use thiserror::Error;

use crate::models::Role;
use crate::registry::EntityType;

/// Why a soft delete, restore or purge did not happen.
///
/// Every variant guarantees that no row was changed.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Row is absent, or not in the state the operation needs
    /// (deleting a deleted row, restoring a live one).
    #[error("{entity} #{id} not found")]
    NotFound { entity: EntityType, id: i32 },

    #[error("{required} role required, caller is {actual}")]
    PermissionDenied { required: Role, actual: Role },

    /// Restore would bring back a row whose parent is still in the recycle bin.
    #[error("{parent} #{parent_id} is deleted; restore it before {entity} #{id}")]
    ParentDeleted {
        entity: EntityType,
        id: i32,
        parent: EntityType,
        parent_id: i32,
    },

    /// Purge would leave live dependents pointing at a missing row.
    #[error("{entity} #{id} still has {live_dependents} live dependent record(s)")]
    OrphanRisk {
        entity: EntityType,
        id: i32,
        live_dependents: i64,
    },

    #[error("transaction failed: {0}")]
    TransactionFailure(#[from] diesel::result::Error),
}

impl LifecycleError {
    /// Stable code returned across the IPC boundary.
    pub fn code(&self) -> &'static str {
        match self {
            LifecycleError::NotFound { .. } => "NotFound",
            LifecycleError::PermissionDenied { .. } => "PermissionDenied",
            LifecycleError::ParentDeleted { .. } => "ParentDeleted",
            LifecycleError::OrphanRisk { .. } => "OrphanRisk",
            LifecycleError::TransactionFailure(_) => "TransactionFailure",
        }
    }

    pub(crate) fn not_found(entity: EntityType, id: i32) -> Self {
        LifecycleError::NotFound { entity, id }
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
