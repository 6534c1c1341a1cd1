//! Registry-driven listing queries shared by the active read path and the
//! recycle bin.

use diesel::sql_types::{Integer, Nullable, Text};

use super::{parse_datetime, parse_datetime_opt};
use crate::models::{DeletedRecord, RecordSummary};
use crate::registry::EntityType;

/// Which side of the soft-delete flag to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Active,
    Deleted,
}

/// One row of a listing query.
#[derive(diesel::QueryableByName, Debug)]
pub(crate) struct ListingRow {
    #[diesel(sql_type = Integer)]
    pub id: i32,
    #[diesel(sql_type = Nullable<Text>)]
    pub label: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub context: Option<String>,
    #[diesel(sql_type = Text)]
    pub created_at: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub deleted_at: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub deleted_batch_id: Option<String>,
}

impl ListingRow {
    pub fn into_summary(self, entity: EntityType) -> RecordSummary {
        RecordSummary {
            entity,
            id: self.id,
            label: self.label,
            context: self.context,
            created_at: parse_datetime(&self.created_at),
        }
    }

    pub fn into_deleted(self, entity: EntityType) -> DeletedRecord {
        DeletedRecord {
            entity,
            id: self.id,
            label: self.label,
            context: self.context,
            created_at: parse_datetime(&self.created_at),
            deleted_at: parse_datetime_opt(self.deleted_at),
            deleted_batch_id: self.deleted_batch_id,
        }
    }
}

/// Build the listing SQL for `entity`.
///
/// The parent join is a LEFT JOIN so rows whose parent was purged still
/// list, with no context. The row limit is bound as the only parameter;
/// SQLite treats a negative limit as unbounded.
pub(crate) fn listing_sql(entity: EntityType, visibility: Visibility) -> String {
    let def = entity.def();

    // Live rows never take their label context from a deleted parent
    let parent_filter = match visibility {
        Visibility::Active => " AND p.isDeleted = 0",
        Visibility::Deleted => "",
    };
    let (context, join) = match entity.context_parent() {
        Some(link) => (
            format!("p.{} AS context", link.entity.def().label),
            format!(
                " LEFT JOIN {} p ON p.id = t.{}{parent_filter}",
                link.entity.table(),
                link.foreign_key
            ),
        ),
        None => ("NULL AS context".to_string(), String::new()),
    };

    let (flag, order) = match visibility {
        Visibility::Active => (0, "t.createdAt DESC, t.id DESC"),
        Visibility::Deleted => (1, "COALESCE(t.deletedAt, t.createdAt) DESC, t.id DESC"),
    };

    format!(
        "SELECT t.id AS id, t.{label} AS label, {context}, t.createdAt AS created_at, \
         t.deletedAt AS deleted_at, t.deletedBatchId AS deleted_batch_id \
         FROM {table} t{join} WHERE t.isDeleted = {flag} ORDER BY {order} LIMIT ?",
        label = def.label,
        table = def.table,
    )
}

/// Limit value for [`listing_sql`].
pub(crate) fn limit_param(limit: Option<u32>) -> i64 {
    limit.map(i64::from).unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_listing_joins_candidate_name() {
        let sql = listing_sql(EntityType::Document, Visibility::Deleted);
        assert!(sql.contains("FROM documents t LEFT JOIN candidates p ON p.id = t.candidateId"));
        assert!(sql.contains("p.name AS context"));
        assert!(sql.contains("WHERE t.isDeleted = 1"));
    }

    #[test]
    fn test_active_listing_ignores_deleted_parents() {
        let sql = listing_sql(EntityType::Placement, Visibility::Active);
        assert!(sql.contains("LEFT JOIN candidates p ON p.id = t.candidateId AND p.isDeleted = 0"));

        let bin = listing_sql(EntityType::Placement, Visibility::Deleted);
        assert!(!bin.contains("p.isDeleted"));
    }

    #[test]
    fn test_root_listing_has_no_join() {
        let sql = listing_sql(EntityType::Employer, Visibility::Active);
        assert!(sql.contains("NULL AS context"));
        assert!(!sql.contains("JOIN"));
        assert!(sql.contains("WHERE t.isDeleted = 0"));
        assert!(sql.ends_with("LIMIT ?"));
        assert_eq!(limit_param(None), -1);
        assert_eq!(limit_param(Some(20)), 20);
    }
}
