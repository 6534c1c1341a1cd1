//! Soft delete, restore, purge and recycle-bin queries.
//!
//! Cascade SQL is generated from the entity registry. Every mutation runs
//! in a single `BEGIN IMMEDIATE` transaction: either the root and all of
//! its dependents change, or nothing does.
//!
//! Each soft delete stamps a fresh batch id on the rows it marks. Restore
//! only brings back dependents carrying the root's batch id, so a row that
//! was deleted on its own before the cascade stays in the recycle bin.

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Nullable, Text};
use tracing::{debug, warn};
use uuid::Uuid;

use super::diesel_pool::{run_blocking, DieselError, SqlitePool};
use super::listing::{limit_param, listing_sql, ListingRow, Visibility};
use super::now_rfc3339;
use crate::error::{LifecycleError, LifecycleResult};
use crate::models::{CascadeReport, DeletedRecord, PurgePolicy, PurgeReport, RecordState};
use crate::registry::EntityType;

#[derive(QueryableByName)]
struct StateRow {
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Integer)]
    is_deleted: i32,
    #[diesel(sql_type = Nullable<Text>)]
    deleted_batch_id: Option<String>,
}

#[derive(QueryableByName)]
struct IdRow {
    #[diesel(sql_type = Integer)]
    id: i32,
}

#[derive(QueryableByName)]
struct ParentStateRow {
    #[diesel(sql_type = Integer)]
    parent_id: i32,
    #[diesel(sql_type = Integer)]
    is_deleted: i32,
}

#[derive(QueryableByName)]
struct DependentCounts {
    #[diesel(sql_type = BigInt)]
    live: i64,
    #[diesel(sql_type = BigInt)]
    deleted: i64,
}

fn load_state(
    conn: &mut SqliteConnection,
    entity: EntityType,
    id: i32,
) -> Result<Option<StateRow>, DieselError> {
    diesel::sql_query(format!(
        "SELECT id, isDeleted AS is_deleted, deletedBatchId AS deleted_batch_id \
         FROM {} WHERE id = ?",
        entity.table()
    ))
    .bind::<Integer, _>(id)
    .get_result::<StateRow>(conn)
    .optional()
}

/// Soft-delete `id` and everything that cascades from it.
pub fn soft_delete_in(
    conn: &mut SqliteConnection,
    entity: EntityType,
    id: i32,
    batch_id: &str,
    deleted_at: &str,
) -> LifecycleResult<CascadeReport> {
    conn.immediate_transaction(|conn| {
        match load_state(conn, entity, id)? {
            Some(state) if state.is_deleted == 0 => {}
            _ => return Err(LifecycleError::not_found(entity, id)),
        }

        diesel::sql_query(format!(
            "UPDATE {} SET isDeleted = 1, deletedBatchId = ?, deletedAt = ? WHERE id = ?",
            entity.table()
        ))
        .bind::<Text, _>(batch_id)
        .bind::<Text, _>(deleted_at)
        .bind::<Integer, _>(id)
        .execute(conn)?;

        let mut report = CascadeReport::new(entity, id, Some(batch_id.to_string()));
        cascade_delete(conn, entity, &[id], batch_id, deleted_at, &mut report)?;
        Ok(report)
    })
}

/// Mark every live dependent of `parent_ids` as deleted in `batch_id`,
/// then recurse into their own dependents.
///
/// Dependents that are already deleted keep their original batch, so a
/// later restore of this cascade leaves them alone.
fn cascade_delete(
    conn: &mut SqliteConnection,
    parent: EntityType,
    parent_ids: &[i32],
    batch_id: &str,
    deleted_at: &str,
    report: &mut CascadeReport,
) -> Result<(), DieselError> {
    for dependent in parent.dependents() {
        let table = dependent.entity.table();
        let fk = dependent.foreign_key;
        let select = format!("SELECT id FROM {table} WHERE {fk} = ? AND isDeleted = 0 ORDER BY id");
        let update = format!(
            "UPDATE {table} SET isDeleted = 1, deletedBatchId = ?, deletedAt = ? \
             WHERE {fk} = ? AND isDeleted = 0"
        );

        let mut changed = Vec::new();
        for &parent_id in parent_ids {
            let ids: Vec<i32> = diesel::sql_query(select.as_str())
                .bind::<Integer, _>(parent_id)
                .load::<IdRow>(conn)?
                .into_iter()
                .map(|row| row.id)
                .collect();
            if ids.is_empty() {
                continue;
            }

            diesel::sql_query(update.as_str())
                .bind::<Text, _>(batch_id)
                .bind::<Text, _>(deleted_at)
                .bind::<Integer, _>(parent_id)
                .execute(conn)?;
            changed.extend(ids);
        }

        if changed.is_empty() {
            continue;
        }
        debug!(table, count = changed.len(), batch_id, "cascaded soft delete");
        report.record(dependent.entity, &changed);
        cascade_delete(conn, dependent.entity, &changed, batch_id, deleted_at, report)?;
    }
    Ok(())
}

/// Restore `id` and the dependents deleted in the same batch.
pub fn restore_in(
    conn: &mut SqliteConnection,
    entity: EntityType,
    id: i32,
) -> LifecycleResult<CascadeReport> {
    conn.immediate_transaction(|conn| {
        let state = match load_state(conn, entity, id)? {
            Some(state) if state.is_deleted != 0 => state,
            _ => return Err(LifecycleError::not_found(entity, id)),
        };

        ensure_parents_live(conn, entity, state.id)?;

        diesel::sql_query(format!(
            "UPDATE {} SET isDeleted = 0, deletedBatchId = NULL, deletedAt = NULL WHERE id = ?",
            entity.table()
        ))
        .bind::<Integer, _>(id)
        .execute(conn)?;

        let batch_id = state.deleted_batch_id;
        if batch_id.is_none() {
            warn!(
                %entity,
                id, "restoring a row deleted before batch tracking; all legacy-deleted dependents come back"
            );
        }

        let mut report = CascadeReport::new(entity, id, batch_id.clone());
        cascade_restore(conn, entity, &[id], batch_id.as_deref(), &mut report)?;
        Ok(report)
    })
}

fn ensure_parents_live(
    conn: &mut SqliteConnection,
    entity: EntityType,
    id: i32,
) -> LifecycleResult<()> {
    for link in entity.parents() {
        let parent_state = diesel::sql_query(format!(
            "SELECT p.id AS parent_id, p.isDeleted AS is_deleted \
             FROM {child} c JOIN {parent} p ON p.id = c.{fk} WHERE c.id = ?",
            child = entity.table(),
            parent = link.entity.table(),
            fk = link.foreign_key,
        ))
        .bind::<Integer, _>(id)
        .get_result::<ParentStateRow>(conn)
        .optional()?;

        if let Some(parent) = parent_state {
            if parent.is_deleted != 0 {
                return Err(LifecycleError::ParentDeleted {
                    entity,
                    id,
                    parent: link.entity,
                    parent_id: parent.parent_id,
                });
            }
        }
    }
    Ok(())
}

/// Extra WHERE clauses keeping rows whose other parents are still deleted
/// out of a cascade restore. Skipped rows stay in the recycle bin under
/// their batch id and can be restored directly once every parent is live.
fn other_parents_live(entity: EntityType, walked: EntityType, walked_fk: &str) -> String {
    let table = entity.table();
    entity
        .parents()
        .into_iter()
        .filter(|link| !(link.entity == walked && link.foreign_key == walked_fk))
        .map(|link| {
            format!(
                " AND NOT EXISTS (SELECT 1 FROM {parent} p WHERE p.id = {table}.{fk} \
                 AND p.isDeleted = 1)",
                parent = link.entity.table(),
                fk = link.foreign_key,
            )
        })
        .collect()
}

/// Restore the deleted dependents of `parent_ids` that belong to `batch_id`.
///
/// A `None` batch means the root predates batch tracking: every deleted
/// dependent without a batch is restored.
fn cascade_restore(
    conn: &mut SqliteConnection,
    parent: EntityType,
    parent_ids: &[i32],
    batch_id: Option<&str>,
    report: &mut CascadeReport,
) -> Result<(), DieselError> {
    let batch_filter = match batch_id {
        Some(_) => "deletedBatchId = ?",
        None => "deletedBatchId IS NULL",
    };

    for dependent in parent.dependents() {
        let table = dependent.entity.table();
        let fk = dependent.foreign_key;
        let guard = other_parents_live(dependent.entity, parent, fk);
        let select = format!(
            "SELECT id FROM {table} WHERE {fk} = ? AND isDeleted = 1 AND {batch_filter}{guard} \
             ORDER BY id"
        );
        let update = format!(
            "UPDATE {table} SET isDeleted = 0, deletedBatchId = NULL, deletedAt = NULL \
             WHERE {fk} = ? AND isDeleted = 1 AND {batch_filter}{guard}"
        );

        let mut changed = Vec::new();
        for &parent_id in parent_ids {
            let query = diesel::sql_query(select.as_str()).bind::<Integer, _>(parent_id);
            let rows: Vec<IdRow> = match batch_id {
                Some(batch) => query.bind::<Text, _>(batch).load(conn)?,
                None => query.load(conn)?,
            };
            if rows.is_empty() {
                continue;
            }

            let query = diesel::sql_query(update.as_str()).bind::<Integer, _>(parent_id);
            match batch_id {
                Some(batch) => query.bind::<Text, _>(batch).execute(conn)?,
                None => query.execute(conn)?,
            };
            changed.extend(rows.into_iter().map(|row| row.id));
        }

        if changed.is_empty() {
            continue;
        }
        debug!(table, count = changed.len(), "cascaded restore");
        report.record(dependent.entity, &changed);
        cascade_restore(conn, dependent.entity, &changed, batch_id, report)?;
    }
    Ok(())
}

/// Physically delete exactly one row. Dependents are never touched.
pub fn purge_in(
    conn: &mut SqliteConnection,
    entity: EntityType,
    id: i32,
    policy: PurgePolicy,
) -> LifecycleResult<PurgeReport> {
    conn.immediate_transaction(|conn| {
        if load_state(conn, entity, id)?.is_none() {
            return Err(LifecycleError::not_found(entity, id));
        }

        let mut live = 0;
        let mut deleted = 0;
        for dependent in entity.dependents() {
            let counts = diesel::sql_query(format!(
                "SELECT COALESCE(SUM(CASE WHEN isDeleted = 0 THEN 1 ELSE 0 END), 0) AS live, \
                        COALESCE(SUM(CASE WHEN isDeleted = 0 THEN 0 ELSE 1 END), 0) AS deleted \
                 FROM {} WHERE {} = ?",
                dependent.entity.table(),
                dependent.foreign_key
            ))
            .bind::<Integer, _>(id)
            .get_result::<DependentCounts>(conn)?;
            live += counts.live;
            deleted += counts.deleted;
        }

        if live > 0 && policy == PurgePolicy::RefuseLiveDependents {
            return Err(LifecycleError::OrphanRisk {
                entity,
                id,
                live_dependents: live,
            });
        }

        let rows = diesel::sql_query(format!("DELETE FROM {} WHERE id = ?", entity.table()))
            .bind::<Integer, _>(id)
            .execute(conn)?;
        if rows == 0 {
            return Err(LifecycleError::not_found(entity, id));
        }

        Ok(PurgeReport {
            entity,
            id,
            orphaned_dependents: live + deleted,
        })
    })
}

/// Load soft-deleted rows of one entity type, most recently deleted first.
pub fn list_deleted_in(
    conn: &mut SqliteConnection,
    entity: EntityType,
    limit: Option<u32>,
) -> Result<Vec<DeletedRecord>, DieselError> {
    let rows = diesel::sql_query(listing_sql(entity, Visibility::Deleted))
        .bind::<BigInt, _>(limit_param(limit))
        .load::<ListingRow>(conn)?;
    Ok(rows.into_iter().map(|row| row.into_deleted(entity)).collect())
}

/// Diesel-based lifecycle repository.
#[derive(Clone)]
pub struct DieselLifecycleRepository {
    pool: SqlitePool,
}

impl DieselLifecycleRepository {
    /// Create a new lifecycle repository with an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Soft-delete a root record and its dependents in a new batch.
    pub async fn soft_delete(&self, entity: EntityType, id: i32) -> LifecycleResult<CascadeReport> {
        let batch_id = Uuid::new_v4().to_string();
        let deleted_at = now_rfc3339();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            soft_delete_in(conn, entity, id, &batch_id, &deleted_at)
        })
        .await
    }

    /// Restore a soft-deleted record and the dependents of its batch.
    pub async fn restore(&self, entity: EntityType, id: i32) -> LifecycleResult<CascadeReport> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| restore_in(conn, entity, id)).await
    }

    /// Permanently delete a single record.
    pub async fn purge(
        &self,
        entity: EntityType,
        id: i32,
        policy: PurgePolicy,
    ) -> LifecycleResult<PurgeReport> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| purge_in(conn, entity, id, policy)).await
    }

    /// Recycle bin contents for one entity type.
    pub async fn list_deleted(
        &self,
        entity: EntityType,
        limit: Option<u32>,
    ) -> Result<Vec<DeletedRecord>, DieselError> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| list_deleted_in(conn, entity, limit)).await
    }

    /// Soft-delete state of one row, or `None` if it does not exist.
    pub async fn record_state(
        &self,
        entity: EntityType,
        id: i32,
    ) -> Result<Option<RecordState>, DieselError> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| load_state(conn, entity, id))
            .await
            .map(|opt| {
                opt.map(|state| RecordState {
                    id: state.id,
                    is_deleted: state.is_deleted != 0,
                    deleted_batch_id: state.deleted_batch_id,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackingKind;
    use crate::repository::diesel_records::DieselRecordRepository;
    use crate::repository::test_support::setup_test_db;

    async fn is_deleted(repo: &DieselLifecycleRepository, entity: EntityType, id: i32) -> bool {
        repo.record_state(entity, id).await.unwrap().unwrap().is_deleted
    }

    #[tokio::test]
    async fn test_soft_delete_cascades_to_every_candidate_dependent() {
        let (pool, _dir) = setup_test_db().await;
        let records = DieselRecordRepository::new(pool.clone());
        let repo = DieselLifecycleRepository::new(pool);

        let candidate = records.add_candidate("Amina Yusuf", Some("P1234567")).await.unwrap();
        let employer = records.add_employer("Gulf Build Co", Some("QA")).await.unwrap();
        let job = records.add_job_order(employer, "Site Engineer", 3).await.unwrap();
        let placement = records.add_placement(candidate, job).await.unwrap();
        let doc = records
            .add_document(candidate, "passport.pdf", "/docs/passport.pdf", "passport")
            .await
            .unwrap();
        let payment = records.add_payment(candidate, 150.0, "Medical fee").await.unwrap();
        let visa = records
            .add_tracking(TrackingKind::Visa, candidate, "applied", None)
            .await
            .unwrap();
        let travel = records
            .add_tracking(TrackingKind::Travel, candidate, "booked", Some("DOH"))
            .await
            .unwrap();

        let report = repo.soft_delete(EntityType::Candidate, candidate).await.unwrap();
        assert_eq!(report.dependent_count(), 5);
        assert_eq!(report.ids(EntityType::Placement), &[placement]);

        for (entity, id) in [
            (EntityType::Candidate, candidate),
            (EntityType::Placement, placement),
            (EntityType::Document, doc),
            (EntityType::Payment, payment),
            (EntityType::VisaTracking, visa),
            (EntityType::TravelTracking, travel),
        ] {
            let state = repo.record_state(entity, id).await.unwrap().unwrap();
            assert!(state.is_deleted, "{} #{} should be deleted", entity, id);
            assert_eq!(state.deleted_batch_id, report.batch_id);
        }

        // Job order belongs to the employer, not the candidate
        assert!(!is_deleted(&repo, EntityType::JobOrder, job).await);
    }

    #[tokio::test]
    async fn test_soft_delete_rejects_missing_or_deleted_root() {
        let (pool, _dir) = setup_test_db().await;
        let records = DieselRecordRepository::new(pool.clone());
        let repo = DieselLifecycleRepository::new(pool);

        let err = repo.soft_delete(EntityType::Candidate, 999).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { id: 999, .. }));

        let candidate = records.add_candidate("Ravi Kumar", None).await.unwrap();
        repo.soft_delete(EntityType::Candidate, candidate).await.unwrap();
        let err = repo.soft_delete(EntityType::Candidate, candidate).await.unwrap_err();
        assert_eq!(err.code(), "NotFound");
    }

    #[tokio::test]
    async fn test_employer_cascade_reaches_placements() {
        let (pool, _dir) = setup_test_db().await;
        let records = DieselRecordRepository::new(pool.clone());
        let repo = DieselLifecycleRepository::new(pool);

        let candidate = records.add_candidate("Joseph Mensah", None).await.unwrap();
        let employer = records.add_employer("Harbor Logistics", None).await.unwrap();
        let job_a = records.add_job_order(employer, "Driver", 5).await.unwrap();
        let job_b = records.add_job_order(employer, "Forklift Operator", 2).await.unwrap();
        let placement = records.add_placement(candidate, job_b).await.unwrap();

        let report = repo.soft_delete(EntityType::Employer, employer).await.unwrap();
        assert_eq!(report.ids(EntityType::JobOrder).len(), 2);
        assert_eq!(report.ids(EntityType::Placement), &[placement]);
        assert!(is_deleted(&repo, EntityType::JobOrder, job_a).await);
        assert!(is_deleted(&repo, EntityType::Placement, placement).await);
        assert!(!is_deleted(&repo, EntityType::Candidate, candidate).await);

        let restored = repo.restore(EntityType::Employer, employer).await.unwrap();
        assert_eq!(restored.dependent_count(), 3);
        assert!(!is_deleted(&repo, EntityType::Placement, placement).await);
    }

    #[tokio::test]
    async fn test_cascade_restore_skips_rows_with_another_deleted_parent() {
        let (pool, _dir) = setup_test_db().await;
        let records = DieselRecordRepository::new(pool.clone());
        let repo = DieselLifecycleRepository::new(pool);

        let candidate = records.add_candidate("Kofi Boateng", None).await.unwrap();
        let employer = records.add_employer("Lakeside Farms", None).await.unwrap();
        let job = records.add_job_order(employer, "Harvest Hand", 10).await.unwrap();
        let placement = records.add_placement(candidate, job).await.unwrap();

        repo.soft_delete(EntityType::Employer, employer).await.unwrap();
        repo.soft_delete(EntityType::Candidate, candidate).await.unwrap();

        let restored = repo.restore(EntityType::Employer, employer).await.unwrap();
        assert_eq!(restored.ids(EntityType::JobOrder), &[job]);
        assert!(restored.ids(EntityType::Placement).is_empty());
        assert!(is_deleted(&repo, EntityType::Placement, placement).await);

        // Still in the bin after the candidate comes back, until restored directly
        repo.restore(EntityType::Candidate, candidate).await.unwrap();
        assert!(is_deleted(&repo, EntityType::Placement, placement).await);
        repo.restore(EntityType::Placement, placement).await.unwrap();
        assert!(!is_deleted(&repo, EntityType::Placement, placement).await);
    }

    #[test]
    fn test_other_parent_guard_skips_walked_edge() {
        let guard = other_parents_live(EntityType::Placement, EntityType::JobOrder, "jobOrderId");
        assert!(guard.contains("FROM candidates p WHERE p.id = placements.candidateId"));
        assert!(!guard.contains("job_orders"));
        assert!(other_parents_live(EntityType::Document, EntityType::Candidate, "candidateId")
            .is_empty());
    }

    #[tokio::test]
    async fn test_restore_skips_independently_deleted_dependents() {
        let (pool, _dir) = setup_test_db().await;
        let records = DieselRecordRepository::new(pool.clone());
        let repo = DieselLifecycleRepository::new(pool);

        let candidate = records.add_candidate("Maria Santos", None).await.unwrap();
        let old_doc = records
            .add_document(candidate, "old-cv.pdf", "/docs/old-cv.pdf", "cv")
            .await
            .unwrap();
        let new_doc = records
            .add_document(candidate, "cv.pdf", "/docs/cv.pdf", "cv")
            .await
            .unwrap();

        let own = repo.soft_delete(EntityType::Document, old_doc).await.unwrap();
        let cascade = repo.soft_delete(EntityType::Candidate, candidate).await.unwrap();
        assert_eq!(cascade.ids(EntityType::Document), &[new_doc]);

        // The earlier delete keeps its own batch
        let state = repo.record_state(EntityType::Document, old_doc).await.unwrap().unwrap();
        assert_eq!(state.deleted_batch_id, own.batch_id);

        let restored = repo.restore(EntityType::Candidate, candidate).await.unwrap();
        assert_eq!(restored.ids(EntityType::Document), &[new_doc]);
        assert!(!is_deleted(&repo, EntityType::Document, new_doc).await);
        assert!(is_deleted(&repo, EntityType::Document, old_doc).await);
    }

    #[tokio::test]
    async fn test_restore_requires_live_parent() {
        let (pool, _dir) = setup_test_db().await;
        let records = DieselRecordRepository::new(pool.clone());
        let repo = DieselLifecycleRepository::new(pool);

        let candidate = records.add_candidate("Chen Wei", None).await.unwrap();
        let doc = records
            .add_document(candidate, "photo.jpg", "/docs/photo.jpg", "photo")
            .await
            .unwrap();
        repo.soft_delete(EntityType::Candidate, candidate).await.unwrap();

        let err = repo.restore(EntityType::Document, doc).await.unwrap_err();
        match err {
            LifecycleError::ParentDeleted {
                parent, parent_id, ..
            } => {
                assert_eq!(parent, EntityType::Candidate);
                assert_eq!(parent_id, candidate);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(is_deleted(&repo, EntityType::Document, doc).await);

        let err = repo.restore(EntityType::Candidate, 12345).await.unwrap_err();
        assert_eq!(err.code(), "NotFound");
    }

    #[tokio::test]
    async fn test_restore_legacy_rows_without_batch() {
        let (pool, _dir) = setup_test_db().await;
        let records = DieselRecordRepository::new(pool.clone());
        let repo = DieselLifecycleRepository::new(pool.clone());

        let candidate = records.add_candidate("Legacy Person", None).await.unwrap();
        let doc = records
            .add_document(candidate, "legacy.pdf", "/docs/legacy.pdf", "other")
            .await
            .unwrap();

        // Rows flagged by the old application carry no batch id
        run_blocking(pool, move |conn| {
            diesel::sql_query("UPDATE candidates SET isDeleted = 1 WHERE id = ?")
                .bind::<Integer, _>(candidate)
                .execute(conn)?;
            diesel::sql_query("UPDATE documents SET isDeleted = 1 WHERE candidateId = ?")
                .bind::<Integer, _>(candidate)
                .execute(conn)?;
            Ok::<_, DieselError>(())
        })
        .await
        .unwrap();

        let report = repo.restore(EntityType::Candidate, candidate).await.unwrap();
        assert!(report.batch_id.is_none());
        assert_eq!(report.ids(EntityType::Document), &[doc]);
        assert!(!is_deleted(&repo, EntityType::Document, doc).await);
    }

    #[tokio::test]
    async fn test_purge_policies() {
        let (pool, _dir) = setup_test_db().await;
        let records = DieselRecordRepository::new(pool.clone());
        let repo = DieselLifecycleRepository::new(pool);

        let candidate = records.add_candidate("Omar Haddad", None).await.unwrap();
        let payment = records.add_payment(candidate, 90.0, "Visa fee").await.unwrap();

        let err = repo
            .purge(EntityType::Candidate, candidate, PurgePolicy::RefuseLiveDependents)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::OrphanRisk {
                live_dependents: 1,
                ..
            }
        ));
        assert!(repo.record_state(EntityType::Candidate, candidate).await.unwrap().is_some());

        // Once the dependents are soft-deleted the purge goes through and
        // leaves them behind
        repo.soft_delete(EntityType::Candidate, candidate).await.unwrap();
        let report = repo
            .purge(EntityType::Candidate, candidate, PurgePolicy::RefuseLiveDependents)
            .await
            .unwrap();
        assert_eq!(report.orphaned_dependents, 1);
        assert!(repo.record_state(EntityType::Candidate, candidate).await.unwrap().is_none());
        assert!(is_deleted(&repo, EntityType::Payment, payment).await);

        let err = repo
            .purge(EntityType::Candidate, candidate, PurgePolicy::AllowOrphans)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NotFound");
    }

    #[tokio::test]
    async fn test_allow_orphans_purges_live_parent() {
        let (pool, _dir) = setup_test_db().await;
        let records = DieselRecordRepository::new(pool.clone());
        let repo = DieselLifecycleRepository::new(pool);

        let employer = records.add_employer("Desert Hotels", None).await.unwrap();
        let job = records.add_job_order(employer, "Chef", 1).await.unwrap();

        let report = repo
            .purge(EntityType::Employer, employer, PurgePolicy::AllowOrphans)
            .await
            .unwrap();
        assert_eq!(report.orphaned_dependents, 1);
        assert!(!is_deleted(&repo, EntityType::JobOrder, job).await);
    }

    #[tokio::test]
    async fn test_recycle_bin_lists_deleted_rows_with_context() {
        let (pool, _dir) = setup_test_db().await;
        let records = DieselRecordRepository::new(pool.clone());
        let repo = DieselLifecycleRepository::new(pool);

        let kept = records.add_candidate("Kept Candidate", None).await.unwrap();
        records
            .add_document(kept, "kept.pdf", "/docs/kept.pdf", "cv")
            .await
            .unwrap();
        let gone = records.add_candidate("Gone Candidate", None).await.unwrap();
        let doc = records
            .add_document(gone, "gone.pdf", "/docs/gone.pdf", "cv")
            .await
            .unwrap();
        repo.soft_delete(EntityType::Candidate, gone).await.unwrap();

        let docs = repo.list_deleted(EntityType::Document, None).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, doc);
        assert_eq!(docs[0].label.as_deref(), Some("gone.pdf"));
        assert_eq!(docs[0].context.as_deref(), Some("Gone Candidate"));
        assert!(docs[0].deleted_at.is_some());

        let candidates = repo.list_deleted(EntityType::Candidate, Some(10)).await.unwrap();
        assert_eq!(candidates.iter().map(|r| r.id).collect::<Vec<_>>(), vec![gone]);
        assert!(candidates[0].context.is_none());

        assert!(repo.list_deleted(EntityType::Payment, None).await.unwrap().is_empty());
    }
}
