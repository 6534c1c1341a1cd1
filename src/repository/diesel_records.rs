//! Diesel-based record repository: creation and the active read path.
//!
//! Nothing here returns a soft-deleted row. Deleted rows are only visible
//! through the recycle bin queries in `diesel_lifecycle`.

use diesel::prelude::*;
use diesel::sql_types::BigInt;

use super::diesel_models::{
    CandidateRecord, EmployerRecord, JobOrderRecord, LastInsertRowId, NewCandidate, NewDocument,
    NewEmployer, NewJobOrder, NewPayment, NewPlacement,
};
use super::diesel_pool::{run_blocking, DieselError, SqlitePool};
use super::listing::{limit_param, listing_sql, ListingRow, Visibility};
use super::{now_rfc3339, parse_datetime};
use crate::models::{Candidate, Employer, JobOrder, RecordSummary, TrackingKind};
use crate::registry::EntityType;
use crate::schema::{self, candidates, documents, employers, job_orders, payments, placements};

impl From<CandidateRecord> for Candidate {
    fn from(record: CandidateRecord) -> Self {
        Candidate {
            id: record.id,
            name: record.name,
            passport_no: record.passport_no,
            phone: record.phone,
            status: record.status,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

impl From<EmployerRecord> for Employer {
    fn from(record: EmployerRecord) -> Self {
        Employer {
            id: record.id,
            company_name: record.company_name,
            country: record.country,
            contact_email: record.contact_email,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

impl From<JobOrderRecord> for JobOrder {
    fn from(record: JobOrderRecord) -> Self {
        JobOrder {
            id: record.id,
            employer_id: record.employer_id,
            position_title: record.position_title,
            openings_count: record.openings_count,
            status: record.status,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

fn last_insert_id(conn: &mut SqliteConnection) -> Result<i32, DieselError> {
    let row: LastInsertRowId = diesel::sql_query("SELECT last_insert_rowid()").get_result(conn)?;
    Ok(row.id as i32)
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Diesel-based record repository with compile-time query checking.
#[derive(Clone)]
pub struct DieselRecordRepository {
    pool: SqlitePool,
}

impl DieselRecordRepository {
    /// Create a new record repository with an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a candidate. Returns the new id.
    pub async fn add_candidate(
        &self,
        name: &str,
        passport_no: Option<&str>,
    ) -> Result<i32, DieselError> {
        let name = name.to_string();
        let passport_no = passport_no.map(str::to_string);
        let now = now_rfc3339();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            diesel::insert_into(candidates::table)
                .values(&NewCandidate {
                    name: &name,
                    passport_no: passport_no.as_deref(),
                    phone: None,
                    status: "new",
                    created_at: &now,
                })
                .execute(conn)?;
            last_insert_id(conn)
        })
        .await
    }

    /// Insert an employer. Returns the new id.
    pub async fn add_employer(
        &self,
        company_name: &str,
        country: Option<&str>,
    ) -> Result<i32, DieselError> {
        let company_name = company_name.to_string();
        let country = country.map(str::to_string);
        let now = now_rfc3339();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            diesel::insert_into(employers::table)
                .values(&NewEmployer {
                    company_name: &company_name,
                    country: country.as_deref(),
                    contact_email: None,
                    created_at: &now,
                })
                .execute(conn)?;
            last_insert_id(conn)
        })
        .await
    }

    /// Insert a job order under an employer. Returns the new id.
    pub async fn add_job_order(
        &self,
        employer_id: i32,
        position_title: &str,
        openings_count: i32,
    ) -> Result<i32, DieselError> {
        let position_title = position_title.to_string();
        let now = now_rfc3339();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            diesel::insert_into(job_orders::table)
                .values(&NewJobOrder {
                    employer_id,
                    position_title: &position_title,
                    openings_count,
                    status: "open",
                    created_at: &now,
                })
                .execute(conn)?;
            last_insert_id(conn)
        })
        .await
    }

    /// Place a candidate on a job order. Returns the new id.
    pub async fn add_placement(
        &self,
        candidate_id: i32,
        job_order_id: i32,
    ) -> Result<i32, DieselError> {
        let now = now_rfc3339();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            diesel::insert_into(placements::table)
                .values(&NewPlacement {
                    candidate_id,
                    job_order_id,
                    status: "proposed",
                    created_at: &now,
                })
                .execute(conn)?;
            last_insert_id(conn)
        })
        .await
    }

    /// Record a stored document for a candidate. Returns the new id.
    pub async fn add_document(
        &self,
        candidate_id: i32,
        file_name: &str,
        file_path: &str,
        category: &str,
    ) -> Result<i32, DieselError> {
        let file_name = file_name.to_string();
        let file_path = file_path.to_string();
        let category = category.to_string();
        let now = now_rfc3339();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            diesel::insert_into(documents::table)
                .values(&NewDocument {
                    candidate_id,
                    file_name: &file_name,
                    file_path: &file_path,
                    category: &category,
                    created_at: &now,
                })
                .execute(conn)?;
            last_insert_id(conn)
        })
        .await
    }

    /// Record a payment from a candidate. Returns the new id.
    pub async fn add_payment(
        &self,
        candidate_id: i32,
        amount: f64,
        description: &str,
    ) -> Result<i32, DieselError> {
        let description = description.to_string();
        let now = now_rfc3339();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            diesel::insert_into(payments::table)
                .values(&NewPayment {
                    candidate_id,
                    amount,
                    description: &description,
                    created_at: &now,
                })
                .execute(conn)?;
            last_insert_id(conn)
        })
        .await
    }

    /// Add a visa/passport/medical/interview/travel tracking row.
    pub async fn add_tracking(
        &self,
        kind: TrackingKind,
        candidate_id: i32,
        status: &str,
        notes: Option<&str>,
    ) -> Result<i32, DieselError> {
        let status = status.to_string();
        let notes = notes.map(str::to_string);
        let now = now_rfc3339();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            macro_rules! insert_tracking {
                ($table:ident) => {
                    diesel::insert_into(schema::$table::table)
                        .values((
                            schema::$table::candidate_id.eq(candidate_id),
                            schema::$table::status.eq(&status),
                            schema::$table::notes.eq(notes.as_deref()),
                            schema::$table::created_at.eq(&now),
                        ))
                        .execute(conn)?
                };
            }

            match kind {
                TrackingKind::Visa => insert_tracking!(visa_tracking),
                TrackingKind::Passport => insert_tracking!(passport_tracking),
                TrackingKind::Medical => insert_tracking!(medical_tracking),
                TrackingKind::Interview => insert_tracking!(interview_tracking),
                TrackingKind::Travel => insert_tracking!(travel_tracking),
            };
            last_insert_id(conn)
        })
        .await
    }

    /// Get a live candidate by id.
    pub async fn get_candidate(&self, id: i32) -> Result<Option<Candidate>, DieselError> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            candidates::table
                .find(id)
                .filter(candidates::is_deleted.eq(0))
                .select(CandidateRecord::as_select())
                .first(conn)
                .optional()
        })
        .await
        .map(|opt| opt.map(Candidate::from))
    }

    /// Get a live employer by id.
    pub async fn get_employer(&self, id: i32) -> Result<Option<Employer>, DieselError> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            employers::table
                .find(id)
                .filter(employers::is_deleted.eq(0))
                .select(EmployerRecord::as_select())
                .first(conn)
                .optional()
        })
        .await
        .map(|opt| opt.map(Employer::from))
    }

    /// Get a live job order by id.
    pub async fn get_job_order(&self, id: i32) -> Result<Option<JobOrder>, DieselError> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            job_orders::table
                .find(id)
                .filter(job_orders::is_deleted.eq(0))
                .select(JobOrderRecord::as_select())
                .first(conn)
                .optional()
        })
        .await
        .map(|opt| opt.map(JobOrder::from))
    }

    /// Live job orders of an employer.
    pub async fn get_job_orders_for_employer(
        &self,
        employer_id: i32,
    ) -> Result<Vec<JobOrder>, DieselError> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            job_orders::table
                .filter(job_orders::employer_id.eq(employer_id))
                .filter(job_orders::is_deleted.eq(0))
                .order(job_orders::created_at.desc())
                .select(JobOrderRecord::as_select())
                .load(conn)
        })
        .await
        .map(|records| records.into_iter().map(JobOrder::from).collect())
    }

    /// Live rows of any entity type, newest first.
    pub async fn list_active(
        &self,
        entity: EntityType,
        limit: Option<u32>,
    ) -> Result<Vec<RecordSummary>, DieselError> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            diesel::sql_query(listing_sql(entity, Visibility::Active))
                .bind::<BigInt, _>(limit_param(limit))
                .load::<ListingRow>(conn)
        })
        .await
        .map(|rows| rows.into_iter().map(|row| row.into_summary(entity)).collect())
    }

    /// Count live rows of any entity type.
    pub async fn count_active(&self, entity: EntityType) -> Result<u64, DieselError> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            let row: CountRow = diesel::sql_query(format!(
                "SELECT COUNT(*) AS count FROM {} WHERE isDeleted = 0",
                entity.table()
            ))
            .get_result(conn)?;
            Ok(row.count as u64)
        })
        .await
    }
}
