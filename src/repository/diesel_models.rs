//! Diesel ORM models for database tables.
//!
//! These models provide compile-time type checking for the typed read and
//! insert paths. Lifecycle SQL that spans tables is generated from the
//! entity registry instead (see `diesel_lifecycle`).

use diesel::prelude::*;

use crate::schema;

/// Candidate record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::candidates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CandidateRecord {
    pub id: i32,
    pub name: String,
    pub passport_no: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub created_at: String,
    pub is_deleted: i32,
    pub deleted_batch_id: Option<String>,
    pub deleted_at: Option<String>,
}

/// New candidate for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::candidates)]
pub struct NewCandidate<'a> {
    pub name: &'a str,
    pub passport_no: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub status: &'a str,
    pub created_at: &'a str,
}

/// Employer record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::employers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EmployerRecord {
    pub id: i32,
    pub company_name: String,
    pub country: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: String,
    pub is_deleted: i32,
    pub deleted_batch_id: Option<String>,
    pub deleted_at: Option<String>,
}

/// New employer for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::employers)]
pub struct NewEmployer<'a> {
    pub company_name: &'a str,
    pub country: Option<&'a str>,
    pub contact_email: Option<&'a str>,
    pub created_at: &'a str,
}

/// Job order record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::job_orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobOrderRecord {
    pub id: i32,
    pub employer_id: i32,
    pub position_title: String,
    pub openings_count: i32,
    pub status: String,
    pub created_at: String,
    pub is_deleted: i32,
    pub deleted_batch_id: Option<String>,
    pub deleted_at: Option<String>,
}

/// New job order for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::job_orders)]
pub struct NewJobOrder<'a> {
    pub employer_id: i32,
    pub position_title: &'a str,
    pub openings_count: i32,
    pub status: &'a str,
    pub created_at: &'a str,
}

/// New placement for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::placements)]
pub struct NewPlacement<'a> {
    pub candidate_id: i32,
    pub job_order_id: i32,
    pub status: &'a str,
    pub created_at: &'a str,
}

/// New candidate document for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::documents)]
pub struct NewDocument<'a> {
    pub candidate_id: i32,
    pub file_name: &'a str,
    pub file_path: &'a str,
    pub category: &'a str,
    pub created_at: &'a str,
}

/// New payment for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::payments)]
pub struct NewPayment<'a> {
    pub candidate_id: i32,
    pub amount: f64,
    pub description: &'a str,
    pub created_at: &'a str,
}

/// User record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub created_at: String,
}

/// New user for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub role: &'a str,
    pub created_at: &'a str,
}

/// Audit log record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::audit_log)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuditLogRecord {
    pub id: i32,
    pub user_id: Option<i32>,
    pub username: String,
    pub action: String,
    pub target_type: String,
    pub target_id: i32,
    pub details: Option<String>,
    pub created_at: String,
}

/// New audit log entry for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::audit_log)]
pub struct NewAuditLog<'a> {
    pub user_id: Option<i32>,
    pub username: &'a str,
    pub action: &'a str,
    pub target_type: &'a str,
    pub target_id: i32,
    pub details: Option<&'a str>,
    pub created_at: &'a str,
}

/// Row id returned by `SELECT last_insert_rowid()`.
#[derive(QueryableByName)]
pub(crate) struct LastInsertRowId {
    #[diesel(sql_type = diesel::sql_types::BigInt, column_name = "last_insert_rowid()")]
    pub id: i64,
}
