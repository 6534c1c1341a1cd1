//! Repository layer for SQLite persistence.
//!
//! All repositories use sync Diesel on an r2d2 pool, run through
//! [`diesel_pool::run_blocking`]. Schema setup lives in [`migrations`].

pub mod diesel_audit;
pub mod diesel_lifecycle;
pub mod diesel_models;
pub mod diesel_pool;
pub mod diesel_records;
pub mod diesel_users;
pub mod listing;
pub mod migrations;

use chrono::{DateTime, Utc};

pub use diesel_audit::DieselAuditLogRepository;
pub use diesel_lifecycle::DieselLifecycleRepository;
pub use diesel_pool::{create_diesel_pool, run_blocking, DieselError, SqlitePool};
pub use diesel_records::DieselRecordRepository;
pub use diesel_users::DieselUserRepository;

/// Parse an RFC 3339 timestamp, falling back to the Unix epoch for
/// malformed values written by older clients.
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite CURRENT_TIMESTAMP format
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
        })
        .unwrap_or_default()
}

pub(crate) fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.map(|s| parse_datetime(&s))
}

/// Current time as stored in `createdAt` / `deletedAt` columns.
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
