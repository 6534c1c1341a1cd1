//! Versioned schema migrations.
//!
//! The applied version is kept in SQLite's `user_version` header field and
//! each step runs in its own transaction. Step 1 creates the entity tables
//! in the layout the desktop application already uses (`CREATE TABLE IF
//! NOT EXISTS`), so an existing database file is adopted as-is.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::registry::EntityType;

/// Errors raised while migrating a database.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("migration task failed: {0}")]
    Task(String),

    #[error("database is at version {found}, newer than this build supports ({supported})")]
    TooNew { found: u32, supported: u32 },
}

struct Migration {
    name: &'static str,
    sql: fn() -> String,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "entity_tables",
        sql: entity_tables_sql,
    },
    Migration {
        name: "deletion_batches",
        sql: deletion_batches_sql,
    },
    Migration {
        name: "users_and_audit_log",
        sql: users_and_audit_sql,
    },
];

/// Latest schema version this build knows how to create.
pub fn latest_version() -> u32 {
    MIGRATIONS.len() as u32
}

fn entity_tables_sql() -> String {
    let mut sql = String::from(
        r#"
        CREATE TABLE IF NOT EXISTS candidates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            passportNo TEXT,
            phone TEXT,
            status TEXT NOT NULL DEFAULT 'new',
            createdAt TEXT NOT NULL,
            isDeleted INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS employers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            companyName TEXT NOT NULL,
            country TEXT,
            contactEmail TEXT,
            createdAt TEXT NOT NULL,
            isDeleted INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS job_orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employerId INTEGER NOT NULL,
            positionTitle TEXT NOT NULL,
            openingsCount INTEGER NOT NULL DEFAULT 1,
            status TEXT NOT NULL DEFAULT 'open',
            createdAt TEXT NOT NULL,
            isDeleted INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS placements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            candidateId INTEGER NOT NULL,
            jobOrderId INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'proposed',
            createdAt TEXT NOT NULL,
            isDeleted INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            candidateId INTEGER NOT NULL,
            fileName TEXT NOT NULL,
            filePath TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'other',
            createdAt TEXT NOT NULL,
            isDeleted INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS payments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            candidateId INTEGER NOT NULL,
            amount REAL NOT NULL,
            description TEXT NOT NULL,
            createdAt TEXT NOT NULL,
            isDeleted INTEGER NOT NULL DEFAULT 0
        );
        "#,
    );

    for entity in [
        EntityType::VisaTracking,
        EntityType::PassportTracking,
        EntityType::MedicalTracking,
        EntityType::InterviewTracking,
        EntityType::TravelTracking,
    ] {
        sql.push_str(&format!(
            r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            candidateId INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            notes TEXT,
            createdAt TEXT NOT NULL,
            isDeleted INTEGER NOT NULL DEFAULT 0
        );
        "#,
            table = entity.table()
        ));
    }

    // Foreign key lookups drive every cascade
    for parent in EntityType::ALL {
        for dependent in parent.dependents() {
            let table = dependent.entity.table();
            sql.push_str(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_{fk} ON {table}({fk});\n",
                fk = dependent.foreign_key,
            ));
        }
    }

    sql
}

fn deletion_batches_sql() -> String {
    EntityType::ALL
        .iter()
        .map(|entity| {
            let table = entity.table();
            format!(
                "ALTER TABLE {table} ADD COLUMN deletedBatchId TEXT;\n\
                 ALTER TABLE {table} ADD COLUMN deletedAt TEXT;\n\
                 CREATE INDEX IF NOT EXISTS idx_{table}_lifecycle ON {table}(isDeleted, deletedBatchId);\n"
            )
        })
        .collect()
}

fn users_and_audit_sql() -> String {
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL DEFAULT 'staff',
        createdAt TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS audit_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        userId INTEGER,
        username TEXT NOT NULL,
        action TEXT NOT NULL,
        targetType TEXT NOT NULL,
        targetId INTEGER NOT NULL,
        details TEXT,
        createdAt TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_audit_log_target ON audit_log(targetType, targetId);
    "#
    .to_string()
}

/// Apply pending migrations to the database at `database_url`.
///
/// Returns the schema version after migrating. Safe to call on every start.
pub async fn run_migrations(database_url: &str, verbose: bool) -> Result<u32, MigrationError> {
    let path = database_url
        .strip_prefix("sqlite:")
        .unwrap_or(database_url)
        .to_string();

    tokio::task::spawn_blocking(move || migrate_path(Path::new(&path), verbose))
        .await
        .map_err(|e| MigrationError::Task(e.to_string()))?
}

/// Apply pending migrations synchronously.
pub fn migrate_path(path: &Path, verbose: bool) -> Result<u32, MigrationError> {
    let mut conn = Connection::open(path)?;
    conn.busy_timeout(Duration::from_secs(5))?;

    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let supported = latest_version();
    if current > supported {
        return Err(MigrationError::TooNew {
            found: current,
            supported,
        });
    }

    for (index, migration) in MIGRATIONS.iter().enumerate() {
        let version = index as u32 + 1;
        if version <= current {
            continue;
        }

        let tx = conn.transaction()?;
        tx.execute_batch(&(migration.sql)())?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;

        if verbose {
            info!("Applied migration {} ({})", version, migration.name);
        } else {
            debug!(version, name = migration.name, "applied migration");
        }
    }

    Ok(supported)
}

/// Schema version currently recorded in the database.
pub fn current_version(path: &Path) -> Result<u32, MigrationError> {
    let conn = Connection::open(path)?;
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
