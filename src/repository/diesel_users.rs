//! Diesel-based user repository for SQLite.

use diesel::prelude::*;
use tracing::warn;

use super::diesel_models::{LastInsertRowId, NewUser, UserRecord};
use super::diesel_pool::{run_blocking, DieselError, SqlitePool};
use super::{now_rfc3339, parse_datetime};
use crate::models::{Role, User};
use crate::schema::users;

/// Convert a database record to a domain model.
impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        let role = record.role.parse().unwrap_or_else(|_| {
            warn!(
                username = %record.username,
                role = %record.role,
                "unknown role stored for user, treating as staff"
            );
            Role::Staff
        });
        User {
            id: record.id,
            username: record.username,
            role,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

/// Diesel-based user repository.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: SqlitePool,
}

impl DieselUserRepository {
    /// Create a new user repository with an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user. Fails if the username is taken.
    pub async fn create(&self, username: &str, role: Role) -> Result<User, DieselError> {
        let username = username.to_string();
        let now = now_rfc3339();
        let pool = self.pool.clone();

        let id = run_blocking(pool, move |conn| {
            diesel::insert_into(users::table)
                .values(&NewUser {
                    username: &username,
                    role: role.as_str(),
                    created_at: &now,
                })
                .execute(conn)?;
            let row: LastInsertRowId =
                diesel::sql_query("SELECT last_insert_rowid()").get_result(conn)?;
            Ok::<_, DieselError>(row.id as i32)
        })
        .await?;

        self.get(id).await?.ok_or(DieselError::NotFound)
    }

    /// Get a user by id.
    pub async fn get(&self, id: i32) -> Result<Option<User>, DieselError> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            users::table
                .find(id)
                .select(UserRecord::as_select())
                .first(conn)
                .optional()
        })
        .await
        .map(|opt| opt.map(User::from))
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, DieselError> {
        let username = username.to_string();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            users::table
                .filter(users::username.eq(&username))
                .select(UserRecord::as_select())
                .first(conn)
                .optional()
        })
        .await
        .map(|opt| opt.map(User::from))
    }

    /// Get all users ordered by username.
    pub async fn get_all(&self) -> Result<Vec<User>, DieselError> {
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            users::table
                .order(users::username.asc())
                .select(UserRecord::as_select())
                .load(conn)
        })
        .await
        .map(|records| records.into_iter().map(User::from).collect())
    }

    /// Change a user's role. Returns false if no such user.
    pub async fn set_role(&self, username: &str, role: Role) -> Result<bool, DieselError> {
        let username = username.to_string();
        let pool = self.pool.clone();

        run_blocking(pool, move |conn| {
            let rows = diesel::update(users::table.filter(users::username.eq(&username)))
                .set(users::role.eq(role.as_str()))
                .execute(conn)?;
            Ok(rows > 0)
        })
        .await
    }
}
