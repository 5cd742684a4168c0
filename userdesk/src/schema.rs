//! The `users` table and its row type.

use sqlx::AnyPool;
use userdesk_data::{Backend, DataError, SqlxErrorExt};

/// A persisted user row.
///
/// `profile_picture` holds what was stored: a relative upload path such as
/// `uploads/3f2a....png`, or an absolute URL supplied by the client.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub age: Option<i64>,
    pub profile_picture: Option<String>,
}

impl User {
    pub const TABLE: &'static str = "users";

    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "email",
        "phone",
        "address",
        "age",
        "profile_picture",
    ];

    /// Comma-separated column list for `SELECT` and `RETURNING` clauses.
    pub fn column_list() -> String {
        Self::COLUMNS.join(", ")
    }
}

const POSTGRES_DDL: &str = "CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    phone TEXT,
    address TEXT,
    age BIGINT,
    profile_picture TEXT
)";

const SQLITE_DDL: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    phone TEXT,
    address TEXT,
    age INTEGER,
    profile_picture TEXT
)";

/// `CREATE TABLE` statement for the given engine.
pub fn ddl(backend: Backend) -> &'static str {
    match backend {
        Backend::Postgres => POSTGRES_DDL,
        Backend::Sqlite => SQLITE_DDL,
    }
}

/// Create the `users` table if it does not exist yet.
pub async fn ensure_schema(pool: &AnyPool, backend: Backend) -> Result<(), DataError> {
    sqlx::query(ddl(backend))
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_data_error)?;
    tracing::info!(?backend, table = User::TABLE, "schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_unique_on_both_engines() {
        for backend in [Backend::Postgres, Backend::Sqlite] {
            assert!(ddl(backend).contains("email TEXT NOT NULL UNIQUE"));
        }
    }

    #[test]
    fn column_list_matches_struct_order() {
        assert_eq!(
            User::column_list(),
            "id, name, email, phone, address, age, profile_picture"
        );
    }
}
