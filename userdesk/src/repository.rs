//! SQL for the `users` table. Every call runs on the caller's transaction.

use sqlx::Any;
use userdesk_data::{DataError, DataResult, SqlxErrorExt, Tx, Window};

use crate::contracts::UserFields;
use crate::schema::User;

const INSERT: &str = "INSERT INTO users (name, email, phone, address, age, profile_picture) \
     VALUES ($1, $2, $3, $4, $5, $6) \
     RETURNING id, name, email, phone, address, age, profile_picture";

const SELECT_PAGE: &str = "SELECT id, name, email, phone, address, age, profile_picture \
     FROM users ORDER BY id LIMIT $1 OFFSET $2";

const SELECT_ONE: &str = "SELECT id, name, email, phone, address, age, profile_picture \
     FROM users WHERE id = $1";

const UPDATE: &str = "UPDATE users \
     SET name = $1, email = $2, phone = $3, address = $4, age = $5, profile_picture = $6 \
     WHERE id = $7 \
     RETURNING id, name, email, phone, address, age, profile_picture";

const DELETE: &str = "DELETE FROM users WHERE id = $1";

fn not_found(id: i64) -> DataError {
    DataError::NotFound(format!("User {id} not found"))
}

fn email_taken(email: &str) -> impl FnOnce() -> String + '_ {
    move || format!("Email {email} is already registered")
}

/// Insert a user. A duplicate email is a [`DataError::Conflict`].
pub async fn create(
    tx: &mut Tx<'_, Any>,
    fields: &UserFields,
    picture: Option<&str>,
) -> DataResult<User> {
    let user = sqlx::query_as::<_, User>(INSERT)
        .bind(fields.name.as_str())
        .bind(fields.email.as_str())
        .bind(fields.phone.as_deref())
        .bind(fields.address.as_deref())
        .bind(fields.age)
        .bind(picture)
        .fetch_one(tx.as_mut())
        .await
        .map_err(|e| e.into_data_error_or_conflict(email_taken(&fields.email)))?;
    tracing::info!(user_id = user.id, "user created");
    Ok(user)
}

/// Users in id order, `window.skip` rows skipped, at most `window.limit` returned.
pub async fn list(tx: &mut Tx<'_, Any>, window: Window) -> DataResult<Vec<User>> {
    if window.limit == 0 {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, User>(SELECT_PAGE)
        .bind(window.limit_param())
        .bind(window.offset_param())
        .fetch_all(tx.as_mut())
        .await
        .map_err(SqlxErrorExt::into_data_error)
}

/// Look a user up by id. Absence is `Ok(None)`.
pub async fn get(tx: &mut Tx<'_, Any>, id: i64) -> DataResult<Option<User>> {
    sqlx::query_as::<_, User>(SELECT_ONE)
        .bind(id)
        .fetch_optional(tx.as_mut())
        .await
        .map_err(SqlxErrorExt::into_data_error)
}

/// Replace every field of user `id`.
///
/// `picture` replaces the stored picture when given; otherwise the current
/// one is kept. A missing user is [`DataError::NotFound`] and nothing is
/// written.
pub async fn update(
    tx: &mut Tx<'_, Any>,
    id: i64,
    fields: &UserFields,
    picture: Option<&str>,
) -> DataResult<User> {
    let current = get(tx, id).await?.ok_or_else(|| not_found(id))?;
    let picture = picture.map(str::to_string).or(current.profile_picture);

    let user = sqlx::query_as::<_, User>(UPDATE)
        .bind(fields.name.as_str())
        .bind(fields.email.as_str())
        .bind(fields.phone.as_deref())
        .bind(fields.address.as_deref())
        .bind(fields.age)
        .bind(picture)
        .bind(id)
        .fetch_one(tx.as_mut())
        .await
        .map_err(|e| e.into_data_error_or_conflict(email_taken(&fields.email)))?;
    tracing::info!(user_id = id, "user updated");
    Ok(user)
}

/// Delete user `id`. A missing user is [`DataError::NotFound`].
pub async fn delete(tx: &mut Tx<'_, Any>, id: i64) -> DataResult<()> {
    let result = sqlx::query(DELETE)
        .bind(id)
        .execute(tx.as_mut())
        .await
        .map_err(SqlxErrorExt::into_data_error)?;
    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }
    tracing::info!(user_id = id, "user deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_return_every_column() {
        let columns = User::column_list();
        assert!(INSERT.ends_with(&columns));
        assert!(UPDATE.ends_with(&columns));
        assert!(SELECT_PAGE.contains(&columns));
        assert!(SELECT_ONE.contains(&columns));
    }
}
