//! Transaction wrapper with an explicit acquire/release lifecycle.
//!
//! A handler acquires one [`Tx`] per request, passes it to every data-layer
//! call it makes, then releases it with the outcome: commit on success,
//! rollback otherwise. A `Tx` dropped without release rolls back.

use sqlx::{Database, Pool, Transaction};
use std::ops::{Deref, DerefMut};

use crate::error::{DataError, SqlxErrorExt};

/// Trait for application states that contain a database pool.
pub trait HasPool<DB: Database> {
    fn pool(&self) -> &Pool<DB>;
}

/// A wrapper around SQLx [`Transaction`] scoped to one request.
pub struct Tx<'a, DB: Database>(pub Transaction<'a, DB>);

impl<'a, DB: Database> Deref for Tx<'a, DB> {
    type Target = Transaction<'a, DB>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a, DB: Database> DerefMut for Tx<'a, DB> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a, DB: Database> Tx<'a, DB> {
    /// Unwraps the `Tx` into the inner `Transaction`.
    pub fn into_inner(self) -> Transaction<'a, DB> {
        self.0
    }

    /// Returns a mutable reference to the underlying connection.
    pub fn as_mut(&mut self) -> &mut <DB as Database>::Connection {
        &mut *self.0
    }
}

impl<DB: Database> Tx<'static, DB> {
    /// Begin a new transaction from the state's pool.
    pub async fn acquire<S: HasPool<DB>>(state: &S) -> Result<Self, DataError> {
        let tx = state.pool().begin().await.map_err(SqlxErrorExt::into_data_error)?;
        Ok(Tx(tx))
    }

    /// Finish the transaction: commit when `success`, roll back otherwise.
    pub async fn release(self, success: bool) -> Result<(), DataError> {
        if success {
            self.into_inner()
                .commit()
                .await
                .map_err(SqlxErrorExt::into_data_error)
        } else {
            if let Err(e) = self.into_inner().rollback().await {
                tracing::warn!(error = %e, "transaction rollback failed");
            }
            Ok(())
        }
    }
}
