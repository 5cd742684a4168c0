//! Route handlers.
//!
//! Each handler opens one transaction, makes its repository calls on it and
//! releases it with the outcome before answering. Uploads are written before
//! the transaction is opened, so no connection is held during file I/O.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use sqlx::{Any, AnyPool};
use userdesk_core::health::run_check;
use userdesk_core::{HealthIndicator, HealthResponse, HealthStatus, HttpError, Path, Query, TypedForm};
use userdesk_data::{DataResult, Tx, Window};

use crate::contracts::{PictureInput, UserForm, UserOut};
use crate::repository;
use crate::state::AppState;
use crate::storage::{StoreError, UploadStore};

/// Commit when `result` is `Ok`, roll back otherwise. A failed commit
/// replaces the result.
async fn finish<T>(tx: Tx<'static, Any>, result: DataResult<T>) -> DataResult<T> {
    tx.release(result.is_ok()).await?;
    result
}

/// Picture value for a write, with a note of whether we wrote the file.
struct StagedPicture {
    value: Option<String>,
    uploaded: bool,
}

impl StagedPicture {
    async fn stage(store: &UploadStore, input: PictureInput) -> Result<Self, StoreError> {
        let staged = match input {
            PictureInput::Keep => Self {
                value: None,
                uploaded: false,
            },
            PictureInput::Url(url) => Self {
                value: Some(url),
                uploaded: false,
            },
            PictureInput::Upload(file) => Self {
                value: Some(store.save(&file).await?),
                uploaded: true,
            },
        };
        Ok(staged)
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Remove the file again when the write it belonged to failed.
    async fn discard(self, store: &UploadStore) {
        if let (true, Some(path)) = (self.uploaded, self.value.as_deref()) {
            store.discard(path).await;
        }
    }
}

fn user_not_found(id: i64) -> HttpError {
    HttpError::NotFound(format!("User {id} not found"))
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "userdesk is running" }))
}

/// `POST /users`
pub async fn create_user(
    State(state): State<AppState>,
    TypedForm(form): TypedForm<UserForm>,
) -> Result<(StatusCode, Json<UserOut>), HttpError> {
    form.validate()?;
    let UserForm { fields, picture } = form;

    let staged = StagedPicture::stage(&state.store, picture).await?;
    let mut tx = match Tx::acquire(&state).await {
        Ok(tx) => tx,
        Err(err) => {
            staged.discard(&state.store).await;
            return Err(err.into());
        }
    };
    let result = repository::create(&mut tx, &fields, staged.value()).await;

    match finish(tx, result).await {
        Ok(user) => Ok((
            StatusCode::CREATED,
            Json(UserOut::from_user(user, &state.public_url)),
        )),
        Err(err) => {
            staged.discard(&state.store).await;
            Err(err.into())
        }
    }
}

/// `GET /users?skip=&limit=`
pub async fn list_users(
    State(state): State<AppState>,
    Query(window): Query<Window>,
) -> Result<Json<Vec<UserOut>>, HttpError> {
    let mut tx = Tx::acquire(&state).await?;
    let result = repository::list(&mut tx, window).await;
    let users = finish(tx, result).await?;

    Ok(Json(
        users
            .into_iter()
            .map(|user| UserOut::from_user(user, &state.public_url))
            .collect(),
    ))
}

/// `GET /users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserOut>, HttpError> {
    let mut tx = Tx::acquire(&state).await?;
    let result = repository::get(&mut tx, id).await;
    let user = finish(tx, result).await?.ok_or_else(|| user_not_found(id))?;
    Ok(Json(UserOut::from_user(user, &state.public_url)))
}

/// `PUT /users/{id}`
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    TypedForm(form): TypedForm<UserForm>,
) -> Result<Json<UserOut>, HttpError> {
    form.validate()?;
    let UserForm { fields, picture } = form;

    let staged = StagedPicture::stage(&state.store, picture).await?;
    let mut tx = match Tx::acquire(&state).await {
        Ok(tx) => tx,
        Err(err) => {
            staged.discard(&state.store).await;
            return Err(err.into());
        }
    };
    let result = repository::update(&mut tx, id, &fields, staged.value()).await;

    match finish(tx, result).await {
        Ok(user) => Ok(Json(UserOut::from_user(user, &state.public_url))),
        Err(err) => {
            staged.discard(&state.store).await;
            Err(err.into())
        }
    }
}

/// `DELETE /users/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, HttpError> {
    let mut tx = Tx::acquire(&state).await?;
    let result = repository::delete(&mut tx, id).await;
    finish(tx, result).await?;
    Ok(Json(json!({ "message": "User deleted" })))
}

/// Database reachability probe.
pub struct DatabaseHealth {
    pool: AnyPool,
}

impl HealthIndicator for DatabaseHealth {
    fn name(&self) -> &str {
        "database"
    }

    async fn check(&self) -> HealthStatus {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => HealthStatus::Up,
            Err(e) => HealthStatus::Down(e.to_string()),
        }
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> HealthResponse {
    let database = DatabaseHealth {
        pool: state.pool.clone(),
    };
    HealthResponse::from_checks(vec![run_check(&database).await])
}
