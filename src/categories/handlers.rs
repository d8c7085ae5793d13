use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    categories::{
        dto::CategoryPayload,
        repo_types::{Category, NewCategory},
    },
    db::StoreError,
    error::{ApiResult, AppError},
    state::AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            put(update_category).delete(delete_category),
        )
}

#[instrument(skip(state))]
pub async fn list_categories(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = state.categories.list_by_owner(user_id).await?;
    Ok(Json(categories))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let Json(payload) = payload?;
    let category = state
        .categories
        .create(NewCategory {
            id: Uuid::new_v4(),
            title: payload.into_title()?,
            user_id,
        })
        .await?;
    info!(%user_id, category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let title = payload.into_title()?;
    if !state.categories.update(user_id, id, &title).await? {
        return Err(AppError::NotFound("category"));
    }
    Ok(Json(json!({ "message": "category updated" })))
}

#[instrument(skip(state))]
pub async fn delete_category(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    let found = state
        .categories
        .delete(user_id, id)
        .await
        .map_err(|e| match e {
            StoreError::ForeignKeyViolation(_) => {
                AppError::Conflict("category still has expenses".into())
            }
            other => other.into(),
        })?;
    if !found {
        return Err(AppError::NotFound("category"));
    }
    info!(%user_id, category_id = %id, "category deleted");
    Ok(Json(json!({ "message": "category deleted" })))
}
