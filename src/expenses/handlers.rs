use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
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
    db::StoreError,
    error::{ApiResult, AppError},
    expenses::{
        dto::{ExpensePayload, ListExpensesParams, ListExpensesResponse},
        query::ExpenseQuery,
        repo_types::{Expense, NewExpense},
    },
    state::AppState,
};

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/:id", put(update_expense).delete(delete_expense))
}

fn unknown_category(err: StoreError) -> AppError {
    match err {
        StoreError::ForeignKeyViolation(_) => AppError::Validation("unknown category_id".into()),
        other => other.into(),
    }
}

#[instrument(skip(state))]
pub async fn list_expenses(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    params: Result<Query<ListExpensesParams>, QueryRejection>,
) -> ApiResult<Json<ListExpensesResponse>> {
    let Query(params) = params?;
    let query = ExpenseQuery::from(&params);
    let expenses = state.expenses.list(user_id, &query).await?;
    Ok(Json(ListExpensesResponse {
        page: query.pagination.page,
        limit: query.pagination.limit,
        expenses,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_expense(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<ExpensePayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    let Json(payload) = payload?;
    let fields = payload.validate()?;
    let expense = state
        .expenses
        .create(NewExpense {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            amount: fields.amount,
            category_id: fields.category_id,
            user_id,
        })
        .await
        .map_err(unknown_category)?;
    info!(%user_id, expense_id = %expense.id, "expense created");
    Ok((StatusCode::CREATED, Json(expense)))
}

#[instrument(skip(state, payload))]
pub async fn update_expense(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ExpensePayload>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let changes = payload.validate()?;
    let found = state
        .expenses
        .update(user_id, id, changes)
        .await
        .map_err(unknown_category)?;
    if !found {
        return Err(AppError::NotFound("expense"));
    }
    Ok(Json(json!({ "message": "expense updated" })))
}

#[instrument(skip(state))]
pub async fn delete_expense(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    if !state.expenses.delete(user_id, id).await? {
        return Err(AppError::NotFound("expense"));
    }
    info!(%user_id, expense_id = %id, "expense deleted");
    Ok(Json(json!({ "message": "expense deleted" })))
}
