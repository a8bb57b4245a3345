// src/handlers/expenses.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        dashboard::MonthGroup,
        expense::{Expense, ExpenseFilter, ExpenseInput, ExpenseStatusPayload, ExpenseSummary, ExpenseUpdate},
    },
};

#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Expenses",
    request_body = ExpenseInput,
    responses(
        (status = 201, description = "Expense recorded as draft", body = Expense),
        (status = 400, description = "Invalid payload"),
        (status = 422, description = "Invalid amount")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<ExpenseInput>,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    payload.validate()?;
    let expense = app_state.expense_service.create(user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Expenses",
    params(ExpenseFilter),
    responses((status = 200, description = "Expenses, latest date first", body = Vec<Expense>)),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<ExpenseFilter>,
) -> Result<Json<Vec<Expense>>, AppError> {
    Ok(Json(app_state.expense_service.list(user.id, &filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/expenses/by-month",
    tag = "Expenses",
    params(ExpenseFilter),
    responses((status = 200, description = "Expenses grouped by month, latest first", body = Vec<MonthGroup<Expense>>)),
    security(("api_jwt" = []))
)]
pub async fn list_expenses_by_month(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<ExpenseFilter>,
) -> Result<Json<Vec<MonthGroup<Expense>>>, AppError> {
    Ok(Json(app_state.expense_service.by_month(user.id, &filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/expenses/summary",
    tag = "Expenses",
    responses((status = 200, body = ExpenseSummary)),
    security(("api_jwt" = []))
)]
pub async fn get_expense_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<ExpenseSummary>, AppError> {
    Ok(Json(app_state.expense_service.summary(user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/expenses/{id}",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "Expense id")),
    responses(
        (status = 200, body = Expense),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_expense(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Expense>, AppError> {
    Ok(Json(app_state.expense_service.get(user.id, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/expenses/{id}",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "Expense id")),
    request_body = ExpenseUpdate,
    responses(
        (status = 200, body = Expense),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_expense(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<Expense>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.expense_service.update(user.id, id, &payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/expenses/{id}/status",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "Expense id")),
    request_body = ExpenseStatusPayload,
    responses(
        (status = 200, body = Expense),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_expense_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpenseStatusPayload>,
) -> Result<Json<Expense>, AppError> {
    Ok(Json(
        app_state
            .expense_service
            .update_status(user.id, id, payload.status)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "Expense id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_expense(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.expense_service.delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
