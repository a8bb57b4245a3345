// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::dashboard::{CustomerRevenue, DashboardSummary},
};

#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses((status = 200, description = "Revenue, VAT, outstanding and recent activity", body = DashboardSummary)),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<DashboardSummary>, AppError> {
    Ok(Json(app_state.dashboard_service.summary(user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/revenue-by-customer",
    tag = "Dashboard",
    responses((status = 200, description = "Invoiced and paid totals per customer", body = Vec<CustomerRevenue>)),
    security(("api_jwt" = []))
)]
pub async fn get_revenue_by_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<CustomerRevenue>>, AppError> {
    Ok(Json(app_state.dashboard_service.revenue_by_customer(user.id).await?))
}
