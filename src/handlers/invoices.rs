// src/handlers/invoices.rs

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
        invoice::{
            CreateInvoicePayload, Invoice, InvoiceInput, InvoiceList, InvoiceListQuery,
            InvoiceView, PreviewTotalsPayload, RecordPaymentPayload,
        },
    },
    services::calculator::InvoiceTotals,
};

#[utoipa::path(
    post,
    path = "/api/invoices",
    tag = "Invoices",
    request_body = CreateInvoicePayload,
    responses(
        (status = 201, description = "Invoice saved as draft or sent", body = Invoice),
        (status = 400, description = "Missing line items or due date"),
        (status = 422, description = "Unknown customer or invalid amount")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateInvoicePayload>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    payload.validate()?;
    let invoice = app_state.invoice_service.create(user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Invoices",
    params(InvoiceListQuery),
    responses((status = 200, description = "Invoices in the tab, with counts and totals", body = InvoiceList)),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<InvoiceListQuery>,
) -> Result<Json<InvoiceList>, AppError> {
    Ok(Json(app_state.invoice_service.list(user.id, query.tab).await?))
}

#[utoipa::path(
    get,
    path = "/api/invoices/by-month",
    tag = "Invoices",
    params(InvoiceListQuery),
    responses((status = 200, description = "Invoices grouped by month, latest first", body = Vec<MonthGroup<InvoiceView>>)),
    security(("api_jwt" = []))
)]
pub async fn list_invoices_by_month(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<InvoiceListQuery>,
) -> Result<Json<Vec<MonthGroup<InvoiceView>>>, AppError> {
    Ok(Json(app_state.invoice_service.by_month(user.id, query.tab).await?))
}

#[utoipa::path(
    post,
    path = "/api/invoices/preview",
    tag = "Invoices",
    request_body = PreviewTotalsPayload,
    responses(
        (status = 200, description = "Totals for the given line items", body = InvoiceTotals),
        (status = 422, description = "Invalid amount")
    ),
    security(("api_jwt" = []))
)]
pub async fn preview_totals(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Json(payload): Json<PreviewTotalsPayload>,
) -> Result<Json<InvoiceTotals>, AppError> {
    let totals = app_state
        .invoice_service
        .preview_totals(&payload.line_items, payload.apply_vat)?;
    Ok(Json(totals))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, body = InvoiceView),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceView>, AppError> {
    Ok(Json(app_state.invoice_service.get(user.id, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = InvoiceInput,
    responses(
        (status = 200, description = "Draft updated", body = Invoice),
        (status = 404, description = "Not found"),
        (status = 409, description = "Invoice is no longer a draft")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InvoiceInput>,
) -> Result<Json<Invoice>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.invoice_service.update_draft(user.id, id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 204, description = "Draft deleted"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Invoice is no longer a draft")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.invoice_service.delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/invoices/{id}/finalize",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Draft issued", body = Invoice),
        (status = 400, description = "Due date missing"),
        (status = 409, description = "Invoice is not a draft")
    ),
    security(("api_jwt" = []))
)]
pub async fn finalize_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Invoice>, AppError> {
    Ok(Json(app_state.invoice_service.finalize(user.id, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/invoices/{id}/payment",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = RecordPaymentPayload,
    responses(
        (status = 200, description = "Payment recorded, status re-derived", body = Invoice),
        (status = 409, description = "Invoice is still a draft"),
        (status = 422, description = "Invalid amount")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_payment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordPaymentPayload>,
) -> Result<Json<Invoice>, AppError> {
    Ok(Json(
        app_state
            .invoice_service
            .record_payment(user.id, id, payload.amount_paid)
            .await?,
    ))
}
