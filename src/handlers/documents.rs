// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser};

#[utoipa::path(
    get,
    path = "/api/invoices/{id}/pdf",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Printable invoice", content_type = "application/pdf"),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_invoice_pdf(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(invoice_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state
        .document_service
        .generate_invoice_pdf(user.id, invoice_id)
        .await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"invoice_{}.pdf\"", invoice_id),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
