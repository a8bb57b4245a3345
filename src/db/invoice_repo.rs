// src/db/invoice_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{decode_rows, unique_violation},
        error::AppError,
    },
    db::store::{InvoiceStore, NewInvoice},
    models::invoice::{Invoice, InvoiceStatus, LineItem},
};

const INVOICE_COLUMNS: &str = "id, user_id, customer_id, invoice_number, invoice_date, due_date, \
     notes, line_items, apply_vat, subtotal, vat_amount, total_amount, amount_paid, status, \
     created_at, updated_at";

// Line items live in a JSONB column.
#[derive(FromRow)]
struct InvoiceRow {
    id: Uuid,
    user_id: Uuid,
    customer_id: Uuid,
    invoice_number: String,
    invoice_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    notes: Option<String>,
    line_items: Json<Vec<LineItem>>,
    apply_vat: bool,
    subtotal: Decimal,
    vat_amount: Decimal,
    total_amount: Decimal,
    amount_paid: Decimal,
    status: InvoiceStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        Invoice {
            id: row.id,
            user_id: row.user_id,
            customer_id: row.customer_id,
            invoice_number: row.invoice_number,
            invoice_date: row.invoice_date,
            due_date: row.due_date,
            notes: row.notes,
            line_items: row.line_items.0,
            apply_vat: row.apply_vat,
            subtotal: row.subtotal,
            vat_amount: row.vat_amount,
            total_amount: row.total_amount,
            amount_paid: row.amount_paid,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceStore for InvoiceRepository {
    async fn insert_invoice(&self, new: &NewInvoice) -> Result<Invoice, AppError> {
        let sql = format!(
            "INSERT INTO invoices (
                user_id, customer_id, invoice_number, invoice_date, due_date, notes,
                line_items, apply_vat, subtotal, vat_amount, total_amount, amount_paid, status
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {INVOICE_COLUMNS}"
        );

        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(new.user_id)
            .bind(new.customer_id)
            .bind(&new.invoice_number)
            .bind(new.invoice_date)
            .bind(new.due_date)
            .bind(&new.notes)
            .bind(Json(&new.line_items))
            .bind(new.apply_vat)
            .bind(new.subtotal)
            .bind(new.vat_amount)
            .bind(new.total_amount)
            .bind(new.amount_paid)
            .bind(new.status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match unique_violation(&e).as_deref() {
                Some("invoices_user_id_invoice_number_key") => AppError::InvoiceNumberTaken,
                _ => e.into(),
            })?;

        Ok(row.into())
    }

    async fn save_invoice(&self, invoice: &Invoice) -> Result<Option<Invoice>, AppError> {
        let sql = format!(
            "UPDATE invoices
             SET customer_id = $3, invoice_date = $4, due_date = $5, notes = $6,
                 line_items = $7, apply_vat = $8, subtotal = $9, vat_amount = $10,
                 total_amount = $11, amount_paid = $12, status = $13, updated_at = NOW()
             WHERE user_id = $1 AND id = $2
             RETURNING {INVOICE_COLUMNS}"
        );

        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(invoice.user_id)
            .bind(invoice.id)
            .bind(invoice.customer_id)
            .bind(invoice.invoice_date)
            .bind(invoice.due_date)
            .bind(&invoice.notes)
            .bind(Json(&invoice.line_items))
            .bind(invoice.apply_vat)
            .bind(invoice.subtotal)
            .bind(invoice.vat_amount)
            .bind(invoice.total_amount)
            .bind(invoice.amount_paid)
            .bind(invoice.status)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Invoice::from))
    }

    async fn delete_invoice(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM invoices WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_invoice(&self, user_id: Uuid, id: Uuid) -> Result<Option<Invoice>, AppError> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE user_id = $1 AND id = $2");
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Invoice::from))
    }

    async fn list_invoices(&self, user_id: Uuid) -> Result<Vec<Invoice>, AppError> {
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;
        Ok(decode_rows::<InvoiceRow>(rows, "invoices")
            .into_iter()
            .map(Invoice::from)
            .collect())
    }
}
