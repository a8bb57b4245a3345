// src/models/invoice.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- Enums (mapped to Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "invoice_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Unpaid,
    PartiallyPaid,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::PartiallyPaid => "partially_paid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }

    pub fn is_draft(self) -> bool {
        self == InvoiceStatus::Draft
    }
}

/// How a new invoice leaves the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    #[default]
    Draft,
    Send,
}

// --- Structs ---

/// One billable row. `line_total` is always recomputed from quantity and
/// unit price before an invoice is stored; any value sent by a client is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[schema(example = "Web design services")]
    pub description: String,

    #[schema(example = "2")]
    pub quantity: Decimal,

    #[schema(example = "500.00")]
    pub unit_price: Decimal,

    #[serde(default)]
    #[schema(example = "1000.00")]
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,

    #[schema(ignore)]
    pub user_id: Uuid,

    pub customer_id: Uuid,

    #[schema(example = "INV-20240115-0042")]
    pub invoice_number: String,

    #[schema(value_type = Option<String>, format = Date, example = "2024-01-15")]
    pub invoice_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date, example = "2024-02-15")]
    pub due_date: Option<NaiveDate>,

    pub notes: Option<String>,
    pub line_items: Vec<LineItem>,
    pub apply_vat: bool,

    #[schema(example = "2500.00")]
    pub subtotal: Decimal,
    #[schema(example = "187.50")]
    pub vat_amount: Decimal,
    #[schema(example = "2687.50")]
    pub total_amount: Decimal,
    #[schema(example = "0.00")]
    pub amount_paid: Decimal,

    pub status: InvoiceStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn outstanding(&self) -> Decimal {
        self.total_amount - self.amount_paid
    }
}

/// An invoice with its customer's display name resolved.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub customer_name: String,
}

// --- Inputs ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceInput {
    pub customer_id: Uuid,

    #[schema(value_type = Option<String>, format = Date, example = "2024-01-15")]
    pub invoice_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date, example = "2024-02-15")]
    pub due_date: Option<NaiveDate>,

    pub notes: Option<String>,

    #[validate(length(min = 1, message = "Please add at least one line item"))]
    pub line_items: Vec<LineItem>,

    #[serde(default = "default_apply_vat")]
    pub apply_vat: bool,
}

pub(crate) fn default_apply_vat() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoicePayload {
    #[serde(flatten)]
    #[validate(nested)]
    pub invoice: InvoiceInput,

    #[serde(default)]
    pub mode: SaveMode,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentPayload {
    #[schema(example = "1000.00")]
    pub amount_paid: Decimal,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewTotalsPayload {
    pub line_items: Vec<LineItem>,
    #[serde(default = "default_apply_vat")]
    pub apply_vat: bool,
}

/// Invoice list tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceTab {
    #[default]
    All,
    Draft,
    Unpaid,
    Paid,
}

impl InvoiceTab {
    pub fn matches(self, status: InvoiceStatus) -> bool {
        match self {
            InvoiceTab::All => true,
            InvoiceTab::Draft => status == InvoiceStatus::Draft,
            InvoiceTab::Unpaid => {
                matches!(status, InvoiceStatus::Unpaid | InvoiceStatus::PartiallyPaid)
            }
            InvoiceTab::Paid => status == InvoiceStatus::Paid,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvoiceListQuery {
    /// all | draft | unpaid | paid
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub tab: InvoiceTab,
}

/// Footer totals of the invoice list.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListTotals {
    pub received: Decimal,
    pub outstanding: Decimal,
    pub invoiced: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct InvoiceTabCounts {
    pub all: usize,
    pub draft: usize,
    pub unpaid: usize,
    pub paid: usize,
}

/// One tab of the invoice list. Counts and totals always cover every invoice.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceList {
    pub invoices: Vec<InvoiceView>,
    pub counts: InvoiceTabCounts,
    pub totals: InvoiceListTotals,
}
