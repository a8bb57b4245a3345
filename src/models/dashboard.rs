// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Income,
    Pending,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub id: Uuid,
    pub kind: ActivityKind,
    #[schema(example = "Invoice INV-20240115-0042")]
    pub description: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_revenue: Decimal,
    pub vat_collected: Decimal,
    pub vat_paid: Decimal,
    /// Negative when more VAT was paid than collected.
    pub payable_vat: Decimal,
    pub total_outstanding: Decimal,
    pub paid_invoices: usize,
    pub unpaid_invoices: usize,
    pub total_expenses: Decimal,
    pub approved_expenses: Decimal,
    pub pending_expenses: usize,
    pub profit: Decimal,
    pub recent_activity: Vec<RecentActivity>,
}

/// One `{Month Year}` bucket of documents.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthGroup<T> {
    #[schema(example = "January 2024")]
    pub label: String,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRevenue {
    /// `None` when the invoices reference a customer that no longer exists.
    pub customer_id: Option<Uuid>,
    #[schema(example = "Adaeze Stores Ltd")]
    pub customer_name: String,
    pub invoice_count: usize,
    pub total_invoiced: Decimal,
    pub total_paid: Decimal,
}
