// src/models/expense.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::invoice::default_apply_vat;

// --- Enums (mapped to Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "expense_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    OfficeSupplies,
    Utilities,
    Travel,
    Meals,
    Equipment,
    Services,
    Other,
}

impl ExpenseCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::OfficeSupplies => "Office Supplies",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Travel => "Travel",
            ExpenseCategory::Meals => "Meals",
            ExpenseCategory::Equipment => "Equipment",
            ExpenseCategory::Services => "Services",
            ExpenseCategory::Other => "Other",
        }
    }
}

// Any status is reachable from any other; there is no approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "expense_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,

    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = "Printer toner")]
    pub description: String,

    #[schema(example = "12000.00")]
    pub amount: Decimal,

    pub category: ExpenseCategory,

    #[schema(value_type = Option<String>, format = Date, example = "2024-01-20")]
    pub expense_date: Option<NaiveDate>,

    pub apply_vat: bool,

    #[schema(example = "900.00")]
    pub vat_amount: Decimal,
    #[schema(example = "12900.00")]
    pub total_amount: Decimal,

    pub notes: Option<String>,
    pub receipt_url: Option<String>,

    pub status: ExpenseStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Inputs ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInput {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Printer toner")]
    pub description: String,

    #[schema(example = "12000.00")]
    pub amount: Decimal,

    pub category: ExpenseCategory,

    #[schema(value_type = String, format = Date, example = "2024-01-20")]
    pub expense_date: NaiveDate,

    #[serde(default = "default_apply_vat")]
    pub apply_vat: bool,

    pub notes: Option<String>,
    pub receipt_url: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    #[validate(length(min = 1, message = "required"))]
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<ExpenseCategory>,
    #[schema(value_type = Option<String>, format = Date)]
    pub expense_date: Option<NaiveDate>,
    pub apply_vat: Option<bool>,
    pub notes: Option<String>,
    pub receipt_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExpenseStatusPayload {
    pub status: ExpenseStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpenseFilter {
    /// Only expenses in this status
    #[param(value_type = Option<String>)]
    pub status: Option<ExpenseStatus>,

    /// Only expenses with VAT applied
    #[serde(default)]
    pub vat_only: bool,

    /// Case-insensitive match on description or category label
    pub search: Option<String>,
}

impl ExpenseFilter {
    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(status) = self.status {
            if expense.status != status {
                return false;
            }
        }

        if self.vat_only && !expense.apply_vat {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => {
                let query = query.to_lowercase();
                expense.description.to_lowercase().contains(&query)
                    || expense.category.label().to_lowercase().contains(&query)
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStatusCounts {
    pub draft: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub total_expenses: Decimal,
    pub approved_amount: Decimal,
    pub approved_vat: Decimal,
    pub pending_count: usize,
    pub counts: ExpenseStatusCounts,
}
